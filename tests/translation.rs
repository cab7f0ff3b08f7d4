use gralloc_shim::descriptor::BufferDescriptor;
use gralloc_shim::handle::HandleFields;
use gralloc_shim::pixel_formats::supported_formats;
use gralloc_shim::usage::translate_usage_bits;
use gralloc_shim::{
    ApiLevel, BoUsage, ConversionError, DrmFormat, GrallocUsage, HalPixelFormat, format_string,
    translate_format, translate_usage, validate,
};

#[test]
fn every_supported_format_maps_to_something() {
    for level in [ApiLevel(21), ApiLevel::OREO, ApiLevel::default()] {
        for format in supported_formats(level) {
            assert!(!translate_format(format, level).is_none(), "{:?}", format);
        }
    }
}

#[test]
fn outside_the_table_is_none() {
    let api = ApiLevel::default();
    let supported: Vec<_> = supported_formats(api).collect();
    for raw in -4..0x40 {
        let format = HalPixelFormat(raw);
        if !supported.contains(&format) {
            assert_eq!(translate_format(format, api), DrmFormat::NONE, "{raw:#x}");
        }
    }
}

#[test]
fn typical_camera_preview() {
    let usage = GrallocUsage::HW_CAMERA_WRITE
        | GrallocUsage::HW_TEXTURE
        | GrallocUsage::HW_COMPOSER;
    assert_eq!(
        translate_usage(usage),
        BoUsage::CAMERA_WRITE | BoUsage::TEXTURE | BoUsage::SCANOUT
    );
}

#[test]
fn video_encoder_reads_often() {
    let bo = translate_usage_bits(GrallocUsage::HW_VIDEO_ENCODER.bits());
    assert_eq!(
        bo,
        (BoUsage::HW_VIDEO_ENCODER | BoUsage::SW_READ_OFTEN).bits()
    );
}

#[test]
fn protected_becomes_linear() {
    let bo = translate_usage(GrallocUsage::PROTECTED);
    assert_eq!(bo, BoUsage::LINEAR);
    assert!(!bo.contains(BoUsage::PROTECTED));
}

#[cfg(target_endian = "little")]
#[test]
fn format_labels() {
    assert_eq!(format_string(DrmFormat(0x3432_5241)), "DRM_FOURCC_AR24");
    assert_eq!(format_string(DrmFormat::ABGR8888), "DRM_FOURCC_AB24");
    assert_eq!(
        format_string(DrmFormat::FLEX_IMPLEMENTATION_DEFINED),
        "DRM_FOURCC_9998"
    );
}

#[test]
fn allocate_then_validate() {
    let request = BufferDescriptor {
        width: 256,
        height: 128,
        droid_format: HalPixelFormat::RGBX_8888,
        droid_usage: GrallocUsage::HW_RENDER | GrallocUsage::SW_WRITE_RARELY,
        name: "surface".to_string(),
    };
    let driver = request.to_driver(ApiLevel::default()).expect("supported");
    assert_eq!(driver.drm_format, DrmFormat::XBGR8888);

    let fields = HandleFields {
        width: driver.width,
        height: driver.height,
        format: driver.drm_format.0,
        droid_format: request.droid_format.0,
        num_planes: 1,
        use_flags: driver.use_flags.bits(),
        usage: request.droid_usage.bits(),
        total_size: 256 * 128 * 4,
        strides: [1024, 0, 0, 0],
        ..Default::default()
    };
    let bytes = fields.encode();
    let handle = validate(Some(bytes.as_slice())).expect("our handle");
    assert_eq!(handle.format(), Some(DrmFormat::XBGR8888));
    assert_eq!(
        handle.use_flags(),
        Some(BoUsage::RENDERING | BoUsage::SW_WRITE_RARELY)
    );

    //a handle from someone else is refused
    let foreign = vec![0u8; bytes.len()];
    assert!(validate(Some(foreign.as_slice())).is_none());
}

#[test]
fn unsupported_request_is_rejected() {
    let request = BufferDescriptor {
        width: 64,
        height: 64,
        droid_format: HalPixelFormat::Y8,
        droid_usage: GrallocUsage::SW_READ_OFTEN,
        name: "y8".to_string(),
    };
    assert_eq!(
        request.to_driver(ApiLevel::default()),
        Err(ConversionError::UnsupportedFormat(HalPixelFormat::Y8))
    );
}
