// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Pixel format vocabularies and the translation between them.
//!
//! Two vocabularies meet here:
//!
//! - [`HalPixelFormat`] is the Android `HAL_PIXEL_FORMAT_*` enumeration a gralloc client
//!   passes in when it asks for a buffer.
//! - [`DrmFormat`] is the fourcc code understood by the allocation driver.  Most values are
//!   the standard `DRM_FORMAT_*` codes; a handful are private to the driver and stand for
//!   "decide later" formats such as [`DrmFormat::FLEX_IMPLEMENTATION_DEFINED`].
//!
//! [`translate_format`] maps the first onto the second.  It is a total function: anything it
//! doesn't recognize comes back as [`DrmFormat::NONE`], which callers must treat as
//! "reject this allocation".
//!
//! # Examples
//!
//! ```
//! use gralloc_shim::pixel_formats::{translate_format, ApiLevel, DrmFormat, HalPixelFormat};
//!
//! let drm = translate_format(HalPixelFormat::RGBA_8888, ApiLevel::default());
//! assert_eq!(drm, DrmFormat::ABGR8888);
//!
//! // Half-float formats only exist from Oreo onwards.
//! let drm = translate_format(HalPixelFormat::RGBA_FP16, ApiLevel(25));
//! assert_eq!(drm, DrmFormat::NONE);
//! ```

pub mod fourcc;

pub use fourcc::{fourcc, format_string};

/// An Android `HAL_PIXEL_FORMAT_*` value.
///
/// Any `int` is representable: vendor and future formats pass through and translate to
/// [`DrmFormat::NONE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HalPixelFormat(pub i32);

impl HalPixelFormat {
    pub const RGBA_8888: Self = Self(1);
    pub const RGBX_8888: Self = Self(2);
    pub const RGB_888: Self = Self(3);
    pub const RGB_565: Self = Self(4);
    pub const BGRA_8888: Self = Self(5);
    pub const YCBCR_422_SP: Self = Self(0x10);
    pub const YCRCB_420_SP: Self = Self(0x11);
    pub const YCBCR_422_I: Self = Self(0x14);
    pub const RGBA_FP16: Self = Self(0x16);
    pub const RAW16: Self = Self(0x20);
    /// Opaque byte buffer.  Buffers of this format have a height of 1 and a width equal to
    /// their size in bytes.
    pub const BLOB: Self = Self(0x21);
    /// The producer and consumer agree on a format through the usage bits alone.
    pub const IMPLEMENTATION_DEFINED: Self = Self(0x22);
    /// Flexible YUV; the actual layout is picked by the allocator.
    pub const YCBCR_420_888: Self = Self(0x23);
    pub const RAW_OPAQUE: Self = Self(0x24);
    pub const RAW10: Self = Self(0x25);
    pub const RAW12: Self = Self(0x26);
    pub const RGBA_1010102: Self = Self(0x2B);
    pub const Y8: Self = Self(0x2020_3859);
    pub const Y16: Self = Self(0x2036_3159);
    pub const YV12: Self = Self(0x3231_5659);
}

impl std::fmt::LowerHex for HalPixelFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::LowerHex::fmt(&self.0, f)
    }
}

/// A fourcc-style driver format code.
///
/// Codes are packed little-endian, so the first character of the name lives in the low
/// byte.  See [`fourcc()`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DrmFormat(pub u32);

impl DrmFormat {
    /// Sentinel meaning "no driver format"; the request must be rejected.
    pub const NONE: Self = Self(fourcc(b'0', b'0', b'0', b'0'));

    pub const R8: Self = Self(fourcc(b'R', b'8', b' ', b' '));
    pub const R16: Self = Self(fourcc(b'R', b'1', b'6', b' '));
    pub const RGB565: Self = Self(fourcc(b'R', b'G', b'1', b'6'));
    pub const BGR888: Self = Self(fourcc(b'B', b'G', b'2', b'4'));
    pub const ARGB8888: Self = Self(fourcc(b'A', b'R', b'2', b'4'));
    pub const XRGB8888: Self = Self(fourcc(b'X', b'R', b'2', b'4'));
    pub const ABGR8888: Self = Self(fourcc(b'A', b'B', b'2', b'4'));
    pub const XBGR8888: Self = Self(fourcc(b'X', b'B', b'2', b'4'));
    pub const ABGR2101010: Self = Self(fourcc(b'A', b'B', b'3', b'0'));
    pub const ABGR16161616F: Self = Self(fourcc(b'A', b'B', b'4', b'H'));
    pub const NV12: Self = Self(fourcc(b'N', b'V', b'1', b'2'));
    pub const YVU420: Self = Self(fourcc(b'Y', b'V', b'1', b'2'));

    /// YV12 with the Android stride and plane alignment rules.
    pub const YVU420_ANDROID: Self = Self(fourcc(b'9', b'9', b'9', b'7'));
    /// Resolved by the driver from the usage bits at allocation time.
    pub const FLEX_IMPLEMENTATION_DEFINED: Self = Self(fourcc(b'9', b'9', b'9', b'8'));
    /// Resolved by the driver to some 4:2:0 YUV layout at allocation time.
    pub const FLEX_YCBCR_420_888: Self = Self(fourcc(b'9', b'9', b'9', b'9'));

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }
}

impl std::fmt::Display for DrmFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&format_string(*self))
    }
}

/// Platform API level of the framework we are serving.
///
/// Some table rows only exist on newer platforms.  Callers pass the level in explicitly
/// so that the same build can serve (and test) both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ApiLevel(pub u32);

impl ApiLevel {
    /// Android 8.0.  First level with 10-bit and half-float RGBA formats.
    pub const OREO: Self = Self(26);
}

impl Default for ApiLevel {
    fn default() -> Self {
        Self(u32::MAX)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Availability {
    Always,
    Since(ApiLevel),
}

impl Availability {
    const fn allows(self, api_level: ApiLevel) -> bool {
        match self {
            Availability::Always => true,
            Availability::Since(min) => api_level.0 >= min.0,
        }
    }
}

struct FormatRow {
    hal: HalPixelFormat,
    drm: DrmFormat,
    availability: Availability,
}

const fn row(hal: HalPixelFormat, drm: DrmFormat) -> FormatRow {
    FormatRow {
        hal,
        drm,
        availability: Availability::Always,
    }
}

/*
Two rows exist only on newer platforms.  They carry an availability column instead of a
`cfg`, so both variants of the table are compiled and tested in one build.
 */
//conversion from HAL to fourcc formats follows mesa's platform_android.c
const FORMAT_TABLE: &[FormatRow] = &[
    row(HalPixelFormat::BGRA_8888, DrmFormat::ARGB8888),
    row(
        HalPixelFormat::IMPLEMENTATION_DEFINED,
        DrmFormat::FLEX_IMPLEMENTATION_DEFINED,
    ),
    row(HalPixelFormat::RAW16, DrmFormat::R16),
    row(HalPixelFormat::RGB_565, DrmFormat::RGB565),
    row(HalPixelFormat::RGB_888, DrmFormat::BGR888),
    row(HalPixelFormat::RGBA_8888, DrmFormat::ABGR8888),
    row(HalPixelFormat::RGBX_8888, DrmFormat::XBGR8888),
    row(HalPixelFormat::YCBCR_420_888, DrmFormat::FLEX_YCBCR_420_888),
    row(HalPixelFormat::YV12, DrmFormat::YVU420_ANDROID),
    // BLOB buffers are 1 row tall and as wide as their byte size, which is exactly an R8 image.
    row(HalPixelFormat::BLOB, DrmFormat::R8),
    FormatRow {
        hal: HalPixelFormat::RGBA_1010102,
        drm: DrmFormat::ABGR2101010,
        availability: Availability::Since(ApiLevel::OREO),
    },
    FormatRow {
        hal: HalPixelFormat::RGBA_FP16,
        drm: DrmFormat::ABGR16161616F,
        availability: Availability::Since(ApiLevel::OREO),
    },
];

/// Translates an Android pixel format into the driver's fourcc vocabulary.
///
/// Returns [`DrmFormat::NONE`] for formats without a mapping, including formats whose
/// mapping requires a newer `api_level` than the one supplied.
pub fn translate_format(format: HalPixelFormat, api_level: ApiLevel) -> DrmFormat {
    FORMAT_TABLE
        .iter()
        .find(|r| r.hal == format)
        .filter(|r| r.availability.allows(api_level))
        .map(|r| r.drm)
        .unwrap_or(DrmFormat::NONE)
}

/// Iterates the HAL formats that have a mapping at `api_level`.
pub fn supported_formats(api_level: ApiLevel) -> impl Iterator<Item = HalPixelFormat> {
    FORMAT_TABLE
        .iter()
        .filter(move |r| r.availability.allows(api_level))
        .map(|r| r.hal)
}
