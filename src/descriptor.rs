// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
Buffer requests, before and after translation.

[`translate_format`] and [`translate_usage`] never fail; they return sentinels instead.
This is the place where the sentinels turn into a decision: a [`BufferDescriptor`] either
becomes a [`DriverDescriptor`] the allocator can act on, or a [`ConversionError`].
*/

use crate::error::ConversionError;
use crate::pixel_formats::{ApiLevel, DrmFormat, HalPixelFormat, translate_format};
use crate::usage::{BoUsage, GrallocUsage, translate_usage};

/// A buffer request in the framework's vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferDescriptor {
    pub width: u32,
    pub height: u32,
    pub droid_format: HalPixelFormat,
    pub droid_usage: GrallocUsage,
    /// Debug name supplied by the client.
    pub name: String,
}

/// The same request in the driver's vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverDescriptor {
    pub width: u32,
    pub height: u32,
    pub drm_format: DrmFormat,
    pub use_flags: BoUsage,
}

impl BufferDescriptor {
    pub fn to_driver(&self, api_level: ApiLevel) -> Result<DriverDescriptor, ConversionError> {
        let result = self.convert(api_level);
        if let Err(err) = &result {
            logwise::warn_sync!(
                "rejecting buffer {name}: {err}",
                name = logwise::privacy::LogIt(&self.name),
                err = logwise::privacy::LogIt(err)
            );
        }
        result
    }

    fn convert(&self, api_level: ApiLevel) -> Result<DriverDescriptor, ConversionError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConversionError::EmptyExtent {
                width: self.width,
                height: self.height,
            });
        }
        if self.droid_format == HalPixelFormat::BLOB && self.height != 1 {
            return Err(ConversionError::BlobHeight(self.height));
        }
        let drm_format = translate_format(self.droid_format, api_level);
        if drm_format.is_none() {
            return Err(ConversionError::UnsupportedFormat(self.droid_format));
        }
        let use_flags = translate_usage(self.droid_usage);
        logwise::trace_sync!(
            "buffer {name} -> {format} {flags}",
            name = logwise::privacy::LogIt(&self.name),
            format = logwise::privacy::LogIt(&drm_format.to_string()),
            flags = logwise::privacy::LogIt(&use_flags)
        );
        Ok(DriverDescriptor {
            width: self.width,
            height: self.height,
            drm_format,
            use_flags,
        })
    }
}
