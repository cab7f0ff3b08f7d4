// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Validated views over gralloc buffer handles.
//!
//! A buffer handle arrives from the framework as an opaque token.  We can't trust it: it may
//! belong to a different allocator, be stale, or be garbage.  The only thing that makes it
//! ours is the magic tag in its first word.
//!
//! [`validate`] borrows the handle bytes, reads the tag and nothing else, and only then hands
//! out a typed [`GrallocHandle`].  Every other field is reachable only through that view, so
//! there is no path that reads past the tag of a foreign handle.
//!
//! # Layout
//!
//! All fields are native-endian.
//!
//! | offset | field |
//! |--------|-------|
//! | 0  | magic (`u32`) |
//! | 4  | width (`u32`) |
//! | 8  | height (`u32`) |
//! | 12 | driver format (`u32` fourcc) |
//! | 16 | HAL format (`i32`) |
//! | 20 | plane count (`u32`) |
//! | 24 | driver use flags (`u64`) |
//! | 32 | gralloc usage (`u64`) |
//! | 40 | total size (`u64`) |
//! | 48 | strides (`[u32; 4]`) |
//! | 64 | offsets (`[u32; 4]`) |
//! | 80 | sizes (`[u32; 4]`) |

use crate::pixel_formats::{DrmFormat, HalPixelFormat};
use crate::usage::{BoUsage, GrallocUsage};

/// Tag in the first word of every handle this allocator created.
pub const GRALLOC_MAGIC: u32 = 0xABCD_DCBA;

/// Maximum number of planes a handle describes.
pub const MAX_PLANES: usize = 4;

const MAGIC: usize = 0;
const WIDTH: usize = 4;
const HEIGHT: usize = 8;
const FORMAT: usize = 12;
const DROID_FORMAT: usize = 16;
const NUM_PLANES: usize = 20;
const USE_FLAGS: usize = 24;
const USAGE: usize = 32;
const TOTAL_SIZE: usize = 40;
const STRIDES: usize = 48;
const OFFSETS: usize = STRIDES + 4 * MAX_PLANES;
const SIZES: usize = OFFSETS + 4 * MAX_PLANES;

/// Size in bytes of an encoded handle.
pub const HANDLE_SIZE: usize = SIZES + 4 * MAX_PLANES;

fn read_u32(bytes: &[u8], offset: usize) -> Option<u32> {
    let word = bytes.get(offset..offset + 4)?;
    Some(u32::from_ne_bytes(word.try_into().ok()?))
}

fn read_u64(bytes: &[u8], offset: usize) -> Option<u64> {
    let word = bytes.get(offset..offset + 8)?;
    Some(u64::from_ne_bytes(word.try_into().ok()?))
}

/// A buffer handle whose magic tag has been checked.
///
/// This borrows the caller's bytes; nothing is copied.  Field accessors return `None` when
/// the handle is too short to contain the field, since the tag is the only structural check.
#[derive(Debug, Clone, Copy)]
pub struct GrallocHandle<'a> {
    bytes: &'a [u8],
}

/// Validates an opaque handle.
///
/// Returns `None` when there is no handle, when it is too short to carry a tag, or when the
/// tag isn't [`GRALLOC_MAGIC`].
pub fn validate(handle: Option<&[u8]>) -> Option<GrallocHandle<'_>> {
    let bytes = handle?;
    if read_u32(bytes, MAGIC)? != GRALLOC_MAGIC {
        return None;
    }
    Some(GrallocHandle { bytes })
}

impl<'a> GrallocHandle<'a> {
    /// The underlying handle bytes, the same slice that was validated.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn width(&self) -> Option<u32> {
        read_u32(self.bytes, WIDTH)
    }

    pub fn height(&self) -> Option<u32> {
        read_u32(self.bytes, HEIGHT)
    }

    pub fn format(&self) -> Option<DrmFormat> {
        read_u32(self.bytes, FORMAT).map(DrmFormat)
    }

    pub fn droid_format(&self) -> Option<HalPixelFormat> {
        read_u32(self.bytes, DROID_FORMAT).map(|f| HalPixelFormat(f as i32))
    }

    pub fn num_planes(&self) -> Option<u32> {
        read_u32(self.bytes, NUM_PLANES)
    }

    pub fn use_flags(&self) -> Option<BoUsage> {
        read_u64(self.bytes, USE_FLAGS).map(BoUsage::from_bits_retain)
    }

    pub fn usage(&self) -> Option<GrallocUsage> {
        read_u64(self.bytes, USAGE).map(GrallocUsage::from_bits_retain)
    }

    pub fn total_size(&self) -> Option<u64> {
        read_u64(self.bytes, TOTAL_SIZE)
    }

    /// Stride of `plane` in bytes.  `None` past [`MAX_PLANES`].
    pub fn stride(&self, plane: usize) -> Option<u32> {
        self.plane_field(STRIDES, plane)
    }

    pub fn offset(&self, plane: usize) -> Option<u32> {
        self.plane_field(OFFSETS, plane)
    }

    pub fn size(&self, plane: usize) -> Option<u32> {
        self.plane_field(SIZES, plane)
    }

    fn plane_field(&self, base: usize, plane: usize) -> Option<u32> {
        if plane >= MAX_PLANES {
            return None;
        }
        read_u32(self.bytes, base + 4 * plane)
    }
}

/// The fields of a handle, for the side that creates handles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandleFields {
    pub width: u32,
    pub height: u32,
    pub format: u32,
    pub droid_format: i32,
    pub num_planes: u32,
    pub use_flags: u64,
    pub usage: u64,
    pub total_size: u64,
    pub strides: [u32; MAX_PLANES],
    pub offsets: [u32; MAX_PLANES],
    pub sizes: [u32; MAX_PLANES],
}

impl HandleFields {
    /// Encodes a tagged handle in the layout [`validate`] accepts.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HANDLE_SIZE);
        out.extend_from_slice(&GRALLOC_MAGIC.to_ne_bytes());
        out.extend_from_slice(&self.width.to_ne_bytes());
        out.extend_from_slice(&self.height.to_ne_bytes());
        out.extend_from_slice(&self.format.to_ne_bytes());
        out.extend_from_slice(&self.droid_format.to_ne_bytes());
        out.extend_from_slice(&self.num_planes.to_ne_bytes());
        out.extend_from_slice(&self.use_flags.to_ne_bytes());
        out.extend_from_slice(&self.usage.to_ne_bytes());
        out.extend_from_slice(&self.total_size.to_ne_bytes());
        for plane in [&self.strides, &self.offsets, &self.sizes] {
            for v in plane {
                out.extend_from_slice(&v.to_ne_bytes());
            }
        }
        debug_assert_eq!(out.len(), HANDLE_SIZE);
        out
    }
}
