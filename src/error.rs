// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
use nix::errno::Errno;

use crate::pixel_formats::HalPixelFormat;

/// Failure while waiting on, or releasing, a sync fence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FenceError {
    /// Both the bounded and the unbounded wait failed.
    #[error("sync wait error: {0}")]
    Wait(Errno),
    /// The wait succeeded but the descriptor could not be closed.
    #[error("unable to close fence fd: {0}")]
    Close(Errno),
}

impl FenceError {
    pub fn errno(&self) -> Errno {
        match self {
            FenceError::Wait(e) | FenceError::Close(e) => *e,
        }
    }

    /// The C status for this error: the negated errno.
    ///
    /// Both variants collapse to the same shape here, so a caller holding only the status
    /// can't tell which phase failed.
    pub fn to_status(&self) -> i32 {
        -(self.errno() as i32)
    }
}

/// A buffer request the driver can't be asked to allocate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    #[error("unsupported pixel format {0:#x}")]
    UnsupportedFormat(HalPixelFormat),
    #[error("empty buffer extent {width}x{height}")]
    EmptyExtent { width: u32, height: u32 },
    #[error("blob buffers must be 1 row tall, got {0}")]
    BlobHeight(u32),
}
