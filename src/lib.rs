/*! gralloc_shim is the translation layer between Android's gralloc interface and a
  fourcc-based buffer allocator.

The framework speaks one vocabulary and the allocation driver speaks another:

| Concern        | Framework (gralloc)              | Driver                      | Module                    |
|----------------|----------------------------------|-----------------------------|---------------------------|
| Pixel format   | `HAL_PIXEL_FORMAT_*` integer     | DRM fourcc code             | [`pixel_formats`]         |
| Usage          | `GRALLOC_USAGE_*` bitmask        | `BO_USE_*` bitmask          | [`usage`]                 |
| Buffer handle  | opaque `buffer_handle_t`         | tagged handle layout        | [`handle`]                |
| Fences         | sync-file descriptor             | CPU access after signal     | [`sync`]                  |

Everything here is a leaf: nothing calls anything else, nothing holds state, and all of it
may be called from any thread.  The one exception to "cheap" is [`sync_wait`], which
blocks.

# Sentinels, not errors

Translation never fails.  An unknown format becomes [`DrmFormat::NONE`], an unknown usage
bit contributes nothing, and a foreign handle validates to `None`.  The caller decides what
that means; [`descriptor::BufferDescriptor::to_driver`] is the decision most callers want.

# Fences

Fence waits are the only operation that reports failure, and they do it C-style from
[`sync_wait`] (0 or a negated errno), or as a [`FenceError`] from [`sync::FenceWaiter`].

```no_run
use gralloc_shim::sync_wait;

# let acquire_fence: i32 = -1;
let status = sync_wait(acquire_fence, true);
assert_eq!(status, 0);
```
*/

pub mod descriptor;
mod error;
pub mod handle;
pub mod pixel_formats;
pub mod sync;
mod sys;
pub mod usage;

pub use error::{ConversionError, FenceError};
pub use handle::{GrallocHandle, validate};
pub use pixel_formats::{ApiLevel, DrmFormat, HalPixelFormat, format_string, translate_format};
pub use sync::{FenceWaiter, sync_wait};
pub use sys::KernelSync;
pub use usage::{BoUsage, GrallocUsage, translate_usage};
