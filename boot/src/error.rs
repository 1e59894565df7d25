//! Engine-wide error type.
//!
//! The C source treats flash failures and bad arguments as fatal
//! (`assert`/`BOOT_EFLASH`/`BOOT_EBADARGS`); `INCONSISTENT_STATUS` is only
//! conditionally fatal (see [`crate::config::validates_primary_slot`]), and
//! `INCOMPATIBLE_SLOTS` is reported upward as a plain boolean from
//! `boot_slots_compatible`. The `storage` crate gives every flash-area
//! implementor the same `storage::Error`, so there's no need to carry a
//! generic device-error parameter the way the teacher's `image::Error<E>`
//! does.

use crate::boot_log_err;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Error {
    /// A flash-area primitive (read/write/erase) failed. Non-recoverable at
    /// this layer (spec.md §7, `E_FLASH`).
    Flash(storage::Error),
    /// Trailer or status-area geometry was invalid (spec.md §7,
    /// `E_BADARGS`). Non-recoverable.
    BadArgs,
    /// The status journal contained a written cell after an erased one
    /// (spec.md §4.4, §7 `INCONSISTENT_STATUS`). Fatal unless
    /// `validate-primary-slot` is enabled.
    InconsistentStatus,
    /// The two slots' sector layouts can't be swapped with the available
    /// scratch size (spec.md §7 `INCOMPATIBLE_SLOTS`). Recoverable: the
    /// caller just doesn't attempt the swap.
    IncompatibleSlots,
    /// An image header or TLV didn't parse (outside the swap engine
    /// proper, kept for `Image::from_flash`).
    InvalidImage,
}

impl From<storage::Error> for Error {
    fn from(e: storage::Error) -> Self {
        Error::Flash(e)
    }
}

/// Run a flash-area call, converting its error into [`Error::Flash`] and
/// logging the failure -- mirrors `BOOT_LOG_ERR` around the C source's flash
/// primitive calls.
macro_rules! flash {
    ($e:expr) => {
        $e.map_err(|e| {
            boot_log_err!("flash operation failed");
            crate::error::Error::from(e)
        })
    };
}
pub(crate) use flash;
