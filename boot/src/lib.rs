//! Scratch-based image swap engine for an embedded MCU bootloader.
//!
//! Atomically exchanges the contents of a primary and secondary flash slot
//! through a small scratch region, resumable after a reset at any point.
//! Built around [`storage::Flash`]; the flash-area implementation, image
//! signature verification, and the outer swap/revert policy are all
//! supplied by the caller.

#![cfg_attr(not(any(feature = "std", test)), no_std)]

pub mod appsize;
pub mod compat;
pub mod config;
pub mod error;
pub mod header;
pub mod image;
mod log;
pub mod plan;
pub mod slot;
pub mod status;
pub mod swap;
pub mod trailer;
pub mod trailer_io;

pub(crate) use log::{boot_log_dbg, boot_log_err, boot_log_inf, boot_log_wrn};

pub use appsize::app_max_size;
pub use compat::{slots_compatible, Compatible};
pub use error::{Error, Result};
pub use header::{header_location, HeaderLocation};
pub use image::Image;
pub use plan::{build_plan, find_swap_count, Window};
pub use slot::{SectorLayout, Slot};
pub use status::{swap_status_source, BootStatus, StatusSource, SwapType, TrailerSnapshot};
pub use swap::{boot_swap_sectors, swap_run, SwapGeometry};
