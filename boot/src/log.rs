//! Internal logging shim.
//!
//! Mirrors the `BOOT_LOG_INF`/`BOOT_LOG_WRN`/`BOOT_LOG_ERR`/`BOOT_LOG_DBG`
//! call sites in `swap_scratch.c`. Rather than pick a single backend (the
//! engine is meant to run under `no_std` on hardware this crate never sees),
//! logging is routed through whichever of `log` or `defmt` the consumer has
//! enabled; with neither enabled the macros compile away to nothing.

#[cfg(feature = "defmt")]
macro_rules! boot_log_inf {
    ($($arg:tt)*) => { defmt::info!($($arg)*) };
}
#[cfg(all(feature = "log", not(feature = "defmt")))]
macro_rules! boot_log_inf {
    ($($arg:tt)*) => { log::info!($($arg)*) };
}
#[cfg(not(any(feature = "log", feature = "defmt")))]
macro_rules! boot_log_inf {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "defmt")]
macro_rules! boot_log_wrn {
    ($($arg:tt)*) => { defmt::warn!($($arg)*) };
}
#[cfg(all(feature = "log", not(feature = "defmt")))]
macro_rules! boot_log_wrn {
    ($($arg:tt)*) => { log::warn!($($arg)*) };
}
#[cfg(not(any(feature = "log", feature = "defmt")))]
macro_rules! boot_log_wrn {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "defmt")]
macro_rules! boot_log_err {
    ($($arg:tt)*) => { defmt::error!($($arg)*) };
}
#[cfg(all(feature = "log", not(feature = "defmt")))]
macro_rules! boot_log_err {
    ($($arg:tt)*) => { log::error!($($arg)*) };
}
#[cfg(not(any(feature = "log", feature = "defmt")))]
macro_rules! boot_log_err {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "defmt")]
macro_rules! boot_log_dbg {
    ($($arg:tt)*) => { defmt::debug!($($arg)*) };
}
#[cfg(all(feature = "log", not(feature = "defmt")))]
macro_rules! boot_log_dbg {
    ($($arg:tt)*) => { log::debug!($($arg)*) };
}
#[cfg(not(any(feature = "log", feature = "defmt")))]
macro_rules! boot_log_dbg {
    ($($arg:tt)*) => {};
}

pub(crate) use boot_log_dbg;
pub(crate) use boot_log_err;
pub(crate) use boot_log_inf;
pub(crate) use boot_log_wrn;
