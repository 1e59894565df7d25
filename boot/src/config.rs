//! Compile-time configuration.
//!
//! The original C bootloader is tuned through `mcuboot_config.h` defines
//! (`MCUBOOT_SWAP_USING_SCRATCH`, `MCUBOOT_VALIDATE_PRIMARY_SLOT`,
//! `MCUBOOT_MAX_IMG_SECTORS`, ...). There's no config file or environment
//! variable story here (this crate never touches a filesystem), so the same
//! knobs are expressed as Rust consts and Cargo features instead.

/// Maximum number of sectors the compatibility analyzer will track per slot.
/// Layouts with more sectors than this are rejected outright by
/// [`crate::compat::slots_compatible`], the same as `BOOT_MAX_IMG_SECTORS` in
/// the C source.
pub const BOOT_MAX_IMG_SECTORS: usize = 128;

/// Raw storage capacity backing [`crate::slot::SectorLayout`] -- deliberately
/// wider than [`BOOT_MAX_IMG_SECTORS`] so a layout enumerated straight off
/// real hardware (which may have more sectors than the swap bookkeeping can
/// track) can still be constructed and handed to `slots_compatible` for a
/// graceful rejection, instead of panicking before the policy check ever
/// runs.
pub const SECTOR_LAYOUT_CAPACITY: usize = BOOT_MAX_IMG_SECTORS * 2;

/// Number of sub-states per swap window: secondary->scratch, primary-
/// >secondary, scratch->primary.
pub const BOOT_STATUS_STATE_COUNT: u8 = 3;

/// First valid window index. Windows are 1-based so that 0 can mean "no
/// swap in progress yet" without being a valid index.
pub const BOOT_STATUS_IDX_0: u32 = 1;

/// First valid sub-state value within a window.
pub const BOOT_STATUS_STATE_0: u8 = 0;
pub const BOOT_STATUS_STATE_1: u8 = 1;
pub const BOOT_STATUS_STATE_2: u8 = 2;

/// Whether an inconsistent status area is recoverable.
///
/// Mirrors `MCUBOOT_VALIDATE_PRIMARY_SLOT`: when unset, a detected
/// inconsistency in the status journal is treated as unrecoverable (the
/// primary slot's authenticity can't otherwise be re-established) and the
/// caller must abort. When set, the image validation step that runs anyway
/// after boot is trusted to catch a truly corrupt primary, so the engine
/// only counts the event and continues.
pub const fn validates_primary_slot() -> bool {
    cfg!(feature = "validate-primary-slot")
}
