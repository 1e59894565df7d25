//! Header-during-swap reader (C7).
//!
//! Ported from the slot-resolution branch of `boot_read_image_header` in
//! `swap_scratch.c`: a window mid-copy can have a slot's header physically
//! sitting somewhere other than its nominal slot.

use crate::config::{BOOT_STATUS_IDX_0, BOOT_STATUS_STATE_1, BOOT_STATUS_STATE_2};
use crate::plan::find_swap_count;
use crate::slot::{SectorLayout, Slot};
use crate::status::BootStatus;

/// Where a slot's image header can currently be read from.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum HeaderLocation {
    Primary,
    Secondary,
    Scratch,
}

impl Slot {
    fn nominal_location(self) -> HeaderLocation {
        match self {
            Slot::Primary => HeaderLocation::Primary,
            Slot::Secondary => HeaderLocation::Secondary,
        }
    }
}

/// Resolves where `slot`'s image header currently lives, given the recovered
/// boot status and the sector geometry used to size the plan.
pub fn header_location(
    slot: Slot,
    bs: &BootStatus,
    primary: &SectorLayout,
    secondary: &SectorLayout,
    scratch_sz: u32,
) -> HeaderLocation {
    if bs.is_reset() {
        return slot.nominal_location();
    }

    let n_windows = find_swap_count(primary, secondary, scratch_sz, bs.swap_size);
    let k = bs.idx - BOOT_STATUS_IDX_0;

    if k >= n_windows {
        // Every window has been exchanged; both slots' images now hold the
        // other slot's original contents.
        return slot.other().nominal_location();
    }

    if k == n_windows - 1 {
        // The trailer-bearing (first-processed) window is mid-copy.
        match slot {
            Slot::Secondary if bs.state >= BOOT_STATUS_STATE_1 => return HeaderLocation::Scratch,
            Slot::Primary if bs.state >= BOOT_STATUS_STATE_2 => return HeaderLocation::Secondary,
            _ => {}
        }
    }

    slot.nominal_location()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BOOT_STATUS_STATE_0;

    fn layouts() -> (SectorLayout, SectorLayout) {
        (SectorLayout::uniform(4096, 8), SectorLayout::uniform(4096, 8))
    }

    #[test]
    fn reset_state_is_always_nominal() {
        let (primary, secondary) = layouts();
        let bs = BootStatus::default();
        assert_eq!(header_location(Slot::Primary, &bs, &primary, &secondary, 4096), HeaderLocation::Primary);
        assert_eq!(header_location(Slot::Secondary, &bs, &primary, &secondary, 4096), HeaderLocation::Secondary);
    }

    /// P6: once every window has been exchanged, both slots hold each
    /// other's original image.
    #[test]
    fn fully_swapped_windows_flip_nominal_slot() {
        let (primary, secondary) = layouts();
        let bs = BootStatus {
            idx: BOOT_STATUS_IDX_0 + 8,
            state: BOOT_STATUS_STATE_0,
            swap_size: 32 * 1024,
            ..BootStatus::default()
        };
        assert_eq!(header_location(Slot::Primary, &bs, &primary, &secondary, 4096), HeaderLocation::Secondary);
        assert_eq!(header_location(Slot::Secondary, &bs, &primary, &secondary, 4096), HeaderLocation::Primary);
    }

    #[test]
    fn last_window_mid_copy_secondary_reads_from_scratch() {
        let (primary, secondary) = layouts();
        let bs = BootStatus {
            idx: BOOT_STATUS_IDX_0 + 7,
            state: BOOT_STATUS_STATE_1,
            swap_size: 32 * 1024,
            ..BootStatus::default()
        };
        assert_eq!(header_location(Slot::Secondary, &bs, &primary, &secondary, 4096), HeaderLocation::Scratch);
        assert_eq!(header_location(Slot::Primary, &bs, &primary, &secondary, 4096), HeaderLocation::Primary);
    }

    #[test]
    fn last_window_mid_copy_primary_reads_from_secondary_once_state_2() {
        let (primary, secondary) = layouts();
        let bs = BootStatus {
            idx: BOOT_STATUS_IDX_0 + 7,
            state: crate::config::BOOT_STATUS_STATE_2,
            swap_size: 32 * 1024,
            ..BootStatus::default()
        };
        assert_eq!(header_location(Slot::Primary, &bs, &primary, &secondary, 4096), HeaderLocation::Secondary);
    }

    #[test]
    fn non_last_window_in_progress_is_still_nominal() {
        let (primary, secondary) = layouts();
        let bs = BootStatus {
            idx: BOOT_STATUS_IDX_0 + 3,
            state: crate::config::BOOT_STATUS_STATE_2,
            swap_size: 32 * 1024,
            ..BootStatus::default()
        };
        assert_eq!(header_location(Slot::Primary, &bs, &primary, &secondary, 4096), HeaderLocation::Primary);
        assert_eq!(header_location(Slot::Secondary, &bs, &primary, &secondary, 4096), HeaderLocation::Secondary);
    }
}
