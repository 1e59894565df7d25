//! Slot-compatibility analyzer (C3).
//!
//! Ported directly from `boot_slots_compatible` in `swap_scratch.c`: walk
//! both sector lists in lockstep, and reject any layout where a sector on
//! one side would need to straddle *two* not-yet-matched sectors on the
//! other side.

use crate::config::BOOT_MAX_IMG_SECTORS;
use crate::slot::SectorLayout;

/// Outcome of the compatibility analysis.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Compatible {
    /// Usable slot size once both layouts are aligned to a common window
    /// boundary.
    pub usable_size: u32,
}

/// `Which` tracks which side's running total is currently behind, so we can
/// reject the case where that side would fall behind *twice* in a row
/// (meaning more than one of its sectors would need to fit inside a single
/// sector on the other side -- not supported).
#[derive(Clone, Copy, PartialEq)]
enum Which {
    Neither,
    Primary,
    Secondary,
}

/// Returns `Some(Compatible)` iff the two slots can be swapped through a
/// scratch area of `scratch_sz` bytes; `None` otherwise (spec.md §7
/// `INCOMPATIBLE_SLOTS`).
pub fn slots_compatible(
    primary: &SectorLayout,
    secondary: &SectorLayout,
    scratch_sz: u32,
) -> Option<Compatible> {
    let num_primary = primary.num_sectors();
    let num_secondary = secondary.num_sectors();

    if num_primary > BOOT_MAX_IMG_SECTORS || num_secondary > BOOT_MAX_IMG_SECTORS {
        return None;
    }

    let mut i = 0usize;
    let mut j = 0usize;
    let mut sz0: u32 = 0;
    let mut sz1: u32 = 0;
    let mut usable_size: u32 = 0;
    let mut which = Which::Neither;

    while i < num_primary || j < num_secondary {
        if sz0 == sz1 {
            sz0 += sector_or_zero(primary, i, num_primary);
            sz1 += sector_or_zero(secondary, j, num_secondary);
            i += 1;
            j += 1;
        } else if sz0 < sz1 {
            sz0 += sector_or_zero(primary, i, num_primary);
            if which == Which::Secondary {
                return None;
            }
            which = Which::Primary;
            i += 1;
        } else {
            sz1 += sector_or_zero(secondary, j, num_secondary);
            if which == Which::Primary {
                return None;
            }
            which = Which::Secondary;
            j += 1;
        }

        if sz0 == sz1 {
            usable_size += sz0;
            if sz0 > scratch_sz || sz1 > scratch_sz {
                return None;
            }
            which = Which::Neither;
            sz0 = 0;
            sz1 = 0;
        }
    }

    if i != num_primary || j != num_secondary || sz0 != sz1 {
        return None;
    }

    Some(Compatible { usable_size })
}

fn sector_or_zero(layout: &SectorLayout, idx: usize, len: usize) -> u32 {
    if idx < len {
        layout.sector_size(idx)
    } else {
        0
    }
}
