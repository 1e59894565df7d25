//! Copy-plan generator (C4).
//!
//! Ported from `find_last_sector_idx`, `boot_copy_sz`, and `find_swap_count`
//! in `swap_scratch.c`. Windows are produced tail-first (final index down to
//! zero) so the trailer-bearing window is processed before the first sector
//! that holds the reset vector.

use crate::slot::SectorLayout;

/// One copy window: an inclusive-first, half-open-by-size primary-sector
/// range that's ≤ scratch size and shared by both slots.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Window {
    /// 1-based window index, matching `bs.idx` (`BOOT_STATUS_IDX_0 == 1`).
    pub idx: u32,
    /// Index of the first primary sector in this window.
    pub first_sector: usize,
    /// Total bytes covered by this window.
    pub size: u32,
}

/// Finds the index of the last sector in the primary slot that needs
/// swapping, given the total number of bytes (`copy_size`) that must move
/// (`find_last_sector_idx`).
pub fn find_last_sector_idx(primary: &SectorLayout, secondary: &SectorLayout, copy_size: u32) -> usize {
    let mut primary_sz: u32 = 0;
    let mut secondary_sz: u32 = 0;
    let mut last_primary = 0usize;
    let mut last_secondary = 0usize;

    loop {
        if primary_sz < copy_size || primary_sz < secondary_sz {
            primary_sz += primary.sector_size(last_primary);
            last_primary += 1;
        }
        if secondary_sz < copy_size || secondary_sz < primary_sz {
            secondary_sz += secondary.sector_size(last_secondary);
            last_secondary += 1;
        }
        if primary_sz >= copy_size && secondary_sz >= copy_size && primary_sz == secondary_sz {
            break;
        }
    }

    last_primary - 1
}

/// Walks backward from `last_sector_idx`, accumulating primary sector sizes
/// until the next sector would overflow scratch. Returns the accumulated
/// size and the inclusive first-sector index (`boot_copy_sz`).
pub fn boot_copy_sz(primary: &SectorLayout, last_sector_idx: usize, scratch_sz: u32) -> (u32, usize) {
    let mut sz: u32 = 0;
    let mut i = last_sector_idx as isize;

    while i >= 0 {
        let new_sz = sz + primary.sector_size(i as usize);
        if new_sz > scratch_sz {
            break;
        }
        sz = new_sz;
        i -= 1;
    }

    (sz, (i + 1) as usize)
}

/// The full, tail-first ordered list of copy windows for a given usable
/// `copy_size`.
pub fn build_plan(
    primary: &SectorLayout,
    secondary: &SectorLayout,
    scratch_sz: u32,
    copy_size: u32,
) -> heapless::Vec<Window, { crate::config::BOOT_MAX_IMG_SECTORS }> {
    let mut windows = heapless::Vec::new();

    let mut last_sector_idx = find_last_sector_idx(primary, secondary, copy_size) as isize;
    let mut idx = crate::config::BOOT_STATUS_IDX_0;

    while last_sector_idx >= 0 {
        let (size, first_sector) = boot_copy_sz(primary, last_sector_idx as usize, scratch_sz);
        windows
            .push(Window { idx, first_sector, size })
            .expect("too many swap windows for BOOT_MAX_IMG_SECTORS");

        last_sector_idx = first_sector as isize - 1;
        idx += 1;
    }

    windows
}

/// Number of swap operations needed to move `copy_size` bytes
/// (`find_swap_count`).
pub fn find_swap_count(primary: &SectorLayout, secondary: &SectorLayout, scratch_sz: u32, copy_size: u32) -> u32 {
    let mut last_sector_idx = find_last_sector_idx(primary, secondary, copy_size) as isize;
    let mut count = 0u32;

    while last_sector_idx >= 0 {
        let (_, first_sector) = boot_copy_sz(primary, last_sector_idx as usize, scratch_sz);
        last_sector_idx = first_sector as isize - 1;
        count += 1;
    }

    count
}
