//! Status recovery / source selector (C5).
//!
//! Implements the boot-status decision table and status-area parser from
//! `swap_status_source` and `swap_read_status_bytes` in `swap_scratch.c`,
//! plus the in-RAM `bs` record from spec.md §3.

use crate::config::{
    validates_primary_slot, BOOT_STATUS_IDX_0, BOOT_STATUS_STATE_0, BOOT_STATUS_STATE_COUNT,
};
use crate::error::{Error, Result};

/// A trailer's magic field, distinguishing a steady-state trailer (`Good`)
/// from one that's never been written (`Unset`) or was corrupted (`Bad`).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Magic {
    Good,
    Unset,
    Bad,
}

/// The fixed 16-byte sentinel written as the last thing in a trailer, once
/// everything else in it is durable.
pub const GOOD_MAGIC: [u8; 16] = [
    0x77, 0xc2, 0x95, 0xf3, 0x60, 0xd2, 0xef, 0x7f, 0x35, 0x52, 0x50, 0x0f, 0x2c, 0xb6, 0x79, 0x80,
];

impl Magic {
    pub fn read(bytes: &[u8; 16], erased_val: u8) -> Magic {
        if *bytes == GOOD_MAGIC {
            Magic::Good
        } else if bytes.iter().all(|&b| b == erased_val) {
            Magic::Unset
        } else {
            Magic::Bad
        }
    }
}

/// A single-write-unit flag field (`image_ok`, `copy_done`).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FlagValue {
    Set,
    Unset,
    Bad,
}

/// The byte written into a flag field's first byte to mark it `Set`.
pub const FLAG_SET: u8 = 0x01;

/// The byte written into a status journal cell to mark it written. Distinct
/// constant from [`FLAG_SET`] even though they share a value: one marks a
/// durable boolean field, the other a journal entry.
pub const STATUS_WRITTEN: u8 = 0x01;

impl FlagValue {
    pub fn read(byte: u8, erased_val: u8) -> FlagValue {
        if byte == FLAG_SET {
            FlagValue::Set
        } else if byte == erased_val {
            FlagValue::Unset
        } else {
            FlagValue::Bad
        }
    }
}

/// Swap direction recorded in a trailer's swap-info field.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SwapType {
    None,
    Test,
    Perm,
    Revert,
}

/// The fields read from one trailer (primary or scratch) needed to run the
/// status-source decision table.
#[derive(Debug, Copy, Clone)]
pub struct TrailerSnapshot {
    pub magic: Magic,
    pub copy_done: FlagValue,
    pub image_ok: FlagValue,
    pub swap_type: SwapType,
    pub image_index: u8,
    pub swap_size: u32,
}

/// Where a partially-completed swap's status should be read from.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum StatusSource {
    /// No swap in progress.
    None,
    Primary,
    Scratch,
}

/// Walks the fixed 4-row decision table top to bottom; first match wins
/// (spec.md §4.4).
pub fn swap_status_source(
    primary: &TrailerSnapshot,
    scratch: &TrailerSnapshot,
    current_image_index: u8,
) -> StatusSource {
    // Row 1: primary GOOD, scratch not GOOD, copy-done SET -> no swap.
    if primary.magic == Magic::Good && scratch.magic != Magic::Good && primary.copy_done == FlagValue::Set {
        return StatusSource::None;
    }

    // Row 2: primary GOOD, scratch not GOOD, copy-done UNSET -> primary.
    if primary.magic == Magic::Good && scratch.magic != Magic::Good && primary.copy_done == FlagValue::Unset {
        return StatusSource::Primary;
    }

    // Row 3: scratch GOOD (any primary magic/copy-done) -> scratch, unless
    // it belongs to a different image being examined.
    if scratch.magic == Magic::Good {
        if scratch.image_index != current_image_index {
            return StatusSource::None;
        }
        return StatusSource::Scratch;
    }

    // Row 4: primary UNSET, copy-done UNSET -> primary (never swapped, or
    // mid-revert).
    if primary.magic == Magic::Unset && primary.copy_done == FlagValue::Unset {
        return StatusSource::Primary;
    }

    StatusSource::None
}

/// In-RAM record of swap progress (spec.md §3's `bs`).
#[derive(Debug, Clone, Copy)]
pub struct BootStatus {
    pub idx: u32,
    pub state: u8,
    /// Transient: true only while the current window overlaps the
    /// trailer region. Never persisted.
    pub use_scratch: bool,
    pub swap_size: u32,
    /// Swap direction requested for this run. Only meaningful at
    /// `idx == BOOT_STATUS_IDX_0`, when it's written into the destination
    /// trailer as part of `swap_status_init`; on resume it's read back from
    /// flash rather than re-decided.
    pub swap_type: SwapType,
    /// Whether the destination image should be marked `image_ok` once the
    /// swap completes (a permanent swap) rather than left pending test
    /// confirmation.
    pub image_ok_request: bool,
    /// The image's two encryption keys, already decrypted by the caller
    /// before the swap starts (outside this engine's scope). Written into
    /// the primary trailer alongside the rest of the finalized status once
    /// the trailer-bearing window completes.
    #[cfg(feature = "enc-images")]
    pub enc_keys: [[u8; 16]; 2],
}

impl Default for BootStatus {
    fn default() -> Self {
        BootStatus {
            idx: BOOT_STATUS_IDX_0,
            state: BOOT_STATUS_STATE_0,
            use_scratch: false,
            swap_size: 0,
            swap_type: SwapType::None,
            image_ok_request: false,
            #[cfg(feature = "enc-images")]
            enc_keys: [[0u8; 16]; 2],
        }
    }
}

impl BootStatus {
    /// True at the reset/no-swap-in-progress state.
    pub fn is_reset(&self) -> bool {
        self.idx == BOOT_STATUS_IDX_0 && self.state == BOOT_STATUS_STATE_0
    }
}

/// Outcome of parsing a status area.
#[derive(Debug, Clone, Copy)]
pub struct StatusParse {
    pub idx: u32,
    pub state: u8,
    /// True if a written cell was found after the forward scan had already
    /// located the resume point -- spec.md §4.4's `invalid`.
    pub inconsistent: bool,
}

/// Byte offset of cell `(idx, state)` within a status area, per spec.md §6.
pub fn cell_offset(idx: u32, state: u8, write_unit: u32) -> u32 {
    let state_count = BOOT_STATUS_STATE_COUNT as u32;
    (idx - BOOT_STATUS_IDX_0) * state_count * write_unit + (state as u32 - BOOT_STATUS_STATE_0 as u32) * write_unit
}

/// Reads the status area one write-unit cell at a time and reconstructs
/// `(idx, state)`, or `Ok(None)` if the whole area is still erased (no swap
/// recorded). Mirrors `swap_read_status_bytes`.
pub fn parse_status_area<F: storage::Flash>(
    flash: &mut F,
    status_off: u32,
    max_entries: usize,
    write_unit: u32,
) -> Result<Option<StatusParse>> {
    let mut found = false;
    let mut found_idx: Option<usize> = None;
    let mut invalid = false;

    for i in 0..max_entries {
        let mut byte = [0u8; 1];
        crate::error::flash!(flash.read(status_off as usize + i * write_unit as usize, &mut byte))?;
        let erased = flash.is_erased(&byte);

        if erased {
            if found && found_idx.is_none() {
                found_idx = Some(i);
            }
        } else if !found {
            found = true;
        } else if found_idx.is_some() {
            invalid = true;
            break;
        }
    }

    if invalid {
        crate::boot_log_wrn!("inconsistent status area at offset {}", status_off);
        // Detected inconsistent status. With primary-slot validation
        // disabled there is no way to be sure the swapped primary is OK, so
        // this is unrecoverable; with it enabled, the caller proceeds to
        // validation, which will catch a truly bad primary.
        if !validates_primary_slot() {
            return Err(Error::InconsistentStatus);
        }
    }

    if !found {
        return Ok(None);
    }

    let found_idx = found_idx.unwrap_or(max_entries);
    let state_count = BOOT_STATUS_STATE_COUNT as u32;
    let idx = (found_idx as u32 / state_count) + BOOT_STATUS_IDX_0;
    let state = (found_idx as u32 % state_count) as u8;

    Ok(Some(StatusParse { idx, state, inconsistent: invalid }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use simflash::FakeArea;

    fn snapshot(magic: Magic, copy_done: FlagValue, image_index: u8) -> TrailerSnapshot {
        TrailerSnapshot {
            magic,
            copy_done,
            image_ok: FlagValue::Unset,
            swap_type: SwapType::None,
            image_index,
            swap_size: 0,
        }
    }

    #[test]
    fn row1_good_primary_copy_done_means_no_swap() {
        let primary = snapshot(Magic::Good, FlagValue::Set, 0);
        let scratch = snapshot(Magic::Unset, FlagValue::Unset, 0);
        assert_eq!(swap_status_source(&primary, &scratch, 0), StatusSource::None);
    }

    #[test]
    fn row2_good_primary_copy_not_done_means_primary() {
        let primary = snapshot(Magic::Good, FlagValue::Unset, 0);
        let scratch = snapshot(Magic::Unset, FlagValue::Unset, 0);
        assert_eq!(swap_status_source(&primary, &scratch, 0), StatusSource::Primary);
    }

    /// S3/S4: a good scratch trailer wins regardless of primary's state.
    #[test]
    fn row3_good_scratch_wins() {
        let primary = snapshot(Magic::Good, FlagValue::Unset, 0);
        let scratch = snapshot(Magic::Good, FlagValue::Unset, 0);
        assert_eq!(swap_status_source(&primary, &scratch, 0), StatusSource::Scratch);
    }

    /// S5: multi-image downgrade -- a good scratch belonging to a different
    /// image's swap doesn't apply to the one being examined.
    #[test]
    fn row3_downgrades_to_none_for_other_image() {
        let primary = snapshot(Magic::Unset, FlagValue::Unset, 0);
        let scratch = snapshot(Magic::Good, FlagValue::Unset, 1);
        assert_eq!(swap_status_source(&primary, &scratch, 0), StatusSource::None);
    }

    #[test]
    fn row4_unset_primary_means_primary() {
        let primary = snapshot(Magic::Unset, FlagValue::Unset, 0);
        let scratch = snapshot(Magic::Unset, FlagValue::Unset, 0);
        assert_eq!(swap_status_source(&primary, &scratch, 0), StatusSource::Primary);
    }

    #[test]
    fn bad_primary_magic_with_no_scratch_match_is_none() {
        let primary = snapshot(Magic::Bad, FlagValue::Unset, 0);
        let scratch = snapshot(Magic::Unset, FlagValue::Unset, 0);
        assert_eq!(swap_status_source(&primary, &scratch, 0), StatusSource::None);
    }

    #[test]
    fn cell_offset_matches_persisted_layout_formula() {
        // (idx - IDX_0) * 3 * write_unit + (state - STATE_0) * write_unit
        assert_eq!(cell_offset(BOOT_STATUS_IDX_0, 0, 4), 0);
        assert_eq!(cell_offset(BOOT_STATUS_IDX_0, 1, 4), 4);
        assert_eq!(cell_offset(BOOT_STATUS_IDX_0, 2, 4), 8);
        assert_eq!(cell_offset(BOOT_STATUS_IDX_0 + 1, 0, 4), 12);
        assert_eq!(cell_offset(BOOT_STATUS_IDX_0 + 2, 1, 4), 28);
    }

    #[test]
    fn parse_status_area_empty_is_no_swap() {
        let mut area = FakeArea::new(4096, 4096, 4, 1);
        let parsed = parse_status_area(&mut area, 0, 9, 4).unwrap();
        assert!(parsed.is_none());
    }

    #[test]
    fn parse_status_area_finds_resume_point() {
        let mut area = FakeArea::new(4096, 4096, 4, 1);
        // Two windows' worth of cells (3 each); first window fully done,
        // second window's first sub-state done -- resume at (idx=2, state=1).
        area.write(0, &[1, 1, 1, 1]).unwrap();
        area.write(4, &[1, 1, 1, 1]).unwrap();
        area.write(8, &[1, 1, 1, 1]).unwrap();
        area.write(12, &[1, 1, 1, 1]).unwrap();

        let parsed = parse_status_area(&mut area, 0, 6, 4).unwrap().unwrap();
        assert_eq!(parsed.idx, BOOT_STATUS_IDX_0 + 1);
        assert_eq!(parsed.state, 1);
        assert!(!parsed.inconsistent);
    }

    /// S6: a written cell after an erased one is inconsistent.
    #[test]
    fn parse_status_area_detects_inconsistent_gap() {
        let mut area = FakeArea::new(4096, 4096, 4, 1);
        area.write(0, &[1, 1, 1, 1]).unwrap();
        // cell 1 left erased
        area.write(8, &[1, 1, 1, 1]).unwrap();

        let result = parse_status_area(&mut area, 0, 6, 4);
        if validates_primary_slot() {
            let parsed = result.unwrap().unwrap();
            assert!(parsed.inconsistent);
        } else {
            assert!(matches!(result, Err(Error::InconsistentStatus)));
        }
    }
}
