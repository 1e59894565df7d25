//! Trailer layout calculator (C2).
//!
//! Computes where, within a slot or within scratch, each trailer field
//! lives, and how much of the image's usable size must be sacrificed so the
//! scratch trailer and the tail of the payload can coexist in scratch at
//! once. Grounded directly on `boot_get_first_trailer_sector`,
//! `get_first_trailer_sector_end_off`, and `app_max_size_adjust_to_trailer`
//! in `swap_scratch.c`.

use crate::slot::SectorLayout;

/// Size, in bytes, of the trailer's magic field.
pub const MAGIC_SIZE: u32 = 16;

/// Number of write-unit-sized encryption key slots carried in the trailer
/// when image encryption is enabled.
const ENC_KEY_SLOTS: u32 = 2;

fn enc_key_units() -> u32 {
    if cfg!(feature = "enc-images") {
        ENC_KEY_SLOTS
    } else {
        0
    }
}

/// Total size of a slot's trailer, given the write unit and the number of
/// status cells the status area must hold (`windows * BOOT_STATUS_STATE_COUNT`).
///
/// Field order from the end of the slot: magic, image-ok, copy-done,
/// swap-info, swap-size, enc-keys, status area (spec.md §3).
pub fn boot_trailer_sz(write_unit: u32, status_cells: u32) -> u32 {
    MAGIC_SIZE
        + write_unit * (4 + enc_key_units())
        + write_unit * status_cells
}

/// Size of the compressed trailer image carried in scratch while the
/// trailer-bearing window is being swapped: every field except the full
/// status area, which is reduced to the `BOOT_STATUS_STATE_COUNT - 1` cells
/// needed to track the rest of that one window (spec.md §4.5, state
/// STATE_2 step 3).
pub fn boot_scratch_trailer_sz(write_unit: u32) -> u32 {
    let state_count = crate::config::BOOT_STATUS_STATE_COUNT as u32;
    MAGIC_SIZE + write_unit * (4 + enc_key_units()) + write_unit * (state_count - 1)
}

/// Byte offset of the first status cell within a trailer-bearing area of
/// size `area_size`. The status area sits immediately below whichever field
/// is otherwise last before it (the encryption keys when present, else
/// swap-size), not simply `status_cells` units below the area's end.
pub fn boot_status_off(area_size: u32, write_unit: u32, status_cells: u32) -> u32 {
    let fields_above_status = 4 + enc_key_units();
    area_size - MAGIC_SIZE - write_unit * fields_above_status - write_unit * status_cells
}

/// Absolute offsets of each field within a trailer-bearing area of size
/// `area_size`.
#[derive(Debug, Clone, Copy)]
pub struct TrailerOffsets {
    pub magic: u32,
    pub image_ok: u32,
    pub copy_done: u32,
    pub swap_info: u32,
    pub swap_size: u32,
    pub enc_key: [u32; 2],
    pub status: u32,
}

pub fn trailer_offsets(area_size: u32, write_unit: u32, status_cells: u32) -> TrailerOffsets {
    let magic = area_size - MAGIC_SIZE;
    let image_ok = magic - write_unit;
    let copy_done = image_ok - write_unit;
    let swap_info = copy_done - write_unit;
    let swap_size = swap_info - write_unit;
    // enc0/enc1 only occupy real trailer space when enc-images is enabled;
    // with it disabled the status area sits directly below swap_size.
    let (enc0, enc1, keys_end) = if enc_key_units() > 0 {
        let enc0 = swap_size - write_unit;
        let enc1 = enc0 - write_unit;
        (enc0, enc1, enc1)
    } else {
        (swap_size, swap_size, swap_size)
    };
    let status = keys_end - write_unit * status_cells;

    TrailerOffsets {
        magic,
        image_ok,
        copy_done,
        swap_info,
        swap_size,
        enc_key: [enc0, enc1],
        status,
    }
}

/// Starting from the last sector, accumulate sector sizes until the running
/// total is at least `trailer_sz`; return the earliest sector index that's
/// still needed (`boot_get_first_trailer_sector`).
pub fn first_trailer_sector(layout: &SectorLayout, trailer_sz: u32) -> usize {
    let mut idx = layout.num_sectors() - 1;
    let mut acc = layout.sector_size(idx);
    while acc < trailer_sz {
        idx -= 1;
        acc += layout.sector_size(idx);
    }
    idx
}

/// Absolute offset at which the first trailer sector ends
/// (`get_first_trailer_sector_end_off`).
pub fn first_trailer_sector_end_off(layout: &SectorLayout, trailer_sz: u32) -> u32 {
    let idx = first_trailer_sector(layout, trailer_sz);
    layout.sector_off(idx) + layout.sector_size(idx)
}

/// Largest image size that leaves room for both slots' trailers and any
/// scratch padding (`app_max_size_adjust_to_trailer`).
pub fn app_max_size_adjust_to_trailer(
    primary: &SectorLayout,
    secondary: &SectorLayout,
    slot_size: u32,
    write_unit: u32,
    status_cells: u32,
) -> u32 {
    let trailer_sz = boot_trailer_sz(write_unit, status_cells);
    let slot_trailer_off = slot_size - trailer_sz;

    let primary_end = first_trailer_sector_end_off(primary, trailer_sz);
    let secondary_end = first_trailer_sector_end_off(secondary, trailer_sz);

    // The slot-compatibility rule guarantees the larger sector contains an
    // integer number of the smaller one, so the larger of the two ends is
    // the common boundary both slots share.
    let common_end = primary_end.max(secondary_end);

    let trailer_in_first_sector = common_end - slot_trailer_off;

    let scratch_trailer_sz = boot_scratch_trailer_sz(write_unit);
    let padding = scratch_trailer_sz.saturating_sub(trailer_in_first_sector);

    slot_size - trailer_sz - padding
}
