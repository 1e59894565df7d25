//! Swap state machine (C6).
//!
//! Ported from `boot_swap_sectors`/`swap_run` in `swap_scratch.c`. This is
//! the one stateful component in the engine: everything else is a pure
//! function over sector geometry, but this drives real flash writes and
//! must leave a recoverable trail after every one of them.

use crate::boot_log_inf;
use crate::config::{BOOT_STATUS_STATE_0, BOOT_STATUS_STATE_1, BOOT_STATUS_STATE_2};
use crate::error::{flash, Result};
use crate::plan::Window;
use crate::slot::SectorLayout;
use crate::status::{BootStatus, STATUS_WRITTEN};
use crate::trailer::{self, TrailerOffsets};
use crate::trailer_io;
use storage::Flash;

/// Largest chunk moved through a stack buffer per `read`/`write` pair while
/// copying a region between two flash areas. Kept small and fixed since the
/// engine never allocates.
const COPY_CHUNK: usize = 256;

fn copy_region<Src: Flash, Dst: Flash>(
    src: &mut Src,
    src_off: u32,
    dst: &mut Dst,
    dst_off: u32,
    len: u32,
) -> Result<()> {
    let mut buf = [0u8; COPY_CHUNK];
    let mut done = 0u32;
    while done < len {
        let chunk = (len - done).min(COPY_CHUNK as u32) as usize;
        flash!(src.read((src_off + done) as usize, &mut buf[..chunk]))?;
        flash!(dst.write((dst_off + done) as usize, &buf[..chunk]))?;
        done += chunk as u32;
    }
    Ok(())
}

fn write_status_cell<F: Flash>(flash_dev: &mut F, status_off: u32, idx: u32, state: u8, write_unit: u32) -> Result<()> {
    let off = status_off + crate::status::cell_offset(idx, state, write_unit);
    let buf = [STATUS_WRITTEN; 16];
    flash!(flash_dev.write(off as usize, &buf[..write_unit as usize]))?;
    Ok(())
}

/// Writes the swap-size (and, if requested, swap-type/image-ok) into a
/// freshly-erased trailer, without yet writing its magic
/// (`swap_status_init`).
fn swap_status_init<F: Flash>(
    flash_dev: &mut F,
    offs: &TrailerOffsets,
    write_unit: u32,
    bs: &BootStatus,
    image_index: u8,
) -> Result<()> {
    trailer_io::write_swap_size(flash_dev, offs, write_unit, bs.swap_size)?;
    if bs.swap_type != crate::status::SwapType::None {
        trailer_io::write_swap_info(flash_dev, offs, write_unit, bs.swap_type, image_index)?;
    }
    if bs.image_ok_request {
        trailer_io::write_image_ok(flash_dev, offs, write_unit)?;
    }
    Ok(())
}

/// Everything the swap engine needs to know about the flash geometry, held
/// for the duration of one `run`.
pub struct SwapGeometry {
    pub primary_layout: SectorLayout,
    pub secondary_layout: SectorLayout,
    pub write_unit: u32,
    /// Total status cells a full (primary/secondary) trailer's status area
    /// must hold: `n_windows * BOOT_STATUS_STATE_COUNT`.
    pub status_cells: u32,
    pub image_index: u8,
}

impl SwapGeometry {
    fn trailer_sz(&self) -> u32 {
        trailer::boot_trailer_sz(self.write_unit, self.status_cells)
    }

    fn primary_offsets(&self, primary_size: u32) -> TrailerOffsets {
        trailer::trailer_offsets(primary_size, self.write_unit, self.status_cells)
    }

    fn secondary_offsets(&self, secondary_size: u32) -> TrailerOffsets {
        trailer::trailer_offsets(secondary_size, self.write_unit, self.status_cells)
    }

    fn scratch_offsets(&self, scratch_size: u32) -> TrailerOffsets {
        let state_count_minus_one = (crate::config::BOOT_STATUS_STATE_COUNT - 1) as u32;
        trailer::trailer_offsets(scratch_size, self.write_unit, state_count_minus_one)
    }
}

/// Runs (or resumes) one copy window. `primary`/`secondary`/`scratch` are
/// the three flash areas; `scratch_size` is scratch's total capacity.
#[allow(clippy::too_many_arguments)]
pub fn boot_swap_sectors<P: Flash, S: Flash, Sc: Flash>(
    window: Window,
    geo: &SwapGeometry,
    primary: &mut P,
    secondary: &mut S,
    scratch: &mut Sc,
    scratch_size: u32,
    bs: &mut BootStatus,
) -> Result<()> {
    let primary_size = geo.primary_layout.total_size();
    let secondary_size = geo.secondary_layout.total_size();
    let trailer_sz = geo.trailer_sz();

    let primary_offs = geo.primary_offsets(primary_size);
    let secondary_offs = geo.secondary_offsets(secondary_size);
    let scratch_offs = geo.scratch_offsets(scratch_size);

    let img_off = geo.primary_layout.sector_off(window.first_sector);
    let first_trailer_sector_primary = trailer::first_trailer_sector(&geo.primary_layout, trailer_sz);
    let trailer_sector_off_primary = geo.primary_layout.sector_off(first_trailer_sector_primary);

    // Trailer overlap decision (spec.md §4.5).
    let mut copy_sz = window.size;
    if img_off + window.size > trailer_sector_off_primary {
        copy_sz = primary_size - img_off - trailer_sz;
        if copy_sz > scratch_offs.status {
            copy_sz = scratch_offs.status;
        }
    }

    bs.use_scratch = bs.idx == crate::config::BOOT_STATUS_IDX_0 && copy_sz != window.size;

    boot_log_inf!(
        "swap window idx={} state={} sector={} use_scratch={}",
        bs.idx,
        bs.state,
        window.first_sector,
        bs.use_scratch
    );

    // --- STATE_0: secondary -> scratch ---
    if bs.state == BOOT_STATUS_STATE_0 {
        flash!(scratch.erase(0, scratch_size as usize, false))?;

        if bs.idx == crate::config::BOOT_STATUS_IDX_0 {
            swap_status_init(scratch, &scratch_offs, geo.write_unit, bs, geo.image_index)?;

            if !bs.use_scratch {
                trailer_io::scramble_trailer_sectors(primary, &geo.primary_layout, trailer_sz)?;
                swap_status_init(primary, &primary_offs, geo.write_unit, bs, geo.image_index)?;
                flash!(scratch.erase(0, scratch_size as usize, false))?;
            }
        }

        copy_region(secondary, img_off, scratch, 0, copy_sz)?;

        let status_off = if bs.use_scratch { scratch_offs.status } else { primary_offs.status };
        if bs.use_scratch {
            write_status_cell(scratch, status_off, bs.idx, BOOT_STATUS_STATE_0, geo.write_unit)?;
        } else {
            write_status_cell(primary, status_off, bs.idx, BOOT_STATUS_STATE_0, geo.write_unit)?;
        }
        bs.state = BOOT_STATUS_STATE_1;
    }

    // --- STATE_1: primary -> secondary ---
    if bs.state == BOOT_STATUS_STATE_1 {
        let mut erase_sz = window.size;

        if bs.idx == crate::config::BOOT_STATUS_IDX_0 {
            trailer_io::scramble_trailer_sectors(secondary, &geo.secondary_layout, trailer_sz)?;

            if bs.use_scratch {
                let trailer_sector_secondary = trailer::first_trailer_sector(&geo.secondary_layout, trailer_sz);
                let trailer_sector_off_secondary = geo.secondary_layout.sector_off(trailer_sector_secondary);
                erase_sz = trailer_sector_off_secondary - img_off;
            }
        }

        if erase_sz > 0 {
            flash!(secondary.erase(img_off as usize, (img_off + erase_sz) as usize, false))?;
        }

        copy_region(primary, img_off, secondary, img_off, copy_sz)?;

        if bs.use_scratch {
            write_status_cell(scratch, scratch_offs.status, bs.idx, BOOT_STATUS_STATE_1, geo.write_unit)?;
        } else {
            write_status_cell(primary, primary_offs.status, bs.idx, BOOT_STATUS_STATE_1, geo.write_unit)?;
        }
        bs.state = BOOT_STATUS_STATE_2;
    }

    // --- STATE_2: scratch -> primary, plus trailer finalization ---
    if bs.state == BOOT_STATUS_STATE_2 {
        let mut erase_sz = window.size;

        if bs.use_scratch {
            trailer_io::scramble_trailer_sectors(primary, &geo.primary_layout, trailer_sz)?;
            erase_sz = trailer_sector_off_primary - img_off;
        }

        if erase_sz > 0 {
            flash!(primary.erase(img_off as usize, (img_off + erase_sz) as usize, false))?;
        }

        copy_region(scratch, 0, primary, img_off, copy_sz)?;

        if bs.use_scratch {
            let persisted = ((crate::config::BOOT_STATUS_STATE_COUNT - 1) as u32) * geo.write_unit;
            copy_region(scratch, scratch_offs.status, primary, img_off + copy_sz, persisted)?;

            let snapshot = trailer_io::read_trailer_snapshot(scratch, &scratch_offs)?;
            if snapshot.image_ok == crate::status::FlagValue::Set {
                trailer_io::write_image_ok(primary, &primary_offs, geo.write_unit)?;
            }
            if snapshot.swap_type != crate::status::SwapType::None {
                trailer_io::write_swap_info(primary, &primary_offs, geo.write_unit, snapshot.swap_type, geo.image_index)?;
            }
            trailer_io::write_swap_size(primary, &primary_offs, geo.write_unit, bs.swap_size)?;
            #[cfg(feature = "enc-images")]
            {
                trailer_io::write_enc_key(primary, &primary_offs, 0, &bs.enc_keys[0])?;
                trailer_io::write_enc_key(primary, &primary_offs, 1, &bs.enc_keys[1])?;
            }
            trailer_io::write_magic(primary, &primary_offs)?;
        }

        let erase_scratch = bs.use_scratch;
        bs.use_scratch = false;

        // Scratch's status area only ever holds this window's STATE_0/STATE_1
        // cells (it has room for BOOT_STATUS_STATE_COUNT-1 of them); by the
        // time STATE_2 is durable the primary trailer is already valid (or
        // was all along, for non-trailer windows), so the completion cell
        // always lands there.
        write_status_cell(primary, primary_offs.status, bs.idx, BOOT_STATUS_STATE_2, geo.write_unit)?;
        bs.idx += 1;
        bs.state = BOOT_STATUS_STATE_0;

        if erase_scratch {
            // Backward erase: an interrupted erase must invalidate the
            // scratch magic before it zeroes the payload, or a reboot would
            // replay a partially-erased scratch trailer into primary.
            flash!(scratch.erase(0, scratch_size as usize, true))?;
        }
    }

    Ok(())
}

/// Runs the whole plan starting from `bs`'s recovered position, tail-first
/// (`swap_run`). `plan` must already be ordered high-index-first by
/// [`crate::plan::build_plan`].
pub fn swap_run<P: Flash, S: Flash, Sc: Flash>(
    plan: &[Window],
    geo: &SwapGeometry,
    primary: &mut P,
    secondary: &mut S,
    scratch: &mut Sc,
    scratch_size: u32,
    bs: &mut BootStatus,
) -> Result<()> {
    for &window in plan {
        if window.idx < bs.idx {
            continue;
        }
        boot_swap_sectors(window, geo, primary, secondary, scratch, scratch_size, bs)?;
    }

    // Every window has been exchanged and the new primary trailer is
    // durable; mark the swap complete so a reboot reads row 1 of the
    // status-source table instead of re-running it.
    let primary_offs = geo.primary_offsets(geo.primary_layout.total_size());
    trailer_io::write_copy_done(primary, &primary_offs, geo.write_unit)?;

    Ok(())
}
