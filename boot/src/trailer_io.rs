//! Trailer accessors (§6's required read/write primitives), built generically
//! over any `storage::Flash` and the field offsets computed in [`crate::trailer`].
//!
//! A fixed, non-erased sentinel byte marks a written flag/status cell; the
//! remainder of a write-unit buffer is filled with the same sentinel so the
//! whole unit round-trips through flash that only programs whole write
//! units at a time.

use crate::error::{flash, Result};
use crate::status::{FlagValue, Magic, SwapType, TrailerSnapshot, FLAG_SET, GOOD_MAGIC};
use crate::trailer::TrailerOffsets;

/// Largest supported write unit (spec.md §6: 1, 2, 4, 8, or 16 bytes).
const MAX_WRITE_UNIT: usize = 16;

fn unit_buf(write_unit: u32, value: u8) -> [u8; MAX_WRITE_UNIT] {
    let mut buf = [value; MAX_WRITE_UNIT];
    // Unused tail bytes beyond write_unit are never written (the slice
    // passed to `flash.write` is truncated by the caller), so their value
    // here is irrelevant.
    let _ = write_unit;
    buf
}

fn write_unit_field<F: storage::Flash>(flash_dev: &mut F, off: u32, write_unit: u32, value: u8) -> Result<()> {
    let buf = unit_buf(write_unit, value);
    flash!(flash_dev.write(off as usize, &buf[..write_unit as usize]))?;
    Ok(())
}

fn read_unit_field<F: storage::Flash>(flash_dev: &mut F, off: u32) -> Result<u8> {
    let mut byte = [0u8; 1];
    flash!(flash_dev.read(off as usize, &mut byte))?;
    Ok(byte[0])
}

pub fn write_magic<F: storage::Flash>(flash_dev: &mut F, offs: &TrailerOffsets) -> Result<()> {
    flash!(flash_dev.write(offs.magic as usize, &GOOD_MAGIC))?;
    Ok(())
}

pub fn read_magic<F: storage::Flash>(flash_dev: &mut F, offs: &TrailerOffsets) -> Result<Magic> {
    let mut bytes = [0u8; 16];
    flash!(flash_dev.read(offs.magic as usize, &mut bytes))?;
    Ok(Magic::read(&bytes, flash_dev.erased_val()))
}

pub fn write_image_ok<F: storage::Flash>(flash_dev: &mut F, offs: &TrailerOffsets, write_unit: u32) -> Result<()> {
    write_unit_field(flash_dev, offs.image_ok, write_unit, FLAG_SET)
}

pub fn read_image_ok<F: storage::Flash>(flash_dev: &mut F, offs: &TrailerOffsets) -> Result<FlagValue> {
    let byte = read_unit_field(flash_dev, offs.image_ok)?;
    Ok(FlagValue::read(byte, flash_dev.erased_val()))
}

pub fn write_copy_done<F: storage::Flash>(flash_dev: &mut F, offs: &TrailerOffsets, write_unit: u32) -> Result<()> {
    write_unit_field(flash_dev, offs.copy_done, write_unit, FLAG_SET)
}

pub fn read_copy_done<F: storage::Flash>(flash_dev: &mut F, offs: &TrailerOffsets) -> Result<FlagValue> {
    let byte = read_unit_field(flash_dev, offs.copy_done)?;
    Ok(FlagValue::read(byte, flash_dev.erased_val()))
}

fn pack_swap_info(swap_type: SwapType, image_index: u8) -> u8 {
    let ty = match swap_type {
        SwapType::None => 0u8,
        SwapType::Test => 1,
        SwapType::Perm => 2,
        SwapType::Revert => 3,
    };
    (ty & 0x0f) | ((image_index & 0x0f) << 4)
}

fn unpack_swap_info(byte: u8) -> (SwapType, u8) {
    let ty = match byte & 0x0f {
        1 => SwapType::Test,
        2 => SwapType::Perm,
        3 => SwapType::Revert,
        _ => SwapType::None,
    };
    (ty, (byte >> 4) & 0x0f)
}

pub fn write_swap_info<F: storage::Flash>(
    flash_dev: &mut F,
    offs: &TrailerOffsets,
    write_unit: u32,
    swap_type: SwapType,
    image_index: u8,
) -> Result<()> {
    write_unit_field(flash_dev, offs.swap_info, write_unit, pack_swap_info(swap_type, image_index))
}

pub fn read_swap_info<F: storage::Flash>(flash_dev: &mut F, offs: &TrailerOffsets) -> Result<(SwapType, u8)> {
    let byte = read_unit_field(flash_dev, offs.swap_info)?;
    if byte == flash_dev.erased_val() {
        return Ok((SwapType::None, 0));
    }
    Ok(unpack_swap_info(byte))
}

pub fn write_swap_size<F: storage::Flash>(flash_dev: &mut F, offs: &TrailerOffsets, write_unit: u32, size: u32) -> Result<()> {
    let bytes = size.to_le_bytes();
    let mut buf = unit_buf(write_unit, flash_dev.erased_val());
    buf[..4].copy_from_slice(&bytes);
    flash!(flash_dev.write(offs.swap_size as usize, &buf[..write_unit as usize]))?;
    Ok(())
}

pub fn read_swap_size<F: storage::Flash>(flash_dev: &mut F, offs: &TrailerOffsets) -> Result<u32> {
    let mut buf = [0u8; 4];
    flash!(flash_dev.read(offs.swap_size as usize, &mut buf))?;
    Ok(u32::from_le_bytes(buf))
}

#[cfg(feature = "enc-images")]
pub fn write_enc_key<F: storage::Flash>(flash_dev: &mut F, offs: &TrailerOffsets, slot: usize, key: &[u8; 16]) -> Result<()> {
    flash!(flash_dev.write(offs.enc_key[slot] as usize, key))?;
    Ok(())
}

#[cfg(feature = "enc-images")]
pub fn read_enc_key<F: storage::Flash>(flash_dev: &mut F, offs: &TrailerOffsets, slot: usize) -> Result<[u8; 16]> {
    let mut key = [0u8; 16];
    flash!(flash_dev.read(offs.enc_key[slot] as usize, &mut key))?;
    Ok(key)
}

/// Read all the fields the status-source decision table and swap engine
/// need from one trailer.
pub fn read_trailer_snapshot<F: storage::Flash>(
    flash_dev: &mut F,
    offs: &TrailerOffsets,
) -> Result<TrailerSnapshot> {
    let magic = read_magic(flash_dev, offs)?;
    let copy_done = read_copy_done(flash_dev, offs)?;
    let image_ok = read_image_ok(flash_dev, offs)?;
    let (swap_type, image_index) = read_swap_info(flash_dev, offs)?;
    let swap_size = read_swap_size(flash_dev, offs)?;

    Ok(TrailerSnapshot { magic, copy_done, image_ok, swap_type, image_index, swap_size })
}

/// Erase every sector that (wholly or partly) holds the trailer, so a fresh
/// trailer can be written into it (`swap_scramble_trailer_sectors`).
pub fn scramble_trailer_sectors<F: storage::Flash>(
    flash_dev: &mut F,
    layout: &crate::slot::SectorLayout,
    trailer_sz: u32,
) -> Result<()> {
    let first = crate::trailer::first_trailer_sector(layout, trailer_sz);
    let from = layout.sector_off(first);
    let to = layout.total_size();
    flash!(flash_dev.erase(from as usize, to as usize, false))?;
    Ok(())
}
