//! Storage types.
//!
//! This is the Rust shape of the flash-area capability record: a small,
//! object-safe trait standing in for `read`/`write`/`erase`/`size`/
//! `is_erased`/`write_unit`, so callers can be generic over a real NOR flash
//! driver or an in-memory fake without any dynamic dispatch overhead forced
//! on embedded targets.

#![cfg_attr(not(any(feature = "std", test)), no_std)]

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Error {
    NotAligned,
    OutOfBounds,
    NotWritten,
    NotErased,
}

pub type Result<T> = core::result::Result<T, Error>;

/// Read only interface into flash.
pub trait ReadFlash {
    /// What is the read size (alignment and size multiple).
    fn read_size(&self) -> usize;
    fn read(&mut self, offset: usize, bytes: &mut [u8]) -> Result<()>;
    fn capacity(&self) -> usize;

    /// The byte value flash reads back as after an erase (commonly 0xff for
    /// NOR flash).
    fn erased_val(&self) -> u8 {
        0xff
    }

    /// True iff every byte in `bytes` equals the erased value.
    fn is_erased(&self, bytes: &[u8]) -> bool {
        let val = self.erased_val();
        bytes.iter().all(|&b| b == val)
    }
}

/// Flash that can be written to.
pub trait Flash: ReadFlash {
    /// Write size (alignment and size multiple). Also referred to as the
    /// write unit: the minimum aligned program granularity (1, 2, 4, 8, or
    /// 16 bytes).
    fn write_size(&self) -> usize;
    /// Erase size (alignment and size multiple).
    fn erase_size(&self) -> usize;

    /// Erase `[from, to)`. When `backward` is true, the region is erased one
    /// erase-block at a time starting from the highest address, so that a
    /// reset partway through leaves the low end of the range (where a magic
    /// value typically lives) erased last and observably inconsistent rather
    /// than appearing untouched.
    fn erase(&mut self, from: usize, to: usize, backward: bool) -> Result<()>;
    fn write(&mut self, offset: usize, bytes: &[u8]) -> Result<()>;
}

// Utilities taken from embedded-storage for validating arguments.
pub fn check_read<T: ReadFlash>(
    flash: &T,
    offset: usize,
    length: usize,
) -> Result<()> {
    check_slice(flash, flash.read_size(), offset, length)
}

pub fn check_erase<T: Flash>(
    flash: &T,
    from: usize,
    to: usize,
) -> Result<()> {
    if from > to || to > flash.capacity() {
        return Err(Error::OutOfBounds);
    }
    if from % flash.erase_size() != 0 || to % flash.erase_size() != 0 {
        return Err(Error::NotAligned);
    }
    Ok(())
}

pub fn check_write<T: Flash>(
    flash: &T,
    offset: usize,
    length: usize,
) -> Result<()> {
    check_slice(flash, flash.write_size(), offset, length)
}

pub fn check_slice<T: ReadFlash>(
    flash: &T,
    align: usize,
    offset: usize,
    length: usize,
) -> Result<()> {
    if length > flash.capacity() || offset > flash.capacity() - length {
        return Err(Error::OutOfBounds);
    }
    if offset % align != 0 || length % align != 0 {
        return Err(Error::NotAligned);
    }
    Ok(())
}
