//! In-memory fake flash area.
//!
//! Grounded on spec.md §9's design note ("inject in tests with an in-memory
//! fake that records every operation for replay/injection tests") and built
//! in the teacher's `SimFlash` shape (read/write/erase-size triad, NOR-style
//! write-into-erased-cells-only semantics), but implemented directly against
//! [`storage::Flash`] instead of `embedded_storage::nor_flash`, since that's
//! what `boot` is built on throughout.

use storage::{check_erase, check_read, check_write, Error, Flash, ReadFlash, Result};

/// One flash-area primitive call, recorded for crash-injection tests that
/// want to assert "a reset at operation N" against a concrete op count
/// rather than a byte offset.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Op {
    Write { offset: usize, len: usize },
    /// One erase *block* within a (possibly multi-block) erase call -- so a
    /// crash can be injected mid-erase, which matters for the backward-erase
    /// invariant (spec.md §9, I4, P5).
    EraseBlock { offset: usize },
}

/// An in-memory flash area with NOR-style write-into-erased-cells-only
/// semantics and optional crash injection.
pub struct FakeArea {
    buffer: Vec<u8>,
    read_size: usize,
    write_size: usize,
    erase_size: usize,
    erased_val: u8,
    pub log: Vec<Op>,
    /// If set, the `n`th mutating primitive (write, or one erase block)
    /// fails as though the device reset before it ran; the buffer is left
    /// exactly as it was after the `n - 1`th.
    crash_after: Option<usize>,
}

impl FakeArea {
    pub fn new(capacity: usize, erase_size: usize, write_size: usize, read_size: usize) -> Self {
        FakeArea {
            buffer: vec![0xffu8; capacity],
            read_size,
            write_size,
            erase_size,
            erased_val: 0xff,
            log: Vec::new(),
            crash_after: None,
        }
    }

    /// Fills the whole area with `val`, bypassing the erased-cell check --
    /// for setting up a test's starting flash contents.
    pub fn fill(&mut self, val: u8) {
        self.buffer.fill(val);
    }

    /// Writes `bytes` at `offset` directly, bypassing alignment and
    /// erased-cell checks -- for seeding a test's starting flash contents
    /// with data that doesn't happen to be write-unit aligned.
    pub fn write_raw(&mut self, offset: usize, bytes: &[u8]) {
        self.buffer[offset..offset + bytes.len()].copy_from_slice(bytes);
    }

    pub fn bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Clones this area's buffer and geometry into a fresh, uncrashed
    /// `FakeArea` -- the "device survives the reset" half of a crash-inject
    /// test: build the crashed area, assert it errored, then resume on a
    /// clone with `crash_after` cleared.
    pub fn resume(&self) -> FakeArea {
        FakeArea {
            buffer: self.buffer.clone(),
            read_size: self.read_size,
            write_size: self.write_size,
            erase_size: self.erase_size,
            erased_val: self.erased_val,
            log: Vec::new(),
            crash_after: None,
        }
    }

    pub fn set_crash_after(&mut self, n: usize) {
        self.crash_after = Some(n);
    }

    pub fn ops_done(&self) -> usize {
        self.log.len()
    }

    fn tick(&mut self, op: Op) -> Result<()> {
        self.log.push(op);
        if let Some(limit) = self.crash_after {
            if self.log.len() > limit {
                return Err(Error::NotWritten);
            }
        }
        Ok(())
    }
}

impl ReadFlash for FakeArea {
    fn read_size(&self) -> usize {
        self.read_size
    }

    fn capacity(&self) -> usize {
        self.buffer.len()
    }

    fn erased_val(&self) -> u8 {
        self.erased_val
    }

    fn read(&mut self, offset: usize, bytes: &mut [u8]) -> Result<()> {
        check_read(self, offset, bytes.len())?;
        bytes.copy_from_slice(&self.buffer[offset..offset + bytes.len()]);
        Ok(())
    }
}

impl Flash for FakeArea {
    fn write_size(&self) -> usize {
        self.write_size
    }

    fn erase_size(&self) -> usize {
        self.erase_size
    }

    fn write(&mut self, offset: usize, bytes: &[u8]) -> Result<()> {
        check_write(self, offset, bytes.len())?;
        if self.buffer[offset..offset + bytes.len()].iter().any(|&b| b != self.erased_val) {
            return Err(Error::NotErased);
        }
        self.tick(Op::Write { offset, len: bytes.len() })?;
        self.buffer[offset..offset + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    fn erase(&mut self, from: usize, to: usize, backward: bool) -> Result<()> {
        check_erase(self, from, to)?;
        let step = self.erase_size;

        if backward {
            let mut cur = to;
            while cur > from {
                let start = cur - step;
                self.tick(Op::EraseBlock { offset: start })?;
                self.buffer[start..cur].fill(self.erased_val);
                cur = start;
            }
        } else {
            let mut cur = from;
            while cur < to {
                self.tick(Op::EraseBlock { offset: cur })?;
                self.buffer[cur..cur + step].fill(self.erased_val);
                cur += step;
            }
        }
        Ok(())
    }
}
