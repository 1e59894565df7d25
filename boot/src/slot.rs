//! Slot identity and sector geometry.
//!
//! A [`SectorLayout`] records a slot's sector sizes in flash order; offsets
//! are never stored, only derived, since the C source computes them the
//! same way (`boot_img_sector_off` is a running sum over
//! `boot_img_sector_size`).

use crate::config::SECTOR_LAYOUT_CAPACITY;

/// One of the two swappable slots.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Slot {
    Primary,
    Secondary,
}

impl Slot {
    /// The other slot.
    pub fn other(self) -> Slot {
        match self {
            Slot::Primary => Slot::Secondary,
            Slot::Secondary => Slot::Primary,
        }
    }
}

/// Fixed-capacity vector of sector sizes, bounded the same way the teacher's
/// `boot::image::sizes::HashVec` bounds hash storage. Capacity is
/// [`SECTOR_LAYOUT_CAPACITY`], wider than the swap-compatibility policy limit
/// so an oversized layout can be constructed and rejected gracefully by
/// [`crate::compat::slots_compatible`] rather than refused here.
pub type SectorSizes = heapless::Vec<u32, SECTOR_LAYOUT_CAPACITY>;

/// A slot's sector list, in order from the start of the partition.
#[derive(Debug, Clone, Default)]
pub struct SectorLayout {
    sizes: SectorSizes,
}

impl SectorLayout {
    pub fn new() -> Self {
        SectorLayout { sizes: SectorSizes::new() }
    }

    /// Build a layout from explicit sector sizes.
    pub fn from_sizes(sizes: &[u32]) -> Self {
        let mut v = SectorSizes::new();
        for &s in sizes {
            v.push(s).expect("too many sectors for SECTOR_LAYOUT_CAPACITY");
        }
        SectorLayout { sizes: v }
    }

    /// Build a layout of `count` sectors, each `size` bytes.
    pub fn uniform(size: u32, count: usize) -> Self {
        let mut v = SectorSizes::new();
        for _ in 0..count {
            v.push(size).expect("too many sectors for SECTOR_LAYOUT_CAPACITY");
        }
        SectorLayout { sizes: v }
    }

    pub fn num_sectors(&self) -> usize {
        self.sizes.len()
    }

    pub fn sector_size(&self, idx: usize) -> u32 {
        self.sizes[idx]
    }

    /// Offset of sector `idx` from the start of the partition.
    pub fn sector_off(&self, idx: usize) -> u32 {
        self.sizes[..idx].iter().sum()
    }

    /// Total size of all sectors.
    pub fn total_size(&self) -> u32 {
        self.sizes.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn other_flips_slot() {
        assert_eq!(Slot::Primary.other(), Slot::Secondary);
        assert_eq!(Slot::Secondary.other(), Slot::Primary);
    }

    #[test]
    fn uniform_layout_offsets() {
        let layout = SectorLayout::uniform(4096, 4);
        assert_eq!(layout.num_sectors(), 4);
        assert_eq!(layout.sector_off(0), 0);
        assert_eq!(layout.sector_off(3), 3 * 4096);
        assert_eq!(layout.total_size(), 4 * 4096);
    }

    #[test]
    fn from_sizes_preserves_order() {
        let layout = SectorLayout::from_sizes(&[4096, 4096, 8192, 16384]);
        assert_eq!(layout.sector_size(2), 8192);
        assert_eq!(layout.sector_off(3), 4096 + 4096 + 8192);
        assert_eq!(layout.total_size(), 32768);
    }
}
