//! Flash styles.
//!
//! Various microcontrollers have various types of flash memory available to
//! them. These presets name the same device families the teacher's simulator
//! shipped, now building [`crate::FakeArea`] instead of the old
//! `embedded_storage`-based `SimFlash`.

use crate::FakeArea;

/// The configuration of a single flash area.
pub struct AreaLayout {
    pub read_size: usize,
    pub write_size: usize,
    pub erase_size: usize,
    pub sectors: usize,
}

impl AreaLayout {
    pub fn capacity(&self) -> usize {
        self.erase_size * self.sectors
    }

    pub fn build(&self) -> FakeArea {
        FakeArea::new(self.capacity(), self.erase_size, self.write_size, self.read_size)
    }
}

/// STM32F4-style. A small number of relatively large, uniform sectors; the
/// image and trailer must fit entirely within a single secondary sector.
pub static STM32F_MAIN: AreaLayout = AreaLayout {
    read_size: 1,
    write_size: 8,
    erase_size: 128 * 1024,
    sectors: 2,
};
pub static STM32F_UPGRADE: AreaLayout = AreaLayout {
    read_size: 1,
    write_size: 8,
    erase_size: 128 * 1024,
    sectors: 1,
};

/// K64-style. Small uniform sectors.
pub static K64_MAIN: AreaLayout = AreaLayout {
    read_size: 1,
    write_size: 8,
    erase_size: 4 * 1024,
    sectors: 128 / 4 + 1,
};
pub static K64_UPGRADE: AreaLayout = AreaLayout {
    read_size: 1,
    write_size: 8,
    erase_size: 4 * 1024,
    sectors: 128 / 4 + 1,
};

/// External-flash style, with a large write alignment on the upgrade side.
pub static EXT_MAIN: AreaLayout = AreaLayout {
    read_size: 1,
    write_size: 4,
    erase_size: 4 * 1024,
    sectors: 128 / 4,
};
pub static EXT_UPGRADE: AreaLayout = AreaLayout {
    read_size: 1,
    write_size: 256,
    erase_size: 4 * 1024,
    sectors: 128 / 4,
};

/// Page-style devices, based on the LPC55S69.
pub static LPC_MAIN: AreaLayout = AreaLayout {
    read_size: 1,
    write_size: 512,
    erase_size: 512,
    sectors: 128 * 2,
};
pub static LPC_UPGRADE: AreaLayout = AreaLayout {
    read_size: 1,
    write_size: 512,
    erase_size: 512,
    sectors: 128 * 2,
};

/// Another large-write style, based on the STM32H745.
pub static STM32H_MAIN: AreaLayout = AreaLayout {
    read_size: 1,
    write_size: 32,
    erase_size: 128 * 1024,
    sectors: 4,
};
pub static STM32H_UPGRADE: AreaLayout = AreaLayout {
    read_size: 1,
    write_size: 32,
    erase_size: 128 * 1024,
    sectors: 3,
};

/// All of the device-family pairs, `(main, upgrade)`.
pub static ALL_FLASHES: [(&AreaLayout, &AreaLayout); 5] = [
    (&STM32F_MAIN, &STM32F_UPGRADE),
    (&K64_MAIN, &K64_UPGRADE),
    (&EXT_MAIN, &EXT_UPGRADE),
    (&LPC_MAIN, &LPC_UPGRADE),
    (&STM32H_MAIN, &STM32H_UPGRADE),
];

/// Builds each device-family pair of flash areas in turn.
pub fn all_flashes() -> impl Iterator<Item = (FakeArea, FakeArea)> {
    ALL_FLASHES.iter().map(|(a, b)| (a.build(), b.build()))
}
