//! App-max-size computation (C8).
//!
//! Ported from the two `app_max_size` variants in `swap_scratch.c`: run the
//! same compatibility walk C3 does to get the usable slot size, then hand it
//! to C2's trailer-padding adjustment. Kept separate from C3 because build
//! tooling calls this on a layout already known to be compatible, without
//! wanting the `None`-on-incompatible result shape.

use crate::compat::slots_compatible;
use crate::error::{Error, Result};
use crate::slot::SectorLayout;
use crate::trailer::app_max_size_adjust_to_trailer;

/// Largest image size that leaves room for both slots' trailers and any
/// scratch padding, for a layout already known to satisfy [`crate::compat`].
pub fn app_max_size(
    primary: &SectorLayout,
    secondary: &SectorLayout,
    scratch_sz: u32,
    write_unit: u32,
    status_cells: u32,
) -> Result<u32> {
    let compat = slots_compatible(primary, secondary, scratch_sz).ok_or(Error::IncompatibleSlots)?;

    Ok(app_max_size_adjust_to_trailer(
        primary,
        secondary,
        compat.usable_size,
        write_unit,
        status_cells,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incompatible_slots_surface_as_error() {
        let primary = SectorLayout::uniform(32 * 1024, 2);
        let secondary = SectorLayout::uniform(32 * 1024, 2);
        let err = app_max_size(&primary, &secondary, 4096, 4, 24).unwrap_err();
        assert!(matches!(err, Error::IncompatibleSlots));
    }

    #[test]
    fn compatible_slots_yield_size_below_slot_total() {
        let primary = SectorLayout::uniform(4096, 8);
        let secondary = SectorLayout::uniform(4096, 8);
        let max = app_max_size(&primary, &secondary, 4096, 4, 24).unwrap();
        assert!(max < primary.total_size());
    }
}
