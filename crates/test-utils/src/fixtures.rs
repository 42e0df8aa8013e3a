//! Common land masks and rasters for sea-ice tests.

use seaice_common::{Cell, LandMask, Raster};

/// 3x3 mask with land in the corners and ocean on the centre cross.
///
/// ```text
/// 1 0 1
/// 0 0 0
/// 1 0 1
/// ```
pub fn cross_mask() -> LandMask {
    LandMask::from_rows(&[
        vec![true, false, true],
        vec![false, false, false],
        vec![true, false, true],
    ])
    .expect("valid fixture mask")
}

/// Odd-sized mask without any land.
pub fn open_ocean_mask(size: usize) -> LandMask {
    LandMask::new(size, vec![false; size * size]).expect("valid fixture mask")
}

/// Mask with ocean inside a circle of `radius` cells around the centre and
/// land outside it.
pub fn disc_mask(size: usize, radius: f64) -> LandMask {
    let c = (size - 1) as f64 / 2.0;
    let land = (0..size * size)
        .map(|i| {
            let (x, y) = ((i / size) as f64, (i % size) as f64);
            (x - c).hypot(y - c) > radius
        })
        .collect();
    LandMask::new(size, land).expect("valid fixture mask")
}

/// All-ocean raster with exactly one value cell.
pub fn single_value_raster(size: usize, x: usize, y: usize, value: f64) -> Raster {
    let mut raster = Raster::from_mask(&open_ocean_mask(size));
    raster.set(x, y, Cell::Value(value));
    raster
}

/// Raster built from nested rows of cells.
pub fn raster_from_rows(rows: &[Vec<Cell>]) -> Raster {
    Raster::from_cells(rows.len(), rows.concat()).expect("valid fixture raster")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disc_mask_has_ocean_center_and_land_corners() {
        let mask = disc_mask(11, 4.0);
        assert!(!mask.is_land(5, 5));
        assert!(mask.is_land(0, 0));
        assert!(mask.is_land(10, 10));
    }

    #[test]
    fn test_single_value_raster() {
        let raster = single_value_raster(5, 1, 3, 0.7);
        assert_eq!(raster.get(1, 3), Cell::Value(0.7));
        assert_eq!(raster.census(), (0, 24, 1));
    }
}
