//! Nearest-neighbour gap filling.
//!
//! Ocean cells that received no sample copy the value of the nearest cell
//! that did, searching outward in rings of increasing Manhattan distance.
//! All lookups read a snapshot taken before any cell is written, so a filled
//! value never propagates into a second gap.

use seaice_common::{Cell, Raster};
use tracing::debug;

/// Largest ring distance searched by default.
pub const DEFAULT_MAX_RADIUS: usize = 9;

/// Counters describing one fill pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FillStats {
    /// Hidden cells that received a neighbour's value.
    pub filled: usize,
    /// Hidden cells with no usable neighbour in range.
    pub unfilled: usize,
}

/// Value of the nearest usable neighbour of `(x, y)` within `max_radius`.
///
/// Rings are visited from distance 1 outward; within ring `r` the step
/// `k = 0..r` probes, in this order,
///
/// ```text
/// (x + k,     y + r - k)
/// (x + r - k, y - k)
/// (x - k,     y - r + k)
/// (x - r + k, y + k)
/// ```
///
/// and the first in-bounds value cell with a non-zero value wins.
pub fn nearest_value(raster: &Raster, x: usize, y: usize, max_radius: usize) -> Option<f64> {
    let (x, y) = (x as isize, y as isize);
    for r in 1..=max_radius as isize {
        for k in 0..r {
            let probes = [
                (x + k, y + r - k),
                (x + r - k, y - k),
                (x - k, y - r + k),
                (x - r + k, y + k),
            ];
            for (px, py) in probes {
                if let Some(Cell::Value(v)) = raster.get_signed(px, py) {
                    if v != 0.0 {
                        return Some(v);
                    }
                }
            }
        }
    }
    None
}

/// Fill every hidden cell of `raster` from its nearest neighbour.
///
/// Land and value cells are left alone. Cells without a neighbour in range
/// stay hidden.
pub fn fill_gaps(raster: &mut Raster, max_radius: usize) -> FillStats {
    let snapshot = raster.clone();
    let size = raster.size();
    let mut stats = FillStats::default();

    for x in 0..size {
        for y in 0..size {
            if !snapshot.get(x, y).is_hidden() {
                continue;
            }
            match nearest_value(&snapshot, x, y, max_radius) {
                Some(v) => {
                    raster.set(x, y, Cell::Value(v));
                    stats.filled += 1;
                }
                None => stats.unfilled += 1,
            }
        }
    }

    debug!(
        filled = stats.filled,
        unfilled = stats.unfilled,
        max_radius = max_radius,
        "Filled raster gaps"
    );

    stats
}
