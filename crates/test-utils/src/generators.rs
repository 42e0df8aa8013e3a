//! Generators for synthetic source samples and coordinates.
//!
//! Real coordinate grids come from the EASE2 product; these generators invert
//! the destination projection instead, so a test can decide exactly which
//! destination cell each sample hits.

use projection::PolarAzimuthal;
use seaice_common::{CoordinateGrid, SourceGrid};

/// Coordinates for a `1 x k` source grid whose `i`-th sample projects onto
/// `cells[i]` of a destination grid of side `size`.
///
/// # Panics
///
/// Panics if a cell lies beyond the reach of the projection.
pub fn coords_for_cells(size: usize, cells: &[(usize, usize)]) -> CoordinateGrid {
    let proj = PolarAzimuthal::new(size);
    let (lat, lon): (Vec<f64>, Vec<f64>) = cells
        .iter()
        .map(|&(x, y)| {
            proj.grid_to_geo(x as f64, y as f64)
                .expect("cell within projection reach")
        })
        .unzip();
    CoordinateGrid::new(1, cells.len(), lat, lon).expect("consistent generated shape")
}

/// A `1 x k` source grid holding `values`.
pub fn source_row(values: &[f32]) -> SourceGrid {
    SourceGrid::new(1, values.len(), values.to_vec()).expect("consistent generated shape")
}

/// Dense `rows x cols` coordinate grid spread evenly over a destination grid
/// of side `size`, slightly denser than the destination so that some cells
/// receive more than one sample.
pub fn dense_polar_coords(rows: usize, cols: usize, size: usize) -> CoordinateGrid {
    let proj = PolarAzimuthal::new(size);
    let span = (size - 1) as f64;
    let mut lat = Vec::with_capacity(rows * cols);
    let mut lon = Vec::with_capacity(rows * cols);
    for r in 0..rows {
        for c in 0..cols {
            let x = r as f64 * span / (rows - 1).max(1) as f64;
            let y = c as f64 * span / (cols - 1).max(1) as f64;
            let (la, lo) = proj.grid_to_geo(x, y).expect("grid within projection reach");
            lat.push(la);
            lon.push(lo);
        }
    }
    CoordinateGrid::new(rows, cols, lat, lon).expect("consistent generated shape")
}

/// Source grid with a smooth thickness field: thick ice near the pole,
/// thinning outward, and every `nan_every`-th sample missing.
pub fn thickness_field(rows: usize, cols: usize, nan_every: usize) -> SourceGrid {
    let (cr, cc) = ((rows - 1) as f32 / 2.0, (cols - 1) as f32 / 2.0);
    let max_dist = cr.hypot(cc).max(1.0);
    let values = (0..rows * cols)
        .map(|i| {
            if nan_every > 0 && i % nan_every == 0 {
                return f32::NAN;
            }
            let (r, c) = ((i / cols) as f32, (i % cols) as f32);
            let d = (r - cr).hypot(c - cc) / max_dist;
            4.0 * (1.0 - d).max(0.0)
        })
        .collect();
    SourceGrid::new(rows, cols, values).expect("consistent generated shape")
}
