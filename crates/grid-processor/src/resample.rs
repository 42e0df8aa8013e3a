//! Projection of scattered source samples onto the destination raster.
//!
//! Every source sample is projected to a destination cell. Samples landing
//! outside the raster or on land are dropped. Several samples can land on
//! the same cell; the cell then takes the mean of all of them. Each value is
//! floored at a small date-dependent seed before averaging so that missing
//! samples (read as zero) never produce an exact-zero cell.

use seaice_common::{Cell, Raster, SourceGrid};
use tracing::debug;

use crate::{GridProcessorError, ReferenceData, Result};

/// Running mean of the samples that hit one cell.
#[derive(Debug, Clone, Copy, Default)]
struct Accumulator {
    sum: f64,
    count: u32,
}

impl Accumulator {
    fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// Counters describing one resampling pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResampleStats {
    /// Samples accumulated into an ocean cell.
    pub placed: usize,
    /// Samples whose projection fell outside the raster.
    pub out_of_bounds: usize,
    /// Samples that projected onto land.
    pub on_land: usize,
    /// Placed samples that were missing and counted as zero.
    pub missing: usize,
    /// Ocean cells that received at least one sample.
    pub cells_with_data: usize,
}

/// Resample `source` onto a fresh raster for `reference`.
///
/// `seed` floors every contribution, see [`seaice_common::tie_break_seed`].
pub fn resample(source: &SourceGrid, reference: &ReferenceData, seed: f64) -> Result<Raster> {
    resample_with_stats(source, reference, seed).map(|(raster, _)| raster)
}

/// Like [`resample`], also returning pass counters.
pub fn resample_with_stats(
    source: &SourceGrid,
    reference: &ReferenceData,
    seed: f64,
) -> Result<(Raster, ResampleStats)> {
    let coords = reference.coords();
    if !coords.matches(source) {
        return Err(GridProcessorError::shape_mismatch(
            format!("{}x{} source samples", coords.rows, coords.cols),
            format!("{}x{}", source.rows, source.cols),
        ));
    }

    let mask = reference.mask();
    let size = mask.size();
    let projection = reference.projection();
    let mut accumulators = vec![Accumulator::default(); size * size];
    let mut stats = ResampleStats::default();

    for row in 0..source.rows {
        for col in 0..source.cols {
            let (lat, lon) = coords.lat_lon(row, col);
            let Some((x, y)) = projection.project(lat, lon) else {
                stats.out_of_bounds += 1;
                continue;
            };
            if mask.is_land(x, y) {
                stats.on_land += 1;
                continue;
            }

            let raw = source.get(row, col);
            let value = if raw.is_nan() {
                stats.missing += 1;
                0.0
            } else {
                raw as f64
            };

            accumulators[x * size + y].add(value.max(seed));
            stats.placed += 1;
        }
    }

    let mut raster = reference.blank_raster();
    for (cell, acc) in raster.cells_mut().iter_mut().zip(&accumulators) {
        if let Some(mean) = acc.mean() {
            *cell = Cell::Value(mean);
            stats.cells_with_data += 1;
        }
    }

    debug!(
        placed = stats.placed,
        out_of_bounds = stats.out_of_bounds,
        on_land = stats.on_land,
        missing = stats.missing,
        cells_with_data = stats.cells_with_data,
        "Resampled source grid"
    );

    Ok((raster, stats))
}
