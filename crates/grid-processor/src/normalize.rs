//! Final per-mode value clean-up before rendering.

use seaice_common::{Cell, DisplayMode, ModeLimits, Raster};
use tracing::debug;

/// Counters describing one normalisation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeStats {
    /// Values hidden for being too close to zero (or NaN).
    pub hidden: usize,
    /// Values pulled back into the display range.
    pub clamped: usize,
}

/// Hides near-zero values and clamps the rest inside the display range.
///
/// The outermost part of the range (`clamp_factor..1` of `max`) is left
/// free so the colour map can reserve it for out-of-range values.
#[derive(Debug, Clone, Copy)]
pub struct RangeNormalizer {
    mode: DisplayMode,
    limits: ModeLimits,
    clamp_factor: f64,
}

impl RangeNormalizer {
    pub fn new(mode: DisplayMode, limits: ModeLimits, clamp_factor: f64) -> Self {
        Self {
            mode,
            limits,
            clamp_factor,
        }
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    pub fn limits(&self) -> ModeLimits {
        self.limits
    }

    /// Largest magnitude a value cell can have after normalisation.
    pub fn ceiling(&self) -> f64 {
        self.clamp_factor * self.limits.max
    }

    /// Normalise one cell.
    pub fn normalize_cell(&self, cell: Cell) -> Cell {
        let Cell::Value(v) = cell else {
            return cell;
        };

        let visible = match self.mode {
            DisplayMode::Thickness => v >= self.limits.hide_threshold,
            DisplayMode::Anomaly => v.abs() >= self.limits.hide_threshold,
        };
        // NaN fails both comparisons above
        if !visible {
            return Cell::Hidden;
        }

        let ceiling = self.ceiling();
        let v = match self.mode {
            DisplayMode::Thickness => v.min(ceiling),
            DisplayMode::Anomaly => v.clamp(-ceiling, ceiling),
        };
        Cell::Value(v)
    }

    /// Normalise every cell of `raster` in place.
    pub fn apply(&self, raster: &mut Raster) -> NormalizeStats {
        let mut stats = NormalizeStats::default();
        for cell in raster.cells_mut() {
            let before = *cell;
            let after = self.normalize_cell(before);
            match (before, after) {
                (Cell::Value(_), Cell::Hidden) => stats.hidden += 1,
                (Cell::Value(a), Cell::Value(b)) if a != b => stats.clamped += 1,
                _ => {}
            }
            *cell = after;
        }

        debug!(
            mode = %self.mode,
            hidden = stats.hidden,
            clamped = stats.clamped,
            "Normalized raster"
        );

        stats
    }

    /// Numeric value handed to a colour map, `None` for hidden cells.
    ///
    /// Land maps to the bottom of the range: `0` for thickness and `-max`
    /// for anomaly.
    pub fn display_value(&self, cell: Cell) -> Option<f64> {
        match cell {
            Cell::Land => Some(self.mode.land_value(self.limits.max)),
            Cell::Hidden => None,
            Cell::Value(v) => Some(v),
        }
    }
}
