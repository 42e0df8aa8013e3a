//! Common types and utilities shared across the sea-ice map crates.

pub mod error;
pub mod grid;
pub mod mode;
pub mod time;

pub use error::{SeaIceError, SeaIceResult};
pub use grid::{Cell, CoordinateGrid, LandMask, Raster, ScalarField, SourceGrid};
pub use mode::{DisplayMode, ModeLimits};
pub use time::{
    baseline_start_year, day_of_year, first_available_date, map_title, parse_map_date,
    tie_break_seed, validate_map_date, BASELINE_YEARS,
};
