//! Shared test utilities for the sea-ice map workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Land mask and raster fixtures
//! - Coordinate generators that place samples on chosen cells
//! - Temporary reference-data files
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{assert_approx_eq, fixtures};
//! ```

pub mod fixtures;
pub mod generators;
pub mod paths;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use generators::*;
pub use paths::*;

// Used by `assert_cell_value!`
pub use seaice_common;

/// Macro for approximate floating-point equality assertions.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(1.0001_f64, 1.0_f64, 0.001_f64); // passes
/// assert_approx_eq!(1.1_f32, 1.0_f32, 0.001_f32);    // fails
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if diff > epsilon {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}

/// Macro asserting that a raster cell holds a value close to `expected`.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_cell_value;
///
/// assert_cell_value!(raster.get(1, 1), 2.0, 1e-9);
/// ```
#[macro_export]
macro_rules! assert_cell_value {
    ($cell:expr, $expected:expr, $epsilon:expr) => {{
        match $cell {
            $crate::seaice_common::Cell::Value(v) => $crate::assert_approx_eq!(v, $expected, $epsilon),
            other => panic!(
                "assertion failed: expected Value({:?}), got {:?}",
                $expected, other
            ),
        }
    }};
}

#[cfg(test)]
mod tests {
    use seaice_common::Cell;

    #[test]
    fn test_assert_approx_eq_passes() {
        assert_approx_eq!(1.0001, 1.0, 0.001);
        assert_approx_eq!(0.0, 0.0, 0.0001);
        assert_approx_eq!(-5.5, -5.500001, 0.0001);
    }

    #[test]
    #[should_panic(expected = "assertion failed")]
    fn test_assert_approx_eq_fails() {
        assert_approx_eq!(1.1, 1.0, 0.001);
    }

    #[test]
    fn test_assert_cell_value_passes() {
        assert_cell_value!(Cell::Value(2.0000001), 2.0, 1e-6);
    }

    #[test]
    #[should_panic(expected = "expected Value")]
    fn test_assert_cell_value_rejects_hidden() {
        assert_cell_value!(Cell::Hidden, 2.0, 1e-6);
    }
}
