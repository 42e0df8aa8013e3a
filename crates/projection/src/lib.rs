//! Coordinate transformations for the sea-ice grids.
//!
//! Only the north-polar azimuthal projection used by the reference land
//! mask is needed; it is implemented directly without external dependencies.

pub mod polar;

pub use polar::PolarAzimuthal;
