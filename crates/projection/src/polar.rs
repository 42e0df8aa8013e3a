//! North-polar azimuthal projection onto the reference mask grid.
//!
//! The reference land mask is a square grid centred on the North Pole. A
//! point at latitude `lat` lies at a radial distance
//!
//! ```text
//! radius = 360 * sqrt(2) * sin(pi * (90 - lat) / 360)
//! ```
//!
//! cells from the centre, in the direction of its longitude. The factor is
//! calibrated so the mask's outer radius matches the coverage edge of the
//! thickness product.
//!
//! Grid coordinates are `(x, y)` with `x` the row and `y` the column:
//!
//! ```text
//! x = center + radius * cos(lon)
//! y = center + radius * sin(lon)
//! ```

use std::f64::consts::{PI, SQRT_2};

/// Radial scale in cells: `360 * sqrt(2)`.
const RADIAL_SCALE: f64 = 360.0 * SQRT_2;

/// Polar azimuthal projection for a square grid of side `size`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolarAzimuthal {
    /// Grid coordinate of the pole (same on both axes).
    pub center: f64,
    /// Grid side length.
    pub size: usize,
}

impl PolarAzimuthal {
    /// Projection for an odd-sized grid with the pole on the middle cell.
    pub fn new(size: usize) -> Self {
        Self {
            center: size.saturating_sub(1) as f64 / 2.0,
            size,
        }
    }

    /// Projection with an explicit pole position.
    pub fn with_center(center: f64, size: usize) -> Self {
        Self { center, size }
    }

    /// Distance from the pole in grid cells.
    pub fn radius(lat_deg: f64) -> f64 {
        RADIAL_SCALE * (PI * (90.0 - lat_deg) / 360.0).sin()
    }

    /// Continuous grid coordinates `(x, y)` of a geographic point.
    pub fn geo_to_grid(&self, lat_deg: f64, lon_deg: f64) -> (f64, f64) {
        let radius = Self::radius(lat_deg);
        let theta = PI * lon_deg / 180.0;
        (
            self.center + radius * theta.cos(),
            self.center + radius * theta.sin(),
        )
    }

    /// Destination cell of a geographic point, or `None` when it falls
    /// outside the grid.
    ///
    /// Halves round to even so results match the historical maps bit for bit.
    pub fn project(&self, lat_deg: f64, lon_deg: f64) -> Option<(usize, usize)> {
        let (x, y) = self.geo_to_grid(lat_deg, lon_deg);
        let x = snap(x);
        let y = snap(y);

        // NaN coordinates would otherwise cast to 0
        if !x.is_finite() || !y.is_finite() {
            return None;
        }

        let n = self.size as f64;
        if x < 0.0 || y < 0.0 || x >= n || y >= n {
            return None;
        }

        Some((x as usize, y as usize))
    }

    /// Inverse projection: geographic `(lat, lon)` of continuous grid
    /// coordinates. Longitude is in `(-180, 180]`.
    ///
    /// Returns `None` beyond the radius the forward formula can reach.
    pub fn grid_to_geo(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let dx = x - self.center;
        let dy = y - self.center;
        let radius = dx.hypot(dy);
        let ratio = radius / RADIAL_SCALE;
        if ratio > 1.0 {
            return None;
        }
        let lat = 90.0 - 360.0 * ratio.asin() / PI;
        let lon = dy.atan2(dx).to_degrees();
        Some((lat, lon))
    }
}

/// Round to the nearest cell, halves to even.
fn snap(v: f64) -> f64 {
    v.round_ties_even()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: (f64, f64), b: (f64, f64), eps: f64) -> bool {
        (a.0 - b.0).abs() < eps && (a.1 - b.1).abs() < eps
    }

    #[test]
    fn test_pole_maps_to_center() {
        let proj = PolarAzimuthal::new(359);
        for lon in [-180.0, -90.0, 0.0, 45.0, 135.0, 179.9] {
            assert_eq!(proj.project(90.0, lon), Some((179, 179)));
        }
    }

    #[test]
    fn test_projection_is_deterministic() {
        let proj = PolarAzimuthal::new(359);
        let first = proj.project(75.3, -42.1);
        for _ in 0..10 {
            assert_eq!(proj.project(75.3, -42.1), first);
        }
    }

    #[test]
    fn test_longitude_directions() {
        let proj = PolarAzimuthal::new(359);
        let r = PolarAzimuthal::radius(80.0);

        // lon 0 moves along +x, lon 90 along +y
        assert!(close(proj.geo_to_grid(80.0, 0.0), (179.0 + r, 179.0), 1e-9));
        assert!(close(proj.geo_to_grid(80.0, 90.0), (179.0, 179.0 + r), 1e-9));
    }

    #[test]
    fn test_radius_at_equator() {
        // sin(pi/4) * 360 * sqrt(2) == 360
        assert!((PolarAzimuthal::radius(0.0) - 360.0).abs() < 1e-9);
    }

    #[test]
    fn test_out_of_bounds_discarded() {
        let proj = PolarAzimuthal::new(359);
        assert_eq!(proj.project(0.0, 0.0), None);
        assert_eq!(proj.project(f64::NAN, 0.0), None);
    }

    #[test]
    fn test_round_half_to_even() {
        assert_eq!(snap(2.5), 2.0);
        assert_eq!(snap(3.5), 4.0);
        assert_eq!(snap(178.49), 178.0);
        assert_eq!(snap(178.51), 179.0);
    }

    #[test]
    fn test_projects_near_cell_centres() {
        let proj = PolarAzimuthal::new(359);
        for (x, y) in [(100.2, 200.1), (10.0, 179.0), (300.4, 40.3)] {
            let (lat, lon) = proj.grid_to_geo(x, y).unwrap();
            assert_eq!(
                proj.project(lat, lon),
                Some((x.round() as usize, y.round() as usize))
            );
        }
    }

    #[test]
    fn test_inverse_roundtrip() {
        let proj = PolarAzimuthal::new(359);
        for (lat, lon) in [(88.0, 10.0), (70.0, -120.0), (60.5, 179.0)] {
            let (x, y) = proj.geo_to_grid(lat, lon);
            let back = proj.grid_to_geo(x, y).unwrap();
            assert!(close(back, (lat, lon), 1e-9), "{:?} != {:?}", back, (lat, lon));
        }
    }
}
