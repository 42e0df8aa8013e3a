//! Grid containers for source samples, reference data and destination rasters.
//!
//! All grids are stored row-major. Destination grids are square and indexed
//! `(x, y)` where `x` is the row and `y` the column, matching the projection
//! in the `projection` crate.

use crate::{SeaIceError, SeaIceResult};

/// State of one destination raster cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell {
    /// Excluded from ever receiving data.
    Land,
    /// Ocean cell without a value: not yet filled, or hidden on purpose.
    Hidden,
    /// Thickness or anomaly value.
    Value(f64),
}

impl Cell {
    pub fn is_land(&self) -> bool {
        matches!(self, Cell::Land)
    }

    pub fn is_hidden(&self) -> bool {
        matches!(self, Cell::Hidden)
    }

    /// The numeric value, if any.
    pub fn value(&self) -> Option<f64> {
        match self {
            Cell::Value(v) => Some(*v),
            _ => None,
        }
    }
}

fn check_square(size: usize, len: usize, what: &str) -> SeaIceResult<()> {
    if size == 0 {
        return Err(SeaIceError::FormatError(format!("{} is empty", what)));
    }
    if len != size * size {
        return Err(SeaIceError::ShapeMismatch {
            expected: format!("{}x{}", size, size),
            actual: format!("{} cells", len),
        });
    }
    Ok(())
}

fn check_odd(size: usize, what: &str) -> SeaIceResult<()> {
    if size % 2 == 0 {
        return Err(SeaIceError::FormatError(format!(
            "{} side length must be odd, got {}",
            what, size
        )));
    }
    Ok(())
}

/// Reference land/ocean mask. Defines the destination raster shape.
#[derive(Debug, Clone, PartialEq)]
pub struct LandMask {
    size: usize,
    land: Vec<bool>,
}

impl LandMask {
    /// Create a mask from a row-major land flag vector.
    ///
    /// The mask must be a non-empty square with an odd side so that the pole
    /// sits exactly on the centre cell.
    pub fn new(size: usize, land: Vec<bool>) -> SeaIceResult<Self> {
        check_square(size, land.len(), "land mask")?;
        check_odd(size, "land mask")?;
        Ok(Self { size, land })
    }

    /// Build a mask from nested rows, `true` meaning land.
    pub fn from_rows(rows: &[Vec<bool>]) -> SeaIceResult<Self> {
        let size = rows.len();
        if let Some(bad) = rows.iter().find(|r| r.len() != size) {
            return Err(SeaIceError::ShapeMismatch {
                expected: format!("{} columns", size),
                actual: format!("{} columns", bad.len()),
            });
        }
        Self::new(size, rows.concat())
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Index of the centre cell, `(n - 1) / 2`.
    pub fn center(&self) -> f64 {
        (self.size - 1) as f64 / 2.0
    }

    pub fn is_land(&self, x: usize, y: usize) -> bool {
        self.land[x * self.size + y]
    }

    /// Number of ocean (eligible) cells.
    pub fn ocean_cells(&self) -> usize {
        self.land.iter().filter(|&&l| !l).count()
    }
}

/// Square destination raster of [`Cell`]s.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    size: usize,
    cells: Vec<Cell>,
}

impl Raster {
    /// Fresh raster for one request: land cells are `Land`, ocean cells `Hidden`.
    pub fn from_mask(mask: &LandMask) -> Self {
        let cells = mask
            .land
            .iter()
            .map(|&land| if land { Cell::Land } else { Cell::Hidden })
            .collect();
        Self {
            size: mask.size,
            cells,
        }
    }

    /// Build a raster from explicit cells.
    pub fn from_cells(size: usize, cells: Vec<Cell>) -> SeaIceResult<Self> {
        check_square(size, cells.len(), "raster")?;
        check_odd(size, "raster")?;
        Ok(Self { size, cells })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn center(&self) -> f64 {
        (self.size - 1) as f64 / 2.0
    }

    pub fn get(&self, x: usize, y: usize) -> Cell {
        self.cells[x * self.size + y]
    }

    /// Signed lookup; `None` outside the raster.
    pub fn get_signed(&self, x: isize, y: isize) -> Option<Cell> {
        let n = self.size as isize;
        if x < 0 || y < 0 || x >= n || y >= n {
            return None;
        }
        Some(self.get(x as usize, y as usize))
    }

    pub fn set(&mut self, x: usize, y: usize, cell: Cell) {
        self.cells[x * self.size + y] = cell;
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    /// Counts of `(land, hidden, value)` cells.
    pub fn census(&self) -> (usize, usize, usize) {
        self.cells.iter().fold((0, 0, 0), |(l, h, v), c| match c {
            Cell::Land => (l + 1, h, v),
            Cell::Hidden => (l, h + 1, v),
            Cell::Value(_) => (l, h, v + 1),
        })
    }
}

/// Square grid of plain values, e.g. a multi-year average.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarField {
    size: usize,
    values: Vec<f64>,
}

impl ScalarField {
    pub fn new(size: usize, values: Vec<f64>) -> SeaIceResult<Self> {
        check_square(size, values.len(), "scalar field")?;
        Ok(Self { size, values })
    }

    /// Field of identical values.
    pub fn filled(size: usize, value: f64) -> Self {
        Self {
            size,
            values: vec![value; size * size],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, x: usize, y: usize) -> f64 {
        self.values[x * self.size + y]
    }

    pub fn set(&mut self, x: usize, y: usize, value: f64) {
        self.values[x * self.size + y] = value;
    }
}

/// Source thickness samples (band 0 of the input dataset). NaN marks a
/// missing measurement.
#[derive(Debug, Clone)]
pub struct SourceGrid {
    pub rows: usize,
    pub cols: usize,
    pub values: Vec<f32>,
}

impl SourceGrid {
    pub fn new(rows: usize, cols: usize, values: Vec<f32>) -> SeaIceResult<Self> {
        if values.len() != rows * cols {
            return Err(SeaIceError::ShapeMismatch {
                expected: format!("{}x{}", rows, cols),
                actual: format!("{} values", values.len()),
            });
        }
        Ok(Self { rows, cols, values })
    }

    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.values[row * self.cols + col]
    }
}

/// Latitude/longitude of every source sample, in degrees.
#[derive(Debug, Clone)]
pub struct CoordinateGrid {
    pub rows: usize,
    pub cols: usize,
    pub latitude: Vec<f64>,
    pub longitude: Vec<f64>,
}

impl CoordinateGrid {
    pub fn new(
        rows: usize,
        cols: usize,
        latitude: Vec<f64>,
        longitude: Vec<f64>,
    ) -> SeaIceResult<Self> {
        for (name, len) in [("latitude", latitude.len()), ("longitude", longitude.len())] {
            if len != rows * cols {
                return Err(SeaIceError::ShapeMismatch {
                    expected: format!("{}x{} {}", rows, cols, name),
                    actual: format!("{} values", len),
                });
            }
        }
        Ok(Self {
            rows,
            cols,
            latitude,
            longitude,
        })
    }

    /// `(latitude, longitude)` of a source cell.
    pub fn lat_lon(&self, row: usize, col: usize) -> (f64, f64) {
        let idx = row * self.cols + col;
        (self.latitude[idx], self.longitude[idx])
    }

    pub fn matches(&self, source: &SourceGrid) -> bool {
        self.rows == source.rows && self.cols == source.cols
    }
}
