//! NetCDF reader for the CryoSat-SMOS sea-ice thickness product.
//!
//! The product is a daily NetCDF-4 file holding the merged CryoSat-2/SMOS
//! thickness analysis on the 25 km EASE2 north grid. Only one variable is
//! needed, `analysis_sea_ice_thickness`, shaped `[time, yc, xc]`; band 0 of
//! the leading dimension is returned as a [`SourceGrid`].
//!
//! # Implementation Notes
//!
//! [`NcdumpReader`] uses the `ncdump` command-line tool and needs nothing but
//! the netCDF utilities on the `PATH`. With the `native` feature enabled,
//! [`NativeReader`] links libnetcdf directly and is much faster.

pub mod error;
pub mod ncdump;
#[cfg(feature = "native")]
pub mod native;

use std::path::Path;

use seaice_common::SourceGrid;

pub use error::{NetCdfError, NetCdfResult};
pub use ncdump::{parse_variable_dump, NcdumpReader};
#[cfg(feature = "native")]
pub use native::{silence_hdf5_errors, NativeReader};

/// Variable holding the thickness analysis, in metres.
pub const THICKNESS_VARIABLE: &str = "analysis_sea_ice_thickness";

/// Reads one gridded variable from a NetCDF file.
pub trait SourceReader: Send + Sync {
    /// Read band 0 of `variable`. Fill values become NaN.
    fn read_variable(&self, path: &Path, variable: &str) -> NetCdfResult<SourceGrid>;

    /// Read the thickness analysis.
    fn read_thickness(&self, path: &Path) -> NetCdfResult<SourceGrid> {
        self.read_variable(path, THICKNESS_VARIABLE)
    }
}

/// Reader used when no preference is given: native when compiled in,
/// otherwise `ncdump`.
pub fn default_reader() -> Box<dyn SourceReader> {
    #[cfg(feature = "native")]
    {
        Box::new(NativeReader::new())
    }
    #[cfg(not(feature = "native"))]
    {
        Box::new(NcdumpReader::default())
    }
}

/// Keep band 0 of a `[.., rows, cols]` value block.
pub(crate) fn first_band(
    variable: &str,
    shape: &[usize],
    mut values: Vec<f32>,
) -> NetCdfResult<SourceGrid> {
    if shape.len() < 2 {
        return Err(NetCdfError::InvalidFormat(format!(
            "{} has {} dimensions, expected at least 2",
            variable,
            shape.len()
        )));
    }
    let total: usize = shape.iter().product();
    if values.len() != total {
        return Err(NetCdfError::InvalidFormat(format!(
            "{} declares {} values but {} were read",
            variable,
            total,
            values.len()
        )));
    }

    let rows = shape[shape.len() - 2];
    let cols = shape[shape.len() - 1];
    values.truncate(rows * cols);
    SourceGrid::new(rows, cols, values).map_err(|e| NetCdfError::InvalidFormat(e.to_string()))
}

/// Apply CF packing attributes to every non-missing value.
pub(crate) fn unpack(values: &mut [f32], scale_factor: Option<f32>, add_offset: Option<f32>) {
    if scale_factor.is_none() && add_offset.is_none() {
        return;
    }
    let scale = scale_factor.unwrap_or(1.0);
    let offset = add_offset.unwrap_or(0.0);
    for v in values.iter_mut().filter(|v| !v.is_nan()) {
        *v = *v * scale + offset;
    }
}
