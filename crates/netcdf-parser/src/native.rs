//! Native NetCDF reading using the netcdf library.
//!
//! Much faster than spawning `ncdump` for every file. The library needs a
//! file path (it wraps libnetcdf/HDF5, which need file handles), so bytes
//! are spilled to a temp file first; on Linux that file lives in `/dev/shm`.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Once;

use seaice_common::SourceGrid;
use tracing::debug;

use crate::{first_band, unpack, NetCdfError, NetCdfResult, SourceReader};

/// Silence HDF5's automatic error printing to stderr.
///
/// The HDF5 C library prints diagnostics even for errors the Rust side
/// handles, such as probing for an optional attribute. Call early, before
/// any file is opened; repeated calls are no-ops.
pub fn silence_hdf5_errors() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        // SAFETY: H5Eset_auto2 is thread-safe and null handlers are a
        // documented way to disable error output.
        unsafe {
            hdf5_metno_sys::h5e::H5Eset_auto2(
                hdf5_metno_sys::h5e::H5E_DEFAULT,
                None,
                std::ptr::null_mut(),
            );
        }
    });
}

/// [`SourceReader`] backed by libnetcdf.
#[derive(Debug, Clone, Default)]
pub struct NativeReader;

impl NativeReader {
    pub fn new() -> Self {
        silence_hdf5_errors();
        Self
    }

    /// Read `variable` from an in-memory NetCDF file.
    pub fn read_variable_from_bytes(&self, data: &[u8], variable: &str) -> NetCdfResult<SourceGrid> {
        let temp_file = get_optimal_temp_dir().join(generate_temp_filename());

        let mut file = std::fs::File::create(&temp_file)?;
        file.write_all(data)?;
        drop(file);

        let result = self.read_variable(&temp_file, variable);
        let _ = std::fs::remove_file(&temp_file);
        result
    }
}

impl SourceReader for NativeReader {
    fn read_variable(&self, path: &Path, variable: &str) -> NetCdfResult<SourceGrid> {
        let nc_file = netcdf::open(path)
            .map_err(|e| NetCdfError::InvalidFormat(format!("Failed to open NetCDF: {}", e)))?;

        let var = nc_file
            .variable(variable)
            .ok_or_else(|| NetCdfError::MissingData(format!("{} variable", variable)))?;

        let shape: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();

        let mut values: Vec<f32> = var
            .get_values(..)
            .map_err(|e| NetCdfError::InvalidFormat(format!("Failed to read {}: {}", variable, e)))?;

        if let Some(fill) = get_f32_attr(&var, "_FillValue") {
            if !fill.is_nan() {
                for v in values.iter_mut().filter(|v| **v == fill) {
                    *v = f32::NAN;
                }
            }
        }
        unpack(
            &mut values,
            get_f32_attr(&var, "scale_factor"),
            get_f32_attr(&var, "add_offset"),
        );

        let grid = first_band(variable, &shape, values)?;
        debug!(
            path = %path.display(),
            variable = variable,
            rows = grid.rows,
            cols = grid.cols,
            "Read variable with libnetcdf"
        );
        Ok(grid)
    }
}

/// Memory-backed `/dev/shm` on Linux when writable, else the system temp dir.
fn get_optimal_temp_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        let shm_path = Path::new("/dev/shm");
        if shm_path.is_dir() {
            let test_path = shm_path.join(format!(".netcdf_test_{}", std::process::id()));
            if std::fs::write(&test_path, b"test").is_ok() {
                let _ = std::fs::remove_file(&test_path);
                return shm_path.to_path_buf();
            }
        }
    }

    std::env::temp_dir()
}

/// Unique temp file name: process ID, thread ID and a counter.
fn generate_temp_filename() -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let pid = std::process::id();
    let tid = std::thread::current().id();
    let count = COUNTER.fetch_add(1, Ordering::Relaxed);

    format!("cs2smos_native_{}_{:?}_{}.nc", pid, tid, count)
}

/// Check if a variable has an attribute with the given name.
/// This avoids HDF5 error spam when checking for optional attributes.
fn has_attr(var: &netcdf::Variable, name: &str) -> bool {
    var.attributes().any(|attr| attr.name() == name)
}

fn get_f32_attr(var: &netcdf::Variable, name: &str) -> Option<f32> {
    if !has_attr(var, name) {
        return None;
    }
    let attr_value = var.attribute_value(name)?.ok()?;
    f32::try_from(attr_value).ok()
}
