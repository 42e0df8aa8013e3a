//! Reading variables through the `ncdump` command-line tool.
//!
//! `ncdump -v <var>` prints the CDL header followed by the data of the
//! requested variable:
//!
//! ```text
//! dimensions:
//!     time = UNLIMITED ; // (1 currently)
//!     yc = 432 ;
//!     xc = 432 ;
//! variables:
//!     float analysis_sea_ice_thickness(time, yc, xc) ;
//!         analysis_sea_ice_thickness:_FillValue = NaNf ;
//! data:
//!
//!  analysis_sea_ice_thickness =
//!   _, _, 0.12, 0.4, ...
//!   ... ;
//! }
//! ```
//!
//! Fill values print as `_`. Everything below is plain text parsing so it can
//! be tested without the tool installed.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;

use seaice_common::SourceGrid;
use tracing::debug;

use crate::{first_band, unpack, NetCdfError, NetCdfResult, SourceReader};

/// [`SourceReader`] backed by the `ncdump` executable.
#[derive(Debug, Clone)]
pub struct NcdumpReader {
    program: PathBuf,
}

impl Default for NcdumpReader {
    fn default() -> Self {
        Self {
            program: PathBuf::from("ncdump"),
        }
    }
}

impl NcdumpReader {
    /// Use a specific `ncdump` binary.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn dump(&self, path: &Path, variable: &str) -> NetCdfResult<String> {
        let output = Command::new(&self.program)
            .arg("-v")
            .arg(variable)
            .arg("-p")
            .arg("9,17") // High precision
            .arg(path)
            .output()
            .map_err(|e| NetCdfError::CommandError(format!("Failed to run ncdump: {}", e)))?;

        if !output.status.success() {
            return Err(NetCdfError::CommandError(format!(
                "ncdump failed: {}",
                String::from_utf8_lossy(&output.stderr)
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl SourceReader for NcdumpReader {
    fn read_variable(&self, path: &Path, variable: &str) -> NetCdfResult<SourceGrid> {
        if !path.exists() {
            return Err(NetCdfError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} does not exist", path.display()),
            )));
        }
        let dump = self.dump(path, variable)?;
        let grid = parse_variable_dump(&dump, variable)?;
        debug!(
            path = %path.display(),
            variable = variable,
            rows = grid.rows,
            cols = grid.cols,
            missing = grid.values.iter().filter(|v| v.is_nan()).count(),
            "Read variable with ncdump"
        );
        Ok(grid)
    }
}

/// Parse the full `ncdump -v` output for `variable` into band 0.
pub fn parse_variable_dump(dump: &str, variable: &str) -> NetCdfResult<SourceGrid> {
    let (header, data) = dump
        .split_once("\ndata:")
        .ok_or_else(|| NetCdfError::MissingData("data section".to_string()))?;

    let dims = parse_dimensions(header)?;
    let shape = parse_variable_shape(header, variable, &dims)?;
    let mut values = parse_data_values(data, variable)?;

    let scale = parse_attribute(header, variable, "scale_factor").map(|v| v as f32);
    let offset = parse_attribute(header, variable, "add_offset").map(|v| v as f32);
    unpack(&mut values, scale, offset);

    first_band(variable, &shape, values)
}

/// Dimension lengths from the `dimensions:` block.
fn parse_dimensions(header: &str) -> NetCdfResult<HashMap<String, usize>> {
    let mut dims = HashMap::new();
    let mut in_block = false;

    for line in header.lines() {
        let trimmed = line.trim();
        if trimmed == "dimensions:" {
            in_block = true;
            continue;
        }
        if !in_block {
            continue;
        }
        if trimmed.ends_with(':') {
            break;
        }
        let Some((name, rest)) = trimmed.split_once('=') else {
            continue;
        };
        let rest = rest.trim();
        // "UNLIMITED ; // (1 currently)"
        let len_str = if rest.starts_with("UNLIMITED") {
            rest.split_once('(')
                .and_then(|(_, r)| r.split_whitespace().next())
                .unwrap_or("")
        } else {
            rest.trim_end_matches(';').trim()
        };
        let len = len_str.parse().map_err(|_| {
            NetCdfError::InvalidFormat(format!("Failed to parse dimension {}", name.trim()))
        })?;
        dims.insert(name.trim().to_string(), len);
    }

    Ok(dims)
}

/// Shape of `variable` from its declaration, e.g. `float v(time, yc, xc) ;`.
fn parse_variable_shape(
    header: &str,
    variable: &str,
    dims: &HashMap<String, usize>,
) -> NetCdfResult<Vec<usize>> {
    let needle = format!(" {}(", variable);
    let line = header
        .lines()
        .find(|l| l.contains(&needle))
        .ok_or_else(|| NetCdfError::MissingData(format!("variable {}", variable)))?;

    let start = line.find(&needle).map(|i| i + needle.len()).unwrap_or(0);
    let end = line[start..]
        .find(')')
        .map(|i| start + i)
        .ok_or_else(|| NetCdfError::InvalidFormat(format!("declaration of {}", variable)))?;

    line[start..end]
        .split(',')
        .map(|name| {
            let name = name.trim();
            dims.get(name)
                .copied()
                .ok_or_else(|| NetCdfError::MissingData(format!("dimension {}", name)))
        })
        .collect()
}

/// Numeric attribute `variable:name` from the header, if present.
fn parse_attribute(header: &str, variable: &str, name: &str) -> Option<f64> {
    let pattern = format!("{}:{} = ", variable, name);
    let line = header.lines().find(|l| l.trim_start().starts_with(&pattern))?;
    let (_, value) = line.split_once('=')?;
    parse_number(value.trim().trim_end_matches(';').trim()).map(f64::from)
}

/// Values listed after `variable =` in the data section, up to the `;`.
fn parse_data_values(data: &str, variable: &str) -> NetCdfResult<Vec<f32>> {
    let marker = format!("{} =", variable);
    let start = data
        .lines()
        .position(|l| l.trim_start().starts_with(&marker))
        .ok_or_else(|| NetCdfError::MissingData(format!("{} data section", variable)))?;

    let mut values = Vec::new();
    for (i, line) in data.lines().skip(start).enumerate() {
        let mut body = line;
        if i == 0 {
            body = line.split_once('=').map(|(_, r)| r).unwrap_or("");
        }
        let (body, done) = match body.split_once(';') {
            Some((before, _)) => (before, true),
            None => (body, false),
        };

        for part in body.split(',') {
            let token = part.trim();
            if token.is_empty() {
                continue;
            }
            let value = parse_number(token).ok_or_else(|| {
                NetCdfError::InvalidFormat(format!("Failed to parse value '{}'", token))
            })?;
            values.push(value);
        }

        if done {
            return Ok(values);
        }
    }

    Err(NetCdfError::InvalidFormat(format!(
        "{} data section is not terminated",
        variable
    )))
}

/// One CDL number. `_` is the fill marker; float literals may carry an `f`.
fn parse_number(token: &str) -> Option<f32> {
    if token == "_" {
        return Some(f32::NAN);
    }
    token.trim_end_matches('f').parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DUMP: &str = "netcdf sample {
dimensions:
\ttime = UNLIMITED ; // (2 currently)
\tyc = 2 ;
\txc = 3 ;
variables:
\tint time(time) ;
\tfloat analysis_sea_ice_thickness(time, yc, xc) ;
\t\tanalysis_sea_ice_thickness:_FillValue = NaNf ;
\t\tanalysis_sea_ice_thickness:units = \"m\" ;

// global attributes:
\t\t:title = \"CS2SMOS\" ;
data:

 analysis_sea_ice_thickness =
  _, 0.12, 0.4,
  1.5, _, 2,
  9, 9, 9,
  9, 9, 9 ;
}
";

    #[test]
    fn test_parse_dimensions() {
        let (header, _) = DUMP.split_once("\ndata:").unwrap();
        let dims = parse_dimensions(header).unwrap();
        assert_eq!(dims["time"], 2);
        assert_eq!(dims["yc"], 2);
        assert_eq!(dims["xc"], 3);
    }

    #[test]
    fn test_parse_dump_first_band() {
        let grid = parse_variable_dump(DUMP, "analysis_sea_ice_thickness").unwrap();
        assert_eq!((grid.rows, grid.cols), (2, 3));
        assert!(grid.get(0, 0).is_nan());
        assert_eq!(grid.get(0, 1), 0.12);
        assert_eq!(grid.get(1, 0), 1.5);
        assert!(grid.get(1, 1).is_nan());
        assert_eq!(grid.get(1, 2), 2.0);
    }

    #[test]
    fn test_single_line_data_and_packing() {
        let dump = "netcdf s {
dimensions:
\ty = 1 ;
\tx = 2 ;
variables:
\tshort v(y, x) ;
\t\tv:scale_factor = 0.01f ;
\t\tv:add_offset = 1.f ;
data:

 v = 50, _ ;
}
";
        let grid = parse_variable_dump(dump, "v").unwrap();
        assert!((grid.get(0, 0) - 1.5).abs() < 1e-6);
        assert!(grid.get(0, 1).is_nan());
    }

    #[test]
    fn test_missing_variable() {
        let err = parse_variable_dump(DUMP, "sea_ice_concentration").unwrap_err();
        assert!(matches!(err, NetCdfError::MissingData(_)));
    }

    #[test]
    fn test_truncated_data_rejected() {
        let truncated = DUMP.replace("  9, 9, 9 ;\n", "");
        assert!(parse_variable_dump(&truncated, "analysis_sea_ice_thickness").is_err());
    }

    #[test]
    fn test_missing_file() {
        let reader = NcdumpReader::default();
        let err = reader
            .read_thickness(Path::new("/nonexistent/cs2smos.nc"))
            .unwrap_err();
        assert!(matches!(err, NetCdfError::IoError(_)));
    }
}
