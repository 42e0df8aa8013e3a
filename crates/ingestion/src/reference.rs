//! Loading of the static reference files.
//!
//! All reference data are plain comma-separated numeric matrices:
//!
//! - `landmask_nsidc.csv`: the NSIDC polar land mask, with a one-cell frame
//!   that is trimmed on load
//! - `lat.csv` / `lon.csv`: coordinates of every source sample
//! - `cryosat-smos-avg-{S}-to-{S+9}-{MMDD}.csv`: ten-year average thickness
//!   for one calendar day, in millimetres

use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};
use grid_processor::ReferenceData;
use seaice_common::{baseline_start_year, CoordinateGrid, LandMask, ScalarField, BASELINE_YEARS};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::{IngestionError, Result};

/// How land is encoded in a land-mask file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaskEncoding {
    /// Non-zero cells are ocean, zero cells land (the NSIDC file).
    #[default]
    OceanIsOne,
    /// Non-zero cells are land, zero cells ocean.
    LandIsOne,
}

impl MaskEncoding {
    fn is_land(&self, value: f64) -> bool {
        match self {
            Self::OceanIsOne => value == 0.0,
            Self::LandIsOne => value != 0.0,
        }
    }
}

/// Locations of the reference files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferencePaths {
    pub land_mask: PathBuf,
    pub latitude: PathBuf,
    pub longitude: PathBuf,
    /// Directory holding the historical average files.
    pub historical_dir: PathBuf,
    pub mask_encoding: MaskEncoding,
    /// Width of the frame trimmed from every side of the land mask.
    pub mask_border: usize,
}

impl Default for ReferencePaths {
    fn default() -> Self {
        Self {
            land_mask: PathBuf::from("landmask_nsidc.csv"),
            latitude: PathBuf::from("lat.csv"),
            longitude: PathBuf::from("lon.csv"),
            historical_dir: PathBuf::from("data/avg"),
            mask_encoding: MaskEncoding::OceanIsOne,
            mask_border: 1,
        }
    }
}

impl ReferencePaths {
    /// Resolve every relative path against `base`.
    pub fn relative_to(mut self, base: &Path) -> Self {
        for path in [
            &mut self.land_mask,
            &mut self.latitude,
            &mut self.longitude,
            &mut self.historical_dir,
        ] {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
        self
    }

    /// Load land mask and coordinates into shared reference data.
    #[instrument(skip(self))]
    pub fn load(&self) -> Result<ReferenceData> {
        let mask = load_land_mask(&self.land_mask, self.mask_encoding, self.mask_border)?;
        let coords = load_coordinate_grids(&self.latitude, &self.longitude)?;
        info!(
            mask_size = mask.size(),
            ocean_cells = mask.ocean_cells(),
            source_rows = coords.rows,
            source_cols = coords.cols,
            "Loaded reference data"
        );
        Ok(ReferenceData::new(mask, coords)?)
    }

    /// Path of the historical average file for `date`.
    pub fn historical_average_path(&self, date: NaiveDate) -> PathBuf {
        self.historical_dir.join(historical_average_file_name(date))
    }
}

/// Parse a comma-separated numeric matrix. Blank lines are ignored; `nan`
/// is accepted.
pub fn parse_csv_matrix(text: &str, file: &str) -> Result<Vec<Vec<f64>>> {
    let mut rows: Vec<Vec<f64>> = Vec::new();

    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let row = line
            .split(',')
            .map(|field| {
                let field = field.trim();
                field.parse::<f64>().map_err(|_| {
                    IngestionError::parse(
                        file,
                        format!("line {}: '{}' is not a number", line_no + 1, field),
                    )
                })
            })
            .collect::<Result<Vec<f64>>>()?;

        if let Some(first) = rows.first() {
            if first.len() != row.len() {
                return Err(IngestionError::parse(
                    file,
                    format!(
                        "line {}: expected {} columns, found {}",
                        line_no + 1,
                        first.len(),
                        row.len()
                    ),
                ));
            }
        }
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(IngestionError::parse(file, "no data"));
    }
    Ok(rows)
}

/// Read and parse a CSV matrix. A missing file is `NotFound`.
pub fn read_csv_matrix(path: &Path) -> Result<Vec<Vec<f64>>> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            IngestionError::NotFound(path.display().to_string())
        } else {
            IngestionError::FileRead(e)
        }
    })?;
    let rows = parse_csv_matrix(&text, &path.display().to_string())?;
    debug!(
        path = %path.display(),
        rows = rows.len(),
        cols = rows[0].len(),
        "Read CSV matrix"
    );
    Ok(rows)
}

/// Build a land mask from a raw matrix, dropping `border` cells on every side.
pub fn land_mask_from_matrix(
    rows: &[Vec<f64>],
    encoding: MaskEncoding,
    border: usize,
) -> Result<LandMask> {
    let n = rows.len();
    if rows.iter().any(|r| r.len() != n) {
        return Err(IngestionError::InvalidReference(format!(
            "land mask must be square, got {} rows of {} columns",
            n,
            rows.first().map_or(0, Vec::len)
        )));
    }
    if n <= 2 * border {
        return Err(IngestionError::InvalidReference(format!(
            "land mask of side {} is too small for a border of {}",
            n, border
        )));
    }

    let trimmed: Vec<Vec<bool>> = rows[border..n - border]
        .iter()
        .map(|row| {
            row[border..n - border]
                .iter()
                .map(|&v| encoding.is_land(v))
                .collect()
        })
        .collect();

    Ok(LandMask::from_rows(&trimmed)?)
}

/// Load the land mask file.
pub fn load_land_mask(path: &Path, encoding: MaskEncoding, border: usize) -> Result<LandMask> {
    let rows = read_csv_matrix(path)?;
    land_mask_from_matrix(&rows, encoding, border)
}

/// Load the latitude and longitude matrices of the source grid.
pub fn load_coordinate_grids(lat_path: &Path, lon_path: &Path) -> Result<CoordinateGrid> {
    let lat = read_csv_matrix(lat_path)?;
    let lon = read_csv_matrix(lon_path)?;

    let shape = |m: &[Vec<f64>]| (m.len(), m[0].len());
    if shape(&lat) != shape(&lon) {
        return Err(IngestionError::InvalidReference(format!(
            "latitude grid is {:?} but longitude grid is {:?}",
            shape(&lat),
            shape(&lon)
        )));
    }

    let (rows, cols) = shape(&lat);
    Ok(CoordinateGrid::new(rows, cols, lat.concat(), lon.concat())?)
}

/// File name of the historical average for the calendar day of `date`.
pub fn historical_average_file_name(date: NaiveDate) -> String {
    let start = baseline_start_year(date);
    format!(
        "cryosat-smos-avg-{}-to-{}-{:02}{:02}.csv",
        start,
        start + BASELINE_YEARS - 1,
        date.month(),
        date.day()
    )
}

/// Load a historical average field and check it matches the raster size.
pub fn load_historical_average(path: &Path, expected_size: usize) -> Result<ScalarField> {
    let rows = read_csv_matrix(path)?;
    let size = rows.len();
    if size != expected_size || rows[0].len() != expected_size {
        return Err(IngestionError::InvalidReference(format!(
            "{} is {}x{}, expected {}x{}",
            path.display(),
            size,
            rows[0].len(),
            expected_size,
            expected_size
        )));
    }
    Ok(ScalarField::new(size, rows.concat())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::{temp_test_dir, write_csv_matrix};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_csv_matrix() {
        let rows = parse_csv_matrix("1,2,3\n4, 5 ,nan\n\n", "t.csv").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][1], 5.0);
        assert!(rows[1][2].is_nan());
    }

    #[test]
    fn test_parse_csv_errors() {
        assert!(matches!(
            parse_csv_matrix("1,2\n3,x\n", "t.csv"),
            Err(IngestionError::Parse { .. })
        ));
        assert!(parse_csv_matrix("1,2\n3\n", "t.csv").is_err());
        assert!(parse_csv_matrix("\n", "t.csv").is_err());
    }

    #[test]
    fn test_mask_border_trim_and_encoding() {
        let raw = vec![
            vec![9.0, 9.0, 9.0, 9.0, 9.0],
            vec![9.0, 0.0, 1.0, 0.0, 9.0],
            vec![9.0, 1.0, 1.0, 1.0, 9.0],
            vec![9.0, 0.0, 1.0, 0.0, 9.0],
            vec![9.0, 9.0, 9.0, 9.0, 9.0],
        ];
        let mask = land_mask_from_matrix(&raw, MaskEncoding::OceanIsOne, 1).unwrap();
        assert_eq!(mask.size(), 3);
        assert!(mask.is_land(0, 0));
        assert!(!mask.is_land(1, 1));
        assert_eq!(mask.ocean_cells(), 5);

        let inverted = land_mask_from_matrix(&raw, MaskEncoding::LandIsOne, 1).unwrap();
        assert!(!inverted.is_land(0, 0));
        assert!(inverted.is_land(0, 1));
    }

    #[test]
    fn test_even_mask_rejected() {
        let raw = vec![vec![1.0; 4]; 4];
        assert!(land_mask_from_matrix(&raw, MaskEncoding::OceanIsOne, 0).is_err());
    }

    #[test]
    fn test_historical_file_name() {
        assert_eq!(
            historical_average_file_name(ymd(2024, 1, 5)),
            "cryosat-smos-avg-2014-to-2023-0105.csv"
        );
        assert_eq!(
            historical_average_file_name(ymd(2023, 11, 20)),
            "cryosat-smos-avg-2013-to-2022-1120.csv"
        );
    }

    #[test]
    fn test_load_reference_files() {
        let dir = temp_test_dir();
        let mask = write_csv_matrix(
            dir.path(),
            "mask.csv",
            &[
                vec![0.0, 0.0, 0.0, 0.0, 0.0],
                vec![0.0, 0.0, 1.0, 0.0, 0.0],
                vec![0.0, 1.0, 1.0, 1.0, 0.0],
                vec![0.0, 0.0, 1.0, 0.0, 0.0],
                vec![0.0, 0.0, 0.0, 0.0, 0.0],
            ],
        );
        let lat = write_csv_matrix(dir.path(), "lat.csv", &[vec![90.0, 89.5]]);
        let lon = write_csv_matrix(dir.path(), "lon.csv", &[vec![0.0, 45.0]]);

        let paths = ReferencePaths {
            land_mask: mask,
            latitude: lat,
            longitude: lon,
            ..ReferencePaths::default()
        };
        let reference = paths.load().unwrap();
        assert_eq!(reference.raster_size(), 3);
        assert_eq!(reference.center(), 1.0);
        assert_eq!(reference.coords().cols, 2);
    }

    #[test]
    fn test_mismatched_coordinates_rejected() {
        let dir = temp_test_dir();
        let lat = write_csv_matrix(dir.path(), "lat.csv", &[vec![90.0, 89.5]]);
        let lon = write_csv_matrix(dir.path(), "lon.csv", &[vec![0.0], vec![1.0]]);
        assert!(matches!(
            load_coordinate_grids(&lat, &lon),
            Err(IngestionError::InvalidReference(_))
        ));
    }

    #[test]
    fn test_historical_average_missing_and_wrong_size() {
        let dir = temp_test_dir();
        let paths = ReferencePaths {
            historical_dir: dir.path().to_path_buf(),
            ..ReferencePaths::default()
        };
        let date = ymd(2024, 2, 1);
        let err = load_historical_average(&paths.historical_average_path(date), 3).unwrap_err();
        assert!(err.is_not_found());

        let path = write_csv_matrix(
            dir.path(),
            &historical_average_file_name(date),
            &[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0], vec![7.0, 8.0, 9.0]],
        );
        let field = load_historical_average(&path, 3).unwrap();
        assert_eq!(field.get(1, 2), 6.0);
        assert!(load_historical_average(&path, 5).is_err());
    }

    #[test]
    fn test_relative_paths_resolved() {
        let paths = ReferencePaths::default().relative_to(Path::new("/srv/seaice"));
        assert_eq!(paths.latitude, PathBuf::from("/srv/seaice/lat.csv"));
        assert_eq!(paths.historical_dir, PathBuf::from("/srv/seaice/data/avg"));
    }
}
