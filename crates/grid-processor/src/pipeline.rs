//! End-to-end processing for one map request.

use chrono::{Datelike, NaiveDate};
use seaice_common::{tie_break_seed, DisplayMode, Raster, ScalarField, SourceGrid};
use tracing::{info, instrument};

use crate::{
    combine, fill_gaps, resample, GridProcessorError, PipelineConfig, RangeNormalizer,
    ReferenceData, Result,
};

/// Processing steps bound to one set of reference data.
///
/// Cheap to construct; holds only a borrow of the reference data, so any
/// number of pipelines can run concurrently over the same reference.
#[derive(Debug, Clone)]
pub struct Pipeline<'a> {
    reference: &'a ReferenceData,
    config: PipelineConfig,
}

impl<'a> Pipeline<'a> {
    pub fn new(reference: &'a ReferenceData, config: PipelineConfig) -> Self {
        Self { reference, config }
    }

    pub fn reference(&self) -> &ReferenceData {
        self.reference
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Resample `source` with the seed for `(day_of_year, year)`.
    pub fn resample(&self, source: &SourceGrid, day_of_year: u32, year: i32) -> Result<Raster> {
        resample(source, self.reference, tie_break_seed(year, day_of_year))
    }

    /// Resample `source` and fill the gaps. Thickness path without the
    /// final normalisation.
    pub fn resample_and_fill(
        &self,
        source: &SourceGrid,
        day_of_year: u32,
        year: i32,
    ) -> Result<Raster> {
        let mut raster = self.resample(source, day_of_year, year)?;
        fill_gaps(&mut raster, self.config.max_search_radius);
        Ok(raster)
    }

    /// Subtract the historical average from a resampled raster, then fill
    /// the gaps. Anomaly path without the final normalisation.
    pub fn compute_anomaly(&self, mut current: Raster, historical: &ScalarField) -> Result<Raster> {
        if current.size() != historical.size() {
            return Err(GridProcessorError::shape_mismatch(
                format!("{0}x{0} historical average", current.size()),
                format!("{0}x{0}", historical.size()),
            ));
        }
        combine(&mut current, historical, self.config.anomaly_multiplier);
        fill_gaps(&mut current, self.config.max_search_radius);
        Ok(current)
    }

    pub fn normalizer(&self, mode: DisplayMode) -> RangeNormalizer {
        RangeNormalizer::new(mode, self.config.limits(mode), self.config.clamp_factor)
    }

    /// Display-ready thickness raster for `date`.
    #[instrument(skip_all, fields(date = %date))]
    pub fn thickness_map(&self, source: &SourceGrid, date: NaiveDate) -> Result<Raster> {
        let mut raster = self.resample_and_fill(source, date.ordinal(), date.year())?;
        let stats = self.normalizer(DisplayMode::Thickness).apply(&mut raster);
        let (land, hidden, values) = raster.census();
        info!(
            land = land,
            hidden = hidden,
            values = values,
            clamped = stats.clamped,
            "Thickness raster ready"
        );
        Ok(raster)
    }

    /// Display-ready anomaly raster for `date` against `historical`.
    #[instrument(skip_all, fields(date = %date))]
    pub fn anomaly_map(
        &self,
        source: &SourceGrid,
        historical: &ScalarField,
        date: NaiveDate,
    ) -> Result<Raster> {
        let current = self.resample(source, date.ordinal(), date.year())?;
        let mut raster = self.compute_anomaly(current, historical)?;
        let stats = self.normalizer(DisplayMode::Anomaly).apply(&mut raster);
        let (land, hidden, values) = raster.census();
        info!(
            land = land,
            hidden = hidden,
            values = values,
            clamped = stats.clamped,
            "Anomaly raster ready"
        );
        Ok(raster)
    }
}

/// Thickness path with default settings: resample, then fill gaps.
pub fn resample_and_fill(
    source: &SourceGrid,
    reference: &ReferenceData,
    day_of_year: u32,
    year: i32,
) -> Result<Raster> {
    Pipeline::new(reference, PipelineConfig::default()).resample_and_fill(source, day_of_year, year)
}

/// Anomaly path with default settings: combine with the historical average
/// (in millimetres), then fill gaps.
///
/// # Panics
///
/// Panics if the two grids differ in size.
pub fn compute_anomaly(mut current: Raster, historical: &ScalarField) -> Raster {
    let config = PipelineConfig::default();
    combine(&mut current, historical, config.anomaly_multiplier);
    fill_gaps(&mut current, config.max_search_radius);
    current
}

#[cfg(test)]
mod tests {
    use super::*;
    use seaice_common::Cell;
    use test_utils::{assert_cell_value, coords_for_cells, cross_mask, open_ocean_mask, source_row};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_thickness_map_hides_and_clamps() {
        let reference =
            ReferenceData::new(open_ocean_mask(5), coords_for_cells(5, &[(0, 0), (4, 4)])).unwrap();
        let pipeline = Pipeline::new(&reference, PipelineConfig::default());
        let raster = pipeline
            .thickness_map(&source_row(&[9.0, 0.01]), ymd(2024, 1, 10))
            .unwrap();

        assert_cell_value!(raster.get(0, 0), 4.95, 1e-12);
        // (4, 4) is below the visibility threshold
        assert_eq!(raster.get(4, 4), Cell::Hidden);
        // (0, 1) copies (0, 0) through the fill
        assert_cell_value!(raster.get(0, 1), 4.95, 1e-12);
    }

    #[test]
    fn test_anomaly_map_combines_before_fill() {
        let reference = ReferenceData::new(cross_mask(), coords_for_cells(3, &[(1, 1)])).unwrap();
        let pipeline = Pipeline::new(&reference, PipelineConfig::default());
        let mut historical = ScalarField::filled(3, 1500.0);
        historical.set(0, 1, 100.0);

        let raster = pipeline
            .anomaly_map(&source_row(&[2.0]), &historical, ymd(2024, 1, 10))
            .unwrap();

        // 2.0 - 1.5 at the centre, copied unchanged to the edges
        assert_cell_value!(raster.get(1, 1), 0.5, 1e-9);
        assert_cell_value!(raster.get(0, 1), 0.5, 1e-9);
        assert_cell_value!(raster.get(1, 0), 0.5, 1e-9);
        assert_eq!(raster.get(0, 0), Cell::Land);
    }

    #[test]
    fn test_historical_shape_checked() {
        let reference = ReferenceData::new(cross_mask(), coords_for_cells(3, &[(1, 1)])).unwrap();
        let pipeline = Pipeline::new(&reference, PipelineConfig::default());
        let current = pipeline.resample(&source_row(&[2.0]), 10, 2024).unwrap();

        let err = pipeline
            .compute_anomaly(current, &ScalarField::filled(5, 0.0))
            .unwrap_err();
        assert!(matches!(err, GridProcessorError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_free_functions_match_pipeline() {
        let reference = ReferenceData::new(cross_mask(), coords_for_cells(3, &[(1, 1)])).unwrap();
        let source = source_row(&[2.0]);
        let filled = resample_and_fill(&source, &reference, 10, 2024).unwrap();
        assert_cell_value!(filled.get(2, 1), 2.0, 1e-12);

        let pipeline = Pipeline::new(&reference, PipelineConfig::default());
        let current = pipeline.resample(&source, 10, 2024).unwrap();
        let historical = ScalarField::filled(3, 250.0);
        assert_eq!(
            compute_anomaly(current.clone(), &historical),
            pipeline.compute_anomaly(current, &historical).unwrap()
        );
    }
}
