//! Resampling pipeline for polar sea-ice thickness rasters.
//!
//! Scattered source samples (the EASE2 thickness grid) are projected onto a
//! square raster aligned to a reference land mask, missing ocean cells are
//! filled from their neighbourhood, and the result is optionally differenced
//! against a multi-year average before being clamped for display.
//!
//! # Architecture
//!
//! ```text
//! SourceGrid + ReferenceData
//!      │
//!      ▼
//! resample()          project every sample, average collisions
//!      │
//!      ├─► thickness: fill_gaps()
//!      │
//!      └─► anomaly:   combine(historical) ─► fill_gaps()
//!               │
//!               ▼
//!          RangeNormalizer::apply()   hide near-zero, clamp to ±0.99·max
//!               │
//!               ▼
//!          Return to renderer
//! ```
//!
//! Everything here is synchronous and allocation-local: reference data is
//! borrowed read-only and every raster belongs to a single call.
//!
//! # Example
//!
//! ```ignore
//! use grid_processor::{Pipeline, PipelineConfig, ReferenceData};
//!
//! let reference = ReferenceData::new(mask, coords)?;
//! let pipeline = Pipeline::new(&reference, PipelineConfig::default());
//! let raster = pipeline.thickness_map(&source, date)?;
//! ```

pub mod combine;
pub mod config;
pub mod error;
pub mod fill;
pub mod normalize;
pub mod pipeline;
pub mod reference;
pub mod resample;

// Re-export commonly used types at crate root
pub use combine::combine;
pub use config::PipelineConfig;
pub use error::{GridProcessorError, Result};
pub use fill::{fill_gaps, nearest_value, FillStats, DEFAULT_MAX_RADIUS};
pub use normalize::{NormalizeStats, RangeNormalizer};
pub use pipeline::{compute_anomaly, resample_and_fill, Pipeline};
pub use reference::ReferenceData;
pub use resample::{resample, resample_with_stats, ResampleStats};
