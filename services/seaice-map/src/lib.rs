//! Daily sea-ice map generation.
//!
//! Ties the workspace crates together: reference data and products from
//! `ingestion`, decoding from `netcdf-parser`, processing from
//! `grid-processor`, drawing from `renderer` and caching from `storage`.

pub mod config;
pub mod service;

pub use config::AppConfig;
pub use service::{MapOutcome, MapService};
