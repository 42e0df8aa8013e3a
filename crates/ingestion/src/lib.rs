//! Source and reference data acquisition for sea-ice maps.
//!
//! Provides the collaborators the processing pipeline needs from the
//! outside world:
//!
//! - Fetching the daily CryoSat-SMOS product from a local mirror or an
//!   HTTP archive, following a revision preference policy
//! - Loading the land mask, coordinate grids and historical averages
//!
//! Decoding of the product itself lives in `netcdf-parser`.

pub mod error;
pub mod reference;
pub mod source;

// Re-exports
pub use error::{IngestionError, Result};
pub use reference::{
    historical_average_file_name, land_mask_from_matrix, load_coordinate_grids,
    load_historical_average, load_land_mask, parse_csv_matrix, read_csv_matrix, MaskEncoding,
    ReferencePaths,
};
pub use source::{
    fetch_with_policy, remote_path, remote_subfolder, source_file_name, HttpArchive,
    LocalArchive, Revision, RevisionPolicy, SourceFetcher,
};
