//! Storage for rendered sea-ice maps.
//!
//! Rendered PNGs are kept in an object store (a local directory by default)
//! so that a map for a given date and mode is only produced once:
//!
//! ```text
//! {root}/thickness/2024/cryosat-smos-thickness-20240115.png
//! {root}/anomaly/2024/cryosat-smos-thickness-anomaly-20240115.png
//! ```

pub mod cache;
pub mod object_store;

pub use self::object_store::ImageCache;
pub use cache::CacheKey;
