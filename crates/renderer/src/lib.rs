//! Map rendering for sea-ice rasters.
//!
//! - Segmented linear colour maps for thickness and anomaly
//! - Raster colouring with optional crop and integer upscaling
//! - PNG encoding with the title in a text chunk

pub mod colormap;
pub mod error;
pub mod png;
pub mod render;

pub use colormap::{ColorLut, SegmentedColormap, LUT_SIZE};
pub use error::{RenderError, RenderResult};
pub use render::{render_map, CropWindow, Image, MapRenderer, RenderOptions, MAX_SCALE};
