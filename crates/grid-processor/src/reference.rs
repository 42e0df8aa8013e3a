//! Static reference data shared by every request.

use projection::PolarAzimuthal;
use seaice_common::{CoordinateGrid, LandMask, Raster};

use crate::{GridProcessorError, Result};

/// Land mask and source coordinates, loaded once and only ever read.
///
/// The pole position is stored explicitly so that projection never depends
/// on process-wide state.
#[derive(Debug, Clone)]
pub struct ReferenceData {
    mask: LandMask,
    coords: CoordinateGrid,
    center: f64,
}

impl ReferenceData {
    pub fn new(mask: LandMask, coords: CoordinateGrid) -> Result<Self> {
        if coords.rows == 0 || coords.cols == 0 {
            return Err(GridProcessorError::InvalidReference(
                "coordinate grid is empty".to_string(),
            ));
        }
        let center = mask.center();
        Ok(Self {
            mask,
            coords,
            center,
        })
    }

    pub fn mask(&self) -> &LandMask {
        &self.mask
    }

    pub fn coords(&self) -> &CoordinateGrid {
        &self.coords
    }

    /// Raster coordinate of the pole on both axes.
    pub fn center(&self) -> f64 {
        self.center
    }

    /// Side length of every destination raster.
    pub fn raster_size(&self) -> usize {
        self.mask.size()
    }

    pub fn projection(&self) -> PolarAzimuthal {
        PolarAzimuthal::with_center(self.center, self.mask.size())
    }

    /// A fresh raster for one request.
    pub fn blank_raster(&self) -> Raster {
        Raster::from_mask(&self.mask)
    }
}
