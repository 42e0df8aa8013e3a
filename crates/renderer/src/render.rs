//! Raster to image conversion.

use rayon::prelude::*;
use seaice_common::{Cell, DisplayMode, Raster};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::colormap::{ColorLut, SegmentedColormap};
use crate::png::{create_png, create_png_auto};
use crate::{RenderError, RenderResult};

/// Largest integer upscaling factor.
pub const MAX_SCALE: u32 = 16;

/// Margins cut from each side of the raster before drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropWindow {
    pub top: usize,
    pub bottom: usize,
    pub left: usize,
    pub right: usize,
}

impl Default for CropWindow {
    /// The region of the 25 km northern grid that holds the Arctic basin.
    fn default() -> Self {
        Self {
            top: 50,
            bottom: 90,
            left: 80,
            right: 90,
        }
    }
}

impl CropWindow {
    /// `(rows, cols)` ranges kept from a `size x size` raster.
    pub fn bounds(
        &self,
        size: usize,
    ) -> RenderResult<(std::ops::Range<usize>, std::ops::Range<usize>)> {
        if self.top + self.bottom >= size || self.left + self.right >= size {
            return Err(RenderError::InvalidCrop {
                window: self.to_string(),
                size,
            });
        }
        Ok((self.top..size - self.bottom, self.left..size - self.right))
    }
}

impl std::fmt::Display for CropWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "top {} bottom {} left {} right {}",
            self.top, self.bottom, self.left, self.right
        )
    }
}

/// How a raster is turned into a PNG.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Margins to drop; `None` draws the whole raster.
    pub crop: Option<CropWindow>,
    /// Pixels per raster cell along each axis.
    pub scale: u32,
    /// Write a palette PNG instead of RGBA.
    pub indexed: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            crop: Some(CropWindow::default()),
            scale: 1,
            indexed: true,
        }
    }
}

impl RenderOptions {
    /// Whole raster, one pixel per cell.
    pub fn uncropped() -> Self {
        Self {
            crop: None,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> RenderResult<()> {
        if self.scale == 0 || self.scale > MAX_SCALE {
            return Err(RenderError::InvalidScale {
                scale: self.scale,
                max: MAX_SCALE,
            });
        }
        Ok(())
    }
}

/// RGBA image, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u8>,
}

impl Image {
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        let i = (y * self.width + x) * 4;
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }
}

/// Draws normalised rasters for one display mode.
#[derive(Debug, Clone)]
pub struct MapRenderer {
    mode: DisplayMode,
    max: f64,
    lut: ColorLut,
}

impl MapRenderer {
    /// Renderer with the built-in colour map for `mode` over its range for `max`.
    pub fn new(mode: DisplayMode, max: f64) -> RenderResult<Self> {
        Self::with_colormap(mode, max, &SegmentedColormap::for_mode(mode))
    }

    pub fn with_colormap(
        mode: DisplayMode,
        max: f64,
        colormap: &SegmentedColormap,
    ) -> RenderResult<Self> {
        if !(max.is_finite() && max > 0.0) {
            return Err(RenderError::InvalidRange(max));
        }
        Ok(Self {
            mode,
            max,
            lut: colormap.sample(),
        })
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    /// Colour of one cell.
    ///
    /// Land takes the bottom of the range, hidden cells the top colour.
    pub fn cell_color(&self, cell: Cell) -> [u8; 4] {
        let min = self.mode.range_min(self.max);
        match cell {
            Cell::Land => self.lut.color_for(self.mode.land_value(self.max), min, self.max),
            Cell::Hidden => self.lut.top(),
            Cell::Value(v) => self.lut.color_for(v, min, self.max),
        }
    }

    /// Colour the raster, row `x` of the raster becoming image row `x`.
    #[instrument(skip(self, raster), fields(mode = %self.mode, size = raster.size()))]
    pub fn colorize(&self, raster: &Raster, options: &RenderOptions) -> RenderResult<Image> {
        options.validate()?;

        let size = raster.size();
        let (rows, cols) = match options.crop {
            Some(crop) => crop.bounds(size)?,
            None => (0..size, 0..size),
        };

        let scale = options.scale as usize;
        let width = cols.len() * scale;
        let height = rows.len() * scale;
        let mut pixels = vec![0u8; width * height * 4];

        // One band of `scale` image rows per raster row
        pixels
            .par_chunks_mut(width * 4 * scale)
            .zip(rows.clone())
            .for_each(|(band, x)| {
                let (first, rest) = band.split_at_mut(width * 4);
                for (i, y) in cols.clone().enumerate() {
                    let color = self.cell_color(raster.get(x, y));
                    for k in 0..scale {
                        let p = (i * scale + k) * 4;
                        first[p..p + 4].copy_from_slice(&color);
                    }
                }
                for row in rest.chunks_exact_mut(width * 4) {
                    row.copy_from_slice(first);
                }
            });

        debug!(width, height, "Colorized raster");
        Ok(Image {
            width,
            height,
            pixels,
        })
    }

    /// Colour and encode the raster, storing `title` in a `Title` text chunk.
    pub fn render_png(
        &self,
        raster: &Raster,
        title: &str,
        options: &RenderOptions,
    ) -> RenderResult<Vec<u8>> {
        let image = self.colorize(raster, options)?;
        let text = [("Title", title)];
        let png = if options.indexed {
            create_png_auto(&image.pixels, image.width, image.height, &text)?
        } else {
            create_png(&image.pixels, image.width, image.height, &text)?
        };
        debug!(bytes = png.len(), "Encoded PNG");
        Ok(png)
    }
}

/// Render a normalised raster to PNG bytes.
pub fn render_map(
    raster: &Raster,
    mode: DisplayMode,
    max: f64,
    title: &str,
    options: &RenderOptions,
) -> RenderResult<Vec<u8>> {
    MapRenderer::new(mode, max)?.render_png(raster, title, options)
}
