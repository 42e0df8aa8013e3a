//! Segmented linear colour maps.
//!
//! Each channel is a list of `(x, below, above)` anchors over `[0, 1]`. Between
//! two anchors the channel ramps linearly from the left anchor's `above` value
//! to the right anchor's `below` value, so a jump can be placed at any anchor.
//! Maps are sampled into a fixed lookup table before use and values are
//! quantised onto it.

use seaice_common::DisplayMode;

use crate::{RenderError, RenderResult};

/// Number of entries in a sampled lookup table.
pub const LUT_SIZE: usize = 256;

/// One channel anchor: position, value approached from the left, value
/// leaving to the right.
pub type Anchor = (f64, f64, f64);

/// RGBA colour.
pub type Rgba = [u8; 4];

/// Colour map defined by per-channel anchors.
#[derive(Debug, Clone)]
pub struct SegmentedColormap {
    name: String,
    red: Vec<Anchor>,
    green: Vec<Anchor>,
    blue: Vec<Anchor>,
}

impl SegmentedColormap {
    /// Build a colour map, checking that every channel starts at 0, ends at 1
    /// and has increasing positions.
    pub fn new(
        name: impl Into<String>,
        red: Vec<Anchor>,
        green: Vec<Anchor>,
        blue: Vec<Anchor>,
    ) -> RenderResult<Self> {
        let name = name.into();
        for (channel, anchors) in [("red", &red), ("green", &green), ("blue", &blue)] {
            validate_channel(&name, channel, anchors)?;
        }
        Ok(Self {
            name,
            red,
            green,
            blue,
        })
    }

    /// Thickness colours: grey for land at 0, blue through green and yellow
    /// to dark red, white at the very top.
    pub fn thickness() -> Self {
        Self {
            name: "thickness".to_string(),
            red: vec![
                (0.0, 0.5, 0.5),
                (0.001, 0.5, 0.0),
                (0.05, 0.0, 0.0),
                (0.1, 0.0, 0.0),
                (0.15, 0.0, 0.0),
                (0.2, 0.0, 0.2),
                (0.25, 0.2, 0.4),
                (0.3, 0.4, 0.6),
                (0.35, 0.6, 0.8),
                (0.4, 0.8, 1.0),
                (0.45, 1.0, 1.0),
                (0.5, 1.0, 1.0),
                (0.55, 1.0, 1.0),
                (0.6, 1.0, 0.95),
                (0.65, 0.95, 0.9),
                (0.7, 0.9, 0.85),
                (0.75, 0.85, 0.8),
                (0.8, 0.8, 0.75),
                (0.85, 0.75, 0.7),
                (0.9, 0.7, 0.65),
                (0.95, 0.65, 0.6),
                (0.999, 0.6, 1.0),
                (1.0, 1.0, 1.0),
            ],
            green: vec![
                (0.0, 0.5, 0.5),
                (0.001, 0.5, 0.0),
                (0.05, 0.0, 0.1),
                (0.1, 0.1, 0.25),
                (0.15, 0.25, 0.4),
                (0.2, 0.4, 0.55),
                (0.25, 0.55, 0.7),
                (0.3, 0.7, 0.85),
                (0.35, 0.85, 1.0),
                (0.4, 1.0, 1.0),
                (0.45, 1.0, 0.9),
                (0.5, 0.9, 0.8),
                (0.55, 0.8, 0.75),
                (0.6, 0.75, 0.7),
                (0.65, 0.7, 0.6),
                (0.7, 0.6, 0.5),
                (0.75, 0.5, 0.4),
                (0.8, 0.4, 0.3),
                (0.85, 0.3, 0.2),
                (0.9, 0.2, 0.1),
                (0.95, 0.1, 0.0),
                (0.999, 0.0, 1.0),
                (1.0, 1.0, 1.0),
            ],
            blue: vec![
                (0.0, 0.5, 0.5),
                (0.001, 0.4, 0.4),
                (0.05, 0.4, 0.55),
                (0.1, 0.55, 0.7),
                (0.15, 0.7, 0.85),
                (0.2, 0.85, 1.0),
                (0.25, 1.0, 0.8),
                (0.3, 0.8, 0.6),
                (0.35, 0.6, 0.4),
                (0.4, 0.4, 0.2),
                (0.45, 0.2, 0.0),
                (0.5, 0.0, 0.0),
                (0.55, 0.0, 0.0),
                (0.6, 0.0, 0.0),
                (0.7, 0.0, 0.0),
                (0.8, 0.0, 0.0),
                (0.9, 0.0, 0.0),
                (0.999, 0.0, 0.0),
                (1.0, 1.0, 1.0),
            ],
        }
    }

    /// Anomaly colours: grey for land at the bottom, blue for thinner than
    /// average, white around zero, green for thicker, white at the very top.
    pub fn anomaly() -> Self {
        Self {
            name: "anomaly".to_string(),
            red: vec![
                (0.0, 0.4, 0.4),
                (0.001, 0.0, 0.0),
                (0.5, 1.0, 1.0),
                (0.999, 0.0, 0.0),
                (1.0, 1.0, 1.0),
            ],
            green: vec![
                (0.0, 0.4, 0.4),
                (0.001, 0.0, 0.0),
                (0.5, 1.0, 1.0),
                (0.999, 1.0, 1.0),
                (1.0, 1.0, 1.0),
            ],
            blue: vec![
                (0.0, 0.4, 0.4),
                (0.001, 0.4, 0.4),
                (0.5, 1.0, 0.5),
                (0.999, 0.0, 0.0),
                (1.0, 1.0, 1.0),
            ],
        }
    }

    /// Colour map used for a display mode.
    pub fn for_mode(mode: DisplayMode) -> Self {
        match mode {
            DisplayMode::Thickness => Self::thickness(),
            DisplayMode::Anomaly => Self::anomaly(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Channel values at `x`, clamped to `[0, 1]`.
    pub fn evaluate(&self, x: f64) -> [f64; 3] {
        let x = if x.is_nan() { 0.0 } else { x.clamp(0.0, 1.0) };
        [
            channel_at(&self.red, x),
            channel_at(&self.green, x),
            channel_at(&self.blue, x),
        ]
    }

    /// Sample into a lookup table with entry `i` at position `i / (LUT_SIZE - 1)`.
    pub fn sample(&self) -> ColorLut {
        let colors = (0..LUT_SIZE)
            .map(|i| {
                let [r, g, b] = self.evaluate(i as f64 / (LUT_SIZE - 1) as f64);
                [to_byte(r), to_byte(g), to_byte(b), 255]
            })
            .collect();
        ColorLut { colors }
    }
}

/// Sampled colour map.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorLut {
    colors: Vec<Rgba>,
}

impl ColorLut {
    /// Entry for `value` over the display range `[min, max]`.
    ///
    /// The range is split into `LUT_SIZE` equal bins; values at or beyond
    /// either end take the end colour.
    pub fn index_for(&self, value: f64, min: f64, max: f64) -> usize {
        let n = self.colors.len();
        let t = (value - min) / (max - min);
        if t.is_nan() || t <= 0.0 {
            return 0;
        }
        ((t * n as f64) as usize).min(n - 1)
    }

    pub fn color_for(&self, value: f64, min: f64, max: f64) -> Rgba {
        self.colors[self.index_for(value, min, max)]
    }

    /// Lowest colour.
    pub fn bottom(&self) -> Rgba {
        self.colors[0]
    }

    /// Highest colour; cells without a value are drawn with it.
    pub fn top(&self) -> Rgba {
        self.colors[self.colors.len() - 1]
    }

    pub fn colors(&self) -> &[Rgba] {
        &self.colors
    }
}

fn validate_channel(map: &str, channel: &str, anchors: &[Anchor]) -> RenderResult<()> {
    let invalid = |reason: &str| RenderError::InvalidColormap {
        name: map.to_string(),
        message: format!("{} channel {}", channel, reason),
    };

    if anchors.len() < 2 {
        return Err(invalid("needs at least two anchors"));
    }
    if anchors[0].0 != 0.0 || anchors[anchors.len() - 1].0 != 1.0 {
        return Err(invalid("must span 0 to 1"));
    }
    if anchors.windows(2).any(|w| w[1].0 <= w[0].0) {
        return Err(invalid("positions must increase"));
    }
    if anchors
        .iter()
        .any(|&(_, lo, hi)| !(0.0..=1.0).contains(&lo) || !(0.0..=1.0).contains(&hi))
    {
        return Err(invalid("values must lie in [0, 1]"));
    }
    Ok(())
}

fn channel_at(anchors: &[Anchor], x: f64) -> f64 {
    // Right end is reached from the left
    let last = anchors[anchors.len() - 1];
    if x >= last.0 {
        return last.1;
    }

    let i = anchors
        .windows(2)
        .position(|w| x >= w[0].0 && x < w[1].0)
        .unwrap_or(0);
    let (x0, _, start) = anchors[i];
    let (x1, end, _) = anchors[i + 1];
    start + (x - x0) / (x1 - x0) * (end - start)
}

fn to_byte(v: f64) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}
