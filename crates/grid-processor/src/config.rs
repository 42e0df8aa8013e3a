//! Configuration for the processing pipeline.

use seaice_common::{DisplayMode, ModeLimits};
use serde::{Deserialize, Serialize};

use crate::error::{GridProcessorError, Result};
use crate::fill::DEFAULT_MAX_RADIUS;

/// Configuration for the processing pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Largest ring distance searched when filling a gap.
    pub max_search_radius: usize,

    /// Factor applied to the historical field before adding it.
    ///
    /// The historical averages are stored in millimetres, so the default
    /// converts them to metres and subtracts.
    pub anomaly_multiplier: f64,

    /// Fraction of the mode maximum values are clamped to.
    pub clamp_factor: f64,

    /// Limits for thickness maps.
    pub thickness: ModeLimits,

    /// Limits for anomaly maps.
    pub anomaly: ModeLimits,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_search_radius: DEFAULT_MAX_RADIUS,
            anomaly_multiplier: -0.001,
            clamp_factor: 0.99,
            thickness: ModeLimits::thickness(),
            anomaly: ModeLimits::anomaly(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("SEAICE_MAX_SEARCH_RADIUS") {
            if let Ok(radius) = val.parse() {
                config.max_search_radius = radius;
            }
        }

        if let Ok(val) = std::env::var("SEAICE_ANOMALY_MULTIPLIER") {
            if let Ok(m) = val.parse() {
                config.anomaly_multiplier = m;
            }
        }

        if let Ok(val) = std::env::var("SEAICE_CLAMP_FACTOR") {
            if let Ok(f) = val.parse() {
                config.clamp_factor = f;
            }
        }

        if let Ok(val) = std::env::var("SEAICE_THICKNESS_MAX") {
            if let Ok(max) = val.parse() {
                config.thickness.max = max;
            }
        }

        if let Ok(val) = std::env::var("SEAICE_ANOMALY_MAX") {
            if let Ok(max) = val.parse() {
                config.anomaly.max = max;
            }
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.max_search_radius == 0 {
            return Err(GridProcessorError::config("max_search_radius must be > 0"));
        }

        if !self.anomaly_multiplier.is_finite() {
            return Err(GridProcessorError::config("anomaly_multiplier must be finite"));
        }

        if !(self.clamp_factor > 0.0 && self.clamp_factor <= 1.0) {
            return Err(GridProcessorError::config("clamp_factor must be in (0, 1]"));
        }

        for (name, limits) in [("thickness", &self.thickness), ("anomaly", &self.anomaly)] {
            if !(limits.max > 0.0 && limits.max.is_finite()) {
                return Err(GridProcessorError::config(format!("{} max must be > 0", name)));
            }
            if !(limits.hide_threshold >= 0.0 && limits.hide_threshold < limits.max) {
                return Err(GridProcessorError::config(format!(
                    "{} hide_threshold must be in [0, max)",
                    name
                )));
            }
        }

        Ok(())
    }

    /// Limits for a display mode.
    pub fn limits(&self, mode: DisplayMode) -> ModeLimits {
        match mode {
            DisplayMode::Thickness => self.thickness,
            DisplayMode::Anomaly => self.anomaly,
        }
    }
}
