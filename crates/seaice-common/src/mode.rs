//! Display modes and their numeric limits.

use serde::{Deserialize, Serialize};

/// Which quantity a map shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// Absolute ice thickness in meters, range `[0, max]`.
    Thickness,
    /// Difference from the multi-year average in meters, range `[-max, max]`.
    Anomaly,
}

impl DisplayMode {
    /// Parse from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "thickness" => Some(Self::Thickness),
            "anomaly" => Some(Self::Anomaly),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Thickness => "thickness",
            Self::Anomaly => "anomaly",
        }
    }

    /// Lower end of the display range.
    pub fn range_min(&self, max: f64) -> f64 {
        match self {
            Self::Thickness => 0.0,
            Self::Anomaly => -max,
        }
    }

    /// Numeric value land cells take when handed to a colour map.
    pub fn land_value(&self, max: f64) -> f64 {
        self.range_min(max)
    }
}

impl std::fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Range limits for one display mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModeLimits {
    /// Maximum displayed magnitude (meters).
    pub max: f64,
    /// Values whose magnitude is below this are hidden.
    pub hide_threshold: f64,
}

impl ModeLimits {
    /// 5 m maximum, values under 5 cm hidden.
    pub fn thickness() -> Self {
        Self {
            max: 5.0,
            hide_threshold: 0.05,
        }
    }

    /// 1 m maximum, values under 1 mm hidden.
    pub fn anomaly() -> Self {
        Self {
            max: 1.0,
            hide_threshold: 0.001,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mode() {
        assert_eq!(DisplayMode::parse("Anomaly"), Some(DisplayMode::Anomaly));
        assert_eq!(DisplayMode::parse("THICKNESS"), Some(DisplayMode::Thickness));
        assert_eq!(DisplayMode::parse("volume"), None);
    }

    #[test]
    fn test_land_value() {
        assert_eq!(DisplayMode::Thickness.land_value(5.0), 0.0);
        assert_eq!(DisplayMode::Anomaly.land_value(1.0), -1.0);
    }

    #[test]
    fn test_mode_from_yaml() {
        let mode: DisplayMode = serde_yaml::from_str("anomaly").unwrap();
        assert_eq!(mode, DisplayMode::Anomaly);
    }
}
