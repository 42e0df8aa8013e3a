//! Cache keys for rendered maps.

use chrono::{Datelike, NaiveDate};
use seaice_common::DisplayMode;
use serde::{Deserialize, Serialize};

/// Identifies one rendered map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub mode: DisplayMode,
    pub date: NaiveDate,
}

impl CacheKey {
    pub fn new(mode: DisplayMode, date: NaiveDate) -> Self {
        Self { mode, date }
    }

    /// File name without directories.
    pub fn file_name(&self) -> String {
        let suffix = match self.mode {
            DisplayMode::Thickness => "",
            DisplayMode::Anomaly => "-anomaly",
        };
        format!(
            "cryosat-smos-thickness{}-{}.png",
            suffix,
            self.date.format("%Y%m%d")
        )
    }

    /// Object path: `{mode}/{year}/{file}`.
    pub fn path(&self) -> String {
        format!("{}/{}/{}", self.mode, self.date.year(), self.file_name())
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path())
    }
}
