//! Date handling for the CryoSat-SMOS season.

use chrono::{Datelike, NaiveDate};

use crate::{DisplayMode, SeaIceError, SeaIceResult};

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Last (month, day) of the spring end of the season.
const SEASON_END: (u32, u32) = (4, 12);
/// First (month, day) of the autumn start of the season.
const SEASON_START: (u32, u32) = (10, 18);

/// Number of years averaged into the anomaly baseline.
pub const BASELINE_YEARS: i32 = 10;

/// First day with CryoSat-SMOS coverage.
pub fn first_available_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2010, 11, 4).expect("valid constant date")
}

/// Parse a `YYYY-MM-DD` date string.
pub fn parse_map_date(s: &str) -> SeaIceResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
        SeaIceError::InvalidDate(format!("'{}' needs to have the format YYYY-MM-DD", s))
    })
}

/// Check that a map can exist for `date`.
///
/// Thickness is only retrieved during the freezing season, and not before
/// the start of the combined product.
pub fn validate_map_date(date: NaiveDate) -> SeaIceResult<()> {
    if date < first_available_date() {
        return Err(SeaIceError::InvalidDate(format!(
            "{} is earlier than {}",
            date,
            first_available_date()
        )));
    }
    let md = (date.month(), date.day());
    if md > SEASON_END && md < SEASON_START {
        return Err(SeaIceError::InvalidDate(format!(
            "{} is outside the season (18 October to 12 April)",
            date
        )));
    }
    Ok(())
}

/// Day of the year, 1-based.
pub fn day_of_year(date: NaiveDate) -> u32 {
    date.ordinal()
}

/// Small date-dependent floor for accumulated sample values.
///
/// Keeps exact-zero samples from tying with each other while staying far
/// below any measurable thickness.
pub fn tie_break_seed(year: i32, day_of_year: u32) -> f64 {
    (year + day_of_year as i32 - 2000) as f64 / 2_000_000.0
}

/// First year of the ten-year baseline used for the anomaly on `date`.
pub fn baseline_start_year(date: NaiveDate) -> i32 {
    if date.month() <= 4 {
        2014
    } else {
        2013
    }
}

/// Human readable plot title.
pub fn map_title(mode: DisplayMode, date: NaiveDate) -> String {
    let month = MONTH_NAMES[date.month0() as usize];
    match mode {
        DisplayMode::Thickness => format!(
            "CryoSat-SMOS sea ice thickness {} {} {}",
            date.day(),
            month,
            date.year()
        ),
        DisplayMode::Anomaly => {
            let start = baseline_start_year(date);
            format!(
                "CryoSat-SMOS thickness anomaly {} {} {} vs {}-{}",
                date.day(),
                month,
                date.year(),
                start,
                start + BASELINE_YEARS - 1
            )
        }
    }
}
