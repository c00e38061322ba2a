//! Time window resolution
//!
//! Maps the symbolic range tokens accepted by the API (`1month`, `3months`,
//! `6months`, `1year`) to a concrete `[start, now]` date interval.
//!
//! Month subtraction clamps the day-of-month to the last valid day of the
//! target month, so resolving `1month` from March 31st yields the last day of
//! February rather than failing or spilling into March.

use std::fmt;
use std::str::FromStr;

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Symbolic analysis range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "1month")]
    OneMonth,
    #[serde(rename = "3months")]
    ThreeMonths,
    #[default]
    #[serde(rename = "6months")]
    SixMonths,
    #[serde(rename = "1year")]
    OneYear,
}

impl TimeRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OneMonth => "1month",
            Self::ThreeMonths => "3months",
            Self::SixMonths => "6months",
            Self::OneYear => "1year",
        }
    }

    /// All accepted tokens, in ascending length
    pub fn all() -> &'static [TimeRange] {
        &[
            Self::OneMonth,
            Self::ThreeMonths,
            Self::SixMonths,
            Self::OneYear,
        ]
    }

    /// Lenient parse: absent or unrecognized tokens resolve to `6months`
    pub fn parse_or_default(token: Option<&str>) -> Self {
        token.and_then(|t| t.parse().ok()).unwrap_or_default()
    }

    /// Number of calendar months covered by the range
    pub fn months(&self) -> u32 {
        match self {
            Self::OneMonth => 1,
            Self::ThreeMonths => 3,
            Self::SixMonths => 6,
            Self::OneYear => 12,
        }
    }

    /// Resolve to a concrete window ending at `now`
    pub fn resolve(&self, now: NaiveDate) -> TimeWindow {
        TimeWindow {
            start: subtract_months(now, self.months()),
            end: now,
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TimeRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1month" => Ok(Self::OneMonth),
            "3months" => Ok(Self::ThreeMonths),
            "6months" => Ok(Self::SixMonths),
            "1year" => Ok(Self::OneYear),
            _ => Err(format!(
                "Unknown time range: {}. Available: 1month, 3months, 6months, 1year",
                s
            )),
        }
    }
}

/// Inclusive date interval `[start, end]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl TimeWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Resolve a raw token against `now`; unrecognized tokens use `6months`
pub fn resolve(token: Option<&str>, now: NaiveDate) -> TimeWindow {
    TimeRange::parse_or_default(token).resolve(now)
}

/// Subtract calendar months, clamping to the last day of the target month
fn subtract_months(date: NaiveDate, months: u32) -> NaiveDate {
    // Only fails below NaiveDate::MIN
    date.checked_sub_months(Months::new(months))
        .unwrap_or(NaiveDate::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_three_months() {
        let window = resolve(Some("3months"), date(2024, 5, 15));
        assert_eq!(window.start, date(2024, 2, 15));
        assert_eq!(window.end, date(2024, 5, 15));
    }

    #[test]
    fn test_all_tokens() {
        let now = date(2024, 5, 15);
        assert_eq!(resolve(Some("1month"), now).start, date(2024, 4, 15));
        assert_eq!(resolve(Some("6months"), now).start, date(2023, 11, 15));
        assert_eq!(resolve(Some("1year"), now).start, date(2023, 5, 15));
    }

    #[test]
    fn test_unknown_token_defaults_to_six_months() {
        let now = date(2024, 5, 15);
        assert_eq!(resolve(Some("bogus-token"), now), resolve(Some("6months"), now));
        assert_eq!(resolve(None, now), resolve(Some("6months"), now));
    }

    #[test]
    fn test_clamps_to_end_of_month() {
        assert_eq!(resolve(Some("1month"), date(2024, 3, 31)).start, date(2024, 2, 29));
        assert_eq!(resolve(Some("1month"), date(2023, 3, 31)).start, date(2023, 2, 28));
        assert_eq!(resolve(Some("3months"), date(2024, 5, 31)).start, date(2024, 2, 29));
        assert_eq!(resolve(Some("6months"), date(2024, 8, 31)).start, date(2024, 2, 29));
        assert_eq!(resolve(Some("1year"), date(2024, 2, 29)).start, date(2023, 2, 28));
    }

    #[test]
    fn test_crosses_year_boundary() {
        assert_eq!(resolve(Some("1month"), date(2024, 1, 31)).start, date(2023, 12, 31));
    }

    #[test]
    fn test_strict_parse_rejects_unknown() {
        assert!("weekly".parse::<TimeRange>().is_err());
        assert_eq!("1year".parse::<TimeRange>().unwrap(), TimeRange::OneYear);
    }

    #[test]
    fn test_window_is_ordered() {
        let now = date(2024, 7, 31);
        for range in TimeRange::all() {
            let window = range.resolve(now);
            assert!(window.start <= window.end);
            assert!(window.contains(now));
        }
    }

    #[test]
    fn test_serde_token() {
        let json = serde_json::to_string(&TimeRange::ThreeMonths).unwrap();
        assert_eq!(json, "\"3months\"");
    }
}
