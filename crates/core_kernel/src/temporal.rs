//! Calendar months and business-timezone boundaries
//!
//! Commission and ANP are reported per calendar month. Payment timestamps are
//! stored in UTC, but the month a payment belongs to is decided in the
//! business timezone, so every month lookup goes through [`BusinessTimezone`].

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors related to temporal operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Invalid month '{0}': expected YYYY-MM")]
    InvalidMonth(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Local midnight of {0} does not exist in the business timezone")]
    NonexistentLocalTime(NaiveDate),
}

/// A calendar month, written `YYYY-MM`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month {
    year: i32,
    month: u32,
}

impl Month {
    /// Earliest representable month
    pub const EPOCH: Month = Month { year: 1, month: 1 };

    pub fn new(year: i32, month: u32) -> Result<Self, TemporalError> {
        if !(1..=12).contains(&month) || !(1..=9999).contains(&year) {
            return Err(TemporalError::InvalidMonth(format!("{year:04}-{month:02}")));
        }
        Ok(Self { year, month })
    }

    /// Returns the month a calendar date falls in
    pub fn of_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        // year and month are range-checked on construction
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self { year: self.year + 1, month: 1 }
        } else {
            Self { year: self.year, month: self.month + 1 }
        }
    }

    pub fn previous(&self) -> Self {
        if self.month == 1 {
            Self { year: self.year - 1, month: 12 }
        } else {
            Self { year: self.year, month: self.month - 1 }
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Month {
    type Err = TemporalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TemporalError::InvalidMonth(s.to_string());
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Month::new(year, month).map_err(|_| invalid())
    }
}

impl Serialize for Month {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Month {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Half-open UTC interval `[start, end)` covering one business month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl MonthRange {
    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        timestamp >= self.start && timestamp < self.end
    }
}

/// Timezone in which the business closes its months
///
/// Wraps chrono_tz::Tz with custom serialization support.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusinessTimezone(pub Tz);

impl BusinessTimezone {
    pub fn new(tz: Tz) -> Self {
        Self(tz)
    }

    pub fn name(&self) -> &'static str {
        self.0.name()
    }

    /// Returns the business month a UTC instant falls in
    pub fn month_of(&self, utc: DateTime<Utc>) -> Month {
        Month::of_date(utc.with_timezone(&self.0).date_naive())
    }

    /// Gets the start of day (00:00) in this timezone as UTC
    pub fn start_of_day(&self, date: NaiveDate) -> Result<DateTime<Utc>, TemporalError> {
        date.and_time(NaiveTime::MIN)
            .and_local_timezone(self.0)
            .earliest()
            .map(|local| local.with_timezone(&Utc))
            .ok_or(TemporalError::NonexistentLocalTime(date))
    }

    /// Returns the UTC interval covering `month` in this timezone
    pub fn month_range(&self, month: Month) -> Result<MonthRange, TemporalError> {
        Ok(MonthRange {
            start: self.start_of_day(month.first_day())?,
            end: self.start_of_day(month.next().first_day())?,
        })
    }
}

impl Default for BusinessTimezone {
    fn default() -> Self {
        Self(chrono_tz::Asia::Jakarta)
    }
}

impl FromStr for BusinessTimezone {
    type Err = TemporalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tz::from_str(s)
            .map(BusinessTimezone)
            .map_err(|_| TemporalError::InvalidTimezone(s.to_string()))
    }
}

impl Serialize for BusinessTimezone {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.0.name())
    }
}

impl<'de> Deserialize<'de> for BusinessTimezone {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_month_parse_and_display() {
        let month: Month = "2024-03".parse().unwrap();
        assert_eq!(month.year(), 2024);
        assert_eq!(month.month(), 3);
        assert_eq!(month.to_string(), "2024-03");
    }

    #[test]
    fn test_month_rejects_malformed_input() {
        for input in ["2024-3", "2024-13", "24-03", "2024/03", "march", ""] {
            assert!(input.parse::<Month>().is_err(), "accepted {input}");
        }
    }

    #[test]
    fn test_month_next_wraps_year() {
        let december = Month::new(2023, 12).unwrap();
        assert_eq!(december.next(), Month::new(2024, 1).unwrap());
        assert_eq!(december.next().previous(), december);
    }

    #[test]
    fn test_month_of_uses_business_timezone() {
        let tz = BusinessTimezone::default();
        // 2024-03-31 18:30 UTC is already April 1st in Jakarta (UTC+7)
        let instant = Utc.with_ymd_and_hms(2024, 3, 31, 18, 30, 0).unwrap();
        assert_eq!(tz.month_of(instant), Month::new(2024, 4).unwrap());
    }

    #[test]
    fn test_month_range_is_half_open() {
        let tz: BusinessTimezone = "UTC".parse().unwrap();
        let range = tz.month_range(Month::new(2024, 2).unwrap()).unwrap();

        assert_eq!(range.start, Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap());
        assert_eq!(range.end, Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
        assert!(range.contains(range.start));
        assert!(!range.contains(range.end));
    }

    #[test]
    fn test_month_serializes_as_string() {
        let month = Month::new(2024, 11).unwrap();
        assert_eq!(serde_json::to_string(&month).unwrap(), "\"2024-11\"");
        let back: Month = serde_json::from_str("\"2024-11\"").unwrap();
        assert_eq!(back, month);
    }
}
