//! Tests for months and business-timezone boundaries

use chrono::{NaiveDate, TimeZone, Utc};
use core_kernel::{BusinessTimezone, Month, TemporalError};
use proptest::prelude::*;

mod month {
    use super::*;

    #[test]
    fn test_new_rejects_month_zero_and_thirteen() {
        assert!(matches!(Month::new(2024, 0), Err(TemporalError::InvalidMonth(_))));
        assert!(matches!(Month::new(2024, 13), Err(TemporalError::InvalidMonth(_))));
    }

    #[test]
    fn test_first_day() {
        let month = Month::new(2024, 2).unwrap();
        assert_eq!(month.first_day(), NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
    }

    #[test]
    fn test_contains() {
        let month = Month::new(2024, 2).unwrap();
        assert!(month.contains(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()));
        assert!(!month.contains(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()));
        assert!(!month.contains(NaiveDate::from_ymd_opt(2023, 2, 10).unwrap()));
    }

    #[test]
    fn test_ordering_follows_calendar() {
        let dec_2023 = Month::new(2023, 12).unwrap();
        let jan_2024 = Month::new(2024, 1).unwrap();
        assert!(dec_2023 < jan_2024);
    }

    #[test]
    fn test_parse_accepts_surrounding_whitespace() {
        let month: Month = " 2025-07 ".parse().unwrap();
        assert_eq!(month, Month::new(2025, 7).unwrap());
    }
}

mod business_timezone {
    use super::*;

    #[test]
    fn test_default_is_jakarta() {
        assert_eq!(BusinessTimezone::default().name(), "Asia/Jakarta");
    }

    #[test]
    fn test_invalid_timezone_name() {
        let result = "Mars/Olympus".parse::<BusinessTimezone>();
        assert!(matches!(result, Err(TemporalError::InvalidTimezone(_))));
    }

    #[test]
    fn test_month_range_is_shifted_by_offset() {
        let tz = BusinessTimezone::default();
        let range = tz.month_range(Month::new(2024, 3).unwrap()).unwrap();

        assert_eq!(range.start, Utc.with_ymd_and_hms(2024, 2, 29, 17, 0, 0).unwrap());
        assert_eq!(range.end, Utc.with_ymd_and_hms(2024, 3, 31, 17, 0, 0).unwrap());
    }

    #[test]
    fn test_month_of_and_range_agree_on_boundary() {
        let tz = BusinessTimezone::default();
        let april = Month::new(2024, 4).unwrap();
        let range = tz.month_range(april).unwrap();

        assert_eq!(tz.month_of(range.start), april);
        assert_eq!(tz.month_of(range.end), april.next());
    }

    #[test]
    fn test_serde_round_trip_by_name() {
        let tz: BusinessTimezone = serde_json::from_str("\"Asia/Singapore\"").unwrap();
        assert_eq!(serde_json::to_string(&tz).unwrap(), "\"Asia/Singapore\"");
    }
}

proptest! {
    #[test]
    fn month_display_parses_back(year in 1i32..9999, month in 1u32..=12) {
        let original = Month::new(year, month).unwrap();
        let parsed: Month = original.to_string().parse().unwrap();
        prop_assert_eq!(parsed, original);
    }

    #[test]
    fn instants_inside_range_map_to_that_month(
        year in 2000i32..2100,
        month in 1u32..=12,
        offset_secs in 0i64..(28 * 24 * 3600)
    ) {
        let tz = BusinessTimezone::default();
        let month = Month::new(year, month).unwrap();
        let range = tz.month_range(month).unwrap();
        let instant = range.start + chrono::Duration::seconds(offset_secs);

        prop_assert!(range.contains(instant));
        prop_assert_eq!(tz.month_of(instant), month);
    }
}
