//! Pre-built Test Fixtures
//!
//! Fixed dates, schedules and identifiers shared by the test suites. Dates
//! are chosen relative to the Asia/Jakarta business timezone (UTC+7).

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use once_cell::sync::Lazy;

use core_kernel::{AgentId, BusinessTimezone, CustomerId, Month};
use domain_commission::ScheduleBook;

static STANDARD_SCHEDULES: Lazy<Arc<ScheduleBook>> =
    Lazy::new(|| Arc::new(ScheduleBook::standard()));

/// Fixture for temporal test data
pub struct TemporalFixtures;

impl TemporalFixtures {
    pub fn timezone() -> BusinessTimezone {
        BusinessTimezone::default()
    }

    /// March 2024, the month most scenarios run in
    pub fn march() -> Month {
        Month::new(2024, 3).expect("valid fixture month")
    }

    pub fn april() -> Month {
        Month::new(2024, 4).expect("valid fixture month")
    }

    /// A UTC instant on `day` of `month` 2024 at 10:00 Jakarta time
    pub fn business_day(month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, month, day, 3, 0, 0)
            .single()
            .expect("valid fixture date")
    }

    /// 2024-03-31 20:00 UTC, which is already April 1st in Jakarta
    pub fn utc_march_jakarta_april() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 31, 20, 0, 0)
            .single()
            .expect("valid fixture date")
    }
}

/// Fixture for commission schedules
pub struct ScheduleFixtures;

impl ScheduleFixtures {
    /// The built-in schedule book, shared across tests
    pub fn standard() -> Arc<ScheduleBook> {
        STANDARD_SCHEDULES.clone()
    }

    /// A TOML schedule file with a March 2024 change to a flat 4% basic rate
    pub fn two_versions_toml() -> &'static str {
        r#"
[[schedules]]
version = "2023"
effective_from = "2023-01"
basic_rate = "0.03"

[[schedules.bonus_tiers]]
min_anp = "0"
rate = "0"

[[schedules.bonus_tiers]]
min_anp = "10000"
rate = "0.01"

[[schedules]]
version = "2024-03"
effective_from = "2024-03"
basic_rate = "0.04"

[[schedules.bonus_tiers]]
min_anp = "0"
rate = "0"

[[schedules.bonus_tiers]]
min_anp = "20000"
rate = "0.02"
"#
    }
}

/// Fixture for identifiers
pub struct IdFixtures;

impl IdFixtures {
    pub fn agent() -> AgentId {
        AgentId::new("agent-budi")
    }

    pub fn other_agent() -> AgentId {
        AgentId::new("agent-sari")
    }

    pub fn customer() -> CustomerId {
        CustomerId::new("cust-001")
    }
}

/// Actor recorded on admin writes in tests
pub const TEST_ACTOR: &str = "admin@test";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary_fixture_crosses_month_in_business_timezone() {
        let instant = TemporalFixtures::utc_march_jakarta_april();
        assert_eq!(TemporalFixtures::timezone().month_of(instant), TemporalFixtures::april());
    }

    #[test]
    fn test_two_version_schedule_parses() {
        let book = ScheduleBook::from_toml_str(ScheduleFixtures::two_versions_toml()).unwrap();
        assert_eq!(book.in_force(TemporalFixtures::march()).unwrap().version, "2024-03");
    }
}
