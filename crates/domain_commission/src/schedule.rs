//! Commission schedules
//!
//! A schedule fixes the basic rate and the ANP bonus tier table for every
//! month from its `effective_from` month until the next schedule takes over.
//! Keeping old versions in the book means regenerating a historical month
//! reproduces the rates that applied at the time.
//!
//! Schedules are loaded from TOML:
//!
//! ```toml
//! [[schedules]]
//! version = "2024.1"
//! effective_from = "2024-01"
//! basic_rate = "0.03"
//!
//! [[schedules.bonus_tiers]]
//! min_anp = "0"
//! rate = "0"
//!
//! [[schedules.bonus_tiers]]
//! min_anp = "20000"
//! rate = "0.02"
//! ```

use std::collections::HashSet;
use std::path::Path;

use config::{Config, File, FileFormat};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use core_kernel::{Month, Rate};

use crate::error::CommissionError;

/// One step of the bonus table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BonusTier {
    /// Lowest achieved ANP at which this tier applies
    pub min_anp: Decimal,
    pub rate: Rate,
}

impl BonusTier {
    pub fn new(min_anp: Decimal, rate: Rate) -> Self {
        Self { min_anp, rate }
    }
}

/// Basic rate and bonus tiers in force from a given month
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionSchedule {
    pub version: String,
    pub effective_from: Month,
    pub basic_rate: Rate,
    /// Sorted by strictly increasing `min_anp`
    pub bonus_tiers: Vec<BonusTier>,
}

impl CommissionSchedule {
    /// The schedule shipped with the system: 3% basic, bonus from 1% to 3%
    pub fn standard() -> Self {
        Self {
            version: "standard".to_string(),
            effective_from: Month::EPOCH,
            basic_rate: Rate::new(dec!(0.03)),
            bonus_tiers: vec![
                BonusTier::new(dec!(0), Rate::zero()),
                BonusTier::new(dec!(10000), Rate::new(dec!(0.01))),
                BonusTier::new(dec!(20000), Rate::new(dec!(0.02))),
                BonusTier::new(dec!(50000), Rate::new(dec!(0.03))),
            ],
        }
    }

    /// Bonus rate for an achieved ANP: the highest tier whose threshold is reached
    pub fn bonus_rate(&self, achieved_anp: Decimal) -> Rate {
        self.bonus_tiers
            .iter()
            .take_while(|tier| tier.min_anp <= achieved_anp)
            .last()
            .map(|tier| tier.rate)
            .unwrap_or_else(Rate::zero)
    }

    pub fn validate(&self) -> Result<(), CommissionError> {
        let invalid = |message: String| {
            Err(CommissionError::configuration(format!(
                "schedule {}: {message}",
                self.version
            )))
        };

        if self.version.trim().is_empty() {
            return Err(CommissionError::configuration("schedule version is empty"));
        }
        if self.basic_rate.is_negative() {
            return invalid(format!("basic rate {} is negative", self.basic_rate));
        }
        if let Some(first) = self.bonus_tiers.first() {
            if first.min_anp < Decimal::ZERO {
                return invalid(format!("first tier threshold {} is negative", first.min_anp));
            }
        }
        for tier in &self.bonus_tiers {
            if tier.rate.is_negative() {
                return invalid(format!("bonus rate {} is negative", tier.rate));
            }
        }
        for pair in self.bonus_tiers.windows(2) {
            if pair[1].min_anp <= pair[0].min_anp {
                return invalid(format!(
                    "tier thresholds must strictly increase ({} then {})",
                    pair[0].min_anp, pair[1].min_anp
                ));
            }
            if pair[1].rate < pair[0].rate {
                return invalid(format!(
                    "bonus rates must not decrease ({} then {})",
                    pair[0].rate, pair[1].rate
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct ScheduleFile {
    #[serde(default)]
    schedules: Vec<CommissionSchedule>,
}

/// Every known schedule version, ordered by `effective_from`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleBook {
    schedules: Vec<CommissionSchedule>,
}

impl ScheduleBook {
    /// Validates and orders a set of schedules
    pub fn new(mut schedules: Vec<CommissionSchedule>) -> Result<Self, CommissionError> {
        if schedules.is_empty() {
            return Err(CommissionError::configuration(
                "no commission schedule is configured",
            ));
        }

        let mut versions = HashSet::new();
        let mut months = HashSet::new();
        for schedule in &schedules {
            schedule.validate()?;
            if !versions.insert(schedule.version.as_str()) {
                return Err(CommissionError::configuration(format!(
                    "duplicate schedule version {}",
                    schedule.version
                )));
            }
            if !months.insert(schedule.effective_from) {
                return Err(CommissionError::configuration(format!(
                    "more than one schedule takes effect in {}",
                    schedule.effective_from
                )));
            }
        }

        schedules.sort_by_key(|s| s.effective_from);
        Ok(Self { schedules })
    }

    /// A book holding only the standard schedule
    pub fn standard() -> Self {
        Self {
            schedules: vec![CommissionSchedule::standard()],
        }
    }

    pub fn from_toml_str(source: &str) -> Result<Self, CommissionError> {
        Self::load(File::from_str(source, FileFormat::Toml))
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, CommissionError> {
        let path = path.as_ref();
        Self::load(File::from(path).format(FileFormat::Toml).required(true))
    }

    fn load<S>(source: S) -> Result<Self, CommissionError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let file: ScheduleFile = Config::builder()
            .add_source(source)
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| CommissionError::configuration(format!("cannot load schedules: {e}")))?;
        Self::new(file.schedules)
    }

    /// The schedule with the latest `effective_from` not after `month`
    pub fn in_force(&self, month: Month) -> Result<&CommissionSchedule, CommissionError> {
        self.schedules
            .iter()
            .rev()
            .find(|s| s.effective_from <= month)
            .ok_or_else(|| {
                CommissionError::configuration(format!(
                    "no commission schedule is in force for {month}"
                ))
            })
    }

    pub fn schedules(&self) -> &[CommissionSchedule] {
        &self.schedules
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn month(s: &str) -> Month {
        s.parse().unwrap()
    }

    fn schedule(version: &str, from: &str, tiers: Vec<(Decimal, Decimal)>) -> CommissionSchedule {
        CommissionSchedule {
            version: version.to_string(),
            effective_from: month(from),
            basic_rate: Rate::new(dec!(0.03)),
            bonus_tiers: tiers
                .into_iter()
                .map(|(min, rate)| BonusTier::new(min, Rate::new(rate)))
                .collect(),
        }
    }

    #[test]
    fn test_bonus_rate_steps() {
        let standard = CommissionSchedule::standard();
        assert_eq!(standard.bonus_rate(dec!(-1)), Rate::zero());
        assert_eq!(standard.bonus_rate(dec!(9999.99)), Rate::zero());
        assert_eq!(standard.bonus_rate(dec!(10000)), Rate::new(dec!(0.01)));
        assert_eq!(standard.bonus_rate(dec!(20000)), Rate::new(dec!(0.02)));
        assert_eq!(standard.bonus_rate(dec!(1000000)), Rate::new(dec!(0.03)));
    }

    #[test]
    fn test_standard_schedule_is_valid() {
        assert!(CommissionSchedule::standard().validate().is_ok());
    }

    #[test]
    fn test_decreasing_rates_rejected() {
        let s = schedule("v1", "2024-01", vec![(dec!(0), dec!(0.02)), (dec!(100), dec!(0.01))]);
        let error = s.validate().unwrap_err();
        assert!(error.is_fatal());
    }

    #[test]
    fn test_unsorted_thresholds_rejected() {
        let s = schedule("v1", "2024-01", vec![(dec!(100), dec!(0.01)), (dec!(100), dec!(0.02))]);
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_empty_book_rejected() {
        assert!(matches!(ScheduleBook::new(vec![]), Err(CommissionError::Configuration(_))));
    }

    #[test]
    fn test_duplicate_versions_rejected() {
        let result = ScheduleBook::new(vec![
            schedule("v1", "2024-01", vec![]),
            schedule("v1", "2024-06", vec![]),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_in_force_picks_latest_effective_schedule() {
        let book = ScheduleBook::new(vec![
            schedule("v2", "2024-07", vec![]),
            schedule("v1", "2024-01", vec![]),
        ])
        .unwrap();

        assert_eq!(book.in_force(month("2024-06")).unwrap().version, "v1");
        assert_eq!(book.in_force(month("2024-07")).unwrap().version, "v2");
        assert_eq!(book.in_force(month("2025-01")).unwrap().version, "v2");
        assert!(book.in_force(month("2023-12")).is_err());
    }

    #[test]
    fn test_load_from_toml() {
        let book = ScheduleBook::from_toml_str(
            r#"
            [[schedules]]
            version = "2024.1"
            effective_from = "2024-01"
            basic_rate = "0.03"

            [[schedules.bonus_tiers]]
            min_anp = "0"
            rate = "0"

            [[schedules.bonus_tiers]]
            min_anp = "20000"
            rate = "0.02"
            "#,
        )
        .unwrap();

        let schedule = book.in_force(month("2024-03")).unwrap();
        assert_eq!(schedule.basic_rate, Rate::new(dec!(0.03)));
        assert_eq!(schedule.bonus_rate(dec!(20000)), Rate::new(dec!(0.02)));
    }

    #[test]
    fn test_load_without_schedules_is_fatal() {
        let result = ScheduleBook::from_toml_str("");
        assert!(matches!(result, Err(CommissionError::Configuration(_))));
    }
}
