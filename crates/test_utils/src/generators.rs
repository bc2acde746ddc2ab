//! Property-Based Test Generators
//!
//! Proptest strategies for invoice amounts, payment sequences, ANP values
//! and bonus tier ladders, plus a `fake`-backed agent generator.

use chrono::{DateTime, Duration, Utc};
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use fake::faker::phone_number::en::PhoneNumber;
use fake::Fake;
use proptest::prelude::*;
use rust_decimal::Decimal;

use core_kernel::{AgentId, Rate};
use domain_commission::BonusTier;
use domain_party::{Agent, AgentClassification, AgentContact};

use crate::fixtures::TemporalFixtures;

/// Positive amounts with two decimal places, up to 10 million
pub fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Signed amounts, as seen on refunds and corrections
pub fn signed_amount_strategy() -> impl Strategy<Value = Decimal> {
    (-100_000_000i64..1_000_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Achieved ANP values covering every standard bonus tier
pub fn anp_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Instants within March and April 2024
pub fn payment_date_strategy() -> impl Strategy<Value = DateTime<Utc>> {
    (0i64..61 * 24 * 60).prop_map(|minutes| {
        TemporalFixtures::business_day(3, 1) + Duration::minutes(minutes)
    })
}

/// Payment amounts, refunds included, in arbitrary date order
pub fn payment_sequence_strategy() -> impl Strategy<Value = Vec<(Decimal, DateTime<Utc>)>> {
    prop::collection::vec((signed_amount_strategy(), payment_date_strategy()), 1..8)
}

/// Valid bonus tier ladders: first tier at zero ANP, thresholds strictly
/// increasing, rates non-decreasing
pub fn bonus_tiers_strategy() -> impl Strategy<Value = Vec<BonusTier>> {
    prop::collection::vec((1i64..5_000, 0i64..100), 1..6).prop_map(|steps| {
        let mut min_anp = Decimal::ZERO;
        let mut rate = Decimal::ZERO;
        steps
            .into_iter()
            .map(|(gap, bump)| {
                let tier = BonusTier::new(min_anp, Rate::new(rate));
                min_anp += Decimal::from(gap);
                rate += Decimal::new(bump, 4);
                tier
            })
            .collect()
    })
}

/// An agent with a generated name and contact details
pub fn fake_agent(id: impl Into<String>, classification: AgentClassification) -> Agent {
    Agent::new(AgentId::new(id), Name().fake::<String>())
        .with_classification(classification)
        .with_contact(AgentContact {
            phone: Some(PhoneNumber().fake()),
            email: Some(SafeEmail().fake()),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn amounts_are_positive(amount in amount_strategy()) {
            prop_assert!(amount > Decimal::ZERO);
        }

        #[test]
        fn payment_dates_stay_in_window(at in payment_date_strategy()) {
            let month = TemporalFixtures::timezone().month_of(at);
            prop_assert!(month >= TemporalFixtures::march());
        }
    }

    #[test]
    fn test_fake_agent_has_contact() {
        let agent = fake_agent("a-1", AgentClassification::Outsource);
        assert!(!agent.name.is_empty());
        assert!(agent.contact.email.is_some());
    }
}
