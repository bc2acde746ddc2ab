//! Commission rates and rounding
//!
//! All amounts are `rust_decimal::Decimal` in the business currency. Rates are
//! stored as fractions (0.03 for 3%).

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Decimal places kept on computed commission values
pub const COMMISSION_DECIMAL_PLACES: u32 = 2;

/// Represents a percentage rate (e.g., basic or bonus commission rate)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rate {
    /// The rate as a decimal (e.g., 0.05 for 5%)
    value: Decimal,
}

impl Rate {
    /// Creates a rate from a decimal value (e.g., 0.05 for 5%)
    pub fn new(value: Decimal) -> Self {
        Self { value }
    }

    /// Creates a rate from a percentage (e.g., 5.0 for 5%)
    pub fn from_percentage(percentage: Decimal) -> Self {
        Self {
            value: percentage / dec!(100),
        }
    }

    pub fn zero() -> Self {
        Self { value: Decimal::ZERO }
    }

    /// Returns the rate as a decimal
    pub fn as_decimal(&self) -> Decimal {
        self.value
    }

    /// Returns the rate as a percentage
    pub fn as_percentage(&self) -> Decimal {
        self.value * dec!(100)
    }

    pub fn is_negative(&self) -> bool {
        self.value.is_sign_negative() && !self.value.is_zero()
    }

    /// Applies this rate to an amount, rounded to commission precision
    pub fn apply(&self, amount: Decimal) -> Decimal {
        round_commission(amount * self.value)
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.as_percentage().round_dp(4).normalize())
    }
}

/// Rounds a commission value to two places, midpoint away from zero
pub fn round_commission(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(
        COMMISSION_DECIMAL_PLACES,
        RoundingStrategy::MidpointAwayFromZero,
    )
}

/// Returns zero for negative amounts
pub fn clamp_non_negative(amount: Decimal) -> Decimal {
    amount.max(Decimal::ZERO)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn higher_rate_never_yields_less_commission(
            amount in 0i64..1_000_000_000i64,
            low in 0u32..5000u32,
            extra in 0u32..5000u32
        ) {
            let amount = Decimal::new(amount, 2);
            let low_rate = Rate::new(Decimal::new(low as i64, 4));
            let high_rate = Rate::new(Decimal::new((low + extra) as i64, 4));

            prop_assert!(high_rate.apply(amount) >= low_rate.apply(amount));
        }
    }
}
