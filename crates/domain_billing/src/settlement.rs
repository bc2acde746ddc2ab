//! Payment settlement
//!
//! Derives the first-payment and full-payment dates of an invoice from its
//! payments. Payments are replayed in `(payment_date, id)` order; the
//! full-payment date is the date of the payment whose running sum reaches
//! the invoice amount. When a refund later pulls the running sum back under
//! the amount, the invoice is only settled again by a later crossing.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::invoice::Invoice;
use crate::payment::Payment;

/// Settlement state of one invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentSettlement {
    pub paid_total: Decimal,
    /// Amount still owed; zero once fully paid
    pub outstanding: Decimal,
    pub first_payment_date: Option<DateTime<Utc>>,
    pub full_payment_date: Option<DateTime<Utc>>,
}

impl PaymentSettlement {
    pub fn evaluate(amount: Decimal, payments: &[Payment]) -> Self {
        let mut ordered: Vec<&Payment> = payments.iter().collect();
        ordered.sort_by(|a, b| {
            a.payment_date
                .cmp(&b.payment_date)
                .then_with(|| a.id.cmp(&b.id))
        });

        let first_payment_date = ordered
            .iter()
            .find(|p| p.amount > Decimal::ZERO)
            .map(|p| p.payment_date);

        let mut running = Decimal::ZERO;
        let mut full_payment_date = None;
        for payment in &ordered {
            let before = running;
            running += payment.amount;
            if running >= amount && (before < amount || full_payment_date.is_none()) {
                full_payment_date = Some(payment.payment_date);
            } else if running < amount {
                full_payment_date = None;
            }
        }

        let outstanding = if running >= amount {
            Decimal::ZERO
        } else {
            amount - running
        };

        Self {
            paid_total: running,
            outstanding,
            first_payment_date,
            full_payment_date,
        }
    }

    pub fn is_fully_paid(&self) -> bool {
        self.full_payment_date.is_some()
    }

    /// True when the invoice's stored payment dates disagree with this settlement
    pub fn differs_from(&self, invoice: &Invoice) -> bool {
        invoice.first_payment_date != self.first_payment_date
            || invoice.full_payment_date != self.full_payment_date
    }
}
