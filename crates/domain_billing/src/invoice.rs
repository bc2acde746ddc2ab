//! Invoice records
//!
//! Invoices are created by the upstream sales system. The commission system
//! reads their amounts and payment dates and owns exactly one derived field,
//! `achieved_monthly_anp`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{AgentId, CustomerId, InvoiceId};

/// An invoice for a sold policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,
    /// Selling agent; missing on some legacy records
    pub agent_id: Option<AgentId>,
    pub customer_id: Option<CustomerId>,
    /// Total billed amount
    pub amount: Decimal,
    /// Portion of the invoice counted toward commission
    pub eligible_amount: Option<Decimal>,
    /// Date of the first recorded payment
    pub first_payment_date: Option<DateTime<Utc>>,
    /// Date of the payment that brought the paid total up to `amount`
    pub full_payment_date: Option<DateTime<Utc>>,
    /// Sum of amounts over the agent's invoices first paid in the same month
    pub achieved_monthly_anp: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Eligible amount after validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EligibleAmount {
    Valid(Decimal),
    Missing,
    Negative(Decimal),
}

impl EligibleAmount {
    /// The amount commission is computed on; invalid amounts count as zero
    pub fn commission_base(&self) -> Decimal {
        match self {
            EligibleAmount::Valid(amount) => *amount,
            EligibleAmount::Missing | EligibleAmount::Negative(_) => Decimal::ZERO,
        }
    }

    /// Describes why the amount was replaced by zero
    pub fn problem(&self) -> Option<String> {
        match self {
            EligibleAmount::Valid(_) => None,
            EligibleAmount::Missing => Some("eligible amount is missing; counted as zero".to_string()),
            EligibleAmount::Negative(amount) => Some(format!(
                "eligible amount {amount} is negative; counted as zero"
            )),
        }
    }
}

impl Invoice {
    pub fn new(id: InvoiceId, amount: Decimal) -> Self {
        let now = Utc::now();
        Self {
            id,
            agent_id: None,
            customer_id: None,
            amount,
            eligible_amount: None,
            first_payment_date: None,
            full_payment_date: None,
            achieved_monthly_anp: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_agent(mut self, agent_id: AgentId) -> Self {
        self.agent_id = Some(agent_id);
        self
    }

    pub fn with_customer(mut self, customer_id: CustomerId) -> Self {
        self.customer_id = Some(customer_id);
        self
    }

    pub fn with_eligible_amount(mut self, eligible_amount: Decimal) -> Self {
        self.eligible_amount = Some(eligible_amount);
        self
    }

    pub fn is_fully_paid(&self) -> bool {
        self.full_payment_date.is_some()
    }

    pub fn eligible(&self) -> EligibleAmount {
        match self.eligible_amount {
            None => EligibleAmount::Missing,
            Some(amount) if amount.is_sign_negative() && !amount.is_zero() => {
                EligibleAmount::Negative(amount)
            }
            Some(amount) => EligibleAmount::Valid(amount),
        }
    }
}
