//! Manual commission adjustments
//!
//! Adjustments are signed amounts an admin adds to an agent's month. They are
//! summed into the generated report and never touch invoice data.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use core_kernel::{AdjustmentId, AgentId, Month};

use crate::error::CommissionError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommissionAdjustment {
    pub id: AdjustmentId,
    pub agent_id: AgentId,
    pub month: Month,
    /// Positive to add commission, negative to deduct
    pub amount: Decimal,
    pub description: String,
    pub created_by: String,
    pub updated_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to create an adjustment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct NewAdjustment {
    pub agent_id: AgentId,
    pub month: Month,
    #[validate(custom(function = "validate_amount"))]
    pub amount: Decimal,
    #[validate(length(min = 1, max = 500, message = "description must be 1 to 500 characters"))]
    pub description: String,
}

/// Partial update of an adjustment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct AdjustmentUpdate {
    #[validate(custom(function = "validate_amount"))]
    pub amount: Option<Decimal>,
    #[validate(length(min = 1, max = 500, message = "description must be 1 to 500 characters"))]
    pub description: Option<String>,
}

/// Filters for listing adjustments
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdjustmentQuery {
    pub agent_id: Option<AgentId>,
    pub month: Option<Month>,
}

fn validate_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if amount.is_zero() {
        let mut error = ValidationError::new("amount");
        error.message = Some("amount must not be zero".into());
        return Err(error);
    }
    Ok(())
}

fn describe(errors: validator::ValidationErrors) -> CommissionError {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, field_errors)| {
            field_errors.iter().map(move |error| match &error.message {
                Some(message) => format!("{field}: {message}"),
                None => format!("{field}: {}", error.code),
            })
        })
        .collect();
    messages.sort();
    CommissionError::invalid(messages.join("; "))
}

impl NewAdjustment {
    pub fn validated(mut self) -> Result<Self, CommissionError> {
        self.description = self.description.trim().to_string();
        self.validate().map_err(describe)?;
        Ok(self)
    }

    /// Builds the stored record for this request
    pub fn into_adjustment(self, actor: &str) -> CommissionAdjustment {
        let now = Utc::now();
        CommissionAdjustment {
            id: AdjustmentId::generate(),
            agent_id: self.agent_id,
            month: self.month,
            amount: self.amount,
            description: self.description,
            created_by: actor.to_string(),
            updated_by: None,
            created_at: now,
            updated_at: now,
        }
    }
}

impl AdjustmentUpdate {
    pub fn validated(mut self) -> Result<Self, CommissionError> {
        if self.amount.is_none() && self.description.is_none() {
            return Err(CommissionError::invalid("adjustment update contains no fields"));
        }
        self.description = self.description.map(|d| d.trim().to_string());
        self.validate().map_err(describe)?;
        Ok(self)
    }
}

impl CommissionAdjustment {
    pub fn apply(&mut self, update: AdjustmentUpdate, actor: &str) {
        if let Some(amount) = update.amount {
            self.amount = amount;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        self.updated_by = Some(actor.to_string());
        self.updated_at = Utc::now();
    }
}

/// Sum of adjustment amounts
pub fn total_adjustments(adjustments: &[CommissionAdjustment]) -> Decimal {
    adjustments.iter().map(|a| a.amount).sum()
}
