//! Billing domain errors

use thiserror::Error;

use core_kernel::{PortError, TemporalError};

/// Errors that can occur in the billing domain
#[derive(Debug, Error)]
pub enum BillingError {
    /// Invoice not found
    #[error("Invoice not found: {0}")]
    InvoiceNotFound(String),

    /// Month boundaries could not be computed in the business timezone
    #[error("Invalid billing period: {0}")]
    InvalidPeriod(#[from] TemporalError),

    /// Invalid query or record data
    #[error("Invalid billing data: {0}")]
    InvalidData(String),

    /// The underlying store failed
    #[error(transparent)]
    Port(PortError),
}

impl From<PortError> for BillingError {
    fn from(error: PortError) -> Self {
        match error {
            PortError::NotFound { entity_type, id } if entity_type == "Invoice" => {
                BillingError::InvoiceNotFound(id)
            }
            PortError::Validation { message, .. } => BillingError::InvalidData(message),
            other => BillingError::Port(other),
        }
    }
}
