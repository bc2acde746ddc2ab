//! Commission domain errors

use thiserror::Error;

use core_kernel::{PortError, TemporalError};

/// Errors that can occur in the commission domain
///
/// `Configuration` is the only fatal class: it aborts a whole computation.
/// Per-record problems are reported inside results as `RecordError`s instead.
#[derive(Debug, Error)]
pub enum CommissionError {
    /// Commission schedules are missing or invalid
    #[error("Commission configuration error: {0}")]
    Configuration(String),

    /// Month boundaries could not be computed in the business timezone
    #[error("Invalid commission period: {0}")]
    InvalidPeriod(#[from] TemporalError),

    /// Agent not found
    #[error("Agent not found: {0}")]
    AgentNotFound(String),

    /// Adjustment not found
    #[error("Commission adjustment not found: {0}")]
    AdjustmentNotFound(String),

    /// Generated report not found
    #[error("Commission report not found: {0}")]
    ReportNotFound(String),

    /// The operation conflicts with stored state
    #[error("Commission conflict: {0}")]
    Conflict(String),

    /// Invalid request data
    #[error("Invalid commission data: {0}")]
    InvalidData(String),

    /// The underlying store failed
    #[error(transparent)]
    Port(PortError),
}

impl CommissionError {
    pub fn configuration(message: impl Into<String>) -> Self {
        CommissionError::Configuration(message.into())
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        CommissionError::InvalidData(message.into())
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, CommissionError::Configuration(_))
    }
}

impl From<PortError> for CommissionError {
    fn from(error: PortError) -> Self {
        match error {
            PortError::NotFound { entity_type, id } => match entity_type.as_str() {
                "Agent" => CommissionError::AgentNotFound(id),
                "Adjustment" => CommissionError::AdjustmentNotFound(id),
                "Report" => CommissionError::ReportNotFound(id),
                _ => CommissionError::Port(PortError::NotFound { entity_type, id }),
            },
            PortError::Conflict { message } => CommissionError::Conflict(message),
            PortError::Validation { message, .. } => CommissionError::InvalidData(message),
            other => CommissionError::Port(other),
        }
    }
}
