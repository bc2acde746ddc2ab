//! Party domain errors

use thiserror::Error;

use core_kernel::PortError;

/// Errors that can occur in the party domain
#[derive(Debug, Error)]
pub enum PartyError {
    /// Agent not found
    #[error("Agent not found: {0}")]
    AgentNotFound(String),

    /// Customer not found
    #[error("Customer not found: {0}")]
    CustomerNotFound(String),

    /// Invalid data provided
    #[error("Invalid party data: {0}")]
    InvalidData(String),

    /// Request validation failed
    #[error("Party validation failed: {0}")]
    ValidationFailed(String),

    /// The underlying store failed
    #[error(transparent)]
    Port(PortError),
}

impl PartyError {
    pub fn invalid(message: impl Into<String>) -> Self {
        PartyError::InvalidData(message.into())
    }

    pub fn validation_failed(errors: Vec<String>) -> Self {
        PartyError::ValidationFailed(errors.join("; "))
    }
}

impl From<PortError> for PartyError {
    fn from(error: PortError) -> Self {
        match error {
            PortError::NotFound { entity_type, id } if entity_type == "Agent" => {
                PartyError::AgentNotFound(id)
            }
            PortError::NotFound { entity_type, id } if entity_type == "Customer" => {
                PartyError::CustomerNotFound(id)
            }
            PortError::Validation { message, .. } => PartyError::InvalidData(message),
            other => PartyError::Port(other),
        }
    }
}
