//! API error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use core_kernel::PortError;
use domain_billing::BillingError;
use domain_commission::CommissionError;
use domain_party::PartyError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", "Unauthorized".to_string()),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg.clone()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg.clone()),
            ApiError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, "unavailable", msg.clone()),
            ApiError::Configuration(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "configuration_error", msg.clone()),
            ApiError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_error", msg.clone()),
        };

        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }

        // Validation messages join one entry per field with "; "
        let details = match &self {
            ApiError::Validation(msg) if msg.contains("; ") => {
                Some(msg.split("; ").map(str::to_string).collect())
            }
            _ => None,
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<PortError> for ApiError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound { entity_type, id } => {
                ApiError::NotFound(format!("{entity_type} {id} not found"))
            }
            PortError::Validation { message, .. } => ApiError::Validation(message),
            PortError::Conflict { message } => ApiError::Conflict(message),
            PortError::Connection { message, .. } => ApiError::Unavailable(message),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<PartyError> for ApiError {
    fn from(err: PartyError) -> Self {
        match err {
            PartyError::AgentNotFound(_) | PartyError::CustomerNotFound(_) => {
                ApiError::NotFound(err.to_string())
            }
            PartyError::InvalidData(msg) | PartyError::ValidationFailed(msg) => {
                ApiError::Validation(msg)
            }
            PartyError::Port(port) => port.into(),
        }
    }
}

impl From<BillingError> for ApiError {
    fn from(err: BillingError) -> Self {
        match err {
            BillingError::InvoiceNotFound(_) => ApiError::NotFound(err.to_string()),
            BillingError::InvalidPeriod(_) => ApiError::BadRequest(err.to_string()),
            BillingError::InvalidData(msg) => ApiError::Validation(msg),
            BillingError::Port(port) => port.into(),
        }
    }
}

impl From<CommissionError> for ApiError {
    fn from(err: CommissionError) -> Self {
        match err {
            CommissionError::Configuration(msg) => ApiError::Configuration(msg),
            CommissionError::InvalidPeriod(_) => ApiError::BadRequest(err.to_string()),
            CommissionError::AgentNotFound(_)
            | CommissionError::AdjustmentNotFound(_)
            | CommissionError::ReportNotFound(_) => ApiError::NotFound(err.to_string()),
            CommissionError::Conflict(msg) => ApiError::Conflict(msg),
            CommissionError::InvalidData(msg) => ApiError::Validation(msg),
            CommissionError::Port(port) => port.into(),
        }
    }
}
