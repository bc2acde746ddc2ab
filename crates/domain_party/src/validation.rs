//! Validation of admin edits to agent records

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::PartyError;

/// Partial update of an agent's name and contact details
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct AgentContactUpdate {
    #[validate(length(min = 1, max = 120, message = "name must be 1 to 120 characters"))]
    pub name: Option<String>,
    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,
    #[validate(email(message = "email is not a valid address"))]
    pub email: Option<String>,
}

impl AgentContactUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.phone.is_none() && self.email.is_none()
    }

    /// Validates the update and trims the name
    pub fn validated(mut self) -> Result<Self, PartyError> {
        if self.is_empty() {
            return Err(PartyError::invalid("contact update contains no fields"));
        }
        self.name = self.name.map(|name| name.trim().to_string());
        self.validate().map_err(|errors| PartyError::validation_failed(flatten(&errors)))?;
        Ok(self)
    }
}

fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let allowed = phone
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-'));
    let length = phone.chars().count();
    if !allowed || !(6..=20).contains(&length) {
        let mut error = ValidationError::new("phone");
        error.message = Some("phone must be 6 to 20 digits, spaces, '+' or '-'".into());
        return Err(error);
    }
    Ok(())
}

fn flatten(errors: &ValidationErrors) -> Vec<String> {
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
    messages
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_update_trims_name() {
        let update = AgentContactUpdate {
            name: Some("  Dewi  ".to_string()),
            phone: Some("+62 811-000-111".to_string()),
            email: Some("dewi@example.com".to_string()),
        };

        let validated = update.validated().unwrap();
        assert_eq!(validated.name.as_deref(), Some("Dewi"));
    }

    #[test]
    fn test_empty_update_is_rejected() {
        assert!(matches!(
            AgentContactUpdate::default().validated(),
            Err(PartyError::InvalidData(_))
        ));
    }

    #[test]
    fn test_invalid_fields_are_reported() {
        let update = AgentContactUpdate {
            name: Some("   ".to_string()),
            phone: Some("call me".to_string()),
            email: Some("not-an-email".to_string()),
        };

        match update.validated() {
            Err(PartyError::ValidationFailed(message)) => {
                assert!(message.contains("name"));
                assert!(message.contains("phone"));
                assert!(message.contains("email"));
            }
            other => panic!("expected validation failure, got {other:?}"),
        }
    }
}
