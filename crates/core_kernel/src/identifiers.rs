//! Strongly-typed identifiers for domain entities
//!
//! Invoices, agents and customers are issued by the upstream sales system,
//! so their identifiers are opaque strings. Newtype wrappers keep an agent
//! id from being passed where an invoice id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Error returned when parsing an identifier from user input
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentifierError {
    #[error("{0} identifier must not be empty")]
    Empty(&'static str),
}

macro_rules! define_id {
    ($name:ident, $prefix:literal, $label:literal) => {
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps an identifier issued elsewhere
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Generates a new time-ordered identifier
            pub fn generate() -> Self {
                Self(format!("{}-{}", $prefix, Uuid::now_v7()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_inner(self) -> String {
                self.0
            }

            /// Returns the prefix used for generated identifiers
            pub fn prefix() -> &'static str {
                $prefix
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = IdentifierError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Err(IdentifierError::Empty($label));
                }
                Ok(Self(trimmed.to_string()))
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> String {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

// Upstream records
define_id!(AgentId, "AGT", "agent");
define_id!(CustomerId, "CUS", "customer");
define_id!(InvoiceId, "INV", "invoice");
define_id!(PaymentId, "PAY", "payment");

// Records owned by the commission system
define_id!(AdjustmentId, "ADJ", "adjustment");
define_id!(ReportId, "RPT", "report");
