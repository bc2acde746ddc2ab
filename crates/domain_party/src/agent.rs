//! Sales agent management

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::AgentId;

use crate::error::PartyError;

/// Administrative classification of an agent
///
/// The classification decides which commission report an agent appears in.
/// Changing it never rewrites reports that were already generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentClassification {
    Internal,
    Outsource,
    Blocked,
    #[default]
    Unset,
}

impl AgentClassification {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentClassification::Internal => "internal",
            AgentClassification::Outsource => "outsource",
            AgentClassification::Blocked => "blocked",
            AgentClassification::Unset => "unset",
        }
    }

    /// Returns true if commission reports may be batch-generated for this class
    pub fn is_commissionable(&self) -> bool {
        matches!(self, AgentClassification::Internal | AgentClassification::Outsource)
    }
}

impl fmt::Display for AgentClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentClassification {
    type Err = PartyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "internal" => Ok(AgentClassification::Internal),
            "outsource" => Ok(AgentClassification::Outsource),
            "blocked" => Ok(AgentClassification::Blocked),
            "unset" | "" => Ok(AgentClassification::Unset),
            other => Err(PartyError::invalid(format!("unknown agent classification '{other}'"))),
        }
    }
}

/// How an agent can be reached
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentContact {
    pub phone: Option<String>,
    pub email: Option<String>,
}

/// A sales agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    pub contact: AgentContact,
    pub classification: AgentClassification,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Agent {
    /// Creates an unclassified agent
    pub fn new(id: AgentId, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: name.into(),
            contact: AgentContact::default(),
            classification: AgentClassification::Unset,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_classification(mut self, classification: AgentClassification) -> Self {
        self.classification = classification;
        self
    }

    pub fn with_contact(mut self, contact: AgentContact) -> Self {
        self.contact = contact;
        self
    }

    /// Changes the classification, returning the previous one
    pub fn reclassify(&mut self, classification: AgentClassification) -> AgentClassification {
        let previous = self.classification;
        self.classification = classification;
        self.updated_at = Utc::now();
        previous
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_agent_is_unset() {
        let agent = Agent::new(AgentId::new("a-1"), "Rina");
        assert_eq!(agent.classification, AgentClassification::Unset);
        assert!(!agent.classification.is_commissionable());
    }

    #[test]
    fn test_reclassify_returns_previous() {
        let mut agent = Agent::new(AgentId::new("a-1"), "Rina")
            .with_classification(AgentClassification::Internal);

        let previous = agent.reclassify(AgentClassification::Blocked);

        assert_eq!(previous, AgentClassification::Internal);
        assert_eq!(agent.classification, AgentClassification::Blocked);
    }

    #[test]
    fn test_classification_parse() {
        assert_eq!("Outsource".parse::<AgentClassification>().unwrap(), AgentClassification::Outsource);
        assert_eq!("".parse::<AgentClassification>().unwrap(), AgentClassification::Unset);
        assert!("partner".parse::<AgentClassification>().is_err());
    }
}
