//! Customers as seen by the admin dashboard

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::CustomerId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Customer {
    pub fn new(id: CustomerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            phone: None,
            email: None,
            created_at: Utc::now(),
        }
    }

    /// Case-insensitive substring match on name, phone, or email
    ///
    /// `needle` must already be lowercase.
    pub fn matches(&self, needle: &str) -> bool {
        let hit = |value: &str| value.to_lowercase().contains(needle);
        hit(&self.name)
            || self.phone.as_deref().is_some_and(hit)
            || self.email.as_deref().is_some_and(hit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_any_field() {
        let mut customer = Customer::new(CustomerId::new("c-1"), "Budi Santoso");
        customer.phone = Some("+62 812 555".to_string());
        customer.email = Some("Budi@Example.com".to_string());

        assert!(customer.matches("santoso"));
        assert!(customer.matches("812"));
        assert!(customer.matches("budi@example"));
        assert!(!customer.matches("wati"));
    }
}
