//! Payment records

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{InvoiceId, PaymentId};

/// Payment method as recorded by the finance team
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum PaymentMethod {
    BankTransfer,
    VirtualAccount,
    Card,
    Cash,
    EWallet,
    /// Any method the upstream system records that is not listed above
    Other(String),
}

impl PaymentMethod {
    pub fn as_str(&self) -> &str {
        match self {
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::VirtualAccount => "virtual_account",
            PaymentMethod::Card => "card",
            PaymentMethod::Cash => "cash",
            PaymentMethod::EWallet => "e_wallet",
            PaymentMethod::Other(method) => method,
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "bank_transfer" | "transfer" => PaymentMethod::BankTransfer,
            "virtual_account" | "va" => PaymentMethod::VirtualAccount,
            "card" | "credit_card" | "debit_card" => PaymentMethod::Card,
            "cash" => PaymentMethod::Cash,
            "e_wallet" | "ewallet" => PaymentMethod::EWallet,
            _ => PaymentMethod::Other(s.trim().to_string()),
        })
    }
}

impl From<String> for PaymentMethod {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(method) => method,
            Err(never) => match never {},
        }
    }
}

impl From<PaymentMethod> for String {
    fn from(method: PaymentMethod) -> Self {
        method.as_str().to_string()
    }
}

/// A payment received against an invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub invoice_id: InvoiceId,
    /// Negative for refunds
    pub amount: Decimal,
    pub method: PaymentMethod,
    /// Finance user who verified the transfer
    pub verified_by: Option<String>,
    pub payment_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Payment {
    pub fn new(
        id: PaymentId,
        invoice_id: InvoiceId,
        amount: Decimal,
        method: PaymentMethod,
        payment_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            invoice_id,
            amount,
            method,
            verified_by: None,
            payment_date,
            created_at: Utc::now(),
        }
    }

    pub fn verified_by(mut self, actor: impl Into<String>) -> Self {
        self.verified_by = Some(actor.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_method_is_preserved() {
        let method: PaymentMethod = "QRIS".parse().unwrap();
        assert_eq!(method, PaymentMethod::Other("QRIS".to_string()));
        assert_eq!(method.to_string(), "QRIS");
    }

    #[test]
    fn test_method_serializes_as_string() {
        let json = serde_json::to_string(&PaymentMethod::BankTransfer).unwrap();
        assert_eq!(json, "\"bank_transfer\"");
        let back: PaymentMethod = serde_json::from_str("\"va\"").unwrap();
        assert_eq!(back, PaymentMethod::VirtualAccount);
    }
}
