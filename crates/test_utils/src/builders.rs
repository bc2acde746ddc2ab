//! Test Data Builders
//!
//! Builders for invoices, payments and agents with sensible defaults, so a
//! test only names the fields it cares about.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{AgentId, CustomerId, InvoiceId, PaymentId};
use domain_billing::{Invoice, Payment, PaymentMethod};
use domain_party::{Agent, AgentClassification, AgentContact, Customer};

use crate::fixtures::{IdFixtures, TemporalFixtures};

/// Builder for invoices
pub struct InvoiceBuilder {
    invoice: Invoice,
}

impl InvoiceBuilder {
    /// An unpaid invoice of 1,000.00 for the default agent
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            invoice: Invoice::new(InvoiceId::new(id), dec!(1000)).with_agent(IdFixtures::agent()),
        }
    }

    pub fn amount(mut self, amount: Decimal) -> Self {
        self.invoice.amount = amount;
        self
    }

    pub fn eligible(mut self, eligible_amount: Decimal) -> Self {
        self.invoice.eligible_amount = Some(eligible_amount);
        self
    }

    pub fn agent(mut self, agent_id: impl Into<String>) -> Self {
        self.invoice.agent_id = Some(AgentId::new(agent_id));
        self
    }

    pub fn without_agent(mut self) -> Self {
        self.invoice.agent_id = None;
        self
    }

    pub fn customer(mut self, customer_id: CustomerId) -> Self {
        self.invoice.customer_id = Some(customer_id);
        self
    }

    pub fn first_paid(mut self, at: DateTime<Utc>) -> Self {
        self.invoice.first_payment_date = Some(at);
        self
    }

    /// Sets both payment dates to `at`
    pub fn paid(mut self, at: DateTime<Utc>) -> Self {
        self.invoice.first_payment_date = Some(at);
        self.invoice.full_payment_date = Some(at);
        self
    }

    pub fn achieved_anp(mut self, anp: Decimal) -> Self {
        self.invoice.achieved_monthly_anp = Some(anp);
        self
    }

    pub fn build(self) -> Invoice {
        self.invoice
    }
}

/// Builder for payments
pub struct PaymentBuilder {
    payment: Payment,
}

impl PaymentBuilder {
    /// A bank transfer of `amount` made on March 10th 2024
    pub fn new(id: impl Into<String>, invoice_id: impl Into<String>, amount: Decimal) -> Self {
        Self {
            payment: Payment::new(
                PaymentId::new(id),
                InvoiceId::new(invoice_id),
                amount,
                PaymentMethod::BankTransfer,
                TemporalFixtures::business_day(3, 10),
            ),
        }
    }

    pub fn on(mut self, at: DateTime<Utc>) -> Self {
        self.payment.payment_date = at;
        self
    }

    pub fn method(mut self, method: PaymentMethod) -> Self {
        self.payment.method = method;
        self
    }

    pub fn verified_by(mut self, actor: impl Into<String>) -> Self {
        self.payment.verified_by = Some(actor.into());
        self
    }

    pub fn build(self) -> Payment {
        self.payment
    }
}

/// Builder for agents
pub struct AgentBuilder {
    agent: Agent,
}

impl AgentBuilder {
    /// An internal agent
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            agent: Agent::new(AgentId::new(id), name)
                .with_classification(AgentClassification::Internal),
        }
    }

    pub fn classification(mut self, classification: AgentClassification) -> Self {
        self.agent.classification = classification;
        self
    }

    pub fn contact(mut self, phone: Option<&str>, email: Option<&str>) -> Self {
        self.agent.contact = AgentContact {
            phone: phone.map(str::to_string),
            email: email.map(str::to_string),
        };
        self
    }

    pub fn build(self) -> Agent {
        self.agent
    }
}

/// A customer with the given contact details
pub fn customer(id: &str, name: &str, phone: Option<&str>, email: Option<&str>) -> Customer {
    let mut customer = Customer::new(CustomerId::new(id), name);
    customer.phone = phone.map(str::to_string);
    customer.email = email.map(str::to_string);
    customer
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invoice_builder_defaults() {
        let invoice = InvoiceBuilder::new("inv-1").build();

        assert_eq!(invoice.amount, dec!(1000));
        assert_eq!(invoice.agent_id, Some(IdFixtures::agent()));
        assert!(invoice.full_payment_date.is_none());
    }

    #[test]
    fn test_paid_sets_both_dates() {
        let at = TemporalFixtures::business_day(3, 5);
        let invoice = InvoiceBuilder::new("inv-1").paid(at).build();

        assert_eq!(invoice.first_payment_date, Some(at));
        assert_eq!(invoice.full_payment_date, Some(at));
    }
}
