//! Billing Domain - Invoices and payment settlement
//!
//! Invoices and payments are recorded by the upstream sales system. This
//! crate reads them for the commission rules and maintains the derived
//! payment dates:
//!
//! - **First-payment date**: the earliest positive payment. Drives ANP
//!   grouping.
//! - **Full-payment date**: the payment whose running sum reaches the invoice
//!   amount. Drives commission months.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_billing::{BillingService, PaymentSettlement};
//!
//! let service = BillingService::new(invoice_port, BusinessTimezone::default());
//! let detail = service.get_invoice_detail(&invoice_id).await?;
//! assert_eq!(detail.settlement, PaymentSettlement::evaluate(detail.invoice.amount, &detail.payments));
//! ```

pub mod invoice;
pub mod payment;
pub mod settlement;
pub mod ports;
pub mod services;
pub mod error;

pub use invoice::{Invoice, EligibleAmount};
pub use payment::{Payment, PaymentMethod};
pub use settlement::PaymentSettlement;
pub use ports::{InvoicePort, InvoiceQuery, AnpCandidate, EligibleSummary, StoredAnp};
#[cfg(any(test, feature = "mock"))]
pub use ports::mock::MockInvoicePort;
pub use services::{BillingService, InvoiceDetail, InvoiceFilter, SettlementRefreshResult};
pub use error::BillingError;
