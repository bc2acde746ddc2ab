//! Repository implementations
//!
//! Each repository owns the SQL for one group of tables and maps between
//! database rows and plain row structs. Queries are built at runtime with
//! `sqlx::query_as`; optional filters use the `($n IS NULL OR col = $n)` form.
//! Multi-row writes run in a transaction.

pub mod party;
pub mod billing;
pub mod commission;

pub use party::{AgentRepository, CustomerRepository};
pub use billing::InvoiceRepository;
pub use commission::CommissionRepository;
