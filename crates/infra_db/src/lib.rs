//! Infrastructure Database Layer
//!
//! PostgreSQL storage for the commission back office, built on SQLx.
//!
//! # Architecture
//!
//! Repositories own the SQL and work on plain row types. Adapters wrap the
//! repositories and implement the domain ports (`InvoicePort`, `AgentPort`,
//! `CustomerPort`, `CommissionPort`), converting rows to domain types and
//! database errors to `PortError`.
//!
//! Agents, customers, invoices and payments are written by the upstream sales
//! system. This crate only writes the derived invoice columns, agent admin
//! edits, adjustments and generated reports.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, run_migrations, DatabaseConfig};
//! use infra_db::adapters::PostgresInvoiceAdapter;
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/commission")).await?;
//! run_migrations(&pool).await?;
//! let invoices = PostgresInvoiceAdapter::new(pool);
//! ```

pub mod pool;
pub mod error;
pub mod repositories;
pub mod adapters;

pub use pool::{DatabasePool, create_pool, run_migrations, DatabaseConfig};
pub use error::DatabaseError;
pub use adapters::{PostgresCommissionAdapter, PostgresInvoiceAdapter, PostgresPartyAdapter};
