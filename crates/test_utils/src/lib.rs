//! Test Utilities Crate
//!
//! Shared test infrastructure for the commission back office.
//!
//! # Modules
//!
//! - `fixtures`: Fixed dates, schedules and identifiers
//! - `builders`: Builders for invoices, payments and agents
//! - `database`: PostgreSQL test containers and seed helpers
//! - `assertions`: Assertions for commission results
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod database;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use database::*;
pub use assertions::*;
pub use generators::*;
