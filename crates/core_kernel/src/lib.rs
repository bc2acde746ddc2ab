//! Core Kernel - Foundational types and utilities for the commission system
//!
//! This crate provides the building blocks shared by every domain crate:
//! - Strongly-typed identifiers for upstream records
//! - The `YYYY-MM` month type and business-timezone month boundaries
//! - Commission rates and rounding over `rust_decimal`
//! - Port error and health-check plumbing for adapters

pub mod money;
pub mod temporal;
pub mod identifiers;
pub mod error;
pub mod ports;

pub use money::{Rate, round_commission, clamp_non_negative};
pub use temporal::{Month, MonthRange, BusinessTimezone, TemporalError};
pub use identifiers::{
    AgentId, CustomerId, InvoiceId, PaymentId, AdjustmentId, ReportId,
    IdentifierError,
};
pub use error::{CoreError, RecordError};
pub use ports::{
    PortError, DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth,
};
