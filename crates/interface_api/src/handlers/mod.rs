//! Request handlers
//!
//! Handlers check the caller's role, delegate to a domain service, and map
//! the domain error into an `ApiError`. The token subject is passed to the
//! services as the acting user on every write.

pub mod health;
pub mod anp;
pub mod commissions;
pub mod reports;
pub mod adjustments;
pub mod party;
pub mod invoices;
