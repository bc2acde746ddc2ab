//! Request and response types that are not domain records
//!
//! Domain types that already serialize cleanly (agents, invoices, reports)
//! are returned as they are.

pub mod party;
pub mod commission;
