//! Party Domain
//!
//! Sales agents and customers. Both are synchronized from the upstream sales
//! system; this crate adds the admin actions the commission back office needs:
//!
//! - **Agent classification**: internal, outsource, blocked, or unset. The
//!   classification decides which commission report an agent appears in.
//! - **Contact edits**: validated name, phone and email changes.
//! - **Customer search**: substring lookup over name, phone and email.

pub mod agent;
pub mod customer;
pub mod error;
pub mod ports;
pub mod services;
pub mod validation;

pub use agent::{Agent, AgentClassification, AgentContact};
pub use customer::Customer;
pub use error::PartyError;
pub use ports::{AgentPort, AgentQuery, CustomerPort, CustomerQuery};
#[cfg(any(test, feature = "mock"))]
pub use ports::mock::{MockAgentPort, MockCustomerPort};
pub use services::PartyService;
pub use validation::AgentContactUpdate;
