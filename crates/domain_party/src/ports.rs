//! Party Domain Ports
//!
//! Agents and customers are owned by the upstream sales system; the commission
//! system only reads them and applies a few admin edits. The PostgreSQL
//! adapter lives in `infra_db`; the in-memory mocks below are available with
//! the `mock` feature.
//!
//! ```rust,ignore
//! let agents: Arc<dyn AgentPort> = Arc::new(PostgresPartyAdapter::new(pool));
//! let service = PartyService::new(agents, customers);
//! ```

use async_trait::async_trait;

use core_kernel::{AgentId, CustomerId, DomainPort, HealthCheckable, PortError};

use crate::agent::{Agent, AgentClassification};
use crate::customer::Customer;
use crate::validation::AgentContactUpdate;

/// Query parameters for listing agents
#[derive(Debug, Clone, Default)]
pub struct AgentQuery {
    pub classification: Option<AgentClassification>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl AgentQuery {
    pub fn by_classification(classification: AgentClassification) -> Self {
        Self {
            classification: Some(classification),
            ..Default::default()
        }
    }

    pub fn paginate(mut self, limit: u32, offset: u32) -> Self {
        self.limit = Some(limit);
        self.offset = Some(offset);
        self
    }
}

/// Free-text customer search
#[derive(Debug, Clone)]
pub struct CustomerQuery {
    /// Lowercased, trimmed search text
    pub text: String,
    pub limit: u32,
}

/// Data access for agents
#[async_trait]
pub trait AgentPort: DomainPort + HealthCheckable {
    async fn get_agent(&self, id: &AgentId) -> Result<Agent, PortError>;

    /// Lists agents ordered by name, then id
    async fn list_agents(&self, query: AgentQuery) -> Result<Vec<Agent>, PortError>;

    async fn update_classification(
        &self,
        id: &AgentId,
        classification: AgentClassification,
    ) -> Result<Agent, PortError>;

    /// Applies the fields present in `update`; absent fields are left as-is
    async fn update_contact(
        &self,
        id: &AgentId,
        update: &AgentContactUpdate,
    ) -> Result<Agent, PortError>;
}

/// Data access for customers
#[async_trait]
pub trait CustomerPort: DomainPort + HealthCheckable {
    async fn get_customer(&self, id: &CustomerId) -> Result<Customer, PortError>;

    /// Case-insensitive substring search over name, phone and email
    async fn search_customers(&self, query: CustomerQuery) -> Result<Vec<Customer>, PortError>;
}

/// Mock implementations for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    use core_kernel::HealthCheckResult;

    /// In-memory mock implementation of AgentPort
    #[derive(Debug, Default, Clone)]
    pub struct MockAgentPort {
        agents: Arc<RwLock<HashMap<AgentId, Agent>>>,
    }

    impl MockAgentPort {
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-populates with agents for testing
        pub async fn with_agents(agents: Vec<Agent>) -> Self {
            let port = Self::new();
            for agent in agents {
                port.insert(agent).await;
            }
            port
        }

        pub async fn insert(&self, agent: Agent) {
            self.agents.write().await.insert(agent.id.clone(), agent);
        }
    }

    impl DomainPort for MockAgentPort {}

    #[async_trait]
    impl HealthCheckable for MockAgentPort {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult::healthy("mock-agent-port", 0)
        }
    }

    #[async_trait]
    impl AgentPort for MockAgentPort {
        async fn get_agent(&self, id: &AgentId) -> Result<Agent, PortError> {
            self.agents
                .read()
                .await
                .get(id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Agent", id))
        }

        async fn list_agents(&self, query: AgentQuery) -> Result<Vec<Agent>, PortError> {
            let agents = self.agents.read().await;
            let mut results: Vec<Agent> = agents
                .values()
                .filter(|a| query.classification.map_or(true, |c| a.classification == c))
                .cloned()
                .collect();
            results.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));

            let offset = query.offset.unwrap_or(0) as usize;
            let limit = query.limit.map_or(usize::MAX, |l| l as usize);
            Ok(results.into_iter().skip(offset).take(limit).collect())
        }

        async fn update_classification(
            &self,
            id: &AgentId,
            classification: AgentClassification,
        ) -> Result<Agent, PortError> {
            let mut agents = self.agents.write().await;
            let agent = agents
                .get_mut(id)
                .ok_or_else(|| PortError::not_found("Agent", id))?;
            agent.reclassify(classification);
            Ok(agent.clone())
        }

        async fn update_contact(
            &self,
            id: &AgentId,
            update: &AgentContactUpdate,
        ) -> Result<Agent, PortError> {
            let mut agents = self.agents.write().await;
            let agent = agents
                .get_mut(id)
                .ok_or_else(|| PortError::not_found("Agent", id))?;
            if let Some(name) = &update.name {
                agent.name = name.clone();
            }
            if let Some(phone) = &update.phone {
                agent.contact.phone = Some(phone.clone());
            }
            if let Some(email) = &update.email {
                agent.contact.email = Some(email.clone());
            }
            agent.updated_at = Utc::now();
            Ok(agent.clone())
        }
    }

    /// In-memory mock implementation of CustomerPort
    #[derive(Debug, Default, Clone)]
    pub struct MockCustomerPort {
        customers: Arc<RwLock<HashMap<CustomerId, Customer>>>,
    }

    impl MockCustomerPort {
        pub fn new() -> Self {
            Self::default()
        }

        pub async fn with_customers(customers: Vec<Customer>) -> Self {
            let port = Self::new();
            {
                let mut map = port.customers.write().await;
                for customer in customers {
                    map.insert(customer.id.clone(), customer);
                }
            }
            port
        }
    }

    impl DomainPort for MockCustomerPort {}

    #[async_trait]
    impl HealthCheckable for MockCustomerPort {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult::healthy("mock-customer-port", 0)
        }
    }

    #[async_trait]
    impl CustomerPort for MockCustomerPort {
        async fn get_customer(&self, id: &CustomerId) -> Result<Customer, PortError> {
            self.customers
                .read()
                .await
                .get(id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Customer", id))
        }

        async fn search_customers(&self, query: CustomerQuery) -> Result<Vec<Customer>, PortError> {
            let customers = self.customers.read().await;
            let mut results: Vec<Customer> = customers
                .values()
                .filter(|c| c.matches(&query.text))
                .cloned()
                .collect();
            results.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
            results.truncate(query.limit as usize);
            Ok(results)
        }
    }
}
