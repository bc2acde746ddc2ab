//! PostgreSQL Party Adapter
//!
//! Implements `AgentPort` and `CustomerPort` over the agents and customers
//! tables.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{AgentId, CustomerId, DomainPort, HealthCheckResult, HealthCheckable, PortError};
use domain_party::{
    Agent, AgentClassification, AgentContact, AgentContactUpdate, AgentPort, AgentQuery, Customer,
    CustomerPort, CustomerQuery,
};

use crate::repositories::party::{
    AgentClassification as DbClassification, AgentContactChange, AgentRepository, AgentRow,
    CustomerRepository, CustomerRow,
};

/// PostgreSQL-backed implementation of the agent and customer ports
#[derive(Debug, Clone)]
pub struct PostgresPartyAdapter {
    agents: AgentRepository,
    customers: CustomerRepository,
    pool: PgPool,
}

impl PostgresPartyAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            agents: AgentRepository::new(pool.clone()),
            customers: CustomerRepository::new(pool.clone()),
            pool,
        }
    }
}

impl DomainPort for PostgresPartyAdapter {}

#[async_trait]
impl HealthCheckable for PostgresPartyAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        super::ping(&self.pool, "postgres-party-adapter").await
    }
}

#[async_trait]
impl AgentPort for PostgresPartyAdapter {
    #[instrument(skip(self), fields(agent_id = %id))]
    async fn get_agent(&self, id: &AgentId) -> Result<Agent, PortError> {
        let row = self.agents.get_by_id(id.as_str()).await?;
        Ok(row_to_agent(row))
    }

    #[instrument(skip(self))]
    async fn list_agents(&self, query: AgentQuery) -> Result<Vec<Agent>, PortError> {
        debug!("Listing agents with query: {:?}", query);
        let rows = self
            .agents
            .list(
                query.classification.map(to_db_classification),
                query.limit.map(i64::from),
                query.offset.map(i64::from),
            )
            .await?;
        Ok(rows.into_iter().map(row_to_agent).collect())
    }

    #[instrument(skip(self), fields(agent_id = %id))]
    async fn update_classification(
        &self,
        id: &AgentId,
        classification: AgentClassification,
    ) -> Result<Agent, PortError> {
        let row = self
            .agents
            .update_classification(id.as_str(), to_db_classification(classification))
            .await?;
        Ok(row_to_agent(row))
    }

    #[instrument(skip(self, update), fields(agent_id = %id))]
    async fn update_contact(
        &self,
        id: &AgentId,
        update: &AgentContactUpdate,
    ) -> Result<Agent, PortError> {
        let change = AgentContactChange {
            name: update.name.as_deref(),
            phone: update.phone.as_deref(),
            email: update.email.as_deref(),
        };
        let row = self.agents.update_contact(id.as_str(), change).await?;
        Ok(row_to_agent(row))
    }
}

#[async_trait]
impl CustomerPort for PostgresPartyAdapter {
    #[instrument(skip(self), fields(customer_id = %id))]
    async fn get_customer(&self, id: &CustomerId) -> Result<Customer, PortError> {
        let row = self.customers.get_by_id(id.as_str()).await?;
        Ok(row_to_customer(row))
    }

    #[instrument(skip(self), fields(text = %query.text))]
    async fn search_customers(&self, query: CustomerQuery) -> Result<Vec<Customer>, PortError> {
        let rows = self
            .customers
            .search(&query.text, i64::from(query.limit))
            .await?;
        Ok(rows.into_iter().map(row_to_customer).collect())
    }
}

// ============================================================================
// Conversion helpers
// ============================================================================

pub(crate) fn to_db_classification(classification: AgentClassification) -> DbClassification {
    match classification {
        AgentClassification::Internal => DbClassification::Internal,
        AgentClassification::Outsource => DbClassification::Outsource,
        AgentClassification::Blocked => DbClassification::Blocked,
        AgentClassification::Unset => DbClassification::Unset,
    }
}

pub(crate) fn from_db_classification(classification: DbClassification) -> AgentClassification {
    match classification {
        DbClassification::Internal => AgentClassification::Internal,
        DbClassification::Outsource => AgentClassification::Outsource,
        DbClassification::Blocked => AgentClassification::Blocked,
        DbClassification::Unset => AgentClassification::Unset,
    }
}

fn row_to_agent(row: AgentRow) -> Agent {
    Agent {
        id: AgentId::new(row.id),
        name: row.name,
        contact: AgentContact {
            phone: row.phone,
            email: row.email,
        },
        classification: from_db_classification(row.classification),
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

fn row_to_customer(row: CustomerRow) -> Customer {
    Customer {
        id: CustomerId::new(row.id),
        name: row.name,
        phone: row.phone,
        email: row.email,
        created_at: row.created_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_classification_round_trip() {
        for classification in [
            AgentClassification::Internal,
            AgentClassification::Outsource,
            AgentClassification::Blocked,
            AgentClassification::Unset,
        ] {
            assert_eq!(from_db_classification(to_db_classification(classification)), classification);
        }
    }

    #[test]
    fn test_row_to_agent_keeps_contact() {
        let now = Utc::now();
        let agent = row_to_agent(AgentRow {
            id: "a-1".to_string(),
            name: "Rina".to_string(),
            phone: Some("+62811".to_string()),
            email: None,
            classification: DbClassification::Outsource,
            created_at: now,
            updated_at: now,
        });

        assert_eq!(agent.id, AgentId::new("a-1"));
        assert_eq!(agent.contact.phone.as_deref(), Some("+62811"));
        assert_eq!(agent.classification, AgentClassification::Outsource);
    }
}
