//! Agent and customer administration

use std::sync::Arc;

use tracing::{info, instrument};

use core_kernel::AgentId;

use crate::agent::{Agent, AgentClassification};
use crate::customer::Customer;
use crate::error::PartyError;
use crate::ports::{AgentPort, AgentQuery, CustomerPort, CustomerQuery};
use crate::validation::AgentContactUpdate;

/// Default number of customers returned by a search
pub const DEFAULT_SEARCH_LIMIT: u32 = 20;
/// Upper bound on customers returned by a search
pub const MAX_SEARCH_LIMIT: u32 = 100;
/// Shortest accepted search text
pub const MIN_SEARCH_LENGTH: usize = 2;

/// Service for the agent and customer admin views
#[derive(Clone)]
pub struct PartyService {
    agents: Arc<dyn AgentPort>,
    customers: Arc<dyn CustomerPort>,
}

impl PartyService {
    pub fn new(agents: Arc<dyn AgentPort>, customers: Arc<dyn CustomerPort>) -> Self {
        Self { agents, customers }
    }

    pub async fn get_agent(&self, id: &AgentId) -> Result<Agent, PartyError> {
        Ok(self.agents.get_agent(id).await?)
    }

    pub async fn list_agents(&self, query: AgentQuery) -> Result<Vec<Agent>, PartyError> {
        Ok(self.agents.list_agents(query).await?)
    }

    /// Reclassifies an agent
    ///
    /// Historical commission reports are not touched; the new classification
    /// only affects reports generated afterwards.
    #[instrument(skip(self), fields(agent_id = %id))]
    pub async fn reclassify_agent(
        &self,
        id: &AgentId,
        classification: AgentClassification,
        actor: &str,
    ) -> Result<Agent, PartyError> {
        let current = self.agents.get_agent(id).await?;
        if current.classification == classification {
            return Ok(current);
        }

        let updated = self.agents.update_classification(id, classification).await?;
        info!(
            actor,
            from = %current.classification,
            to = %classification,
            "Agent reclassified"
        );
        Ok(updated)
    }

    #[instrument(skip(self, update), fields(agent_id = %id))]
    pub async fn update_agent_contact(
        &self,
        id: &AgentId,
        update: AgentContactUpdate,
        actor: &str,
    ) -> Result<Agent, PartyError> {
        let update = update.validated()?;
        let agent = self.agents.update_contact(id, &update).await?;
        info!(actor, "Agent contact updated");
        Ok(agent)
    }

    /// Searches customers by name, phone, or email
    pub async fn search_customers(
        &self,
        text: &str,
        limit: Option<u32>,
    ) -> Result<Vec<Customer>, PartyError> {
        let text = text.trim().to_lowercase();
        if text.chars().count() < MIN_SEARCH_LENGTH {
            return Err(PartyError::invalid(format!(
                "search text must be at least {MIN_SEARCH_LENGTH} characters"
            )));
        }

        let limit = limit.unwrap_or(DEFAULT_SEARCH_LIMIT).clamp(1, MAX_SEARCH_LIMIT);
        Ok(self
            .customers
            .search_customers(CustomerQuery { text, limit })
            .await?)
    }
}
