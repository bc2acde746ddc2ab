//! Monthly eligible-amount report

use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use core_kernel::{AgentId, BusinessTimezone, Month};
use domain_billing::InvoicePort;
use domain_party::{Agent, AgentClassification, AgentPort, AgentQuery};

use crate::error::CommissionError;

/// One agent's line in the monthly report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyAgentRow {
    pub agent_id: AgentId,
    /// `None` when the invoice references an agent that is not on record
    pub agent_name: Option<String>,
    pub classification: AgentClassification,
    pub invoice_count: u64,
    pub total_eligible_amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyReport {
    pub month: Month,
    pub classification: Option<AgentClassification>,
    pub agents: Vec<MonthlyAgentRow>,
    pub total_invoices: u64,
    pub total_eligible_amount: Decimal,
}

/// Summarises eligible amounts per agent over invoices fully paid in a month
#[derive(Clone)]
pub struct MonthlyReportGenerator {
    invoices: Arc<dyn InvoicePort>,
    agents: Arc<dyn AgentPort>,
    timezone: BusinessTimezone,
}

impl MonthlyReportGenerator {
    pub fn new(
        invoices: Arc<dyn InvoicePort>,
        agents: Arc<dyn AgentPort>,
        timezone: BusinessTimezone,
    ) -> Self {
        Self {
            invoices,
            agents,
            timezone,
        }
    }

    #[instrument(skip(self), fields(month = %month))]
    pub async fn generate_monthly_report(
        &self,
        month: Month,
        classification: Option<AgentClassification>,
    ) -> Result<MonthlyReport, CommissionError> {
        let range = self.timezone.month_range(month)?;
        let summaries = self.invoices.summarize_eligible_by_agent(range).await?;
        let agents: HashMap<AgentId, Agent> = self
            .agents
            .list_agents(AgentQuery::default())
            .await?
            .into_iter()
            .map(|a| (a.id.clone(), a))
            .collect();

        let mut rows = Vec::with_capacity(summaries.len());
        for summary in summaries {
            let Some(agent_id) = summary.agent_id else {
                warn!(
                    invoices = summary.invoice_count,
                    "Fully paid invoices without an agent left out of monthly report"
                );
                continue;
            };
            let agent = agents.get(&agent_id);
            let row = MonthlyAgentRow {
                agent_name: agent.map(|a| a.name.clone()),
                classification: agent.map(|a| a.classification).unwrap_or_default(),
                agent_id,
                invoice_count: summary.invoice_count,
                total_eligible_amount: summary.total_eligible,
            };
            if classification.map_or(true, |c| row.classification == c) {
                rows.push(row);
            }
        }

        rows.sort_by(|a, b| {
            a.agent_name
                .cmp(&b.agent_name)
                .then_with(|| a.agent_id.cmp(&b.agent_id))
        });

        Ok(MonthlyReport {
            month,
            classification,
            total_invoices: rows.iter().map(|r| r.invoice_count).sum(),
            total_eligible_amount: rows.iter().map(|r| r.total_eligible_amount).sum(),
            agents: rows,
        })
    }
}
