//! Commission adjustment and report services

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use core_kernel::{AdjustmentId, AgentId, Month, RecordError, ReportId};
use domain_party::{AgentClassification, AgentPort, AgentQuery};

use crate::adjustment::{AdjustmentQuery, AdjustmentUpdate, CommissionAdjustment, NewAdjustment};
use crate::calculator::CommissionCalculator;
use crate::error::CommissionError;
use crate::ports::CommissionPort;
use crate::report::{GeneratedCommissionReport, ReportDraft, ReportQuery};

/// Outcome of generating reports for a group of agents
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportBatchResult {
    pub month: Option<Month>,
    pub reports: Vec<GeneratedCommissionReport>,
    pub errors: Vec<RecordError>,
}

/// Service for adjustments and generated commission reports
#[derive(Clone)]
pub struct CommissionService {
    calculator: CommissionCalculator,
    commissions: Arc<dyn CommissionPort>,
    agents: Arc<dyn AgentPort>,
}

impl CommissionService {
    pub fn new(
        calculator: CommissionCalculator,
        commissions: Arc<dyn CommissionPort>,
        agents: Arc<dyn AgentPort>,
    ) -> Self {
        Self {
            calculator,
            commissions,
            agents,
        }
    }

    pub fn calculator(&self) -> &CommissionCalculator {
        &self.calculator
    }

    // ------------------------------------------------------------------
    // Adjustments
    // ------------------------------------------------------------------

    pub async fn list_adjustments(
        &self,
        query: AdjustmentQuery,
    ) -> Result<Vec<CommissionAdjustment>, CommissionError> {
        Ok(self.commissions.list_adjustments(query).await?)
    }

    #[instrument(skip(self, request), fields(agent_id = %request.agent_id, month = %request.month))]
    pub async fn create_adjustment(
        &self,
        request: NewAdjustment,
        actor: &str,
    ) -> Result<CommissionAdjustment, CommissionError> {
        let request = request.validated()?;
        self.agents.get_agent(&request.agent_id).await?;

        let adjustment = self
            .commissions
            .insert_adjustment(&request.into_adjustment(actor))
            .await?;
        info!(actor, adjustment_id = %adjustment.id, amount = %adjustment.amount, "Adjustment created");
        Ok(adjustment)
    }

    #[instrument(skip(self, update), fields(adjustment_id = %id))]
    pub async fn update_adjustment(
        &self,
        id: &AdjustmentId,
        update: AdjustmentUpdate,
        actor: &str,
    ) -> Result<CommissionAdjustment, CommissionError> {
        let update = update.validated()?;
        let mut adjustment = self.commissions.get_adjustment(id).await?;
        adjustment.apply(update, actor);

        let adjustment = self.commissions.update_adjustment(&adjustment).await?;
        info!(actor, amount = %adjustment.amount, "Adjustment updated");
        Ok(adjustment)
    }

    #[instrument(skip(self), fields(adjustment_id = %id))]
    pub async fn delete_adjustment(&self, id: &AdjustmentId, actor: &str) -> Result<(), CommissionError> {
        self.commissions.delete_adjustment(id).await?;
        info!(actor, "Adjustment deleted");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Reports
    // ------------------------------------------------------------------

    pub async fn get_report(&self, id: &ReportId) -> Result<GeneratedCommissionReport, CommissionError> {
        Ok(self.commissions.get_report(id).await?)
    }

    pub async fn list_reports(
        &self,
        query: ReportQuery,
    ) -> Result<Vec<GeneratedCommissionReport>, CommissionError> {
        Ok(self.commissions.list_reports(query).await?)
    }

    /// Computes commission, sums adjustments, and stores the report
    #[instrument(skip(self), fields(agent_id = %agent_id, month = %month))]
    pub async fn generate_commission_report(
        &self,
        agent_id: &AgentId,
        month: Month,
        actor: &str,
    ) -> Result<GeneratedCommissionReport, CommissionError> {
        let agent = self.agents.get_agent(agent_id).await?;
        self.generate_for(agent_id, agent.classification, month, actor).await
    }

    async fn generate_for(
        &self,
        agent_id: &AgentId,
        classification: AgentClassification,
        month: Month,
        actor: &str,
    ) -> Result<GeneratedCommissionReport, CommissionError> {
        let commission = self.calculator.compute_commission(agent_id, month).await?;
        let adjustments = self
            .commissions
            .list_adjustments(AdjustmentQuery {
                agent_id: Some(agent_id.clone()),
                month: Some(month),
            })
            .await?;

        let draft = ReportDraft::new(&commission, &adjustments, classification, actor);
        let report = self.commissions.upsert_report(draft).await?;
        info!(
            actor,
            report_id = %report.id,
            final_total = %report.final_total_commission,
            "Commission report generated"
        );
        Ok(report)
    }

    /// Generates reports for every commissionable agent of a classification
    ///
    /// Without a classification, internal and outsource agents are both
    /// covered. Blocked and unclassified agents are never batch-generated. A
    /// configuration error aborts the batch; other failures are collected.
    #[instrument(skip(self), fields(month = %month))]
    pub async fn generate_commission_reports(
        &self,
        month: Month,
        classification: Option<AgentClassification>,
        actor: &str,
    ) -> Result<ReportBatchResult, CommissionError> {
        if let Some(classification) = classification {
            if !classification.is_commissionable() {
                return Err(CommissionError::invalid(format!(
                    "reports cannot be generated for {classification} agents"
                )));
            }
        }
        // Fail before touching any agent when no schedule covers the month
        self.calculator.schedules().in_force(month)?;

        let query = match classification {
            Some(c) => AgentQuery::by_classification(c),
            None => AgentQuery::default(),
        };
        let agents = self.agents.list_agents(query).await?;

        let mut result = ReportBatchResult {
            month: Some(month),
            ..Default::default()
        };
        for agent in agents.iter().filter(|a| a.classification.is_commissionable()) {
            match self.generate_for(&agent.id, agent.classification, month, actor).await {
                Ok(report) => result.reports.push(report),
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    warn!(agent_id = %agent.id, error = %e, "Report generation failed");
                    result.errors.push(RecordError::new(&agent.id, e.to_string()));
                }
            }
        }

        info!(
            generated = result.reports.len(),
            errors = result.errors.len(),
            "Commission reports generated"
        );
        Ok(result)
    }

    /// Marks a report paid; stored totals are left as they are
    #[instrument(skip(self), fields(report_id = %id))]
    pub async fn mark_report_paid(
        &self,
        id: &ReportId,
        actor: &str,
    ) -> Result<GeneratedCommissionReport, CommissionError> {
        let report = self.commissions.mark_report_paid(id, actor, Utc::now()).await?;
        info!(actor, final_total = %report.final_total_commission, "Commission report paid");
        Ok(report)
    }
}
