//! Commission Domain Ports
//!
//! Storage for the two record types the commission system owns: manual
//! adjustments and generated reports.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use core_kernel::{AdjustmentId, DomainPort, HealthCheckable, PortError, ReportId};

use crate::adjustment::{AdjustmentQuery, CommissionAdjustment};
use crate::report::{GeneratedCommissionReport, ReportDraft, ReportQuery};

/// Data access for adjustments and generated reports
#[async_trait]
pub trait CommissionPort: DomainPort + HealthCheckable {
    /// Lists adjustments ordered by month, agent, then creation time
    async fn list_adjustments(
        &self,
        query: AdjustmentQuery,
    ) -> Result<Vec<CommissionAdjustment>, PortError>;

    async fn get_adjustment(&self, id: &AdjustmentId) -> Result<CommissionAdjustment, PortError>;

    async fn insert_adjustment(
        &self,
        adjustment: &CommissionAdjustment,
    ) -> Result<CommissionAdjustment, PortError>;

    async fn update_adjustment(
        &self,
        adjustment: &CommissionAdjustment,
    ) -> Result<CommissionAdjustment, PortError>;

    async fn delete_adjustment(&self, id: &AdjustmentId) -> Result<(), PortError>;

    /// Inserts or regenerates the report for the draft's (agent, month)
    ///
    /// Runs in one transaction. An existing report keeps its id and its
    /// payment status.
    async fn upsert_report(&self, draft: ReportDraft)
        -> Result<GeneratedCommissionReport, PortError>;

    async fn get_report(&self, id: &ReportId) -> Result<GeneratedCommissionReport, PortError>;

    /// Lists reports ordered by month, then agent
    async fn list_reports(
        &self,
        query: ReportQuery,
    ) -> Result<Vec<GeneratedCommissionReport>, PortError>;

    /// Sets the paid flag; fails with `Conflict` when the report is already paid
    async fn mark_report_paid(
        &self,
        id: &ReportId,
        actor: &str,
        paid_at: DateTime<Utc>,
    ) -> Result<GeneratedCommissionReport, PortError>;
}

/// Mock implementations for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    use core_kernel::{AgentId, HealthCheckResult, Month};

    #[derive(Debug, Default)]
    struct Store {
        adjustments: HashMap<AdjustmentId, CommissionAdjustment>,
        reports: HashMap<ReportId, GeneratedCommissionReport>,
        failing_agents: Vec<AgentId>,
    }

    /// In-memory mock implementation of CommissionPort
    #[derive(Debug, Default, Clone)]
    pub struct MockCommissionPort {
        store: Arc<RwLock<Store>>,
    }

    impl MockCommissionPort {
        pub fn new() -> Self {
            Self::default()
        }

        /// Makes report upserts for `agent_id` fail with a connection error
        pub async fn fail_reports_for(&self, agent_id: AgentId) {
            self.store.write().await.failing_agents.push(agent_id);
        }

        pub async fn report_count(&self) -> usize {
            self.store.read().await.reports.len()
        }
    }

    fn report_key(report: &GeneratedCommissionReport) -> (Month, AgentId) {
        (report.month, report.agent_id.clone())
    }

    impl DomainPort for MockCommissionPort {}

    #[async_trait]
    impl HealthCheckable for MockCommissionPort {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult::healthy("mock-commission-port", 0)
        }
    }

    #[async_trait]
    impl CommissionPort for MockCommissionPort {
        async fn list_adjustments(
            &self,
            query: AdjustmentQuery,
        ) -> Result<Vec<CommissionAdjustment>, PortError> {
            let store = self.store.read().await;
            let mut results: Vec<CommissionAdjustment> = store
                .adjustments
                .values()
                .filter(|a| query.agent_id.as_ref().map_or(true, |id| &a.agent_id == id))
                .filter(|a| query.month.map_or(true, |m| a.month == m))
                .cloned()
                .collect();
            results.sort_by(|a, b| {
                (a.month, &a.agent_id, a.created_at, &a.id)
                    .cmp(&(b.month, &b.agent_id, b.created_at, &b.id))
            });
            Ok(results)
        }

        async fn get_adjustment(&self, id: &AdjustmentId) -> Result<CommissionAdjustment, PortError> {
            self.store
                .read()
                .await
                .adjustments
                .get(id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Adjustment", id))
        }

        async fn insert_adjustment(
            &self,
            adjustment: &CommissionAdjustment,
        ) -> Result<CommissionAdjustment, PortError> {
            let mut store = self.store.write().await;
            if store.adjustments.contains_key(&adjustment.id) {
                return Err(PortError::conflict(format!(
                    "adjustment {} already exists",
                    adjustment.id
                )));
            }
            store
                .adjustments
                .insert(adjustment.id.clone(), adjustment.clone());
            Ok(adjustment.clone())
        }

        async fn update_adjustment(
            &self,
            adjustment: &CommissionAdjustment,
        ) -> Result<CommissionAdjustment, PortError> {
            let mut store = self.store.write().await;
            let stored = store
                .adjustments
                .get_mut(&adjustment.id)
                .ok_or_else(|| PortError::not_found("Adjustment", &adjustment.id))?;
            *stored = adjustment.clone();
            Ok(adjustment.clone())
        }

        async fn delete_adjustment(&self, id: &AdjustmentId) -> Result<(), PortError> {
            self.store
                .write()
                .await
                .adjustments
                .remove(id)
                .map(|_| ())
                .ok_or_else(|| PortError::not_found("Adjustment", id))
        }

        async fn upsert_report(
            &self,
            draft: ReportDraft,
        ) -> Result<GeneratedCommissionReport, PortError> {
            let mut store = self.store.write().await;
            if store.failing_agents.contains(&draft.agent_id) {
                return Err(PortError::connection(format!(
                    "report write for agent {} failed",
                    draft.agent_id
                )));
            }

            let key = (draft.month, draft.agent_id.clone());
            if let Some(existing) = store.reports.values_mut().find(|r| report_key(r) == key) {
                existing.regenerate(draft);
                return Ok(existing.clone());
            }

            let report = draft.into_report(ReportId::generate());
            store.reports.insert(report.id.clone(), report.clone());
            Ok(report)
        }

        async fn get_report(&self, id: &ReportId) -> Result<GeneratedCommissionReport, PortError> {
            self.store
                .read()
                .await
                .reports
                .get(id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Report", id))
        }

        async fn list_reports(
            &self,
            query: ReportQuery,
        ) -> Result<Vec<GeneratedCommissionReport>, PortError> {
            let store = self.store.read().await;
            let mut results: Vec<GeneratedCommissionReport> = store
                .reports
                .values()
                .filter(|r| query.month.map_or(true, |m| r.month == m))
                .filter(|r| query.agent_id.as_ref().map_or(true, |id| &r.agent_id == id))
                .filter(|r| query.is_paid.map_or(true, |paid| r.is_paid == paid))
                .cloned()
                .collect();
            results.sort_by_key(report_key);
            Ok(results)
        }

        async fn mark_report_paid(
            &self,
            id: &ReportId,
            actor: &str,
            paid_at: DateTime<Utc>,
        ) -> Result<GeneratedCommissionReport, PortError> {
            let mut store = self.store.write().await;
            let report = store
                .reports
                .get_mut(id)
                .ok_or_else(|| PortError::not_found("Report", id))?;
            if report.is_paid {
                return Err(PortError::conflict(format!("report {id} is already paid")));
            }
            report.mark_paid(actor, paid_at);
            Ok(report.clone())
        }
    }
}
