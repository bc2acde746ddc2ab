//! PostgreSQL Commission Adapter
//!
//! Months are stored as `YYYY-MM` text; a stored month that does not parse is
//! reported as a conversion error rather than skipped.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use core_kernel::{
    AdjustmentId, AgentId, DomainPort, HealthCheckResult, HealthCheckable, InvoiceId, Month,
    PortError, ReportId,
};
use domain_commission::{
    AdjustmentQuery, CommissionAdjustment, CommissionPort, GeneratedCommissionReport, ReportDraft,
    ReportQuery,
};

use crate::adapters::party::{from_db_classification, to_db_classification};
use crate::error::DatabaseError;
use crate::repositories::commission::{AdjustmentRow, CommissionRepository, NewReport, ReportRow};

/// PostgreSQL-backed implementation of `CommissionPort`
#[derive(Debug, Clone)]
pub struct PostgresCommissionAdapter {
    repository: CommissionRepository,
    pool: PgPool,
}

impl PostgresCommissionAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: CommissionRepository::new(pool.clone()),
            pool,
        }
    }
}

impl DomainPort for PostgresCommissionAdapter {}

#[async_trait]
impl HealthCheckable for PostgresCommissionAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        super::ping(&self.pool, "postgres-commission-adapter").await
    }
}

#[async_trait]
impl CommissionPort for PostgresCommissionAdapter {
    #[instrument(skip(self))]
    async fn list_adjustments(
        &self,
        query: AdjustmentQuery,
    ) -> Result<Vec<CommissionAdjustment>, PortError> {
        let month = query.month.map(|m| m.to_string());
        let rows = self
            .repository
            .list_adjustments(query.agent_id.as_ref().map(AgentId::as_str), month.as_deref())
            .await?;
        rows.into_iter()
            .map(|row| row_to_adjustment(row).map_err(PortError::from))
            .collect()
    }

    #[instrument(skip(self), fields(adjustment_id = %id))]
    async fn get_adjustment(&self, id: &AdjustmentId) -> Result<CommissionAdjustment, PortError> {
        let row = self.repository.get_adjustment(id.as_str()).await?;
        Ok(row_to_adjustment(row)?)
    }

    #[instrument(skip(self, adjustment), fields(adjustment_id = %adjustment.id))]
    async fn insert_adjustment(
        &self,
        adjustment: &CommissionAdjustment,
    ) -> Result<CommissionAdjustment, PortError> {
        let row = self
            .repository
            .insert_adjustment(&adjustment_to_row(adjustment))
            .await?;
        Ok(row_to_adjustment(row)?)
    }

    #[instrument(skip(self, adjustment), fields(adjustment_id = %adjustment.id))]
    async fn update_adjustment(
        &self,
        adjustment: &CommissionAdjustment,
    ) -> Result<CommissionAdjustment, PortError> {
        let row = self
            .repository
            .update_adjustment(&adjustment_to_row(adjustment))
            .await?;
        Ok(row_to_adjustment(row)?)
    }

    #[instrument(skip(self), fields(adjustment_id = %id))]
    async fn delete_adjustment(&self, id: &AdjustmentId) -> Result<(), PortError> {
        self.repository.delete_adjustment(id.as_str()).await?;
        Ok(())
    }

    #[instrument(skip(self, draft), fields(agent_id = %draft.agent_id, month = %draft.month))]
    async fn upsert_report(
        &self,
        draft: ReportDraft,
    ) -> Result<GeneratedCommissionReport, PortError> {
        let report = NewReport {
            id: ReportId::generate().into_inner(),
            agent_id: draft.agent_id.into_inner(),
            month: draft.month.to_string(),
            agent_classification: to_db_classification(draft.agent_classification),
            schedule_version: draft.schedule_version,
            total_basic_commission: draft.total_basic_commission,
            total_bonus_commission: draft.total_bonus_commission,
            total_adjustments: draft.total_adjustments,
            final_total_commission: draft.final_total_commission,
            invoice_ids: draft.invoice_ids.into_iter().map(InvoiceId::into_inner).collect(),
            generated_by: draft.generated_by,
            generated_at: draft.generated_at,
        };
        let row = self.repository.upsert_report(&report).await?;
        Ok(row_to_report(row)?)
    }

    #[instrument(skip(self), fields(report_id = %id))]
    async fn get_report(&self, id: &ReportId) -> Result<GeneratedCommissionReport, PortError> {
        let row = self.repository.get_report(id.as_str()).await?;
        Ok(row_to_report(row)?)
    }

    #[instrument(skip(self))]
    async fn list_reports(
        &self,
        query: ReportQuery,
    ) -> Result<Vec<GeneratedCommissionReport>, PortError> {
        let month = query.month.map(|m| m.to_string());
        let rows = self
            .repository
            .list_reports(
                month.as_deref(),
                query.agent_id.as_ref().map(AgentId::as_str),
                query.is_paid,
            )
            .await?;
        rows.into_iter()
            .map(|row| row_to_report(row).map_err(PortError::from))
            .collect()
    }

    #[instrument(skip(self), fields(report_id = %id))]
    async fn mark_report_paid(
        &self,
        id: &ReportId,
        actor: &str,
        paid_at: DateTime<Utc>,
    ) -> Result<GeneratedCommissionReport, PortError> {
        let row = self.repository.mark_paid(id.as_str(), actor, paid_at).await?;
        Ok(row_to_report(row)?)
    }
}

// ============================================================================
// Conversion helpers
// ============================================================================

fn parse_month(value: &str) -> Result<Month, DatabaseError> {
    value
        .parse()
        .map_err(|e| DatabaseError::conversion("month", e))
}

fn adjustment_to_row(adjustment: &CommissionAdjustment) -> AdjustmentRow {
    AdjustmentRow {
        id: adjustment.id.as_str().to_string(),
        agent_id: adjustment.agent_id.as_str().to_string(),
        month: adjustment.month.to_string(),
        amount: adjustment.amount,
        description: adjustment.description.clone(),
        created_by: adjustment.created_by.clone(),
        updated_by: adjustment.updated_by.clone(),
        created_at: adjustment.created_at,
        updated_at: adjustment.updated_at,
    }
}

fn row_to_adjustment(row: AdjustmentRow) -> Result<CommissionAdjustment, DatabaseError> {
    Ok(CommissionAdjustment {
        id: AdjustmentId::new(row.id),
        agent_id: AgentId::new(row.agent_id),
        month: parse_month(&row.month)?,
        amount: row.amount,
        description: row.description,
        created_by: row.created_by,
        updated_by: row.updated_by,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn row_to_report(row: ReportRow) -> Result<GeneratedCommissionReport, DatabaseError> {
    Ok(GeneratedCommissionReport {
        id: ReportId::new(row.id),
        agent_id: AgentId::new(row.agent_id),
        month: parse_month(&row.month)?,
        agent_classification: from_db_classification(row.agent_classification),
        schedule_version: row.schedule_version,
        total_basic_commission: row.total_basic_commission,
        total_bonus_commission: row.total_bonus_commission,
        total_adjustments: row.total_adjustments,
        final_total_commission: row.final_total_commission,
        invoice_ids: row.invoice_ids.into_iter().map(InvoiceId::new).collect(),
        generated_by: row.generated_by,
        generated_at: row.generated_at,
        is_paid: row.is_paid,
        paid_by: row.paid_by,
        paid_at: row.paid_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::party::AgentClassification as DbClassification;
    use rust_decimal_macros::dec;

    fn report_row(month: &str) -> ReportRow {
        ReportRow {
            id: "rpt-1".to_string(),
            agent_id: "a-1".to_string(),
            month: month.to_string(),
            agent_classification: DbClassification::Internal,
            schedule_version: "standard".to_string(),
            total_basic_commission: dec!(450),
            total_bonus_commission: dec!(300),
            total_adjustments: dec!(-50),
            final_total_commission: dec!(700),
            invoice_ids: vec!["inv-1".to_string(), "inv-2".to_string()],
            generated_by: "admin".to_string(),
            generated_at: Utc::now(),
            is_paid: false,
            paid_by: None,
            paid_at: None,
        }
    }

    #[test]
    fn test_row_to_report_parses_month() {
        let report = row_to_report(report_row("2024-03")).unwrap();
        assert_eq!(report.month, Month::new(2024, 3).unwrap());
        assert_eq!(report.invoice_ids.len(), 2);
    }

    #[test]
    fn test_malformed_month_is_conversion_error() {
        let error = row_to_report(report_row("March 2024")).unwrap_err();
        assert!(matches!(error, DatabaseError::Conversion(_)));
    }
}
