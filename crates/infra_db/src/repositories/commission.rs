//! Commission adjustment and generated report repository

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::error::DatabaseError;
use crate::repositories::party::AgentClassification;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AdjustmentRow {
    pub id: String,
    pub agent_id: String,
    pub month: String,
    pub amount: Decimal,
    pub description: String,
    pub created_by: String,
    pub updated_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReportRow {
    pub id: String,
    pub agent_id: String,
    pub month: String,
    pub agent_classification: AgentClassification,
    pub schedule_version: String,
    pub total_basic_commission: Decimal,
    pub total_bonus_commission: Decimal,
    pub total_adjustments: Decimal,
    pub final_total_commission: Decimal,
    pub invoice_ids: Vec<String>,
    pub generated_by: String,
    pub generated_at: DateTime<Utc>,
    pub is_paid: bool,
    pub paid_by: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
}

/// Generated columns of a report upsert
#[derive(Debug, Clone)]
pub struct NewReport {
    pub id: String,
    pub agent_id: String,
    pub month: String,
    pub agent_classification: AgentClassification,
    pub schedule_version: String,
    pub total_basic_commission: Decimal,
    pub total_bonus_commission: Decimal,
    pub total_adjustments: Decimal,
    pub final_total_commission: Decimal,
    pub invoice_ids: Vec<String>,
    pub generated_by: String,
    pub generated_at: DateTime<Utc>,
}

const ADJUSTMENT_COLUMNS: &str = "id, agent_id, month, amount, description, created_by, \
    updated_by, created_at, updated_at";

const REPORT_COLUMNS: &str = "id, agent_id, month, agent_classification, schedule_version, \
    total_basic_commission, total_bonus_commission, total_adjustments, final_total_commission, \
    invoice_ids, generated_by, generated_at, is_paid, paid_by, paid_at";

/// Repository for adjustments and generated reports
#[derive(Debug, Clone)]
pub struct CommissionRepository {
    pool: PgPool,
}

impl CommissionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ------------------------------------------------------------------
    // Adjustments
    // ------------------------------------------------------------------

    /// Lists adjustments ordered by month, agent, creation time, then id
    pub async fn list_adjustments(
        &self,
        agent_id: Option<&str>,
        month: Option<&str>,
    ) -> Result<Vec<AdjustmentRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, AdjustmentRow>(&format!(
            r#"
            SELECT {ADJUSTMENT_COLUMNS}
            FROM commission_adjustments
            WHERE ($1::text IS NULL OR agent_id = $1)
              AND ($2::text IS NULL OR month = $2)
            ORDER BY month, agent_id, created_at, id
            "#
        ))
        .bind(agent_id)
        .bind(month)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get_adjustment(&self, id: &str) -> Result<AdjustmentRow, DatabaseError> {
        sqlx::query_as::<_, AdjustmentRow>(&format!(
            "SELECT {ADJUSTMENT_COLUMNS} FROM commission_adjustments WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Adjustment", id))
    }

    pub async fn insert_adjustment(&self, row: &AdjustmentRow) -> Result<AdjustmentRow, DatabaseError> {
        let inserted = sqlx::query_as::<_, AdjustmentRow>(&format!(
            r#"
            INSERT INTO commission_adjustments ({ADJUSTMENT_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {ADJUSTMENT_COLUMNS}
            "#
        ))
        .bind(&row.id)
        .bind(&row.agent_id)
        .bind(&row.month)
        .bind(row.amount)
        .bind(&row.description)
        .bind(&row.created_by)
        .bind(&row.updated_by)
        .bind(row.created_at)
        .bind(row.updated_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(inserted)
    }

    /// Writes amount, description and audit columns of an existing adjustment
    pub async fn update_adjustment(&self, row: &AdjustmentRow) -> Result<AdjustmentRow, DatabaseError> {
        sqlx::query_as::<_, AdjustmentRow>(&format!(
            r#"
            UPDATE commission_adjustments
            SET amount = $2, description = $3, updated_by = $4, updated_at = $5
            WHERE id = $1
            RETURNING {ADJUSTMENT_COLUMNS}
            "#
        ))
        .bind(&row.id)
        .bind(row.amount)
        .bind(&row.description)
        .bind(&row.updated_by)
        .bind(row.updated_at)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Adjustment", &row.id))
    }

    pub async fn delete_adjustment(&self, id: &str) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM commission_adjustments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Adjustment", id));
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Reports
    // ------------------------------------------------------------------

    /// Inserts a report or regenerates the existing one for (agent, month)
    ///
    /// On regeneration the stored id and payment columns are kept; `report.id`
    /// is only used for a fresh row.
    pub async fn upsert_report(&self, report: &NewReport) -> Result<ReportRow, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, ReportRow>(&format!(
            r#"
            INSERT INTO generated_commission_reports (
                id, agent_id, month, agent_classification, schedule_version,
                total_basic_commission, total_bonus_commission, total_adjustments,
                final_total_commission, invoice_ids, generated_by, generated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (agent_id, month) DO UPDATE SET
                agent_classification = EXCLUDED.agent_classification,
                schedule_version = EXCLUDED.schedule_version,
                total_basic_commission = EXCLUDED.total_basic_commission,
                total_bonus_commission = EXCLUDED.total_bonus_commission,
                total_adjustments = EXCLUDED.total_adjustments,
                final_total_commission = EXCLUDED.final_total_commission,
                invoice_ids = EXCLUDED.invoice_ids,
                generated_by = EXCLUDED.generated_by,
                generated_at = EXCLUDED.generated_at
            RETURNING {REPORT_COLUMNS}
            "#
        ))
        .bind(&report.id)
        .bind(&report.agent_id)
        .bind(&report.month)
        .bind(report.agent_classification)
        .bind(&report.schedule_version)
        .bind(report.total_basic_commission)
        .bind(report.total_bonus_commission)
        .bind(report.total_adjustments)
        .bind(report.final_total_commission)
        .bind(&report.invoice_ids)
        .bind(&report.generated_by)
        .bind(report.generated_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row)
    }

    pub async fn get_report(&self, id: &str) -> Result<ReportRow, DatabaseError> {
        sqlx::query_as::<_, ReportRow>(&format!(
            "SELECT {REPORT_COLUMNS} FROM generated_commission_reports WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Report", id))
    }

    /// Lists reports ordered by month, then agent
    pub async fn list_reports(
        &self,
        month: Option<&str>,
        agent_id: Option<&str>,
        is_paid: Option<bool>,
    ) -> Result<Vec<ReportRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, ReportRow>(&format!(
            r#"
            SELECT {REPORT_COLUMNS}
            FROM generated_commission_reports
            WHERE ($1::text IS NULL OR month = $1)
              AND ($2::text IS NULL OR agent_id = $2)
              AND ($3::boolean IS NULL OR is_paid = $3)
            ORDER BY month, agent_id
            "#
        ))
        .bind(month)
        .bind(agent_id)
        .bind(is_paid)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Marks a report paid under a row lock
    ///
    /// Fails with `Conflict` when the report was already paid.
    pub async fn mark_paid(
        &self,
        id: &str,
        actor: &str,
        paid_at: DateTime<Utc>,
    ) -> Result<ReportRow, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let is_paid: Option<bool> = sqlx::query_scalar(
            "SELECT is_paid FROM generated_commission_reports WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        match is_paid {
            None => return Err(DatabaseError::not_found("Report", id)),
            Some(true) => {
                return Err(DatabaseError::Conflict(format!("report {id} is already paid")))
            }
            Some(false) => {}
        }

        let row = sqlx::query_as::<_, ReportRow>(&format!(
            r#"
            UPDATE generated_commission_reports
            SET is_paid = TRUE, paid_by = $2, paid_at = $3
            WHERE id = $1
            RETURNING {REPORT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(actor)
        .bind(paid_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row)
    }
}
