//! Invoice and payment repository
//!
//! Invoices and payments are written by the sales system. This repository
//! reads them and writes the three derived invoice columns:
//! `first_payment_date`, `full_payment_date` and `achieved_monthly_anp`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::debug;

use crate::error::DatabaseError;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct InvoiceRow {
    pub id: String,
    pub agent_id: Option<String>,
    pub customer_id: Option<String>,
    pub amount: Decimal,
    pub eligible_amount: Option<Decimal>,
    pub first_payment_date: Option<DateTime<Utc>>,
    pub full_payment_date: Option<DateTime<Utc>>,
    pub achieved_monthly_anp: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PaymentRow {
    pub id: String,
    pub invoice_id: String,
    pub amount: Decimal,
    pub method: String,
    pub verified_by: Option<String>,
    pub payment_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AnpCandidateRow {
    pub invoice_id: String,
    pub agent_id: Option<String>,
    pub amount: Decimal,
    pub first_payment_date: DateTime<Utc>,
    pub paid_total: Decimal,
    pub stored_anp: Option<Decimal>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EligibleSummaryRow {
    pub agent_id: Option<String>,
    pub invoice_count: i64,
    pub total_eligible: Decimal,
}

/// Nullable filters for [`InvoiceRepository::list`]
#[derive(Debug, Clone, Default)]
pub struct InvoiceFilter<'a> {
    pub agent_id: Option<&'a str>,
    pub customer_id: Option<&'a str>,
    pub paid_from: Option<DateTime<Utc>>,
    pub paid_until: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

const INVOICE_COLUMNS: &str = "id, agent_id, customer_id, amount, eligible_amount, \
    first_payment_date, full_payment_date, achieved_monthly_anp, created_at, updated_at";

const PAYMENT_COLUMNS: &str =
    "id, invoice_id, amount, method, verified_by, payment_date, created_at";

/// Repository for invoices and their payments
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    pool: PgPool,
}

impl InvoiceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, id: &str) -> Result<InvoiceRow, DatabaseError> {
        sqlx::query_as::<_, InvoiceRow>(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Invoice", id))
    }

    /// Lists invoices ordered by id
    ///
    /// The paid window is half-open: `paid_from <= full_payment_date < paid_until`.
    pub async fn list(&self, filter: InvoiceFilter<'_>) -> Result<Vec<InvoiceRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, InvoiceRow>(&format!(
            r#"
            SELECT {INVOICE_COLUMNS}
            FROM invoices
            WHERE ($1::text IS NULL OR agent_id = $1)
              AND ($2::text IS NULL OR customer_id = $2)
              AND ($3::timestamptz IS NULL OR full_payment_date >= $3)
              AND ($4::timestamptz IS NULL OR full_payment_date < $4)
            ORDER BY id
            LIMIT $5 OFFSET $6
            "#
        ))
        .bind(filter.agent_id)
        .bind(filter.customer_id)
        .bind(filter.paid_from)
        .bind(filter.paid_until)
        .bind(filter.limit)
        .bind(filter.offset.unwrap_or(0))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Payments of one invoice ordered by date, then id
    pub async fn list_payments(&self, invoice_id: &str) -> Result<Vec<PaymentRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, PaymentRow>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE invoice_id = $1 ORDER BY payment_date, id"
        ))
        .bind(invoice_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn list_all(&self) -> Result<Vec<InvoiceRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, InvoiceRow>(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Every payment, ordered by invoice, date, then id
    pub async fn list_all_payments(&self) -> Result<Vec<PaymentRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, PaymentRow>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments ORDER BY invoice_id, payment_date, id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn update_payment_dates(
        &self,
        id: &str,
        first_payment_date: Option<DateTime<Utc>>,
        full_payment_date: Option<DateTime<Utc>>,
    ) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE invoices
            SET first_payment_date = $2, full_payment_date = $3, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(first_payment_date)
        .bind(full_payment_date)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Invoice", id));
        }

        tx.commit().await?;
        Ok(())
    }

    /// Invoices with a first-payment date and a positive payment sum
    pub async fn anp_candidates(&self) -> Result<Vec<AnpCandidateRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, AnpCandidateRow>(
            r#"
            SELECT
                i.id AS invoice_id,
                i.agent_id,
                i.amount,
                i.first_payment_date,
                p.paid_total,
                i.achieved_monthly_anp AS stored_anp
            FROM invoices i
            JOIN (
                SELECT invoice_id, SUM(amount) AS paid_total
                FROM payments
                GROUP BY invoice_id
            ) p ON p.invoice_id = i.id
            WHERE i.first_payment_date IS NOT NULL
              AND p.paid_total > 0
            ORDER BY i.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Writes one ANP value to a group of invoices atomically
    ///
    /// The transaction is rolled back unless every listed invoice was updated.
    pub async fn write_group_anp(&self, invoice_ids: &[String], anp: Decimal) -> Result<u64, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE invoices
            SET achieved_monthly_anp = $1, updated_at = now()
            WHERE id = ANY($2)
            "#,
        )
        .bind(anp)
        .bind(invoice_ids)
        .execute(&mut *tx)
        .await?;

        let written = result.rows_affected();
        if written != invoice_ids.len() as u64 {
            return Err(DatabaseError::TransactionFailed(format!(
                "expected to update {} invoices, updated {written}",
                invoice_ids.len()
            )));
        }

        tx.commit().await?;
        debug!(written, anp = %anp, "ANP written");
        Ok(written)
    }

    /// `(invoice id, achieved ANP)` for every invoice with a stored value
    pub async fn stored_anp(&self) -> Result<Vec<(String, Decimal)>, DatabaseError> {
        let rows = sqlx::query_as::<_, (String, Decimal)>(
            r#"
            SELECT id, achieved_monthly_anp
            FROM invoices
            WHERE achieved_monthly_anp IS NOT NULL
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn clear_anp(&self, invoice_ids: &[String]) -> Result<u64, DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE invoices
            SET achieved_monthly_anp = NULL, updated_at = now()
            WHERE id = ANY($1) AND achieved_monthly_anp IS NOT NULL
            "#,
        )
        .bind(invoice_ids)
        .execute(&self.pool)
        .await?;

        let cleared = result.rows_affected();
        debug!(cleared, "Stale ANP cleared");
        Ok(cleared)
    }

    /// An agent's invoices fully paid within `[from, until)`, ordered by id
    pub async fn fully_paid_in_range(
        &self,
        agent_id: &str,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<InvoiceRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, InvoiceRow>(&format!(
            r#"
            SELECT {INVOICE_COLUMNS}
            FROM invoices
            WHERE agent_id = $1
              AND full_payment_date >= $2
              AND full_payment_date < $3
            ORDER BY id
            "#
        ))
        .bind(agent_id)
        .bind(from)
        .bind(until)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Per-agent counts and eligible totals of invoices fully paid within `[from, until)`
    ///
    /// Missing and negative eligible amounts contribute zero.
    pub async fn summarize_eligible_by_agent(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<EligibleSummaryRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, EligibleSummaryRow>(
            r#"
            SELECT
                agent_id,
                COUNT(*) AS invoice_count,
                COALESCE(SUM(GREATEST(COALESCE(eligible_amount, 0), 0)), 0) AS total_eligible
            FROM invoices
            WHERE full_payment_date >= $1
              AND full_payment_date < $2
            GROUP BY agent_id
            ORDER BY agent_id NULLS LAST
            "#,
        )
        .bind(from)
        .bind(until)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
