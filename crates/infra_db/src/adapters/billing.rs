//! PostgreSQL Invoice Adapter

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{
    AgentId, CustomerId, DomainPort, HealthCheckResult, HealthCheckable, InvoiceId, MonthRange,
    PaymentId, PortError,
};
use domain_billing::{
    AnpCandidate, EligibleSummary, Invoice, InvoicePort, InvoiceQuery, Payment, StoredAnp,
};

use crate::repositories::billing::{
    AnpCandidateRow, EligibleSummaryRow, InvoiceFilter, InvoiceRepository, InvoiceRow, PaymentRow,
};

/// PostgreSQL-backed implementation of `InvoicePort`
#[derive(Debug, Clone)]
pub struct PostgresInvoiceAdapter {
    repository: InvoiceRepository,
    pool: PgPool,
}

impl PostgresInvoiceAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: InvoiceRepository::new(pool.clone()),
            pool,
        }
    }

    pub fn repository(&self) -> &InvoiceRepository {
        &self.repository
    }
}

impl DomainPort for PostgresInvoiceAdapter {}

#[async_trait]
impl HealthCheckable for PostgresInvoiceAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        super::ping(&self.pool, "postgres-invoice-adapter").await
    }
}

#[async_trait]
impl InvoicePort for PostgresInvoiceAdapter {
    #[instrument(skip(self), fields(invoice_id = %id))]
    async fn get_invoice(&self, id: &InvoiceId) -> Result<Invoice, PortError> {
        let row = self.repository.get_by_id(id.as_str()).await?;
        Ok(row_to_invoice(row))
    }

    #[instrument(skip(self))]
    async fn list_invoices(&self, query: InvoiceQuery) -> Result<Vec<Invoice>, PortError> {
        debug!("Listing invoices with query: {:?}", query);
        let filter = InvoiceFilter {
            agent_id: query.agent_id.as_ref().map(AgentId::as_str),
            customer_id: query.customer_id.as_ref().map(CustomerId::as_str),
            paid_from: query.paid_in.map(|r| r.start),
            paid_until: query.paid_in.map(|r| r.end),
            limit: query.limit.map(i64::from),
            offset: query.offset.map(i64::from),
        };
        let rows = self.repository.list(filter).await?;
        Ok(rows.into_iter().map(row_to_invoice).collect())
    }

    #[instrument(skip(self), fields(invoice_id = %invoice_id))]
    async fn list_payments(&self, invoice_id: &InvoiceId) -> Result<Vec<Payment>, PortError> {
        let rows = self.repository.list_payments(invoice_id.as_str()).await?;
        Ok(rows.into_iter().map(row_to_payment).collect())
    }

    #[instrument(skip(self))]
    async fn invoices_with_payments(&self) -> Result<Vec<(Invoice, Vec<Payment>)>, PortError> {
        let invoices = self.repository.list_all().await?;
        let mut payments: HashMap<String, Vec<Payment>> = HashMap::new();
        for row in self.repository.list_all_payments().await? {
            payments
                .entry(row.invoice_id.clone())
                .or_default()
                .push(row_to_payment(row));
        }

        Ok(invoices
            .into_iter()
            .map(|row| {
                let own = payments.remove(&row.id).unwrap_or_default();
                (row_to_invoice(row), own)
            })
            .collect())
    }

    #[instrument(skip(self), fields(invoice_id = %id))]
    async fn update_payment_dates(
        &self,
        id: &InvoiceId,
        first_payment_date: Option<DateTime<Utc>>,
        full_payment_date: Option<DateTime<Utc>>,
    ) -> Result<(), PortError> {
        self.repository
            .update_payment_dates(id.as_str(), first_payment_date, full_payment_date)
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn anp_candidates(&self) -> Result<Vec<AnpCandidate>, PortError> {
        let rows = self.repository.anp_candidates().await?;
        Ok(rows.into_iter().map(row_to_candidate).collect())
    }

    #[instrument(skip(self, invoice_ids), fields(count = invoice_ids.len(), anp = %anp))]
    async fn write_group_anp(
        &self,
        invoice_ids: &[InvoiceId],
        anp: Decimal,
    ) -> Result<u64, PortError> {
        let ids: Vec<String> = invoice_ids.iter().map(|id| id.as_str().to_string()).collect();
        Ok(self.repository.write_group_anp(&ids, anp).await?)
    }

    #[instrument(skip(self))]
    async fn stored_anp(&self) -> Result<Vec<StoredAnp>, PortError> {
        let rows = self.repository.stored_anp().await?;
        Ok(rows
            .into_iter()
            .map(|(id, anp)| StoredAnp {
                invoice_id: InvoiceId::new(id),
                anp,
            })
            .collect())
    }

    #[instrument(skip(self, invoice_ids), fields(count = invoice_ids.len()))]
    async fn clear_anp(&self, invoice_ids: &[InvoiceId]) -> Result<u64, PortError> {
        let ids: Vec<String> = invoice_ids.iter().map(|id| id.as_str().to_string()).collect();
        Ok(self.repository.clear_anp(&ids).await?)
    }

    #[instrument(skip(self), fields(agent_id = %agent_id))]
    async fn fully_paid_in_range(
        &self,
        agent_id: &AgentId,
        range: MonthRange,
    ) -> Result<Vec<Invoice>, PortError> {
        let rows = self
            .repository
            .fully_paid_in_range(agent_id.as_str(), range.start, range.end)
            .await?;
        Ok(rows.into_iter().map(row_to_invoice).collect())
    }

    #[instrument(skip(self))]
    async fn summarize_eligible_by_agent(
        &self,
        range: MonthRange,
    ) -> Result<Vec<EligibleSummary>, PortError> {
        let rows = self
            .repository
            .summarize_eligible_by_agent(range.start, range.end)
            .await?;
        Ok(rows.into_iter().map(row_to_summary).collect())
    }
}

// ============================================================================
// Conversion helpers
// ============================================================================

fn row_to_invoice(row: InvoiceRow) -> Invoice {
    Invoice {
        id: InvoiceId::new(row.id),
        agent_id: row.agent_id.map(AgentId::new),
        customer_id: row.customer_id.map(CustomerId::new),
        amount: row.amount,
        eligible_amount: row.eligible_amount,
        first_payment_date: row.first_payment_date,
        full_payment_date: row.full_payment_date,
        achieved_monthly_anp: row.achieved_monthly_anp,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

fn row_to_payment(row: PaymentRow) -> Payment {
    Payment {
        id: PaymentId::new(row.id),
        invoice_id: InvoiceId::new(row.invoice_id),
        amount: row.amount,
        method: row.method.into(),
        verified_by: row.verified_by,
        payment_date: row.payment_date,
        created_at: row.created_at,
    }
}

fn row_to_candidate(row: AnpCandidateRow) -> AnpCandidate {
    AnpCandidate {
        invoice_id: InvoiceId::new(row.invoice_id),
        agent_id: row.agent_id.map(AgentId::new),
        amount: row.amount,
        first_payment_date: row.first_payment_date,
        paid_total: row.paid_total,
        stored_anp: row.stored_anp,
    }
}

fn row_to_summary(row: EligibleSummaryRow) -> EligibleSummary {
    EligibleSummary {
        agent_id: row.agent_id.map(AgentId::new),
        invoice_count: u64::try_from(row.invoice_count).unwrap_or(0),
        total_eligible: row.total_eligible,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_billing::PaymentMethod;
    use rust_decimal_macros::dec;

    #[test]
    fn test_row_to_payment_parses_method_aliases() {
        let now = Utc::now();
        let payment = row_to_payment(PaymentRow {
            id: "p-1".to_string(),
            invoice_id: "inv-1".to_string(),
            amount: dec!(250),
            method: "VA".to_string(),
            verified_by: Some("finance".to_string()),
            payment_date: now,
            created_at: now,
        });

        assert_eq!(payment.method, PaymentMethod::VirtualAccount);
        assert_eq!(payment.invoice_id, InvoiceId::new("inv-1"));
    }

    #[test]
    fn test_row_to_summary_keeps_missing_agent() {
        let summary = row_to_summary(EligibleSummaryRow {
            agent_id: None,
            invoice_count: 3,
            total_eligible: dec!(1200),
        });

        assert!(summary.agent_id.is_none());
        assert_eq!(summary.invoice_count, 3);
    }
}
