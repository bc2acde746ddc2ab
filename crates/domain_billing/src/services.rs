//! Invoice tracking services

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use core_kernel::{AgentId, BusinessTimezone, CustomerId, InvoiceId, Month, RecordError};

use crate::error::BillingError;
use crate::invoice::Invoice;
use crate::payment::Payment;
use crate::ports::{InvoicePort, InvoiceQuery};
use crate::settlement::PaymentSettlement;

/// Default page size for invoice listings
pub const DEFAULT_PAGE_SIZE: u32 = 50;
/// Largest accepted page size
pub const MAX_PAGE_SIZE: u32 = 500;

/// Invoice listing filters as received from callers
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InvoiceFilter {
    pub agent_id: Option<AgentId>,
    pub customer_id: Option<CustomerId>,
    /// Only invoices fully paid in this month
    pub paid_in: Option<Month>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

/// An invoice with its payments and derived settlement
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceDetail {
    pub invoice: Invoice,
    pub payments: Vec<Payment>,
    pub settlement: PaymentSettlement,
}

/// Outcome of re-deriving payment dates
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettlementRefreshResult {
    pub checked: usize,
    pub updated: usize,
    pub errors: Vec<RecordError>,
}

/// Service for invoice lookups and payment-date maintenance
#[derive(Clone)]
pub struct BillingService {
    invoices: Arc<dyn InvoicePort>,
    timezone: BusinessTimezone,
}

impl BillingService {
    pub fn new(invoices: Arc<dyn InvoicePort>, timezone: BusinessTimezone) -> Self {
        Self { invoices, timezone }
    }

    pub async fn list_invoices(&self, filter: InvoiceFilter) -> Result<Vec<Invoice>, BillingError> {
        let paid_in = filter
            .paid_in
            .map(|month| self.timezone.month_range(month))
            .transpose()?;
        let query = InvoiceQuery {
            agent_id: filter.agent_id,
            customer_id: filter.customer_id,
            paid_in,
            limit: Some(filter.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)),
            offset: filter.offset,
        };
        Ok(self.invoices.list_invoices(query).await?)
    }

    pub async fn get_invoice_detail(&self, id: &InvoiceId) -> Result<InvoiceDetail, BillingError> {
        let invoice = self.invoices.get_invoice(id).await?;
        let payments = self.invoices.list_payments(id).await?;
        let settlement = PaymentSettlement::evaluate(invoice.amount, &payments);
        Ok(InvoiceDetail {
            invoice,
            payments,
            settlement,
        })
    }

    /// Re-derives first and full payment dates from payments
    ///
    /// Only invoices whose stored dates disagree are written, each in its own
    /// transaction. A failed write is recorded and the run continues.
    #[instrument(skip(self))]
    pub async fn refresh_payment_dates(&self) -> Result<SettlementRefreshResult, BillingError> {
        let records = self.invoices.invoices_with_payments().await?;
        let mut result = SettlementRefreshResult {
            checked: records.len(),
            ..Default::default()
        };

        for (invoice, payments) in records {
            let settlement = PaymentSettlement::evaluate(invoice.amount, &payments);
            if !settlement.differs_from(&invoice) {
                continue;
            }

            debug!(invoice_id = %invoice.id, "Payment dates out of date");
            match self
                .invoices
                .update_payment_dates(
                    &invoice.id,
                    settlement.first_payment_date,
                    settlement.full_payment_date,
                )
                .await
            {
                Ok(()) => result.updated += 1,
                Err(e) => {
                    warn!(invoice_id = %invoice.id, error = %e, "Failed to update payment dates");
                    result.errors.push(RecordError::new(&invoice.id, e.to_string()));
                }
            }
        }

        info!(
            checked = result.checked,
            updated = result.updated,
            errors = result.errors.len(),
            "Payment dates refreshed"
        );
        Ok(result)
    }
}
