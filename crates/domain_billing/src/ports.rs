//! Billing Domain Ports
//!
//! The invoice port covers everything the commission rules read from the
//! invoice and payment tables, plus the two derived-field writes the system
//! owns: `achieved_monthly_anp` and the first/full payment dates.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{
    AgentId, CustomerId, DomainPort, HealthCheckable, InvoiceId, MonthRange, PortError,
};

use crate::invoice::Invoice;
use crate::payment::Payment;

/// Query parameters for listing invoices
#[derive(Debug, Clone, Default)]
pub struct InvoiceQuery {
    pub agent_id: Option<AgentId>,
    pub customer_id: Option<CustomerId>,
    /// Only invoices whose full-payment date falls in this range
    pub paid_in: Option<MonthRange>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl InvoiceQuery {
    pub fn for_agent(agent_id: AgentId) -> Self {
        Self {
            agent_id: Some(agent_id),
            ..Default::default()
        }
    }

    pub fn paid_in(mut self, range: MonthRange) -> Self {
        self.paid_in = Some(range);
        self
    }

    pub fn paginate(mut self, limit: u32, offset: u32) -> Self {
        self.limit = Some(limit);
        self.offset = Some(offset);
        self
    }
}

/// An invoice that takes part in ANP aggregation
///
/// Candidates have a first-payment date and a positive payment sum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnpCandidate {
    pub invoice_id: InvoiceId,
    pub agent_id: Option<AgentId>,
    pub amount: Decimal,
    pub first_payment_date: DateTime<Utc>,
    pub paid_total: Decimal,
    pub stored_anp: Option<Decimal>,
}

/// An invoice currently carrying an achieved ANP value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredAnp {
    pub invoice_id: InvoiceId,
    pub anp: Decimal,
}

/// Eligible totals of one agent over invoices fully paid in a month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibleSummary {
    pub agent_id: Option<AgentId>,
    pub invoice_count: u64,
    /// Sum of eligible amounts; missing or negative amounts count as zero
    pub total_eligible: Decimal,
}

/// Data access for invoices and payments
#[async_trait]
pub trait InvoicePort: DomainPort + HealthCheckable {
    async fn get_invoice(&self, id: &InvoiceId) -> Result<Invoice, PortError>;

    /// Lists invoices ordered by id
    async fn list_invoices(&self, query: InvoiceQuery) -> Result<Vec<Invoice>, PortError>;

    async fn list_payments(&self, invoice_id: &InvoiceId) -> Result<Vec<Payment>, PortError>;

    /// Every invoice together with its payments
    async fn invoices_with_payments(&self) -> Result<Vec<(Invoice, Vec<Payment>)>, PortError>;

    /// Stores derived payment dates for one invoice in a single transaction
    async fn update_payment_dates(
        &self,
        id: &InvoiceId,
        first_payment_date: Option<DateTime<Utc>>,
        full_payment_date: Option<DateTime<Utc>>,
    ) -> Result<(), PortError>;

    async fn anp_candidates(&self) -> Result<Vec<AnpCandidate>, PortError>;

    /// Writes `anp` to every listed invoice in one transaction; returns rows written
    async fn write_group_anp(&self, invoice_ids: &[InvoiceId], anp: Decimal)
        -> Result<u64, PortError>;

    /// Invoices with a non-null `achieved_monthly_anp`, ordered by id
    async fn stored_anp(&self) -> Result<Vec<StoredAnp>, PortError>;

    /// Resets `achieved_monthly_anp` to null on the listed invoices; returns rows cleared
    async fn clear_anp(&self, invoice_ids: &[InvoiceId]) -> Result<u64, PortError>;

    /// An agent's invoices whose full-payment date falls in `range`, ordered by id
    async fn fully_paid_in_range(
        &self,
        agent_id: &AgentId,
        range: MonthRange,
    ) -> Result<Vec<Invoice>, PortError>;

    /// Per-agent invoice counts and eligible totals over invoices fully paid in `range`
    async fn summarize_eligible_by_agent(
        &self,
        range: MonthRange,
    ) -> Result<Vec<EligibleSummary>, PortError>;
}

/// Mock implementations for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::{BTreeMap, HashMap, HashSet};
    use std::sync::Arc;
    use tokio::sync::RwLock;

    use core_kernel::{clamp_non_negative, HealthCheckResult};

    #[derive(Debug, Default)]
    struct Store {
        invoices: BTreeMap<InvoiceId, Invoice>,
        payments: HashMap<InvoiceId, Vec<Payment>>,
        failing_writes: HashSet<InvoiceId>,
    }

    /// In-memory mock implementation of InvoicePort
    #[derive(Debug, Default, Clone)]
    pub struct MockInvoicePort {
        store: Arc<RwLock<Store>>,
    }

    impl MockInvoicePort {
        pub fn new() -> Self {
            Self::default()
        }

        pub async fn with_invoices(invoices: Vec<Invoice>) -> Self {
            let port = Self::new();
            for invoice in invoices {
                port.insert_invoice(invoice).await;
            }
            port
        }

        pub async fn insert_invoice(&self, invoice: Invoice) {
            self.store
                .write()
                .await
                .invoices
                .insert(invoice.id.clone(), invoice);
        }

        pub async fn insert_payment(&self, payment: Payment) {
            self.store
                .write()
                .await
                .payments
                .entry(payment.invoice_id.clone())
                .or_default()
                .push(payment);
        }

        /// Makes every write touching `id` fail with a connection error
        pub async fn fail_writes_for(&self, id: InvoiceId) {
            self.store.write().await.failing_writes.insert(id);
        }

        pub async fn invoice(&self, id: &InvoiceId) -> Option<Invoice> {
            self.store.read().await.invoices.get(id).cloned()
        }
    }

    fn sum_payments(store: &Store, id: &InvoiceId) -> Decimal {
        store
            .payments
            .get(id)
            .map(|payments| payments.iter().map(|p| p.amount).sum())
            .unwrap_or(Decimal::ZERO)
    }

    fn paid_within(invoice: &Invoice, range: &MonthRange) -> bool {
        invoice.full_payment_date.map_or(false, |date| range.contains(date))
    }

    impl DomainPort for MockInvoicePort {}

    #[async_trait]
    impl HealthCheckable for MockInvoicePort {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult::healthy("mock-invoice-port", 0)
        }
    }

    #[async_trait]
    impl InvoicePort for MockInvoicePort {
        async fn get_invoice(&self, id: &InvoiceId) -> Result<Invoice, PortError> {
            self.store
                .read()
                .await
                .invoices
                .get(id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Invoice", id))
        }

        async fn list_invoices(&self, query: InvoiceQuery) -> Result<Vec<Invoice>, PortError> {
            let store = self.store.read().await;
            let offset = query.offset.unwrap_or(0) as usize;
            let limit = query.limit.map_or(usize::MAX, |l| l as usize);
            Ok(store
                .invoices
                .values()
                .filter(|i| query.agent_id.as_ref().map_or(true, |a| i.agent_id.as_ref() == Some(a)))
                .filter(|i| {
                    query
                        .customer_id
                        .as_ref()
                        .map_or(true, |c| i.customer_id.as_ref() == Some(c))
                })
                .filter(|i| query.paid_in.as_ref().map_or(true, |r| paid_within(i, r)))
                .skip(offset)
                .take(limit)
                .cloned()
                .collect())
        }

        async fn list_payments(&self, invoice_id: &InvoiceId) -> Result<Vec<Payment>, PortError> {
            Ok(self
                .store
                .read()
                .await
                .payments
                .get(invoice_id)
                .cloned()
                .unwrap_or_default())
        }

        async fn invoices_with_payments(&self) -> Result<Vec<(Invoice, Vec<Payment>)>, PortError> {
            let store = self.store.read().await;
            Ok(store
                .invoices
                .values()
                .map(|i| (i.clone(), store.payments.get(&i.id).cloned().unwrap_or_default()))
                .collect())
        }

        async fn update_payment_dates(
            &self,
            id: &InvoiceId,
            first_payment_date: Option<DateTime<Utc>>,
            full_payment_date: Option<DateTime<Utc>>,
        ) -> Result<(), PortError> {
            let mut store = self.store.write().await;
            if store.failing_writes.contains(id) {
                return Err(PortError::connection(format!("write to invoice {id} failed")));
            }
            let invoice = store
                .invoices
                .get_mut(id)
                .ok_or_else(|| PortError::not_found("Invoice", id))?;
            invoice.first_payment_date = first_payment_date;
            invoice.full_payment_date = full_payment_date;
            invoice.updated_at = Utc::now();
            Ok(())
        }

        async fn anp_candidates(&self) -> Result<Vec<AnpCandidate>, PortError> {
            let store = self.store.read().await;
            Ok(store
                .invoices
                .values()
                .filter_map(|i| {
                    let first_payment_date = i.first_payment_date?;
                    let paid_total = sum_payments(&store, &i.id);
                    (paid_total > Decimal::ZERO).then(|| AnpCandidate {
                        invoice_id: i.id.clone(),
                        agent_id: i.agent_id.clone(),
                        amount: i.amount,
                        first_payment_date,
                        paid_total,
                        stored_anp: i.achieved_monthly_anp,
                    })
                })
                .collect())
        }

        async fn write_group_anp(
            &self,
            invoice_ids: &[InvoiceId],
            anp: Decimal,
        ) -> Result<u64, PortError> {
            let mut store = self.store.write().await;
            if let Some(id) = invoice_ids.iter().find(|id| store.failing_writes.contains(*id)) {
                return Err(PortError::connection(format!("write to invoice {id} failed")));
            }
            if let Some(id) = invoice_ids.iter().find(|id| !store.invoices.contains_key(*id)) {
                return Err(PortError::not_found("Invoice", id));
            }

            let now = Utc::now();
            for id in invoice_ids {
                if let Some(invoice) = store.invoices.get_mut(id) {
                    invoice.achieved_monthly_anp = Some(anp);
                    invoice.updated_at = now;
                }
            }
            Ok(invoice_ids.len() as u64)
        }

        async fn stored_anp(&self) -> Result<Vec<StoredAnp>, PortError> {
            let store = self.store.read().await;
            Ok(store
                .invoices
                .values()
                .filter_map(|i| {
                    i.achieved_monthly_anp.map(|anp| StoredAnp {
                        invoice_id: i.id.clone(),
                        anp,
                    })
                })
                .collect())
        }

        async fn clear_anp(&self, invoice_ids: &[InvoiceId]) -> Result<u64, PortError> {
            let mut store = self.store.write().await;
            if let Some(id) = invoice_ids.iter().find(|id| store.failing_writes.contains(*id)) {
                return Err(PortError::connection(format!("write to invoice {id} failed")));
            }

            let now = Utc::now();
            let mut cleared = 0;
            for id in invoice_ids {
                if let Some(invoice) = store.invoices.get_mut(id) {
                    if invoice.achieved_monthly_anp.take().is_some() {
                        invoice.updated_at = now;
                        cleared += 1;
                    }
                }
            }
            Ok(cleared)
        }

        async fn fully_paid_in_range(
            &self,
            agent_id: &AgentId,
            range: MonthRange,
        ) -> Result<Vec<Invoice>, PortError> {
            let store = self.store.read().await;
            Ok(store
                .invoices
                .values()
                .filter(|i| i.agent_id.as_ref() == Some(agent_id) && paid_within(i, &range))
                .cloned()
                .collect())
        }

        async fn summarize_eligible_by_agent(
            &self,
            range: MonthRange,
        ) -> Result<Vec<EligibleSummary>, PortError> {
            let store = self.store.read().await;
            let mut groups: BTreeMap<Option<AgentId>, (u64, Decimal)> = BTreeMap::new();
            for invoice in store.invoices.values().filter(|i| paid_within(i, &range)) {
                let entry = groups.entry(invoice.agent_id.clone()).or_default();
                entry.0 += 1;
                entry.1 += clamp_non_negative(invoice.eligible_amount.unwrap_or(Decimal::ZERO));
            }
            Ok(groups
                .into_iter()
                .map(|(agent_id, (invoice_count, total_eligible))| EligibleSummary {
                    agent_id,
                    invoice_count,
                    total_eligible,
                })
                .collect())
        }
    }
}
