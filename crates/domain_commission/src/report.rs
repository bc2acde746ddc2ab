//! Generated commission reports
//!
//! A generated report is the record of what an agent is owed for one month.
//! There is at most one per (agent, month). Regeneration replaces the totals
//! and the invoice list; the paid flag, payer and paid timestamp are kept.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{AgentId, InvoiceId, Month, ReportId};
use domain_party::AgentClassification;

use crate::adjustment::{total_adjustments, CommissionAdjustment};
use crate::calculator::CommissionReport;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedCommissionReport {
    pub id: ReportId,
    pub agent_id: AgentId,
    pub month: Month,
    /// Classification of the agent at generation time
    pub agent_classification: AgentClassification,
    pub schedule_version: String,
    pub total_basic_commission: Decimal,
    pub total_bonus_commission: Decimal,
    pub total_adjustments: Decimal,
    pub final_total_commission: Decimal,
    pub invoice_ids: Vec<InvoiceId>,
    pub generated_by: String,
    pub generated_at: DateTime<Utc>,
    pub is_paid: bool,
    pub paid_by: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
}

/// The generated part of a report, written by an upsert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportDraft {
    pub agent_id: AgentId,
    pub month: Month,
    pub agent_classification: AgentClassification,
    pub schedule_version: String,
    pub total_basic_commission: Decimal,
    pub total_bonus_commission: Decimal,
    pub total_adjustments: Decimal,
    pub final_total_commission: Decimal,
    pub invoice_ids: Vec<InvoiceId>,
    pub generated_by: String,
    pub generated_at: DateTime<Utc>,
}

impl ReportDraft {
    pub fn new(
        commission: &CommissionReport,
        adjustments: &[CommissionAdjustment],
        agent_classification: AgentClassification,
        actor: &str,
    ) -> Self {
        let total_adjustments = total_adjustments(adjustments);
        Self {
            agent_id: commission.agent_id.clone(),
            month: commission.month,
            agent_classification,
            schedule_version: commission.schedule_version.clone(),
            total_basic_commission: commission.total_basic_commission,
            total_bonus_commission: commission.total_bonus_commission,
            total_adjustments,
            final_total_commission: commission.total_basic_commission
                + commission.total_bonus_commission
                + total_adjustments,
            invoice_ids: commission.invoice_ids(),
            generated_by: actor.to_string(),
            generated_at: Utc::now(),
        }
    }

    /// A fresh, unpaid report holding this draft
    pub fn into_report(self, id: ReportId) -> GeneratedCommissionReport {
        GeneratedCommissionReport {
            id,
            agent_id: self.agent_id,
            month: self.month,
            agent_classification: self.agent_classification,
            schedule_version: self.schedule_version,
            total_basic_commission: self.total_basic_commission,
            total_bonus_commission: self.total_bonus_commission,
            total_adjustments: self.total_adjustments,
            final_total_commission: self.final_total_commission,
            invoice_ids: self.invoice_ids,
            generated_by: self.generated_by,
            generated_at: self.generated_at,
            is_paid: false,
            paid_by: None,
            paid_at: None,
        }
    }
}

impl GeneratedCommissionReport {
    /// Replaces the generated part, keeping id and payment status
    pub fn regenerate(&mut self, draft: ReportDraft) {
        let ReportDraft {
            agent_classification,
            schedule_version,
            total_basic_commission,
            total_bonus_commission,
            total_adjustments,
            final_total_commission,
            invoice_ids,
            generated_by,
            generated_at,
            ..
        } = draft;
        self.agent_classification = agent_classification;
        self.schedule_version = schedule_version;
        self.total_basic_commission = total_basic_commission;
        self.total_bonus_commission = total_bonus_commission;
        self.total_adjustments = total_adjustments;
        self.final_total_commission = final_total_commission;
        self.invoice_ids = invoice_ids;
        self.generated_by = generated_by;
        self.generated_at = generated_at;
    }

    pub fn mark_paid(&mut self, actor: &str, at: DateTime<Utc>) {
        self.is_paid = true;
        self.paid_by = Some(actor.to_string());
        self.paid_at = Some(at);
    }
}

/// Filters for listing generated reports
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportQuery {
    pub month: Option<Month>,
    pub agent_id: Option<AgentId>,
    pub is_paid: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adjustment::NewAdjustment;
    use crate::calculator::CommissionReport;
    use crate::schedule::CommissionSchedule;
    use domain_billing::Invoice;
    use rust_decimal_macros::dec;

    fn commission() -> CommissionReport {
        let mut invoice = Invoice::new(InvoiceId::new("inv-1"), dec!(10000))
            .with_agent(AgentId::new("a-1"))
            .with_eligible_amount(dec!(10000));
        invoice.achieved_monthly_anp = Some(dec!(20000));
        CommissionReport::from_invoices(
            AgentId::new("a-1"),
            "2024-03".parse().unwrap(),
            &CommissionSchedule::standard(),
            &[invoice],
        )
    }

    fn adjustment(amount: Decimal) -> CommissionAdjustment {
        NewAdjustment {
            agent_id: AgentId::new("a-1"),
            month: "2024-03".parse().unwrap(),
            amount,
            description: "manual".to_string(),
        }
        .into_adjustment("admin@hq")
    }

    #[test]
    fn test_final_total_includes_adjustments() {
        let draft = ReportDraft::new(
            &commission(),
            &[adjustment(dec!(100)), adjustment(dec!(-30))],
            AgentClassification::Internal,
            "admin@hq",
        );

        assert_eq!(draft.total_basic_commission, dec!(300));
        assert_eq!(draft.total_bonus_commission, dec!(200));
        assert_eq!(draft.total_adjustments, dec!(70));
        assert_eq!(draft.final_total_commission, dec!(570));
        assert_eq!(draft.invoice_ids, vec![InvoiceId::new("inv-1")]);
    }

    #[test]
    fn test_regenerate_keeps_payment_status() {
        let draft = ReportDraft::new(&commission(), &[], AgentClassification::Internal, "admin@hq");
        let mut report = draft.clone().into_report(ReportId::new("r-1"));
        let paid_at = Utc::now();
        report.mark_paid("finance@hq", paid_at);

        let mut changed = draft;
        changed.total_adjustments = dec!(50);
        changed.final_total_commission = dec!(550);
        report.regenerate(changed);

        assert_eq!(report.id.as_str(), "r-1");
        assert_eq!(report.final_total_commission, dec!(550));
        assert!(report.is_paid);
        assert_eq!(report.paid_by.as_deref(), Some("finance@hq"));
        assert_eq!(report.paid_at, Some(paid_at));
    }
}
