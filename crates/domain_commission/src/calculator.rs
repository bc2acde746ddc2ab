//! Commission calculation
//!
//! Commission for a month covers the invoices an agent got fully paid in that
//! month. Each invoice earns:
//!
//! - basic = eligible amount × basic rate
//! - bonus = eligible amount × bonus rate, the rate being picked from the tier
//!   table by the invoice's achieved monthly ANP
//!
//! Both values are rounded to two places per invoice before they are summed.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use core_kernel::{AgentId, BusinessTimezone, InvoiceId, Month, Rate, RecordError};
use domain_billing::{Invoice, InvoicePort};

use crate::error::CommissionError;
use crate::schedule::{CommissionSchedule, ScheduleBook};

/// Commission earned on one invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceCommission {
    pub invoice_id: InvoiceId,
    pub full_payment_date: Option<DateTime<Utc>>,
    /// Eligible amount used for the calculation, after validation
    pub eligible_amount: Decimal,
    /// ANP used for tier lookup, after validation
    pub achieved_monthly_anp: Decimal,
    pub basic_rate: Rate,
    pub bonus_rate: Rate,
    pub basic_commission: Decimal,
    pub bonus_commission: Decimal,
    pub total_commission: Decimal,
}

impl InvoiceCommission {
    /// Computes one invoice's commission; data problems are returned alongside
    pub fn calculate(invoice: &Invoice, schedule: &CommissionSchedule) -> (Self, Vec<RecordError>) {
        let mut problems = Vec::new();

        let eligible = invoice.eligible();
        if let Some(problem) = eligible.problem() {
            problems.push(RecordError::new(&invoice.id, problem));
        }
        let eligible_amount = eligible.commission_base();

        let achieved_monthly_anp = match invoice.achieved_monthly_anp {
            Some(anp) => anp,
            None => {
                problems.push(RecordError::new(
                    &invoice.id,
                    "achieved monthly ANP is not computed; counted as zero",
                ));
                Decimal::ZERO
            }
        };

        let basic_rate = schedule.basic_rate;
        let bonus_rate = schedule.bonus_rate(achieved_monthly_anp);
        let basic_commission = basic_rate.apply(eligible_amount);
        let bonus_commission = bonus_rate.apply(eligible_amount);

        let commission = Self {
            invoice_id: invoice.id.clone(),
            full_payment_date: invoice.full_payment_date,
            eligible_amount,
            achieved_monthly_anp,
            basic_rate,
            bonus_rate,
            basic_commission,
            bonus_commission,
            total_commission: basic_commission + bonus_commission,
        };
        (commission, problems)
    }
}

/// Commission of one agent for one month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommissionReport {
    pub agent_id: AgentId,
    pub month: Month,
    pub schedule_version: String,
    pub invoices: Vec<InvoiceCommission>,
    pub total_basic_commission: Decimal,
    pub total_bonus_commission: Decimal,
    pub total_commission: Decimal,
    pub errors: Vec<RecordError>,
}

impl CommissionReport {
    /// Builds a report from invoices already known to be fully paid in `month`
    pub fn from_invoices(
        agent_id: AgentId,
        month: Month,
        schedule: &CommissionSchedule,
        invoices: &[Invoice],
    ) -> Self {
        let mut report = Self {
            agent_id,
            month,
            schedule_version: schedule.version.clone(),
            invoices: Vec::with_capacity(invoices.len()),
            total_basic_commission: Decimal::ZERO,
            total_bonus_commission: Decimal::ZERO,
            total_commission: Decimal::ZERO,
            errors: Vec::new(),
        };

        for invoice in invoices {
            let (line, problems) = InvoiceCommission::calculate(invoice, schedule);
            report.total_basic_commission += line.basic_commission;
            report.total_bonus_commission += line.bonus_commission;
            report.invoices.push(line);
            report.errors.extend(problems);
        }
        report.total_commission = report.total_basic_commission + report.total_bonus_commission;
        report
    }

    pub fn invoice_ids(&self) -> Vec<InvoiceId> {
        self.invoices.iter().map(|i| i.invoice_id.clone()).collect()
    }
}

/// Computes monthly commission per agent
#[derive(Clone)]
pub struct CommissionCalculator {
    invoices: Arc<dyn InvoicePort>,
    schedules: Arc<ScheduleBook>,
    timezone: BusinessTimezone,
}

impl CommissionCalculator {
    pub fn new(
        invoices: Arc<dyn InvoicePort>,
        schedules: Arc<ScheduleBook>,
        timezone: BusinessTimezone,
    ) -> Self {
        Self {
            invoices,
            schedules,
            timezone,
        }
    }

    pub fn schedules(&self) -> &ScheduleBook {
        &self.schedules
    }

    pub fn timezone(&self) -> BusinessTimezone {
        self.timezone
    }

    #[instrument(skip(self), fields(agent_id = %agent_id, month = %month))]
    pub async fn compute_commission(
        &self,
        agent_id: &AgentId,
        month: Month,
    ) -> Result<CommissionReport, CommissionError> {
        let schedule = self.schedules.in_force(month)?;
        let range = self.timezone.month_range(month)?;
        let invoices = self.invoices.fully_paid_in_range(agent_id, range).await?;

        let report = CommissionReport::from_invoices(agent_id.clone(), month, schedule, &invoices);
        for error in &report.errors {
            warn!(invoice_id = %error.identifier, reason = %error.message, "Invoice data problem");
        }
        Ok(report)
    }
}
