//! Commission Domain
//!
//! Monthly commission rules for sales agents:
//!
//! - **ANP aggregation**: sums invoice amounts per agent and first-payment
//!   month and writes the sum back to every invoice of the group.
//! - **Commission calculation**: basic plus ANP-tiered bonus commission over
//!   the invoices fully paid in a month, under a versioned schedule.
//! - **Monthly report**: invoice counts and eligible totals per agent.
//! - **Adjustments and generated reports**: manual corrections and the
//!   per-(agent, month) record of what is owed and whether it was paid.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_commission::{CommissionCalculator, ScheduleBook};
//!
//! let schedules = Arc::new(ScheduleBook::from_toml_file("config/commission_schedules.toml")?);
//! let calculator = CommissionCalculator::new(invoice_port, schedules, BusinessTimezone::default());
//! let report = calculator.compute_commission(&agent_id, "2024-03".parse()?).await?;
//! assert_eq!(report.total_commission, report.total_basic_commission + report.total_bonus_commission);
//! ```

pub mod schedule;
pub mod anp;
pub mod calculator;
pub mod monthly;
pub mod adjustment;
pub mod report;
pub mod ports;
pub mod services;
pub mod error;

pub use schedule::{BonusTier, CommissionSchedule, ScheduleBook};
pub use anp::{
    group_candidates, AnpAggregator, AnpGroup, AnpGroupKey, AnpGrouping, AnpMismatch,
    AnpRecomputeResult, AnpVerification,
};
pub use calculator::{CommissionCalculator, CommissionReport, InvoiceCommission};
pub use monthly::{MonthlyAgentRow, MonthlyReport, MonthlyReportGenerator};
pub use adjustment::{AdjustmentQuery, AdjustmentUpdate, CommissionAdjustment, NewAdjustment};
pub use report::{GeneratedCommissionReport, ReportDraft, ReportQuery};
pub use ports::CommissionPort;
#[cfg(any(test, feature = "mock"))]
pub use ports::mock::MockCommissionPort;
pub use services::{CommissionService, ReportBatchResult};
pub use error::CommissionError;
