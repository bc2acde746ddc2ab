//! ANP and commission DTOs

use serde::Deserialize;

use core_kernel::{AgentId, Month};
use domain_party::AgentClassification;

#[derive(Debug, Deserialize)]
pub struct MonthParams {
    pub month: Month,
}

#[derive(Debug, Default, Deserialize)]
pub struct OptionalMonthParams {
    pub month: Option<Month>,
}

#[derive(Debug, Deserialize)]
pub struct MonthlyReportParams {
    pub month: Month,
    pub classification: Option<AgentClassification>,
}

/// Generates one agent's report when `agent_id` is set, otherwise a batch
#[derive(Debug, Deserialize)]
pub struct GenerateReportsRequest {
    pub month: Month,
    pub agent_id: Option<AgentId>,
    pub classification: Option<AgentClassification>,
}
