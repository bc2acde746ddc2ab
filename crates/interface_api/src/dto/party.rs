//! Agent and customer DTOs

use serde::Deserialize;

use domain_party::{AgentClassification, AgentQuery};

#[derive(Debug, Default, Deserialize)]
pub struct AgentListParams {
    pub classification: Option<AgentClassification>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl From<AgentListParams> for AgentQuery {
    fn from(params: AgentListParams) -> Self {
        AgentQuery {
            classification: params.classification,
            limit: params.limit,
            offset: params.offset,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ClassificationRequest {
    pub classification: AgentClassification,
}

#[derive(Debug, Deserialize)]
pub struct CustomerSearchParams {
    pub q: String,
    pub limit: Option<u32>,
}
