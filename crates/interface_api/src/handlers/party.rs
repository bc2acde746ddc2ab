//! Agent and customer handlers

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};

use core_kernel::AgentId;
use domain_party::{Agent, AgentContactUpdate, Customer};

use crate::auth::{permissions, require_role, Claims};
use crate::dto::party::{AgentListParams, ClassificationRequest, CustomerSearchParams};
use crate::{error::ApiError, AppState};

pub async fn list_agents(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(params): Query<AgentListParams>,
) -> Result<Json<Vec<Agent>>, ApiError> {
    require_role(&claims, permissions::COMMISSION_READ)?;
    Ok(Json(state.party.list_agents(params.into()).await?))
}

pub async fn get_agent(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<Agent>, ApiError> {
    require_role(&claims, permissions::COMMISSION_READ)?;
    Ok(Json(state.party.get_agent(&AgentId::new(id)).await?))
}

pub async fn update_classification(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(request): Json<ClassificationRequest>,
) -> Result<Json<Agent>, ApiError> {
    require_role(&claims, permissions::AGENT_WRITE)?;
    let agent = state
        .party
        .reclassify_agent(&AgentId::new(id), request.classification, &claims.sub)
        .await?;
    Ok(Json(agent))
}

pub async fn update_contact(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(update): Json<AgentContactUpdate>,
) -> Result<Json<Agent>, ApiError> {
    require_role(&claims, permissions::AGENT_WRITE)?;
    let agent = state
        .party
        .update_agent_contact(&AgentId::new(id), update, &claims.sub)
        .await?;
    Ok(Json(agent))
}

pub async fn search_customers(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(params): Query<CustomerSearchParams>,
) -> Result<Json<Vec<Customer>>, ApiError> {
    require_role(&claims, permissions::COMMISSION_READ)?;
    Ok(Json(state.party.search_customers(&params.q, params.limit).await?))
}
