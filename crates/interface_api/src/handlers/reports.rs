//! Generated commission report handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};

use core_kernel::ReportId;
use domain_commission::{GeneratedCommissionReport, ReportBatchResult, ReportQuery};

use crate::auth::{permissions, require_role, Claims};
use crate::dto::commission::GenerateReportsRequest;
use crate::{error::ApiError, AppState};

pub async fn list_reports(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<Vec<GeneratedCommissionReport>>, ApiError> {
    require_role(&claims, permissions::COMMISSION_READ)?;
    Ok(Json(state.commissions.list_reports(query).await?))
}

pub async fn get_report(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<GeneratedCommissionReport>, ApiError> {
    require_role(&claims, permissions::COMMISSION_READ)?;
    Ok(Json(state.commissions.get_report(&ReportId::new(id)).await?))
}

/// Generates (or regenerates) reports for one agent or a group of agents
///
/// A single-agent request fails as a whole; a batch reports per-agent
/// failures in `errors`.
pub async fn generate_reports(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<GenerateReportsRequest>,
) -> Result<(StatusCode, Json<ReportBatchResult>), ApiError> {
    require_role(&claims, permissions::COMMISSION_WRITE)?;

    let result = match request.agent_id {
        Some(agent_id) => {
            if request.classification.is_some() {
                return Err(ApiError::BadRequest(
                    "agent_id and classification are mutually exclusive".to_string(),
                ));
            }
            let report = state
                .commissions
                .generate_commission_report(&agent_id, request.month, &claims.sub)
                .await?;
            ReportBatchResult {
                month: Some(request.month),
                reports: vec![report],
                errors: Vec::new(),
            }
        }
        None => {
            state
                .commissions
                .generate_commission_reports(request.month, request.classification, &claims.sub)
                .await?
        }
    };

    Ok((StatusCode::CREATED, Json(result)))
}

pub async fn mark_paid(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<GeneratedCommissionReport>, ApiError> {
    require_role(&claims, permissions::COMMISSION_PAY)?;
    let report = state
        .commissions
        .mark_report_paid(&ReportId::new(id), &claims.sub)
        .await?;
    Ok(Json(report))
}
