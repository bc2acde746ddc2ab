//! Commission calculation and monthly report handlers

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};

use core_kernel::AgentId;
use domain_commission::{CommissionReport, MonthlyReport};

use crate::auth::{permissions, require_role, Claims};
use crate::dto::commission::{MonthParams, MonthlyReportParams};
use crate::{error::ApiError, AppState};

/// Computes an agent's commission for a month without storing it
pub async fn compute(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(agent_id): Path<String>,
    Query(params): Query<MonthParams>,
) -> Result<Json<CommissionReport>, ApiError> {
    require_role(&claims, permissions::COMMISSION_READ)?;
    let report = state
        .commissions
        .calculator()
        .compute_commission(&AgentId::new(agent_id), params.month)
        .await?;
    Ok(Json(report))
}

/// Eligible totals per agent over invoices fully paid in a month
pub async fn monthly_report(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(params): Query<MonthlyReportParams>,
) -> Result<Json<MonthlyReport>, ApiError> {
    require_role(&claims, permissions::COMMISSION_READ)?;
    let report = state
        .monthly
        .generate_monthly_report(params.month, params.classification)
        .await?;
    Ok(Json(report))
}
