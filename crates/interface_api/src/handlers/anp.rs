//! ANP handlers

use axum::{
    extract::{Query, State},
    Extension, Json,
};

use domain_commission::{AnpRecomputeResult, AnpVerification};

use crate::auth::{permissions, require_role, Claims};
use crate::dto::commission::OptionalMonthParams;
use crate::{error::ApiError, AppState};

/// Recomputes achieved monthly ANP for every agent and month
pub async fn recompute(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<AnpRecomputeResult>, ApiError> {
    require_role(&claims, permissions::COMMISSION_WRITE)?;
    let result = state.anp.recompute_anp().await?;
    Ok(Json(result))
}

/// Lists invoices whose stored ANP disagrees with their group sum
pub async fn verify(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(params): Query<OptionalMonthParams>,
) -> Result<Json<AnpVerification>, ApiError> {
    require_role(&claims, permissions::COMMISSION_READ)?;
    let result = state.anp.verify_anp(params.month).await?;
    Ok(Json(result))
}
