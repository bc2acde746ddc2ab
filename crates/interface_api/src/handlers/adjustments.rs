//! Commission adjustment handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};

use core_kernel::AdjustmentId;
use domain_commission::{AdjustmentQuery, AdjustmentUpdate, CommissionAdjustment, NewAdjustment};

use crate::auth::{permissions, require_role, Claims};
use crate::{error::ApiError, AppState};

pub async fn list_adjustments(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<AdjustmentQuery>,
) -> Result<Json<Vec<CommissionAdjustment>>, ApiError> {
    require_role(&claims, permissions::COMMISSION_READ)?;
    Ok(Json(state.commissions.list_adjustments(query).await?))
}

pub async fn create_adjustment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<NewAdjustment>,
) -> Result<(StatusCode, Json<CommissionAdjustment>), ApiError> {
    require_role(&claims, permissions::COMMISSION_WRITE)?;
    let adjustment = state
        .commissions
        .create_adjustment(request, &claims.sub)
        .await?;
    Ok((StatusCode::CREATED, Json(adjustment)))
}

pub async fn update_adjustment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(update): Json<AdjustmentUpdate>,
) -> Result<Json<CommissionAdjustment>, ApiError> {
    require_role(&claims, permissions::COMMISSION_WRITE)?;
    let adjustment = state
        .commissions
        .update_adjustment(&AdjustmentId::new(id), update, &claims.sub)
        .await?;
    Ok(Json(adjustment))
}

pub async fn delete_adjustment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    require_role(&claims, permissions::COMMISSION_WRITE)?;
    state
        .commissions
        .delete_adjustment(&AdjustmentId::new(id), &claims.sub)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
