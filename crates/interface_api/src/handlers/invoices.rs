//! Invoice handlers

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};

use core_kernel::InvoiceId;
use domain_billing::{Invoice, InvoiceDetail, InvoiceFilter, SettlementRefreshResult};

use crate::auth::{permissions, require_role, Claims};
use crate::{error::ApiError, AppState};

pub async fn list_invoices(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(filter): Query<InvoiceFilter>,
) -> Result<Json<Vec<Invoice>>, ApiError> {
    require_role(&claims, permissions::COMMISSION_READ)?;
    Ok(Json(state.billing.list_invoices(filter).await?))
}

pub async fn get_invoice(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<InvoiceDetail>, ApiError> {
    require_role(&claims, permissions::COMMISSION_READ)?;
    Ok(Json(state.billing.get_invoice_detail(&InvoiceId::new(id)).await?))
}

/// Re-derives first and full payment dates from recorded payments
pub async fn refresh_payment_dates(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<SettlementRefreshResult>, ApiError> {
    require_role(&claims, permissions::COMMISSION_WRITE)?;
    Ok(Json(state.billing.refresh_payment_dates().await?))
}
