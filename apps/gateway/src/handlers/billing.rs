// [apps/gateway/src/handlers/billing.rs]
//! `/billing/*` handlers. All of these require an authenticated
//! principal but are never themselves billed (spec.md §6.1).

use crate::context::RequestPrincipal;
use crate::state::AppState;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::{Extension, Json};
use gateway_domain_models::dto::billing::{TokenPurchaseRequest, UsageStatsRequest};
use gateway_domain_models::error::GatewayError;

pub async fn purchase_tokens(
    State(state): State<AppState>,
    Extension(principal): Extension<RequestPrincipal>,
    Json(body): Json<TokenPurchaseRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    if !(0.0..=10_000.0).contains(&body.amount) || body.amount <= 0.0 {
        return Err(GatewayError::Validation("amount must be in (0, 10000]".into()));
    }
    let response = state
        .billing
        .purchase(&principal.user.user_id, body.amount, body.reference_id)
        .await?;
    Ok(Json(response))
}

pub async fn balance(
    State(state): State<AppState>,
    Extension(principal): Extension<RequestPrincipal>,
) -> impl IntoResponse {
    Json(state.billing.balance(&principal.user).await)
}

pub async fn usage_stats(
    State(state): State<AppState>,
    Extension(principal): Extension<RequestPrincipal>,
    Query(query): Query<UsageStatsRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    if !(1..=365).contains(&query.days) {
        return Err(GatewayError::Validation("days must be in [1, 365]".into()));
    }
    let response = state.billing.usage_stats(&principal.user, query.days).await?;
    Ok(Json(response))
}

pub async fn rate_limit_status(
    State(state): State<AppState>,
    Extension(principal): Extension<RequestPrincipal>,
) -> Result<impl IntoResponse, GatewayError> {
    let status = state.ratelimit.status(&principal.user, principal.api_key.as_ref()).await?;
    Ok(Json(status))
}
