// [apps/gateway/src/handlers/auth.rs]
//! `/auth/*` handlers: registration, login, API-key issuance/listing/
//! revocation. `register`, `login`, and `generate_key` run ahead of the
//! auth stage (see `crate::middleware::EXCLUDED_PREFIXES`); `my_keys`
//! and `revoke_key` read the `RequestPrincipal` the auth stage attached.

use crate::context::RequestPrincipal;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::{Extension, Json};
use gateway_domain_models::dto::auth::{
    ApiKeyListResponse, ApiKeyRequest, LoginRequest, UserRegistrationRequest,
};
use gateway_domain_models::error::GatewayError;

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<UserRegistrationRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let response = state.identity.register(&body.username, &body.email, &body.password).await?;
    Ok(Json(response))
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let response = state.identity.login(&body.username, &body.password).await?;
    Ok(Json(response))
}

pub async fn generate_key(
    State(state): State<AppState>,
    Json(body): Json<ApiKeyRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let response = state
        .identity
        .generate_key(&body.username, &body.password, &body.name, body.expires_in_days)
        .await?;
    Ok(Json(response))
}

pub async fn my_keys(
    State(state): State<AppState>,
    Extension(principal): Extension<RequestPrincipal>,
) -> Result<impl IntoResponse, GatewayError> {
    let keys = state.identity.list_keys(&principal.user.user_id).await?;
    Ok(Json(ApiKeyListResponse { keys }))
}

pub async fn revoke_key(
    State(state): State<AppState>,
    Extension(principal): Extension<RequestPrincipal>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, GatewayError> {
    let response = state.identity.revoke_key(&principal.user.user_id, &name).await?;
    Ok(Json(response))
}
