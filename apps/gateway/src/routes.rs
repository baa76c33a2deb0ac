// [apps/gateway/src/routes.rs]
//! The gateway's HTTP surface (spec.md §6.1), wired through three
//! middleware stages applied in order: authentication, rate limiting,
//! billing (`crate::middleware`). Layers are stacked so a request
//! passes through them in that order before reaching a handler.

use crate::handlers::{auth, billing, scoring};
use crate::middleware::{auth_stage, billing_stage, rate_limit_stage};
use crate::state::AppState;
use axum::http::{header, Method};
use axum::routing::{delete, get, post};
use axum::{middleware, Router};
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};

pub fn build_router(state: AppState, cors_origins: &[String]) -> Router {
    let cors = build_cors_layer(cors_origins);

    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/generate-key", post(auth::generate_key))
        .route("/auth/my-keys", get(auth::my_keys))
        .route("/auth/revoke-key/:name", delete(auth::revoke_key))
        .route("/billing/purchase-tokens", post(billing::purchase_tokens))
        .route("/billing/balance", get(billing::balance))
        .route("/billing/usage-stats", get(billing::usage_stats))
        .route("/billing/rate-limit-status", get(billing::rate_limit_status))
        .route("/api/credit-scores", post(scoring::credit_scores))
        .route("/api/portfolio/optimize", post(scoring::portfolio_optimize))
        .route("/api/peak-voltages", post(scoring::peak_voltages))
        .layer(middleware::from_fn_with_state(state.clone(), billing_stage))
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit_stage))
        .layer(middleware::from_fn_with_state(state.clone(), auth_stage))
        .layer(cors)
        .with_state(state)
}

fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let parsed: Vec<_> = origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(Duration::from_secs(3600))
}
