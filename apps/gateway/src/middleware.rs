// [apps/gateway/src/middleware.rs]
//! The three request-pipeline stages from spec.md §2/§4.6-§4.8, applied
//! in this order by `crate::routes::build_router`: authentication,
//! rate limiting, billing. Each stage converts its own failures to a
//! `GatewayError` response and never lets them propagate as exceptions
//! to an outer stage (spec.md §7's propagation policy).

use crate::context::RequestPrincipal;
use crate::state::AppState;
use axum::body::{to_bytes, Body};
use axum::extract::{Request, State};
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use gateway_domain_billing::UsageRecord;
use gateway_domain_models::error::GatewayError;
use std::time::Instant;

/// Caps how much of a request/response body middleware will buffer in
/// memory while pricing a request or measuring its response size.
const MAX_BUFFERED_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Paths reachable without a bearer credential, per spec.md §4.6 item 1.
/// `/auth/generate-key` carries its own username/password in the body
/// instead of a bearer token, so it is excluded the same way.
const EXCLUDED_PREFIXES: &[&str] = &["/auth/register", "/auth/login", "/auth/generate-key", "/docs", "/openapi.json"];

/// Paths whose cost is computed and debited by the billing stage.
const BILLABLE_PREFIXES: &[&str] = &["/api/"];

fn is_excluded(path: &str) -> bool {
    EXCLUDED_PREFIXES.iter().any(|p| path.starts_with(p))
}

fn is_billable(path: &str) -> bool {
    BILLABLE_PREFIXES.iter().any(|p| path.starts_with(p))
}

/// Validates the bearer API key and attaches the resolved
/// [`RequestPrincipal`] to the request's extensions. Every path not in
/// `EXCLUDED_PREFIXES` is protected — this is a default-deny reading of
/// spec.md §4.6 item 2, which names `/api/` and `/billing/` as examples
/// but the HTTP surface in §6.1 also requires auth on `/auth/my-keys`
/// and `/auth/revoke-key/{name}` (see DESIGN.md).
pub async fn auth_stage(State(state): State<AppState>, mut req: Request, next: Next) -> Result<Response, GatewayError> {
    let path = req.uri().path().to_string();
    if is_excluded(&path) {
        return Ok(next.run(req).await);
    }

    let bearer = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| GatewayError::Unauthenticated("missing bearer credential".into()))?;

    let (user, api_key) = state
        .identity
        .validate_key(bearer)
        .await
        .map_err(|_| GatewayError::Unauthenticated("invalid or expired api key".into()))?;

    req.extensions_mut().insert(RequestPrincipal { user, api_key: Some(api_key) });
    Ok(next.run(req).await)
}

/// Rejects with 429 when any sliding window (minute/hour/day) is
/// exceeded for the request's principal, per spec.md §4.7. Runs after
/// `auth_stage`, so every protected path already carries a
/// `RequestPrincipal`.
pub async fn rate_limit_stage(State(state): State<AppState>, req: Request, next: Next) -> Result<Response, GatewayError> {
    let path = req.uri().path().to_string();
    if is_excluded(&path) {
        return Ok(next.run(req).await);
    }

    let principal = req
        .extensions()
        .get::<RequestPrincipal>()
        .cloned()
        .ok_or_else(|| GatewayError::Unauthenticated("missing request principal".into()))?;

    let decision = state.ratelimit.check(&principal.user, principal.api_key.as_ref()).await?;
    if !decision.allowed {
        return Err(GatewayError::RateLimited(format!(
            "rate limit exceeded for {} window: {}/{} requests",
            decision.window_exceeded.unwrap_or_else(|| "unknown".into()),
            decision.current_count,
            decision.limit
        )));
    }

    Ok(next.run(req).await)
}

/// Prices, preflights, dispatches, and debits billable requests — the
/// state machine in spec.md §4.8. Reads the request body exactly once
/// to compute cost, then rebuilds the request so the route handler can
/// read it again unchanged (spec.md §9's "body double-read" note).
pub async fn billing_stage(State(state): State<AppState>, mut req: Request, next: Next) -> Result<Response, GatewayError> {
    let path = req.uri().path().to_string();
    if !is_billable(&path) {
        return Ok(next.run(req).await);
    }

    let principal = req
        .extensions()
        .get::<RequestPrincipal>()
        .cloned()
        .ok_or_else(|| GatewayError::Unauthenticated("missing request principal".into()))?;

    let (parts, body) = req.into_parts();
    let body_bytes = to_bytes(body, MAX_BUFFERED_BODY_BYTES)
        .await
        .map_err(|e| GatewayError::Validation(format!("failed to buffer request body: {e}")))?;

    let token_cost = state.cost_table.cost_for(&path, batch_len(&body_bytes));

    if !state.billing.check_sufficient(&principal.user, token_cost) {
        return Err(GatewayError::PaymentRequired(format!(
            "insufficient token balance: required {token_cost}, have {}",
            principal.user.token_balance
        )));
    }

    req = Request::from_parts(parts, Body::from(body_bytes.clone()));

    let started_at = Instant::now();
    let response = next.run(req).await;
    let processing_time_ms = started_at.elapsed().as_millis() as i64;

    let (resp_parts, resp_body) = response.into_parts();
    let resp_bytes = to_bytes(resp_body, MAX_BUFFERED_BODY_BYTES)
        .await
        .map_err(|e| GatewayError::Internal(format!("failed to buffer response body: {e}")))?;
    let status = resp_parts.status;

    let usage_record = UsageRecord {
        user_id: principal.user.user_id.clone(),
        api_key_id: principal.api_key.as_ref().map(|k| k.id),
        endpoint: path,
        request_size: body_bytes.len() as i64,
        response_size: resp_bytes.len() as i64,
        processing_time_ms,
    };

    if status.is_success() {
        // The preflight check above can still lose a race to a
        // concurrent debit that drains the balance first; `consume`
        // surfaces that as `PaymentRequired` and `?` propagates it.
        let (_, new_balance) = state.billing.consume(usage_record, token_cost).await?;
        let mut response = Response::from_parts(resp_parts, Body::from(resp_bytes));
        let headers = response.headers_mut();
        headers.insert("x-tokens-consumed", header_value(token_cost));
        headers.insert("x-remaining-balance", header_value(new_balance));
        headers.insert("x-processing-time-ms", header_value(processing_time_ms as f64));
        Ok(response)
    } else {
        state
            .billing
            .record_failure(usage_record, format!("HTTP {status}"))
            .await?;
        Ok(Response::from_parts(resp_parts, Body::from(resp_bytes)).into_response())
    }
}

fn header_value(n: f64) -> HeaderValue {
    HeaderValue::from_str(&n.to_string()).unwrap_or_else(|_| HeaderValue::from_static("0"))
}

/// Peeks the buffered body for a top-level `data: [...]` array, per
/// spec.md §4.5's batch-cost rule. Malformed JSON falls back to the
/// base unit cost rather than failing the request (spec.md §4.8: "If
/// body parsing fails, cost falls back to the base unit cost").
fn batch_len(body: &[u8]) -> Option<usize> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    value.get("data")?.as_array().map(|a| a.len())
}
