// [apps/gateway/src/handlers/scoring.rs]
//! `/api/*` scoring handlers. `credit_scores` and `peak_voltages` accept
//! either a single request object or `{"data": [...]}` for a batch,
//! matching `gateway_domain_billing::cost::CostTable`'s batch-cost rule
//! (see `crate::middleware::batch_len`, which peeks the same `data`
//! key). `portfolio_optimize` only ever takes a single request since it
//! operates over a caller-supplied offer list, not a batch of requests.

use crate::state::AppState;
use axum::body::Bytes;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use gateway_domain_models::dto::credit::{CreditScoreListRequest, CreditScoreListResponse, CreditScoreRequest};
use gateway_domain_models::dto::portfolio::{PortfolioRequest, PortfolioResponse};
use gateway_domain_models::dto::voltage::{
    PeakVoltageListRequest, PeakVoltageListResponse, PeakVoltageRequest, PeakVoltageResponse,
};
use gateway_domain_models::error::GatewayError;
use gateway_domain_scoring::{predict_peak_voltage, score_credit, select_portfolio};
use serde_json::Value;
use std::time::Duration;

fn is_batch(value: &Value) -> bool {
    value.get("data").and_then(Value::as_array).is_some()
}

fn parse_body(body: &Bytes) -> Result<Value, GatewayError> {
    serde_json::from_slice(body).map_err(|e| GatewayError::Validation(format!("invalid JSON body: {e}")))
}

/// Every scoring backend call carries a deadline, even though today's
/// backends are deterministic in-process functions rather than network
/// calls to a model server — see SPEC_FULL.md §5 "Timeouts".
async fn with_deadline<F, T>(deadline: Duration, work: F) -> Result<T, GatewayError>
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(deadline, work)
        .await
        .map_err(|_| GatewayError::Internal("scoring backend deadline exceeded".into()))
}

pub async fn credit_scores(State(state): State<AppState>, body: Bytes) -> Result<impl IntoResponse, GatewayError> {
    let value = parse_body(&body)?;

    if is_batch(&value) {
        let request: CreditScoreListRequest = serde_json::from_value(value)
            .map_err(|e| GatewayError::Validation(format!("invalid credit-score batch: {e}")))?;
        let data = with_deadline(state.scoring_deadline, async {
            request.data.into_iter().map(score_credit).collect::<Vec<_>>()
        })
        .await?;
        Ok(Json(serde_json::to_value(CreditScoreListResponse { data }).unwrap()))
    } else {
        let request: CreditScoreRequest = serde_json::from_value(value)
            .map_err(|e| GatewayError::Validation(format!("invalid credit-score request: {e}")))?;
        let response = with_deadline(state.scoring_deadline, async { score_credit(request) }).await?;
        Ok(Json(serde_json::to_value(response).unwrap()))
    }
}

pub async fn portfolio_optimize(
    State(state): State<AppState>,
    Json(request): Json<PortfolioRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    if request.budget <= 0.0 || request.note_size <= 0.0 {
        return Err(GatewayError::Validation("budget and note_size must be positive".into()));
    }
    let (portfolio, summary) = with_deadline(state.scoring_deadline, async { select_portfolio(&request) }).await?;
    Ok(Json(PortfolioResponse { portfolio, summary }))
}

pub async fn peak_voltages(State(state): State<AppState>, body: Bytes) -> Result<impl IntoResponse, GatewayError> {
    let value = parse_body(&body)?;

    if is_batch(&value) {
        let request: PeakVoltageListRequest = serde_json::from_value(value)
            .map_err(|e| GatewayError::Validation(format!("invalid peak-voltage batch: {e}")))?;
        let data = with_deadline(state.scoring_deadline, async {
            request
                .data
                .into_iter()
                .map(|reading| {
                    let u_max = predict_peak_voltage(&reading, request.return_scaled);
                    PeakVoltageResponse { request: reading, u_max }
                })
                .collect::<Vec<_>>()
        })
        .await?;
        Ok(Json(serde_json::to_value(PeakVoltageListResponse { data }).unwrap()))
    } else {
        let request: PeakVoltageRequest = serde_json::from_value(value)
            .map_err(|e| GatewayError::Validation(format!("invalid peak-voltage request: {e}")))?;
        let u_max = with_deadline(state.scoring_deadline, async { predict_peak_voltage(&request, false) }).await?;
        Ok(Json(serde_json::to_value(PeakVoltageResponse { request, u_max }).unwrap()))
    }
}
