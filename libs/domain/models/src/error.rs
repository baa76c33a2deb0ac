// [libs/domain/models/src/error.rs]
//! The gateway's unified error taxonomy. Every fallible operation across
//! the domain crates funnels into this enum so the HTTP layer has exactly
//! one place that maps errors to status codes.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("authentication required")]
    Unauthenticated(String),

    #[error("forbidden")]
    Forbidden(String),

    #[error("payment required: {0}")]
    PaymentRequired(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("not implemented: {0}")]
    NotImplemented(String),
}

impl GatewayError {
    fn status(&self) -> StatusCode {
        match self {
            GatewayError::Validation(_) => StatusCode::BAD_REQUEST,
            GatewayError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            GatewayError::Forbidden(_) => StatusCode::FORBIDDEN,
            GatewayError::PaymentRequired(_) => StatusCode::PAYMENT_REQUIRED,
            GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::Conflict(_) => StatusCode::CONFLICT,
            GatewayError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::NotImplemented(_) => StatusCode::NOT_IMPLEMENTED,
        }
    }

    fn detail(&self) -> String {
        match self {
            GatewayError::Validation(d)
            | GatewayError::Unauthenticated(d)
            | GatewayError::Forbidden(d)
            | GatewayError::PaymentRequired(d)
            | GatewayError::NotFound(d)
            | GatewayError::Conflict(d)
            | GatewayError::RateLimited(d)
            | GatewayError::Internal(d)
            | GatewayError::NotImplemented(d) => d.clone(),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        if matches!(self, GatewayError::Internal(_)) {
            tracing::error!(error = %self, "internal error");
        }
        let status = self.status();
        let mut response = (status, Json(json!(ErrorBody { detail: self.detail() }))).into_response();

        // Per spec.md §4.6/§4.7: a 401 carries a challenge header, a 429
        // tells the client when it is worth retrying.
        match self {
            GatewayError::Unauthenticated(_) => {
                response
                    .headers_mut()
                    .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
            }
            GatewayError::RateLimited(_) => {
                response
                    .headers_mut()
                    .insert(header::RETRY_AFTER, HeaderValue::from_static("60"));
            }
            _ => {}
        }

        response
    }
}
