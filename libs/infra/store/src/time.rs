// [libs/infra/store/src/time.rs]
//! Timestamps are always written and read as RFC 3339 strings so the
//! schema's `CURRENT_TIMESTAMP` defaults (used only for manual
//! inspection) never have to agree with this crate's parsing.

use crate::errors::StoreError;
use chrono::{DateTime, Utc};

pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}

pub fn parse_rfc3339(value: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::MappingError(format!("bad timestamp '{value}': {e}")))
}

pub fn parse_rfc3339_opt(value: Option<String>) -> Result<Option<DateTime<Utc>>, StoreError> {
    value.map(|v| parse_rfc3339(&v)).transpose()
}
