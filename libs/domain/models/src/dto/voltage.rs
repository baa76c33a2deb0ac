// [libs/domain/models/src/dto/voltage.rs]
//! Peak-voltage regression DTOs.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PeakVoltageRequest {
    pub kw_surplus: Option<f64>,
    pub kwp: Option<f64>,
    pub pvsystems_count: Option<f64>,
    pub ta: Option<f64>,
    pub gh: Option<f64>,
    pub dd: Option<f64>,
    pub rr: Option<f64>,
    pub hour_sin: Option<f64>,
    pub hour_cos: Option<f64>,
    pub week_sin: Option<f64>,
    pub week_cos: Option<f64>,
    pub weekday_sin: Option<f64>,
    pub weekday_cos: Option<f64>,
    #[serde(rename = "UW")]
    pub uw: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PeakVoltageListRequest {
    pub data: Vec<PeakVoltageRequest>,
    #[serde(default)]
    pub return_scaled: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PeakVoltageResponse {
    #[serde(flatten)]
    pub request: PeakVoltageRequest,
    pub u_max: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PeakVoltageListResponse {
    pub data: Vec<PeakVoltageResponse>,
}
