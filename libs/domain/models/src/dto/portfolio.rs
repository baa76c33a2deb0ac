// [libs/domain/models/src/dto/portfolio.rs]
//! Portfolio-optimization DTOs. The optimizer operates over a caller-
//! supplied list of already-priced loan offers rather than a persisted
//! loan inventory (see SPEC_FULL.md §4.11).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
pub struct LoanOffer {
    pub id: Uuid,
    pub grade: String,
    pub state: Option<String>,
    pub apr: f64,
    pub expected_investor_apy: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PortfolioRequest {
    pub offers: Vec<LoanOffer>,
    pub budget: f64,
    pub note_size: f64,
    pub max_weight: f64,
    pub min_loans: i64,
    pub grade_cap: f64,
    pub state_cap: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PortfolioAllocation {
    pub id: Uuid,
    pub grade: String,
    pub state: Option<String>,
    pub apr: f64,
    pub notes: i64,
    pub allocated: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PortfolioSummary {
    pub total_cost: f64,
    pub n_loans: i64,
    pub budget: f64,
    pub invested_pct: f64,
    pub wtd_expected_apy: Option<f64>,
    pub by_grade: HashMap<String, i64>,
    pub by_state: HashMap<String, i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PortfolioResponse {
    pub portfolio: Vec<PortfolioAllocation>,
    pub summary: PortfolioSummary,
}
