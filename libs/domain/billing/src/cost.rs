// [libs/domain/billing/src/cost.rs]
//! Per-endpoint token cost, elevated from `original_source`'s
//! hardcoded `cost_map = {"/api/peak-voltages": 1.0}` into
//! configuration (see SPEC_FULL.md §4.5 / §9 Open Questions).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Maps billable path prefixes to a unit token cost, with an optional
/// set of "batch" prefixes whose request body carries a top-level
/// `data: [...]` array — for those, cost scales linearly with the
/// array length, matching `_calculate_endpoint_cost`'s batch
/// multiplication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostTable {
    pub unit_costs: HashMap<String, f64>,
    pub batch_paths: Vec<String>,
    pub default_unit_cost: f64,
}

impl Default for CostTable {
    fn default() -> Self {
        let mut unit_costs = HashMap::new();
        unit_costs.insert("/api/credit-scores".to_string(), 1.0);
        unit_costs.insert("/api/portfolio/optimize".to_string(), 1.0);
        unit_costs.insert("/api/peak-voltages".to_string(), 1.0);

        Self {
            unit_costs,
            batch_paths: vec!["/api/credit-scores".to_string(), "/api/peak-voltages".to_string()],
            default_unit_cost: 1.0,
        }
    }
}

impl CostTable {
    /// Resolves the token cost for a request to `path`. `batch_len`, if
    /// present, is the length of the request body's top-level `data`
    /// array — only applied when `path` is in `batch_paths`.
    pub fn cost_for(&self, path: &str, batch_len: Option<usize>) -> f64 {
        let base = self
            .unit_costs
            .get(path)
            .copied()
            .unwrap_or(self.default_unit_cost);

        if self.batch_paths.iter().any(|p| p == path) {
            if let Some(n) = batch_len {
                return base * n as f64;
            }
        }
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_requests_cost_the_base_unit() {
        let table = CostTable::default();
        assert_eq!(table.cost_for("/api/peak-voltages", None), 1.0);
    }

    #[test]
    fn batch_requests_scale_with_item_count() {
        let table = CostTable::default();
        assert_eq!(table.cost_for("/api/peak-voltages", Some(5)), 5.0);
    }

    #[test]
    fn unknown_paths_fall_back_to_the_default_cost() {
        let table = CostTable::default();
        assert_eq!(table.cost_for("/api/unmapped", None), table.default_unit_cost);
    }
}
