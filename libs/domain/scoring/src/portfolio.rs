// [libs/domain/scoring/src/portfolio.rs]
//! Greedy note-buying portfolio optimizer, ported from
//! `loanrisk_project/portfolio/optimizer.py`'s `PortfolioService.select`.
//! Operates purely over the caller-supplied offer list — no persisted
//! loan inventory (see SPEC_FULL.md §4.11).

use gateway_domain_models::dto::portfolio::{
    LoanOffer, PortfolioAllocation, PortfolioRequest, PortfolioSummary,
};
use std::collections::HashMap;

fn units_left(budget: f64, total_cost: f64, note_size: f64) -> i64 {
    ((budget - total_cost) / note_size).floor() as i64
}

fn max_units_per_loan(max_weight: f64, budget: f64, note_size: f64) -> i64 {
    ((max_weight * budget) / note_size).floor().max(1.0) as i64
}

/// Ceiling-based concentration cap: always allows the very first pick,
/// then keeps each grade/state's share under `cap` rounded up to the
/// nearest whole loan at the current portfolio size.
fn cap_ok(n_after: i64, count_so_far: i64, cap: Option<f64>) -> bool {
    match cap {
        None => true,
        Some(cap) if n_after <= 1 => {
            let _ = cap;
            true
        }
        Some(cap) => {
            let max_allowed = (cap * n_after as f64).ceil() as i64;
            count_so_far + 1 <= max_allowed
        }
    }
}

/// Greedily buys fixed-size notes in offers sorted by expected investor
/// APY, honoring budget, per-loan weight caps, and grade/state
/// concentration caps. Returns `(allocations, summary)`.
pub fn select(request: &PortfolioRequest) -> (Vec<PortfolioAllocation>, PortfolioSummary) {
    let mut offers: Vec<&LoanOffer> = request
        .offers
        .iter()
        .filter(|o| o.apr > 0.0 && o.expected_investor_apy.is_finite())
        .collect();
    offers.sort_by(|a, b| b.expected_investor_apy.partial_cmp(&a.expected_investor_apy).unwrap());

    let mut allocations = Vec::new();
    let mut counts_by_grade: HashMap<String, i64> = HashMap::new();
    let mut counts_by_state: HashMap<String, i64> = HashMap::new();
    let mut total_cost = 0.0_f64;
    let max_units_each = max_units_per_loan(request.max_weight, request.budget, request.note_size);

    for offer in offers {
        if units_left(request.budget, total_cost, request.note_size) <= 0 {
            break;
        }

        let n_after = allocations.len() as i64 + 1;
        let grade_count = counts_by_grade.get(&offer.grade).copied().unwrap_or(0);
        let state_key = offer.state.clone().unwrap_or_else(|| "UNK".to_string());
        let state_count = counts_by_state.get(&state_key).copied().unwrap_or(0);

        if !cap_ok(n_after, grade_count, Some(request.grade_cap)) {
            continue;
        }
        if !cap_ok(n_after, state_count, request.state_cap) {
            continue;
        }

        let affordable = units_left(request.budget, total_cost, request.note_size);
        let units = max_units_each.min(affordable);
        if units <= 0 {
            continue;
        }

        let invested = units as f64 * request.note_size;
        allocations.push(PortfolioAllocation {
            id: offer.id,
            grade: offer.grade.clone(),
            state: offer.state.clone(),
            apr: offer.apr,
            notes: units,
            allocated: invested,
        });
        total_cost += invested;
        *counts_by_grade.entry(offer.grade.clone()).or_insert(0) += 1;
        *counts_by_state.entry(state_key).or_insert(0) += 1;

        if allocations.len() as i64 >= request.min_loans
            && units_left(request.budget, total_cost, request.note_size) == 0
        {
            break;
        }
    }

    if allocations.is_empty() {
        return (
            allocations,
            PortfolioSummary {
                total_cost: 0.0,
                n_loans: 0,
                budget: request.budget,
                invested_pct: 0.0,
                wtd_expected_apy: None,
                by_grade: HashMap::new(),
                by_state: HashMap::new(),
            },
        );
    }

    let weighted_apy_numerator: f64 = allocations
        .iter()
        .map(|a| {
            let offer = request.offers.iter().find(|o| o.id == a.id).expect("allocation comes from an offer");
            offer.expected_investor_apy * a.allocated
        })
        .sum();
    let wtd_expected_apy = if total_cost > 0.0 {
        Some(weighted_apy_numerator / total_cost)
    } else {
        None
    };

    let mut by_grade: HashMap<String, i64> = HashMap::new();
    let mut by_state: HashMap<String, i64> = HashMap::new();
    for allocation in &allocations {
        *by_grade.entry(allocation.grade.clone()).or_insert(0) += 1;
        let state_key = allocation.state.clone().unwrap_or_else(|| "UNK".to_string());
        *by_state.entry(state_key).or_insert(0) += 1;
    }

    let summary = PortfolioSummary {
        total_cost: (total_cost * 100.0).round() / 100.0,
        n_loans: allocations.len() as i64,
        budget: request.budget,
        invested_pct: ((total_cost / request.budget) * 10_000.0).round() / 10_000.0,
        wtd_expected_apy,
        by_grade,
        by_state,
    };

    (allocations, summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn offer(grade: &str, state: &str, apr: f64, apy: f64) -> LoanOffer {
        LoanOffer {
            id: Uuid::new_v4(),
            grade: grade.to_string(),
            state: Some(state.to_string()),
            apr,
            expected_investor_apy: apy,
        }
    }

    #[test]
    fn buys_highest_apy_offers_first_within_budget() {
        let request = PortfolioRequest {
            offers: vec![
                offer("A", "CA", 0.06, 0.05),
                offer("B", "NY", 0.08, 0.07),
                offer("C", "TX", 0.11, 0.09),
            ],
            budget: 200.0,
            note_size: 100.0,
            max_weight: 0.5,
            min_loans: 1,
            grade_cap: 1.0,
            state_cap: None,
        };
        let (allocations, summary) = select(&request);
        assert_eq!(allocations.len(), 2);
        assert_eq!(allocations[0].grade, "C");
        assert_eq!(summary.n_loans, 2);
        assert_eq!(summary.total_cost, 200.0);
    }

    #[test]
    fn grade_concentration_cap_is_enforced_after_the_first_pick() {
        let mut offers = vec![offer("A", "CA", 0.06, 0.20)];
        for _ in 0..9 {
            offers.push(offer("A", "NY", 0.06, 0.19));
        }
        offers.push(offer("B", "TX", 0.08, 0.10));

        let request = PortfolioRequest {
            offers,
            budget: 1100.0,
            note_size: 100.0,
            max_weight: 1.0,
            min_loans: 1,
            grade_cap: 0.5,
            state_cap: None,
        };
        let (allocations, _) = select(&request);
        let grade_a_count = allocations.iter().filter(|a| a.grade == "A").count();
        assert!(grade_a_count < 10, "grade cap should have blocked some A picks, got {grade_a_count}");
        assert!(allocations.iter().any(|a| a.grade == "B"));
    }

    #[test]
    fn per_loan_weight_cap_limits_units_bought_in_a_single_note() {
        let request = PortfolioRequest {
            offers: vec![offer("A", "CA", 0.06, 0.05)],
            budget: 1000.0,
            note_size: 100.0,
            max_weight: 0.2,
            min_loans: 1,
            grade_cap: 1.0,
            state_cap: None,
        };
        let (allocations, _) = select(&request);
        assert_eq!(allocations[0].notes, 2);
    }

    #[test]
    fn empty_offer_list_yields_an_empty_portfolio() {
        let request = PortfolioRequest {
            offers: vec![],
            budget: 1000.0,
            note_size: 100.0,
            max_weight: 0.05,
            min_loans: 20,
            grade_cap: 0.35,
            state_cap: Some(0.25),
        };
        let (allocations, summary) = select(&request);
        assert!(allocations.is_empty());
        assert_eq!(summary.n_loans, 0);
        assert!(summary.wtd_expected_apy.is_none());
    }
}
