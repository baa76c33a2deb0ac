// [libs/domain/scoring/src/credit.rs]
//! Credit-risk probability-of-default and loan pricing. `predict_pd` is
//! a deterministic logistic stand-in for the externally-trained H2O
//! model in `scorer.py`; `PricingEngine` is ported field-for-field from
//! `pricing.py`'s grade/APR bucket table and amortization formula (see
//! SPEC_FULL.md §4.11). Neither touches a model artifact on disk.

use gateway_domain_models::dto::credit::{CreditScoreRequest, CreditScoreResponse};
use uuid::Uuid;

/// Ordered `(pd_lo, pd_hi, grade, apr)` buckets; `apr = None` means the
/// loan is rejected at that PD range. Matches `pricing.py`'s
/// `_DEFAULT_CFG["grade_buckets"]` exactly.
const GRADE_BUCKETS: [(f64, f64, &str, Option<f64>); 7] = [
    (0.00, 0.02, "A", Some(0.06)),
    (0.02, 0.05, "B", Some(0.08)),
    (0.05, 0.10, "C", Some(0.11)),
    (0.10, 0.20, "D", Some(0.145)),
    (0.20, 0.30, "E", Some(0.18)),
    (0.30, 0.40, "F", Some(0.22)),
    (0.40, 1.01, "REJECT", None),
];

fn origination_fee_for_grade(grade: &str) -> f64 {
    match grade {
        "A" => 0.01,
        "B" => 0.015,
        "C" => 0.02,
        "D" => 0.025,
        "E" => 0.03,
        "F" => 0.04,
        _ => 0.02,
    }
}

/// Deterministic stand-in for the externally-trained probability-of-
/// default model: a fixed-weight logistic function over a handful of
/// the request's numeric fields, clamped to `[0, 1]` by construction.
/// Never a real scoring model — see SPEC_FULL.md §4.11.
pub fn predict_pd(request: &CreditScoreRequest) -> f64 {
    let fico_mid = request.fico_mid.unwrap_or_else(|| match (request.fico_range_low, request.fico_range_high) {
        (Some(lo), Some(hi)) => (lo + hi) as f64 / 2.0,
        _ => 680.0,
    });
    let dti = request.dti.unwrap_or(18.0);
    let revol_util = request.revol_util_ratio.unwrap_or_else(|| request.revol_util.unwrap_or(40.0) / 100.0);
    let delinq = request.delinq_2yrs.unwrap_or(0) as f64;
    let inquiries = request.inq_last_6mths.unwrap_or(0) as f64;
    let pub_rec = request.pub_rec.unwrap_or(0) as f64;
    let income_to_loan = request.income_to_loan.unwrap_or(5.0);

    let linear = -6.0
        - 0.012 * (fico_mid - 650.0)
        + 0.035 * dti
        + 1.1 * revol_util
        + 0.45 * delinq
        + 0.25 * inquiries
        + 0.6 * pub_rec
        - 0.08 * income_to_loan;

    1.0 / (1.0 + (-linear).exp())
}

fn resolve_term_months(term: Option<i64>, term_months: Option<i64>) -> i64 {
    term_months.filter(|m| *m > 0).or(term.filter(|m| *m > 0)).unwrap_or(36)
}

/// Level-payment amortization, matching `PricingEngine.monthly_payment`.
fn monthly_payment(principal: f64, annual_rate: f64, months: i64) -> Option<f64> {
    if months <= 0 {
        return None;
    }
    let r = annual_rate / 12.0;
    if r <= 0.0 {
        return Some(principal / months as f64);
    }
    let factor = (1.0 + r).powi(months as i32);
    Some(principal * (r * factor) / (factor - 1.0))
}

fn assign_grade_apr(pd: f64) -> (&'static str, Option<f64>) {
    for (lo, hi, grade, apr) in GRADE_BUCKETS.iter() {
        if *lo <= pd && pd < *hi {
            return (grade, *apr);
        }
    }
    ("REJECT", None)
}

/// Prices a loan given its predicted default probability: assigns a
/// grade/APR bucket, an origination fee, the amortized monthly payment,
/// and the investor's expected APY net of that fee. Returns
/// `(grade, apr, origination_fee, monthly_payment, expected_investor_apy)`.
pub fn price(
    loan_amnt: Option<i64>,
    term: Option<i64>,
    term_months: Option<i64>,
    pd: f64,
) -> (String, Option<f64>, Option<f64>, Option<f64>, Option<f64>) {
    let (grade, apr) = assign_grade_apr(pd);
    let amount = loan_amnt.map(|a| a as f64).filter(|a| *a > 0.0);

    match (apr, amount) {
        (Some(apr), Some(amount)) => {
            let fee = origination_fee_for_grade(grade);
            let months = resolve_term_months(term, term_months);
            let payment = monthly_payment(amount, apr, months);
            let expected_investor_apy = Some((1.0 - pd) * apr - fee);
            (grade.to_string(), Some(apr), Some(fee), payment, expected_investor_apy)
        }
        _ => (grade.to_string(), None, None, None, None),
    }
}

/// Scores and prices a single credit application end to end.
pub fn score(request: CreditScoreRequest) -> CreditScoreResponse {
    let id = request.id.unwrap_or_else(Uuid::new_v4);
    let pd = predict_pd(&request);
    let (grade, apr, fee, payment, apy) = price(request.loan_amnt, request.term, request.term_months, pd);

    let mut response = CreditScoreResponse::from_request(request, id, pd);
    response.grade = Some(grade);
    response.apr = apr;
    response.origination_fee = fee;
    response.monthly_payment = payment;
    response.expected_investor_apy = apy;
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strong_borrowers_land_in_grade_a_or_better() {
        let request = CreditScoreRequest {
            loan_amnt: Some(10_000),
            term_months: Some(36),
            fico_mid: Some(780.0),
            dti: Some(8.0),
            revol_util_ratio: Some(0.1),
            delinq_2yrs: Some(0),
            inq_last_6mths: Some(0),
            pub_rec: Some(0),
            income_to_loan: Some(20.0),
            ..Default::default()
        };
        let pd = predict_pd(&request);
        assert!(pd < 0.02, "expected a very low PD, got {pd}");
    }

    #[test]
    fn weak_borrowers_are_priced_worse_than_strong_ones() {
        let strong = CreditScoreRequest {
            fico_mid: Some(800.0),
            dti: Some(5.0),
            revol_util_ratio: Some(0.05),
            delinq_2yrs: Some(0),
            ..Default::default()
        };
        let weak = CreditScoreRequest {
            fico_mid: Some(580.0),
            dti: Some(35.0),
            revol_util_ratio: Some(0.9),
            delinq_2yrs: Some(3),
            pub_rec: Some(1),
            ..Default::default()
        };
        assert!(predict_pd(&strong) < predict_pd(&weak));
    }

    #[test]
    fn rejected_loans_carry_no_pricing_fields() {
        let (grade, apr, fee, payment, apy) = price(Some(5000), None, None, 0.5);
        assert_eq!(grade, "REJECT");
        assert!(apr.is_none() && fee.is_none() && payment.is_none() && apy.is_none());
    }

    #[test]
    fn monthly_payment_matches_the_amortization_formula() {
        let payment = monthly_payment(12_000.0, 0.06, 36).unwrap();
        assert!((payment - 365.06).abs() < 1.0);
    }

    #[test]
    fn scoring_a_request_fills_in_pricing_fields_for_an_investable_grade() {
        let request = CreditScoreRequest {
            loan_amnt: Some(10_000),
            term_months: Some(36),
            fico_mid: Some(780.0),
            dti: Some(8.0),
            revol_util_ratio: Some(0.1),
            ..Default::default()
        };
        let response = score(request);
        assert!(response.apr.is_some());
        assert!(response.monthly_payment.is_some());
    }

    proptest::proptest! {
        /// `predict_pd` is a logistic function by construction, so it
        /// must stay in `[0, 1]` and must be a pure function of its
        /// inputs no matter what the caller leaves unset.
        #[test]
        fn predicted_pd_is_always_a_probability(
            fico_mid in 300.0_f64..850.0,
            dti in 0.0_f64..60.0,
            revol_util_ratio in 0.0_f64..1.5,
            delinq_2yrs in 0_i64..20,
        ) {
            let request = CreditScoreRequest {
                fico_mid: Some(fico_mid),
                dti: Some(dti),
                revol_util_ratio: Some(revol_util_ratio),
                delinq_2yrs: Some(delinq_2yrs),
                ..Default::default()
            };
            let pd = predict_pd(&request);
            proptest::prop_assert!((0.0..=1.0).contains(&pd));
            proptest::prop_assert_eq!(pd, predict_pd(&request));
        }
    }
}
