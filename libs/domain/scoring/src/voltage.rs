// [libs/domain/scoring/src/voltage.rs]
//! Peak-voltage regression. Stands in for the joblib-serialized
//! sklearn pipeline + `scaler_y.pkl` inverse-transform in
//! `peak_voltage_service.py`: a deterministic linear combination of
//! the request's numeric fields produces a value on the pipeline's
//! scaled output range, then an affine inverse-scale (fixed placeholder
//! mean/std, standing in for the fitted `StandardScaler`) restores it
//! to the original voltage scale unless `return_scaled` is requested.

use gateway_domain_models::dto::voltage::PeakVoltageRequest;

/// Placeholder `StandardScaler` parameters for the target variable.
const SCALED_MEAN: f64 = 230.0;
const SCALED_STD: f64 = 18.0;

/// Deterministic stand-in for the trained regression pipeline. Always
/// produces a value on the scaled (zero-mean-ish) output range; never a
/// real model prediction — see SPEC_FULL.md §4.11.
fn predict_scaled(request: &PeakVoltageRequest) -> f64 {
    let kw_surplus = request.kw_surplus.unwrap_or(0.0);
    let kwp = request.kwp.unwrap_or(0.0);
    let pvsystems_count = request.pvsystems_count.unwrap_or(1.0);
    let ta = request.ta.unwrap_or(20.0);
    let gh = request.gh.unwrap_or(400.0);
    let dd = request.dd.unwrap_or(0.0);
    let rr = request.rr.unwrap_or(0.0);
    let hour_sin = request.hour_sin.unwrap_or(0.0);
    let hour_cos = request.hour_cos.unwrap_or(1.0);
    let week_sin = request.week_sin.unwrap_or(0.0);
    let week_cos = request.week_cos.unwrap_or(1.0);
    let weekday_sin = request.weekday_sin.unwrap_or(0.0);
    let weekday_cos = request.weekday_cos.unwrap_or(1.0);
    let uw = request.uw.unwrap_or(0.0);

    0.35 * kw_surplus
        + 0.12 * kwp
        + 0.05 * pvsystems_count
        - 0.02 * ta
        + 0.006 * gh
        - 0.10 * dd
        - 0.08 * rr
        + 0.4 * hour_sin
        + 0.3 * hour_cos
        + 0.15 * week_sin
        + 0.1 * week_cos
        + 0.05 * weekday_sin
        + 0.05 * weekday_cos
        + 0.2 * uw
}

/// Predicts the peak voltage for a single reading. Returns the value
/// already in original-scale units unless `return_scaled` asks for the
/// pipeline's raw scaled output.
pub fn predict(request: &PeakVoltageRequest, return_scaled: bool) -> f64 {
    let scaled = predict_scaled(request);
    if return_scaled {
        scaled
    } else {
        scaled * SCALED_STD + SCALED_MEAN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn higher_surplus_and_irradiance_predict_a_higher_peak_voltage() {
        let low = PeakVoltageRequest {
            kw_surplus: Some(0.0),
            gh: Some(100.0),
            ..Default::default()
        };
        let high = PeakVoltageRequest {
            kw_surplus: Some(5.0),
            gh: Some(800.0),
            ..Default::default()
        };
        assert!(predict(&low, false) < predict(&high, false));
    }

    #[test]
    fn return_scaled_skips_the_inverse_transform() {
        let request = PeakVoltageRequest {
            kw_surplus: Some(2.0),
            ..Default::default()
        };
        let scaled = predict(&request, true);
        let unscaled = predict(&request, false);
        assert_eq!(unscaled, scaled * SCALED_STD + SCALED_MEAN);
    }

    #[test]
    fn an_empty_request_still_produces_a_finite_prediction() {
        let request = PeakVoltageRequest::default();
        assert!(predict(&request, false).is_finite());
    }
}
