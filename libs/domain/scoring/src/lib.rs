// [libs/domain/scoring/src/lib.rs]
//! Deterministic stand-ins for the gateway's three scoring backends:
//! credit-risk PD + loan pricing, portfolio optimization over priced
//! offers, and peak-voltage regression. None of these load a trained
//! model artifact — each is a pure function of its inputs, matching
//! SPEC_FULL.md §4.11's scope boundary.

pub mod credit;
pub mod portfolio;
pub mod voltage;

pub use credit::{predict_pd, price, score as score_credit};
pub use portfolio::select as select_portfolio;
pub use voltage::predict as predict_peak_voltage;
