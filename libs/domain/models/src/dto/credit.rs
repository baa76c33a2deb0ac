// [libs/domain/models/src/dto/credit.rs]
//! Credit-risk scoring DTOs: raw loan-application fields in, probability
//! of default plus pricing fields out.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CreditScoreRequest {
    pub id: Option<Uuid>,
    pub loan_amnt: Option<i64>,
    pub term: Option<i64>,
    pub int_rate: Option<f64>,
    pub installment: Option<f64>,
    pub grade: Option<String>,
    pub sub_grade: Option<String>,
    pub emp_title: Option<String>,
    pub emp_length: Option<String>,
    pub home_ownership: Option<String>,
    pub annual_inc: Option<f64>,
    pub verification_status: Option<String>,
    pub issue_d: Option<i64>,
    pub purpose: Option<String>,
    pub title: Option<String>,
    pub zip_code: Option<String>,
    pub addr_state: Option<String>,
    pub dti: Option<f64>,
    pub delinq_2yrs: Option<i64>,
    pub earliest_cr_line: Option<i64>,
    pub fico_range_low: Option<i64>,
    pub fico_range_high: Option<i64>,
    pub inq_last_6mths: Option<i64>,
    pub mths_since_last_delinq: Option<i64>,
    pub mths_since_last_record: Option<i64>,
    pub open_acc: Option<i64>,
    pub pub_rec: Option<i64>,
    pub revol_bal: Option<i64>,
    pub revol_util: Option<f64>,
    pub total_acc: Option<i64>,
    pub term_months: Option<i64>,
    pub emp_length_years: Option<f64>,
    pub fico_mid: Option<f64>,
    pub credit_hist_months: Option<f64>,
    pub income_to_loan: Option<f64>,
    pub revol_util_ratio: Option<f64>,
    pub dti_bucket: Option<String>,
    pub zip3: Option<String>,
    pub region: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreditScoreResponse {
    pub id: Uuid,
    pub loan_amnt: Option<i64>,
    pub term: Option<i64>,
    pub int_rate: Option<f64>,
    pub installment: Option<f64>,
    pub grade: Option<String>,
    pub sub_grade: Option<String>,
    pub emp_title: Option<String>,
    pub emp_length: Option<String>,
    pub home_ownership: Option<String>,
    pub annual_inc: Option<f64>,
    pub verification_status: Option<String>,
    pub issue_d: Option<i64>,
    pub purpose: Option<String>,
    pub title: Option<String>,
    pub zip_code: Option<String>,
    pub addr_state: Option<String>,
    pub dti: Option<f64>,
    pub delinq_2yrs: Option<i64>,
    pub earliest_cr_line: Option<i64>,
    pub fico_range_low: Option<i64>,
    pub fico_range_high: Option<i64>,
    pub inq_last_6mths: Option<i64>,
    pub mths_since_last_delinq: Option<i64>,
    pub mths_since_last_record: Option<i64>,
    pub open_acc: Option<i64>,
    pub pub_rec: Option<i64>,
    pub revol_bal: Option<i64>,
    pub revol_util: Option<f64>,
    pub total_acc: Option<i64>,
    pub term_months: Option<i64>,
    pub emp_length_years: Option<f64>,
    pub fico_mid: Option<f64>,
    pub credit_hist_months: Option<f64>,
    pub income_to_loan: Option<f64>,
    pub revol_util_ratio: Option<f64>,
    pub dti_bucket: Option<String>,
    pub zip3: Option<String>,
    pub region: Option<String>,
    pub pd: f64,
    pub apr: Option<f64>,
    pub origination_fee: Option<f64>,
    pub monthly_payment: Option<f64>,
    pub expected_investor_apy: Option<f64>,
}

impl CreditScoreResponse {
    pub fn from_request(request: CreditScoreRequest, id: Uuid, pd: f64) -> Self {
        Self {
            id,
            loan_amnt: request.loan_amnt,
            term: request.term,
            int_rate: request.int_rate,
            installment: request.installment,
            grade: request.grade,
            sub_grade: request.sub_grade,
            emp_title: request.emp_title,
            emp_length: request.emp_length,
            home_ownership: request.home_ownership,
            annual_inc: request.annual_inc,
            verification_status: request.verification_status,
            issue_d: request.issue_d,
            purpose: request.purpose,
            title: request.title,
            zip_code: request.zip_code,
            addr_state: request.addr_state,
            dti: request.dti,
            delinq_2yrs: request.delinq_2yrs,
            earliest_cr_line: request.earliest_cr_line,
            fico_range_low: request.fico_range_low,
            fico_range_high: request.fico_range_high,
            inq_last_6mths: request.inq_last_6mths,
            mths_since_last_delinq: request.mths_since_last_delinq,
            mths_since_last_record: request.mths_since_last_record,
            open_acc: request.open_acc,
            pub_rec: request.pub_rec,
            revol_bal: request.revol_bal,
            revol_util: request.revol_util,
            total_acc: request.total_acc,
            term_months: request.term_months,
            emp_length_years: request.emp_length_years,
            fico_mid: request.fico_mid,
            credit_hist_months: request.credit_hist_months,
            income_to_loan: request.income_to_loan,
            revol_util_ratio: request.revol_util_ratio,
            dti_bucket: request.dti_bucket,
            zip3: request.zip3,
            region: request.region,
            pd,
            apr: None,
            origination_fee: None,
            monthly_payment: None,
            expected_investor_apy: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreditScoreListRequest {
    pub data: Vec<CreditScoreRequest>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreditScoreListResponse {
    pub data: Vec<CreditScoreResponse>,
}
