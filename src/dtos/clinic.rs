use serde::{Deserialize, Serialize};

#[derive(Serialize)]
pub struct ClinicDetailResponse {
    pub clinic_name: String,
    pub clinic_phone: String,
    pub address: Option<String>,
    pub outpatient_fee: i32,
    pub selling_fee: i32,
    pub cashier_status: bool,
}

#[derive(Deserialize)]
pub struct UpdateClinicRequest {
    pub clinic_name: String,
    pub clinic_phone: String,
    pub address: Option<String>,
    pub outpatient_fee: i32,
    pub selling_fee: i32,
}

#[derive(Serialize)]
pub struct DailyReportResponse {
    pub report: ReportSummary,
    pub selling: Vec<SellingBrief>,
    pub cashier: Vec<CashierBrief>,
}

#[derive(Serialize)]
pub struct ReportSummary {
    pub total_transaction: i64,
    pub total_transaction_price: i64,
    pub total_patient: i64,
    pub rest_patient: i64,
}

#[derive(Serialize)]
pub struct SellingBrief {
    pub invoice_number: Option<String>,
    pub total_price: i32,
}

#[derive(Serialize)]
pub struct CashierBrief {
    pub date: String,
    pub open: String,
    pub close: String,
}

#[derive(Serialize)]
pub struct CashierStatusResponse {
    pub cashier_status: bool,
    pub open_by: Option<String>,
}
