use serde::{Deserialize, Serialize};

#[derive(Serialize)]
pub struct DoctorListItem {
    pub id: i64,
    pub doctor_id: i64,
    pub full_name: String,
    pub gender: String,
    pub phone: Option<String>,
    pub speciality_name: String,
    pub address: Option<String>,
}

#[derive(Serialize)]
pub struct DoctorDetailResponse {
    pub full_name: String,
    pub gender: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub speciality_id: i64,
    pub speciality_name: String,
    pub speciality_title: String,
}

#[derive(Deserialize)]
pub struct UpdateDoctorRequest {
    pub full_name: String,
    pub gender: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub speciality_id: i64,
}

#[derive(Deserialize)]
pub struct AddAssessmentRequest {
    pub weight: Option<i32>,
    pub height: Option<i32>,
    pub temperature: Option<i32>,
    pub blood_pressure: Option<i32>,
    pub pulse: Option<i32>,
    pub subjective: Option<String>,
    pub objective: Option<String>,
    pub assessment: Option<String>,
    pub plan: Option<String>,
    pub drug_carts: Vec<AssessmentDrugCart>,
    pub actions: Vec<i64>,
}

#[derive(Deserialize)]
pub struct AssessmentDrugCart {
    pub drug_id: i64,
    pub quantity: i32,
    pub instruction: String,
    pub total_price: i32,
}

#[derive(Serialize)]
pub struct AssessmentCreatedResponse {
    pub record_id: i64,
    pub selling_transaction_id: i64,
    pub invoice_number: String,
    pub total_price: i32,
}
