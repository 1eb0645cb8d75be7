use serde::{Deserialize, Serialize};
use chrono::NaiveDate;

#[derive(Serialize)]
pub struct PatientsOverviewResponse {
    pub patients: Vec<PatientListItem>,
    pub queue: Vec<PatientQueueItem>,
}

#[derive(Serialize)]
pub struct PatientListItem {
    pub id: i64,
    pub full_name: String,
    pub record_number: Option<String>,
    pub phone: String,
    pub address: String,
    pub gender: String,
    pub date_birth: String,
    pub ready: bool,
}

#[derive(Serialize)]
pub struct PatientQueueItem {
    pub id: i64,
    pub registration_number: String,
    pub full_name: String,
    pub record_number: Option<String>,
    pub gender: String,
    pub created_at: String,
    pub status: String,
}

#[derive(Deserialize)]
pub struct AddPatientRequest {
    pub full_name: String,
    pub nik: String,
    pub address: String,
    pub gender: String,
    pub occupation_id: i64,
    pub pob: String,
    pub dob: NaiveDate,
    pub phone: String,
    pub allergy: Option<String>,
}

#[derive(Serialize)]
pub struct PatientResponse {
    pub id: i64,
    pub record_number: String,
    pub full_name: String,
}

#[derive(Deserialize)]
pub struct PatientQueueRequest {
    pub doctor_id: i64,
}

#[derive(Serialize)]
pub struct QueueCreatedResponse {
    pub id: i64,
    pub registration_number: String,
}
