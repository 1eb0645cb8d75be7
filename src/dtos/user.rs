use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct RegisterAdminRequest {
    pub clinic_name: String,
    pub clinic_phone: String,
    pub clinic_address: Option<String>,
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub gender: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Deserialize)]
pub struct RegisterEmployeeRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub gender: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    /// "administrator", "doctor", "doctor-assistant" or "nurse"
    pub role: String,
    /// Required when role is "doctor"
    pub speciality_id: Option<i64>,
    /// Required when role is "doctor-assistant"
    pub doctor_id: Option<i64>,
}

#[derive(Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub role_id: i16,
    pub clinic_id: i64,
    pub full_name: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in_seconds: usize,
}

#[derive(Serialize)]
pub struct ProfileResponse {
    pub id: i64,
    pub full_name: String,
    pub role_name: String,
}

#[derive(Serialize)]
pub struct AdministratorListItem {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    pub gender: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Serialize)]
pub struct UserDetailResponse {
    pub id: i64,
    pub full_name: String,
    pub gender: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateAdministratorRequest {
    pub full_name: String,
    pub gender: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}
