use serde::{Deserialize, Serialize};

#[derive(Serialize)]
pub struct AssistantListItem {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    pub gender: String,
    pub phone: Option<String>,
    pub doctor_full_name: String,
    pub address: Option<String>,
}

#[derive(Serialize)]
pub struct AssistantDetailResponse {
    pub id: i64,
    pub full_name: String,
    pub gender: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub doctor_id: i64,
    pub doctor_full_name: String,
}

#[derive(Deserialize)]
pub struct UpdateAssistantRequest {
    pub full_name: String,
    pub gender: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub doctor_id: i64,
}
