use serde::Serialize;

#[derive(Serialize)]
pub struct ConsultWaitQueueResponse {
    pub queue: Vec<ConsultWaitQueueItem>,
    pub total: i64,
}

#[derive(Serialize)]
pub struct ConsultWaitQueueItem {
    pub id: i64,
    pub full_name: String,
    pub record_number: Option<String>,
    pub registration_number: String,
    pub status: String,
}

#[derive(Serialize)]
pub struct ConsultingQueueItem {
    pub id: i64,
    pub full_name: String,
    pub record_number: Option<String>,
    pub registration_number: String,
    pub queue_date: String,
}

#[derive(Serialize)]
pub struct ConsultingQueueDetail {
    pub id: i64,
    pub registration_number: String,
    pub record_number: Option<String>,
    pub full_name: String,
    pub birth: String,
    pub address: String,
    pub queue_date: String,
    pub doctor: String,
    pub allergy: Option<String>,
}

#[derive(Serialize)]
pub struct QueueCalledResponse {
    pub registration_number: String,
}
