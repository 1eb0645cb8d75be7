use serde::{Deserialize, Serialize};

#[derive(Serialize)]
pub struct ActionListItem {
    pub id: i64,
    pub action_name: String,
    pub action_price: i32,
}

#[derive(Deserialize)]
pub struct AddActionRequest {
    pub action_name: String,
    pub action_price: i32,
}
