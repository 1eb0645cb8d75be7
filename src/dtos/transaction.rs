use serde::{Deserialize, Serialize};
use chrono::NaiveDate;

// Purchases

#[derive(Serialize)]
pub struct PurchaseListItem {
    pub id: i64,
    pub invoice_number: Option<String>,
    pub total_price: i32,
    pub factory_name: String,
    pub created_at: String,
}

#[derive(Serialize)]
pub struct PurchaseDetailResponse {
    pub id: i64,
    pub invoice_number: Option<String>,
    pub total_price: i32,
    pub factory_name: String,
    pub created_at: String,
    pub shopping_carts: Vec<PurchaseCartItem>,
}

#[derive(Serialize)]
pub struct PurchaseCartItem {
    pub id: i64,
    pub drug_name: String,
    pub expired: NaiveDate,
    pub quantity: i32,
    pub purchase_price: i32,
    pub total_price: i32,
}

#[derive(Deserialize)]
pub struct AddPurchaseRequest {
    pub factory_id: i64,
    pub total_price: i32,
    pub purchase_items: Vec<AddPurchaseItem>,
}

#[derive(Deserialize)]
pub struct AddPurchaseItem {
    pub drug_id: i64,
    pub quantity: i32,
    pub expired: NaiveDate,
    pub total_price: i32,
}

#[derive(Serialize)]
pub struct PurchaseCreatedResponse {
    pub id: i64,
    pub invoice_number: String,
    pub total_price: i32,
    pub batch_numbers: Vec<String>,
}

// Selling

#[derive(Serialize)]
pub struct SellingDetailResponse {
    pub id: i64,
    pub registration_number: String,
    pub invoice_number: Option<String>,
    pub sub_total_price: i32,
    pub total_price: i32,
    pub status: bool,
    pub pick_up_status: bool,
    pub patient: SellingPatient,
    pub shopping_carts: Vec<SellingCartItem>,
    pub action_carts: Vec<SellingActionItem>,
}

#[derive(Serialize)]
pub struct SellingPatient {
    pub record_number: Option<String>,
    pub full_name: String,
    pub birth: String,
}

#[derive(Serialize)]
pub struct SellingCartItem {
    pub id: i64,
    pub drug_name: String,
    pub unit_name: String,
    pub selling_price: i32,
    pub quantity: i32,
    pub total_price: i32,
    pub instruction: String,
}

#[derive(Serialize)]
pub struct SellingActionItem {
    pub id: i64,
    pub action_name: String,
    pub action_price: i32,
}

#[derive(Serialize)]
pub struct PaymentResponse {
    pub id: i64,
    pub invoice_number: Option<String>,
    pub total_price: i32,
    pub status: bool,
}

#[derive(Serialize)]
pub struct PickUpResponse {
    pub id: i64,
    pub pick_up_status: bool,
}
