use sqlx::FromRow;
use chrono::{DateTime, Utc};

#[derive(Debug, FromRow)]
pub struct Drug {
    pub id: i64,
    pub drug_number: Option<String>,
    pub drug: String,
    pub drug_generic_name: Option<String>,
    pub composition: i32,
    pub unit_name: String,
    pub shelve: Option<i32>,
    pub purchase_price: i32,
    pub selling_price: i32,
    pub total_stock: i32,
    pub drug_factory_id: i64,
    pub drug_category_id: i64,
    pub clinic_id: i64,
    pub unit_id: Option<i64>,
    pub created_at: Option<DateTime<Utc>>,
}
