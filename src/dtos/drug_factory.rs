use serde::{Deserialize, Serialize};

#[derive(Serialize)]
pub struct FactoryListItem {
    pub id: i64,
    pub factory_name: String,
    pub factory_email: String,
    pub factory_phone: String,
}

#[derive(Serialize)]
pub struct FactoryDetailResponse {
    pub id: i64,
    pub factory_name: String,
    pub factory_email: String,
    pub factory_phone: String,
    pub drugs: Vec<FactoryDetailDrug>,
}

#[derive(Serialize)]
pub struct FactoryDetailDrug {
    pub id: i64,
    pub drug: String,
    pub drug_generic_name: Option<String>,
    pub unit_name: String,
    pub composition: i32,
    pub purchase_price: i32,
    pub selling_price: i32,
    pub total_stock: i32,
    pub category_name: String,
}

#[derive(Deserialize)]
pub struct AddDrugFactoryRequest {
    pub factory_name: String,
    pub factory_email: String,
    pub factory_phone: String,
}
