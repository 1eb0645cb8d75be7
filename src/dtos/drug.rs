use serde::{Deserialize, Serialize};

// Drug categories

#[derive(Serialize)]
pub struct DrugCategoryListItem {
    pub id: i64,
    pub category_number: Option<String>,
    pub category_name: String,
}

#[derive(Serialize)]
pub struct DrugCategoryResponse {
    pub id: i64,
    pub category_number: Option<String>,
    pub category_name: String,
}

#[derive(Deserialize)]
pub struct AddDrugCategoryRequest {
    pub category_name: String,
}

// Drugs

#[derive(Serialize)]
pub struct DrugListItem {
    pub id: i64,
    pub drug: String,
    pub drug_generic_name: Option<String>,
    pub category_name: String,
    pub shelve: Option<i32>,
    pub selling_price: i32,
    pub composition: i32,
}

#[derive(Serialize)]
pub struct DrugDetailResponse {
    pub id: i64,
    pub drug_number: Option<String>,
    pub drug: String,
    pub drug_generic_name: Option<String>,
    pub unit_name: String,
    pub composition: i32,
    pub shelve: Option<i32>,
    pub purchase_price: i32,
    pub selling_price: i32,
    pub total_stock: i32,
    pub drug_category_id: i64,
    pub category_name: String,
    pub drug_factory_id: i64,
    pub factory_name: String,
    pub unit_id: Option<i64>,
}

#[derive(Deserialize)]
pub struct AddDrugRequest {
    pub drug: String,
    pub drug_generic_name: Option<String>,
    pub composition: i32,
    pub shelve: Option<i32>,
    pub purchase_price: i32,
    pub selling_price: i32,
    pub category_id: i64,
    pub factory_id: i64,
    pub unit_id: i64,
}

#[derive(Serialize)]
pub struct FactoryDrugItem {
    pub id: i64,
    pub drug: String,
    pub purchase_price: i32,
}

#[derive(Serialize)]
pub struct AssessmentDrugItem {
    pub id: i64,
    pub drug: String,
    pub unit_name: String,
    pub selling_price: i32,
}

#[derive(Serialize)]
pub struct UnitListItem {
    pub id: i64,
    pub unit_name: String,
}
