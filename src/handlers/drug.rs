use axum::{extract::{Path, Query, State}, Json, Extension};
use axum::http::StatusCode;
use serde::Deserialize;
use crate::state::AppState;
use crate::error::AppError;
use crate::dtos::drug::{
    DrugCategoryListItem, DrugCategoryResponse, AddDrugCategoryRequest,
    DrugListItem, DrugDetailResponse, AddDrugRequest, FactoryDrugItem,
    AssessmentDrugItem, UnitListItem,
};
use crate::middleware::auth::AuthContext;
use crate::models::drug::Drug;
use crate::policies;
use crate::helpers;

#[derive(Deserialize)]
pub struct DrugListParams {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub search_term: Option<String>,
}

// ==================== Drug categories ====================

pub async fn get_drug_categories(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Vec<DrugCategoryListItem>>, AppError> {
    if !policies::drug_category::view_and_add(&auth) {
        return Err(AppError::forbidden("Not allowed to view drug categories"));
    }

    let rows = sqlx::query_as::<_, (i64, Option<String>, String)>(
        "SELECT id, category_number, category_name FROM drug_categories WHERE clinic_id = $1",
    )
    .bind(auth.clinic_id)
    .fetch_all(&db_pool)
    .await?;

    Ok(Json(
        rows.into_iter()
            .map(|(id, category_number, category_name)| DrugCategoryListItem {
                id,
                category_number,
                category_name,
            })
            .collect(),
    ))
}

pub async fn get_drug_category_detail(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> Result<Json<DrugCategoryResponse>, AppError> {
    let row = sqlx::query_as::<_, (i64, Option<String>, String, i64)>(
        "SELECT id, category_number, category_name, clinic_id FROM drug_categories WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&db_pool)
    .await?
    .ok_or_else(|| AppError::not_found("Drug category not found"))?;

    if !policies::drug_category::update(&auth, row.3) {
        return Err(AppError::forbidden("Not allowed to view this category"));
    }

    Ok(Json(DrugCategoryResponse { id: row.0, category_number: row.1, category_name: row.2 }))
}

pub async fn add_drug_category(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<AddDrugCategoryRequest>,
) -> Result<(StatusCode, Json<DrugCategoryResponse>), AppError> {
    if !policies::drug_category::view_and_add(&auth) {
        return Err(AppError::forbidden("Not allowed to add drug categories"));
    }
    if payload.category_name.trim().is_empty() {
        return Err(AppError::validation("Category name required"));
    }

    let mut tx = db_pool.begin().await?;

    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO drug_categories (category_name, clinic_id) VALUES ($1, $2) RETURNING id",
    )
    .bind(&payload.category_name)
    .bind(auth.clinic_id)
    .fetch_one(&mut *tx)
    .await?;

    let category_number = helpers::category_number(id);
    sqlx::query("UPDATE drug_categories SET category_number = $1 WHERE id = $2")
        .bind(&category_number)
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok((
        StatusCode::CREATED,
        Json(DrugCategoryResponse {
            id,
            category_number: Some(category_number),
            category_name: payload.category_name,
        }),
    ))
}

pub async fn update_drug_category(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
    Json(payload): Json<AddDrugCategoryRequest>,
) -> Result<Json<DrugCategoryResponse>, AppError> {
    let clinic_id = sqlx::query_scalar::<_, i64>("SELECT clinic_id FROM drug_categories WHERE id = $1")
        .bind(id)
        .fetch_optional(&db_pool)
        .await?
        .ok_or_else(|| AppError::not_found("Drug category not found"))?;

    if !policies::drug_category::update(&auth, clinic_id) {
        return Err(AppError::forbidden("Not allowed to manage this category"));
    }

    let row = sqlx::query_as::<_, (i64, Option<String>, String)>(
        r#"UPDATE drug_categories SET category_name = $1, updated_at = now()
        WHERE id = $2
        RETURNING id, category_number, category_name"#,
    )
    .bind(&payload.category_name)
    .bind(id)
    .fetch_one(&db_pool)
    .await?;

    Ok(Json(DrugCategoryResponse { id: row.0, category_number: row.1, category_name: row.2 }))
}

pub async fn delete_drug_category(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let clinic_id = sqlx::query_scalar::<_, i64>("SELECT clinic_id FROM drug_categories WHERE id = $1")
        .bind(id)
        .fetch_optional(&db_pool)
        .await?
        .ok_or_else(|| AppError::not_found("Drug category not found"))?;

    if !policies::drug_category::update(&auth, clinic_id) {
        return Err(AppError::forbidden("Not allowed to manage this category"));
    }

    sqlx::query("DELETE FROM drug_categories WHERE id = $1")
        .bind(id)
        .execute(&db_pool)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// ==================== Drugs ====================

pub async fn get_drugs(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(params): Query<DrugListParams>,
) -> Result<Json<Vec<DrugListItem>>, AppError> {
    if !policies::drug::view(&auth) {
        return Err(AppError::forbidden("Not allowed to view drugs"));
    }

    let page = params.page.unwrap_or(1);
    let per_page = params.per_page.unwrap_or(10);
    let search = format!("%{}%", params.search_term.unwrap_or_default());

    let rows = sqlx::query_as::<_, (i64, String, Option<String>, String, Option<i32>, i32, i32)>(
        r#"SELECT d.id, d.drug, d.drug_generic_name, dc.category_name,
            d.shelve, d.selling_price, d.composition
        FROM drugs d
        JOIN drug_categories dc ON d.drug_category_id = dc.id
        WHERE d.clinic_id = $1
            AND (d.drug ILIKE $2 OR d.drug_generic_name ILIKE $2 OR dc.category_name ILIKE $2)
        ORDER BY d.drug ASC
        LIMIT $3 OFFSET $4"#,
    )
    .bind(auth.clinic_id)
    .bind(&search)
    .bind(per_page)
    .bind(helpers::skip_data(page, per_page))
    .fetch_all(&db_pool)
    .await?;

    Ok(Json(
        rows.into_iter()
            .map(|(id, drug, drug_generic_name, category_name, shelve, selling_price, composition)| {
                DrugListItem { id, drug, drug_generic_name, category_name, shelve, selling_price, composition }
            })
            .collect(),
    ))
}

pub async fn get_drug_detail(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> Result<Json<DrugDetailResponse>, AppError> {
    let drug = sqlx::query_as::<_, Drug>(
        r#"SELECT id, drug_number, drug, drug_generic_name, composition, unit_name, shelve,
            purchase_price, selling_price, total_stock, drug_factory_id, drug_category_id,
            clinic_id, unit_id, created_at
        FROM drugs WHERE id = $1"#,
    )
    .bind(id)
    .fetch_optional(&db_pool)
    .await?
    .ok_or_else(|| AppError::not_found("Drug not found"))?;

    if !policies::drug::update(&auth, drug.clinic_id) {
        return Err(AppError::forbidden("Not allowed to view this drug"));
    }

    let category_name = sqlx::query_scalar::<_, String>(
        "SELECT category_name FROM drug_categories WHERE id = $1",
    )
    .bind(drug.drug_category_id)
    .fetch_one(&db_pool)
    .await?;

    let factory_name = sqlx::query_scalar::<_, String>(
        "SELECT factory_name FROM drug_factories WHERE id = $1",
    )
    .bind(drug.drug_factory_id)
    .fetch_one(&db_pool)
    .await?;

    Ok(Json(DrugDetailResponse {
        id: drug.id,
        drug_number: drug.drug_number,
        drug: drug.drug,
        drug_generic_name: drug.drug_generic_name,
        unit_name: drug.unit_name,
        composition: drug.composition,
        shelve: drug.shelve,
        purchase_price: drug.purchase_price,
        selling_price: drug.selling_price,
        total_stock: drug.total_stock,
        drug_category_id: drug.drug_category_id,
        category_name,
        drug_factory_id: drug.drug_factory_id,
        factory_name,
        unit_id: drug.unit_id,
    }))
}

pub async fn add_drug(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<AddDrugRequest>,
) -> Result<(StatusCode, Json<DrugDetailResponse>), AppError> {
    if !policies::drug::view(&auth) {
        return Err(AppError::forbidden("Not allowed to add drugs"));
    }
    if payload.drug.trim().is_empty() {
        return Err(AppError::validation("Drug name required"));
    }
    if payload.purchase_price < 0 || payload.selling_price < 0 {
        return Err(AppError::validation("Prices cannot be negative"));
    }

    let unit_name = sqlx::query_scalar::<_, String>("SELECT unit_name FROM units WHERE id = $1")
        .bind(payload.unit_id)
        .fetch_optional(&db_pool)
        .await?
        .ok_or_else(|| AppError::not_found("Unit not found"))?;

    let category_name = sqlx::query_scalar::<_, String>(
        "SELECT category_name FROM drug_categories WHERE id = $1 AND clinic_id = $2",
    )
    .bind(payload.category_id)
    .bind(auth.clinic_id)
    .fetch_optional(&db_pool)
    .await?
    .ok_or_else(|| AppError::not_found("Drug category not found"))?;

    let factory_name = sqlx::query_scalar::<_, String>(
        "SELECT factory_name FROM drug_factories WHERE id = $1",
    )
    .bind(payload.factory_id)
    .fetch_optional(&db_pool)
    .await?
    .ok_or_else(|| AppError::not_found("Factory not found"))?;

    let mut tx = db_pool.begin().await?;

    let id = sqlx::query_scalar::<_, i64>(
        r#"INSERT INTO drugs
            (drug, drug_generic_name, composition, unit_name, shelve,
             purchase_price, selling_price, drug_factory_id, drug_category_id, clinic_id, unit_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING id"#,
    )
    .bind(&payload.drug)
    .bind(&payload.drug_generic_name)
    .bind(payload.composition)
    .bind(&unit_name)
    .bind(payload.shelve)
    .bind(payload.purchase_price)
    .bind(payload.selling_price)
    .bind(payload.factory_id)
    .bind(payload.category_id)
    .bind(auth.clinic_id)
    .bind(payload.unit_id)
    .fetch_one(&mut *tx)
    .await?;

    let drug_number = helpers::drug_number(id);
    sqlx::query("UPDATE drugs SET drug_number = $1 WHERE id = $2")
        .bind(&drug_number)
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok((
        StatusCode::CREATED,
        Json(DrugDetailResponse {
            id,
            drug_number: Some(drug_number),
            drug: payload.drug,
            drug_generic_name: payload.drug_generic_name,
            unit_name,
            composition: payload.composition,
            shelve: payload.shelve,
            purchase_price: payload.purchase_price,
            selling_price: payload.selling_price,
            total_stock: 0,
            drug_category_id: payload.category_id,
            category_name,
            drug_factory_id: payload.factory_id,
            factory_name,
            unit_id: Some(payload.unit_id),
        }),
    ))
}

pub async fn update_drug(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
    Json(payload): Json<AddDrugRequest>,
) -> Result<Json<DrugDetailResponse>, AppError> {
    let clinic_id = sqlx::query_scalar::<_, i64>("SELECT clinic_id FROM drugs WHERE id = $1")
        .bind(id)
        .fetch_optional(&db_pool)
        .await?
        .ok_or_else(|| AppError::not_found("Drug not found"))?;

    if !policies::drug::update(&auth, clinic_id) {
        return Err(AppError::forbidden("Not allowed to manage this drug"));
    }

    let unit_name = sqlx::query_scalar::<_, String>("SELECT unit_name FROM units WHERE id = $1")
        .bind(payload.unit_id)
        .fetch_optional(&db_pool)
        .await?
        .ok_or_else(|| AppError::not_found("Unit not found"))?;

    sqlx::query(
        r#"UPDATE drugs
        SET drug = $1, drug_generic_name = $2, composition = $3, unit_name = $4,
            shelve = $5, purchase_price = $6, selling_price = $7,
            drug_factory_id = $8, drug_category_id = $9, unit_id = $10, updated_at = now()
        WHERE id = $11"#,
    )
    .bind(&payload.drug)
    .bind(&payload.drug_generic_name)
    .bind(payload.composition)
    .bind(&unit_name)
    .bind(payload.shelve)
    .bind(payload.purchase_price)
    .bind(payload.selling_price)
    .bind(payload.factory_id)
    .bind(payload.category_id)
    .bind(payload.unit_id)
    .bind(id)
    .execute(&db_pool)
    .await?;

    get_drug_detail(State(AppState { db_pool }), Extension(auth), Path(id)).await
}

pub async fn delete_drug(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let clinic_id = sqlx::query_scalar::<_, i64>("SELECT clinic_id FROM drugs WHERE id = $1")
        .bind(id)
        .fetch_optional(&db_pool)
        .await?
        .ok_or_else(|| AppError::not_found("Drug not found"))?;

    if !policies::drug::update(&auth, clinic_id) {
        return Err(AppError::forbidden("Not allowed to manage this drug"));
    }

    sqlx::query("DELETE FROM drugs WHERE id = $1")
        .bind(id)
        .execute(&db_pool)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// GET /drugs/factory/{id} — purchase form helper
pub async fn get_drugs_by_factory(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<FactoryDrugItem>>, AppError> {
    if !policies::drug::view(&auth) {
        return Err(AppError::forbidden("Not allowed to view drugs"));
    }

    let factory = sqlx::query_scalar::<_, i64>("SELECT id FROM drug_factories WHERE id = $1")
        .bind(id)
        .fetch_optional(&db_pool)
        .await?;
    if factory.is_none() {
        return Err(AppError::not_found("Factory not found"));
    }

    let rows = sqlx::query_as::<_, (i64, String, i32)>(
        "SELECT id, drug, purchase_price FROM drugs WHERE drug_factory_id = $1 AND clinic_id = $2",
    )
    .bind(id)
    .bind(auth.clinic_id)
    .fetch_all(&db_pool)
    .await?;

    Ok(Json(
        rows.into_iter()
            .map(|(id, drug, purchase_price)| FactoryDrugItem { id, drug, purchase_price })
            .collect(),
    ))
}

// GET /drugs/assessment — in-stock drugs offered on the assessment form
pub async fn get_drugs_assessment(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Vec<AssessmentDrugItem>>, AppError> {
    if !policies::drug::view(&auth) {
        return Err(AppError::forbidden("Not allowed to view drugs"));
    }

    let rows = sqlx::query_as::<_, (i64, String, String, i32)>(
        "SELECT id, drug, unit_name, selling_price FROM drugs WHERE clinic_id = $1 AND total_stock > 0",
    )
    .bind(auth.clinic_id)
    .fetch_all(&db_pool)
    .await?;

    Ok(Json(
        rows.into_iter()
            .map(|(id, drug, unit_name, selling_price)| AssessmentDrugItem {
                id,
                drug,
                unit_name,
                selling_price,
            })
            .collect(),
    ))
}

// GET /drugs/units
pub async fn get_units(
    State(AppState { db_pool }): State<AppState>,
) -> Result<Json<Vec<UnitListItem>>, AppError> {
    let rows = sqlx::query_as::<_, (i64, String)>("SELECT id, unit_name FROM units ORDER BY id")
        .fetch_all(&db_pool)
        .await?;

    Ok(Json(
        rows.into_iter()
            .map(|(id, unit_name)| UnitListItem { id, unit_name })
            .collect(),
    ))
}
