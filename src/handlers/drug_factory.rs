use axum::{extract::{Path, Query, State}, Json, Extension};
use axum::http::StatusCode;
use serde::Deserialize;
use crate::state::AppState;
use crate::error::AppError;
use crate::dtos::drug_factory::{
    FactoryListItem, FactoryDetailResponse, FactoryDetailDrug, AddDrugFactoryRequest,
};
use crate::middleware::auth::AuthContext;
use crate::policies;
use crate::helpers;

#[derive(Deserialize)]
pub struct FactoryListParams {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub search_term: Option<String>,
}

// GET /drug-factories — factories partnered with the caller's clinic
pub async fn get_factories(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(params): Query<FactoryListParams>,
) -> Result<Json<Vec<FactoryListItem>>, AppError> {
    let page = params.page.unwrap_or(1);
    let per_page = params.per_page.unwrap_or(10);
    let search = format!("%{}%", params.search_term.unwrap_or_default());

    let rows = sqlx::query_as::<_, (i64, String, String, String)>(
        r#"SELECT df.id, df.factory_name, df.factory_email, df.factory_phone
        FROM drug_factories df
        INNER JOIN factory_partnerships fp ON df.id = fp.drug_factory_id
        WHERE fp.clinic_id = $1
            AND (df.factory_name ILIKE $2 OR df.factory_email ILIKE $2 OR df.factory_phone ILIKE $2)
        ORDER BY df.factory_name ASC
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
            .map(|(id, factory_name, factory_email, factory_phone)| FactoryListItem {
                id,
                factory_name,
                factory_email,
                factory_phone,
            })
            .collect(),
    ))
}

// GET /drug-factories/{id} — factory profile plus the clinic's drugs from it
pub async fn get_factory_detail(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> Result<Json<FactoryDetailResponse>, AppError> {
    if !policies::drug_factory::view_all_and_add(&auth) {
        return Err(AppError::forbidden("Not allowed to view factories"));
    }

    let factory = sqlx::query_as::<_, (i64, String, String, String)>(
        "SELECT id, factory_name, factory_email, factory_phone FROM drug_factories WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&db_pool)
    .await?
    .ok_or_else(|| AppError::not_found("Factory not found"))?;

    let drugs = sqlx::query_as::<_, (i64, String, Option<String>, String, i32, i32, i32, i32, String)>(
        r#"SELECT d.id, d.drug, d.drug_generic_name, d.unit_name, d.composition,
            d.purchase_price, d.selling_price, d.total_stock, dc.category_name
        FROM drugs d
        JOIN drug_categories dc ON d.drug_category_id = dc.id
        WHERE d.drug_factory_id = $1 AND d.clinic_id = $2
        ORDER BY d.drug ASC"#,
    )
    .bind(id)
    .bind(auth.clinic_id)
    .fetch_all(&db_pool)
    .await?;

    Ok(Json(FactoryDetailResponse {
        id: factory.0,
        factory_name: factory.1,
        factory_email: factory.2,
        factory_phone: factory.3,
        drugs: drugs
            .into_iter()
            .map(|(id, drug, drug_generic_name, unit_name, composition, purchase_price, selling_price, total_stock, category_name)| {
                FactoryDetailDrug {
                    id,
                    drug,
                    drug_generic_name,
                    unit_name,
                    composition,
                    purchase_price,
                    selling_price,
                    total_stock,
                    category_name,
                }
            })
            .collect(),
    }))
}

// POST /drug-factories — factories are shared rows; adding one attaches a
// partnership, reusing the factory if another clinic already created it
pub async fn add_drug_factory(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<AddDrugFactoryRequest>,
) -> Result<(StatusCode, Json<FactoryListItem>), AppError> {
    if !policies::drug_factory::view_all_and_add(&auth) {
        return Err(AppError::forbidden("Not allowed to add factories"));
    }
    if payload.factory_name.trim().is_empty() {
        return Err(AppError::validation("Factory name required"));
    }

    let mut tx = db_pool.begin().await?;

    let existing = sqlx::query_as::<_, (i64, String, String, String)>(
        "SELECT id, factory_name, factory_email, factory_phone FROM drug_factories WHERE factory_name = $1",
    )
    .bind(&payload.factory_name)
    .fetch_optional(&mut *tx)
    .await?;

    let factory = match existing {
        Some(f) => f,
        None => {
            sqlx::query_as::<_, (i64, String, String, String)>(
                r#"INSERT INTO drug_factories (factory_name, factory_email, factory_phone)
                VALUES ($1, $2, $3)
                RETURNING id, factory_name, factory_email, factory_phone"#,
            )
            .bind(&payload.factory_name)
            .bind(&payload.factory_email)
            .bind(&payload.factory_phone)
            .fetch_one(&mut *tx)
            .await?
        }
    };

    sqlx::query(
        r#"INSERT INTO factory_partnerships (clinic_id, drug_factory_id)
        VALUES ($1, $2)
        ON CONFLICT DO NOTHING"#,
    )
    .bind(auth.clinic_id)
    .bind(factory.0)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok((
        StatusCode::CREATED,
        Json(FactoryListItem {
            id: factory.0,
            factory_name: factory.1,
            factory_email: factory.2,
            factory_phone: factory.3,
        }),
    ))
}

// DELETE /drug-factories/{id} — detaches the partnership, never the factory
pub async fn delete_factory(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    if !policies::drug_factory::view_all_and_add(&auth) {
        return Err(AppError::forbidden("Not allowed to manage factories"));
    }

    let result = sqlx::query(
        "DELETE FROM factory_partnerships WHERE clinic_id = $1 AND drug_factory_id = $2",
    )
    .bind(auth.clinic_id)
    .bind(id)
    .execute(&db_pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found("Factory not found"));
    }

    Ok(StatusCode::NO_CONTENT)
}
