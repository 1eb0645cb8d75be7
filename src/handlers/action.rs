use axum::{extract::{Path, State}, Json, Extension};
use axum::http::StatusCode;
use crate::state::AppState;
use crate::error::AppError;
use crate::dtos::action::{ActionListItem, AddActionRequest};
use crate::middleware::auth::AuthContext;
use crate::policies;

// GET /actions
pub async fn get_actions(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Vec<ActionListItem>>, AppError> {
    if !policies::action::view(&auth) {
        return Err(AppError::forbidden("Not allowed to view actions"));
    }

    let rows = sqlx::query_as::<_, (i64, String, i32)>(
        "SELECT id, action_name, action_price FROM actions WHERE clinic_id = $1",
    )
    .bind(auth.clinic_id)
    .fetch_all(&db_pool)
    .await?;

    Ok(Json(
        rows.into_iter()
            .map(|(id, action_name, action_price)| ActionListItem { id, action_name, action_price })
            .collect(),
    ))
}

// POST /actions
pub async fn add_action(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<AddActionRequest>,
) -> Result<(StatusCode, Json<ActionListItem>), AppError> {
    if !policies::action::create(&auth) {
        return Err(AppError::forbidden("Not allowed to add actions"));
    }
    if payload.action_name.trim().is_empty() {
        return Err(AppError::validation("Action name required"));
    }
    if payload.action_price <= 0 {
        return Err(AppError::validation("Action price must be greater than 0"));
    }

    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO actions (action_name, action_price, clinic_id) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(&payload.action_name)
    .bind(payload.action_price)
    .bind(auth.clinic_id)
    .fetch_one(&db_pool)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(ActionListItem {
            id,
            action_name: payload.action_name,
            action_price: payload.action_price,
        }),
    ))
}

// PUT /actions/{id}
pub async fn update_action(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
    Json(payload): Json<AddActionRequest>,
) -> Result<Json<ActionListItem>, AppError> {
    if payload.action_price <= 0 {
        return Err(AppError::validation("Action price must be greater than 0"));
    }

    let clinic_id = sqlx::query_scalar::<_, i64>("SELECT clinic_id FROM actions WHERE id = $1")
        .bind(id)
        .fetch_optional(&db_pool)
        .await?
        .ok_or_else(|| AppError::not_found("Action not found"))?;

    if !policies::action::handle(&auth, clinic_id) {
        return Err(AppError::forbidden("Not allowed to manage this action"));
    }

    sqlx::query(
        "UPDATE actions SET action_name = $1, action_price = $2, updated_at = now() WHERE id = $3",
    )
    .bind(&payload.action_name)
    .bind(payload.action_price)
    .bind(id)
    .execute(&db_pool)
    .await?;

    Ok(Json(ActionListItem {
        id,
        action_name: payload.action_name,
        action_price: payload.action_price,
    }))
}

// DELETE /actions/{id}
pub async fn delete_action(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let clinic_id = sqlx::query_scalar::<_, i64>("SELECT clinic_id FROM actions WHERE id = $1")
        .bind(id)
        .fetch_optional(&db_pool)
        .await?
        .ok_or_else(|| AppError::not_found("Action not found"))?;

    if !policies::action::handle(&auth, clinic_id) {
        return Err(AppError::forbidden("Not allowed to manage this action"));
    }

    sqlx::query("DELETE FROM actions WHERE id = $1")
        .bind(id)
        .execute(&db_pool)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
