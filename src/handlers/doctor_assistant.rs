use axum::{extract::{Path, State}, Json, Extension};
use axum::http::StatusCode;
use crate::state::AppState;
use crate::error::AppError;
use crate::dtos::doctor_assistant::{
    AssistantListItem, AssistantDetailResponse, UpdateAssistantRequest,
};
use crate::middleware::auth::AuthContext;
use crate::policies::{self, role};

// GET /doctor-assistants
pub async fn get_assistants(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Vec<AssistantListItem>>, AppError> {
    if !policies::doctor_assistant::view(&auth) {
        return Err(AppError::forbidden("Not allowed to view doctor assistants"));
    }

    let rows = sqlx::query_as::<_, (i64, String, String, String, Option<String>, String, Option<String>)>(
        r#"SELECT u.id, u.email, pu.full_name, pu.gender, pu.phone,
            pd.full_name || ', ' || ds.speciality_title,
            pu.address
        FROM users u
        JOIN profiles pu ON u.id = pu.user_id
        JOIN doctor_assistants da ON pu.id = da.profile_id
        JOIN doctors d ON d.id = da.doctor_id
        JOIN doctor_specialists ds ON d.speciality_id = ds.id
        JOIN profiles pd ON d.profile_id = pd.id
        WHERE u.clinic_id = $1 AND u.role_id = $2
        ORDER BY pu.full_name ASC"#,
    )
    .bind(auth.clinic_id)
    .bind(role::DOCTOR_ASSISTANT)
    .fetch_all(&db_pool)
    .await?;

    Ok(Json(
        rows.into_iter()
            .map(|(id, email, full_name, gender, phone, doctor_full_name, address)| AssistantListItem {
                id,
                email,
                full_name,
                gender,
                phone,
                doctor_full_name,
                address,
            })
            .collect(),
    ))
}

// GET /doctor-assistants/{id} — id is the assistant's user id
pub async fn get_assistant_detail(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> Result<Json<AssistantDetailResponse>, AppError> {
    let row = sqlx::query_as::<_, (i64, String, String, Option<String>, Option<String>, i64, String, i64, i16)>(
        r#"SELECT u.id, pu.full_name, pu.gender, pu.phone, pu.address,
            d.id, pd.full_name || ', ' || ds.speciality_title,
            u.clinic_id, u.role_id
        FROM users u
        JOIN profiles pu ON u.id = pu.user_id
        JOIN doctor_assistants da ON pu.id = da.profile_id
        JOIN doctors d ON d.id = da.doctor_id
        JOIN doctor_specialists ds ON d.speciality_id = ds.id
        JOIN profiles pd ON d.profile_id = pd.id
        WHERE u.id = $1"#,
    )
    .bind(id)
    .fetch_optional(&db_pool)
    .await?
    .ok_or_else(|| AppError::not_found("Doctor assistant not found"))?;

    if !policies::doctor_assistant::handle(&auth, row.7, row.8) {
        return Err(AppError::forbidden("Not allowed to view this assistant"));
    }

    Ok(Json(AssistantDetailResponse {
        id: row.0,
        full_name: row.1,
        gender: row.2,
        phone: row.3,
        address: row.4,
        doctor_id: row.5,
        doctor_full_name: row.6,
    }))
}

// PUT /doctor-assistants/{id}
pub async fn update_assistant(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateAssistantRequest>,
) -> Result<Json<AssistantDetailResponse>, AppError> {
    if payload.gender != "male" && payload.gender != "female" {
        return Err(AppError::validation("Gender must be 'male' or 'female'"));
    }

    let target = sqlx::query_as::<_, (i64, i16, i64)>(
        r#"SELECT u.clinic_id, u.role_id, p.id
        FROM users u
        JOIN profiles p ON p.user_id = u.id
        WHERE u.id = $1"#,
    )
    .bind(id)
    .fetch_optional(&db_pool)
    .await?
    .ok_or_else(|| AppError::not_found("Doctor assistant not found"))?;

    if !policies::doctor_assistant::handle(&auth, target.0, target.1) {
        return Err(AppError::forbidden("Not allowed to manage this assistant"));
    }

    let doctor = sqlx::query_as::<_, (i64, String)>(
        r#"SELECT d.id, pd.full_name || ', ' || ds.speciality_title
        FROM doctors d
        JOIN doctor_specialists ds ON d.speciality_id = ds.id
        JOIN profiles pd ON d.profile_id = pd.id
        WHERE d.id = $1 AND d.clinic_id = $2"#,
    )
    .bind(payload.doctor_id)
    .bind(auth.clinic_id)
    .fetch_optional(&db_pool)
    .await?
    .ok_or_else(|| AppError::not_found("Doctor not found"))?;

    let mut tx = db_pool.begin().await?;

    sqlx::query(
        r#"UPDATE profiles
        SET full_name = $1, gender = $2, phone = $3, address = $4, updated_at = now()
        WHERE id = $5"#,
    )
    .bind(&payload.full_name)
    .bind(&payload.gender)
    .bind(&payload.phone)
    .bind(&payload.address)
    .bind(target.2)
    .execute(&mut *tx)
    .await?;

    sqlx::query("UPDATE doctor_assistants SET doctor_id = $1 WHERE profile_id = $2")
        .bind(payload.doctor_id)
        .bind(target.2)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(Json(AssistantDetailResponse {
        id,
        full_name: payload.full_name,
        gender: payload.gender,
        phone: payload.phone,
        address: payload.address,
        doctor_id: doctor.0,
        doctor_full_name: doctor.1,
    }))
}

// DELETE /doctor-assistants/{id}
pub async fn delete_assistant(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let target = sqlx::query_as::<_, (i64, i16)>("SELECT clinic_id, role_id FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(&db_pool)
        .await?
        .ok_or_else(|| AppError::not_found("Doctor assistant not found"))?;

    if !policies::doctor_assistant::handle(&auth, target.0, target.1) {
        return Err(AppError::forbidden("Not allowed to manage this assistant"));
    }

    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(&db_pool)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
