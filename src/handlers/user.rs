use bcrypt::{hash, verify, DEFAULT_COST};
use crate::dtos::user::{
    RegisterAdminRequest, RegisterEmployeeRequest, UserResponse, LoginRequest, LoginResponse,
    ProfileResponse, AdministratorListItem, UserDetailResponse, UpdateAdministratorRequest,
};
use crate::auth::jwt::sign_token;
use crate::error::AppError;
use axum::{extract::{Path, State}, Json};
use axum::http::StatusCode;
use crate::state::AppState;
use crate::middleware::auth::AuthContext;
use crate::models::user::User;
use crate::policies::{self, role};
use axum::extract::Extension;
use sqlx::{Postgres, Transaction};

fn validate_gender(gender: &str) -> Result<(), AppError> {
    if gender != "male" && gender != "female" {
        return Err(AppError::validation("Gender must be 'male' or 'female'"));
    }
    Ok(())
}

fn validate_credentials(email: &str, password: &str) -> Result<(), AppError> {
    if !email.contains('@') {
        return Err(AppError::validation("Invalid email address"));
    }
    if password.len() < 6 {
        return Err(AppError::validation("Password too short"));
    }
    Ok(())
}

async fn insert_user(
    tx: &mut Transaction<'_, Postgres>,
    email: &str,
    password_hash: &str,
    role_id: i16,
    clinic_id: i64,
) -> Result<i64, AppError> {
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO users (email, password, role_id, clinic_id) VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(email)
    .bind(password_hash)
    .bind(role_id)
    .bind(clinic_id)
    .fetch_one(&mut **tx)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.code().as_deref() == Some("23505") {
                return AppError::conflict("Email already registered");
            }
        }
        AppError::db(e)
    })
}

async fn insert_profile(
    tx: &mut Transaction<'_, Postgres>,
    user_id: i64,
    full_name: &str,
    gender: &str,
    phone: Option<&str>,
    address: Option<&str>,
) -> Result<i64, AppError> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO profiles (full_name, gender, phone, address, user_id) VALUES ($1, $2, $3, $4, $5) RETURNING id",
    )
    .bind(full_name)
    .bind(gender)
    .bind(phone)
    .bind(address)
    .bind(user_id)
    .fetch_one(&mut **tx)
    .await?;
    Ok(id)
}

// POST /auth/register/admin — creates the clinic together with its owner account
pub async fn register_admin(
    State(AppState { db_pool }): State<AppState>,
    Json(payload): Json<RegisterAdminRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    if payload.clinic_name.trim().is_empty() {
        return Err(AppError::validation("Clinic name required"));
    }
    if payload.full_name.trim().is_empty() {
        return Err(AppError::validation("Full name required"));
    }
    validate_credentials(&payload.email, &payload.password)?;
    validate_gender(&payload.gender)?;

    let password_hash = hash(&payload.password, DEFAULT_COST)
        .map_err(|e| AppError::internal(format!("Hash error: {e}")))?;

    let mut tx = db_pool.begin().await?;

    let clinic_id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO clinics (clinic_name, clinic_phone, address) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(&payload.clinic_name)
    .bind(&payload.clinic_phone)
    .bind(&payload.clinic_address)
    .fetch_one(&mut *tx)
    .await?;

    let user_id = insert_user(&mut tx, &payload.email, &password_hash, role::ADMIN, clinic_id).await?;
    insert_profile(
        &mut tx,
        user_id,
        &payload.full_name,
        &payload.gender,
        payload.phone.as_deref(),
        payload.address.as_deref(),
    )
    .await?;

    tx.commit().await?;

    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            id: user_id,
            email: payload.email,
            role_id: role::ADMIN,
            clinic_id,
            full_name: payload.full_name,
        }),
    ))
}

// POST /auth/register/employee — the clinic owner creates staff accounts
pub async fn register_employee(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<RegisterEmployeeRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    if !policies::employee::admin(&auth) {
        return Err(AppError::forbidden("Only the clinic owner can register employees"));
    }
    if payload.full_name.trim().is_empty() {
        return Err(AppError::validation("Full name required"));
    }
    validate_credentials(&payload.email, &payload.password)?;
    validate_gender(&payload.gender)?;

    let role_id = match payload.role.as_str() {
        "administrator" => role::ADMINISTRATOR,
        "doctor" => role::DOCTOR,
        "doctor-assistant" => role::DOCTOR_ASSISTANT,
        "nurse" => role::NURSE,
        _ => return Err(AppError::validation("Invalid role")),
    };

    let password_hash = hash(&payload.password, DEFAULT_COST)
        .map_err(|e| AppError::internal(format!("Hash error: {e}")))?;

    let mut tx = db_pool.begin().await?;

    let user_id = insert_user(&mut tx, &payload.email, &password_hash, role_id, auth.clinic_id).await?;
    let profile_id = insert_profile(
        &mut tx,
        user_id,
        &payload.full_name,
        &payload.gender,
        payload.phone.as_deref(),
        payload.address.as_deref(),
    )
    .await?;

    match role_id {
        role::DOCTOR => {
            let speciality_id = payload
                .speciality_id
                .ok_or_else(|| AppError::validation("speciality_id required for doctors"))?;
            let known = sqlx::query_scalar::<_, i64>("SELECT id FROM doctor_specialists WHERE id = $1")
                .bind(speciality_id)
                .fetch_optional(&mut *tx)
                .await?;
            if known.is_none() {
                return Err(AppError::not_found("Speciality not found"));
            }
            sqlx::query("INSERT INTO doctors (profile_id, speciality_id, clinic_id) VALUES ($1, $2, $3)")
                .bind(profile_id)
                .bind(speciality_id)
                .bind(auth.clinic_id)
                .execute(&mut *tx)
                .await?;
        }
        role::DOCTOR_ASSISTANT => {
            let doctor_id = payload
                .doctor_id
                .ok_or_else(|| AppError::validation("doctor_id required for doctor assistants"))?;
            let known = sqlx::query_scalar::<_, i64>(
                "SELECT id FROM doctors WHERE id = $1 AND clinic_id = $2",
            )
            .bind(doctor_id)
            .bind(auth.clinic_id)
            .fetch_optional(&mut *tx)
            .await?;
            if known.is_none() {
                return Err(AppError::not_found("Doctor not found"));
            }
            sqlx::query("INSERT INTO doctor_assistants (profile_id, doctor_id) VALUES ($1, $2)")
                .bind(profile_id)
                .bind(doctor_id)
                .execute(&mut *tx)
                .await?;
        }
        _ => {}
    }

    tx.commit().await?;

    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            id: user_id,
            email: payload.email,
            role_id,
            clinic_id: auth.clinic_id,
            full_name: payload.full_name,
        }),
    ))
}

// POST /auth/login
pub async fn login(
    State(AppState { db_pool }): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    if payload.email.trim().is_empty() {
        return Err(AppError::validation("Email required"));
    }
    if payload.password.is_empty() {
        return Err(AppError::validation("Password required"));
    }

    let user = sqlx::query_as::<_, User>(
        "SELECT id, email, password, role_id, clinic_id FROM users WHERE email = $1",
    )
    .bind(&payload.email)
    .fetch_optional(&db_pool)
    .await?
    .ok_or_else(|| AppError::validation("Invalid credentials"))?;

    let ok = verify(&payload.password, &user.password)
        .map_err(|e| AppError::internal(format!("Password verify error: {e}")))?;
    if !ok {
        return Err(AppError::validation("Invalid credentials"));
    }

    let full_name = sqlx::query_scalar::<_, String>(
        "SELECT full_name FROM profiles WHERE user_id = $1",
    )
    .bind(user.id)
    .fetch_optional(&db_pool)
    .await?
    .ok_or_else(|| AppError::not_found("Profile not found"))?;

    let secret = std::env::var("JWT_SECRET")
        .map_err(|_| AppError::internal("JWT secret not configured"))?;
    let token = sign_token(user.id, user.role_id, user.clinic_id, &full_name, &secret)?;

    // 8 hours = 28800 seconds
    Ok(Json(LoginResponse {
        access_token: token,
        token_type: "Bearer",
        expires_in_seconds: 8 * 60 * 60,
    }))
}

// GET /users/profile
pub async fn get_profile(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<ProfileResponse>, AppError> {
    let row = sqlx::query_as::<_, (i64, String, String)>(
        r#"SELECT u.id, p.full_name, r.role_name
        FROM users u
        JOIN roles r ON u.role_id = r.id
        JOIN profiles p ON p.user_id = u.id
        WHERE u.id = $1"#,
    )
    .bind(auth.user_id)
    .fetch_optional(&db_pool)
    .await?
    .ok_or_else(|| AppError::not_found("Profile not found"))?;

    Ok(Json(ProfileResponse { id: row.0, full_name: row.1, role_name: row.2 }))
}

// GET /users/administrators
pub async fn get_administrators(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Vec<AdministratorListItem>>, AppError> {
    if !policies::user::view(&auth) {
        return Err(AppError::forbidden("Not allowed to view administrators"));
    }

    let rows = sqlx::query_as::<_, (i64, String, String, String, Option<String>, Option<String>)>(
        r#"SELECT u.id, u.email, p.full_name, p.gender, p.phone, p.address
        FROM users u
        JOIN profiles p ON p.user_id = u.id
        WHERE u.clinic_id = $1 AND u.role_id = $2
        ORDER BY p.full_name ASC"#,
    )
    .bind(auth.clinic_id)
    .bind(role::ADMINISTRATOR)
    .fetch_all(&db_pool)
    .await?;

    Ok(Json(
        rows.into_iter()
            .map(|(id, email, full_name, gender, phone, address)| AdministratorListItem {
                id,
                email,
                full_name,
                gender,
                phone,
                address,
            })
            .collect(),
    ))
}

// GET /users/{id}
pub async fn get_user_detail(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> Result<Json<UserDetailResponse>, AppError> {
    let row = sqlx::query_as::<_, (i64, String, String, Option<String>, Option<String>, i64)>(
        r#"SELECT u.id, p.full_name, p.gender, p.phone, p.address, u.clinic_id
        FROM users u
        JOIN profiles p ON p.user_id = u.id
        WHERE u.id = $1"#,
    )
    .bind(id)
    .fetch_optional(&db_pool)
    .await?
    .ok_or_else(|| AppError::not_found("Account not found"))?;

    if !policies::user::view_detail(&auth, row.5) {
        return Err(AppError::forbidden("Not allowed to view this account"));
    }

    Ok(Json(UserDetailResponse {
        id: row.0,
        full_name: row.1,
        gender: row.2,
        phone: row.3,
        address: row.4,
    }))
}

// PUT /users/administrators/{id}
pub async fn update_administrator(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateAdministratorRequest>,
) -> Result<Json<UserDetailResponse>, AppError> {
    validate_gender(&payload.gender)?;

    let row = sqlx::query_as::<_, (i64, i16)>("SELECT clinic_id, role_id FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(&db_pool)
        .await?
        .ok_or_else(|| AppError::not_found("Administrator not found"))?;

    if !policies::user::handle_administrator(&auth, row.0, row.1) {
        return Err(AppError::forbidden("Not allowed to manage this administrator"));
    }

    sqlx::query(
        r#"UPDATE profiles
        SET full_name = $1, gender = $2, phone = $3, address = $4, updated_at = now()
        WHERE user_id = $5"#,
    )
    .bind(&payload.full_name)
    .bind(&payload.gender)
    .bind(&payload.phone)
    .bind(&payload.address)
    .bind(id)
    .execute(&db_pool)
    .await?;

    Ok(Json(UserDetailResponse {
        id,
        full_name: payload.full_name,
        gender: payload.gender,
        phone: payload.phone,
        address: payload.address,
    }))
}

// DELETE /users/administrators/{id}
pub async fn delete_administrator(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let row = sqlx::query_as::<_, (i64, i16)>("SELECT clinic_id, role_id FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(&db_pool)
        .await?
        .ok_or_else(|| AppError::not_found("Administrator not found"))?;

    if !policies::user::handle_administrator(&auth, row.0, row.1) {
        return Err(AppError::forbidden("Not allowed to manage this administrator"));
    }

    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(&db_pool)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
