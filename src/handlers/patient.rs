use axum::{extract::{Path, State}, Json, Extension};
use axum::http::StatusCode;
use chrono::Utc;
use crate::state::AppState;
use crate::error::AppError;
use crate::dtos::patient::{
    PatientsOverviewResponse, PatientListItem, PatientQueueItem, AddPatientRequest,
    PatientResponse, PatientQueueRequest, QueueCreatedResponse,
};
use crate::middleware::auth::AuthContext;
use crate::policies;
use crate::helpers;

// GET /patients — registered patients plus everyone currently in a queue
pub async fn get_patients(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<PatientsOverviewResponse>, AppError> {
    if !policies::patient::view(&auth) {
        return Err(AppError::forbidden("Not allowed to view patients"));
    }

    let patients = sqlx::query_as::<_, (i64, String, Option<String>, String, String, String, String, bool)>(
        r#"SELECT id, full_name, record_number, phone, address, gender,
            TO_CHAR(dob, 'DD-MM-YYYY'), ready
        FROM patients
        WHERE clinic_id = $1
        ORDER BY full_name ASC"#,
    )
    .bind(auth.clinic_id)
    .fetch_all(&db_pool)
    .await?;

    let queue = sqlx::query_as::<_, (i64, String, String, Option<String>, String, String, String)>(
        r#"SELECT q.id, q.registration_number, p.full_name, p.record_number, p.gender,
            TO_CHAR(q.created_at, 'DD-MM-YYYY, HH24:MI'), q.status
        FROM patients p
        JOIN queues q ON p.id = q.patient_id
        WHERE p.clinic_id = $1 AND q.status != 'done'
        ORDER BY p.full_name ASC"#,
    )
    .bind(auth.clinic_id)
    .fetch_all(&db_pool)
    .await?;

    Ok(Json(PatientsOverviewResponse {
        patients: patients
            .into_iter()
            .map(|(id, full_name, record_number, phone, address, gender, date_birth, ready)| {
                PatientListItem { id, full_name, record_number, phone, address, gender, date_birth, ready }
            })
            .collect(),
        queue: queue
            .into_iter()
            .map(|(id, registration_number, full_name, record_number, gender, created_at, status)| {
                PatientQueueItem { id, registration_number, full_name, record_number, gender, created_at, status }
            })
            .collect(),
    }))
}

// POST /patients
pub async fn add_patient(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<AddPatientRequest>,
) -> Result<(StatusCode, Json<PatientResponse>), AppError> {
    if !policies::patient::handle(&auth) {
        return Err(AppError::forbidden("Not allowed to register patients"));
    }
    if payload.full_name.trim().is_empty() {
        return Err(AppError::validation("Full name required"));
    }
    if payload.gender != "male" && payload.gender != "female" {
        return Err(AppError::validation("Gender must be 'male' or 'female'"));
    }
    if payload.nik.len() != 16 || !payload.nik.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::validation("NIK must be 16 digits"));
    }

    let occupation_name = sqlx::query_scalar::<_, String>(
        "SELECT occupation_name FROM occupations WHERE id = $1",
    )
    .bind(payload.occupation_id)
    .fetch_optional(&db_pool)
    .await?
    .ok_or_else(|| AppError::not_found("Occupation not found"))?;

    let mut tx = db_pool.begin().await?;

    let patient_id = sqlx::query_scalar::<_, i64>(
        r#"INSERT INTO patients
            (nik, full_name, address, gender, pob, dob, phone, allergy,
             occupation_name, occupation_id, clinic_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING id"#,
    )
    .bind(&payload.nik)
    .bind(&payload.full_name)
    .bind(&payload.address)
    .bind(&payload.gender)
    .bind(&payload.pob)
    .bind(payload.dob)
    .bind(&payload.phone)
    .bind(&payload.allergy)
    .bind(&occupation_name)
    .bind(payload.occupation_id)
    .bind(auth.clinic_id)
    .fetch_one(&mut *tx)
    .await?;

    let record_number = helpers::record_number(patient_id);
    sqlx::query("UPDATE patients SET record_number = $1 WHERE id = $2")
        .bind(&record_number)
        .bind(patient_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok((
        StatusCode::CREATED,
        Json(PatientResponse { id: patient_id, record_number, full_name: payload.full_name }),
    ))
}

// POST /patients/{id}/queue — puts a ready patient into a doctor's queue
pub async fn add_patient_queue(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
    Json(payload): Json<PatientQueueRequest>,
) -> Result<(StatusCode, Json<QueueCreatedResponse>), AppError> {
    let patient = sqlx::query_as::<_, (i64, bool)>(
        "SELECT clinic_id, ready FROM patients WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&db_pool)
    .await?
    .ok_or_else(|| AppError::not_found("Patient not found"))?;

    if !policies::patient::add_queue(&auth, patient.0) {
        return Err(AppError::forbidden("Not allowed to queue this patient"));
    }
    if !patient.1 {
        return Err(AppError::bad_request("Patient is already in a queue"));
    }

    let doctor = sqlx::query_scalar::<_, i64>(
        "SELECT id FROM doctors WHERE id = $1 AND clinic_id = $2",
    )
    .bind(payload.doctor_id)
    .bind(auth.clinic_id)
    .fetch_optional(&db_pool)
    .await?;
    if doctor.is_none() {
        return Err(AppError::not_found("Doctor not found"));
    }

    let registration_number = helpers::registration_number(Utc::now().date_naive());

    let mut tx = db_pool.begin().await?;

    let queue_id = sqlx::query_scalar::<_, i64>(
        r#"INSERT INTO queues (registration_number, patient_id, doctor_id, clinic_id)
        VALUES ($1, $2, $3, $4)
        RETURNING id"#,
    )
    .bind(&registration_number)
    .bind(id)
    .bind(payload.doctor_id)
    .bind(auth.clinic_id)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("UPDATE patients SET ready = FALSE, updated_at = now() WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(QueueCreatedResponse { id: queue_id, registration_number })))
}
