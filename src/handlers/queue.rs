use axum::{extract::{Path, State}, Json, Extension};
use axum::http::StatusCode;
use crate::state::AppState;
use crate::error::AppError;
use crate::dtos::queue::{
    ConsultWaitQueueResponse, ConsultWaitQueueItem, ConsultingQueueItem,
    ConsultingQueueDetail, QueueCalledResponse,
};
use crate::middleware::auth::AuthContext;
use crate::policies;

// GET /queues/consult-wait — a doctor assistant's view of their doctor's queue
pub async fn get_consult_wait_queue(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<ConsultWaitQueueResponse>, AppError> {
    if !policies::queue::view_doctor_assistant(&auth) {
        return Err(AppError::forbidden("Only doctor assistants can view this queue"));
    }

    let doctor_id = sqlx::query_scalar::<_, i64>(
        r#"SELECT da.doctor_id
        FROM doctor_assistants da
        JOIN profiles p ON da.profile_id = p.id
        WHERE p.user_id = $1"#,
    )
    .bind(auth.user_id)
    .fetch_optional(&db_pool)
    .await?
    .ok_or_else(|| AppError::not_found("Doctor assistant not found"))?;

    // Waiting patients first, called patients after, oldest first within each
    let rows = sqlx::query_as::<_, (i64, String, Option<String>, String, String)>(
        r#"SELECT q.id, p.full_name, p.record_number, q.registration_number, q.status
        FROM queues q
        JOIN patients p ON q.patient_id = p.id
        WHERE q.clinic_id = $1 AND q.doctor_id = $2 AND q.status IN ('consult-wait', 'consulting')
        ORDER BY
            CASE WHEN q.status = 'consult-wait' THEN 0 ELSE 1 END,
            q.created_at ASC"#,
    )
    .bind(auth.clinic_id)
    .bind(doctor_id)
    .fetch_all(&db_pool)
    .await?;

    let total = rows.iter().filter(|r| r.4 == "consult-wait").count() as i64;

    Ok(Json(ConsultWaitQueueResponse {
        queue: rows
            .into_iter()
            .map(|(id, full_name, record_number, registration_number, status)| ConsultWaitQueueItem {
                id,
                full_name,
                record_number,
                registration_number,
                status,
            })
            .collect(),
        total,
    }))
}

// GET /queues/consulting — patients already called in, for the doctor
pub async fn get_consulting_queue(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Vec<ConsultingQueueItem>>, AppError> {
    if !policies::queue::view_doctor(&auth) {
        return Err(AppError::forbidden("Only doctors can view this queue"));
    }

    let doctor_id = sqlx::query_scalar::<_, i64>(
        r#"SELECT d.id
        FROM doctors d
        JOIN profiles p ON d.profile_id = p.id
        WHERE p.user_id = $1"#,
    )
    .bind(auth.user_id)
    .fetch_optional(&db_pool)
    .await?
    .ok_or_else(|| AppError::not_found("Doctor not found"))?;

    let rows = sqlx::query_as::<_, (i64, String, Option<String>, String, String)>(
        r#"SELECT q.id, p.full_name, p.record_number, q.registration_number,
            TO_CHAR(q.created_at, 'DD-MM-YYYY')
        FROM queues q
        JOIN patients p ON q.patient_id = p.id
        WHERE q.clinic_id = $1 AND q.doctor_id = $2 AND q.status = 'consulting'
        ORDER BY q.created_at ASC"#,
    )
    .bind(auth.clinic_id)
    .bind(doctor_id)
    .fetch_all(&db_pool)
    .await?;

    Ok(Json(
        rows.into_iter()
            .map(|(id, full_name, record_number, registration_number, queue_date)| ConsultingQueueItem {
                id,
                full_name,
                record_number,
                registration_number,
                queue_date,
            })
            .collect(),
    ))
}

// GET /queues/consulting/{id}
pub async fn get_consulting_queue_detail(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> Result<Json<ConsultingQueueDetail>, AppError> {
    let row = sqlx::query_as::<_, (i64, String, Option<String>, String, String, String, String, String, Option<String>, i64)>(
        r#"SELECT q.id, q.registration_number, p.record_number, p.full_name,
            p.pob || ', ' || TO_CHAR(p.dob, 'DD Month YYYY'),
            p.address,
            TO_CHAR(q.created_at, 'DD-MM-YYYY'),
            pd.full_name || ', ' || ds.speciality_title,
            p.allergy,
            q.clinic_id
        FROM queues q
        JOIN patients p ON q.patient_id = p.id
        JOIN doctors d ON q.doctor_id = d.id
        JOIN profiles pd ON d.profile_id = pd.id
        JOIN doctor_specialists ds ON d.speciality_id = ds.id
        WHERE q.id = $1 AND q.status = 'consulting'"#,
    )
    .bind(id)
    .fetch_optional(&db_pool)
    .await?
    .ok_or_else(|| AppError::not_found("Patient not found"))?;

    if !policies::queue::view_doctor_queue_detail(&auth, row.9) {
        return Err(AppError::forbidden("Not allowed to view this queue"));
    }

    Ok(Json(ConsultingQueueDetail {
        id: row.0,
        registration_number: row.1,
        record_number: row.2,
        full_name: row.3,
        birth: row.4,
        address: row.5,
        queue_date: row.6,
        doctor: row.7,
        allergy: row.8,
    }))
}

// PUT /queues/{id}/call — assistant calls the patient into the room
pub async fn call_queue(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> Result<Json<QueueCalledResponse>, AppError> {
    let queue = sqlx::query_as::<_, (i64, String, String)>(
        "SELECT clinic_id, status, registration_number FROM queues WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&db_pool)
    .await?
    .ok_or_else(|| AppError::not_found("Queue not found"))?;

    if !policies::queue::call(&auth, queue.0) {
        return Err(AppError::forbidden("Not allowed to call this queue"));
    }
    if queue.1 != "consult-wait" {
        return Err(AppError::bad_request("Patient has already been called"));
    }

    sqlx::query("UPDATE queues SET status = 'consulting', updated_at = now() WHERE id = $1")
        .bind(id)
        .execute(&db_pool)
        .await?;

    Ok(Json(QueueCalledResponse { registration_number: queue.2 }))
}

// DELETE /queues/{id} — cancel before consultation; patient becomes ready again
pub async fn cancel_queue(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let queue = sqlx::query_as::<_, (i64, i64)>(
        "SELECT clinic_id, patient_id FROM queues WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&db_pool)
    .await?
    .ok_or_else(|| AppError::not_found("Queue not found"))?;

    if !policies::queue::cancel(&auth, queue.0) {
        return Err(AppError::forbidden("Not allowed to cancel this queue"));
    }

    let mut tx = db_pool.begin().await?;

    sqlx::query("DELETE FROM queues WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("UPDATE patients SET ready = TRUE, updated_at = now() WHERE id = $1")
        .bind(queue.1)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}
