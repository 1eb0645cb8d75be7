use axum::{extract::{Path, State}, Json, Extension};
use axum::http::StatusCode;
use crate::state::AppState;
use crate::error::AppError;
use crate::dtos::doctor::{
    DoctorListItem, DoctorDetailResponse, UpdateDoctorRequest, AddAssessmentRequest,
    AssessmentCreatedResponse,
};
use crate::middleware::auth::AuthContext;
use crate::policies::{self, role};
use crate::helpers;

// GET /doctors
pub async fn get_doctors(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Vec<DoctorListItem>>, AppError> {
    if !policies::doctor::view(&auth) {
        return Err(AppError::forbidden("Not allowed to view doctors"));
    }

    let rows = sqlx::query_as::<_, (i64, i64, String, String, Option<String>, String, Option<String>)>(
        r#"SELECT u.id, d.id, p.full_name || ', ' || ds.speciality_title, p.gender,
            p.phone, ds.speciality_name, p.address
        FROM doctors d
        JOIN doctor_specialists ds ON d.speciality_id = ds.id
        JOIN profiles p ON d.profile_id = p.id
        JOIN users u ON u.id = p.user_id
        WHERE d.clinic_id = $1
        ORDER BY p.full_name ASC"#,
    )
    .bind(auth.clinic_id)
    .fetch_all(&db_pool)
    .await?;

    Ok(Json(
        rows.into_iter()
            .map(|(id, doctor_id, full_name, gender, phone, speciality_name, address)| DoctorListItem {
                id,
                doctor_id,
                full_name,
                gender,
                phone,
                speciality_name,
                address,
            })
            .collect(),
    ))
}

// GET /doctors/{id} — id is the doctor's user id
pub async fn get_doctor_detail(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> Result<Json<DoctorDetailResponse>, AppError> {
    if !policies::doctor::view(&auth) {
        return Err(AppError::forbidden("Not allowed to view doctors"));
    }

    let row = sqlx::query_as::<_, (String, String, Option<String>, Option<String>, i64, String, String)>(
        r#"SELECT p.full_name, p.gender, p.phone, p.address,
            ds.id, ds.speciality_name, ds.speciality_title
        FROM users u
        JOIN profiles p ON u.id = p.user_id
        JOIN doctors d ON p.id = d.profile_id
        JOIN doctor_specialists ds ON d.speciality_id = ds.id
        WHERE u.id = $1 AND u.role_id = $2 AND u.clinic_id = $3"#,
    )
    .bind(id)
    .bind(role::DOCTOR)
    .bind(auth.clinic_id)
    .fetch_optional(&db_pool)
    .await?
    .ok_or_else(|| AppError::not_found("Doctor not found"))?;

    Ok(Json(DoctorDetailResponse {
        full_name: row.0,
        gender: row.1,
        phone: row.2,
        address: row.3,
        speciality_id: row.4,
        speciality_name: row.5,
        speciality_title: row.6,
    }))
}

// PUT /doctors/{id}
pub async fn update_doctor(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateDoctorRequest>,
) -> Result<Json<DoctorDetailResponse>, AppError> {
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
    .ok_or_else(|| AppError::not_found("Doctor not found"))?;

    if !policies::doctor::handle(&auth, target.0, target.1) {
        return Err(AppError::forbidden("Not allowed to manage this doctor"));
    }

    let speciality = sqlx::query_as::<_, (String, String)>(
        "SELECT speciality_name, speciality_title FROM doctor_specialists WHERE id = $1",
    )
    .bind(payload.speciality_id)
    .fetch_optional(&db_pool)
    .await?
    .ok_or_else(|| AppError::not_found("Speciality not found"))?;

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

    sqlx::query("UPDATE doctors SET speciality_id = $1 WHERE profile_id = $2")
        .bind(payload.speciality_id)
        .bind(target.2)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(Json(DoctorDetailResponse {
        full_name: payload.full_name,
        gender: payload.gender,
        phone: payload.phone,
        address: payload.address,
        speciality_id: payload.speciality_id,
        speciality_name: speciality.0,
        speciality_title: speciality.1,
    }))
}

// DELETE /doctors/{id}
pub async fn delete_doctor(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let target = sqlx::query_as::<_, (i64, i16)>("SELECT clinic_id, role_id FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(&db_pool)
        .await?
        .ok_or_else(|| AppError::not_found("Doctor not found"))?;

    if !policies::doctor::handle(&auth, target.0, target.1) {
        return Err(AppError::forbidden("Not allowed to manage this doctor"));
    }

    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(&db_pool)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// POST /doctors/queues/{id}/assessment
//
// Writes the medical record with a full patient snapshot, builds the selling
// transaction (drug carts + action carts) and moves the queue to payment.
// The aggregate stock gate runs here, before any cart is written; actual lot
// depletion happens later, when the cashier settles the payment.
pub async fn add_assessment(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(queue_id): Path<i64>,
    Json(payload): Json<AddAssessmentRequest>,
) -> Result<(StatusCode, Json<AssessmentCreatedResponse>), AppError> {
    let queue = sqlx::query_as::<_, (i64, String, String, i64, i64, i64)>(
        r#"SELECT q.id, q.status, q.registration_number, q.clinic_id, q.patient_id, q.doctor_id
        FROM queues q
        WHERE q.id = $1"#,
    )
    .bind(queue_id)
    .fetch_optional(&db_pool)
    .await?
    .ok_or_else(|| AppError::not_found("Queue not found"))?;

    let (queue_id, queue_status, registration_number, clinic_id, patient_id, doctor_id) = queue;

    if !policies::doctor::assessment(&auth, clinic_id, &queue_status) {
        return Err(AppError::forbidden("Not allowed to assess this queue"));
    }
    for cart in &payload.drug_carts {
        if cart.quantity <= 0 {
            return Err(AppError::validation("Drug quantity must be greater than 0"));
        }
    }

    let patient = sqlx::query_as::<_, (String, String, String, Option<String>, String, String, chrono::NaiveDate, String, String, Option<String>)>(
        r#"SELECT nik, full_name, address, record_number, gender, pob, dob, phone,
            occupation_name, allergy
        FROM patients WHERE id = $1"#,
    )
    .bind(patient_id)
    .fetch_optional(&db_pool)
    .await?
    .ok_or_else(|| AppError::not_found("Patient not found"))?;

    let doctor = sqlx::query_as::<_, (String, String)>(
        r#"SELECT p.full_name, ds.speciality_title
        FROM doctors d
        JOIN profiles p ON d.profile_id = p.id
        JOIN doctor_specialists ds ON d.speciality_id = ds.id
        WHERE d.id = $1"#,
    )
    .bind(doctor_id)
    .fetch_optional(&db_pool)
    .await?
    .ok_or_else(|| AppError::not_found("Doctor not found"))?;

    let clinic = sqlx::query_as::<_, (String, String)>(
        "SELECT clinic_name, clinic_phone FROM clinics WHERE id = $1",
    )
    .bind(clinic_id)
    .fetch_optional(&db_pool)
    .await?
    .ok_or_else(|| AppError::not_found("Clinic not found"))?;

    let mut tx = db_pool.begin().await?;

    // Resolve carts first so the stock gate rejects the whole assessment
    // before anything is written.
    let mut drug_rows = Vec::with_capacity(payload.drug_carts.len());
    let mut total: i32 = 0;

    for cart in &payload.drug_carts {
        let drug = sqlx::query_as::<_, (i64, String, i32, String, i32)>(
            r#"SELECT id, drug, selling_price, unit_name, total_stock
            FROM drugs
            WHERE id = $1 AND clinic_id = $2"#,
        )
        .bind(cart.drug_id)
        .bind(clinic_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::not_found("Drug not found"))?;

        if cart.quantity > drug.4 {
            return Err(AppError::insufficient_stock(drug.1));
        }

        total += cart.total_price;
        drug_rows.push(drug);
    }

    let mut action_rows = Vec::with_capacity(payload.actions.len());
    for action_id in &payload.actions {
        let action = sqlx::query_as::<_, (i64, String, i32)>(
            r#"SELECT id, action_name, action_price
            FROM actions
            WHERE id = $1 AND clinic_id = $2"#,
        )
        .bind(action_id)
        .bind(clinic_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::not_found("Action not found"))?;

        total += action.2;
        action_rows.push(action);
    }

    let doctor_name = format!("{}, {}", doctor.0, doctor.1);

    let record_id = sqlx::query_scalar::<_, i64>(
        r#"INSERT INTO records
            (weight, height, temperature, blood_pressure, pulse,
             subjective, assessment, objective, plan,
             nik, full_name, address, record_number, gender, pob, dob, phone,
             occupation_name, allergy, doctor_name, clinic_name, clinic_phone,
             patient_id, doctor_id, clinic_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9,
                $10, $11, $12, $13, $14, $15, $16, $17,
                $18, $19, $20, $21, $22, $23, $24, $25)
        RETURNING id"#,
    )
    .bind(payload.weight)
    .bind(payload.height)
    .bind(payload.temperature)
    .bind(payload.blood_pressure)
    .bind(payload.pulse)
    .bind(&payload.subjective)
    .bind(&payload.assessment)
    .bind(&payload.objective)
    .bind(&payload.plan)
    .bind(&patient.0)
    .bind(&patient.1)
    .bind(&patient.2)
    .bind(patient.3.as_deref().unwrap_or_default())
    .bind(&patient.4)
    .bind(&patient.5)
    .bind(patient.6)
    .bind(&patient.7)
    .bind(&patient.8)
    .bind(&patient.9)
    .bind(&doctor_name)
    .bind(&clinic.0)
    .bind(&clinic.1)
    .bind(patient_id)
    .bind(doctor_id)
    .bind(clinic_id)
    .fetch_one(&mut *tx)
    .await?;

    let (selling_id, created_at) = sqlx::query_as::<_, (i64, chrono::DateTime<chrono::Utc>)>(
        r#"INSERT INTO selling_transactions
            (registration_number, sub_total_price, total_price, patient_id, queue_id, record_id, clinic_id)
        VALUES ($1, $2, $2, $3, $4, $5, $6)
        RETURNING id, created_at"#,
    )
    .bind(&registration_number)
    .bind(total)
    .bind(patient_id)
    .bind(queue_id)
    .bind(record_id)
    .bind(clinic_id)
    .fetch_one(&mut *tx)
    .await?;

    let invoice_number = helpers::invoice_number(created_at.date_naive(), selling_id);
    sqlx::query("UPDATE selling_transactions SET invoice_number = $1 WHERE id = $2")
        .bind(&invoice_number)
        .bind(selling_id)
        .execute(&mut *tx)
        .await?;

    for (cart, drug) in payload.drug_carts.iter().zip(&drug_rows) {
        sqlx::query(
            r#"INSERT INTO selling_shopping_carts
                (drug_name, unit_name, selling_price, quantity, total_price, instruction,
                 drug_id, selling_transaction_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"#,
        )
        .bind(&drug.1)
        .bind(&drug.3)
        .bind(drug.2)
        .bind(cart.quantity)
        .bind(cart.total_price)
        .bind(&cart.instruction)
        .bind(drug.0)
        .bind(selling_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"INSERT INTO record_drug_assessments (drug_name, unit_name, instruction, drug_id, record_id)
            VALUES ($1, $2, $3, $4, $5)"#,
        )
        .bind(&drug.1)
        .bind(&drug.3)
        .bind(&cart.instruction)
        .bind(drug.0)
        .bind(record_id)
        .execute(&mut *tx)
        .await?;
    }

    for action in &action_rows {
        sqlx::query(
            r#"INSERT INTO action_carts (action_name, action_price, action_id, selling_transaction_id)
            VALUES ($1, $2, $3, $4)"#,
        )
        .bind(&action.1)
        .bind(action.2)
        .bind(action.0)
        .bind(selling_id)
        .execute(&mut *tx)
        .await?;
    }

    sqlx::query("UPDATE queues SET status = 'payment', updated_at = now() WHERE id = $1")
        .bind(queue_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok((
        StatusCode::CREATED,
        Json(AssessmentCreatedResponse {
            record_id,
            selling_transaction_id: selling_id,
            invoice_number,
            total_price: total,
        }),
    ))
}
