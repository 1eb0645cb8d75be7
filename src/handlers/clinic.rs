use axum::{extract::State, Json, Extension};
use crate::state::AppState;
use crate::error::AppError;
use crate::dtos::clinic::{
    ClinicDetailResponse, UpdateClinicRequest, DailyReportResponse, ReportSummary,
    SellingBrief, CashierBrief, CashierStatusResponse,
};
use crate::middleware::auth::AuthContext;
use crate::policies;

// GET /clinics/detail
pub async fn get_clinic_detail(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<ClinicDetailResponse>, AppError> {
    if !policies::clinic::handle(&auth) {
        return Err(AppError::forbidden("Only the clinic owner can view clinic settings"));
    }

    let row = sqlx::query_as::<_, (String, String, Option<String>, i32, i32, bool)>(
        r#"SELECT clinic_name, clinic_phone, address, outpatient_fee, selling_fee, cashier_status
        FROM clinics WHERE id = $1"#,
    )
    .bind(auth.clinic_id)
    .fetch_optional(&db_pool)
    .await?
    .ok_or_else(|| AppError::not_found("Clinic not found"))?;

    Ok(Json(ClinicDetailResponse {
        clinic_name: row.0,
        clinic_phone: row.1,
        address: row.2,
        outpatient_fee: row.3,
        selling_fee: row.4,
        cashier_status: row.5,
    }))
}

// PUT /clinics
pub async fn update_clinic(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<UpdateClinicRequest>,
) -> Result<Json<ClinicDetailResponse>, AppError> {
    if !policies::clinic::handle(&auth) {
        return Err(AppError::forbidden("Only the clinic owner can update clinic settings"));
    }
    if payload.clinic_name.trim().is_empty() {
        return Err(AppError::validation("Clinic name required"));
    }
    if payload.outpatient_fee < 0 || payload.selling_fee < 0 {
        return Err(AppError::validation("Fees cannot be negative"));
    }

    let row = sqlx::query_as::<_, (String, String, Option<String>, i32, i32, bool)>(
        r#"UPDATE clinics
        SET clinic_name = $1, clinic_phone = $2, address = $3,
            outpatient_fee = $4, selling_fee = $5, updated_at = now()
        WHERE id = $6
        RETURNING clinic_name, clinic_phone, address, outpatient_fee, selling_fee, cashier_status"#,
    )
    .bind(&payload.clinic_name)
    .bind(&payload.clinic_phone)
    .bind(&payload.address)
    .bind(payload.outpatient_fee)
    .bind(payload.selling_fee)
    .bind(auth.clinic_id)
    .fetch_optional(&db_pool)
    .await?
    .ok_or_else(|| AppError::not_found("Clinic not found"))?;

    Ok(Json(ClinicDetailResponse {
        clinic_name: row.0,
        clinic_phone: row.1,
        address: row.2,
        outpatient_fee: row.3,
        selling_fee: row.4,
        cashier_status: row.5,
    }))
}

// GET /clinics/daily-report — today's settled sales, patient counts and
// recent cashier sessions for the dashboard
pub async fn get_daily_report(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<DailyReportResponse>, AppError> {
    let sales = sqlx::query_as::<_, (i64, i64)>(
        r#"SELECT COUNT(id), COALESCE(SUM(total_price), 0)::BIGINT
        FROM selling_transactions
        WHERE clinic_id = $1 AND created_at::date = CURRENT_DATE AND status AND pick_up_status"#,
    )
    .bind(auth.clinic_id)
    .fetch_one(&db_pool)
    .await?;

    let patients = sqlx::query_as::<_, (i64, i64)>(
        r#"SELECT COUNT(id), COUNT(id) FILTER (WHERE status != 'done')
        FROM queues
        WHERE clinic_id = $1 AND created_at::date = CURRENT_DATE"#,
    )
    .bind(auth.clinic_id)
    .fetch_one(&db_pool)
    .await?;

    let selling = sqlx::query_as::<_, (Option<String>, i32)>(
        r#"SELECT invoice_number, total_price
        FROM selling_transactions
        WHERE clinic_id = $1 AND status AND pick_up_status
        ORDER BY created_at DESC
        LIMIT 10"#,
    )
    .bind(auth.clinic_id)
    .fetch_all(&db_pool)
    .await?;

    let cashier = sqlx::query_as::<_, (String, String, String)>(
        r#"SELECT
            TO_CHAR(open_cashier_at, 'DD-MM-YYYY'),
            TO_CHAR(open_cashier_at, 'HH24:MI'),
            TO_CHAR(close_cashier_at, 'HH24:MI')
        FROM cashier_histories
        WHERE clinic_id = $1
        ORDER BY open_cashier_at DESC
        LIMIT 10"#,
    )
    .bind(auth.clinic_id)
    .fetch_all(&db_pool)
    .await?;

    Ok(Json(DailyReportResponse {
        report: ReportSummary {
            total_transaction: sales.0,
            total_transaction_price: sales.1,
            total_patient: patients.0,
            rest_patient: patients.1,
        },
        selling: selling
            .into_iter()
            .map(|(invoice_number, total_price)| SellingBrief { invoice_number, total_price })
            .collect(),
        cashier: cashier
            .into_iter()
            .map(|(date, open, close)| CashierBrief { date, open, close })
            .collect(),
    }))
}

// POST /clinics/cashier/open
pub async fn open_cashier(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<CashierStatusResponse>, AppError> {
    if !policies::clinic::handle(&auth) {
        return Err(AppError::forbidden("Only the clinic owner can open the cashier"));
    }

    let open = sqlx::query_scalar::<_, bool>("SELECT cashier_status FROM clinics WHERE id = $1")
        .bind(auth.clinic_id)
        .fetch_optional(&db_pool)
        .await?
        .ok_or_else(|| AppError::not_found("Clinic not found"))?;

    if open {
        return Err(AppError::bad_request("Cashier has not been closed yet"));
    }

    sqlx::query(
        r#"UPDATE clinics
        SET cashier_status = TRUE, open_cashier_at = now(), open_by = $1, updated_at = now()
        WHERE id = $2"#,
    )
    .bind(&auth.full_name)
    .bind(auth.clinic_id)
    .execute(&db_pool)
    .await?;

    Ok(Json(CashierStatusResponse { cashier_status: true, open_by: Some(auth.full_name) }))
}

// POST /clinics/cashier/close — archives the session into cashier_histories
pub async fn close_cashier(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<CashierStatusResponse>, AppError> {
    if !policies::clinic::handle(&auth) {
        return Err(AppError::forbidden("Only the clinic owner can close the cashier"));
    }

    let mut tx = db_pool.begin().await?;

    let clinic = sqlx::query_as::<_, (bool, Option<chrono::DateTime<chrono::Utc>>, Option<String>)>(
        "SELECT cashier_status, open_cashier_at, open_by FROM clinics WHERE id = $1 FOR UPDATE",
    )
    .bind(auth.clinic_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| AppError::not_found("Clinic not found"))?;

    let (open, open_cashier_at, open_by) = clinic;
    if !open {
        return Err(AppError::bad_request("Cashier has not been opened yet"));
    }
    let open_cashier_at =
        open_cashier_at.ok_or_else(|| AppError::internal("Cashier open without timestamp"))?;
    let open_by = open_by.unwrap_or_default();

    sqlx::query(
        r#"INSERT INTO cashier_histories (status, open_by, close_by, open_cashier_at, close_cashier_at, clinic_id)
        VALUES (FALSE, $1, $2, $3, now(), $4)"#,
    )
    .bind(&open_by)
    .bind(&auth.full_name)
    .bind(open_cashier_at)
    .bind(auth.clinic_id)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"UPDATE clinics
        SET cashier_status = FALSE, open_cashier_at = NULL, open_by = NULL, updated_at = now()
        WHERE id = $1"#,
    )
    .bind(auth.clinic_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(Json(CashierStatusResponse { cashier_status: false, open_by: None }))
}
