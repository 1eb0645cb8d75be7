use axum::{extract::{Path, Query, State}, Json, Extension};
use axum::http::StatusCode;
use chrono::NaiveDate;
use serde::Deserialize;
use crate::state::AppState;
use crate::error::AppError;
use crate::dtos::transaction::{
    PurchaseListItem, PurchaseDetailResponse, PurchaseCartItem, AddPurchaseRequest,
    PurchaseCreatedResponse, SellingDetailResponse, SellingPatient, SellingCartItem,
    SellingActionItem, PaymentResponse, PickUpResponse,
};
use crate::middleware::auth::AuthContext;
use crate::models::drug_stock;
use crate::policies;
use crate::helpers;

#[derive(Deserialize)]
pub struct PurchaseListParams {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub search_term: Option<String>,
}

// ==================== Purchases ====================

// GET /transactions/purchases
pub async fn get_purchase_transactions(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(params): Query<PurchaseListParams>,
) -> Result<Json<Vec<PurchaseListItem>>, AppError> {
    if !policies::transaction::view(&auth) {
        return Err(AppError::forbidden("Not allowed to view purchases"));
    }

    let page = params.page.unwrap_or(1);
    let per_page = params.per_page.unwrap_or(20);
    let search = format!("%{}%", params.search_term.unwrap_or_default());

    let rows = sqlx::query_as::<_, (i64, Option<String>, i32, String, String)>(
        r#"SELECT pt.id, pt.invoice_number, pt.total_price, df.factory_name,
            TO_CHAR(pt.created_at, 'DD-MM-YYYY')
        FROM purchase_transactions pt
        JOIN drug_factories df ON pt.drug_factory_id = df.id
        WHERE pt.clinic_id = $1 AND (pt.invoice_number ILIKE $2 OR df.factory_name ILIKE $2)
        ORDER BY pt.created_at DESC
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
            .map(|(id, invoice_number, total_price, factory_name, created_at)| PurchaseListItem {
                id,
                invoice_number,
                total_price,
                factory_name,
                created_at,
            })
            .collect(),
    ))
}

// GET /transactions/purchases/{id}
pub async fn get_purchase_transaction_detail(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> Result<Json<PurchaseDetailResponse>, AppError> {
    let header = sqlx::query_as::<_, (i64, Option<String>, i32, String, String, i64)>(
        r#"SELECT id, invoice_number, total_price, factory_name,
            TO_CHAR(created_at, 'DD-MM-YYYY, HH24:MI'), clinic_id
        FROM purchase_transactions
        WHERE id = $1"#,
    )
    .bind(id)
    .fetch_optional(&db_pool)
    .await?
    .ok_or_else(|| AppError::not_found("Purchase not found"))?;

    if !policies::transaction::view_detail_purchase(&auth, header.5) {
        return Err(AppError::forbidden("Not allowed to view this purchase"));
    }

    let carts = sqlx::query_as::<_, (i64, String, NaiveDate, i32, i32, i32)>(
        r#"SELECT id, drug_name, expired, quantity, purchase_price, total_price
        FROM purchase_shopping_carts
        WHERE purchase_transaction_id = $1
        ORDER BY id"#,
    )
    .bind(id)
    .fetch_all(&db_pool)
    .await?;

    Ok(Json(PurchaseDetailResponse {
        id: header.0,
        invoice_number: header.1,
        total_price: header.2,
        factory_name: header.3,
        created_at: header.4,
        shopping_carts: carts
            .into_iter()
            .map(|(id, drug_name, expired, quantity, purchase_price, total_price)| PurchaseCartItem {
                id,
                drug_name,
                expired,
                quantity,
                purchase_price,
                total_price,
            })
            .collect(),
    }))
}

// POST /transactions/purchases
//
// One purchase line = one stock lot. Each line snapshots the drug's name and
// purchase price, then hands the lot receipt to the stock ledger, which also
// raises the drug's aggregate stock. Everything commits as one transaction.
pub async fn add_purchase_transaction(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<AddPurchaseRequest>,
) -> Result<(StatusCode, Json<PurchaseCreatedResponse>), AppError> {
    if !policies::transaction::view(&auth) {
        return Err(AppError::forbidden("Not allowed to record purchases"));
    }
    if payload.purchase_items.is_empty() {
        return Err(AppError::validation("Purchase must contain at least one item"));
    }
    for item in &payload.purchase_items {
        if item.quantity <= 0 {
            return Err(AppError::validation("Quantity must be greater than 0"));
        }
    }

    let factory = sqlx::query_as::<_, (i64, String, String, String)>(
        "SELECT id, factory_name, factory_email, factory_phone FROM drug_factories WHERE id = $1",
    )
    .bind(payload.factory_id)
    .fetch_optional(&db_pool)
    .await?
    .ok_or_else(|| AppError::not_found("Factory not found"))?;

    let mut tx = db_pool.begin().await?;

    let (purchase_id, created_at) = sqlx::query_as::<_, (i64, chrono::DateTime<chrono::Utc>)>(
        r#"INSERT INTO purchase_transactions
            (total_price, factory_name, factory_email, factory_phone, drug_factory_id, clinic_id)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, created_at"#,
    )
    .bind(payload.total_price)
    .bind(&factory.1)
    .bind(&factory.2)
    .bind(&factory.3)
    .bind(factory.0)
    .bind(auth.clinic_id)
    .fetch_one(&mut *tx)
    .await?;

    let invoice_number = helpers::invoice_number(created_at.date_naive(), purchase_id);
    sqlx::query("UPDATE purchase_transactions SET invoice_number = $1 WHERE id = $2")
        .bind(&invoice_number)
        .bind(purchase_id)
        .execute(&mut *tx)
        .await?;

    let mut batch_numbers = Vec::with_capacity(payload.purchase_items.len());

    for item in &payload.purchase_items {
        let drug = sqlx::query_as::<_, (i64, String, i32)>(
            "SELECT id, drug, purchase_price FROM drugs WHERE id = $1 AND clinic_id = $2",
        )
        .bind(item.drug_id)
        .bind(auth.clinic_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::not_found("Drug not found"))?;

        let cart_id = sqlx::query_scalar::<_, i64>(
            r#"INSERT INTO purchase_shopping_carts
                (drug_name, purchase_price, quantity, total_price, expired, purchase_transaction_id, drug_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id"#,
        )
        .bind(&drug.1)
        .bind(drug.2)
        .bind(item.quantity)
        .bind(item.total_price)
        .bind(item.expired)
        .bind(purchase_id)
        .bind(drug.0)
        .fetch_one(&mut *tx)
        .await?;

        let lot = drug_stock::receive_lot(&mut tx, drug.0, item.quantity, item.expired, cart_id).await?;
        if let Some(batch_number) = lot.batch_number {
            batch_numbers.push(batch_number);
        }
    }

    tx.commit().await?;

    Ok((
        StatusCode::CREATED,
        Json(PurchaseCreatedResponse {
            id: purchase_id,
            invoice_number,
            total_price: payload.total_price,
            batch_numbers,
        }),
    ))
}

// ==================== Selling ====================

// GET /transactions/selling/{id}
pub async fn get_selling_transaction_detail(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> Result<Json<SellingDetailResponse>, AppError> {
    let header = sqlx::query_as::<_, (i64, String, Option<String>, i32, i32, bool, bool, i64, Option<String>, String, String)>(
        r#"SELECT st.id, st.registration_number, st.invoice_number, st.sub_total_price,
            st.total_price, st.status, st.pick_up_status, st.clinic_id,
            p.record_number, p.full_name,
            p.pob || ', ' || TO_CHAR(p.dob, 'DD Month YYYY')
        FROM selling_transactions st
        JOIN patients p ON st.patient_id = p.id
        WHERE st.id = $1"#,
    )
    .bind(id)
    .fetch_optional(&db_pool)
    .await?
    .ok_or_else(|| AppError::not_found("Selling transaction not found"))?;

    if !policies::transaction::view_selling(&auth, header.7) {
        return Err(AppError::forbidden("Not allowed to view this transaction"));
    }

    let carts = sqlx::query_as::<_, (i64, String, String, i32, i32, i32, String)>(
        r#"SELECT id, drug_name, unit_name, selling_price, quantity, total_price, instruction
        FROM selling_shopping_carts
        WHERE selling_transaction_id = $1
        ORDER BY id"#,
    )
    .bind(id)
    .fetch_all(&db_pool)
    .await?;

    let actions = sqlx::query_as::<_, (i64, String, i32)>(
        r#"SELECT id, action_name, action_price
        FROM action_carts
        WHERE selling_transaction_id = $1
        ORDER BY id"#,
    )
    .bind(id)
    .fetch_all(&db_pool)
    .await?;

    Ok(Json(SellingDetailResponse {
        id: header.0,
        registration_number: header.1,
        invoice_number: header.2,
        sub_total_price: header.3,
        total_price: header.4,
        status: header.5,
        pick_up_status: header.6,
        patient: SellingPatient { record_number: header.8, full_name: header.9, birth: header.10 },
        shopping_carts: carts
            .into_iter()
            .map(|(id, drug_name, unit_name, selling_price, quantity, total_price, instruction)| {
                SellingCartItem { id, drug_name, unit_name, selling_price, quantity, total_price, instruction }
            })
            .collect(),
        action_carts: actions
            .into_iter()
            .map(|(id, action_name, action_price)| SellingActionItem { id, action_name, action_price })
            .collect(),
    }))
}

// DELETE /transactions/selling/carts/{id} — remove a cart line before payment
pub async fn delete_selling_shopping_cart(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let cart = sqlx::query_as::<_, (i64, i32, i64)>(
        "SELECT id, total_price, selling_transaction_id FROM selling_shopping_carts WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&db_pool)
    .await?
    .ok_or_else(|| AppError::not_found("Cart item not found"))?;

    let transaction = sqlx::query_as::<_, (i64, bool)>(
        "SELECT clinic_id, status FROM selling_transactions WHERE id = $1",
    )
    .bind(cart.2)
    .fetch_optional(&db_pool)
    .await?
    .ok_or_else(|| AppError::not_found("Selling transaction not found"))?;

    if !policies::transaction::handle_cart(&auth, transaction.0, transaction.1) {
        return Err(AppError::forbidden("Not allowed to edit this cart"));
    }

    let mut tx = db_pool.begin().await?;

    sqlx::query(
        r#"UPDATE selling_transactions
        SET sub_total_price = sub_total_price - $1,
            total_price = total_price - $1,
            updated_at = now()
        WHERE id = $2"#,
    )
    .bind(cart.1)
    .bind(cart.2)
    .execute(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM selling_shopping_carts WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

// POST /transactions/selling/{id}/payment
//
// The cashier settles the bill. Every cart line is gated against the drug's
// aggregate stock first — the only oversell check — and only then does the
// stock ledger deplete lots, all inside one transaction so a failure on any
// line rolls the whole payment back.
pub async fn pay_selling_transaction(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> Result<Json<PaymentResponse>, AppError> {
    let transaction = sqlx::query_as::<_, (i64, bool, Option<String>, i32, i64)>(
        "SELECT clinic_id, status, invoice_number, total_price, queue_id FROM selling_transactions WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&db_pool)
    .await?
    .ok_or_else(|| AppError::not_found("Selling transaction not found"))?;

    let (clinic_id, paid, invoice_number, total_price, queue_id) = transaction;

    if !policies::transaction::handle_cart(&auth, clinic_id, paid) {
        return Err(AppError::forbidden("Not allowed to settle this transaction"));
    }

    let cashier_open = sqlx::query_scalar::<_, bool>("SELECT cashier_status FROM clinics WHERE id = $1")
        .bind(clinic_id)
        .fetch_optional(&db_pool)
        .await?
        .ok_or_else(|| AppError::not_found("Clinic not found"))?;
    if !cashier_open {
        return Err(AppError::bad_request("Cashier has not been opened yet"));
    }

    let mut tx = db_pool.begin().await?;

    let carts = sqlx::query_as::<_, (i64, i32)>(
        "SELECT drug_id, quantity FROM selling_shopping_carts WHERE selling_transaction_id = $1",
    )
    .bind(id)
    .fetch_all(&mut *tx)
    .await?;

    // Aggregate gate before any lot is touched.
    for (drug_id, quantity) in &carts {
        let drug = sqlx::query_as::<_, (String, i32)>(
            "SELECT drug, total_stock FROM drugs WHERE id = $1 FOR UPDATE",
        )
        .bind(drug_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::not_found("Drug not found"))?;

        if *quantity > drug.1 {
            return Err(AppError::insufficient_stock(drug.0));
        }
    }

    for (drug_id, quantity) in &carts {
        drug_stock::reduce_stock_on_selling(&mut tx, *drug_id, *quantity).await?;
    }

    sqlx::query("UPDATE selling_transactions SET status = TRUE, updated_at = now() WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("UPDATE queues SET status = 'drug-pick-up', updated_at = now() WHERE id = $1")
        .bind(queue_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(Json(PaymentResponse { id, invoice_number, total_price, status: true }))
}

// POST /transactions/selling/{id}/pick-up — patient collects the drugs,
// the queue completes and the patient can be queued again
pub async fn pick_up_selling_transaction(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> Result<Json<PickUpResponse>, AppError> {
    let transaction = sqlx::query_as::<_, (i64, bool, bool, i64, i64)>(
        r#"SELECT clinic_id, status, pick_up_status, queue_id, patient_id
        FROM selling_transactions WHERE id = $1"#,
    )
    .bind(id)
    .fetch_optional(&db_pool)
    .await?
    .ok_or_else(|| AppError::not_found("Selling transaction not found"))?;

    let (clinic_id, paid, picked_up, queue_id, patient_id) = transaction;

    if auth.role_id != policies::role::NURSE || auth.clinic_id != clinic_id {
        return Err(AppError::forbidden("Not allowed to hand over this transaction"));
    }
    if !paid {
        return Err(AppError::bad_request("Transaction has not been paid yet"));
    }
    if picked_up {
        return Err(AppError::bad_request("Drugs have already been picked up"));
    }

    let mut tx = db_pool.begin().await?;

    sqlx::query("UPDATE selling_transactions SET pick_up_status = TRUE, updated_at = now() WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("UPDATE queues SET status = 'done', updated_at = now() WHERE id = $1")
        .bind(queue_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("UPDATE patients SET ready = TRUE, updated_at = now() WHERE id = $1")
        .bind(patient_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(Json(PickUpResponse { id, pick_up_status: true }))
}
