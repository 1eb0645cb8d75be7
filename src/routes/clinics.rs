use axum::{Router, routing::{get, put, post}, middleware};
use crate::state::AppState;
use crate::handlers::clinic::{
    get_clinic_detail, update_clinic, get_daily_report, open_cashier, close_cashier,
};
use crate::middleware::auth::require_auth;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/clinics/detail", get(get_clinic_detail))
        .route("/clinics", put(update_clinic))
        .route("/clinics/daily-report", get(get_daily_report))
        .route("/clinics/cashier/open", post(open_cashier))
        .route("/clinics/cashier/close", post(close_cashier))
        .layer(middleware::from_fn(require_auth))
}
