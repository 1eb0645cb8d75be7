use axum::{Router, routing::{get, post}, middleware};
use crate::state::AppState;
use crate::handlers::patient::{get_patients, add_patient, add_patient_queue};
use crate::middleware::auth::require_auth;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/patients", get(get_patients).post(add_patient))
        .route("/patients/{id}/queue", post(add_patient_queue))
        .layer(middleware::from_fn(require_auth))
}
