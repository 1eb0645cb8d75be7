use axum::{Router, routing::{get, post}, middleware};
use crate::state::AppState;
use crate::handlers::doctor::{
    get_doctors, get_doctor_detail, update_doctor, delete_doctor, add_assessment,
};
use crate::middleware::auth::require_auth;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/doctors", get(get_doctors))
        .route("/doctors/{id}", get(get_doctor_detail).put(update_doctor).delete(delete_doctor))
        .route("/doctors/queues/{id}/assessment", post(add_assessment))
        .layer(middleware::from_fn(require_auth))
}
