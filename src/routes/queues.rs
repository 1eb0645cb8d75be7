use axum::{Router, routing::{get, put, delete}, middleware};
use crate::state::AppState;
use crate::handlers::queue::{
    get_consult_wait_queue, get_consulting_queue, get_consulting_queue_detail,
    call_queue, cancel_queue,
};
use crate::middleware::auth::require_auth;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/queues/consult-wait", get(get_consult_wait_queue))
        .route("/queues/consulting", get(get_consulting_queue))
        .route("/queues/consulting/{id}", get(get_consulting_queue_detail))
        .route("/queues/{id}/call", put(call_queue))
        .route("/queues/{id}", delete(cancel_queue))
        .layer(middleware::from_fn(require_auth))
}
