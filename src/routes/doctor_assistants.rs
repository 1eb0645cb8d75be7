use axum::{Router, routing::get, middleware};
use crate::state::AppState;
use crate::handlers::doctor_assistant::{
    get_assistants, get_assistant_detail, update_assistant, delete_assistant,
};
use crate::middleware::auth::require_auth;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/doctor-assistants", get(get_assistants))
        .route(
            "/doctor-assistants/{id}",
            get(get_assistant_detail).put(update_assistant).delete(delete_assistant),
        )
        .layer(middleware::from_fn(require_auth))
}
