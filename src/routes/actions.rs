use axum::{Router, routing::{get, put}, middleware};
use crate::state::AppState;
use crate::handlers::action::{get_actions, add_action, update_action, delete_action};
use crate::middleware::auth::require_auth;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/actions", get(get_actions).post(add_action))
        .route("/actions/{id}", put(update_action).delete(delete_action))
        .layer(middleware::from_fn(require_auth))
}
