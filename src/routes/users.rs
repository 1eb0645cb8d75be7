use axum::{Router, routing::{post, get, put}, middleware};
use crate::state::AppState;
use crate::handlers::user::{
    register_admin, register_employee, login, get_profile, get_administrators,
    get_user_detail, update_administrator, delete_administrator,
};
use crate::middleware::auth::require_auth;

pub fn routes() -> Router<AppState> {
    let open = Router::new()
        .route("/auth/register/admin", post(register_admin))
        .route("/auth/login", post(login));

    let protected = Router::new()
        .route("/auth/register/employee", post(register_employee))
        .route("/users/profile", get(get_profile))
        .route("/users/administrators", get(get_administrators))
        .route("/users/administrators/{id}", put(update_administrator).delete(delete_administrator))
        .route("/users/{id}", get(get_user_detail))
        .layer(middleware::from_fn(require_auth));

    open.merge(protected)
}
