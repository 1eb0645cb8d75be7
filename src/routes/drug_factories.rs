use axum::{Router, routing::get, middleware};
use crate::state::AppState;
use crate::handlers::drug_factory::{
    get_factories, get_factory_detail, add_drug_factory, delete_factory,
};
use crate::middleware::auth::require_auth;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/drug-factories", get(get_factories).post(add_drug_factory))
        .route("/drug-factories/{id}", get(get_factory_detail).delete(delete_factory))
        .layer(middleware::from_fn(require_auth))
}
