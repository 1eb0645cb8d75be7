use axum::{Router, routing::get, middleware};
use crate::state::AppState;
use crate::handlers::drug::{
    get_drug_categories, get_drug_category_detail, add_drug_category,
    update_drug_category, delete_drug_category,
    get_drugs, get_drug_detail, add_drug, update_drug, delete_drug,
    get_drugs_by_factory, get_drugs_assessment, get_units,
};
use crate::middleware::auth::require_auth;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/drugs/categories", get(get_drug_categories).post(add_drug_category))
        .route(
            "/drugs/categories/{id}",
            get(get_drug_category_detail).put(update_drug_category).delete(delete_drug_category),
        )
        .route("/drugs/assessment", get(get_drugs_assessment))
        .route("/drugs/units", get(get_units))
        .route("/drugs/factory/{id}", get(get_drugs_by_factory))
        .route("/drugs", get(get_drugs).post(add_drug))
        .route("/drugs/{id}", get(get_drug_detail).put(update_drug).delete(delete_drug))
        .layer(middleware::from_fn(require_auth))
}
