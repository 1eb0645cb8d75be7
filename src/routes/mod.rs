pub mod users;
pub mod clinics;
pub mod patients;
pub mod queues;
pub mod doctors;
pub mod doctor_assistants;
pub mod drugs;
pub mod drug_factories;
pub mod actions;
pub mod transactions;

use axum::Router;
use crate::state::AppState;

pub fn create_router() -> Router<AppState> {
    Router::new()
        .merge(users::routes())
        .merge(clinics::routes())
        .merge(patients::routes())
        .merge(queues::routes())
        .merge(doctors::routes())
        .merge(doctor_assistants::routes())
        .merge(drugs::routes())
        .merge(drug_factories::routes())
        .merge(actions::routes())
        .merge(transactions::routes())
}
