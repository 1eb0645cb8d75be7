use axum::{Router, routing::{get, post, delete}, middleware};
use crate::state::AppState;
use crate::handlers::transaction::{
    get_purchase_transactions, get_purchase_transaction_detail, add_purchase_transaction,
    get_selling_transaction_detail, delete_selling_shopping_cart,
    pay_selling_transaction, pick_up_selling_transaction,
};
use crate::middleware::auth::require_auth;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/transactions/purchases",
            get(get_purchase_transactions).post(add_purchase_transaction),
        )
        .route("/transactions/purchases/{id}", get(get_purchase_transaction_detail))
        .route("/transactions/selling/{id}", get(get_selling_transaction_detail))
        .route("/transactions/selling/carts/{id}", delete(delete_selling_shopping_cart))
        .route("/transactions/selling/{id}/payment", post(pay_selling_transaction))
        .route("/transactions/selling/{id}/pick-up", post(pick_up_selling_transaction))
        .layer(middleware::from_fn(require_auth))
}
