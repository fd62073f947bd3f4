use crate::{AppState, handlers::user};
use axum::{
    Router,
    routing::{get, post},
};

/// User Router
///
/// Customer area, nested under `/user`. Every handler requires `Role::User`.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(user::get_user_dashboard))
        // GET /user/products?search=&category=
        // Active, in-stock products flagged with `already_ordered`.
        .route("/products", get(user::get_catalog))
        // GET /user/eligibility
        // The same gate `place_order` enforces, for rendering the order buttons.
        .route("/eligibility", get(user::get_eligibility))
        // GET|POST /user/orders
        // History, and placing a one-unit order.
        .route("/orders", get(user::get_my_orders).post(user::place_order))
        // POST /user/orders/{id}/cancel
        // Pending orders only; restocks the product.
        .route("/orders/{id}/cancel", post(user::cancel_order))
}
