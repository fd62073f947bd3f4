use crate::{AppState, handlers::admin};
use axum::{
    Router,
    routing::{get, patch, post, put},
};

/// Admin Router
///
/// Store management, nested under `/admin`. Open to admins and super-admins; the role
/// check lives in each handler (`AuthUser::require_staff`).
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /admin/dashboard
        // Product and order counters plus the latest orders.
        .route("/dashboard", get(admin::get_admin_dashboard))
        // --- Products ---
        .route(
            "/products",
            get(admin::list_products).post(admin::create_product),
        )
        // POST /admin/products/image-upload
        // Static segment; matchit ranks it above the `{id}` capture.
        .route("/products/image-upload", post(admin::request_image_upload))
        .route(
            "/products/{id}",
            get(admin::get_product)
                .put(admin::update_product)
                .delete(admin::delete_product),
        )
        .route("/products/{id}/active", patch(admin::set_product_active))
        // POST /admin/products/{id}/stock
        // Relative adjustment: {"delta": -3} or {"delta": 20}.
        .route("/products/{id}/stock", post(admin::adjust_stock))
        // --- Orders ---
        // GET /admin/orders?status=pending&user_id=...
        .route("/orders", get(admin::list_orders))
        .route("/orders/{id}/status", patch(admin::update_order_status))
        // --- Users ---
        .route("/users", get(admin::list_users))
        .route("/users/lookup", get(admin::lookup_user))
        .route("/users/{id}/limits", put(admin::update_user_limits))
}
