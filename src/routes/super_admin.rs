use crate::{AppState, handlers::super_admin};
use axum::{
    Router,
    routing::{get, post, put},
};

/// Super-Admin Router
///
/// Account and system administration, nested under `/super-admin`.
pub fn super_admin_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(super_admin::get_super_admin_dashboard))
        .route("/users", get(super_admin::list_users))
        // PUT /super-admin/users/{id}/role
        // Promote or demote; never the caller's own profile.
        .route("/users/{id}/role", put(super_admin::update_user_role))
        .route("/users/{id}/limits", put(super_admin::update_user_limits))
        .route(
            "/settings",
            get(super_admin::get_settings).put(super_admin::update_settings),
        )
        .route("/settings/reset", post(super_admin::reset_settings))
}
