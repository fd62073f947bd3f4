use crate::{AppState, handlers::session};
use axum::{Router, routing::get};

/// Authenticated Router
///
/// Routes open to any role, wrapped in the `require_session` layer so an invalid
/// session is rejected with 401 before the handler runs.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /auth/session
        // Current profile and the dashboard the client should show.
        .route("/auth/session", get(session::get_session))
        // GET /dashboard
        // 303 to /user/dashboard, /admin/dashboard or /super-admin/dashboard.
        .route("/dashboard", get(session::dashboard))
}
