use crate::{AppState, handlers::session};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router
///
/// Endpoints with no session requirement. Signed-in visitors opening `/` are sent to
/// their dashboard by the route guard before `index` runs.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for the load balancer.
        .route("/health", get(|| async { "ok" }))
        .route("/", get(session::index))
        // POST /auth/signup
        // Supabase account plus a `user` profile. Refused while registrations are closed.
        .route("/auth/signup", post(session::sign_up))
        // POST /auth/signin
        // Sets the session cookie and returns the role's dashboard path.
        .route("/auth/signin", post(session::sign_in))
        // POST /auth/signout
        // Clears the cookie even when the session is already gone.
        .route("/auth/signout", post(session::sign_out))
}
