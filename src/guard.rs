//! Role-based route guard.
//!
//! Runs in front of every route. Page areas (`/admin`, `/super-admin`, `/user`,
//! `/dashboard`) redirect visitors who have no session to `/login` and visitors with the
//! wrong role to their own dashboard. Handlers repeat the role check for API clients
//! that do not follow redirects.

use axum::{
    extract::{FromRequestParts, OriginalUri, Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::{AppState, auth::AuthUser, models::Role};

pub const LOGIN_PATH: &str = "/login";

const PROTECTED_PREFIXES: [&str; 4] = ["/admin", "/user", "/super-admin", "/dashboard"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Allow,
    Redirect(String),
}

/// Plain string prefix: `/admin-tools` and `/users` count as guarded areas too.
fn under(path: &str, prefix: &str) -> bool {
    path.starts_with(prefix)
}

pub fn is_protected(path: &str) -> bool {
    PROTECTED_PREFIXES.iter().any(|prefix| under(path, prefix))
}

/// resolve
///
/// Decides whether a visit to `path` proceeds, given the role of the current session
/// (`None` when there is no valid session).
pub fn resolve(path: &str, session: Option<Role>) -> Access {
    let Some(role) = session else {
        return if is_protected(path) {
            Access::Redirect(LOGIN_PATH.to_string())
        } else {
            Access::Allow
        };
    };

    let home = || Access::Redirect(role.dashboard_path().to_string());

    if path == "/" || path == "/dashboard" {
        return home();
    }
    if under(path, "/admin") && !role.is_staff() {
        return home();
    }
    if under(path, "/super-admin") && role != Role::SuperAdmin {
        return home();
    }
    if under(path, "/user") && role != Role::User {
        return home();
    }

    Access::Allow
}

/// route_guard
///
/// Middleware form of [`resolve`]. The session is resolved with the same extractor the
/// handlers use; any extraction failure counts as "no session".
pub async fn route_guard(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let (mut parts, body) = request.into_parts();

    let session = AuthUser::from_request_parts(&mut parts, &state)
        .await
        .ok()
        .map(|user| user.role);

    // Nested routers strip their prefix from `uri`.
    let path = parts
        .extensions
        .get::<OriginalUri>()
        .map(|original| original.path().to_string())
        .unwrap_or_else(|| parts.uri.path().to_string());

    match resolve(&path, session) {
        Access::Allow => next.run(Request::from_parts(parts, body)).await,
        Access::Redirect(to) => {
            tracing::debug!(path = %path, to = %to, "route guard redirect");
            Redirect::to(&to).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn redirect(to: &str) -> Access {
        Access::Redirect(to.to_string())
    }

    #[test]
    fn user_visiting_admin_goes_to_user_dashboard() {
        assert_eq!(resolve("/admin", Some(Role::User)), redirect("/user/dashboard"));
        assert_eq!(
            resolve("/admin/products", Some(Role::User)),
            redirect("/user/dashboard")
        );
    }

    #[test]
    fn admin_visiting_super_admin_goes_to_admin_dashboard() {
        assert_eq!(
            resolve("/super-admin/settings", Some(Role::Admin)),
            redirect("/admin/dashboard")
        );
    }

    #[test]
    fn anonymous_protected_paths_go_to_login() {
        for path in ["/admin", "/user", "/super-admin", "/dashboard", "/user/orders"] {
            assert_eq!(resolve(path, None), redirect("/login"), "path {}", path);
        }
    }

    #[test]
    fn anonymous_public_paths_pass() {
        for path in ["/", "/login", "/health", "/auth/signin", "/api-docs/openapi.json"] {
            assert_eq!(resolve(path, None), Access::Allow, "path {}", path);
        }
    }

    #[test]
    fn root_and_dashboard_redirect_to_role_home() {
        assert_eq!(resolve("/", Some(Role::Admin)), redirect("/admin/dashboard"));
        assert_eq!(
            resolve("/dashboard", Some(Role::SuperAdmin)),
            redirect("/super-admin/dashboard")
        );
        assert_eq!(resolve("/dashboard", Some(Role::User)), redirect("/user/dashboard"));
    }

    #[test]
    fn staff_areas_allow_matching_roles() {
        assert_eq!(resolve("/admin/orders", Some(Role::Admin)), Access::Allow);
        assert_eq!(resolve("/admin/orders", Some(Role::SuperAdmin)), Access::Allow);
        assert_eq!(resolve("/super-admin/users", Some(Role::SuperAdmin)), Access::Allow);
        assert_eq!(resolve("/user/products", Some(Role::User)), Access::Allow);
    }

    #[test]
    fn staff_visiting_user_area_goes_home() {
        assert_eq!(resolve("/user/dashboard", Some(Role::Admin)), redirect("/admin/dashboard"));
    }

    #[test]
    fn prefix_match_is_plain_string_prefix() {
        assert!(is_protected("/admin"));
        assert!(is_protected("/admin/"));
        assert!(is_protected("/administrator"));
        assert!(is_protected("/users"));
        assert!(is_protected("/dashboards"));
        assert!(!is_protected("/login"));
    }

    #[test]
    fn lookalike_paths_are_guarded() {
        assert_eq!(
            resolve("/administrator", Some(Role::User)),
            redirect("/user/dashboard")
        );
        assert_eq!(
            resolve("/admin-tools", Some(Role::User)),
            redirect("/user/dashboard")
        );
        assert_eq!(resolve("/users", None), redirect("/login"));
        assert_eq!(resolve("/dashboards", None), redirect("/login"));
    }
}
