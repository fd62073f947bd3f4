use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Redirect, Response},
};
use serde_json::{Value, json};

use crate::{
    AppState,
    auth::{self, AuthUser},
    error::AppError,
    models::{NewProfile, Profile, Role, SessionResponse, SignInRequest, SignUpRequest},
};

/// Supabase rejects shorter passwords; checking here saves a round trip.
const MIN_PASSWORD_LEN: usize = 6;

/// index
///
/// [Public Route] Landing endpoint for anonymous visitors. Signed-in visitors never
/// reach it: the route guard sends them to their dashboard.
#[utoipa::path(get, path = "/", responses((status = 200, description = "Service info")))]
pub async fn index() -> Json<Value> {
    Json(json!({
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "docs": "/swagger-ui",
    }))
}

/// sign_up
///
/// [Public Route] Creates the account in Supabase Auth, then mirrors it into
/// `public.profiles` with role `user` and the configured default order limit.
#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = SignUpRequest,
    responses(
        (status = 201, description = "Registered", body = Profile),
        (status = 400, description = "Invalid email/password or rejected by the auth provider"),
        (status = 403, description = "Registrations closed")
    )
)]
pub async fn sign_up(
    State(state): State<AppState>,
    Json(payload): Json<SignUpRequest>,
) -> Result<(StatusCode, Json<Profile>), AppError> {
    let email = payload.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::Validation("a valid email is required".into()));
    }
    if payload.password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    let settings = state.repo.get_settings().await?;
    if !settings.allow_registrations {
        return Err(AppError::RegistrationsClosed);
    }

    let user_id = state
        .identity
        .sign_up(&email, &payload.password, payload.full_name.as_deref())
        .await?;

    let profile = state
        .repo
        .create_profile(NewProfile {
            id: user_id,
            email,
            full_name: payload.full_name,
            role: Role::User,
            user_limit: settings.default_user_limit,
        })
        .await?;

    tracing::info!(user_id = %profile.id, "user registered");
    Ok((StatusCode::CREATED, Json(profile)))
}

/// sign_in
///
/// [Public Route] Password sign-in. On success the access token is set as an HttpOnly
/// session cookie and the body names the dashboard for the caller's role.
#[utoipa::path(
    post,
    path = "/auth/signin",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Signed in", body = SessionResponse),
        (status = 401, description = "Bad credentials"),
        (status = 404, description = "Account has no profile")
    )
)]
pub async fn sign_in(
    State(state): State<AppState>,
    Json(payload): Json<SignInRequest>,
) -> Result<Response, AppError> {
    let email = payload.email.trim().to_lowercase();
    let session = state.identity.sign_in(&email, &payload.password).await?;

    let profile = state
        .repo
        .get_profile(session.user_id)
        .await?
        .ok_or(AppError::NotFound("Profile"))?;

    let cookie = auth::session_cookie(&state.config, &session.access_token, session.expires_in);
    let body = SessionResponse {
        redirect_to: profile.role.dashboard_path().to_string(),
        profile,
    };

    Ok(([(header::SET_COOKIE, cookie)], Json(body)).into_response())
}

/// sign_out
///
/// [Public Route] Revokes the session upstream (when there is one) and clears the cookie.
/// Always succeeds so a stale cookie can be dropped.
#[utoipa::path(post, path = "/auth/signout", responses((status = 204, description = "Signed out")))]
pub async fn sign_out(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = auth::session_token(&headers, &state.config.session_cookie) {
        if let Err(e) = state.identity.sign_out(&token).await {
            tracing::warn!("sign out upstream failed: {}", e);
        }
    }

    (
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, auth::clear_session_cookie(&state.config))],
    )
        .into_response()
}

/// get_session
///
/// [Authenticated Route] The caller's profile plus their dashboard path.
#[utoipa::path(
    get,
    path = "/auth/session",
    responses(
        (status = 200, description = "Current session", body = SessionResponse),
        (status = 401, description = "No session")
    )
)]
pub async fn get_session(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<SessionResponse>, AppError> {
    let profile = state
        .repo
        .get_profile(user.id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    Ok(Json(SessionResponse {
        redirect_to: profile.role.dashboard_path().to_string(),
        profile,
    }))
}

/// dashboard
///
/// [Authenticated Route] `/dashboard` forwards to the role's own dashboard.
#[utoipa::path(get, path = "/dashboard", responses((status = 303, description = "Role dashboard")))]
pub async fn dashboard(user: AuthUser) -> Redirect {
    Redirect::to(user.role.dashboard_path())
}
