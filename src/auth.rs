use axum::{
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, HeaderValue, header, request::Parts},
};
use jsonwebtoken::{DecodingKey, Validation, decode, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::{AppConfig, Env},
    error::AppError,
    models::{Profile, Role},
    repository::RepositoryState,
};

/// Claims
///
/// Payload of a Supabase access token. Supabase signs with HS256 and sets `aud` to
/// "authenticated"; only `sub` and `exp` are relied upon.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the `auth.users.id`, also the primary key of `public.profiles`.
    pub sub: Uuid,
    pub exp: usize,
    pub iat: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// AuthUser
///
/// The resolved identity of an authenticated request. The role always comes from
/// `public.profiles`, never from the token, so a role change applies immediately.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

impl From<Profile> for AuthUser {
    fn from(profile: Profile) -> Self {
        Self {
            id: profile.id,
            email: profile.email,
            role: profile.role,
        }
    }
}

impl AuthUser {
    /// Handler-level RBAC. The route guard already redirected mismatched page visits;
    /// this is the check that protects direct API calls.
    pub fn require_any(&self, allowed: &[Role]) -> Result<(), AppError> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            tracing::warn!(user_id = %self.id, role = %self.role, "role check failed");
            Err(AppError::Forbidden)
        }
    }

    pub fn require_staff(&self) -> Result<(), AppError> {
        self.require_any(&[Role::Admin, Role::SuperAdmin])
    }
}

/// AuthUser Extractor
///
/// 1. Local bypass: an `x-user-id` header naming an existing profile (Env::Local only).
/// 2. Token from `Authorization: Bearer …`, falling back to the session cookie.
/// 3. JWT signature and expiry validation.
/// 4. Profile lookup; a valid token without a profile is rejected.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let repo = RepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);

        if config.env == Env::Local {
            let bypass_id = parts
                .headers
                .get("x-user-id")
                .and_then(|value| value.to_str().ok())
                .and_then(|id_str| Uuid::parse_str(id_str).ok());

            if let Some(user_id) = bypass_id {
                if let Some(profile) = repo.get_profile(user_id).await? {
                    return Ok(profile.into());
                }
            }
        }

        let token = session_token(&parts.headers, &config.session_cookie)
            .ok_or(AppError::Unauthorized)?;

        let user_id = verify_token(&token, &config.jwt_secret)?.sub;

        let profile = repo
            .get_profile(user_id)
            .await?
            .ok_or(AppError::Unauthorized)?;

        Ok(profile.into())
    }
}

/// verify_token
///
/// Decodes an HS256 access token. Supabase tokens carry `aud = "authenticated"`, which
/// is not validated here because locally minted tokens omit it.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    let decoding_key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::default();
    validation.validate_exp = true;
    validation.validate_aud = false;

    decode::<Claims>(token, &decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => tracing::debug!("expired session token"),
                kind => tracing::debug!(?kind, "rejected session token"),
            }
            AppError::Unauthorized
        })
}

/// session_token
///
/// Bearer token first (API clients), then the named cookie (browser sessions).
pub fn session_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    if let Some(bearer) = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
    {
        return Some(bearer.trim().to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|line| line.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == cookie_name)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

/// Set-Cookie value carrying a fresh session.
pub fn session_cookie(config: &AppConfig, token: &str, max_age_secs: i64) -> HeaderValue {
    let secure = if config.env == Env::Production { "; Secure" } else { "" };
    let cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}{}",
        config.session_cookie, token, max_age_secs, secure
    );
    HeaderValue::from_str(&cookie).unwrap_or_else(|_| HeaderValue::from_static(""))
}

/// Set-Cookie value that expires the session cookie.
pub fn clear_session_cookie(config: &AppConfig) -> HeaderValue {
    let cookie = format!(
        "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0",
        config.session_cookie
    );
    HeaderValue::from_str(&cookie).unwrap_or_else(|_| HeaderValue::from_static(""))
}
