use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::error::AppError;

/// AuthSession
///
/// Tokens returned by the hosted auth service after a password sign-in.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    /// Lifetime of `access_token` in seconds.
    pub expires_in: i64,
    pub user_id: Uuid,
}

/// IdentityProvider Contract
///
/// Account lifecycle owned by the hosted auth service. Handlers only see this trait so
/// tests can run without Supabase.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Creates the account and returns its `auth.users.id`.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: Option<&str>,
    ) -> Result<Uuid, AppError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AppError>;

    /// Revokes the refresh tokens behind `access_token`.
    async fn sign_out(&self, access_token: &str) -> Result<(), AppError>;
}

pub type IdentityState = Arc<dyn IdentityProvider>;

/// SupabaseIdentity
///
/// GoTrue REST client (`/auth/v1/...`).
#[derive(Clone)]
pub struct SupabaseIdentity {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
}

#[derive(Deserialize)]
struct SignUpResponse {
    // GoTrue answers with the user object directly, or nested under `user` when
    // email confirmation is disabled and a session is issued.
    id: Option<Uuid>,
    user: Option<GoTrueUser>,
}

#[derive(Deserialize)]
struct GoTrueUser {
    id: Uuid,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    expires_in: i64,
    user: GoTrueUser,
}

impl SupabaseIdentity {
    pub fn new(supabase_url: &str, anon_key: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: format!("{}/auth/v1", supabase_url.trim_end_matches('/')),
            anon_key: anon_key.to_string(),
        }
    }

    fn upstream(e: reqwest::Error) -> AppError {
        tracing::error!("auth provider unreachable: {:?}", e);
        AppError::Identity("auth provider unreachable".to_string())
    }
}

/// Maps a non-success GoTrue status. Only 4xx answers are about the caller's input;
/// anything else is an upstream failure.
fn rejection(status: reqwest::StatusCode, client_error: AppError) -> AppError {
    if status.is_client_error() {
        client_error
    } else {
        tracing::error!(%status, "auth provider failed");
        AppError::Identity(format!("auth provider answered {}", status))
    }
}

#[async_trait]
impl IdentityProvider for SupabaseIdentity {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: Option<&str>,
    ) -> Result<Uuid, AppError> {
        let response = self
            .client
            .post(format!("{}/signup", self.base_url))
            .header("apikey", &self.anon_key)
            .json(&json!({
                "email": email,
                "password": password,
                "data": { "full_name": full_name },
            }))
            .send()
            .await
            .map_err(Self::upstream)?;

        let status = response.status();
        if !status.is_success() {
            // 4xx: duplicate email, weak password, etc.
            tracing::warn!(%status, "sign up rejected by auth provider");
            return Err(rejection(
                status,
                AppError::Validation("sign up rejected".to_string()),
            ));
        }

        let body = response
            .json::<SignUpResponse>()
            .await
            .map_err(Self::upstream)?;

        body.user
            .map(|user| user.id)
            .or(body.id)
            .ok_or_else(|| AppError::Identity("sign up response without user id".to_string()))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AppError> {
        let response = self
            .client
            .post(format!("{}/token?grant_type=password", self.base_url))
            .header("apikey", &self.anon_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(Self::upstream)?;

        let status = response.status();
        if !status.is_success() {
            return Err(rejection(status, AppError::Unauthorized));
        }

        let token = response
            .json::<TokenResponse>()
            .await
            .map_err(Self::upstream)?;

        Ok(AuthSession {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_in: token.expires_in,
            user_id: token.user.id,
        })
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AppError> {
        let response = self
            .client
            .post(format!("{}/logout", self.base_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(Self::upstream)?;

        // An already-invalid token still ends the local session.
        if !response.status().is_success() {
            tracing::debug!(status = %response.status(), "logout not acknowledged upstream");
        }
        Ok(())
    }
}

/// MockIdentityProvider
///
/// In-memory accounts for tests. `sign_in` mints a token with the configured secret so
/// the resulting session passes the `AuthUser` extractor.
pub struct MockIdentityProvider {
    jwt_secret: String,
    accounts: Mutex<Vec<(String, String, Uuid)>>,
    pub should_fail: bool,
}

impl MockIdentityProvider {
    pub fn new(jwt_secret: &str) -> Self {
        Self {
            jwt_secret: jwt_secret.to_string(),
            accounts: Mutex::new(Vec::new()),
            should_fail: false,
        }
    }

    pub fn new_failing(jwt_secret: &str) -> Self {
        Self {
            should_fail: true,
            ..Self::new(jwt_secret)
        }
    }

    /// Registers an existing account (e.g. a seeded profile).
    pub fn with_account(self, email: &str, password: &str, id: Uuid) -> Self {
        self.lock_accounts()
            .push((email.to_string(), password.to_string(), id));
        self
    }

    fn lock_accounts(&self) -> std::sync::MutexGuard<'_, Vec<(String, String, Uuid)>> {
        self.accounts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        _full_name: Option<&str>,
    ) -> Result<Uuid, AppError> {
        if self.should_fail {
            return Err(AppError::Identity("Mock Identity Error".to_string()));
        }
        let mut accounts = self.lock_accounts();
        if accounts.iter().any(|(e, _, _)| e == email) {
            return Err(AppError::Validation("sign up rejected".to_string()));
        }
        let id = Uuid::new_v4();
        accounts.push((email.to_string(), password.to_string(), id));
        Ok(id)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AppError> {
        if self.should_fail {
            return Err(AppError::Identity("Mock Identity Error".to_string()));
        }
        let user_id = self
            .lock_accounts()
            .iter()
            .find(|(e, p, _)| e == email && p == password)
            .map(|(_, _, id)| *id)
            .ok_or(AppError::Unauthorized)?;

        let access_token = mint_token(user_id, &self.jwt_secret, 3600)?;
        Ok(AuthSession {
            access_token,
            refresh_token: format!("refresh-{}", user_id.simple()),
            expires_in: 3600,
            user_id,
        })
    }

    async fn sign_out(&self, _access_token: &str) -> Result<(), AppError> {
        Ok(())
    }
}

/// Signs an HS256 access token shaped like Supabase's.
pub fn mint_token(user_id: Uuid, secret: &str, ttl_secs: u64) -> Result<String, AppError> {
    use jsonwebtoken::{EncodingKey, Header, encode};

    let now = chrono::Utc::now().timestamp().max(0) as u64;
    let claims = crate::auth::Claims {
        sub: user_id,
        iat: now as usize,
        exp: (now + ttl_secs) as usize,
        email: None,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Identity(format!("token signing failed: {}", e)))
}
