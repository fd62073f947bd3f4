mod common;

use axum::{
    body::Body,
    extract::FromRequestParts,
    http::{HeaderValue, Request, header, request::Parts},
};
use common::test_context;
use jsonwebtoken::{EncodingKey, Header, encode};
use shop_dashboard::{
    AppState,
    auth::{AuthUser, Claims},
    config::Env,
    error::AppError,
    identity::mint_token,
    models::Role,
    repository::Repository,
};
use uuid::Uuid;

// --- Helper Functions ---

fn request_parts() -> Parts {
    let (parts, _) = Request::builder()
        .uri("/")
        .body(Body::empty())
        .unwrap()
        .into_parts();
    parts
}

fn with_bearer(token: &str) -> Parts {
    let mut parts = request_parts();
    parts.headers.insert(
        header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    );
    parts
}

fn production(mut state: AppState) -> AppState {
    state.config.env = Env::Production;
    state
}

// --- Tests ---

#[tokio::test]
async fn test_auth_success_with_valid_jwt() {
    let ctx = test_context();
    let admin = ctx.repo.seed_profile("a@shop.test", Role::Admin, None);
    let state = production(ctx.state.clone());
    let token = mint_token(admin.id, &state.config.jwt_secret, 3600).unwrap();

    let user = AuthUser::from_request_parts(&mut with_bearer(&token), &state)
        .await
        .unwrap();
    assert_eq!(user.id, admin.id);
    assert_eq!(user.role, Role::Admin);
}

#[tokio::test]
async fn test_role_comes_from_profile_not_token() {
    let ctx = test_context();
    let customer = ctx.repo.seed_profile("c@shop.test", Role::User, None);
    let token = mint_token(customer.id, &ctx.state.config.jwt_secret, 3600).unwrap();

    ctx.repo
        .update_role(customer.id, Role::SuperAdmin)
        .await
        .unwrap();

    let user = AuthUser::from_request_parts(&mut with_bearer(&token), &ctx.state)
        .await
        .unwrap();
    assert_eq!(user.role, Role::SuperAdmin);
}

#[tokio::test]
async fn test_auth_failure_with_missing_header() {
    let ctx = test_context();
    let state = production(ctx.state.clone());

    let result = AuthUser::from_request_parts(&mut request_parts(), &state).await;
    assert!(matches!(result, Err(AppError::Unauthorized)));
}

#[tokio::test]
async fn test_auth_failure_with_expired_jwt() {
    let ctx = test_context();
    let customer = ctx.repo.seed_profile("c@shop.test", Role::User, None);

    // Past the default 60s validation leeway.
    let now = chrono::Utc::now().timestamp() as usize;
    let claims = Claims {
        sub: customer.id,
        iat: now - 7200,
        exp: now - 3600,
        email: None,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(ctx.state.config.jwt_secret.as_bytes()),
    )
    .unwrap();

    let result = AuthUser::from_request_parts(&mut with_bearer(&token), &ctx.state).await;
    assert!(matches!(result, Err(AppError::Unauthorized)));
}

#[tokio::test]
async fn test_auth_failure_with_foreign_secret() {
    let ctx = test_context();
    let customer = ctx.repo.seed_profile("c@shop.test", Role::User, None);
    let token = mint_token(customer.id, "some-other-project-secret", 3600).unwrap();

    let result = AuthUser::from_request_parts(&mut with_bearer(&token), &ctx.state).await;
    assert!(matches!(result, Err(AppError::Unauthorized)));
}

#[tokio::test]
async fn test_valid_token_without_profile_is_rejected() {
    let ctx = test_context();
    let token = mint_token(Uuid::new_v4(), &ctx.state.config.jwt_secret, 3600).unwrap();

    let result = AuthUser::from_request_parts(&mut with_bearer(&token), &ctx.state).await;
    assert!(matches!(result, Err(AppError::Unauthorized)));
}

#[tokio::test]
async fn test_session_cookie_is_accepted() {
    let ctx = test_context();
    let customer = ctx.repo.seed_profile("c@shop.test", Role::User, None);
    let token = mint_token(customer.id, &ctx.state.config.jwt_secret, 3600).unwrap();

    let mut parts = request_parts();
    parts.headers.insert(
        header::COOKIE,
        HeaderValue::from_str(&format!("sb-access-token={}", token)).unwrap(),
    );

    let user = AuthUser::from_request_parts(&mut parts, &ctx.state)
        .await
        .unwrap();
    assert_eq!(user.id, customer.id);
}

#[tokio::test]
async fn test_local_bypass_success() {
    let ctx = test_context();
    let admin = ctx.repo.seed_profile("local@dev.test", Role::Admin, None);

    let mut parts = request_parts();
    parts.headers.insert(
        "x-user-id",
        HeaderValue::from_str(&admin.id.to_string()).unwrap(),
    );

    let user = AuthUser::from_request_parts(&mut parts, &ctx.state)
        .await
        .unwrap();
    assert_eq!(user.id, admin.id);
    assert_eq!(user.role, Role::Admin);
}

#[tokio::test]
async fn test_local_bypass_disabled_in_prod() {
    let ctx = test_context();
    let admin = ctx.repo.seed_profile("local@dev.test", Role::Admin, None);
    let state = production(ctx.state.clone());

    let mut parts = request_parts();
    parts.headers.insert(
        "x-user-id",
        HeaderValue::from_str(&admin.id.to_string()).unwrap(),
    );

    let result = AuthUser::from_request_parts(&mut parts, &state).await;
    assert!(matches!(result, Err(AppError::Unauthorized)));
}
