use axum::{
    Json,
    extract::{Path, Query, State},
};
use uuid::Uuid;

use crate::{
    AppState,
    auth::AuthUser,
    error::AppError,
    handlers::{RECENT_ITEMS, admin::{UserSearch, apply_limits}, validate_settings},
    models::{
        Profile, Role, SuperAdminDashboard, SystemSettings, UpdateLimitsRequest,
        UpdateRoleRequest,
    },
};

/// get_super_admin_dashboard
///
/// [Super-Admin Route] System-wide counters and the five newest accounts.
#[utoipa::path(
    get,
    path = "/super-admin/dashboard",
    responses((status = 200, description = "Super-admin dashboard", body = SuperAdminDashboard))
)]
pub async fn get_super_admin_dashboard(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<SuperAdminDashboard>, AppError> {
    user.require_any(&[Role::SuperAdmin])?;

    Ok(Json(SuperAdminDashboard {
        stats: state.repo.super_admin_stats().await?,
        recent_users: state.repo.recent_profiles(RECENT_ITEMS).await?,
    }))
}

#[utoipa::path(
    get,
    path = "/super-admin/users",
    params(UserSearch),
    responses((status = 200, description = "Profiles", body = [Profile]))
)]
pub async fn list_users(
    user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<UserSearch>,
) -> Result<Json<Vec<Profile>>, AppError> {
    user.require_any(&[Role::SuperAdmin])?;
    Ok(Json(state.repo.list_profiles(query.search).await?))
}

/// update_user_role
///
/// [Super-Admin Route] Promotes or demotes a profile. A super-admin cannot change their
/// own role, so the last super-admin cannot lock everyone out.
#[utoipa::path(
    put,
    path = "/super-admin/users/{id}/role",
    params(("id" = Uuid, Path, description = "Profile ID")),
    request_body = UpdateRoleRequest,
    responses(
        (status = 200, description = "Updated", body = Profile),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Own role")
    )
)]
pub async fn update_user_role(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRoleRequest>,
) -> Result<Json<Profile>, AppError> {
    user.require_any(&[Role::SuperAdmin])?;

    if id == user.id {
        return Err(AppError::Conflict("cannot change your own role".into()));
    }

    let profile = state
        .repo
        .update_role(id, payload.role)
        .await?
        .ok_or(AppError::NotFound("Profile"))?;

    tracing::info!(profile_id = %id, actor_id = %user.id, role = %payload.role, "role updated");
    Ok(Json(profile))
}

#[utoipa::path(
    put,
    path = "/super-admin/users/{id}/limits",
    params(("id" = Uuid, Path, description = "Profile ID")),
    request_body = UpdateLimitsRequest,
    responses(
        (status = 200, description = "Updated", body = Profile),
        (status = 400, description = "Limit out of range"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_user_limits(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateLimitsRequest>,
) -> Result<Json<Profile>, AppError> {
    user.require_any(&[Role::SuperAdmin])?;
    apply_limits(&state, &user, id, payload).await.map(Json)
}

#[utoipa::path(
    get,
    path = "/super-admin/settings",
    responses((status = 200, description = "Settings", body = SystemSettings))
)]
pub async fn get_settings(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<SystemSettings>, AppError> {
    user.require_any(&[Role::SuperAdmin])?;
    Ok(Json(state.repo.get_settings().await?))
}

/// update_settings
///
/// [Super-Admin Route] Replaces the whole settings row.
#[utoipa::path(
    put,
    path = "/super-admin/settings",
    request_body = SystemSettings,
    responses(
        (status = 200, description = "Saved", body = SystemSettings),
        (status = 400, description = "Invalid limits")
    )
)]
pub async fn update_settings(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<SystemSettings>,
) -> Result<Json<SystemSettings>, AppError> {
    user.require_any(&[Role::SuperAdmin])?;
    validate_settings(&payload)?;

    let saved = state.repo.update_settings(payload).await?;
    tracing::info!(actor_id = %user.id, ?saved, "settings updated");
    Ok(Json(saved))
}

#[utoipa::path(
    post,
    path = "/super-admin/settings/reset",
    responses((status = 200, description = "Defaults restored", body = SystemSettings))
)]
pub async fn reset_settings(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<SystemSettings>, AppError> {
    user.require_any(&[Role::SuperAdmin])?;
    Ok(Json(
        state.repo.update_settings(SystemSettings::default()).await?,
    ))
}
