use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    AppState,
    auth::AuthUser,
    error::AppError,
    handlers::{RECENT_ITEMS, resolve_limits, validate_new_product, validate_product_update},
    models::{
        AdminDashboard, CreateProductRequest, ImageUploadRequest, ImageUploadResponse, Order,
        OrderDetails, OrderStatus, Product, Profile, SetActiveRequest, StockAdjustRequest,
        UpdateLimitsRequest, UpdateOrderStatusRequest, UpdateProductRequest,
    },
    repository::{OrderFilter, ProductFilter},
    storage,
};

// --- Query Structs ---

/// OrderQuery
///
/// `status=all` (or no status) lists every order.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OrderQuery {
    pub status: Option<String>,
    pub user_id: Option<Uuid>,
}

impl OrderQuery {
    fn into_filter(self) -> Result<OrderFilter, AppError> {
        let status = match self.status.as_deref() {
            None | Some("") | Some("all") => None,
            Some(raw) => Some(
                raw.parse::<OrderStatus>()
                    .map_err(|e| AppError::Validation(e.to_string()))?,
            ),
        };
        Ok(OrderFilter {
            status,
            user_id: self.user_id,
        })
    }
}

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserSearch {
    /// Matches email or role.
    pub search: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EmailLookup {
    pub email: String,
}

// --- Dashboard ---

/// get_admin_dashboard
///
/// [Admin Route] Store counters and the five latest orders.
#[utoipa::path(
    get,
    path = "/admin/dashboard",
    responses((status = 200, description = "Admin dashboard", body = AdminDashboard))
)]
pub async fn get_admin_dashboard(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<AdminDashboard>, AppError> {
    user.require_staff()?;

    Ok(Json(AdminDashboard {
        stats: state.repo.admin_stats().await?,
        recent_orders: state.repo.recent_orders(RECENT_ITEMS).await?,
    }))
}

// --- Products ---

/// list_products
///
/// [Admin Route] Every product, active or not, with optional filters.
#[utoipa::path(
    get,
    path = "/admin/products",
    params(ProductFilter),
    responses((status = 200, description = "Products", body = [Product]))
)]
pub async fn list_products(
    user: AuthUser,
    State(state): State<AppState>,
    Query(filter): Query<ProductFilter>,
) -> Result<Json<Vec<Product>>, AppError> {
    user.require_staff()?;
    Ok(Json(state.repo.list_products(filter).await?))
}

#[utoipa::path(
    get,
    path = "/admin/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Found", body = Product),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_product(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Product>, AppError> {
    user.require_staff()?;
    state
        .repo
        .get_product(id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("Product"))
}

/// create_product
///
/// [Admin Route] Adds a product; the caller is recorded as `admin_id`.
#[utoipa::path(
    post,
    path = "/admin/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Created", body = Product),
        (status = 400, description = "Missing name, negative price or stock")
    )
)]
pub async fn create_product(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<Product>), AppError> {
    user.require_staff()?;
    validate_new_product(&payload)?;

    let product = state.repo.create_product(payload, user.id).await?;
    tracing::info!(product_id = %product.id, admin_id = %user.id, "product created");
    Ok((StatusCode::CREATED, Json(product)))
}

/// update_product
///
/// [Admin Route] Partial update; omitted fields keep their value and `null` clears the
/// nullable ones.
#[utoipa::path(
    put,
    path = "/admin/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Updated", body = Product),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_product(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductRequest>,
) -> Result<Json<Product>, AppError> {
    user.require_staff()?;
    validate_product_update(&payload)?;

    state
        .repo
        .update_product(id, payload)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("Product"))
}

/// delete_product
///
/// [Admin Route] Hard delete. Products with orders cannot be deleted (409); deactivate
/// them instead.
#[utoipa::path(
    delete,
    path = "/admin/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Product has orders")
    )
)]
pub async fn delete_product(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    user.require_staff()?;

    if state.repo.delete_product(id).await? {
        tracing::info!(product_id = %id, admin_id = %user.id, "product deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("Product"))
    }
}

#[utoipa::path(
    patch,
    path = "/admin/products/{id}/active",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = SetActiveRequest,
    responses(
        (status = 200, description = "Updated", body = Product),
        (status = 404, description = "Not Found")
    )
)]
pub async fn set_product_active(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetActiveRequest>,
) -> Result<Json<Product>, AppError> {
    user.require_staff()?;
    state
        .repo
        .set_product_active(id, payload.is_active)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("Product"))
}

/// adjust_stock
///
/// [Admin Route] Relative stock change. The result may not drop below zero.
#[utoipa::path(
    post,
    path = "/admin/products/{id}/stock",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = StockAdjustRequest,
    responses(
        (status = 200, description = "Adjusted", body = Product),
        (status = 400, description = "Zero delta or stock would leave 0..=i32::MAX"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn adjust_stock(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<StockAdjustRequest>,
) -> Result<Json<Product>, AppError> {
    user.require_staff()?;
    if payload.delta == 0 {
        return Err(AppError::Validation("delta must not be zero".into()));
    }
    Ok(Json(state.repo.adjust_stock(id, payload.delta).await?))
}

/// request_image_upload
///
/// [Admin Route] Presigned PUT URL for a product image plus the public URL to save on
/// the product afterwards.
#[utoipa::path(
    post,
    path = "/admin/products/image-upload",
    request_body = ImageUploadRequest,
    responses(
        (status = 200, description = "URL", body = ImageUploadResponse),
        (status = 400, description = "Not an image")
    )
)]
pub async fn request_image_upload(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<ImageUploadRequest>,
) -> Result<Json<ImageUploadResponse>, AppError> {
    user.require_staff()?;

    let key = storage::product_image_key(&payload.filename, &payload.file_type)?;
    let upload_url = state
        .storage
        .presigned_upload_url(&key, &payload.file_type)
        .await?;

    Ok(Json(ImageUploadResponse {
        upload_url,
        public_url: state.config.public_object_url(&key),
        resource_key: key,
    }))
}

// --- Orders ---

/// list_orders
///
/// [Admin Route] Orders joined with product and customer, filtered by status and user.
#[utoipa::path(
    get,
    path = "/admin/orders",
    params(OrderQuery),
    responses(
        (status = 200, description = "Orders", body = [OrderDetails]),
        (status = 400, description = "Unknown status")
    )
)]
pub async fn list_orders(
    user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<OrderQuery>,
) -> Result<Json<Vec<OrderDetails>>, AppError> {
    user.require_staff()?;
    Ok(Json(state.repo.list_orders(query.into_filter()?).await?))
}

/// update_order_status
///
/// [Admin Route] Moves an order to any status. Cancelling restocks; reviving a
/// cancelled order takes the unit back and fails with 409 when it is gone.
#[utoipa::path(
    patch,
    path = "/admin/orders/{id}/status",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Updated", body = Order),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Out of stock for a revived order")
    )
)]
pub async fn update_order_status(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> Result<Json<Order>, AppError> {
    user.require_staff()?;
    state
        .repo
        .update_order_status(id, payload.status)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("Order"))
}

// --- Users ---

#[utoipa::path(
    get,
    path = "/admin/users",
    params(UserSearch),
    responses((status = 200, description = "Profiles", body = [Profile]))
)]
pub async fn list_users(
    user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<UserSearch>,
) -> Result<Json<Vec<Profile>>, AppError> {
    user.require_staff()?;
    Ok(Json(state.repo.list_profiles(query.search).await?))
}

/// lookup_user
///
/// [Admin Route] Finds a profile by email (case-insensitive).
#[utoipa::path(
    get,
    path = "/admin/users/lookup",
    params(EmailLookup),
    responses(
        (status = 200, description = "Found", body = Profile),
        (status = 404, description = "Not Found")
    )
)]
pub async fn lookup_user(
    user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<EmailLookup>,
) -> Result<Json<Profile>, AppError> {
    user.require_staff()?;
    state
        .repo
        .find_profile_by_email(query.email.trim())
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("Profile"))
}

/// update_user_limits
///
/// [Admin Route] Sets the order limit and ordering window of a profile. A null window
/// removes the time limit.
#[utoipa::path(
    put,
    path = "/admin/users/{id}/limits",
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
    user.require_staff()?;
    apply_limits(&state, &user, id, payload).await.map(Json)
}

/// Shared by the admin and super-admin limit endpoints.
pub(crate) async fn apply_limits(
    state: &AppState,
    actor: &AuthUser,
    id: Uuid,
    payload: UpdateLimitsRequest,
) -> Result<Profile, AppError> {
    let settings = state.repo.get_settings().await?;
    let (limit, window) = resolve_limits(&settings, payload.user_limit, payload.order_time_limit)?;

    let profile = state
        .repo
        .update_limits(id, limit, window)
        .await?
        .ok_or(AppError::NotFound("Profile"))?;

    tracing::info!(
        profile_id = %id,
        actor_id = %actor.id,
        user_limit = limit,
        order_time_limit = ?window,
        "order limits updated"
    );
    Ok(profile)
}
