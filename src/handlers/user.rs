use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use serde::Deserialize;
use std::collections::HashSet;
use uuid::Uuid;

use crate::{
    AppState,
    auth::AuthUser,
    eligibility,
    error::AppError,
    models::{
        CatalogProduct, EligibilityReport, Order, OrderDetails, PlaceOrderRequest, Profile,
        Role, UserDashboard,
    },
    repository::{OrderFilter, ProductFilter},
};

/// CatalogQuery
///
/// Customer-facing catalog filters. Only active, in-stock products are ever listed.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CatalogQuery {
    pub search: Option<String>,
    /// "all" or omitted for every category.
    pub category: Option<String>,
}

fn orderable(search: Option<String>, category: Option<String>) -> ProductFilter {
    ProductFilter {
        category,
        active: Some(true),
        in_stock: Some(true),
        low_stock: None,
        search,
    }
}

async fn load_profile(state: &AppState, user: &AuthUser) -> Result<Profile, AppError> {
    state
        .repo
        .get_profile(user.id)
        .await?
        .ok_or(AppError::Unauthorized)
}

async fn my_orders(state: &AppState, user: &AuthUser) -> Result<Vec<OrderDetails>, AppError> {
    state
        .repo
        .list_orders(OrderFilter {
            status: None,
            user_id: Some(user.id),
        })
        .await
}

/// get_user_dashboard
///
/// [User Route] Profile, order gate, order history and the orderable catalog in one call.
#[utoipa::path(
    get,
    path = "/user/dashboard",
    responses((status = 200, description = "User dashboard", body = UserDashboard))
)]
pub async fn get_user_dashboard(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<UserDashboard>, AppError> {
    user.require_any(&[Role::User])?;

    let profile = load_profile(&state, &user).await?;
    let orders = my_orders(&state, &user).await?;
    let products = state.repo.list_products(orderable(None, None)).await?;
    let eligibility = eligibility::report(&profile, orders.len() as i64, Utc::now());

    Ok(Json(UserDashboard {
        profile,
        eligibility,
        orders,
        products,
    }))
}

/// get_eligibility
///
/// [User Route] Whether the caller can order right now, and how many orders remain.
#[utoipa::path(
    get,
    path = "/user/eligibility",
    responses((status = 200, description = "Order gate", body = EligibilityReport))
)]
pub async fn get_eligibility(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<EligibilityReport>, AppError> {
    user.require_any(&[Role::User])?;

    let profile = load_profile(&state, &user).await?;
    let placed = state.repo.count_orders_for_user(user.id).await?;
    Ok(Json(eligibility::report(&profile, placed, Utc::now())))
}

/// get_catalog
///
/// [User Route] Orderable products, each flagged when the caller already ordered it.
#[utoipa::path(
    get,
    path = "/user/products",
    params(CatalogQuery),
    responses((status = 200, description = "Catalog", body = [CatalogProduct]))
)]
pub async fn get_catalog(
    user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> Result<Json<Vec<CatalogProduct>>, AppError> {
    user.require_any(&[Role::User])?;

    let products = state
        .repo
        .list_products(orderable(query.search, query.category))
        .await?;
    let ordered: HashSet<Uuid> = my_orders(&state, &user)
        .await?
        .into_iter()
        .map(|order| order.product_id)
        .collect();

    Ok(Json(
        products
            .into_iter()
            .map(|product| CatalogProduct {
                already_ordered: ordered.contains(&product.id),
                product,
            })
            .collect(),
    ))
}

/// get_my_orders
///
/// [User Route] The caller's orders, newest first.
#[utoipa::path(
    get,
    path = "/user/orders",
    responses((status = 200, description = "My orders", body = [OrderDetails]))
)]
pub async fn get_my_orders(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<OrderDetails>>, AppError> {
    user.require_any(&[Role::User])?;
    Ok(Json(my_orders(&state, &user).await?))
}

/// place_order
///
/// [User Route] Orders one unit of a product. Eligibility, the stock decrement and the
/// insert happen in a single repository transaction, so the limit holds even for
/// clients that skip the dashboard.
#[utoipa::path(
    post,
    path = "/user/orders",
    request_body = PlaceOrderRequest,
    responses(
        (status = 201, description = "Order placed", body = Order),
        (status = 404, description = "Product missing or inactive"),
        (status = 409, description = "Limit reached, window closed, or out of stock"),
        (status = 503, description = "Maintenance mode")
    )
)]
pub async fn place_order(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<Order>), AppError> {
    user.require_any(&[Role::User])?;

    if state.repo.get_settings().await?.maintenance_mode {
        return Err(AppError::Maintenance);
    }

    let order = state
        .repo
        .place_order(user.id, payload.product_id, Utc::now())
        .await?;

    Ok((StatusCode::CREATED, Json(order)))
}

/// cancel_order
///
/// [User Route] Cancels one of the caller's pending orders and returns the unit to stock.
#[utoipa::path(
    post,
    path = "/user/orders/{id}/cancel",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Cancelled", body = Order),
        (status = 404, description = "Not found or not yours"),
        (status = 409, description = "Order is no longer pending")
    )
)]
pub async fn cancel_order(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, AppError> {
    user.require_any(&[Role::User])?;
    Ok(Json(state.repo.cancel_order(id, user.id).await?))
}
