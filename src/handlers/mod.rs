//! HTTP handlers, grouped by the area of the dashboard they serve.
//!
//! Every handler that touches a role-gated area re-checks the caller's role through
//! `AuthUser::require_*`; the route guard only covers browser navigation.

pub mod admin;
pub mod session;
pub mod super_admin;
pub mod user;

use chrono::{DateTime, Utc};

use crate::{
    error::AppError,
    models::{CreateProductRequest, SystemSettings, UpdateProductRequest},
};

/// Number of rows shown in the "recent" widgets of the dashboards.
pub const RECENT_ITEMS: i64 = 5;

fn check_price(price: f64) -> Result<(), AppError> {
    if !price.is_finite() || price < 0.0 {
        return Err(AppError::Validation("price must be a non-negative number".into()));
    }
    Ok(())
}

fn check_stock(stock: i32) -> Result<(), AppError> {
    if stock < 0 {
        return Err(AppError::Validation("stock cannot be negative".into()));
    }
    Ok(())
}

pub(crate) fn validate_new_product(req: &CreateProductRequest) -> Result<(), AppError> {
    if req.name.trim().is_empty() {
        return Err(AppError::Validation("name is required".into()));
    }
    check_price(req.price)?;
    check_stock(req.stock)
}

pub(crate) fn validate_product_update(req: &UpdateProductRequest) -> Result<(), AppError> {
    if req.name.as_deref().is_some_and(|name| name.trim().is_empty()) {
        return Err(AppError::Validation("name cannot be blank".into()));
    }
    if let Some(price) = req.price {
        check_price(price)?;
    }
    if let Some(stock) = req.stock {
        check_stock(stock)?;
    }
    Ok(())
}

/// resolve_limits
///
/// Applies the settings to an incoming limits update: a missing `user_limit` becomes the
/// default limit, and any limit must lie in `1..=max_order_limit`.
pub(crate) fn resolve_limits(
    settings: &SystemSettings,
    user_limit: Option<i32>,
    order_time_limit: Option<DateTime<Utc>>,
) -> Result<(i32, Option<DateTime<Utc>>), AppError> {
    let limit = user_limit.unwrap_or(settings.default_user_limit);
    if limit < 1 || limit > settings.max_order_limit {
        return Err(AppError::Validation(format!(
            "user_limit must be between 1 and {}",
            settings.max_order_limit
        )));
    }
    Ok((limit, order_time_limit))
}

pub(crate) fn validate_settings(settings: &SystemSettings) -> Result<(), AppError> {
    if settings.site_name.trim().is_empty() {
        return Err(AppError::Validation("site_name is required".into()));
    }
    if settings.max_order_limit < 1 {
        return Err(AppError::Validation("max_order_limit must be at least 1".into()));
    }
    if settings.default_user_limit < 1 || settings.default_user_limit > settings.max_order_limit
    {
        return Err(AppError::Validation(
            "default_user_limit must be between 1 and max_order_limit".into(),
        ));
    }
    Ok(())
}
