use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use std::{fmt, str::FromStr};
use thiserror::Error;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Roles & Statuses ---

/// Raised when a text column or query parameter holds a value outside a closed enum.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Role
///
/// The RBAC tier of a profile. Stored as text in `public.profiles.role` and serialized
/// in snake_case so the JSON contract matches the database values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Role {
    #[default]
    User,
    Admin,
    SuperAdmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
            Role::SuperAdmin => "super_admin",
        }
    }

    /// Admins and super-admins share the `/admin` area.
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Admin | Role::SuperAdmin)
    }

    /// Landing page for the role. The super-admin area is mounted at `/super-admin`.
    pub fn dashboard_path(&self) -> &'static str {
        match self {
            Role::User => "/user/dashboard",
            Role::Admin => "/admin/dashboard",
            Role::SuperAdmin => "/super-admin/dashboard",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            "super_admin" => Ok(Role::SuperAdmin),
            other => Err(UnknownVariant {
                kind: "role",
                value: other.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// OrderStatus
///
/// Lifecycle of an order. Only admins move an order between states, except for the
/// owner cancelling a pending order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "processing" => Ok(OrderStatus::Processing),
            "completed" => Ok(OrderStatus::Completed),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(UnknownVariant {
                kind: "order status",
                value: other.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for OrderStatus {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// --- Core Application Schemas (Mapped to Database) ---

/// Profile
///
/// The application-side identity record in `public.profiles`. The `id` is the
/// Supabase `auth.users.id`. `user_limit` and `order_time_limit` gate ordering.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    #[sqlx(try_from = "String")]
    pub role: Role,
    // Null means the default limit applies.
    pub user_limit: Option<i32>,
    #[ts(type = "string | null")]
    pub order_time_limit: Option<DateTime<Utc>>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// Product
///
/// A catalog item from `public.products`. `stock` never drops below zero.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub stock: i32,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub is_active: bool,
    // The staff member who created the listing.
    pub admin_id: Option<Uuid>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// Order
///
/// A row of `public.orders`. `total_price` is the product price captured when the
/// order was placed.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub total_price: f64,
    #[sqlx(try_from = "String")]
    pub status: OrderStatus,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// OrderDetails
///
/// An order joined with the product and customer columns the dashboards display.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct OrderDetails {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub total_price: f64,
    #[sqlx(try_from = "String")]
    pub status: OrderStatus,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    pub product_name: String,
    pub product_image_url: Option<String>,
    pub user_email: String,
}

/// SystemSettings
///
/// Global knobs edited by super-admins, stored as the single row of `public.settings`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[ts(export)]
pub struct SystemSettings {
    pub site_name: String,
    pub site_description: String,
    pub maintenance_mode: bool,
    pub allow_registrations: bool,
    pub max_order_limit: i32,
    pub default_user_limit: i32,
}

impl Default for SystemSettings {
    fn default() -> Self {
        Self {
            site_name: "E-Commerce Dashboard".to_string(),
            site_description: "Role-based e-commerce system".to_string(),
            maintenance_mode: false,
            allow_registrations: true,
            max_order_limit: 100,
            default_user_limit: crate::eligibility::DEFAULT_USER_LIMIT,
        }
    }
}

// --- Request Payloads (Input Schemas) ---

/// NewProfile
///
/// Internal insert payload used after the auth provider has created the account.
#[derive(Debug, Clone)]
pub struct NewProfile {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub role: Role,
    pub user_limit: i32,
}

/// SignUpRequest
///
/// The password is forwarded to Supabase Auth and never stored or logged here.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// CreateProductRequest
///
/// `stock` and `price` are validated in the handler (non-negative).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateProductRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    pub stock: i32,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

/// UpdateProductRequest
///
/// Partial update: omitted fields keep their stored value. The nullable columns
/// (`description`, `category`, `image_url`) take an explicit `null` to clear them, which
/// deserializes to `Some(None)`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateProductRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<String>")]
    #[schema(value_type = Option<String>, nullable)]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<i32>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<String>")]
    #[schema(value_type = Option<String>, nullable)]
    pub category: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<String>")]
    #[schema(value_type = Option<String>, nullable)]
    pub image_url: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// A field that is present in the body, `null` included. Absent fields fall back to
/// `#[serde(default)]`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// StockAdjustRequest
///
/// Relative stock change (the dashboard's +1 / -1 buttons send ±1).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct StockAdjustRequest {
    pub delta: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct SetActiveRequest {
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct PlaceOrderRequest {
    pub product_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UpdateRoleRequest {
    pub role: Role,
}

/// UpdateLimitsRequest
///
/// Both fields are written as given: a missing `order_time_limit` clears the window,
/// a missing `user_limit` falls back to the default limit.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateLimitsRequest {
    #[serde(default)]
    pub user_limit: Option<i32>,
    #[serde(default)]
    #[ts(type = "string | null")]
    pub order_time_limit: Option<DateTime<Utc>>,
}

/// ImageUploadRequest
///
/// Input for a presigned product image upload.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, TS, Default)]
#[ts(export)]
pub struct ImageUploadRequest {
    #[schema(example = "espresso-machine.png")]
    pub filename: String,
    #[schema(example = "image/png")]
    pub file_type: String,
}

// --- Response Schemas (Output) ---

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, TS, Default)]
#[ts(export)]
pub struct ImageUploadResponse {
    /// Time-limited URL for the PUT request.
    pub upload_url: String,
    /// Object key inside the bucket.
    pub resource_key: String,
    /// URL to store in `Product.image_url` once the upload is done.
    pub public_url: String,
}

/// SessionResponse
///
/// Returned by sign-in and `/auth/session`. `redirect_to` is the role dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
pub struct SessionResponse {
    pub profile: Profile,
    pub redirect_to: String,
}

/// EligibilityReport
///
/// Server-side view of the order gate for one profile.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, TS, Default)]
#[ts(export)]
pub struct EligibilityReport {
    pub can_order: bool,
    pub orders_placed: i64,
    pub user_limit: i32,
    pub orders_left: i64,
    #[ts(type = "string | null")]
    pub order_time_limit: Option<DateTime<Utc>>,
    /// Human readable reason when `can_order` is false.
    pub reason: Option<String>,
}

/// CatalogProduct
///
/// A product as shown to a customer, flagged when they already ordered it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, TS, Default)]
#[ts(export)]
pub struct CatalogProduct {
    #[serde(flatten)]
    pub product: Product,
    pub already_ordered: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, TS, Default)]
#[ts(export)]
pub struct UserDashboard {
    pub profile: Profile,
    pub eligibility: EligibilityReport,
    pub orders: Vec<OrderDetails>,
    pub products: Vec<Product>,
}

/// AdminDashboardStats
///
/// Counters for `/admin/dashboard`. Low stock means an active product with fewer
/// than `LOW_STOCK_THRESHOLD` units.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, FromRow)]
#[ts(export)]
pub struct AdminDashboardStats {
    pub total_products: i64,
    pub total_orders: i64,
    pub pending_orders: i64,
    pub low_stock_products: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct AdminDashboard {
    pub stats: AdminDashboardStats,
    pub recent_orders: Vec<OrderDetails>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, FromRow)]
#[ts(export)]
pub struct SuperAdminDashboardStats {
    pub total_users: i64,
    /// Admins plus super-admins.
    pub total_staff: i64,
    pub total_products: i64,
    pub total_orders: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct SuperAdminDashboard {
    pub stats: SuperAdminDashboardStats,
    pub recent_users: Vec<Profile>,
}

/// Stock level under which an active product counts as low stock.
pub const LOW_STOCK_THRESHOLD: i32 = 10;
