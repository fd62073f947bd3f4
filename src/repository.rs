use crate::{
    eligibility::{self, OrderLimits},
    error::AppError,
    models::{
        AdminDashboardStats, CreateProductRequest, LOW_STOCK_THRESHOLD, NewProfile, Order,
        OrderDetails, OrderStatus, Product, Profile, Role, SuperAdminDashboardStats,
        SystemSettings, UpdateProductRequest,
    },
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::{PgPool, query_builder::QueryBuilder};
use std::sync::Arc;
use uuid::Uuid;

/// stock_out_of_range
///
/// Validation error for a stock change that would leave `0..=i32::MAX`.
pub fn stock_out_of_range(stock: i32, delta: i32) -> AppError {
    if i64::from(stock) + i64::from(delta) < 0 {
        AppError::Validation("stock cannot go below zero".to_string())
    } else {
        AppError::Validation(format!("stock cannot exceed {}", i32::MAX))
    }
}

// --- Query Filters ---

/// ProductFilter
///
/// Catalog filters shared by the admin and customer listings. A `category` of "all"
/// means no category filter.
#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub active: Option<bool>,
    /// Only products with at least one unit.
    pub in_stock: Option<bool>,
    /// Only active products under the low-stock threshold.
    pub low_stock: Option<bool>,
    /// Case-insensitive match on name or description.
    pub search: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub user_id: Option<Uuid>,
}

/// Repository Trait
///
/// Every table operation of the dashboard. Handlers only see `Arc<dyn Repository>`, so
/// tests swap in an in-memory implementation.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Profiles ---
    async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>, AppError>;
    async fn find_profile_by_email(&self, email: &str) -> Result<Option<Profile>, AppError>;
    async fn create_profile(&self, profile: NewProfile) -> Result<Profile, AppError>;
    // Search matches email or role.
    async fn list_profiles(&self, search: Option<String>) -> Result<Vec<Profile>, AppError>;
    async fn recent_profiles(&self, limit: i64) -> Result<Vec<Profile>, AppError>;
    async fn update_role(&self, id: Uuid, role: Role) -> Result<Option<Profile>, AppError>;
    async fn update_limits(
        &self,
        id: Uuid,
        user_limit: i32,
        order_time_limit: Option<DateTime<Utc>>,
    ) -> Result<Option<Profile>, AppError>;

    // --- Products ---
    async fn list_products(&self, filter: ProductFilter) -> Result<Vec<Product>, AppError>;
    async fn get_product(&self, id: Uuid) -> Result<Option<Product>, AppError>;
    async fn create_product(
        &self,
        req: CreateProductRequest,
        admin_id: Uuid,
    ) -> Result<Product, AppError>;
    async fn update_product(
        &self,
        id: Uuid,
        req: UpdateProductRequest,
    ) -> Result<Option<Product>, AppError>;
    // Hard delete. Conflict while orders reference the product.
    async fn delete_product(&self, id: Uuid) -> Result<bool, AppError>;
    async fn set_product_active(&self, id: Uuid, is_active: bool)
    -> Result<Option<Product>, AppError>;
    /// Adds `delta` to the stock in one statement. The result must stay in `0..=i32::MAX`.
    async fn adjust_stock(&self, id: Uuid, delta: i32) -> Result<Product, AppError>;

    // --- Orders ---
    async fn list_orders(&self, filter: OrderFilter) -> Result<Vec<OrderDetails>, AppError>;
    async fn recent_orders(&self, limit: i64) -> Result<Vec<OrderDetails>, AppError>;
    async fn count_orders_for_user(&self, user_id: Uuid) -> Result<i64, AppError>;
    /// Entering `cancelled` restocks; leaving it takes the units again or fails with
    /// `OutOfStock`.
    async fn update_order_status(
        &self,
        id: Uuid,
        status: OrderStatus,
    ) -> Result<Option<Order>, AppError>;
    /// Eligibility check, stock decrement and order insert as one unit.
    async fn place_order(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Order, AppError>;
    /// Owner-only cancel of a pending order; the unit goes back into stock.
    async fn cancel_order(&self, order_id: Uuid, user_id: Uuid) -> Result<Order, AppError>;

    // --- Dashboards ---
    async fn admin_stats(&self) -> Result<AdminDashboardStats, AppError>;
    async fn super_admin_stats(&self) -> Result<SuperAdminDashboardStats, AppError>;

    // --- Settings ---
    async fn get_settings(&self) -> Result<SystemSettings, AppError>;
    async fn update_settings(&self, settings: SystemSettings) -> Result<SystemSettings, AppError>;
}

pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// `Repository` backed by the Supabase Postgres database.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const PROFILE_COLUMNS: &str =
    "id, email, full_name, role, user_limit, order_time_limit, created_at";

const PRODUCT_COLUMNS: &str = "id, name, description, price, stock, category, image_url, \
     is_active, admin_id, created_at, updated_at";

const ORDER_COLUMNS: &str = "id, user_id, product_id, quantity, total_price, status, created_at";

const ORDER_DETAILS_SELECT: &str = r#"
    SELECT
        o.id, o.user_id, o.product_id, o.quantity, o.total_price, o.status, o.created_at,
        p.name AS product_name, p.image_url AS product_image_url, u.email AS user_email
    FROM orders o
    JOIN products p ON p.id = o.product_id
    JOIN profiles u ON u.id = o.user_id
"#;

const SETTINGS_COLUMNS: &str = "site_name, site_description, maintenance_mode, \
     allow_registrations, max_order_limit, default_user_limit";

#[async_trait]
impl Repository for PostgresRepository {
    // --- PROFILES ---

    async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>, AppError> {
        let query = format!("SELECT {} FROM profiles WHERE id = $1", PROFILE_COLUMNS);
        Ok(sqlx::query_as::<_, Profile>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_profile_by_email(&self, email: &str) -> Result<Option<Profile>, AppError> {
        let query = format!(
            "SELECT {} FROM profiles WHERE lower(email) = lower($1)",
            PROFILE_COLUMNS
        );
        Ok(sqlx::query_as::<_, Profile>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// create_profile
    ///
    /// Mirrors a freshly created auth account into `public.profiles`.
    async fn create_profile(&self, profile: NewProfile) -> Result<Profile, AppError> {
        let query = format!(
            "INSERT INTO profiles (id, email, full_name, role, user_limit) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            PROFILE_COLUMNS
        );
        sqlx::query_as::<_, Profile>(&query)
            .bind(profile.id)
            .bind(&profile.email)
            .bind(&profile.full_name)
            .bind(profile.role.as_str())
            .bind(profile.user_limit)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    AppError::Conflict(format!("profile for {} already exists", profile.email))
                }
                other => other.into(),
            })
    }

    async fn list_profiles(&self, search: Option<String>) -> Result<Vec<Profile>, AppError> {
        let mut builder: QueryBuilder<sqlx::Postgres> =
            QueryBuilder::new(format!("SELECT {} FROM profiles", PROFILE_COLUMNS));

        if let Some(s) = search.filter(|s| !s.trim().is_empty()) {
            let pattern = format!("%{}%", s.trim());
            builder.push(" WHERE (email ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR role ILIKE ");
            builder.push_bind(pattern);
            builder.push(")");
        }
        builder.push(" ORDER BY created_at DESC");

        Ok(builder
            .build_query_as::<Profile>()
            .fetch_all(&self.pool)
            .await?)
    }

    async fn recent_profiles(&self, limit: i64) -> Result<Vec<Profile>, AppError> {
        let query = format!(
            "SELECT {} FROM profiles ORDER BY created_at DESC LIMIT $1",
            PROFILE_COLUMNS
        );
        Ok(sqlx::query_as::<_, Profile>(&query)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn update_role(&self, id: Uuid, role: Role) -> Result<Option<Profile>, AppError> {
        let query = format!(
            "UPDATE profiles SET role = $2 WHERE id = $1 RETURNING {}",
            PROFILE_COLUMNS
        );
        Ok(sqlx::query_as::<_, Profile>(&query)
            .bind(id)
            .bind(role.as_str())
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn update_limits(
        &self,
        id: Uuid,
        user_limit: i32,
        order_time_limit: Option<DateTime<Utc>>,
    ) -> Result<Option<Profile>, AppError> {
        let query = format!(
            "UPDATE profiles SET user_limit = $2, order_time_limit = $3 WHERE id = $1 RETURNING {}",
            PROFILE_COLUMNS
        );
        Ok(sqlx::query_as::<_, Profile>(&query)
            .bind(id)
            .bind(user_limit)
            .bind(order_time_limit)
            .fetch_optional(&self.pool)
            .await?)
    }

    // --- PRODUCTS ---

    /// list_products
    ///
    /// Builds the filter with QueryBuilder so every user-supplied value is a bind parameter.
    async fn list_products(&self, filter: ProductFilter) -> Result<Vec<Product>, AppError> {
        let mut builder: QueryBuilder<sqlx::Postgres> =
            QueryBuilder::new(format!("SELECT {} FROM products WHERE TRUE", PRODUCT_COLUMNS));

        if let Some(category) = filter.category.filter(|c| c != "all" && !c.is_empty()) {
            builder.push(" AND category = ");
            builder.push_bind(category);
        }
        if let Some(active) = filter.active {
            builder.push(" AND is_active = ");
            builder.push_bind(active);
        }
        if filter.in_stock == Some(true) {
            builder.push(" AND stock > 0");
        }
        if filter.low_stock == Some(true) {
            builder.push(" AND is_active AND stock < ");
            builder.push_bind(LOW_STOCK_THRESHOLD);
        }
        if let Some(s) = filter.search.filter(|s| !s.trim().is_empty()) {
            let pattern = format!("%{}%", s.trim());
            builder.push(" AND (name ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR description ILIKE ");
            builder.push_bind(pattern);
            builder.push(")");
        }
        builder.push(" ORDER BY created_at DESC");

        Ok(builder
            .build_query_as::<Product>()
            .fetch_all(&self.pool)
            .await?)
    }

    async fn get_product(&self, id: Uuid) -> Result<Option<Product>, AppError> {
        let query = format!("SELECT {} FROM products WHERE id = $1", PRODUCT_COLUMNS);
        Ok(sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_product(
        &self,
        req: CreateProductRequest,
        admin_id: Uuid,
    ) -> Result<Product, AppError> {
        let query = format!(
            "INSERT INTO products \
                 (id, name, description, price, stock, category, image_url, is_active, admin_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {}",
            PRODUCT_COLUMNS
        );
        Ok(sqlx::query_as::<_, Product>(&query)
            .bind(Uuid::new_v4())
            .bind(req.name)
            .bind(req.description)
            .bind(req.price)
            .bind(req.stock)
            .bind(req.category)
            .bind(req.image_url)
            .bind(req.is_active)
            .bind(admin_id)
            .fetch_one(&self.pool)
            .await?)
    }

    /// update_product
    ///
    /// COALESCE keeps the stored value for every field the request leaves out. The
    /// nullable columns carry a "present" flag so an explicit null clears them.
    async fn update_product(
        &self,
        id: Uuid,
        req: UpdateProductRequest,
    ) -> Result<Option<Product>, AppError> {
        let query = format!(
            r#"
            UPDATE products
            SET name = COALESCE($2, name),
                description = CASE WHEN $9 THEN $3 ELSE description END,
                price = COALESCE($4, price),
                stock = COALESCE($5, stock),
                category = CASE WHEN $10 THEN $6 ELSE category END,
                image_url = CASE WHEN $11 THEN $7 ELSE image_url END,
                is_active = COALESCE($8, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        );
        Ok(sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .bind(req.name)
            .bind(req.description.clone().flatten())
            .bind(req.price)
            .bind(req.stock)
            .bind(req.category.clone().flatten())
            .bind(req.image_url.clone().flatten())
            .bind(req.is_active)
            .bind(req.description.is_some())
            .bind(req.category.is_some())
            .bind(req.image_url.is_some())
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_product(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                    AppError::Conflict("product has orders; deactivate it instead".to_string())
                }
                other => other.into(),
            })?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_product_active(
        &self,
        id: Uuid,
        is_active: bool,
    ) -> Result<Option<Product>, AppError> {
        let query = format!(
            "UPDATE products SET is_active = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            PRODUCT_COLUMNS
        );
        Ok(sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .bind(is_active)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// adjust_stock
    ///
    /// The bound check runs in bigint so an oversized delta is rejected instead of
    /// overflowing the int4 column.
    async fn adjust_stock(&self, id: Uuid, delta: i32) -> Result<Product, AppError> {
        let query = format!(
            "UPDATE products SET stock = (stock::bigint + $2)::int4, updated_at = NOW() \
             WHERE id = $1 AND stock::bigint + $2 BETWEEN 0 AND $3 RETURNING {}",
            PRODUCT_COLUMNS
        );
        let updated = sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .bind(i64::from(delta))
            .bind(i64::from(i32::MAX))
            .fetch_optional(&self.pool)
            .await?;

        match updated {
            Some(product) => Ok(product),
            None => match self.get_product(id).await? {
                Some(product) => Err(stock_out_of_range(product.stock, delta)),
                None => Err(AppError::NotFound("Product")),
            },
        }
    }

    // --- ORDERS ---

    async fn list_orders(&self, filter: OrderFilter) -> Result<Vec<OrderDetails>, AppError> {
        let mut builder: QueryBuilder<sqlx::Postgres> = QueryBuilder::new(ORDER_DETAILS_SELECT);
        builder.push(" WHERE TRUE");

        if let Some(status) = filter.status {
            builder.push(" AND o.status = ");
            builder.push_bind(status.as_str());
        }
        if let Some(user_id) = filter.user_id {
            builder.push(" AND o.user_id = ");
            builder.push_bind(user_id);
        }
        builder.push(" ORDER BY o.created_at DESC");

        Ok(builder
            .build_query_as::<OrderDetails>()
            .fetch_all(&self.pool)
            .await?)
    }

    async fn recent_orders(&self, limit: i64) -> Result<Vec<OrderDetails>, AppError> {
        let query = format!("{} ORDER BY o.created_at DESC LIMIT $1", ORDER_DETAILS_SELECT);
        Ok(sqlx::query_as::<_, OrderDetails>(&query)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn count_orders_for_user(&self, user_id: Uuid) -> Result<i64, AppError> {
        Ok(
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM orders WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?,
        )
    }

    /// update_order_status
    ///
    /// Stock follows the order in one transaction: entering `cancelled` puts the units
    /// back, leaving it takes them again (`OutOfStock` when they are gone).
    async fn update_order_status(
        &self,
        id: Uuid,
        status: OrderStatus,
    ) -> Result<Option<Order>, AppError> {
        let mut tx = self.pool.begin().await?;

        let select = format!("SELECT {} FROM orders WHERE id = $1 FOR UPDATE", ORDER_COLUMNS);
        let Some(order) = sqlx::query_as::<_, Order>(&select)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        let was_cancelled = order.status == OrderStatus::Cancelled;
        let now_cancelled = status == OrderStatus::Cancelled;

        if was_cancelled && !now_cancelled {
            let taken = sqlx::query(
                "UPDATE products SET stock = stock - $2, updated_at = NOW() \
                 WHERE id = $1 AND stock >= $2",
            )
            .bind(order.product_id)
            .bind(order.quantity)
            .execute(&mut *tx)
            .await?;
            if taken.rows_affected() == 0 {
                return Err(AppError::OutOfStock);
            }
        } else if now_cancelled && !was_cancelled {
            sqlx::query("UPDATE products SET stock = stock + $2, updated_at = NOW() WHERE id = $1")
                .bind(order.product_id)
                .bind(order.quantity)
                .execute(&mut *tx)
                .await?;
        }

        let update = format!(
            "UPDATE orders SET status = $2 WHERE id = $1 RETURNING {}",
            ORDER_COLUMNS
        );
        let updated = sqlx::query_as::<_, Order>(&update)
            .bind(id)
            .bind(status.as_str())
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(updated))
    }

    /// place_order
    ///
    /// One transaction:
    /// 1. lock the profile row so concurrent orders by the same user run one at a time,
    /// 2. count the user's orders and apply the eligibility rule,
    /// 3. decrement stock only if the product is active and has a unit left,
    /// 4. insert the order at the current price.
    ///
    /// Returning early drops `tx`, which rolls every step back.
    async fn place_order(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Order, AppError> {
        let mut tx = self.pool.begin().await?;

        let (user_limit, order_time_limit) =
            sqlx::query_as::<_, (Option<i32>, Option<DateTime<Utc>>)>(
                "SELECT user_limit, order_time_limit FROM profiles WHERE id = $1 FOR UPDATE",
            )
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(AppError::NotFound("Profile"))?;

        let placed: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;

        let limits = OrderLimits {
            user_limit,
            order_time_limit,
        };
        eligibility::check(limits, placed, now).into_result()?;

        let price: Option<f64> = sqlx::query_scalar(
            "UPDATE products SET stock = stock - 1, updated_at = NOW() \
             WHERE id = $1 AND is_active AND stock > 0 RETURNING price",
        )
        .bind(product_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(price) = price else {
            let is_active: Option<bool> =
                sqlx::query_scalar("SELECT is_active FROM products WHERE id = $1")
                    .bind(product_id)
                    .fetch_optional(&mut *tx)
                    .await?;
            return Err(match is_active {
                Some(true) => AppError::OutOfStock,
                // Inactive products are not orderable and look missing to customers.
                _ => AppError::NotFound("Product"),
            });
        };

        let query = format!(
            "INSERT INTO orders (id, user_id, product_id, quantity, total_price, status) \
             VALUES ($1, $2, $3, 1, $4, $5) RETURNING {}",
            ORDER_COLUMNS
        );
        let order = sqlx::query_as::<_, Order>(&query)
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(product_id)
            .bind(price)
            .bind(OrderStatus::Pending.as_str())
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(order_id = %order.id, %user_id, %product_id, "order placed");
        Ok(order)
    }

    async fn cancel_order(&self, order_id: Uuid, user_id: Uuid) -> Result<Order, AppError> {
        let mut tx = self.pool.begin().await?;

        let select = format!(
            "SELECT {} FROM orders WHERE id = $1 AND user_id = $2 FOR UPDATE",
            ORDER_COLUMNS
        );
        let order = sqlx::query_as::<_, Order>(&select)
            .bind(order_id)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(AppError::NotFound("Order"))?;

        if order.status != OrderStatus::Pending {
            return Err(AppError::Conflict(format!(
                "only pending orders can be cancelled (order is {})",
                order.status
            )));
        }

        let update = format!(
            "UPDATE orders SET status = $2 WHERE id = $1 RETURNING {}",
            ORDER_COLUMNS
        );
        let cancelled = sqlx::query_as::<_, Order>(&update)
            .bind(order_id)
            .bind(OrderStatus::Cancelled.as_str())
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query("UPDATE products SET stock = stock + $2, updated_at = NOW() WHERE id = $1")
            .bind(order.product_id)
            .bind(order.quantity)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(cancelled)
    }

    // --- DASHBOARDS ---

    async fn admin_stats(&self) -> Result<AdminDashboardStats, AppError> {
        Ok(sqlx::query_as::<_, AdminDashboardStats>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM products) AS total_products,
                (SELECT COUNT(*) FROM orders) AS total_orders,
                (SELECT COUNT(*) FROM orders WHERE status = 'pending') AS pending_orders,
                (SELECT COUNT(*) FROM products WHERE is_active AND stock < $1) AS low_stock_products
            "#,
        )
        .bind(LOW_STOCK_THRESHOLD)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn super_admin_stats(&self) -> Result<SuperAdminDashboardStats, AppError> {
        Ok(sqlx::query_as::<_, SuperAdminDashboardStats>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM profiles) AS total_users,
                (SELECT COUNT(*) FROM profiles WHERE role IN ('admin', 'super_admin')) AS total_staff,
                (SELECT COUNT(*) FROM products) AS total_products,
                (SELECT COUNT(*) FROM orders) AS total_orders
            "#,
        )
        .fetch_one(&self.pool)
        .await?)
    }

    // --- SETTINGS ---

    async fn get_settings(&self) -> Result<SystemSettings, AppError> {
        let query = format!("SELECT {} FROM settings WHERE id", SETTINGS_COLUMNS);
        Ok(sqlx::query_as::<_, SystemSettings>(&query)
            .fetch_optional(&self.pool)
            .await?
            .unwrap_or_default())
    }

    async fn update_settings(&self, settings: SystemSettings) -> Result<SystemSettings, AppError> {
        let query = format!(
            r#"
            INSERT INTO settings (id, {cols})
            VALUES (TRUE, $1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO UPDATE SET
                site_name = EXCLUDED.site_name,
                site_description = EXCLUDED.site_description,
                maintenance_mode = EXCLUDED.maintenance_mode,
                allow_registrations = EXCLUDED.allow_registrations,
                max_order_limit = EXCLUDED.max_order_limit,
                default_user_limit = EXCLUDED.default_user_limit
            RETURNING {cols}
            "#,
            cols = SETTINGS_COLUMNS
        );
        Ok(sqlx::query_as::<_, SystemSettings>(&query)
            .bind(settings.site_name)
            .bind(settings.site_description)
            .bind(settings.maintenance_mode)
            .bind(settings.allow_registrations)
            .bind(settings.max_order_limit)
            .bind(settings.default_user_limit)
            .fetch_one(&self.pool)
            .await?)
    }
}
