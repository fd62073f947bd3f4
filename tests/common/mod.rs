#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shop_dashboard::{
    AppConfig, AppState, MockIdentityProvider, MockStorageService,
    auth::AuthUser,
    eligibility::{self, OrderLimits},
    error::AppError,
    identity::IdentityState,
    models::{
        AdminDashboardStats, CreateProductRequest, LOW_STOCK_THRESHOLD, NewProfile, Order,
        OrderDetails, OrderStatus, Product, Profile, Role, SuperAdminDashboardStats,
        SystemSettings, UpdateProductRequest,
    },
    repository::{OrderFilter, ProductFilter, Repository, RepositoryState, stock_out_of_range},
    storage::StorageState,
};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

// --- IN-MEMORY REPOSITORY ---

#[derive(Default)]
struct Tables {
    profiles: Vec<Profile>,
    products: Vec<Product>,
    orders: Vec<Order>,
    settings: SystemSettings,
}

/// MemoryRepository
///
/// Behaves like `PostgresRepository` for handler and router tests: same ordering,
/// same error variants, and `place_order` runs under one lock.
#[derive(Default)]
pub struct MemoryRepository {
    tables: Mutex<Tables>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // --- Seeding ---

    pub fn seed_profile(&self, email: &str, role: Role, user_limit: Option<i32>) -> Profile {
        let profile = Profile {
            id: Uuid::new_v4(),
            email: email.to_string(),
            full_name: None,
            role,
            user_limit,
            order_time_limit: None,
            created_at: Utc::now(),
        };
        self.lock().profiles.push(profile.clone());
        profile
    }

    pub fn seed_product(&self, name: &str, price: f64, stock: i32, is_active: bool) -> Product {
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4(),
            name: name.to_string(),
            price,
            stock,
            is_active,
            category: Some("general".to_string()),
            created_at: now,
            updated_at: now,
            ..Product::default()
        };
        self.lock().products.push(product.clone());
        product
    }

    pub fn seed_order(&self, user_id: Uuid, product_id: Uuid, status: OrderStatus) -> Order {
        let order = Order {
            id: Uuid::new_v4(),
            user_id,
            product_id,
            quantity: 1,
            total_price: 1.0,
            status,
            created_at: Utc::now(),
        };
        self.lock().orders.push(order.clone());
        order
    }

    pub fn set_order_window(&self, user_id: Uuid, window: Option<DateTime<Utc>>) {
        if let Some(p) = self.lock().profiles.iter_mut().find(|p| p.id == user_id) {
            p.order_time_limit = window;
        }
    }

    pub fn set_settings(&self, settings: SystemSettings) {
        self.lock().settings = settings;
    }

    pub fn stock_of(&self, product_id: Uuid) -> i32 {
        self.lock()
            .products
            .iter()
            .find(|p| p.id == product_id)
            .map(|p| p.stock)
            .unwrap_or(-1)
    }

    pub fn order_count(&self) -> usize {
        self.lock().orders.len()
    }
}

fn details(tables: &Tables, order: &Order) -> OrderDetails {
    let product = tables.products.iter().find(|p| p.id == order.product_id);
    let user = tables.profiles.iter().find(|p| p.id == order.user_id);
    OrderDetails {
        id: order.id,
        user_id: order.user_id,
        product_id: order.product_id,
        quantity: order.quantity,
        total_price: order.total_price,
        status: order.status,
        created_at: order.created_at,
        product_name: product.map(|p| p.name.clone()).unwrap_or_default(),
        product_image_url: product.and_then(|p| p.image_url.clone()),
        user_email: user.map(|p| p.email.clone()).unwrap_or_default(),
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>, AppError> {
        Ok(self.lock().profiles.iter().find(|p| p.id == id).cloned())
    }

    async fn find_profile_by_email(&self, email: &str) -> Result<Option<Profile>, AppError> {
        Ok(self
            .lock()
            .profiles
            .iter()
            .find(|p| p.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn create_profile(&self, new: NewProfile) -> Result<Profile, AppError> {
        let mut tables = self.lock();
        if tables
            .profiles
            .iter()
            .any(|p| p.id == new.id || p.email == new.email)
        {
            return Err(AppError::Conflict(format!(
                "profile for {} already exists",
                new.email
            )));
        }
        let profile = Profile {
            id: new.id,
            email: new.email,
            full_name: new.full_name,
            role: new.role,
            user_limit: Some(new.user_limit),
            order_time_limit: None,
            created_at: Utc::now(),
        };
        tables.profiles.push(profile.clone());
        Ok(profile)
    }

    async fn list_profiles(&self, search: Option<String>) -> Result<Vec<Profile>, AppError> {
        let search = search.filter(|s| !s.trim().is_empty());
        Ok(self
            .lock()
            .profiles
            .iter()
            .rev()
            .filter(|p| match &search {
                Some(s) => contains_ci(&p.email, s.trim()) || contains_ci(p.role.as_str(), s.trim()),
                None => true,
            })
            .cloned()
            .collect())
    }

    async fn recent_profiles(&self, limit: i64) -> Result<Vec<Profile>, AppError> {
        Ok(self
            .lock()
            .profiles
            .iter()
            .rev()
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn update_role(&self, id: Uuid, role: Role) -> Result<Option<Profile>, AppError> {
        let mut tables = self.lock();
        Ok(tables.profiles.iter_mut().find(|p| p.id == id).map(|p| {
            p.role = role;
            p.clone()
        }))
    }

    async fn update_limits(
        &self,
        id: Uuid,
        user_limit: i32,
        order_time_limit: Option<DateTime<Utc>>,
    ) -> Result<Option<Profile>, AppError> {
        let mut tables = self.lock();
        Ok(tables.profiles.iter_mut().find(|p| p.id == id).map(|p| {
            p.user_limit = Some(user_limit);
            p.order_time_limit = order_time_limit;
            p.clone()
        }))
    }

    async fn list_products(&self, filter: ProductFilter) -> Result<Vec<Product>, AppError> {
        let category = filter.category.filter(|c| c != "all" && !c.is_empty());
        let search = filter.search.filter(|s| !s.trim().is_empty());
        Ok(self
            .lock()
            .products
            .iter()
            .rev()
            .filter(|p| category.is_none() || p.category == category)
            .filter(|p| filter.active.is_none_or(|active| p.is_active == active))
            .filter(|p| filter.in_stock != Some(true) || p.stock > 0)
            .filter(|p| {
                filter.low_stock != Some(true) || (p.is_active && p.stock < LOW_STOCK_THRESHOLD)
            })
            .filter(|p| match &search {
                Some(s) => {
                    contains_ci(&p.name, s.trim())
                        || p.description
                            .as_deref()
                            .is_some_and(|d| contains_ci(d, s.trim()))
                }
                None => true,
            })
            .cloned()
            .collect())
    }

    async fn get_product(&self, id: Uuid) -> Result<Option<Product>, AppError> {
        Ok(self.lock().products.iter().find(|p| p.id == id).cloned())
    }

    async fn create_product(
        &self,
        req: CreateProductRequest,
        admin_id: Uuid,
    ) -> Result<Product, AppError> {
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4(),
            name: req.name,
            description: req.description,
            price: req.price,
            stock: req.stock,
            category: req.category,
            image_url: req.image_url,
            is_active: req.is_active,
            admin_id: Some(admin_id),
            created_at: now,
            updated_at: now,
        };
        self.lock().products.push(product.clone());
        Ok(product)
    }

    async fn update_product(
        &self,
        id: Uuid,
        req: UpdateProductRequest,
    ) -> Result<Option<Product>, AppError> {
        let mut tables = self.lock();
        Ok(tables.products.iter_mut().find(|p| p.id == id).map(|p| {
            if let Some(name) = req.name {
                p.name = name;
            }
            if let Some(description) = req.description {
                p.description = description;
            }
            if let Some(price) = req.price {
                p.price = price;
            }
            if let Some(stock) = req.stock {
                p.stock = stock;
            }
            if let Some(category) = req.category {
                p.category = category;
            }
            if let Some(image_url) = req.image_url {
                p.image_url = image_url;
            }
            if let Some(active) = req.is_active {
                p.is_active = active;
            }
            p.updated_at = Utc::now();
            p.clone()
        }))
    }

    async fn delete_product(&self, id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.lock();
        if tables.orders.iter().any(|o| o.product_id == id) {
            return Err(AppError::Conflict("product is referenced by orders".into()));
        }
        let before = tables.products.len();
        tables.products.retain(|p| p.id != id);
        Ok(tables.products.len() < before)
    }

    async fn set_product_active(
        &self,
        id: Uuid,
        is_active: bool,
    ) -> Result<Option<Product>, AppError> {
        let mut tables = self.lock();
        Ok(tables.products.iter_mut().find(|p| p.id == id).map(|p| {
            p.is_active = is_active;
            p.clone()
        }))
    }

    async fn adjust_stock(&self, id: Uuid, delta: i32) -> Result<Product, AppError> {
        let mut tables = self.lock();
        let product = tables
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(AppError::NotFound("Product"))?;
        match product.stock.checked_add(delta).filter(|stock| *stock >= 0) {
            Some(stock) => {
                product.stock = stock;
                Ok(product.clone())
            }
            None => Err(stock_out_of_range(product.stock, delta)),
        }
    }

    async fn list_orders(&self, filter: OrderFilter) -> Result<Vec<OrderDetails>, AppError> {
        let tables = self.lock();
        Ok(tables
            .orders
            .iter()
            .rev()
            .filter(|o| filter.status.is_none_or(|s| o.status == s))
            .filter(|o| filter.user_id.is_none_or(|u| o.user_id == u))
            .map(|o| details(&tables, o))
            .collect())
    }

    async fn recent_orders(&self, limit: i64) -> Result<Vec<OrderDetails>, AppError> {
        let tables = self.lock();
        Ok(tables
            .orders
            .iter()
            .rev()
            .take(limit as usize)
            .map(|o| details(&tables, o))
            .collect())
    }

    async fn count_orders_for_user(&self, user_id: Uuid) -> Result<i64, AppError> {
        Ok(self
            .lock()
            .orders
            .iter()
            .filter(|o| o.user_id == user_id)
            .count() as i64)
    }

    async fn update_order_status(
        &self,
        id: Uuid,
        status: OrderStatus,
    ) -> Result<Option<Order>, AppError> {
        let mut tables = self.lock();
        let Some(index) = tables.orders.iter().position(|o| o.id == id) else {
            return Ok(None);
        };
        let order = tables.orders[index].clone();
        let was_cancelled = order.status == OrderStatus::Cancelled;
        let now_cancelled = status == OrderStatus::Cancelled;

        if let Some(product) = tables.products.iter_mut().find(|p| p.id == order.product_id) {
            if was_cancelled && !now_cancelled {
                if product.stock < order.quantity {
                    return Err(AppError::OutOfStock);
                }
                product.stock -= order.quantity;
            } else if now_cancelled && !was_cancelled {
                product.stock += order.quantity;
            }
        }

        tables.orders[index].status = status;
        Ok(Some(tables.orders[index].clone()))
    }

    async fn place_order(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Order, AppError> {
        let mut tables = self.lock();

        let profile = tables
            .profiles
            .iter()
            .find(|p| p.id == user_id)
            .ok_or(AppError::NotFound("Profile"))?;
        let limits = OrderLimits::from(profile);
        let placed = tables.orders.iter().filter(|o| o.user_id == user_id).count() as i64;
        eligibility::check(limits, placed, now).into_result()?;

        let product = tables
            .products
            .iter_mut()
            .find(|p| p.id == product_id && p.is_active)
            .ok_or(AppError::NotFound("Product"))?;
        if product.stock <= 0 {
            return Err(AppError::OutOfStock);
        }
        product.stock -= 1;

        let order = Order {
            id: Uuid::new_v4(),
            user_id,
            product_id,
            quantity: 1,
            total_price: product.price,
            status: OrderStatus::Pending,
            created_at: now,
        };
        tables.orders.push(order.clone());
        Ok(order)
    }

    async fn cancel_order(&self, order_id: Uuid, user_id: Uuid) -> Result<Order, AppError> {
        let mut tables = self.lock();
        let order = tables
            .orders
            .iter_mut()
            .find(|o| o.id == order_id && o.user_id == user_id)
            .ok_or(AppError::NotFound("Order"))?;
        if order.status != OrderStatus::Pending {
            return Err(AppError::Conflict(
                "only pending orders can be cancelled".into(),
            ));
        }
        order.status = OrderStatus::Cancelled;
        let cancelled = order.clone();

        if let Some(product) = tables
            .products
            .iter_mut()
            .find(|p| p.id == cancelled.product_id)
        {
            product.stock += cancelled.quantity;
        }
        Ok(cancelled)
    }

    async fn admin_stats(&self) -> Result<AdminDashboardStats, AppError> {
        let tables = self.lock();
        Ok(AdminDashboardStats {
            total_products: tables.products.len() as i64,
            total_orders: tables.orders.len() as i64,
            pending_orders: tables
                .orders
                .iter()
                .filter(|o| o.status == OrderStatus::Pending)
                .count() as i64,
            low_stock_products: tables
                .products
                .iter()
                .filter(|p| p.is_active && p.stock < LOW_STOCK_THRESHOLD)
                .count() as i64,
        })
    }

    async fn super_admin_stats(&self) -> Result<SuperAdminDashboardStats, AppError> {
        let tables = self.lock();
        Ok(SuperAdminDashboardStats {
            total_users: tables.profiles.len() as i64,
            total_staff: tables.profiles.iter().filter(|p| p.role.is_staff()).count() as i64,
            total_products: tables.products.len() as i64,
            total_orders: tables.orders.len() as i64,
        })
    }

    async fn get_settings(&self) -> Result<SystemSettings, AppError> {
        Ok(self.lock().settings.clone())
    }

    async fn update_settings(&self, settings: SystemSettings) -> Result<SystemSettings, AppError> {
        self.lock().settings = settings.clone();
        Ok(settings)
    }
}

// --- STATE SCAFFOLDING ---

pub struct TestContext {
    pub repo: Arc<MemoryRepository>,
    pub state: AppState,
}

/// Local-env state over a fresh `MemoryRepository`, mock identity and mock storage.
pub fn test_context() -> TestContext {
    test_context_with(MockIdentityProvider::new(&AppConfig::default().jwt_secret))
}

pub fn test_context_with(identity: MockIdentityProvider) -> TestContext {
    let repo = Arc::new(MemoryRepository::new());
    let state = AppState {
        repo: repo.clone() as RepositoryState,
        identity: Arc::new(identity) as IdentityState,
        storage: Arc::new(MockStorageService::new()) as StorageState,
        config: AppConfig::default(),
    };
    TestContext { repo, state }
}

pub fn as_auth(profile: &Profile) -> AuthUser {
    AuthUser::from(profile.clone())
}
