use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod config;
pub mod eligibility;
pub mod error;
pub mod guard;
pub mod handlers;
pub mod identity;
pub mod models;
pub mod repository;
pub mod storage;

pub mod routes;
use auth::AuthUser;
use routes::{admin, authenticated, public, super_admin, user};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use error::AppError;
pub use identity::{IdentityState, MockIdentityProvider, SupabaseIdentity};
pub use repository::{PostgresRepository, RepositoryState};
pub use storage::{MockStorageService, S3StorageClient, StorageState};

/// ApiDoc
///
/// OpenAPI document for every `#[utoipa::path]` handler, served at
/// `/api-docs/openapi.json` and rendered by Swagger UI.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::session::index, handlers::session::sign_up, handlers::session::sign_in,
        handlers::session::sign_out, handlers::session::get_session, handlers::session::dashboard,
        handlers::user::get_user_dashboard, handlers::user::get_eligibility,
        handlers::user::get_catalog, handlers::user::get_my_orders, handlers::user::place_order,
        handlers::user::cancel_order,
        handlers::admin::get_admin_dashboard, handlers::admin::list_products,
        handlers::admin::get_product, handlers::admin::create_product,
        handlers::admin::update_product, handlers::admin::delete_product,
        handlers::admin::set_product_active, handlers::admin::adjust_stock,
        handlers::admin::request_image_upload, handlers::admin::list_orders,
        handlers::admin::update_order_status, handlers::admin::list_users,
        handlers::admin::lookup_user, handlers::admin::update_user_limits,
        handlers::super_admin::get_super_admin_dashboard, handlers::super_admin::list_users,
        handlers::super_admin::update_user_role, handlers::super_admin::update_user_limits,
        handlers::super_admin::get_settings, handlers::super_admin::update_settings,
        handlers::super_admin::reset_settings
    ),
    components(
        schemas(
            models::Role, models::OrderStatus, models::Profile, models::Product, models::Order,
            models::OrderDetails, models::SystemSettings, models::SignUpRequest,
            models::SignInRequest, models::SessionResponse, models::CreateProductRequest,
            models::UpdateProductRequest, models::StockAdjustRequest, models::SetActiveRequest,
            models::PlaceOrderRequest, models::UpdateOrderStatusRequest,
            models::UpdateRoleRequest, models::UpdateLimitsRequest, models::ImageUploadRequest,
            models::ImageUploadResponse, models::EligibilityReport, models::CatalogProduct,
            models::UserDashboard, models::AdminDashboardStats, models::AdminDashboard,
            models::SuperAdminDashboardStats, models::SuperAdminDashboard,
        )
    ),
    tags(
        (name = "shop-dashboard", description = "Role-based e-commerce dashboard API")
    )
)]
struct ApiDoc;

/// AppState
///
/// Shared services, cloned into every request. Handlers take the whole state; extractors
/// pull single services through `FromRef`.
#[derive(Clone)]
pub struct AppState {
    pub repo: RepositoryState,
    /// Supabase Auth (sign-up, password sign-in, logout).
    pub identity: IdentityState,
    /// S3-compatible bucket for product images.
    pub storage: StorageState,
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for IdentityState {
    fn from_ref(app_state: &AppState) -> IdentityState {
        app_state.identity.clone()
    }
}

impl FromRef<AppState> for StorageState {
    fn from_ref(app_state: &AppState) -> StorageState {
        app_state.storage.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// require_session
///
/// Rejects the request with 401 unless `AuthUser` resolves.
async fn require_session(_auth_user: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles every router under the route guard, then the observability and CORS layers.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(
            authenticated::authenticated_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                require_session,
            )),
        )
        .nest("/user", user::user_routes())
        .nest("/admin", admin::admin_routes())
        .nest("/super-admin", super_admin::super_admin_routes())
        // Covers unmatched paths too, so `/admin/anything` still redirects.
        .layer(middleware::from_fn_with_state(
            state.clone(),
            guard::route_guard,
        ))
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// Request span carrying the `x-request-id` set by `SetRequestIdLayer`.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
