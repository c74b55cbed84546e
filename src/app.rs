use std::sync::Arc;

use axum::http::Method;
use axum::routing::get;
use axum::Router;
use sqlx::SqlitePool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::HttpConfig;
use crate::errors::AppError;
use crate::jwt::JwtConfig;
use crate::routes::{health, roles, session};
use crate::store::{RoleStore, SqliteRoleStore};

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub store: Arc<dyn RoleStore>,
    pub jwt: Arc<JwtConfig>,
    pub http: Arc<HttpConfig>,
}

impl AppState {
    pub fn new(pool: SqlitePool, jwt: JwtConfig, http: HttpConfig) -> Self {
        Self {
            store: Arc::new(SqliteRoleStore::new(pool.clone())),
            pool,
            jwt: Arc::new(jwt),
            http: Arc::new(http),
        }
    }
}

/// Builds the router. Route base paths and the role base URI come from the
/// `HttpConfig` passed in here; nothing reads configuration at request time.
pub async fn create_app(pool: SqlitePool, http: HttpConfig) -> Result<Router, AppError> {
    let jwt_config = JwtConfig::from_env()?;
    let state = AppState::new(pool, jwt_config, http.clone());

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE, Method::OPTIONS])
        .allow_origin(Any)
        .allow_headers(Any);

    let role_routes = Router::new()
        .route("/", get(roles::list_roles).post(roles::create_role))
        .route(
            "/:id",
            get(roles::get_role)
                .patch(roles::patch_role)
                .delete(roles::delete_role),
        );

    let router = Router::new()
        .route("/health", get(health::health))
        .route("/session", get(session::get_session))
        .route(&http.routes.permissions, get(roles::list_permissions))
        .nest(&http.routes.roles, role_routes)
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    Ok(router)
}
