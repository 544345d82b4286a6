//! # Server Setup
//!
//! Server initialization, route registration, and HTTP server startup.
//!
//! [`start_server`] wires logging, configuration, the SQLite pool and the
//! `accesstoken` backend, then serves [`create_router`].

// region: --- Imports
use crate::auth::AuthBackend;
use crate::handlers;
use crate::middleware::{log_requests, map_res, stamp_req, RequestStamp};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use lib_core::model::manager::{LoggingUserHooks, UserHooks};
use lib_core::{create_db_and_tables, create_pool, Config, DbPool};
use lib_utils::get_env;
use std::sync::Arc;
use tower_cookies::CookieManagerLayer;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
// endregion: --- Imports

// region: --- AppState
/// Application state shared across all routes
#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: Config,
    pub backend: Arc<AuthBackend>,
    pub hooks: Arc<dyn UserHooks>,
}

impl AppState {
    /// State with the `accesstoken` cookie backend.
    pub fn new(db: DbPool, config: Config, hooks: Arc<dyn UserHooks>) -> Self {
        let backend = Arc::new(AuthBackend::access_token_cookie(config.cookie_secure));
        Self {
            db,
            config,
            backend,
            hooks,
        }
    }
}

impl axum::extract::FromRef<AppState> for DbPool {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}

impl axum::extract::FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl axum::extract::FromRef<AppState> for Arc<AuthBackend> {
    fn from_ref(state: &AppState) -> Self {
        state.backend.clone()
    }
}

impl axum::extract::FromRef<AppState> for Arc<dyn UserHooks> {
    fn from_ref(state: &AppState) -> Self {
        state.hooks.clone()
    }
}
// endregion: --- AppState

// region: --- Server Configuration
/// Server configuration
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1:8000")
    pub bind_address: String,
    /// Allowed CORS origins
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8000".to_string(),
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
                "http://localhost:8080".to_string(),
                "http://127.0.0.1:8080".to_string(),
            ],
        }
    }
}

impl ServerConfig {
    /// Defaults, overridden by `BIND_ADDRESS` and `CORS_ORIGINS` (comma separated).
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(bind_address) = get_env("BIND_ADDRESS") {
            config.bind_address = bind_address;
        }

        if let Ok(origins) = get_env("CORS_ORIGINS") {
            config.allowed_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect();
        }

        config
    }
}
// endregion: --- Server Configuration

// region: --- Server Setup
/// Initialize and start the HTTP server
///
/// # Errors
///
/// This function will return an error if:
/// - Configuration loading or validation fails
/// - Database connection fails
/// - Table creation fails
/// - Server binding fails
pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let log_level = std::env::var("LOG_LEVEL")
        .unwrap_or_else(|_| "info".to_string())
        .to_lowercase();

    let filter = match log_level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => tracing_subscriber::EnvFilter::new(&log_level),
        _ => tracing_subscriber::EnvFilter::new("info"),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!(" USERAUTH BACKEND STARTING");
    info!(" Log level: {}", log_level);

    info!("Loading configuration...");
    let app_config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;
    app_config.validate().map_err(|e| anyhow::anyhow!(e))?;

    if app_config.uses_weak_secret() {
        warn!(" AUTH_SECRET is the placeholder or shorter than 32 characters. Set a strong secret in production.");
    }
    if !app_config.cookie_secure {
        warn!(" COOKIE_SECURE=false: the session cookie will be sent over plain HTTP");
    }

    info!("Database URL: {}", app_config.database_url);
    ensure_sqlite_parent_dir(&app_config.database_url)?;

    info!("Connecting to database...");
    let pool = create_pool(&app_config.database_url).await?;
    create_db_and_tables(&pool).await?;

    let hooks: Arc<dyn UserHooks> = Arc::new(LoggingUserHooks);
    let state = AppState::new(pool, app_config, hooks);

    let app = create_router(state, config.allowed_origins.clone());

    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;

    info!(" SERVER READY: http://{}", config.bind_address);
    log_server_info();

    axum::serve(listener, app).await?;
    Ok(())
}

/// Create the directory holding a file-backed SQLite database.
fn ensure_sqlite_parent_dir(database_url: &str) -> anyhow::Result<()> {
    let Some(rest) = database_url.strip_prefix("sqlite:") else {
        return Ok(());
    };
    let db_path = rest.trim_start_matches("//").split('?').next().unwrap_or_default();

    if db_path.is_empty() || db_path.starts_with(":memory:") {
        return Ok(());
    }

    if let Some(parent) = std::path::Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
            info!("Created database directory: {:?}", parent);
        }
    }
    info!("Database file will be at: {}", db_path);
    Ok(())
}

/// Create the main application router with all routes
pub fn create_router(state: AppState, allowed_origins: Vec<String>) -> Router {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    // Credentialed CORS: the browser must be allowed to send the session cookie
    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    info!("[ROUTE SETUP] Registering HTTP routes...");
    Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/cookie/login", post(handlers::auth::login))
        .route("/auth/cookie/logout", post(handlers::auth::logout))
        .route("/auth/forgot-password", post(handlers::auth::forgot_password))
        .route("/auth/reset-password", post(handlers::auth::reset_password))
        .route("/auth/request-verify-token", post(handlers::auth::request_verify_token))
        .route("/auth/verify", post(handlers::auth::verify))
        .route("/users/me", get(handlers::users::me).patch(handlers::users::update_me))
        .route(
            "/users/{id}",
            get(handlers::users::get_user)
                .patch(handlers::users::update_user)
                .delete(handlers::users::delete_user),
        )
        .route("/authenticated-route", get(handlers::users::authenticated_route))
        .route("/health", get(|| async { "OK" }))
        .fallback(|| async {
            info!("[404 HANDLER] Unmatched route - returning 404");
            (axum::http::StatusCode::NOT_FOUND, "Route not found")
        })
        .with_state(state)
        .layer(CookieManagerLayer::new())
        .layer(axum::middleware::from_fn(map_res))
        .layer(axum::middleware::from_fn(log_requests))
        // Tower HTTP trace layer for spans
        .layer(
            tower_http::trace::TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    let request_id = request
                        .extensions()
                        .get::<RequestStamp>()
                        .map(|s| s.id.clone())
                        .unwrap_or_else(|| "unknown".to_string());
                    tracing::info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = %request.method(),
                        path = %request.uri().path(),
                        version = ?request.version(),
                    )
                })
                .on_failure(|error: tower_http::classify::ServerErrorsFailureClass, latency: std::time::Duration, _span: &tracing::Span| {
                    tracing::error!(
                        error = ?error,
                        latency_ms = latency.as_millis(),
                        "[HTTP FAILURE] Error: {:?}, Latency: {}ms",
                        error,
                        latency.as_millis()
                    );
                }),
        )
        // Outermost: the stamp is visible to every layer above
        .layer(axum::middleware::from_fn(stamp_req))
        .layer(cors)
}

/// Log server information
fn log_server_info() {
    info!(" AUTH:");
    info!("   • POST /auth/register");
    info!("   • POST /auth/cookie/login");
    info!("   • POST /auth/cookie/logout");
    info!("   • POST /auth/forgot-password");
    info!("   • POST /auth/reset-password");
    info!("   • POST /auth/request-verify-token");
    info!("   • POST /auth/verify");
    info!(" USERS:");
    info!("   • GET|PATCH        /users/me");
    info!("   • GET|PATCH|DELETE /users/{{id}} (superuser)");
    info!("   • GET              /authenticated-route");
    info!(" HEALTH:");
    info!("   • GET  /health");
}
// endregion: --- Server Setup
