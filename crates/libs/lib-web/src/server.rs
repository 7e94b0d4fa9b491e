//! # Server Setup
//!
//! Server initialization, route registration, and HTTP server startup.
//!
//! [`start_server`] loads configuration, opens and migrates the database,
//! wires the orchestration dispatcher, and serves the router built by
//! [`create_router`].

// region: --- Imports
use crate::handlers::{files, messages, models, sessions};
use crate::middleware::{log_requests, map_res, require_auth, stamp_req};
use axum::extract::{DefaultBodyLimit, FromRef};
use axum::http::{header, HeaderValue, Method};
use axum::{
    routing::{get, post},
    Router,
};
use lib_ai::{build_orchestrator, AiConfig, Dispatcher};
use lib_core::{create_pool, AppError, Config, DbPool, MIGRATOR};
use lib_utils::get_env_or;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;
// endregion: --- Imports

// region: --- AppState
/// Application state shared across all routes
#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: Config,
    pub dispatcher: Arc<Dispatcher>,
}

impl FromRef<AppState> for DbPool {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for Arc<Dispatcher> {
    fn from_ref(state: &AppState) -> Self {
        state.dispatcher.clone()
    }
}
// endregion: --- AppState

// region: --- Server Configuration
/// Server configuration
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1:3001")
    pub bind_address: String,
    /// Allowed CORS origins
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:3001".to_string(),
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
                "http://localhost:5173".to_string(),
                "http://127.0.0.1:5173".to_string(),
            ],
        }
    }
}

impl ServerConfig {
    /// Read `BIND_ADDRESS` and `ALLOWED_ORIGINS` (comma separated), falling back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let bind_address = get_env_or("BIND_ADDRESS", &defaults.bind_address);

        let allowed_origins = std::env::var("ALLOWED_ORIGINS")
            .ok()
            .map(|raw| {
                raw.split(',')
                    .map(|origin| origin.trim().to_string())
                    .filter(|origin| !origin.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|origins| !origins.is_empty())
            .unwrap_or(defaults.allowed_origins);

        Self {
            bind_address,
            allowed_origins,
        }
    }
}
// endregion: --- Server Configuration

// region: --- Server Setup
fn init_tracing() -> String {
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
        .with_thread_ids(true)
        .with_line_number(true)
        .with_file(true)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        tracing::warn!("Global tracing subscriber already set");
    }

    log_level
}

/// Initialize and start the HTTP server
///
/// # Errors
///
/// Fails if configuration is invalid, the database cannot be opened or
/// migrated, or the listener cannot bind.
pub async fn start_server(server_config: ServerConfig) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let log_level = init_tracing();

    info!(" ECOBOT BACKEND STARTING");
    info!(" Log level: {}", log_level);

    info!("Loading configuration...");
    let app_config = Config::load()?;
    let ai_config = AiConfig::from_env().map_err(AppError::Config)?;

    info!("Database URL: {}", app_config.database_url);

    if let Some(db_path) = app_config.database_url.strip_prefix("sqlite:") {
        if let Some(parent) = std::path::Path::new(db_path).parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
                info!("Created database directory: {:?}", parent);
            }
        }
    }

    info!("Connecting to database...");
    let pool = create_pool(&app_config.database_url).await?;

    info!(" Running database migrations");
    MIGRATOR.run(&pool).await?;
    info!(" Migrations complete");

    let orchestrator = build_orchestrator(pool.clone(), &app_config, &ai_config)
        .map_err(|e| anyhow::anyhow!(e))?;
    info!(
        " Orchestrator ready (remote agent: {})",
        if ai_config.use_remote_agent { "enabled" } else { "disabled" }
    );

    let state = AppState {
        db: pool,
        config: app_config,
        dispatcher: Arc::new(Dispatcher::new(Arc::new(orchestrator))),
    };

    let app = create_router(state, &server_config.allowed_origins);

    let listener = tokio::net::TcpListener::bind(&server_config.bind_address).await?;

    info!(" SERVER READY: http://{}", server_config.bind_address);
    log_server_info();

    axum::serve(listener, app).await?;
    Ok(())
}

/// Create the application router with all routes and middleware
pub fn create_router(state: AppState, allowed_origins: &[String]) -> Router {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .expose_headers([header::HeaderName::from_static("x-request-id")]);

    info!("[ROUTE SETUP] Registering HTTP routes...");

    let protected = Router::new()
        .route("/api/sessions", post(sessions::create_session).get(sessions::list_sessions))
        .route("/api/sessions/{id}", get(sessions::get_session))
        .route(
            "/api/sessions/{id}/messages",
            post(messages::send_message).get(messages::list_messages),
        )
        .route("/api/files/upload-url", post(files::create_upload_url))
        .route("/api/files/{id}/url", get(files::get_file_url))
        .route("/api/files/{id}/metadata", get(files::get_file_metadata))
        .route("/api/models", get(models::list_models))
        .route_layer(axum::middleware::from_fn_with_state(state.clone(), require_auth));

    let public = Router::new()
        .route("/api/files/upload/{token}", post(files::upload_file))
        .route("/api/files/{id}", get(files::download_file))
        .route("/health", get(models::health));

    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .merge(protected)
        .merge(public)
        .fallback(|| async {
            info!("[404 HANDLER] Unmatched route - returning 404");
            axum::http::StatusCode::NOT_FOUND
        })
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(axum::middleware::from_fn(map_res))
        .layer(axum::middleware::from_fn(log_requests))
        .layer(
            tower_http::trace::TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    let request_id = request
                        .extensions()
                        .get::<crate::middleware::RequestStamp>()
                        .map(|s| s.id.clone())
                        .unwrap_or_else(|| "unknown".to_string());
                    tracing::info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = %request.method(),
                        version = ?request.version(),
                    )
                })
                .on_failure(
                    |error: tower_http::classify::ServerErrorsFailureClass,
                     latency: std::time::Duration,
                     _span: &tracing::Span| {
                        tracing::error!(
                            latency_ms = latency.as_millis(),
                            "[HTTP FAILURE] Error: {:?}",
                            error
                        );
                    },
                ),
        )
        // Outermost so the id is set before logging and tracing run
        .layer(axum::middleware::from_fn(stamp_req))
        .layer(cors)
}

/// Log server information
fn log_server_info() {
    info!(" SESSIONS:");
    info!("   • POST /api/sessions");
    info!("   • GET  /api/sessions");
    info!("   • GET  /api/sessions/{{id}}");
    info!(" MESSAGES:");
    info!("   • POST /api/sessions/{{id}}/messages");
    info!("   • GET  /api/sessions/{{id}}/messages");
    info!(" FILES:");
    info!("   • POST /api/files/upload-url");
    info!("   • POST /api/files/upload/{{token}}");
    info!("   • GET  /api/files/{{id}}");
    info!("   • GET  /api/files/{{id}}/url");
    info!("   • GET  /api/files/{{id}}/metadata");
    info!(" MODELS:");
    info!("   • GET  /api/models");
    info!(" HEALTH:");
    info!("   • GET  /health");
}
// endregion: --- Server Setup
