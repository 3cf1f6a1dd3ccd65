//! Course Recommender Backend - library for app logic and testing

pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod routes;
pub mod services;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    middleware,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::json;
use std::{net::SocketAddr, sync::Arc};
use tokio::signal;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::db::{postgres::PgStore, DbConfig};
use crate::error::StartupError;
use crate::state::AppState;

const DEFAULT_ORIGINS: [&str; 2] = ["http://localhost:8080", "http://127.0.0.1:8080"];

/// Configure CORS from environment variables.
/// Uses ALLOWED_ORIGINS (comma-separated) or FRONTEND_ORIGIN, else the SPA dev server.
pub fn configure_cors() -> CorsLayer {
    let allowed_origins = std::env::var("ALLOWED_ORIGINS")
        .ok()
        .map(|s| parse_origins(&s))
        .filter(|origins| !origins.is_empty())
        .or_else(|| {
            std::env::var("FRONTEND_ORIGIN")
                .ok()
                .map(|s| parse_origins(&s))
                .filter(|origins| !origins.is_empty())
        })
        .unwrap_or_else(|| parse_origins(&DEFAULT_ORIGINS.join(",")));

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
        ])
        .allow_credentials(true)
}

fn parse_origins(raw: &str) -> Vec<HeaderValue> {
    raw.split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect()
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "message": "Course recommendation API is running"
    }))
}

fn api_routes() -> Router<AppState> {
    use routes::{auth, history, profile, resource};

    let user = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/verify", post(auth::verify_token));

    let profile = Router::new()
        .route(
            "/{email}",
            get(profile::get_profile).put(profile::update_profile),
        )
        .route("/password/{email}", put(profile::update_password));

    let resource = Router::new()
        .route("/addresource", post(resource::add_resource))
        .route("/bulk", post(resource::bulk_resources))
        .route("/getresource", post(resource::get_resource))
        .route("/topics", get(resource::list_topics))
        .route("/topic/{topic}", get(resource::resources_by_topic));

    let history = Router::new()
        .route("/addhistory", post(history::add_history))
        .route("/user/{email}", get(history::list_history))
        .route("/{id}", delete(history::delete_history));

    Router::new()
        .nest("/user", user)
        .nest("/profile", profile)
        .nest("/resource", resource)
        .nest("/history", history)
}

/// Create and configure the application router.
pub fn create_app(state: AppState) -> Router {
    let body_limit = state.config.body_limit_bytes;
    let cors = configure_cors();

    Router::new()
        .route("/", get(root))
        .route("/health", get(routes::health::health_ping))
        .route("/health/ready", get(routes::health::health_ready))
        .nest("/api/v1", api_routes())
        .with_state(state)
        .layer(logging::middleware::propagate_request_id_layer())
        .layer(middleware::from_fn(logging::middleware::log_request))
        .layer(logging::middleware::request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(cors)
}

/// Run the server (used by main).
pub async fn run() -> Result<(), StartupError> {
    dotenvy::dotenv().ok();

    let _log_guards = logging::init(&logging::LogConfig::from_env());
    routes::health::init_start_time();

    let config = AppConfig::from_env();
    if config.is_production() && config.uses_default_secret() {
        tracing::error!("JWT_SECRET must be set to a unique value in production");
        return Err(StartupError::InsecureSecret);
    }
    if config.uses_default_secret() {
        tracing::warn!("using the default JWT secret; set JWT_SECRET before deploying");
    }

    let db_config = DbConfig::default();
    let pool = db::init_pool(&db_config)
        .await
        .map_err(StartupError::Database)?;
    db::run_migrations(&pool)
        .await
        .map_err(StartupError::Migration)?;

    let address = config.bind_address();
    let state = AppState::new(Arc::new(PgStore::new(pool)), config);
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind {
            address: address.clone(),
            source,
        })?;
    tracing::info!("Server listening on {}", address);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(StartupError::Serve)?;

    tracing::info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => tracing::info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                tracing::info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("Failed to install terminate handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
