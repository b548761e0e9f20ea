//! Reading List
//!
//! Serves a crowdsourced reading list: visitors browse approved book
//! recommendations and submit new ones, which stay hidden until a moderator
//! approves them.

mod api;
mod config;
mod db;
mod errors;
mod models;
mod render;
mod store;
mod view;

use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use api::SessionRegistry;
use config::Config;
use db::{ChangeWatcher, Repository};
use store::RecommendationTable;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub table: Arc<dyn RecommendationTable>,
    pub sessions: Arc<SessionRegistry>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Reading List");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Table: {}", config.table);
    tracing::info!("Bind address: {}", config.bind_addr);
    tracing::info!("Idle session timeout: {:?}", config.session_idle);

    // Initialize database
    let pool = if config.auto_migrate {
        db::init_database(&config.db_path, &config.table).await?
    } else {
        tracing::info!("Automatic migrations disabled");
        db::init_pool(&config.db_path).await?
    };
    let repo = Repository::new(pool, config.table.clone());

    match repo.fetch_all().await {
        Ok(rows) => {
            let pending = rows.iter().filter(|r| !r.approved).count();
            tracing::info!(
                "Table holds {} recommendations, {} awaiting approval",
                rows.len(),
                pending
            );
        }
        // Views fall back to sample data; keep serving.
        Err(e) => tracing::error!("Reading list table unavailable: {}", e),
    }

    let watcher = ChangeWatcher::new(repo.clone(), config.poll_interval).spawn();

    // Create application state
    let state = AppState {
        table: Arc::new(repo),
        sessions: Arc::new(SessionRegistry::default()),
    };
    let sessions = state.sessions.clone();
    let reaper = sessions.spawn_reaper(config.session_idle);

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutting down");
    reaper.abort();
    sessions.clear().await;
    watcher.abort();

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API routes
    let api_routes = Router::new()
        // Direct reads
        .route("/recommendations", get(api::list_recommendations))
        // Sessions
        .route("/sessions", post(api::create_session))
        .route(
            "/sessions/{id}",
            get(api::get_session).delete(api::delete_session),
        )
        .route("/sessions/{id}/search", put(api::update_search))
        .route("/sessions/{id}/form", put(api::update_form))
        .route("/sessions/{id}/submit", post(api::submit_form))
        .route("/sessions/{id}/refresh", post(api::refresh_session))
        .route(
            "/sessions/{id}/alert",
            axum::routing::delete(api::dismiss_alert),
        )
        .route(
            "/sessions/{id}/modal",
            post(api::open_modal).delete(api::close_modal),
        )
        .route("/sessions/{id}/modal/click", post(api::click_modal));

    // Pages and health check
    let page_routes = Router::new()
        .route("/", get(api::index))
        .route("/sessions/{id}", get(api::session_page))
        .route("/sessions/{id}/submit", post(api::submit_page))
        .route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(page_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
