use crate::config::Config;
use anyhow::{Context, Result};
use axum::{
    http::{header, Method, StatusCode},
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use marquee_db::pool::DbPool;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

pub mod auth;
pub mod error;
pub mod routes_movies;

pub use auth::SessionStore;

/// Interval between sweeps of expired admin sessions.
const SESSION_CLEANUP_SECS: u64 = 300;

/// Shared application context
#[derive(Clone)]
pub struct AppContext {
    /// Database connection pool
    pub db: DbPool,
    pub config: Arc<Config>,
    /// Live admin sessions
    pub sessions: SessionStore,
}

impl AppContext {
    pub fn new(config: Config, db: DbPool) -> Self {
        let sessions = SessionStore::new(config.auth.session_timeout_hours);
        Self {
            db,
            config: Arc::new(config),
            sessions,
        }
    }
}

/// Create the Axum router with all routes
pub fn create_router(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let static_dir = ctx.config.server.static_dir.clone();

    let app = Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/api", api_routes(&ctx))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx);

    match static_dir {
        Some(dir) => with_static_files(app, dir),
        None => app,
    }
}

/// Serve a built web client for everything the API does not handle, falling
/// back to `index.html` for client-side routes.
fn with_static_files(app: Router, dir: PathBuf) -> Router {
    if !dir.exists() {
        tracing::warn!(path = %dir.display(), "Static directory does not exist, not serving it");
        return app;
    }

    tracing::info!(path = %dir.display(), "Serving static files");
    let index_path = dir.join("index.html");
    app.fallback_service(
        ServeDir::new(&dir)
            .append_index_html_on_directories(true)
            .not_found_service(ServeFile::new(index_path)),
    )
}

fn api_routes(ctx: &AppContext) -> Router<AppContext> {
    // Login and session lookup are always reachable.
    let admin_session_routes = Router::new()
        .route("/admin/login", post(auth::login))
        .route("/admin/logout", post(auth::logout))
        .route("/admin/session", get(auth::session_status));

    let protected_routes = routes_movies::admin_routes().layer(middleware::from_fn_with_state(
        ctx.clone(),
        auth::require_admin,
    ));

    routes_movies::catalog_routes()
        .merge(admin_session_routes)
        .merge(protected_routes)
}

async fn root() -> &'static str {
    "Streaming Movie App API"
}

async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}

/// Start the HTTP server and run until a shutdown signal arrives.
pub async fn start_server(config: Config, db: DbPool) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    if !config.auth.require_admin_session {
        tracing::warn!("Admin session guard is disabled; catalog writes are open to anyone");
    }

    let ctx = AppContext::new(config, db);
    let cleanup = auth::start_cleanup_task(ctx.sessions.clone(), SESSION_CLEANUP_SECS);
    let app = create_router(ctx);

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cleanup.abort();
    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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

    tracing::info!("Shutdown signal received");
}
