//! SongDesk Web API Server
//!
//! Order intake for the song request form and the admin spreadsheet download.

mod handlers;

use axum::{
    http::{header::HeaderValue, Method},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use songdesk_compose::{SongComposer, StubComposer};
use songdesk_core::ServerConfig;
use songdesk_logs::{dir_order_log, LogEvent, SharedOrderLog};
use std::future::Future;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// API response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Counters fed from the order log's event channel
#[derive(Debug, Default)]
pub struct LogStats {
    logged: AtomicU64,
    failed: AtomicU64,
}

impl LogStats {
    pub fn logged(&self) -> u64 {
        self.logged.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    fn observe(&self, event: &LogEvent) {
        if event.is_failure() {
            self.failed.fetch_add(1, Ordering::Relaxed);
        } else {
            self.logged.fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    log: Arc<SharedOrderLog>,
    composer: Arc<dyn SongComposer>,
    stats: Arc<LogStats>,
}

impl AppState {
    pub fn new(log: SharedOrderLog, composer: Arc<dyn SongComposer>) -> Self {
        Self {
            log: Arc::new(log),
            composer,
            stats: Arc::new(LogStats::default()),
        }
    }

    /// State backed by the log directory and stub composer from `config`
    pub fn from_config(config: &ServerConfig) -> Self {
        let log = dir_order_log(config.log_dir.clone(), config.file_prefix.clone());
        let composer: Arc<dyn SongComposer> = Arc::new(StubComposer::new(config.api_key.clone()));
        Self::new(log, composer)
    }

    pub fn log(&self) -> &SharedOrderLog {
        &self.log
    }

    pub fn stats(&self) -> &LogStats {
        &self.stats
    }

    /// Count log events in [`LogStats`] until the log is dropped
    pub fn watch_log_events(&self) -> JoinHandle<()> {
        let mut events = self.log.subscribe();
        let stats = self.stats.clone();

        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => stats.observe(&event),
                    Err(RecvError::Lagged(missed)) => {
                        warn!("Log event watcher lagged, {} events missed", missed);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }
}

/// Router settings beyond the shared state
#[derive(Debug, Clone, Default)]
pub struct RouterOptions {
    /// Single allowed CORS origin; any origin when unset
    pub cors_origin: Option<String>,
    /// Static frontend served for unmatched paths
    pub static_dir: Option<PathBuf>,
}

impl RouterOptions {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            cors_origin: config.cors_origin.clone(),
            static_dir: config.static_dir.clone(),
        }
    }
}

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    create_router_with_options(state, RouterOptions::default())
}

/// Create the API router with CORS and static frontend options
pub fn create_router_with_options(state: AppState, options: RouterOptions) -> Router {
    let mut router = Router::new()
        .route("/api/health", get(handlers::health_check))
        .route("/api/generate_song", post(handlers::generate_song))
        .route("/admin/download_excel", get(handlers::download_excel));

    if let Some(dir) = options.static_dir {
        let index = ServeFile::new(dir.join("index.html"));
        router = router.fallback_service(ServeDir::new(dir).fallback(index));
    }

    router
        .layer(cors_layer(options.cors_origin.as_deref()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    match origin.map(|o| (o, o.parse::<HeaderValue>())) {
        Some((_, Ok(value))) => cors.allow_origin(value),
        Some((raw, Err(_))) => {
            warn!("Invalid CORS origin {:?}, allowing any origin", raw);
            cors.allow_origin(Any)
        }
        None => cors.allow_origin(Any),
    }
}

/// Start the web server and run until `shutdown` resolves
pub async fn start_server<F>(config: &ServerConfig, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let state = AppState::from_config(config);
    let watcher = state.watch_log_events();
    let app = create_router_with_options(state, RouterOptions::from_config(config));

    info!(
        bind = %config.bind,
        log_dir = %config.log_dir.display(),
        "Starting SongDesk Web API"
    );

    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    watcher.abort();
    Ok(())
}
