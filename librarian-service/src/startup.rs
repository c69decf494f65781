//! Application startup and lifecycle management.

use crate::config::LibrarianConfig;
use crate::crawler::AuthoritiesCrawler;
use crate::handlers::{analyze, chunks, crawl, cutter, health, mads};
use crate::services::providers::gemini::{GeminiConfig, GeminiProvider};
use crate::services::providers::ContentProvider;
use crate::services::LibrarianDb;
use crate::workers::{CrawlJob, WorkerOrchestrator};
use axum::{
    extract::{DefaultBodyLimit, MatchedPath, Request},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use librarian_core::error::AppError;
use librarian_core::middleware::rate_limit::{create_ip_rate_limiter, ip_rate_limit_middleware};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

async fn track_requests(request: Request, next: Next) -> Response {
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;
    crate::services::metrics::record_http_request(&route, response.status().as_u16());
    response
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: LibrarianConfig,
    pub db: LibrarianDb,
    pub provider: Arc<dyn ContentProvider>,
    pub job_tx: mpsc::Sender<CrawlJob>,
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
    orchestrator: WorkerOrchestrator,
}

impl Application {
    /// Build the application with the given configuration.
    ///
    /// An explicit provider can be injected for tests; `None` wires up the
    /// Gemini backend from configuration.
    pub async fn build(
        config: LibrarianConfig,
        provider: Option<Arc<dyn ContentProvider>>,
    ) -> Result<Self, AppError> {
        let db = LibrarianDb::connect(&config.mongodb.uri, &config.mongodb.database)
            .await
            .map_err(|e| {
                tracing::error!("Failed to connect to MongoDB: {}", e);
                e
            })?;

        db.initialize_indexes().await.map_err(|e| {
            tracing::error!("Failed to initialize database indexes: {}", e);
            e
        })?;

        let provider: Arc<dyn ContentProvider> = match provider {
            Some(p) => p,
            None => {
                let gemini_config = GeminiConfig {
                    api_key: config.google.api_key.clone(),
                    text_model: config.models.text_model.clone(),
                    vision_model: config.models.vision_model.clone(),
                };
                tracing::info!(
                    text_model = %config.models.text_model,
                    vision_model = %config.models.vision_model,
                    "Initialized Gemini provider"
                );
                Arc::new(GeminiProvider::new(gemini_config))
            }
        };

        let crawler = Arc::new(AuthoritiesCrawler::new(config.crawler.clone(), db.clone()));
        let (orchestrator, job_tx) = WorkerOrchestrator::new(config.worker.clone(), crawler);

        let state = AppState {
            config: config.clone(),
            db,
            provider,
            job_tx,
        };

        // Port 0 binds a random port for tests.
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Librarian service listening on port {}", port);

        Ok(Self {
            port,
            listener,
            state,
            orchestrator,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Get a reference to the database.
    pub fn db(&self) -> &LibrarianDb {
        &self.state.db
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let state = self.state;

        let analyze_limiter = create_ip_rate_limiter(
            state.config.limits.rate_limit_requests,
            state.config.limits.rate_limit_window_secs,
        );

        let analyze_routes = Router::new()
            .route("/analyze", post(analyze::analyze))
            .layer(middleware::from_fn_with_state(
                analyze_limiter,
                ip_rate_limit_middleware,
            ))
            .layer(DefaultBodyLimit::max(
                state.config.limits.max_image_bytes + 64 * 1024,
            ));

        let csv_routes = Router::new()
            .route("/csv/split", post(chunks::split_csv))
            .layer(DefaultBodyLimit::max(
                state.config.limits.max_csv_bytes + 64 * 1024,
            ));

        let router = Router::new()
            .route("/health", get(health::health_check))
            .route("/ready", get(health::readiness_check))
            .route("/metrics", get(health::metrics_handler))
            .merge(analyze_routes)
            .merge(csv_routes)
            .route("/mads/entry", post(mads::upsert_entry))
            .route("/mads/entry/check", post(mads::check_entry))
            .route("/mads/entries", post(mads::upsert_entries))
            .route("/mads/entries/check", post(mads::check_entries))
            .route("/chunks/:id", get(chunks::download_chunk))
            .route("/chunks/clear", post(chunks::clear_chunks))
            .route("/crawl", post(crawl::enqueue_crawl))
            .route("/cutter", post(cutter::make_cutter))
            .layer(TraceLayer::new_for_http())
            .layer(middleware::from_fn(track_requests))
            .layer(CorsLayer::permissive())
            .with_state(state);

        self.orchestrator.start().await;

        axum::serve(
            self.listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
    }
}
