//! Common test utilities for service integration tests.

use librarian_service::config::{
    ChunkConfig, CrawlerConfig, GoogleConfig, HoldsConfig, LibrarianConfig, LimitConfig,
    ModelConfig, MongoConfig, WorkerConfig,
};
use librarian_service::services::providers::mock::MockContentProvider;
use librarian_service::services::providers::ContentProvider;
use librarian_service::startup::Application;
use std::sync::Arc;
use uuid::Uuid;

pub struct TestApp {
    pub address: String,
    /// Direct database handle for seeding state the API cannot create.
    #[allow(dead_code)]
    pub db: librarian_service::services::LibrarianDb,
    pub client: reqwest::Client,
}

/// Build a config pointed at a throwaway database on a random port.
pub fn test_config() -> LibrarianConfig {
    LibrarianConfig {
        common: librarian_core::config::Config { port: 0 },
        mongodb: MongoConfig {
            uri: std::env::var("TEST_MONGODB_URI")
                .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            database: format!("librarian_test_{}", Uuid::new_v4().simple()),
        },
        google: GoogleConfig {
            api_key: String::new(),
        },
        models: ModelConfig {
            text_model: "test-text-model".to_string(),
            vision_model: "test-vision-model".to_string(),
        },
        limits: LimitConfig {
            max_image_bytes: 5 * 1024 * 1024,
            max_csv_bytes: 25 * 1024 * 1024,
            max_text_chars: 1000,
            rate_limit_requests: 1000,
            rate_limit_window_secs: 900,
        },
        chunking: ChunkConfig {
            chunk_size: 3,
            ttl_secs: 3600,
        },
        holds: HoldsConfig {
            record_id_column: 0,
            title_column: 1,
            holds_column: 2,
            date_column: 3,
            holds_delimiter: ';',
            date_format: "%m-%d-%Y".to_string(),
        },
        crawler: CrawlerConfig {
            feed_url: "http://localhost:1/feed/1.json".to_string(),
            type_filter: vec!["madsrdf:Authority".to_string()],
            record_suffix: ".madsxml.xml".to_string(),
            page_delay_ms: 0,
            max_pages: 1,
        },
        worker: WorkerConfig {
            enabled: false,
            worker_count: 1,
            queue_size: 4,
        },
    }
}

/// Spawn the application with the mock provider on a random port.
pub async fn spawn_app() -> TestApp {
    spawn_app_with_provider(Arc::new(MockContentProvider::new(true))).await
}

pub async fn spawn_app_with_provider(provider: Arc<dyn ContentProvider>) -> TestApp {
    // Idempotent across tests in one process.
    librarian_service::services::metrics::init_metrics();

    let config = test_config();

    let app = Application::build(config, Some(provider))
        .await
        .expect("Failed to build application");

    let db = app.db().clone();
    let address = format!("http://127.0.0.1:{}", app.port());

    tokio::spawn(app.run_until_stopped());

    TestApp {
        address,
        db,
        client: reqwest::Client::new(),
    }
}
