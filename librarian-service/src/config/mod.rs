use librarian_core::config::{self as core_config, get_env, is_prod};
use librarian_core::error::AppError;
use serde::Deserialize;

/// Maximum uploaded image size (5MB).
const DEFAULT_MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Maximum uploaded CSV size (25MB).
const DEFAULT_MAX_CSV_BYTES: usize = 25 * 1024 * 1024;

#[derive(Debug, Clone, Deserialize)]
pub struct LibrarianConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub mongodb: MongoConfig,
    pub google: GoogleConfig,
    pub models: ModelConfig,
    pub limits: LimitConfig,
    pub chunking: ChunkConfig,
    pub holds: HoldsConfig,
    pub crawler: CrawlerConfig,
    pub worker: WorkerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleConfig {
    pub api_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Model for text-only prompts (e.g. gemini-1.5-pro)
    pub text_model: String,
    /// Model for prompts carrying an image (e.g. gemini-1.5-flash)
    pub vision_model: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LimitConfig {
    pub max_image_bytes: usize,
    pub max_csv_bytes: usize,
    pub max_text_chars: usize,
    pub rate_limit_requests: u32,
    pub rate_limit_window_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChunkConfig {
    /// Data rows per stored chunk.
    pub chunk_size: usize,
    /// Chunk lifetime before the TTL monitor removes it.
    pub ttl_secs: i64,
}

/// Column mapping for the holds CSV export.
///
/// The export format was never stabilized upstream, so every layout detail is
/// explicit configuration rather than baked into the parser.
#[derive(Debug, Clone, Deserialize)]
pub struct HoldsConfig {
    pub record_id_column: usize,
    pub title_column: usize,
    pub holds_column: usize,
    pub date_column: usize,
    pub holds_delimiter: char,
    /// chrono format string for the date column, e.g. "%m-%d-%Y"
    pub date_format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    pub feed_url: String,
    /// Activity object type tags that select a record for fetching.
    pub type_filter: Vec<String>,
    /// Suffix appended to an entry URL to reach its MADS XML document.
    pub record_suffix: String,
    pub page_delay_ms: u64,
    pub max_pages: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkerConfig {
    pub enabled: bool,
    pub worker_count: usize,
    pub queue_size: usize,
}

impl LibrarianConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = is_prod();

        Ok(LibrarianConfig {
            common: common_config,
            mongodb: MongoConfig {
                uri: get_env("MONGODB_URI", Some("mongodb://localhost:27017"), is_prod)?,
                database: get_env("MONGODB_DATABASE", Some("librarian_db"), is_prod)?,
            },
            google: GoogleConfig {
                api_key: get_env("GOOGLE_API_KEY", Some(""), is_prod)?,
            },
            models: ModelConfig {
                text_model: get_env("GENAI_TEXT_MODEL", Some("gemini-1.5-pro"), is_prod)?,
                vision_model: get_env("GENAI_VISION_MODEL", Some("gemini-1.5-flash"), is_prod)?,
            },
            limits: LimitConfig {
                max_image_bytes: parse_env("MAX_IMAGE_BYTES", DEFAULT_MAX_IMAGE_BYTES, is_prod)?,
                max_csv_bytes: parse_env("MAX_CSV_BYTES", DEFAULT_MAX_CSV_BYTES, is_prod)?,
                max_text_chars: parse_env("MAX_TEXT_CHARS", 1000, is_prod)?,
                rate_limit_requests: parse_env("RATE_LIMIT_REQUESTS", 50, is_prod)?,
                rate_limit_window_secs: parse_env("RATE_LIMIT_WINDOW_SECS", 900, is_prod)?,
            },
            chunking: ChunkConfig {
                chunk_size: parse_env("CSV_CHUNK_SIZE", 200, is_prod)?,
                ttl_secs: parse_env("CHUNK_TTL_SECS", 3600, is_prod)?,
            },
            holds: HoldsConfig {
                record_id_column: parse_env("HOLDS_RECORD_ID_COLUMN", 0, is_prod)?,
                title_column: parse_env("HOLDS_TITLE_COLUMN", 1, is_prod)?,
                holds_column: parse_env("HOLDS_HOLDS_COLUMN", 2, is_prod)?,
                date_column: parse_env("HOLDS_DATE_COLUMN", 3, is_prod)?,
                holds_delimiter: get_env("HOLDS_DELIMITER", Some(";"), is_prod)?
                    .chars()
                    .next()
                    .unwrap_or(';'),
                date_format: get_env("HOLDS_DATE_FORMAT", Some("%m-%d-%Y"), is_prod)?,
            },
            crawler: CrawlerConfig {
                feed_url: get_env(
                    "CRAWLER_FEED_URL",
                    Some("https://id.loc.gov/authorities/names/activitystreams/feed/1.json"),
                    is_prod,
                )?,
                type_filter: get_env(
                    "CRAWLER_TYPE_FILTER",
                    Some("madsrdf:Authority,madsrdf:PersonalName"),
                    is_prod,
                )?
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
                record_suffix: get_env("CRAWLER_RECORD_SUFFIX", Some(".madsxml.xml"), is_prod)?,
                page_delay_ms: parse_env("CRAWLER_PAGE_DELAY_MS", 500, is_prod)?,
                max_pages: parse_env("CRAWLER_MAX_PAGES", 10, is_prod)?,
            },
            worker: WorkerConfig {
                enabled: get_env("WORKER_ENABLED", Some("true"), is_prod)? == "true",
                worker_count: parse_env("WORKER_COUNT", 2, is_prod)?,
                queue_size: parse_env("WORKER_QUEUE_SIZE", 16, is_prod)?,
            },
        })
    }
}

fn parse_env<T>(key: &str, default: T, is_prod: bool) -> Result<T, AppError>
where
    T: std::str::FromStr + std::fmt::Display + Copy,
{
    let raw = get_env(key, Some(&default.to_string()), is_prod)?;
    Ok(raw.parse().unwrap_or(default))
}
