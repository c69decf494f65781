use serde::{Deserialize, Serialize};

/// Crawl job request. Unset fields fall back to configured defaults.
#[derive(Debug, Default, Deserialize)]
pub struct CrawlRequest {
    pub feed_url: Option<String>,
    pub max_pages: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CrawlAccepted {
    pub status: String,
    pub feed_url: String,
    pub max_pages: usize,
}
