use super::feed::ActivityPage;
use super::mads_xml::parse_mads_xml;
use crate::config::CrawlerConfig;
use crate::models::MadsEntry;
use crate::services::{metrics, LibrarianDb};
use librarian_core::error::AppError;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

/// Summary of one crawl run.
#[derive(Debug, Default, Serialize)]
pub struct CrawlOutcome {
    pub pages_fetched: usize,
    pub entries_matched: usize,
    pub skipped_existing: usize,
    pub records_upserted: u64,
    pub records_failed: usize,
}

pub struct AuthoritiesCrawler {
    config: CrawlerConfig,
    db: LibrarianDb,
    client: Client,
}

impl AuthoritiesCrawler {
    pub fn new(config: CrawlerConfig, db: LibrarianDb) -> Self {
        let client = Client::builder()
            .user_agent(concat!("librarian-service/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self { config, db, client }
    }

    /// Crawl the feed starting at `feed_url`, following `next` links for at
    /// most `max_pages` pages. Pages are fetched sequentially with a
    /// politeness delay; per-record failures are logged and skipped.
    pub async fn run(
        &self,
        feed_url: &str,
        max_pages: usize,
    ) -> Result<CrawlOutcome, AppError> {
        let mut outcome = CrawlOutcome::default();
        let mut next_url = Some(feed_url.to_string());

        while let Some(url) = next_url {
            if outcome.pages_fetched >= max_pages {
                break;
            }

            let page = match self.fetch_page(&url).await {
                Ok(page) => {
                    metrics::record_crawler_page("ok");
                    page
                }
                Err(e) => {
                    metrics::record_crawler_page("error");
                    tracing::error!(url = %url, error = %e, "Failed to fetch feed page");
                    return Err(e);
                }
            };
            outcome.pages_fetched += 1;

            let candidate_ids: Vec<String> = page
                .ordered_items
                .iter()
                .filter(|a| a.selects(&self.config.type_filter))
                .filter_map(|a| a.object.as_ref().map(|o| o.id.clone()))
                .collect();
            outcome.entries_matched += candidate_ids.len();

            // One $in query instead of a lookup per entry.
            let existing = self.db.existing_mads_ids(&candidate_ids).await?;
            outcome.skipped_existing += existing.len();

            let mut entries = Vec::new();
            for id in candidate_ids
                .into_iter()
                .filter(|id| !existing.contains(id))
            {
                tokio::time::sleep(Duration::from_millis(self.config.page_delay_ms)).await;

                match self.fetch_record(&id).await {
                    Ok(entry) => {
                        metrics::record_crawler_record("ok");
                        entries.push(entry);
                    }
                    Err(e) => {
                        metrics::record_crawler_record("error");
                        outcome.records_failed += 1;
                        tracing::warn!(record = %id, error = %e, "Skipping authority record");
                    }
                }
            }

            if !entries.is_empty() {
                let stats = self.db.upsert_mads_entries(&entries).await?;
                outcome.records_upserted += stats.upserted_count + stats.modified_count;
            }

            next_url = page.next.map(|link| link.id);
            if next_url.is_some() {
                tokio::time::sleep(Duration::from_millis(self.config.page_delay_ms)).await;
            }
        }

        tracing::info!(
            pages = outcome.pages_fetched,
            matched = outcome.entries_matched,
            upserted = outcome.records_upserted,
            failed = outcome.records_failed,
            "Crawl finished"
        );

        Ok(outcome)
    }

    async fn fetch_page(&self, url: &str) -> Result<ActivityPage, AppError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::BadGateway(format!("Feed fetch failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::BadGateway(format!(
                "Feed returned {}",
                response.status()
            )));
        }

        response
            .json::<ActivityPage>()
            .await
            .map_err(|e| AppError::BadGateway(format!("Feed page was not valid JSON: {}", e)))
    }

    async fn fetch_record(&self, id: &str) -> Result<MadsEntry, AppError> {
        let record_url = format!("{}{}", id.trim_end_matches('/'), self.config.record_suffix);

        let response = self
            .client
            .get(&record_url)
            .send()
            .await
            .map_err(|e| AppError::BadGateway(format!("Record fetch failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::BadGateway(format!(
                "Record fetch returned {}",
                response.status()
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| AppError::BadGateway(format!("Record body read failed: {}", e)))?;

        let record = parse_mads_xml(&body)
            .map_err(|e| AppError::BadGateway(format!("MADS XML parse failed: {}", e)))?;

        Ok(MadsEntry::new(
            id.to_string(),
            record.heading,
            record.variants,
            record.related,
        ))
    }
}
