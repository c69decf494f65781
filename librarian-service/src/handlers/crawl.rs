use crate::dtos::{CrawlAccepted, CrawlRequest};
use crate::startup::AppState;
use crate::workers::CrawlJob;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use librarian_core::error::AppError;

/// POST /crawl
///
/// Queues an Authorities crawl and answers 202 immediately. The job runs on
/// the worker pool; progress is visible in logs and metrics.
pub async fn enqueue_crawl(
    State(state): State<AppState>,
    payload: Option<Json<CrawlRequest>>,
) -> Result<impl IntoResponse, AppError> {
    let request = payload.map(|Json(r)| r).unwrap_or_default();

    let job = CrawlJob {
        feed_url: request
            .feed_url
            .unwrap_or_else(|| state.config.crawler.feed_url.clone()),
        max_pages: request
            .max_pages
            .unwrap_or(state.config.crawler.max_pages)
            .max(1),
    };

    let accepted = CrawlAccepted {
        status: "accepted".to_string(),
        feed_url: job.feed_url.clone(),
        max_pages: job.max_pages,
    };

    state.job_tx.try_send(job).map_err(|e| match e {
        tokio::sync::mpsc::error::TrySendError::Full(_) => {
            tracing::warn!("Crawl queue is full");
            AppError::ServiceUnavailable
        }
        tokio::sync::mpsc::error::TrySendError::Closed(_) => {
            AppError::InternalError(anyhow::anyhow!("Crawl worker pool is not running"))
        }
    })?;

    Ok((StatusCode::ACCEPTED, Json(accepted)))
}
