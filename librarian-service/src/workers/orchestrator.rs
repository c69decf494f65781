use crate::config::WorkerConfig;
use crate::crawler::AuthoritiesCrawler;
use backoff::future::retry;
use backoff::ExponentialBackoff;
use librarian_core::error::AppError;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// A queued crawl request. Fields default from configuration when the
/// caller leaves them unset.
#[derive(Debug, Clone)]
pub struct CrawlJob {
    pub feed_url: String,
    pub max_pages: usize,
}

pub struct WorkerOrchestrator {
    config: WorkerConfig,
    crawler: Arc<AuthoritiesCrawler>,
    job_tx: mpsc::Sender<CrawlJob>,
    job_rx: Option<mpsc::Receiver<CrawlJob>>,
    shutdown_token: CancellationToken,
}

impl WorkerOrchestrator {
    pub fn new(
        config: WorkerConfig,
        crawler: Arc<AuthoritiesCrawler>,
    ) -> (Self, mpsc::Sender<CrawlJob>) {
        let (job_tx, job_rx) = mpsc::channel(config.queue_size);
        let shutdown_token = CancellationToken::new();

        let orchestrator = Self {
            config,
            crawler,
            job_tx: job_tx.clone(),
            job_rx: Some(job_rx),
            shutdown_token,
        };

        (orchestrator, job_tx)
    }

    pub async fn start(mut self) {
        if !self.config.enabled {
            tracing::info!("Worker pool disabled by configuration");
            return;
        }

        let mut job_rx = self.job_rx.take().expect("start() can only be called once");

        tracing::info!(
            worker_count = self.config.worker_count,
            "Starting crawl worker pool"
        );

        let mut workers = Vec::new();
        for worker_id in 0..self.config.worker_count.max(1) {
            workers.push(Worker {
                id: worker_id,
                crawler: self.crawler.clone(),
            });
        }

        let shutdown = self.shutdown_token.clone();

        // Single distributor task, round-robin across workers.
        tokio::spawn(async move {
            let mut next_worker = 0;

            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => {
                        tracing::info!("Job distributor shutting down");
                        break;
                    }
                    job = job_rx.recv() => {
                        match job {
                            Some(job) => {
                                let worker = &workers[next_worker];
                                next_worker = (next_worker + 1) % workers.len();

                                tracing::info!(
                                    worker_id = worker.id,
                                    feed_url = %job.feed_url,
                                    "Dispatching crawl job to worker"
                                );

                                let worker_clone = worker.clone();
                                tokio::spawn(async move {
                                    worker_clone.process_job(job).await;
                                });
                            }
                            None => {
                                tracing::info!("Channel closed, job distributor exiting");
                                break;
                            }
                        }
                    }
                }
            }
        });
    }

    pub fn enqueue(&self, job: CrawlJob) -> Result<(), AppError> {
        self.job_tx
            .try_send(job)
            .map_err(|_| AppError::InternalError(anyhow::anyhow!("Job queue full")))
    }

    pub async fn shutdown(&self) {
        tracing::info!("Initiating worker pool shutdown");
        self.shutdown_token.cancel();
    }
}

#[derive(Clone)]
struct Worker {
    id: usize,
    crawler: Arc<AuthoritiesCrawler>,
}

impl Worker {
    async fn process_job(&self, job: CrawlJob) {
        let start = Instant::now();

        tracing::info!(
            worker_id = self.id,
            feed_url = %job.feed_url,
            max_pages = job.max_pages,
            "Crawl job started"
        );

        let backoff = ExponentialBackoff {
            max_elapsed_time: Some(Duration::from_secs(300)),
            ..Default::default()
        };

        let result = retry(backoff, || async {
            self.crawler
                .run(&job.feed_url, job.max_pages)
                .await
                .map_err(|e| match e {
                    // Upstream hiccups are worth another attempt; anything
                    // else fails the job immediately.
                    AppError::BadGateway(_) => backoff::Error::transient(e),
                    other => backoff::Error::permanent(other),
                })
        })
        .await;

        match result {
            Ok(outcome) => {
                tracing::info!(
                    worker_id = self.id,
                    feed_url = %job.feed_url,
                    pages = outcome.pages_fetched,
                    upserted = outcome.records_upserted,
                    duration_ms = start.elapsed().as_millis(),
                    "Crawl job succeeded"
                );
            }
            Err(e) => {
                tracing::error!(
                    worker_id = self.id,
                    feed_url = %job.feed_url,
                    error = %e,
                    "Crawl job failed after retries"
                );
            }
        }
    }
}
