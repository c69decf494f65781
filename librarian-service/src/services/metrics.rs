//! Prometheus metrics for librarian-service.

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::OnceLock;

// Global registry
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub static HTTP_REQUESTS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static GENAI_REQUESTS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static GENAI_PROVIDER_LATENCY_SECONDS: OnceLock<HistogramVec> = OnceLock::new();
pub static GENAI_PROVIDER_ERRORS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static CSV_CHUNKS_STORED_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static CRAWLER_PAGES_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static CRAWLER_RECORDS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// Initialize all metrics. Must be called once at startup.
pub fn init_metrics() {
    let registry = Registry::new();

    let http_requests = IntCounterVec::new(
        Opts::new("http_requests_total", "Total number of HTTP requests"),
        &["route", "status"],
    )
    .expect("Failed to create http_requests_total metric");

    let genai_requests = IntCounterVec::new(
        Opts::new("genai_requests_total", "Total GenAI proxy requests"),
        &["mode", "streaming", "finish_reason"],
    )
    .expect("Failed to create genai_requests_total metric");

    let provider_latency = HistogramVec::new(
        HistogramOpts::new(
            "genai_provider_latency_seconds",
            "AI provider API latency in seconds",
        )
        .buckets(vec![0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0, 120.0]),
        &["model"],
    )
    .expect("Failed to create genai_provider_latency_seconds metric");

    let provider_errors = IntCounterVec::new(
        Opts::new("genai_provider_errors_total", "Total AI provider errors"),
        &["error_type"],
    )
    .expect("Failed to create genai_provider_errors_total metric");

    let chunks_stored = IntCounterVec::new(
        Opts::new("csv_chunks_stored_total", "Total CSV chunks stored"),
        &["outcome"],
    )
    .expect("Failed to create csv_chunks_stored_total metric");

    let crawler_pages = IntCounterVec::new(
        Opts::new("crawler_pages_total", "Activity stream pages fetched"),
        &["outcome"],
    )
    .expect("Failed to create crawler_pages_total metric");

    let crawler_records = IntCounterVec::new(
        Opts::new("crawler_records_total", "Authority records processed"),
        &["outcome"],
    )
    .expect("Failed to create crawler_records_total metric");

    registry
        .register(Box::new(http_requests.clone()))
        .expect("Failed to register http_requests_total");
    registry
        .register(Box::new(genai_requests.clone()))
        .expect("Failed to register genai_requests_total");
    registry
        .register(Box::new(provider_latency.clone()))
        .expect("Failed to register genai_provider_latency_seconds");
    registry
        .register(Box::new(provider_errors.clone()))
        .expect("Failed to register genai_provider_errors_total");
    registry
        .register(Box::new(chunks_stored.clone()))
        .expect("Failed to register csv_chunks_stored_total");
    registry
        .register(Box::new(crawler_pages.clone()))
        .expect("Failed to register crawler_pages_total");
    registry
        .register(Box::new(crawler_records.clone()))
        .expect("Failed to register crawler_records_total");

    let _ = REGISTRY.set(registry);
    let _ = HTTP_REQUESTS_TOTAL.set(http_requests);
    let _ = GENAI_REQUESTS_TOTAL.set(genai_requests);
    let _ = GENAI_PROVIDER_LATENCY_SECONDS.set(provider_latency);
    let _ = GENAI_PROVIDER_ERRORS_TOTAL.set(provider_errors);
    let _ = CSV_CHUNKS_STORED_TOTAL.set(chunks_stored);
    let _ = CRAWLER_PAGES_TOTAL.set(crawler_pages);
    let _ = CRAWLER_RECORDS_TOTAL.set(crawler_records);

    tracing::info!("Prometheus metrics initialized");
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();

    let registry = match REGISTRY.get() {
        Some(r) => r,
        None => {
            tracing::error!("Metrics registry not initialized");
            return "# Metrics registry not initialized\n".to_string();
        }
    };

    let metric_families = registry.gather();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return format!("# Failed to encode metrics: {}\n", e);
    }

    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Failed to convert metrics to UTF-8");
            format!("# Failed to convert metrics to UTF-8: {}\n", e)
        }
    }
}

// Helper functions for recording metrics

pub fn record_http_request(route: &str, status: u16) {
    if let Some(counter) = HTTP_REQUESTS_TOTAL.get() {
        counter
            .with_label_values(&[route, &status.to_string()])
            .inc();
    }
}

pub fn record_genai_request(mode: &str, streaming: bool, finish_reason: &str) {
    if let Some(counter) = GENAI_REQUESTS_TOTAL.get() {
        counter
            .with_label_values(&[mode, if streaming { "true" } else { "false" }, finish_reason])
            .inc();
    }
}

pub fn record_provider_latency(model: &str, duration_secs: f64) {
    if let Some(histogram) = GENAI_PROVIDER_LATENCY_SECONDS.get() {
        histogram.with_label_values(&[model]).observe(duration_secs);
    }
}

pub fn record_provider_error(error_type: &str) {
    if let Some(counter) = GENAI_PROVIDER_ERRORS_TOTAL.get() {
        counter.with_label_values(&[error_type]).inc();
    }
}

pub fn record_chunks_stored(outcome: &str, count: u64) {
    if let Some(counter) = CSV_CHUNKS_STORED_TOTAL.get() {
        counter.with_label_values(&[outcome]).inc_by(count);
    }
}

pub fn record_crawler_page(outcome: &str) {
    if let Some(counter) = CRAWLER_PAGES_TOTAL.get() {
        counter.with_label_values(&[outcome]).inc();
    }
}

pub fn record_crawler_record(outcome: &str) {
    if let Some(counter) = CRAWLER_RECORDS_TOTAL.get() {
        counter.with_label_values(&[outcome]).inc();
    }
}
