mod orchestrator;

pub use orchestrator::{CrawlJob, WorkerOrchestrator};
