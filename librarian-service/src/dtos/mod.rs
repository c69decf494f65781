pub mod analyze;
pub mod chunks;
pub mod crawl;
pub mod cutter;
pub mod mads;

pub use analyze::{AnalyzeRequest, AnalyzeResponse, AssistantMode};
pub use chunks::{ClearResponse, HoldsSummary, SplitOptions, SplitResponse, StoredChunkRef};
pub use crawl::{CrawlRequest, CrawlAccepted};
pub use cutter::{CutterRequest, CutterResponse};
pub use mads::{
    BulkCheckRequest, BulkCheckResponse, BulkUpsertRequest, BulkUpsertResponse, CheckRequest,
    CheckResponse, MadsEntryRequest, UpsertResponse,
};
