use crate::holds::HoldsRecord;
use serde::{Deserialize, Serialize};

/// Optional form fields accepted alongside the CSV upload.
#[derive(Debug, Default)]
pub struct SplitOptions {
    pub chunk_size: Option<usize>,
    pub min_holds: Option<u32>,
    pub from: Option<String>,
    pub to: Option<String>,
}

/// One stored chunk, referenced by download id.
#[derive(Debug, Serialize, Deserialize)]
pub struct StoredChunkRef {
    pub id: String,
    pub rows: usize,
}

#[derive(Debug, Serialize)]
pub struct SplitResponse {
    pub chunks: Vec<StoredChunkRef>,
    pub total_rows: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub holds: Option<HoldsSummary>,
}

/// Filtered holds report returned when a holds filter was requested.
#[derive(Debug, Serialize)]
pub struct HoldsSummary {
    pub records: Vec<HoldsRecord>,
    pub skipped_rows: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClearResponse {
    pub deleted: u64,
}
