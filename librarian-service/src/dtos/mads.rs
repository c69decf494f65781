use crate::models::MadsEntry;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Upsert payload for one authority entry.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct MadsEntryRequest {
    #[validate(length(min = 1, message = "id must not be empty"))]
    pub id: String,
    #[validate(length(min = 1, message = "heading must not be empty"))]
    pub heading: String,
    #[serde(default)]
    pub variants: Vec<String>,
    #[serde(default)]
    pub related: Vec<String>,
}

impl From<MadsEntryRequest> for MadsEntry {
    fn from(req: MadsEntryRequest) -> Self {
        MadsEntry::new(req.id, req.heading, req.variants, req.related)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpsertResponse {
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_count: u64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct BulkUpsertRequest {
    #[validate(length(min = 1, message = "docs must not be empty"), nested)]
    pub docs: Vec<MadsEntryRequest>,
}

pub type BulkUpsertResponse = UpsertResponse;

#[derive(Debug, Deserialize, Validate)]
pub struct CheckRequest {
    #[validate(length(min = 1, message = "id must not be empty"))]
    pub id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CheckResponse {
    pub exists: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct BulkCheckRequest {
    #[validate(length(min = 1, message = "ids must not be empty"))]
    pub ids: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BulkCheckResponse {
    pub existing_ids: Vec<String>,
}
