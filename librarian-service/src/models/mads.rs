use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A library authority-record summary, keyed by its source URL.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MadsEntry {
    /// Source URL of the authority record.
    #[serde(rename = "_id")]
    pub id: String,
    /// Main authorized heading.
    pub heading: String,
    /// Variant (see-from) headings.
    #[serde(default)]
    pub variants: Vec<String>,
    /// Related (see-also) headings.
    #[serde(default)]
    pub related: Vec<String>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub fetched_at: DateTime<Utc>,
}

impl MadsEntry {
    pub fn new(id: String, heading: String, variants: Vec<String>, related: Vec<String>) -> Self {
        Self {
            id,
            heading,
            variants,
            related,
            fetched_at: Utc::now(),
        }
    }
}
