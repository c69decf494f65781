use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A bounded-size slice of an uploaded CSV file, stored transiently for
/// later download. Expired chunks are removed by a TTL index and must be
/// treated as absent on read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsvChunk {
    #[serde(rename = "_id")]
    pub id: String,
    /// Header line plus up to chunk_size data rows.
    pub content: String,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub expires_at: DateTime<Utc>,
}

impl CsvChunk {
    pub fn new(content: String, ttl_secs: i64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            content,
            created_at: now,
            expires_at: now + Duration::seconds(ttl_secs),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_expiry_window() {
        let chunk = CsvChunk::new("header\nrow".to_string(), 3600);
        assert!(!chunk.is_expired(Utc::now()));
        assert!(chunk.is_expired(Utc::now() + Duration::seconds(3601)));
    }
}
