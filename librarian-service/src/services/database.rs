use crate::models::{CsvChunk, MadsEntry};
use chrono::Utc;
use librarian_core::error::AppError;
use mongodb::{
    bson::{doc, Document},
    options::{FindOptions, IndexOptions, UpdateOptions},
    Client as MongoClient, Collection, Database, IndexModel,
};
use serde::Serialize;

/// Counts returned by a bulk MADS upsert.
#[derive(Debug, Default, Serialize)]
pub struct UpsertStats {
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_count: u64,
}

#[derive(Clone)]
pub struct LibrarianDb {
    client: MongoClient,
    db: Database,
}

impl LibrarianDb {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, AppError> {
        tracing::info!(uri = %uri, "Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to connect to MongoDB at {}: {}", uri, e);
            AppError::from(e)
        })?;
        let db = client.database(database);
        tracing::info!(database = %database, "Successfully connected to MongoDB database");
        Ok(Self { client, db })
    }

    pub async fn initialize_indexes(&self) -> Result<(), AppError> {
        tracing::info!("Creating MongoDB indexes for librarian-service");

        // TTL index so expired chunks are actually purged. The expiry field was
        // historically written but never enforced; this closes that gap.
        let ttl_index = IndexModel::builder()
            .keys(doc! { "expires_at": 1 })
            .options(
                IndexOptions::builder()
                    .name("chunk_ttl".to_string())
                    .expire_after(std::time::Duration::from_secs(0))
                    .build(),
            )
            .build();

        self.chunks().create_index(ttl_index, None).await.map_err(|e| {
            tracing::error!("Failed to create TTL index on chunks collection: {}", e);
            AppError::from(e)
        })?;
        tracing::info!("Created TTL index on chunks.expires_at");

        let heading_index = IndexModel::builder()
            .keys(doc! { "heading": 1 })
            .options(
                IndexOptions::builder()
                    .name("heading_lookup".to_string())
                    .build(),
            )
            .build();

        self.mads_entries()
            .create_index(heading_index, None)
            .await
            .map_err(|e| {
                tracing::error!(
                    "Failed to create heading index on mads_entries collection: {}",
                    e
                );
                AppError::from(e)
            })?;
        tracing::info!("Created index on mads_entries.heading");

        Ok(())
    }

    pub async fn health_check(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                AppError::from(e)
            })?;
        Ok(())
    }

    pub fn mads_entries(&self) -> Collection<MadsEntry> {
        self.db.collection("mads_entries")
    }

    pub fn chunks(&self) -> Collection<CsvChunk> {
        self.db.collection("chunks")
    }

    pub fn client(&self) -> &MongoClient {
        &self.client
    }

    /// Upsert a single MADS entry by its source URL.
    pub async fn upsert_mads_entry(&self, entry: &MadsEntry) -> Result<UpsertStats, AppError> {
        let update = doc! {
            "$set": mongodb::bson::to_bson(entry).map_err(|e| {
                AppError::InternalError(anyhow::anyhow!("Failed to serialize entry: {}", e))
            })?
        };

        let result = self
            .mads_entries()
            .update_one(
                doc! { "_id": &entry.id },
                update,
                UpdateOptions::builder().upsert(true).build(),
            )
            .await
            .map_err(AppError::from)?;

        Ok(UpsertStats {
            matched_count: result.matched_count,
            modified_count: result.modified_count,
            upserted_count: u64::from(result.upserted_id.is_some()),
        })
    }

    /// Upsert a batch of MADS entries. Repeated identical documents are
    /// idempotent: the second pass matches without modifying.
    pub async fn upsert_mads_entries(
        &self,
        entries: &[MadsEntry],
    ) -> Result<UpsertStats, AppError> {
        let mut stats = UpsertStats::default();
        for entry in entries {
            let one = self.upsert_mads_entry(entry).await?;
            stats.matched_count += one.matched_count;
            stats.modified_count += one.modified_count;
            stats.upserted_count += one.upserted_count;
        }
        Ok(stats)
    }

    pub async fn find_mads_entry(&self, id: &str) -> Result<Option<MadsEntry>, AppError> {
        self.mads_entries()
            .find_one(doc! { "_id": id }, None)
            .await
            .map_err(AppError::from)
    }

    /// Return the subset of `ids` already present, using a single `$in` query.
    pub async fn existing_mads_ids(&self, ids: &[String]) -> Result<Vec<String>, AppError> {
        use futures::stream::TryStreamExt;

        let options = FindOptions::builder()
            .projection(doc! { "_id": 1 })
            .build();

        let mut cursor = self
            .db
            .collection::<Document>("mads_entries")
            .find(doc! { "_id": { "$in": ids.to_vec() } }, options)
            .await
            .map_err(AppError::from)?;

        let mut existing = Vec::new();
        while let Some(document) = cursor.try_next().await.map_err(AppError::from)? {
            if let Ok(id) = document.get_str("_id") {
                existing.push(id.to_string());
            }
        }
        Ok(existing)
    }

    pub async fn insert_chunk(&self, chunk: &CsvChunk) -> Result<(), AppError> {
        self.chunks()
            .insert_one(chunk, None)
            .await
            .map_err(AppError::from)?;
        Ok(())
    }

    /// Fetch a chunk, treating expired chunks as absent. The TTL monitor only
    /// runs periodically, so the read side checks too.
    pub async fn find_live_chunk(&self, id: &str) -> Result<Option<CsvChunk>, AppError> {
        let chunk = self
            .chunks()
            .find_one(doc! { "_id": id }, None)
            .await
            .map_err(AppError::from)?;

        match chunk {
            Some(c) if c.is_expired(Utc::now()) => {
                let _ = self.delete_chunk(id).await;
                Ok(None)
            }
            other => Ok(other),
        }
    }

    pub async fn delete_chunk(&self, id: &str) -> Result<(), AppError> {
        self.chunks()
            .delete_one(doc! { "_id": id }, None)
            .await
            .map_err(AppError::from)?;
        Ok(())
    }

    pub async fn clear_chunks(&self) -> Result<u64, AppError> {
        let result = self
            .chunks()
            .delete_many(doc! {}, None)
            .await
            .map_err(AppError::from)?;
        Ok(result.deleted_count)
    }
}
