use crate::dtos::{
    BulkCheckRequest, BulkCheckResponse, BulkUpsertRequest, CheckRequest, CheckResponse,
    MadsEntryRequest, UpsertResponse,
};
use crate::models::MadsEntry;
use crate::startup::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use librarian_core::error::AppError;
use validator::Validate;

/// POST /mads/entry
pub async fn upsert_entry(
    State(state): State<AppState>,
    Json(payload): Json<MadsEntryRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let entry = MadsEntry::from(payload);
    let stats = state.db.upsert_mads_entry(&entry).await?;

    tracing::info!(id = %entry.id, "Upserted authority entry");

    Ok(Json(UpsertResponse {
        matched_count: stats.matched_count,
        modified_count: stats.modified_count,
        upserted_count: stats.upserted_count,
    }))
}

/// POST /mads/entries
pub async fn upsert_entries(
    State(state): State<AppState>,
    Json(payload): Json<BulkUpsertRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let entries: Vec<MadsEntry> = payload.docs.into_iter().map(MadsEntry::from).collect();
    let stats = state.db.upsert_mads_entries(&entries).await?;

    tracing::info!(count = entries.len(), "Bulk upserted authority entries");

    Ok(Json(UpsertResponse {
        matched_count: stats.matched_count,
        modified_count: stats.modified_count,
        upserted_count: stats.upserted_count,
    }))
}

/// POST /mads/entry/check
///
/// A lookup failure reports the entry as existing. Callers use this to
/// decide whether to re-fetch a record; a false "missing" would trigger
/// duplicate work, a false "exists" only delays one refresh.
pub async fn check_entry(
    State(state): State<AppState>,
    Json(payload): Json<CheckRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let exists = match state.db.find_mads_entry(&payload.id).await {
        Ok(found) => found.is_some(),
        Err(e) => {
            tracing::error!(id = %payload.id, error = %e, "Entry check failed, reporting exists");
            true
        }
    };

    Ok(Json(CheckResponse { exists }))
}

/// POST /mads/entries/check
pub async fn check_entries(
    State(state): State<AppState>,
    Json(payload): Json<BulkCheckRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let existing_ids = match state.db.existing_mads_ids(&payload.ids).await {
        Ok(ids) => ids,
        Err(e) => {
            tracing::error!(error = %e, "Bulk entry check failed, reporting all as existing");
            payload.ids
        }
    };

    Ok(Json(BulkCheckResponse { existing_ids }))
}
