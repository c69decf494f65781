use crate::dtos::{ClearResponse, HoldsSummary, SplitOptions, SplitResponse, StoredChunkRef};
use crate::holds::{self, HoldsFilter, HoldsSchema};
use crate::models::CsvChunk;
use crate::services::metrics;
use crate::startup::AppState;
use axum::{
    extract::{Multipart, Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use librarian_core::error::AppError;

/// POST /csv/split
///
/// Multipart fields: `file` (required, `.csv`/`.txt`), optional
/// `chunk_size`, `min_holds`, `from`, `to` (ISO dates). Data rows are split
/// into chunks that each repeat the header row; a holds report is included
/// when any filter field is present.
pub async fn split_csv(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let (content, options) = parse_form(multipart, &state).await?;

    let chunk_size = options
        .chunk_size
        .unwrap_or(state.config.chunking.chunk_size)
        .max(1);

    let pieces = holds::split_into_chunks(&content, chunk_size);
    if pieces.is_empty() {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "CSV has no data rows"
        )));
    }

    let total_rows: usize = pieces.iter().map(|p| data_rows(p)).sum();

    let mut chunks = Vec::with_capacity(pieces.len());
    for piece in pieces {
        let rows = data_rows(&piece);
        let chunk = CsvChunk::new(piece, state.config.chunking.ttl_secs);
        state.db.insert_chunk(&chunk).await?;
        chunks.push(StoredChunkRef {
            id: chunk.id,
            rows,
        });
    }
    metrics::record_chunks_stored("ok", chunks.len() as u64);

    let holds = if options.min_holds.is_some() || options.from.is_some() || options.to.is_some() {
        let schema = HoldsSchema::from(&state.config.holds);
        let report = holds::parse_holds(&content, &schema)
            .map_err(|e| AppError::BadRequest(anyhow::anyhow!("Holds parse failed: {}", e)))?;

        let filter = HoldsFilter {
            min_holds: options.min_holds,
            from: parse_date(options.from.as_deref())?,
            to: parse_date(options.to.as_deref())?,
        };

        Some(HoldsSummary {
            skipped_rows: report.skipped_rows,
            records: holds::filter_holds(report.records, &filter),
        })
    } else {
        None
    };

    tracing::info!(
        chunks = chunks.len(),
        total_rows,
        "Stored CSV chunks"
    );

    Ok(Json(SplitResponse {
        chunks,
        total_rows,
        holds,
    }))
}

/// GET /chunks/:id
///
/// Serves the chunk as a CSV attachment, then deletes it. Expired chunks
/// answer 404 even when the TTL monitor has not removed them yet.
pub async fn download_chunk(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let chunk = state
        .db
        .find_live_chunk(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Chunk {} not found", id)))?;

    state.db.delete_chunk(&id).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"chunk-{}.csv\"", id),
            ),
        ],
        chunk.content,
    ))
}

/// POST /chunks/clear
pub async fn clear_chunks(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let deleted = state.db.clear_chunks().await?;
    tracing::info!(deleted, "Cleared stored chunks");
    Ok(Json(ClearResponse { deleted }))
}

async fn parse_form(
    mut multipart: Multipart,
    state: &AppState,
) -> Result<(String, SplitOptions), AppError> {
    let mut content = None;
    let mut options = SplitOptions::default();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        AppError::BadRequest(anyhow::anyhow!("Failed to read multipart field: {}", e))
    })? {
        match field.name().unwrap_or_default() {
            "file" => {
                let file_name = field.file_name().unwrap_or("upload").to_lowercase();
                if !file_name.ends_with(".csv") && !file_name.ends_with(".txt") {
                    return Err(AppError::BadRequest(anyhow::anyhow!(
                        "Only .csv and .txt uploads are accepted"
                    )));
                }

                let data = field.bytes().await.map_err(|e| {
                    AppError::BadRequest(anyhow::anyhow!("Failed to read file: {}", e))
                })?;
                if data.len() > state.config.limits.max_csv_bytes {
                    return Err(AppError::BadRequest(anyhow::anyhow!(
                        "File exceeds {} bytes",
                        state.config.limits.max_csv_bytes
                    )));
                }

                content = Some(String::from_utf8(data.to_vec()).map_err(|_| {
                    AppError::BadRequest(anyhow::anyhow!("File is not valid UTF-8"))
                })?);
            }
            "chunk_size" => {
                options.chunk_size = Some(parse_field(field, "chunk_size").await?);
            }
            "min_holds" => {
                options.min_holds = Some(parse_field(field, "min_holds").await?);
            }
            "from" => {
                options.from = Some(field.text().await.map_err(|e| {
                    AppError::BadRequest(anyhow::anyhow!("Failed to read from field: {}", e))
                })?);
            }
            "to" => {
                options.to = Some(field.text().await.map_err(|e| {
                    AppError::BadRequest(anyhow::anyhow!("Failed to read to field: {}", e))
                })?);
            }
            _ => {}
        }
    }

    let content = content
        .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("file field is required")))?;

    Ok((content, options))
}

async fn parse_field<T: std::str::FromStr>(
    field: axum::extract::multipart::Field<'_>,
    name: &str,
) -> Result<T, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(anyhow::anyhow!("Failed to read {}: {}", name, e)))?
        .trim()
        .parse()
        .map_err(|_| AppError::BadRequest(anyhow::anyhow!("{} is not a valid number", name)))
}

fn parse_date(value: Option<&str>) -> Result<Option<NaiveDate>, AppError> {
    value
        .map(|v| {
            NaiveDate::parse_from_str(v.trim(), "%Y-%m-%d").map_err(|_| {
                AppError::BadRequest(anyhow::anyhow!("Dates must use YYYY-MM-DD: {}", v))
            })
        })
        .transpose()
}

fn data_rows(chunk: &str) -> usize {
    chunk.lines().count().saturating_sub(1)
}
