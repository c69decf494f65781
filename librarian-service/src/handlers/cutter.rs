use crate::cutter::cutter_number;
use crate::dtos::{CutterRequest, CutterResponse};
use axum::{response::IntoResponse, Json};
use librarian_core::error::AppError;
use validator::Validate;

/// POST /cutter
pub async fn make_cutter(
    Json(payload): Json<CutterRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let digits = payload.digits.unwrap_or(2).clamp(1, 6);

    let cutter = cutter_number(&payload.text, digits).ok_or_else(|| {
        AppError::BadRequest(anyhow::anyhow!("text must begin with a letter"))
    })?;

    Ok(Json(CutterResponse { cutter }))
}
