use crate::dtos::{AnalyzeRequest, AnalyzeResponse, AssistantMode};
use crate::services::providers::{ImageAttachment, ProviderError, StreamChunk};
use crate::services::{metrics, prompts};
use crate::startup::AppState;
use axum::{
    extract::{Multipart, State},
    response::sse::{Event, KeepAlive, Sse},
    response::IntoResponse,
    Json,
};
use librarian_core::error::AppError;
use serde_json::json;
use std::convert::Infallible;
use std::time::Instant;
use tokio_stream::StreamExt;

const ALLOWED_IMAGE_MIMES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];

/// POST /analyze
///
/// Multipart fields: `mode` (required), `text`, `image`, `stream`
/// ("true"/"false", default true). Streams SSE frames unless `stream` is
/// false, in which case the full result is buffered into one JSON body.
pub async fn analyze(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<axum::response::Response, AppError> {
    let request = parse_form(multipart, &state).await?;

    let prompt = match request.mode {
        AssistantMode::Translator => {
            let mut prompt = prompts::cataloging_prompt(request.image.is_some());
            if let Some(text) = &request.text {
                prompt.push_str("\n\n");
                prompt.push_str(text);
            }
            prompt
        }
        AssistantMode::Coder => {
            let text = request.text.as_deref().ok_or_else(|| {
                AppError::BadRequest(anyhow::anyhow!("coder mode requires a text field"))
            })?;
            prompts::pymarc_prompt(text)
        }
    };

    let model = if request.image.is_some() {
        state.config.models.vision_model.clone()
    } else {
        state.config.models.text_model.clone()
    };

    if request.stream {
        stream_response(state, request, prompt, model).await
    } else {
        buffered_response(state, request, prompt, model)
            .await
            .map(IntoResponse::into_response)
    }
}

async fn buffered_response(
    state: AppState,
    request: AnalyzeRequest,
    prompt: String,
    model: String,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let start = Instant::now();

    let response = state
        .provider
        .generate(&prompt, request.image.as_ref())
        .await
        .map_err(map_provider_error)?;

    metrics::record_provider_latency(&model, start.elapsed().as_secs_f64());
    metrics::record_genai_request(
        request.mode.as_str(),
        false,
        &format!("{:?}", response.finish_reason),
    );

    let result = response.text.ok_or_else(|| {
        AppError::BadGateway("Provider returned an empty response".to_string())
    })?;

    Ok(Json(AnalyzeResponse {
        result,
        mode: request.mode,
        input_tokens: response.input_tokens,
        output_tokens: response.output_tokens,
    }))
}

async fn stream_response(
    state: AppState,
    request: AnalyzeRequest,
    prompt: String,
    model: String,
) -> Result<axum::response::Response, AppError> {
    let start = Instant::now();
    let mode = request.mode;

    let provider_stream = state
        .provider
        .generate_stream(&prompt, request.image.as_ref())
        .await
        .map_err(map_provider_error)?;

    // Errors after the stream has started cannot change the status line, so
    // they are written into the stream as an error frame before it closes.
    let events = provider_stream.filter_map(move |item| match item {
        Ok(StreamChunk::Text(chunk)) => Some(Ok::<Event, Infallible>(
            Event::default().data(json!({ "chunk": chunk }).to_string()),
        )),
        Ok(StreamChunk::Complete { finish_reason, .. }) => {
            metrics::record_provider_latency(&model, start.elapsed().as_secs_f64());
            metrics::record_genai_request(mode.as_str(), true, &format!("{:?}", finish_reason));
            None
        }
        Err(e) => {
            tracing::error!(error = %e, "Provider stream failed");
            metrics::record_provider_error(provider_error_label(&e));
            Some(Ok(Event::default().data(
                json!({ "error": e.to_string() }).to_string(),
            )))
        }
    });

    Ok(Sse::new(events)
        .keep_alive(KeepAlive::default())
        .into_response())
}

async fn parse_form(
    mut multipart: Multipart,
    state: &AppState,
) -> Result<AnalyzeRequest, AppError> {
    let mut mode = None;
    let mut text = None;
    let mut image = None;
    let mut stream = true;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        AppError::BadRequest(anyhow::anyhow!("Failed to read multipart field: {}", e))
    })? {
        match field.name().unwrap_or_default() {
            "mode" => {
                let value = field.text().await.map_err(|e| {
                    AppError::BadRequest(anyhow::anyhow!("Failed to read mode field: {}", e))
                })?;
                mode = Some(AssistantMode::parse(&value).ok_or_else(|| {
                    AppError::BadRequest(anyhow::anyhow!(
                        "mode must be \"translator\" or \"coder\""
                    ))
                })?);
            }
            "text" => {
                let value = field.text().await.map_err(|e| {
                    AppError::BadRequest(anyhow::anyhow!("Failed to read text field: {}", e))
                })?;
                if value.chars().count() > state.config.limits.max_text_chars {
                    return Err(AppError::BadRequest(anyhow::anyhow!(
                        "text exceeds {} characters",
                        state.config.limits.max_text_chars
                    )));
                }
                if !value.trim().is_empty() {
                    text = Some(value);
                }
            }
            "image" => {
                let mime_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                if !ALLOWED_IMAGE_MIMES.contains(&mime_type.as_str()) {
                    return Err(AppError::BadRequest(anyhow::anyhow!(
                        "Unsupported image type: {}",
                        mime_type
                    )));
                }
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| {
                        AppError::BadRequest(anyhow::anyhow!("Failed to read image: {}", e))
                    })?
                    .to_vec();
                if data.len() > state.config.limits.max_image_bytes {
                    return Err(AppError::BadRequest(anyhow::anyhow!(
                        "Image exceeds {} bytes",
                        state.config.limits.max_image_bytes
                    )));
                }
                if !data.is_empty() {
                    image = Some(ImageAttachment { mime_type, data });
                }
            }
            "stream" => {
                let value = field.text().await.map_err(|e| {
                    AppError::BadRequest(anyhow::anyhow!("Failed to read stream field: {}", e))
                })?;
                stream = value != "false";
            }
            _ => {}
        }
    }

    let mode = mode
        .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("mode field is required")))?;

    if text.is_none() && image.is_none() {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "Provide a text field, an image, or both"
        )));
    }

    Ok(AnalyzeRequest {
        mode,
        text,
        image,
        stream,
    })
}

fn map_provider_error(e: ProviderError) -> AppError {
    metrics::record_provider_error(provider_error_label(&e));
    match e {
        ProviderError::RateLimited => {
            AppError::TooManyRequests("Provider rate limit exceeded".to_string(), Some(30))
        }
        ProviderError::ContentFiltered => {
            AppError::BadRequest(anyhow::anyhow!("Content was blocked by the provider"))
        }
        ProviderError::NotConfigured(msg) => {
            tracing::error!(error = %msg, "Provider not configured");
            AppError::ServiceUnavailable
        }
        ProviderError::ApiError(msg) | ProviderError::NetworkError(msg) => {
            AppError::BadGateway(msg)
        }
    }
}

fn provider_error_label(e: &ProviderError) -> &'static str {
    match e {
        ProviderError::NotConfigured(_) => "not_configured",
        ProviderError::ApiError(_) => "api",
        ProviderError::RateLimited => "rate_limited",
        ProviderError::ContentFiltered => "content_filtered",
        ProviderError::NetworkError(_) => "network",
    }
}
