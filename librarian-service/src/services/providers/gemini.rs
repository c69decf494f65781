//! Gemini provider implementation.
//!
//! Text prompts go to the configured text model; prompts carrying an image go
//! to the vision model with the image inlined as base64. Supports both
//! streaming (SSE) and buffered responses.

use super::{
    ContentProvider, FinishReason, ImageAttachment, ProviderError, ProviderResponse,
    ProviderStream, StreamChunk,
};
use async_trait::async_trait;
use base64::Engine;
use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

/// Gemini API base URL.
const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Harm categories disabled for cataloging prompts. Foreign-language resource
/// descriptions trip the default filters often enough to be unusable.
const HARM_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

/// Gemini provider configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub text_model: String,
    pub vision_model: String,
}

pub struct GeminiProvider {
    config: GeminiConfig,
    client: Client,
}

impl GeminiProvider {
    pub fn new(config: GeminiConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    fn model_for(&self, image: Option<&ImageAttachment>) -> &str {
        if image.is_some() {
            &self.config.vision_model
        } else {
            &self.config.text_model
        }
    }

    fn api_url(&self, model: &str, method: &str) -> String {
        format!(
            "{}/models/{}:{}?key={}",
            GEMINI_API_BASE, model, method, self.config.api_key
        )
    }

    fn build_request(&self, prompt: &str, image: Option<&ImageAttachment>) -> GenerateContentRequest {
        let mut parts = vec![ContentPart::Text {
            text: prompt.to_string(),
        }];

        if let Some(image) = image {
            parts.push(ContentPart::InlineData {
                inline_data: InlineData {
                    mime_type: image.mime_type.clone(),
                    data: base64::engine::general_purpose::STANDARD.encode(&image.data),
                },
            });
        }

        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts,
            }],
            safety_settings: Some(
                HARM_CATEGORIES
                    .iter()
                    .map(|category| SafetySetting {
                        category: category.to_string(),
                        threshold: "BLOCK_NONE".to_string(),
                    })
                    .collect(),
            ),
        }
    }
}

#[async_trait]
impl ContentProvider for GeminiProvider {
    async fn generate(
        &self,
        prompt: &str,
        image: Option<&ImageAttachment>,
    ) -> Result<ProviderResponse, ProviderError> {
        let model = self.model_for(image);
        let request = self.build_request(prompt, image);
        let url = self.api_url(model, "generateContent");

        tracing::debug!(
            model = %model,
            prompt_len = prompt.len(),
            has_image = image.is_some(),
            "Sending request to Gemini API"
        );

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                return Err(ProviderError::RateLimited);
            }

            return Err(ProviderError::ApiError(format!(
                "Gemini API error {}: {}",
                status, error_text
            )));
        }

        let api_response: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ApiError(format!("Failed to parse response: {}", e)))?;

        let text = api_response
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .and_then(|p| match p {
                ContentPart::Text { text } => Some(text.clone()),
                _ => None,
            });

        let usage = api_response.usage_metadata.unwrap_or_default();

        let finish_reason = api_response
            .candidates
            .first()
            .map(|c| finish_reason_from(c.finish_reason.as_deref()))
            .unwrap_or(FinishReason::Complete);

        if finish_reason == FinishReason::ContentFilter {
            return Err(ProviderError::ContentFiltered);
        }

        Ok(ProviderResponse {
            text,
            input_tokens: usage.prompt_token_count.unwrap_or(0),
            output_tokens: usage.candidates_token_count.unwrap_or(0),
            finish_reason,
        })
    }

    async fn generate_stream(
        &self,
        prompt: &str,
        image: Option<&ImageAttachment>,
    ) -> Result<ProviderStream, ProviderError> {
        let model = self.model_for(image);
        let request = self.build_request(prompt, image);
        let url = format!("{}&alt=sse", self.api_url(model, "streamGenerateContent"));

        tracing::debug!(
            model = %model,
            prompt_len = prompt.len(),
            has_image = image.is_some(),
            "Starting streaming request to Gemini API"
        );

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                return Err(ProviderError::RateLimited);
            }

            return Err(ProviderError::ApiError(format!(
                "Gemini API error {}: {}",
                status, error_text
            )));
        }

        let (tx, rx) = mpsc::channel(32);

        // Parse the vendor SSE stream and forward text chunks.
        tokio::spawn(async move {
            let mut stream = response.bytes_stream();
            let mut buffer: Vec<u8> = Vec::new();
            let mut total_input_tokens = 0i32;
            let mut total_output_tokens = 0i32;
            let mut last_finish_reason = FinishReason::Complete;

            while let Some(chunk_result) = stream.next().await {
                match chunk_result {
                    Ok(chunk) => {
                        buffer.extend_from_slice(&chunk);

                        while let Some(event) = next_sse_event(&mut buffer) {
                            if let Some(data) = event.strip_prefix("data: ") {
                                if let Ok(response) =
                                    serde_json::from_str::<GenerateContentResponse>(data)
                                {
                                    if let Some(usage) = &response.usage_metadata {
                                        total_input_tokens = usage.prompt_token_count.unwrap_or(0);
                                        total_output_tokens =
                                            usage.candidates_token_count.unwrap_or(0);
                                    }

                                    if let Some(candidate) = response.candidates.first() {
                                        if let Some(ContentPart::Text { text }) =
                                            candidate.content.parts.first()
                                        {
                                            if !text.is_empty() {
                                                let _ = tx
                                                    .send(Ok(StreamChunk::Text(text.clone())))
                                                    .await;
                                            }
                                        }

                                        if let Some(reason) = &candidate.finish_reason {
                                            last_finish_reason =
                                                finish_reason_from(Some(reason.as_str()));
                                        }
                                    }
                                }
                            }
                        }
                    }
                    Err(e) => {
                        let _ = tx
                            .send(Err(ProviderError::NetworkError(e.to_string())))
                            .await;
                        return;
                    }
                }
            }

            let _ = tx
                .send(Ok(StreamChunk::Complete {
                    input_tokens: total_input_tokens,
                    output_tokens: total_output_tokens,
                    finish_reason: last_finish_reason,
                }))
                .await;
        });

        let stream = ReceiverStream::new(rx);
        Ok(Box::pin(stream) as ProviderStream)
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        if self.config.api_key.is_empty() {
            return Err(ProviderError::NotConfigured(
                "Gemini API key not configured".to_string(),
            ));
        }

        let url = format!("{}/models?key={}", GEMINI_API_BASE, self.config.api_key);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(ProviderError::ApiError(format!(
                "Health check failed: {}",
                response.status()
            )))
        }
    }
}

/// Pop the next complete `\n\n`-terminated SSE event off the byte buffer.
///
/// Decoding happens per event, not per network read: a multi-byte character
/// split across two reads stays intact in the buffer until its event is
/// complete.
fn next_sse_event(buffer: &mut Vec<u8>) -> Option<String> {
    let end = buffer.windows(2).position(|w| w == b"\n\n")?;
    let event: Vec<u8> = buffer.drain(..end + 2).take(end).collect();
    Some(String::from_utf8_lossy(&event).into_owned())
}

fn finish_reason_from(reason: Option<&str>) -> FinishReason {
    match reason {
        Some("STOP") => FinishReason::Complete,
        Some("MAX_TOKENS") => FinishReason::Length,
        Some("SAFETY") => FinishReason::ContentFilter,
        _ => FinishReason::Complete,
    }
}

// ============================================================================
// Gemini API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    safety_settings: Option<Vec<SafetySetting>>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<ContentPart>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum ContentPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SafetySetting {
    category: String,
    threshold: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Content,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    prompt_token_count: Option<i32>,
    candidates_token_count: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incomplete_event_stays_buffered() {
        let mut buffer = b"data: {\"partial\":".to_vec();
        assert_eq!(next_sse_event(&mut buffer), None);
        assert_eq!(buffer, b"data: {\"partial\":");
    }

    #[test]
    fn pops_events_in_order_and_keeps_the_tail() {
        let mut buffer = b"data: one\n\ndata: two\n\ndata: thr".to_vec();
        assert_eq!(next_sse_event(&mut buffer).as_deref(), Some("data: one"));
        assert_eq!(next_sse_event(&mut buffer).as_deref(), Some("data: two"));
        assert_eq!(next_sse_event(&mut buffer), None);
        assert_eq!(buffer, b"data: thr");
    }

    #[test]
    fn multibyte_character_split_across_reads_survives() {
        // "é" is 0xC3 0xA9; a network read boundary can land between them.
        let full = "data: {\"text\":\"resumé\"}\n\n".as_bytes();
        let split_at = full.iter().position(|&b| b == 0xC3).unwrap() + 1;

        let mut buffer = full[..split_at].to_vec();
        assert_eq!(next_sse_event(&mut buffer), None);

        buffer.extend_from_slice(&full[split_at..]);
        let event = next_sse_event(&mut buffer).unwrap();
        assert_eq!(event, "data: {\"text\":\"resumé\"}");
        assert!(!event.contains('\u{FFFD}'));
    }
}
