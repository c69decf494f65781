//! Mock provider implementation for testing.

use super::{
    ContentProvider, FinishReason, ImageAttachment, ProviderError, ProviderResponse,
    ProviderStream, StreamChunk,
};
use async_trait::async_trait;

/// Mock content provider for testing.
pub struct MockContentProvider {
    enabled: bool,
}

impl MockContentProvider {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

#[async_trait]
impl ContentProvider for MockContentProvider {
    async fn generate(
        &self,
        prompt: &str,
        image: Option<&ImageAttachment>,
    ) -> Result<ProviderResponse, ProviderError> {
        if !self.enabled {
            return Err(ProviderError::NotConfigured(
                "Mock provider not enabled".to_string(),
            ));
        }

        let suffix = if image.is_some() { " [with image]" } else { "" };
        Ok(ProviderResponse {
            text: Some(format!("Mock response for: {}{}", prompt, suffix)),
            input_tokens: prompt.len() as i32 / 4,
            output_tokens: 10,
            finish_reason: FinishReason::Complete,
        })
    }

    async fn generate_stream(
        &self,
        prompt: &str,
        _image: Option<&ImageAttachment>,
    ) -> Result<ProviderStream, ProviderError> {
        if !self.enabled {
            return Err(ProviderError::NotConfigured(
                "Mock provider not enabled".to_string(),
            ));
        }

        let input_tokens = prompt.len() as i32 / 4;
        let prompt_text = format!(" {}", prompt);

        let chunks: Vec<Result<StreamChunk, ProviderError>> = vec![
            Ok(StreamChunk::Text("Mock".to_string())),
            Ok(StreamChunk::Text(" streaming".to_string())),
            Ok(StreamChunk::Text(" response".to_string())),
            Ok(StreamChunk::Text(" for:".to_string())),
            Ok(StreamChunk::Text(prompt_text)),
            Ok(StreamChunk::Complete {
                input_tokens,
                output_tokens: 5,
                finish_reason: FinishReason::Complete,
            }),
        ];

        Ok(Box::pin(tokio_stream::iter(chunks)))
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        if self.enabled {
            Ok(())
        } else {
            Err(ProviderError::NotConfigured(
                "Mock provider not enabled".to_string(),
            ))
        }
    }
}
