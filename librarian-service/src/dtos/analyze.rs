use serde::{Deserialize, Serialize};

/// Assistant mode selected by the `mode` form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssistantMode {
    /// Foreign-language resource cataloging.
    Translator,
    /// pymarc scripting assistance.
    Coder,
}

impl AssistantMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "translator" => Some(Self::Translator),
            "coder" => Some(Self::Coder),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Translator => "translator",
            Self::Coder => "coder",
        }
    }
}

/// Parsed multipart form for an analyze request. Assembled by the handler,
/// not deserialized directly.
#[derive(Debug)]
pub struct AnalyzeRequest {
    pub mode: AssistantMode,
    pub text: Option<String>,
    pub image: Option<crate::services::providers::ImageAttachment>,
    pub stream: bool,
}

/// Buffered (non-streaming) analyze response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub result: String,
    pub mode: AssistantMode,
    pub input_tokens: i32,
    pub output_tokens: i32,
}
