use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CutterRequest {
    #[validate(length(min = 1, max = 200, message = "text must be 1-200 characters"))]
    pub text: String,
    /// Number of digits after the initial letter. Defaults to 2.
    pub digits: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CutterResponse {
    pub cutter: String,
}
