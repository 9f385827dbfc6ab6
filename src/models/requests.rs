use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request body shared by both generation endpoints
///
/// The field defaults to empty when absent so that a missing `userPrompt`
/// surfaces as the validation error rather than a deserialization error.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GenerateRequest {
    #[validate(length(min = 1))]
    #[serde(default)]
    #[serde(alias = "user_prompt", rename = "userPrompt")]
    pub user_prompt: String,
}

impl GenerateRequest {
    /// A prompt of only whitespace carries no content; treat it as missing.
    pub fn prompt_is_empty(&self) -> bool {
        self.user_prompt.trim().is_empty()
    }
}
