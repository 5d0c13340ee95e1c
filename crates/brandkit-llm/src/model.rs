use async_trait::async_trait;

use crate::error::LlmError;

/// Chat, vision and embedding operations used by the pipelines.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Single-turn completion of `prompt` with `model`.
    async fn chat(&self, prompt: &str, model: &str) -> Result<String, LlmError>;

    /// Completion over images. `prompt` is sent as the system message and
    /// every image (data URI or remote URL) as its own user message.
    async fn vision(&self, prompt: &str, images: &[String], model: &str)
        -> Result<String, LlmError>;

    /// One vector per input text, in input order.
    async fn embeddings(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError>;
}

/// The two model tiers the pipelines choose between.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Models {
    /// Planning, summarising and vision work.
    pub primary: String,
    /// Bulk enumeration where quality matters less than cost.
    pub cheap: String,
}

impl Default for Models {
    fn default() -> Self {
        Self {
            primary: "gpt-4o".to_string(),
            cheap: "gpt-4o-mini".to_string(),
        }
    }
}
