use brandkit_core::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("LLM API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("LLM returned no content for model {model}")]
    EmptyResponse { model: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("embedding endpoint returned {got} vectors for {expected} inputs")]
    EmbeddingCountMismatch { expected: usize, got: usize },
}

impl LlmError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            LlmError::Http(_) | LlmError::Api { .. } => ErrorKind::UpstreamFailure,
            LlmError::EmptyResponse { .. }
            | LlmError::Deserialize { .. }
            | LlmError::EmbeddingCountMismatch { .. } => ErrorKind::ParseFailure,
        }
    }
}
