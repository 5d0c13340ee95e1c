use brandkit_core::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{table} row '{id}' not found")]
    NotFound { table: &'static str, id: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Network or TLS failure talking to the remote row store.
    #[error("row store request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote row store answered with a non-2xx status.
    #[error("row store returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("row in {table} does not match its schema: {source}")]
    Decode {
        table: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::NotFound { .. } => ErrorKind::NotFound,
            StoreError::InvalidInput(_) => ErrorKind::InvalidInput,
            StoreError::Http(_) | StoreError::Upstream { .. } => ErrorKind::UpstreamFailure,
            StoreError::Decode { .. } => ErrorKind::ParseFailure,
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}
