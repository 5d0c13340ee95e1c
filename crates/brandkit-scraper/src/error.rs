use brandkit_core::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unexpected HTTP status {status} from {url}: {body}")]
    UnexpectedStatus {
        status: u16,
        url: String,
        body: String,
    },

    #[error("invalid URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl ScraperError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            ScraperError::Http(_) | ScraperError::UnexpectedStatus { .. } => {
                ErrorKind::UpstreamFailure
            }
            ScraperError::Deserialize { .. } => ErrorKind::ParseFailure,
            ScraperError::InvalidUrl { .. } => ErrorKind::InvalidInput,
        }
    }
}
