use brandkit_core::{ErrorKind, TaskError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AutofillError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("autofill vendor returned {status} from {url}: {body}")]
    UnexpectedStatus {
        status: u16,
        url: String,
        body: String,
    },

    #[error("remote job {id} failed: {message}")]
    JobFailed { id: String, message: String },

    #[error("remote job {id} succeeded without a result")]
    MissingResult { id: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("token file {path}: {source}")]
    TokenFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("token file {path} is malformed: {source}")]
    TokenFileFormat {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid image reference \"{reference}\": {reason}")]
    InvalidReference { reference: String, reason: String },

    #[error("invalid hex colour \"{0}\"")]
    InvalidColor(String),

    #[error("failed to encode swatch: {0}")]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Task(#[from] TaskError),
}

impl AutofillError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            AutofillError::Http(_) | AutofillError::UnexpectedStatus { .. } => {
                ErrorKind::UpstreamFailure
            }
            AutofillError::JobFailed { .. } => ErrorKind::RemoteJobFailed,
            AutofillError::MissingResult { .. } | AutofillError::Deserialize { .. } => {
                ErrorKind::ParseFailure
            }
            AutofillError::InvalidReference { .. } | AutofillError::InvalidColor(_) => {
                ErrorKind::InvalidInput
            }
            AutofillError::TokenFileIo { .. }
            | AutofillError::TokenFileFormat { .. }
            | AutofillError::Image(_) => ErrorKind::Internal,
            AutofillError::Task(e) => e.kind(),
        }
    }
}
