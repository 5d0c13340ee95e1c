use thiserror::Error;

/// Upstream response bodies are cut to this many bytes before they are
/// carried inside an error.
pub const MAX_ERROR_BODY_BYTES: usize = 512;

/// Error taxonomy shared by every layer.
///
/// Each crate owns its own error enum and maps it onto one of these kinds;
/// the HTTP shell only ever looks at the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidInput,
    NotFound,
    Conflict,
    Unauthorized,
    UpstreamFailure,
    RemoteJobFailed,
    ParseFailure,
    ExhaustedRetries,
    Cancelled,
    Internal,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::InvalidInput => "invalid-input",
            ErrorKind::NotFound => "not-found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::UpstreamFailure => "upstream-failure",
            ErrorKind::RemoteJobFailed => "remote-job-failed",
            ErrorKind::ParseFailure => "parse-failure",
            ErrorKind::ExhaustedRetries => "exhausted-retries",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::Internal => "internal",
        };
        f.write_str(name)
    }
}

/// Failure of a spawned worker that is not the worker's own error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    #[error("operation cancelled")]
    Cancelled,

    #[error("worker panicked: {0}")]
    Panicked(String),
}

impl TaskError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            TaskError::Cancelled => ErrorKind::Cancelled,
            TaskError::Panicked(_) => ErrorKind::Internal,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read template catalogue {path}: {source}")]
    TemplatesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse template catalogue: {0}")]
    TemplatesFileParse(#[from] serde_yaml::Error),

    #[error("template catalogue validation failed: {0}")]
    Validation(String),
}

/// Truncate a string to at most `max_bytes` bytes at a character boundary.
#[must_use]
pub fn truncate_to_char_boundary(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) && end > 0 {
        end -= 1;
    }
    &s[..end]
}

/// Shorten an upstream response body so it can ride along in an error.
#[must_use]
pub fn truncated_body(body: &str) -> String {
    truncate_to_char_boundary(body, MAX_ERROR_BODY_BYTES).to_owned()
}
