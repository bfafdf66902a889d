use thiserror::Error;

/// Errors raised by the CircleCI client.
#[derive(Error, Debug)]
pub enum CircleCiError {
    /// Non-2xx response. The body is never read.
    #[error("CircleCI API request to '{endpoint}' failed with status {status}")]
    Transport { status: u16, endpoint: String },

    /// Connection, TLS or timeout failure before a status was received.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A 2xx body that does not match the expected shape.
    ///
    /// `target` names the Rust type that was being decoded.
    #[error("Schema validation failed for {target}: {message}")]
    Validation {
        target: &'static str,
        message: String,
    },

    /// A project slug without exactly three usable segments.
    #[error("Malformed project slug '{0}': expected 'vcs/organization/repository'")]
    MalformedSlug(String),

    /// An auto-paginating walk hit its page cap while the server still had pages.
    #[error("Pagination of '{endpoint}' stopped after {max_pages} pages with more remaining")]
    PageLimitExceeded { endpoint: String, max_pages: usize },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CircleCiError {
    /// Builds a validation error for the type `T` being decoded.
    pub(crate) fn validation<T>(err: &serde_json::Error) -> Self {
        Self::Validation {
            target: std::any::type_name::<T>(),
            message: err.to_string(),
        }
    }

    /// HTTP status carried by a transport failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => Some(*status),
            Self::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, CircleCiError>;
