//! Client error types.

use thiserror::Error;

/// Client error type.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP exchange failed (connection refused, DNS, TLS, timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing failed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Body was valid JSON but did not match the expected shape.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Server answered with an empty body.
    #[error("Empty response")]
    EmptyResponse,

    /// Project does not exist on the server.
    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    /// Server reported an error inside an otherwise successful response.
    #[error("{0}")]
    Service(String),

    /// Server answered with a non-JSON body where structured data was expected.
    #[error("Unexpected non-JSON response: {0}")]
    UnexpectedBody(String),

    /// Upload answered with a non-200 status.
    #[error("bad status: {status} {reason}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Canonical reason phrase.
        reason: String,
    },

    /// Local file I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Building the job archive failed.
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<azkaban_config::ConfigError> for Error {
    fn from(err: azkaban_config::ConfigError) -> Self {
        Error::Config(err.to_string())
    }
}

impl Error {
    /// Check if this is a project-not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::ProjectNotFound(_))
    }

    /// Check if the server signalled an error in the response body.
    pub fn is_service_error(&self) -> bool {
        matches!(self, Error::Service(_))
    }

    /// Check if the server answered with an empty body.
    pub fn is_empty_response(&self) -> bool {
        matches!(self, Error::EmptyResponse)
    }

    /// Check if this is a transport-level failure.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Http(_))
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;
