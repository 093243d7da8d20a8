//! Error types for the client.

use thiserror::Error;

/// Result type for client operations.
pub type LuoguResult<T> = Result<T, LuoguError>;

/// Errors that can occur while fetching or mutating entities.
///
/// `NotFound`, `AccessDenied` and `Generic` come from the application-level
/// `code` embedded in a response body and display the server's message
/// verbatim. Everything else is raised locally.
#[derive(Debug, Error)]
pub enum LuoguError {
    /// Remote code 404.
    #[error("{0}")]
    NotFound(String),

    /// Remote code 403.
    #[error("{0}")]
    AccessDenied(String),

    /// Any other remote code >= 400.
    #[error("{message}")]
    Generic { code: i64, message: String },

    /// DNS, TLS, timeout or a non-2xx HTTP status.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The page fetched for a CSRF token carried no `csrf-token` meta tag.
    #[error("csrf token not found on {page}")]
    TokenNotFound { page: String },

    /// Lazy list indexed past its end.
    #[error("index {index} out of range for list of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// A key the client depends on is absent or has the wrong type.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl LuoguError {
    /// Maps a remote application code onto the taxonomy.
    ///
    /// Returns `None` for codes below 400.
    pub fn from_code(code: i64, message: impl Into<String>) -> Option<Self> {
        match code {
            404 => Some(Self::NotFound(message.into())),
            403 => Some(Self::AccessDenied(message.into())),
            c if c >= 400 => Some(Self::Generic {
                code: c,
                message: message.into(),
            }),
            _ => None,
        }
    }

    /// Returns the remote application code for taxonomy errors.
    pub fn code(&self) -> Option<i64> {
        match self {
            Self::NotFound(_) => Some(404),
            Self::AccessDenied(_) => Some(403),
            Self::Generic { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Returns true if this error came from the remote application rather
    /// than from the transport or local validation.
    pub fn is_remote(&self) -> bool {
        self.code().is_some()
    }

    /// Returns true if the request hit its deadline.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_timeout())
    }
}
