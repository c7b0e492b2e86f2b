//! Error types for the BCC management API

use thiserror::Error;

/// Result type alias using the BCC Error
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of a remote failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    Validation,
    Transient,
    Other,
}

/// BCC error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("{kind} with id '{id}' not found")]
    NotFound { kind: String, id: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Temporarily unavailable: {0}")]
    Transient(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Build an error from an HTTP status returned by the API.
    ///
    /// `kind` and `id` name the entity the request targeted and are only
    /// used for the not-found case.
    pub fn from_status(status: u16, message: impl Into<String>, kind: &str, id: &str) -> Self {
        let message = message.into();
        match status {
            404 => Error::NotFound {
                kind: kind.to_string(),
                id: id.to_string(),
            },
            409 | 423 => Error::Conflict(message),
            400 | 422 => Error::Validation(message),
            429 | 500..=599 => Error::Transient(message),
            _ => Error::Api { status, message },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::Conflict(_) => ErrorKind::Conflict,
            Error::Validation(_) | Error::InvalidConfig(_) => ErrorKind::Validation,
            Error::Transient(_) | Error::Transport(_) => ErrorKind::Transient,
            _ => ErrorKind::Other,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}
