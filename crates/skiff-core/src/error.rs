//! Error type shared by handlers and the dispatcher.
//!
//! Handlers return `Result<(), Error>`; any `Err` aborts the chain at that
//! point and is delivered to exactly one policy decision: the configured
//! error handler if present, otherwise a 500 whose body is the error's
//! `Display` output. Because of that last rule, `Error::msg("boom")`
//! renders as exactly `boom`.

use std::time::Duration;

use http::StatusCode;

/// A handler or dispatch failure.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Free-form error, displayed verbatim by the default error policy.
    #[error("{0}")]
    Message(String),

    /// The request body exceeded the configured size limit.
    #[error("request body exceeds the configured limit of {limit} bytes")]
    BodyTooLarge {
        /// The limit that was in effect, in bytes.
        limit: usize,
    },

    /// The request body could not be read from the transport.
    #[error("failed to read request body: {0}")]
    Body(String),

    /// A file operation exceeded the configured I/O timeout.
    #[error("i/o timed out after {0:?}")]
    Timeout(Duration),

    /// `redirect` was called with a status outside 300..=308.
    #[error("redirect status must be in 300..=308, got {0}")]
    InvalidRedirect(StatusCode),

    /// Filesystem failure while serving or storing a file.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding failure.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Creates a free-form error from any message.
    #[must_use]
    pub fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}
