//! Error type for the HTTP facade.
//!
//! # Design
//! Every failure a caller can observe funnels into `ClientError`. The variant
//! tells which stage failed: the exchange itself (`Transport`), decoding the
//! drained body (`Read`), or a reply whose status is 300 or above (`Status`).
//! Transport and read failures keep the engine's error as `source()`.

use thiserror::Error;

/// Boxed cause attached to transport and read failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors returned by `HttpClient` and `RequestInvoker` implementations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// No status line was obtained: connection refused, DNS failure, timeout.
    #[error("Failed to execute request to: {url}")]
    Transport {
        url: String,
        #[source]
        source: BoxError,
    },

    /// A status line arrived but the body could not be read or decoded.
    #[error("Failed to read response for: {url}")]
    Read {
        url: String,
        #[source]
        source: BoxError,
    },

    /// The server answered with a status code of 300 or above.
    #[error("Failed to execute request to {uri}. Message: {status_text}. Status code: {status_code}")]
    Status {
        status_code: u16,
        status_text: String,
        uri: String,
    },
}

impl ClientError {
    pub fn transport(url: impl Into<String>, source: impl Into<BoxError>) -> Self {
        ClientError::Transport {
            url: url.into(),
            source: source.into(),
        }
    }

    pub fn read(url: impl Into<String>, source: impl Into<BoxError>) -> Self {
        ClientError::Read {
            url: url.into(),
            source: source.into(),
        }
    }

    /// Numeric status of the failed reply, or 0 when none was received.
    pub fn status_code(&self) -> u16 {
        match self {
            ClientError::Status { status_code, .. } => *status_code,
            ClientError::Transport { .. } | ClientError::Read { .. } => 0,
        }
    }

    pub fn status_text(&self) -> Option<&str> {
        match self {
            ClientError::Status { status_text, .. } => Some(status_text),
            ClientError::Transport { .. } | ClientError::Read { .. } => None,
        }
    }

    /// The URI the failure refers to.
    ///
    /// Status failures carry the relative path the caller passed in; transport
    /// and read failures carry the absolute URL that was dialed.
    pub fn uri(&self) -> &str {
        match self {
            ClientError::Transport { url, .. } | ClientError::Read { url, .. } => url,
            ClientError::Status { uri, .. } => uri,
        }
    }

    pub fn message(&self) -> String {
        self.to_string()
    }
}
