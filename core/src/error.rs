//! Error type for every fallible client operation.
//!
//! # Design
//! A single enum so that mocked and real calls fail with the same shape:
//! `NoMockMatch` and `ScriptedMock` arrive through the same `Result` as a
//! `Transport` failure. Decoding a response is a separate step and gets its
//! own variant. Nothing in the crate retries or logs these.

use std::error::Error as StdError;

/// Boxed source carried by transport failures.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

pub type Result<T, E = ClientError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request body could not be serialized for the selected content type.
    #[error("failed to encode request body as {format}: {message}")]
    Encoding { format: &'static str, message: String },

    /// Malformed method token or URL.
    #[error("unable to perform request: {0}")]
    InvalidRequest(String),

    /// Network-level failure reported by the transport, including timeouts,
    /// refused connections and errors while draining the response body.
    #[error(transparent)]
    Transport(BoxError),

    /// Mocking is enabled and no fixture matches the call signature.
    #[error("no mock matching {method} from '{url}' with the given body")]
    NoMockMatch { method: String, url: String },

    /// A fixture scripted to fail. Displays exactly the scripted message.
    #[error("{0}")]
    ScriptedMock(String),

    /// The response body does not parse as the requested format.
    #[error("failed to decode response body as {format}: {message}")]
    Decode { format: &'static str, message: String },

    /// Client options carry a header name or value that is not valid HTTP.
    #[error("invalid client configuration: {0}")]
    Config(String),
}

impl ClientError {
    pub fn transport(err: impl Into<BoxError>) -> Self {
        ClientError::Transport(err.into())
    }

    /// True for every variant a verb call can return once the request has
    /// been handed to a transport, mocked or real.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ClientError::Transport(_) | ClientError::NoMockMatch { .. } | ClientError::ScriptedMock(_)
        )
    }
}

impl From<ureq::Error> for ClientError {
    fn from(err: ureq::Error) -> Self {
        ClientError::transport(err)
    }
}

impl From<ureq::http::Error> for ClientError {
    fn from(err: ureq::http::Error) -> Self {
        ClientError::InvalidRequest(err.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::transport(err)
    }
}
