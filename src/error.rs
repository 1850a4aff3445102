//! Error kinds surfaced by the API client and the item commands.

use thiserror::Error;

/// Every failure the client can report to its caller.
///
/// The normalizer never produces one of these; malformed fields inside an
/// otherwise valid response degrade to zero values instead.
#[derive(Debug, Error)]
pub enum RollbarError {
    /// No access token was configured.
    #[error("missing Rollbar token: pass --token or set ROLLBAR_ACCESS_TOKEN")]
    Auth,

    /// Caller input was rejected before any request was sent.
    #[error("{0}")]
    Validation(String),

    /// Network failure, timeout, or a non-2xx status.
    #[error("{0}")]
    Transport(String),

    /// Body was not JSON or not shaped like the response envelope.
    #[error("{0}")]
    MalformedResponse(String),

    /// The service answered with `err != 0`.
    #[error("rollbar API returned err={code}: {message}")]
    Api { code: i64, message: String },
}

impl RollbarError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn status(status: u16, body: &[u8]) -> Self {
        Self::Transport(format!(
            "rollbar API error: status={status} body={}",
            String::from_utf8_lossy(body).trim()
        ))
    }

    /// Short machine-friendly name of the error kind, used in debug logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::Validation(_) => "validation",
            Self::Transport(_) => "transport",
            Self::MalformedResponse(_) => "malformed_response",
            Self::Api { .. } => "api",
        }
    }
}

pub type Result<T, E = RollbarError> = std::result::Result<T, E>;
