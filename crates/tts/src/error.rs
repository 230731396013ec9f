use std::path::PathBuf;

use thiserror::Error;

use crate::transport::TransportError;

pub type Result<T> = std::result::Result<T, TtsError>;

/// Failures of a single synthesis call
///
/// None of these are retried; the caller decides whether to retry, skip,
/// or abort a batch.
#[derive(Debug, Error)]
pub enum TtsError {
    /// Token endpoint unreachable, token missing, or granted scope insufficient
    #[error("Authentication failed: {message}")]
    Auth {
        message: String,
        /// Raw token endpoint response, kept for diagnostics
        body: Option<String>,
    },

    /// Connection-level failure while sending the synthesis request
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The API answered with a non-audio payload, saved to `artifact`
    #[error("Synthesis API error (HTTP {status}), response saved to {}", .artifact.display())]
    Api { status: u16, body: String, artifact: PathBuf },

    /// The output file could not be written
    #[error("Failed to write {}: {source}", .path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Request signing failed
    #[error("Request signing failed: {0}")]
    Signing(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl TtsError {
    pub(crate) fn auth(message: impl Into<String>, body: Option<String>) -> Self {
        Self::Auth {
            message: message.into(),
            body,
        }
    }

    /// Stable identifier for logs and batch summaries
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Auth { .. } => "auth_error",
            Self::Transport(_) => "transport_error",
            Self::Api { .. } => "api_error",
            Self::Output { .. } => "output_error",
            Self::Signing(_) | Self::Config(_) => "internal_error",
        }
    }
}
