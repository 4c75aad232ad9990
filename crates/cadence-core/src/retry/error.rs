//! Failure type returned by remote calls, before classification.

use thiserror::Error;

/// Error returned by a remote call (upload, archive, network probe).
///
/// The orchestrator never inspects it beyond [`classify`](super::classify):
/// the message (and optional machine code) is all the remote gives us.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct RemoteError {
    pub message: String,
    pub code: Option<String>,
}

impl RemoteError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
        }
    }

    pub fn with_code(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: Some(code.into()),
        }
    }

    /// Message and code lowercased into one haystack for rule matching.
    pub(crate) fn haystack(&self) -> String {
        match &self.code {
            Some(code) => format!("{} {}", code, self.message).to_lowercase(),
            None => self.message.to_lowercase(),
        }
    }
}
