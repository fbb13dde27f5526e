//! Error types for KAMAR dispatch and decoding.
//!
//! Errors are classified by where the failure happened:
//! - Transport: the POST itself failed (never retried here)
//! - Decode: the response body did not match the expected shape
//! - Remote: the service reported Error/ErrorCode in the envelope
//! - State: a call was issued out of sequence
//! - Unsupported: a permanently disabled command was invoked

use thiserror::Error;

#[derive(Debug, Error)]
pub enum KamarError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Decode error at {path}: {message}")]
    Decode { path: String, message: String },

    #[error("KAMAR error {code}: {message}")]
    Remote { message: String, code: i32 },

    #[error("State error: {message}")]
    State { message: String, recoverable: bool },

    #[error("Unsupported command: {0}")]
    Unsupported(String),
}

impl KamarError {
    pub(crate) fn decode(path: impl Into<String>, message: impl Into<String>) -> Self {
        KamarError::Decode {
            path: path.into(),
            message: message.into(),
        }
    }

    pub(crate) fn state(message: impl Into<String>) -> Self {
        KamarError::State {
            message: message.into(),
            recoverable: false,
        }
    }

    /// A state error the session survives with a defaulted value, such as
    /// "no attendance configured, assuming week 1".
    pub(crate) fn state_recoverable(message: impl Into<String>) -> Self {
        KamarError::State {
            message: message.into(),
            recoverable: true,
        }
    }

    /// True when the session remains usable after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            KamarError::State {
                recoverable: true,
                ..
            }
        )
    }
}

impl From<reqwest::Error> for KamarError {
    fn from(err: reqwest::Error) -> Self {
        KamarError::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverability_is_a_flag_not_the_message() {
        let soft = KamarError::state_recoverable("no attendance configured, assuming week 1");
        let hard = KamarError::state("no attendance configured, assuming week 1");
        assert!(soft.is_recoverable());
        assert!(!hard.is_recoverable());
        assert!(!KamarError::Transport("timed out".into()).is_recoverable());
    }
}
