//! Dispatch errors

use lettre::address::AddressError;
use thiserror::Error;
use tracing::debug;

/// Errors reported by a [`Transport`](super::Transport)
#[derive(Debug, Error)]
pub enum TransportError {
    /// The sender or recipient could not be parsed
    #[error("invalid email address: {0}")]
    InvalidAddress(#[from] AddressError),

    /// The message could not be assembled
    #[error("could not build message: {0}")]
    Message(#[from] lettre::error::Error),

    /// Connecting, authenticating or transmitting failed
    #[error(transparent)]
    Smtp(#[from] lettre::transport::smtp::Error),

    /// Unknown error
    #[error(transparent)]
    UnknownError(#[from] anyhow::Error),
}

/// Errors returned when sending a message
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The deadline passed before the transport attempt finished.
    ///
    /// The attempt keeps running in the background and may still deliver the message.
    #[error("deadline exceeded before the message was sent")]
    DeadlineExceeded,

    /// The transport attempt failed
    #[error(transparent)]
    Transport(TransportError),

    /// The transport attempt stopped without reporting an outcome
    #[error("transport attempt ended without reporting a result")]
    Abandoned,
}

impl From<TransportError> for DispatchError {
    fn from(err: TransportError) -> Self {
        debug!("TransportError -> DispatchError");

        DispatchError::Transport(err)
    }
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;

    use super::*;

    #[test]
    fn test_transport_error_text_is_preserved() {
        let err = DispatchError::from(TransportError::from(anyhow!("auth rejected")));

        assert_eq!(err.to_string(), "auth rejected");
        assert!(matches!(err, DispatchError::Transport(_)));
    }

    #[test]
    fn test_invalid_address_error() {
        let parsed = "not an address".parse::<lettre::Address>();
        let err = TransportError::from(parsed.unwrap_err());

        assert!(matches!(err, TransportError::InvalidAddress(_)));
        assert!(err.to_string().starts_with("invalid email address"));
    }

    #[test]
    fn test_deadline_exceeded_text() {
        assert_eq!(
            DispatchError::DeadlineExceeded.to_string(),
            "deadline exceeded before the message was sent"
        );
    }
}
