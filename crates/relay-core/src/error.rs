//! Error types for the relay core.

use thiserror::Error;

/// Errors that can occur while routing events.
#[derive(Debug, Error)]
pub enum RelayError {
    /// An outbound call to the messaging transport failed.
    #[error("outbound call failed: {0}")]
    Outbound(String),

    /// A control payload could not be parsed.
    #[error("invalid control payload: {0}")]
    InvalidControl(String),

    /// A language code outside the supported set.
    #[error("unknown language code: {0}")]
    UnknownLanguage(String),

    /// Invalid relay configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Result type for relay operations.
pub type Result<T> = std::result::Result<T, RelayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RelayError::InvalidControl("ban:abc".into());
        assert_eq!(err.to_string(), "invalid control payload: ban:abc");

        let err = RelayError::UnknownLanguage("de".into());
        assert_eq!(err.to_string(), "unknown language code: de");
    }
}
