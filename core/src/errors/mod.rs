//! Error types for SMS channel operations

use thiserror::Error;

/// Errors raised by the client registry and vendor clients
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SmsError {
    /// The channel code does not name a known vendor
    #[error("Unknown SMS channel type: {code}")]
    UnknownChannel { code: String },

    /// A per-channel client was submitted without a channel id
    #[error("SMS channel properties for '{code}' have no channel id")]
    MissingChannelId { code: String },

    #[error("SMS client for channel '{code}' is not initialized")]
    NotInitialized { code: String },

    #[error("Invalid mobile number: {mobile}")]
    InvalidMobile { mobile: String },

    /// The HTTP exchange with the vendor failed
    #[error("SMS transport error: {0}")]
    Transport(String),

    /// The vendor answered with a payload that could not be decoded
    #[error("Invalid SMS vendor response: {0}")]
    InvalidResponse(String),

    #[error("SMS request signing failed: {0}")]
    Signing(String),
}

impl From<serde_json::Error> for SmsError {
    fn from(err: serde_json::Error) -> Self {
        SmsError::InvalidResponse(err.to_string())
    }
}

pub type SmsResult<T> = Result<T, SmsError>;
