//! Payment gateway error types.

use thiserror::Error;

/// Errors that can occur when interacting with the Stripe API.
#[derive(Debug, Error)]
pub enum StripeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse a response.
    #[error("parse error: {0}")]
    Parse(String),
}

/// Errors that can occur when verifying a webhook payload.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WebhookError {
    /// The signature header is malformed.
    #[error("malformed signature header")]
    BadHeader,

    /// The header carries no `t=` timestamp.
    #[error("signature header missing timestamp")]
    MissingTimestamp,

    /// The header carries no `v1=` signature.
    #[error("signature header missing v1 signature")]
    MissingSignature,

    /// No candidate signature matched the payload.
    #[error("signature verification failed")]
    BadSignature,

    /// The signed timestamp is outside the tolerance window.
    #[error("signature timestamp outside tolerance")]
    TimestampOutOfTolerance,

    /// The event JSON could not be parsed.
    #[error("invalid event payload: {0}")]
    BadPayload(String),
}
