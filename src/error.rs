//! Error types for Reviewbot
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// All error types that can occur in Reviewbot
///
/// Only `Config` is fatal; every other variant is recoverable and is
/// handled at the poll-loop boundary.
#[derive(Debug, Error)]
pub enum ReviewbotError {
    /// Required configuration or credential missing at startup
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transport-level failure: the request never completed
    #[error("Connection error requesting from_date={from_date}: {source}")]
    Connectivity {
        from_date: i64,
        #[source]
        source: reqwest::Error,
    },

    /// The request completed but the HTTP status was not 200
    #[error("API returned HTTP {status} for from_date={from_date}")]
    StatusCode { status: u16, from_date: i64 },

    /// The remote service broke its contract: an error indicator in the
    /// body, a malformed shape, or an item that cannot be translated
    #[error("Response error: {0}")]
    ResponseProtocol(String),

    /// Message delivery failed
    #[error("Delivery error: {0}")]
    Delivery(String),
}

/// Result type alias for Reviewbot operations
pub type Result<T> = std::result::Result<T, ReviewbotError>;
