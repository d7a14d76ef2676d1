//! Portal client errors.

use thiserror::Error;

/// Errors that can occur during the login handshake.
#[derive(Debug, Clone, Error)]
pub enum LoginError {
    /// The landing page did not set the `auth_nonce` cookie
    #[error("Cannot get auth_nonce: portal did not set the cookie")]
    MissingNonce,

    /// The login endpoint rejected the credentials
    #[error("Login rejected: {message} ({status})")]
    Rejected {
        /// Error message from the portal
        message: String,
        /// Numeric status reported in the response body
        status: i64,
    },

    /// The login endpoint answered with a non-success state
    #[error("Login did not succeed: {0}")]
    NotSuccess(String),

    /// The login response body was not valid JSON
    #[error("Login response was not valid JSON")]
    MalformedResponse,

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// Request timed out
    #[error("Request timed out")]
    Timeout,
}

/// Errors that can occur while fetching consumption data.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// The PCE identifier was absent from the response, or the body was not
    /// parseable JSON. The portal does not let us tell these apart.
    #[error("No consumption data in portal response")]
    NoData,

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// Request timed out
    #[error("Request timed out")]
    Timeout,
}
