//! Domain layer errors.

use thiserror::Error;

/// Errors raised while validating portal readings.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    /// Reading date string could not be parsed
    #[error("Invalid reading date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    /// A required field was absent from the portal payload
    #[error("Reading is missing the {0} field")]
    MissingField(&'static str),

    /// Energy value below zero
    #[error("Negative energy value: {0}")]
    NegativeEnergy(f64),

    /// Volume value below zero
    #[error("Negative volume value: {0}")]
    NegativeVolume(f64),
}
