//! Tagged portal response shapes.
//!
//! The portal's JSON bodies are validated at the boundary into explicit
//! shapes instead of probing a loose map for key presence.

use std::collections::HashMap;

use serde::Deserialize;

use gazsync_domain::RawReading;

use crate::error::{FetchError, LoginError};

// =============================================================================
// Login response
// =============================================================================

/// Body of the login endpoint's JSON answer.
///
/// The portal mixes two shapes into one endpoint: an error shape carrying
/// `status` + `error`, and a state machine shape carrying `state`. All
/// fields are optional so either shape deserializes; [`LoginResponse::verify`]
/// applies the precedence the portal documents.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    /// Numeric status, present on error answers
    pub status: Option<i64>,
    /// Error message, present on error answers
    pub error: Option<String>,
    /// Authentication state, `"SUCCESS"` when logged in
    pub state: Option<String>,
}

impl LoginResponse {
    /// Check the response for a successful authentication.
    pub fn verify(self) -> Result<(), LoginError> {
        if let (Some(status), Some(error)) = (self.status, self.error.as_deref()) {
            if status >= 400 {
                return Err(LoginError::Rejected {
                    message: error.to_string(),
                    status,
                });
            }
        }
        if let Some(state) = self.state.as_deref() {
            if state != "SUCCESS" {
                let message = self.error.unwrap_or_else(|| state.to_string());
                return Err(LoginError::NotSuccess(message));
            }
        }
        Ok(())
    }
}

// =============================================================================
// Consumption response
// =============================================================================

/// Per-PCE section of the consumption endpoint's answer.
#[derive(Debug, Clone, Deserialize)]
struct PceReport {
    /// Daily readings, chronological
    #[serde(default)]
    releves: Vec<RawReading>,
}

/// Extract the readings for `pce` from a consumption response body.
///
/// An unparseable body and a missing PCE key both map to
/// [`FetchError::NoData`]; the portal answers `{}` in both situations often
/// enough that distinguishing them buys nothing.
pub(crate) fn parse_consumption(body: &str, pce: &str) -> Result<Vec<RawReading>, FetchError> {
    let mut report: HashMap<String, PceReport> =
        serde_json::from_str(body).map_err(|_| FetchError::NoData)?;

    report
        .remove(pce)
        .map(|section| section.releves)
        .ok_or(FetchError::NoData)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_error_with_status() {
        let response: LoginResponse =
            serde_json::from_str(r#"{"status": 401, "error": "bad credentials"}"#).unwrap();

        match response.verify() {
            Err(LoginError::Rejected { message, status }) => {
                assert_eq!(message, "bad credentials");
                assert_eq!(status, 401);
            }
            other => panic!("expected Rejected, got {:?}", other),
        }
    }

    #[test]
    fn test_login_success_state() {
        let response: LoginResponse = serde_json::from_str(r#"{"state": "SUCCESS"}"#).unwrap();
        assert!(response.verify().is_ok());
    }

    #[test]
    fn test_login_non_success_state() {
        let response: LoginResponse =
            serde_json::from_str(r#"{"state": "LOCKED", "error": "account locked"}"#).unwrap();

        match response.verify() {
            Err(LoginError::NotSuccess(message)) => assert_eq!(message, "account locked"),
            other => panic!("expected NotSuccess, got {:?}", other),
        }
    }

    #[test]
    fn test_login_low_status_is_not_an_error() {
        // status < 400 alongside an error field is not a rejection
        let response: LoginResponse =
            serde_json::from_str(r#"{"status": 200, "error": "none", "state": "SUCCESS"}"#)
                .unwrap();
        assert!(response.verify().is_ok());
    }

    #[test]
    fn test_parse_consumption_with_pce() {
        let body = r#"{
            "12345": {
                "releves": [
                    {"journeeGaziere": "2023-01-05", "energieConsomme": 10, "volumeBrutConsomme": 8.5},
                    {"journeeGaziere": "2023-01-06", "energieConsomme": 12, "volumeBrutConsomme": 9.0}
                ]
            }
        }"#;

        let readings = parse_consumption(body, "12345").unwrap();
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0].journee_gaziere.as_deref(), Some("2023-01-05"));
        assert_eq!(readings[1].energie_consomme, Some(12.0));
    }

    #[test]
    fn test_parse_consumption_missing_pce() {
        let body = r#"{"99999": {"releves": []}}"#;
        assert!(matches!(
            parse_consumption(body, "12345"),
            Err(FetchError::NoData)
        ));
    }

    #[test]
    fn test_parse_consumption_malformed_body() {
        assert!(matches!(
            parse_consumption("<html>maintenance</html>", "12345"),
            Err(FetchError::NoData)
        ));
    }
}
