//! Portal HTTP client and session lifecycle.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::{Client, Url};
use tokio::time::timeout;
use tracing::debug;

use gazsync_domain::RawReading;

use crate::error::{FetchError, LoginError};
use crate::response::{parse_consumption, LoginResponse};

// =============================================================================
// Constants
// =============================================================================

/// Landing page that seeds the `auth_nonce` cookie
const LANDING_URL: &str = "https://monespace.grdf.fr/client/particulier/accueil";

/// Login endpoint
const LOGIN_URL: &str = "https://login.monespace.grdf.fr/sofit-account-api/api/v1/auth";

/// Base URL of the consumption API
const API_BASE_URL: &str = "https://monespace.grdf.fr";

/// The portal rejects non-browser user agents
const USER_AGENT: &str = "Mozilla/5.0 (Linux; Android 6.0; Nexus 5 Build/MRA58N) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/61.0.3163.100 Mobile Safari/537.36";

/// Request timeout in seconds
const REQUEST_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// Portal Client
// =============================================================================

/// Unauthenticated client for the GRDF portal.
///
/// Holds credentials and endpoint URLs; [`PortalClient::authenticate`]
/// performs the nonce handshake and yields an [`AuthenticatedSession`].
pub struct PortalClient {
    /// Account email
    username: String,
    /// Account password
    password: String,
    /// PCE (meter) identifier
    pce: String,
    /// Landing page URL
    landing_url: String,
    /// Login endpoint URL
    login_url: String,
    /// Consumption API base URL
    api_base: String,
}

impl PortalClient {
    /// Create a client against the production portal.
    pub fn new(username: &str, password: &str, pce: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
            pce: pce.to_string(),
            landing_url: LANDING_URL.to_string(),
            login_url: LOGIN_URL.to_string(),
            api_base: API_BASE_URL.to_string(),
        }
    }

    /// Create a client against alternate endpoints (local test servers).
    pub fn with_base_urls(
        username: &str,
        password: &str,
        pce: &str,
        landing_url: &str,
        login_url: &str,
        api_base: &str,
    ) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
            pce: pce.to_string(),
            landing_url: landing_url.to_string(),
            login_url: login_url.to_string(),
            api_base: api_base.to_string(),
        }
    }

    /// Perform the nonce handshake and log in.
    ///
    /// 1. GET the landing page; the portal must set the `auth_nonce` cookie.
    /// 2. POST credentials plus the nonce to the login endpoint.
    /// 3. Validate the tagged login response.
    pub async fn authenticate(&self) -> Result<AuthenticatedSession, LoginError> {
        let jar = Arc::new(Jar::default());
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .cookie_provider(jar.clone())
            .build()
            .map_err(|e| LoginError::Request(e.to_string()))?;

        // Nonce handshake
        let landing = Url::parse(&self.landing_url)
            .map_err(|e| LoginError::Request(format!("Invalid landing URL: {}", e)))?;

        timeout(
            Duration::from_secs(REQUEST_TIMEOUT_SECS),
            client.get(landing.clone()).send(),
        )
        .await
        .map_err(|_| LoginError::Timeout)?
        .map_err(|e| LoginError::Request(e.to_string()))?;

        let nonce = jar
            .cookies(&landing)
            .and_then(|header| {
                header
                    .to_str()
                    .ok()
                    .and_then(|cookies| cookie_value(cookies, "auth_nonce"))
            })
            .ok_or(LoginError::MissingNonce)?;

        debug!(nonce_len = nonce.len(), "got auth_nonce cookie");

        // Credential submission; the nonce travels inside the goto URL
        let goto = format!(
            "https://sofa-connexion.grdf.fr:443/openam/oauth2/externeGrdf/authorize\
             ?response_type=code\
             &scope=openid%20profile%20email%20infotravaux%20%2Fv1%2Faccreditation\
             %20%2Fv1%2Faccreditations%20%2Fdigiconso%2Fv1\
             %20%2Fdigiconso%2Fv1%2Fconsommations%20new_meg\
             &client_id=prod_espaceclient\
             &state=0\
             &redirect_uri=https%3A%2F%2Fmonespace.grdf.fr%2F_codexch\
             &nonce={}&by_pass_okta=1&capp=meg",
            nonce
        );
        let form = [
            ("email", self.username.as_str()),
            ("password", self.password.as_str()),
            ("capp", "meg"),
            ("goto", goto.as_str()),
        ];

        let response = timeout(
            Duration::from_secs(REQUEST_TIMEOUT_SECS),
            client.post(&self.login_url).form(&form).send(),
        )
        .await
        .map_err(|_| LoginError::Timeout)?
        .map_err(|e| LoginError::Request(e.to_string()))?;

        let body = response
            .text()
            .await
            .map_err(|e| LoginError::Request(e.to_string()))?;

        let login: LoginResponse =
            serde_json::from_str(&body).map_err(|_| LoginError::MalformedResponse)?;
        login.verify()?;

        Ok(AuthenticatedSession {
            client,
            api_base: self.api_base.clone(),
            pce: self.pce.clone(),
        })
    }
}

// =============================================================================
// Authenticated Session
// =============================================================================

/// Authenticated HTTP context against the portal.
///
/// Owns the cookie-bearing client exclusively; created per run and discarded
/// after the fetch completes.
pub struct AuthenticatedSession {
    /// HTTP client holding the session cookies
    client: Client,
    /// Consumption API base URL
    api_base: String,
    /// PCE identifier
    pce: String,
}

impl AuthenticatedSession {
    /// Fetch daily readings for the inclusive `from..=to` date range.
    ///
    /// The consumption endpoint is stateful: the first request after login
    /// against a given range never returns data. The same request is issued
    /// twice and only the second response is parsed.
    pub async fn fetch_readings(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<RawReading>, FetchError> {
        let url = consumption_url(&self.api_base, &self.pce, from, to);

        // Warm-up request, response discarded
        self.warm_up(&url).await?;
        let body = self.get_text(&url).await?;

        parse_consumption(&body, &self.pce)
    }

    /// Issue the warm-up GET.
    ///
    /// The portal answers this one with anything from an empty object to a
    /// server error; whatever comes back is discarded, status included.
    /// Only transport failures propagate.
    async fn warm_up(&self, url: &str) -> Result<(), FetchError> {
        let response = timeout(
            Duration::from_secs(REQUEST_TIMEOUT_SECS),
            self.client.get(url).send(),
        )
        .await
        .map_err(|_| FetchError::Timeout)?
        .map_err(|e| FetchError::Request(e.to_string()))?;

        debug!(status = %response.status(), "warm-up response discarded");
        Ok(())
    }

    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let response = timeout(
            Duration::from_secs(REQUEST_TIMEOUT_SECS),
            self.client.get(url).send(),
        )
        .await
        .map_err(|_| FetchError::Timeout)?
        .map_err(|e| FetchError::Request(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Request(e.to_string()))?;

        if !status.is_success() {
            return Err(FetchError::Request(format!("HTTP {}: {}", status, body)));
        }

        Ok(body)
    }
}

/// Build the consumption query URL.
fn consumption_url(api_base: &str, pce: &str, from: NaiveDate, to: NaiveDate) -> String {
    format!(
        "{}/api/e-conso/pce/consommation/informatives?dateDebut={}&dateFin={}&pceList%5B%5D={}",
        api_base,
        from.format("%Y-%m-%d"),
        to.format("%Y-%m-%d"),
        pce
    )
}

/// Extract one cookie's value from a `name=value; name=value` header string.
fn cookie_value(cookies: &str, name: &str) -> Option<String> {
    cookies.split(';').map(str::trim).find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key == name).then(|| value.to_string())
    })
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_consumption_url() {
        let url = consumption_url(
            "https://monespace.grdf.fr",
            "12345",
            day(2023, 1, 5),
            day(2023, 1, 12),
        );

        assert_eq!(
            url,
            "https://monespace.grdf.fr/api/e-conso/pce/consommation/informatives\
             ?dateDebut=2023-01-05&dateFin=2023-01-12&pceList%5B%5D=12345"
        );
    }

    #[test]
    fn test_cookie_value_found() {
        let header = "session=xyz; auth_nonce=abc123; theme=dark";
        assert_eq!(cookie_value(header, "auth_nonce").as_deref(), Some("abc123"));
    }

    #[test]
    fn test_cookie_value_absent() {
        assert_eq!(cookie_value("session=xyz", "auth_nonce"), None);
    }
}
