//! Direct credential check.
//!
//! Calls the verify-credentials endpoint with the exported cookies using a
//! client built by this crate, independently of any [`TwitterSession`]
//! implementation.
//!
//! [`TwitterSession`]: crate::TwitterSession

use reqwest::header::USER_AGENT as USER_AGENT_HEADER;
use reqwest::{Client, StatusCode};
use tracing::{debug, info};
use url::Url;

use crate::api::{auth_headers, USER_AGENT, VERIFY_ENDPOINT};
use crate::proxy::{build_http_client, ProxyConfig};
use crate::{CheckError, CookieSet, Result, VerifyError};

/// Verifies a cookie set against the credential endpoint.
pub struct DirectVerifier {
    client: Client,
    endpoint: Url,
    csrf_token: Option<String>,
}

impl DirectVerifier {
    /// Creates a verifier for the default endpoint.
    pub fn new(proxy: Option<&ProxyConfig>, cookies: &CookieSet) -> Result<Self> {
        Self::with_endpoint(VERIFY_ENDPOINT, proxy, cookies)
    }

    /// Creates a verifier for a custom endpoint.
    pub fn with_endpoint(
        endpoint: &str,
        proxy: Option<&ProxyConfig>,
        cookies: &CookieSet,
    ) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| CheckError::Config(format!("invalid verify endpoint: {}", e)))?;
        let jar = cookies.jar_for(&endpoint);
        let client = build_http_client(proxy, Some(jar))?;

        Ok(Self {
            client,
            endpoint,
            csrf_token: cookies.csrf_token().map(str::to_string),
        })
    }

    /// Performs the check. Any non-200 answer is a failure.
    pub async fn verify(&self) -> Result<()> {
        let csrf = self.csrf_token.as_deref().ok_or(VerifyError::CsrfMissing)?;

        debug!("Verifying cookies against {}", self.endpoint);
        let response = self
            .client
            .get(self.endpoint.clone())
            .headers(auth_headers(csrf)?)
            .header(USER_AGENT_HEADER, USER_AGENT)
            .send()
            .await
            .map_err(VerifyError::Request)?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status != StatusCode::OK {
            return Err(VerifyError::Status {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        match screen_name(&body) {
            Some(name) => info!("Direct cookie verification succeeded for @{}", name),
            None => info!("Direct cookie verification succeeded"),
        }
        Ok(())
    }
}

fn screen_name(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("screen_name")
        .and_then(|v| v.as_str())
        .map(str::to_string)
}
