//! End-to-end cookie check.

use tracing::{info, warn};

use crate::config::RunConfig;
use crate::{
    CheckError, CookieSet, DirectVerifier, LoginStatus, Result, SearchRequest, SearchResult,
    SearchRunner, SessionAdapter, TwitterSession,
};

/// Outcome of a successful check.
#[derive(Debug)]
pub struct CheckReport {
    /// Number of cookies loaded from the file.
    pub cookie_count: usize,
    /// Whether the direct credential check passed.
    pub direct_verified: bool,
    /// What the session login check reported.
    pub login: LoginStatus,
    /// Tweets returned by the search.
    pub result: SearchResult,
}

/// Runs the stages in order, stopping at the first failure.
pub struct Pipeline {
    config: RunConfig,
}

impl Pipeline {
    /// Creates a pipeline for `config`.
    pub fn new(config: RunConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Loads cookies, verifies them directly, checks the session login and
    /// runs the search.
    pub async fn run<S: TwitterSession>(&self, session: S) -> Result<CheckReport> {
        let config = &self.config;

        let cookies = CookieSet::load(&config.cookie_file)?;

        DirectVerifier::with_endpoint(&config.verify_endpoint, config.proxy.as_ref(), &cookies)?
            .verify()
            .await?;

        let mut adapter = SessionAdapter::new(session, config.login_check);
        if let Some(proxy) = &config.proxy {
            adapter.set_proxy(proxy)?;
        }
        adapter.set_cookies(&cookies)?;

        let login = adapter.login_check().await;
        match login {
            LoginStatus::Verified => info!("Login verification succeeded"),
            LoginStatus::Skipped => warn!(
                "Session login check skipped; only the direct verification vouches for these cookies"
            ),
            LoginStatus::Rejected => {
                return Err(CheckError::Login(
                    "session is not logged in, check that the cookies or auth_token are still valid"
                        .into(),
                ))
            }
        }

        let request = SearchRequest::new(config.query.as_str(), config.count)?
            .with_deadline(config.deadline);
        let result = SearchRunner::new().run(&adapter, &request).await?;
        info!("Successfully scraped {} tweets", result.len());

        Ok(CheckReport {
            cookie_count: cookies.len(),
            direct_verified: true,
            login,
            result,
        })
    }
}
