//! Invocation configuration.
//!
//! Flags win over environment variables, which win over computed defaults.
//! Everything is resolved once into a [`RunConfig`] at startup.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;

use crate::api::VERIFY_ENDPOINT;
use crate::format::OutputFormat;
use crate::proxy::ProxyConfig;
use crate::query::{DEFAULT_DEADLINE, DEFAULT_MAX_COUNT};
use crate::{CheckError, LoginCheck, Result};

/// Explicit cookie file path.
pub const ENV_COOKIE_FILE: &str = "TWITTER_COOKIE_FILE";
/// Search query.
pub const ENV_QUERY: &str = "SCRAPER_TEST_QUERY";
/// Result count.
pub const ENV_COUNT: &str = "SCRAPER_TEST_COUNT";
/// Proxy address.
pub const ENV_PROXY: &str = "TWITTER_SCRAPER_PROXY";
/// Account whose exported cookies and tweets are checked.
pub const ENV_ACCOUNT: &str = "X_ACCOUNT";
/// Cookie output directory override.
pub const ENV_COOKIES_DIR: &str = "COOKIES_DIR";
/// Set to `true` inside the container image.
pub const ENV_RUNNING_IN_DOCKER: &str = "RUNNING_IN_DOCKER";

const CONTAINER_COOKIES_DIR: &str = "/app/cookies";
const COOKIES_SUBDIR: &str = "cookies";

/// Values given on the command line. `None` means "not given".
#[derive(Debug, Clone)]
pub struct Overrides {
    pub cookies: Option<PathBuf>,
    pub query: Option<String>,
    pub count: Option<usize>,
    pub proxy: Option<String>,
    pub format: OutputFormat,
    pub login_check: LoginCheck,
    pub deadline: Duration,
}

impl Default for Overrides {
    fn default() -> Self {
        Self {
            cookies: None,
            query: None,
            count: None,
            proxy: None,
            format: OutputFormat::Text,
            login_check: LoginCheck::Verify,
            deadline: DEFAULT_DEADLINE,
        }
    }
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub cookie_file: PathBuf,
    pub query: String,
    pub count: usize,
    pub proxy: Option<ProxyConfig>,
    pub format: OutputFormat,
    pub login_check: LoginCheck,
    pub deadline: Duration,
    pub verify_endpoint: String,
}

impl RunConfig {
    /// Resolves against the process environment and working directory.
    pub fn resolve(overrides: Overrides) -> Result<Self> {
        let cwd = std::env::current_dir().ok();
        Self::resolve_with(overrides, |key| std::env::var(key).ok(), cwd.as_deref())
    }

    /// Resolves against an arbitrary environment lookup.
    pub fn resolve_with<F>(overrides: Overrides, env: F, cwd: Option<&Path>) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| env(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let account = var(ENV_ACCOUNT);

        let cookie_file = overrides
            .cookies
            .filter(|p| !p.as_os_str().is_empty())
            .or_else(|| var(ENV_COOKIE_FILE).map(PathBuf::from))
            .or_else(|| {
                account.as_ref().map(|account| {
                    resolve_output_dir(&var, cwd).join(format!("{}_twitter_cookies.json", account))
                })
            })
            .ok_or_else(|| {
                CheckError::Config(format!(
                    "no cookie file: pass --cookies or set {} or {}",
                    ENV_COOKIE_FILE, ENV_ACCOUNT
                ))
            })?;

        let query = overrides
            .query
            .filter(|q| !q.trim().is_empty())
            .or_else(|| var(ENV_QUERY))
            .or_else(|| account.as_ref().map(|account| format!("from:{}", account)))
            .ok_or_else(|| {
                CheckError::Config(format!(
                    "no search query: pass --query or set {} or {}",
                    ENV_QUERY, ENV_ACCOUNT
                ))
            })?;

        let count = match overrides.count {
            Some(0) => {
                return Err(CheckError::Config("--count must be positive".into()));
            }
            Some(count) => count,
            None => var(ENV_COUNT)
                .and_then(|v| v.parse::<usize>().ok())
                .filter(|&v| v > 0)
                .unwrap_or(DEFAULT_MAX_COUNT),
        };

        let proxy_addr = overrides
            .proxy
            .filter(|p| !p.trim().is_empty())
            .or_else(|| var(ENV_PROXY))
            .unwrap_or_default();
        let proxy = ProxyConfig::parse(&proxy_addr)?;

        let config = Self {
            cookie_file,
            query,
            count,
            proxy,
            format: overrides.format,
            login_check: overrides.login_check,
            deadline: overrides.deadline,
            verify_endpoint: VERIFY_ENDPOINT.to_string(),
        };
        debug!(
            cookie_file = %config.cookie_file.display(),
            query = %config.query,
            count = config.count,
            proxy = ?config.proxy.as_ref().map(ProxyConfig::redacted),
            "resolved configuration"
        );
        Ok(config)
    }
}

/// Picks the directory holding exported cookie files.
fn resolve_output_dir<F>(var: &F, cwd: Option<&Path>) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(dir) = var(ENV_COOKIES_DIR) {
        return PathBuf::from(dir);
    }
    if var(ENV_RUNNING_IN_DOCKER).is_some_and(|v| v.eq_ignore_ascii_case("true")) {
        return PathBuf::from(CONTAINER_COOKIES_DIR);
    }

    let Some(cwd) = cwd else {
        return PathBuf::from(COOKIES_SUBDIR);
    };

    let first = cwd.join(COOKIES_SUBDIR);
    if first.exists() {
        return first;
    }
    if let Some(parent) = cwd.parent() {
        let second = parent.join(COOKIES_SUBDIR);
        if second.exists() {
            return second;
        }
    }
    first
}
