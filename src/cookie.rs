//! Exported session cookies.
//!
//! The cookie file is a JSON array written by the browser export step. Each
//! entry carries at least `name` and `value`; the exporter writes capitalized
//! keys (`Name`, `Value`, ...) and a handful of extra attributes, all of which
//! are tolerated.

use std::path::Path;
use std::sync::Arc;

use reqwest::cookie::Jar;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::{CheckError, Result};

/// Name of the primary session credential cookie.
pub const AUTH_TOKEN: &str = "auth_token";

/// Name of the CSRF token cookie.
pub const CSRF_TOKEN: &str = "ct0";

const REQUIRED_COOKIES: [&str; 2] = [AUTH_TOKEN, CSRF_TOKEN];

/// Domain assigned to cookies exported without one.
const DEFAULT_DOMAIN: &str = ".twitter.com";

/// A single exported cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    #[serde(alias = "Name")]
    pub name: String,
    #[serde(alias = "Value", default)]
    pub value: String,
    #[serde(alias = "Domain", default)]
    pub domain: String,
    #[serde(alias = "Path", default)]
    pub path: String,
    #[serde(alias = "Secure", default)]
    pub secure: bool,
    #[serde(alias = "HttpOnly", default)]
    pub http_only: bool,
}

impl Cookie {
    /// Creates a cookie with no domain, path or flags.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: String::new(),
            path: String::new(),
            secure: false,
            http_only: false,
        }
    }

    /// Sets the cookie domain.
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    /// Sets the cookie path.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Rewrites domain and path into the form the API expects.
    ///
    /// An empty domain or the bare `twitter.com` becomes `.twitter.com` so the
    /// cookie is sent to every subdomain. An empty path becomes `/`.
    pub fn normalized(mut self) -> Self {
        if self.domain.is_empty() || self.domain == "twitter.com" {
            self.domain = DEFAULT_DOMAIN.to_string();
        }
        if self.path.is_empty() {
            self.path = "/".to_string();
        }
        self
    }

    /// Returns whether `host` falls inside this cookie's domain.
    fn domain_matches(&self, host: &str) -> bool {
        let domain = self.domain.trim_start_matches('.');
        !domain.is_empty()
            && (host.eq_ignore_ascii_case(domain)
                || host
                    .to_ascii_lowercase()
                    .ends_with(&format!(".{}", domain.to_ascii_lowercase())))
    }

    /// Builds a `Set-Cookie` string scoped to `host`.
    ///
    /// Cookies whose domain does not cover `host` are installed host-only.
    fn set_cookie_string(&self, host: &str) -> String {
        let mut parts = vec![
            format!("{}={}", self.name, self.value),
            format!("Path={}", self.path),
        ];
        if self.domain_matches(host) {
            parts.push(format!("Domain={}", self.domain));
        }
        if self.secure {
            parts.push("Secure".to_string());
        }
        if self.http_only {
            parts.push("HttpOnly".to_string());
        }
        parts.join("; ")
    }
}

/// An immutable, validated collection of cookies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieSet {
    cookies: Vec<Cookie>,
}

impl CookieSet {
    /// Loads, normalizes and validates a cookie file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading cookies from file: {}", path.display());

        let data = std::fs::read(path).map_err(|source| CheckError::File {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_json(&data)
    }

    /// Parses a JSON cookie array.
    pub fn from_json(data: &[u8]) -> Result<Self> {
        let cookies: Vec<Cookie> =
            serde_json::from_slice(data).map_err(|e| CheckError::Format(e.to_string()))?;
        info!("Loaded {} cookies from file", cookies.len());
        Self::from_cookies(cookies)
    }

    /// Normalizes `cookies` and checks that `auth_token` and `ct0` are each
    /// present exactly once.
    pub fn from_cookies(cookies: Vec<Cookie>) -> Result<Self> {
        let cookies: Vec<Cookie> = cookies.into_iter().map(Cookie::normalized).collect();

        let mut missing = Vec::new();
        for name in REQUIRED_COOKIES {
            match cookies.iter().filter(|c| c.name == name).count() {
                0 => missing.push(name.to_string()),
                1 => debug!("Found {} cookie", name),
                n => {
                    return Err(CheckError::Format(format!(
                        "cookie '{}' appears {} times",
                        name, n
                    )))
                }
            }
        }

        if !missing.is_empty() {
            return Err(CheckError::AuthCookieMissing(missing));
        }

        Ok(Self { cookies })
    }

    /// Returns the cookie with the given name.
    pub fn get(&self, name: &str) -> Option<&Cookie> {
        self.cookies.iter().find(|c| c.name == name)
    }

    /// Returns the session credential value.
    pub fn auth_token(&self) -> Option<&str> {
        self.get(AUTH_TOKEN).map(|c| c.value.as_str())
    }

    /// Returns the CSRF token value, if non-empty.
    pub fn csrf_token(&self) -> Option<&str> {
        self.get(CSRF_TOKEN)
            .map(|c| c.value.as_str())
            .filter(|v| !v.is_empty())
    }

    /// Iterates over the cookies in file order.
    pub fn iter(&self) -> impl Iterator<Item = &Cookie> {
        self.cookies.iter()
    }

    /// Returns the number of cookies.
    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    /// Returns whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// Builds a cookie jar holding every cookie, scoped to `url`.
    pub fn jar_for(&self, url: &Url) -> Arc<Jar> {
        let jar = Arc::new(Jar::default());
        let host = url.host_str().unwrap_or_default();

        for cookie in &self.cookies {
            jar.add_cookie_str(&cookie.set_cookie_string(host), url);
            debug!(name = %cookie.name, domain = %cookie.domain, "added cookie to jar");
        }

        jar
    }
}

impl<'a> IntoIterator for &'a CookieSet {
    type Item = &'a Cookie;
    type IntoIter = std::slice::Iter<'a, Cookie>;

    fn into_iter(self) -> Self::IntoIter {
        self.cookies.iter()
    }
}
