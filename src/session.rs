//! Social-network session capability and its adapter.

use std::fmt;

use async_trait::async_trait;
use futures::stream::BoxStream;
use tracing::debug;

use crate::proxy::ProxyConfig;
use crate::{CookieSet, Result, SearchMode, SearchRequest, Tweet};

/// Lazily produced search items. Each item is either a tweet or the error
/// that ended the stream.
pub type TweetStream<'a> = BoxStream<'a, Result<Tweet>>;

/// Capabilities the check needs from a Twitter client.
///
/// Implementations own their HTTP state; the pipeline only talks to them
/// through this trait so it can run against a fake.
#[async_trait]
pub trait TwitterSession: Send + Sync {
    /// Replaces the session cookies.
    fn set_cookies(&mut self, cookies: &CookieSet) -> Result<()>;

    /// Routes all further requests through `proxy`.
    fn set_proxy(&mut self, proxy: &ProxyConfig) -> Result<()>;

    /// Asks the API whether the current cookies are logged in.
    async fn is_logged_in(&self) -> bool;

    /// Streams at most `max_count` tweets matching `query`.
    fn search<'a>(&'a self, query: &'a str, max_count: usize, mode: SearchMode) -> TweetStream<'a>;
}

/// Whether [`SessionAdapter::login_check`] consults the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginCheck {
    /// Ask the session every time.
    Verify,
    /// Report success without asking, to avoid extra rate-limited calls.
    Skip,
}

/// Outcome of a login check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginStatus {
    /// The session confirmed the login.
    Verified,
    /// The session reported it is not logged in.
    Rejected,
    /// The check was bypassed by policy.
    Skipped,
}

impl LoginStatus {
    /// Returns whether the pipeline may proceed.
    pub fn is_logged_in(self) -> bool {
        !matches!(self, LoginStatus::Rejected)
    }
}

impl fmt::Display for LoginStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoginStatus::Verified => write!(f, "verified"),
            LoginStatus::Rejected => write!(f, "rejected"),
            LoginStatus::Skipped => write!(f, "skipped"),
        }
    }
}

/// Wraps a [`TwitterSession`] with a fixed login-check policy.
pub struct SessionAdapter<S> {
    session: S,
    login_check: LoginCheck,
}

impl<S: TwitterSession> SessionAdapter<S> {
    /// Creates an adapter. The login-check policy cannot change afterwards.
    pub fn new(session: S, login_check: LoginCheck) -> Self {
        Self {
            session,
            login_check,
        }
    }

    /// Returns the configured policy.
    pub fn login_check_policy(&self) -> LoginCheck {
        self.login_check
    }

    /// Returns the wrapped session.
    pub fn session(&self) -> &S {
        &self.session
    }

    /// Injects cookies into the session.
    pub fn set_cookies(&mut self, cookies: &CookieSet) -> Result<()> {
        debug!("Setting {} cookies on session", cookies.len());
        self.session.set_cookies(cookies)
    }

    /// Configures the session proxy.
    pub fn set_proxy(&mut self, proxy: &ProxyConfig) -> Result<()> {
        debug!("Setting session proxy: {}", proxy.redacted());
        self.session.set_proxy(proxy)
    }

    /// Checks the login state according to the policy.
    pub async fn login_check(&self) -> LoginStatus {
        match self.login_check {
            LoginCheck::Skip => LoginStatus::Skipped,
            LoginCheck::Verify => {
                if self.session.is_logged_in().await {
                    LoginStatus::Verified
                } else {
                    LoginStatus::Rejected
                }
            }
        }
    }

    /// Convenience form of [`login_check`](Self::login_check).
    pub async fn is_logged_in(&self) -> bool {
        self.login_check().await.is_logged_in()
    }

    /// Starts a search.
    pub fn search<'a>(&'a self, request: &'a SearchRequest, mode: SearchMode) -> TweetStream<'a> {
        self.session.search(&request.query, request.max_count, mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Cookie;
    use futures::StreamExt;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeSession {
        logged_in: bool,
        login_calls: AtomicUsize,
        cookies: Option<CookieSet>,
        proxy: Option<ProxyConfig>,
    }

    impl FakeSession {
        fn new(logged_in: bool) -> Self {
            Self {
                logged_in,
                login_calls: AtomicUsize::new(0),
                cookies: None,
                proxy: None,
            }
        }
    }

    #[async_trait]
    impl TwitterSession for FakeSession {
        fn set_cookies(&mut self, cookies: &CookieSet) -> Result<()> {
            self.cookies = Some(cookies.clone());
            Ok(())
        }

        fn set_proxy(&mut self, proxy: &ProxyConfig) -> Result<()> {
            self.proxy = Some(proxy.clone());
            Ok(())
        }

        async fn is_logged_in(&self) -> bool {
            self.login_calls.fetch_add(1, Ordering::SeqCst);
            self.logged_in
        }

        fn search<'a>(
            &'a self,
            query: &'a str,
            max_count: usize,
            _mode: SearchMode,
        ) -> TweetStream<'a> {
            let items: Vec<Result<Tweet>> = (0..max_count)
                .map(|i| {
                    Ok(Tweet {
                        id: i.to_string(),
                        text: query.to_string(),
                        ..Tweet::default()
                    })
                })
                .collect();
            futures::stream::iter(items).boxed()
        }
    }

    #[tokio::test]
    async fn test_login_check_verify_consults_session() {
        let adapter = SessionAdapter::new(FakeSession::new(true), LoginCheck::Verify);
        assert_eq!(adapter.login_check().await, LoginStatus::Verified);
        assert_eq!(adapter.session().login_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_login_check_verify_rejected() {
        let adapter = SessionAdapter::new(FakeSession::new(false), LoginCheck::Verify);
        assert_eq!(adapter.login_check().await, LoginStatus::Rejected);
        assert!(!adapter.is_logged_in().await);
    }

    #[tokio::test]
    async fn test_login_check_skip_never_consults_session() {
        let adapter = SessionAdapter::new(FakeSession::new(false), LoginCheck::Skip);
        assert_eq!(adapter.login_check().await, LoginStatus::Skipped);
        assert!(adapter.is_logged_in().await);
        assert_eq!(adapter.session().login_calls.load(Ordering::SeqCst), 0);
        assert_eq!(adapter.login_check_policy(), LoginCheck::Skip);
    }

    #[tokio::test]
    async fn test_set_cookies_and_proxy_forwarded() {
        let mut adapter = SessionAdapter::new(FakeSession::new(true), LoginCheck::Verify);
        let cookies = CookieSet::from_cookies(vec![
            Cookie::new("auth_token", "a"),
            Cookie::new("ct0", "b"),
        ])
        .unwrap();
        adapter.set_cookies(&cookies).unwrap();
        adapter
            .set_proxy(&ProxyConfig::new("127.0.0.1", 8080))
            .unwrap();
        assert_eq!(adapter.session().cookies.as_ref(), Some(&cookies));
        assert_eq!(adapter.session().proxy.as_ref().unwrap().port, 8080);
    }

    #[tokio::test]
    async fn test_search_forwards_request() {
        let adapter = SessionAdapter::new(FakeSession::new(true), LoginCheck::Verify);
        let request = SearchRequest::new("rust", 3).unwrap();
        let items: Vec<_> = adapter.search(&request, SearchMode::Latest).collect().await;
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].as_ref().unwrap().text, "rust");
    }

    #[test]
    fn test_login_status_display() {
        assert_eq!(LoginStatus::Skipped.to_string(), "skipped");
        assert!(LoginStatus::Skipped.is_logged_in());
        assert!(LoginStatus::Verified.is_logged_in());
        assert!(!LoginStatus::Rejected.is_logged_in());
    }
}
