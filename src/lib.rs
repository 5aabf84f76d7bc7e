//! # cookie-probe
//!
//! Smoke test for exported Twitter/X session cookies.
//!
//! Given a cookie file written by a browser export step, the check:
//!
//! - Loads and validates the cookies (`auth_token` and `ct0` must be present)
//! - Verifies them directly against the credential endpoint
//! - Confirms the login through a [`TwitterSession`]
//! - Runs one bounded live search and renders the tweets
//!
//! ## Example
//!
//! ```rust,no_run
//! use cookie_probe::{config::{Overrides, RunConfig}, HttpSession, Pipeline};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = RunConfig::resolve(Overrides::default())?;
//!     let report = Pipeline::new(config).run(HttpSession::new()?).await?;
//!
//!     for tweet in report.result.tweets() {
//!         println!("@{}: {}", tweet.username, tweet.text);
//!     }
//!     Ok(())
//! }
//! ```

mod api;
mod cookie;
mod error;
mod pipeline;
mod query;
mod result;
mod runner;
mod session;
mod twitter;
mod verify;

pub mod config;
pub mod format;
pub mod proxy;

pub use cookie::{Cookie, CookieSet, AUTH_TOKEN, CSRF_TOKEN};
pub use error::{CheckError, Result, VerifyError};
pub use pipeline::{CheckReport, Pipeline};
pub use query::{SearchMode, SearchRequest};
pub use result::{SearchResult, Tweet, TweetRecord};
pub use runner::SearchRunner;
pub use session::{LoginCheck, LoginStatus, SessionAdapter, TweetStream, TwitterSession};
pub use twitter::HttpSession;
pub use verify::DirectVerifier;
