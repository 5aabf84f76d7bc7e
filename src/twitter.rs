//! Cookie-authenticated session over the Twitter web API.
//!
//! Search pages through the GraphQL `SearchTimeline` endpoint using the
//! bottom cursor of each response, the same way the web client scrolls.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::DateTime;
use futures::StreamExt;
use reqwest::cookie::Jar;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use tracing::{debug, warn};
use url::Url;

use crate::api::{auth_headers, SEARCH_ENDPOINT, VERIFY_ENDPOINT};
use crate::proxy::{build_http_client, ProxyConfig};
use crate::session::TweetStream;
use crate::{CheckError, CookieSet, Result, SearchMode, Tweet, TwitterSession};

/// Largest page the search timeline serves.
const PAGE_SIZE: usize = 50;

/// Longest response body kept in error messages.
const MAX_ERROR_BODY: usize = 512;

const TWEET_DATE_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

const SEARCH_FEATURES: &str = r#"{"rweb_lists_timeline_redesign_enabled":true,"responsive_web_graphql_exclude_directive_enabled":true,"verified_phone_label_enabled":false,"creator_subscriptions_tweet_preview_api_enabled":true,"responsive_web_graphql_timeline_navigation_enabled":true,"responsive_web_graphql_skip_user_profile_image_extensions_enabled":false,"tweetypie_unmention_optimization_enabled":true,"responsive_web_edit_tweet_api_enabled":true,"graphql_is_translatable_rweb_tweet_is_translatable_enabled":true,"view_counts_everywhere_api_enabled":true,"longform_notetweets_consumption_enabled":true,"responsive_web_twitter_article_tweet_consumption_enabled":false,"tweet_awards_web_tipping_enabled":false,"freedom_of_speech_not_reach_fetch_enabled":true,"standardized_nudges_misinfo":true,"tweet_with_visibility_results_prefer_gql_limited_actions_policy_enabled":true,"longform_notetweets_rich_text_read_enabled":true,"longform_notetweets_inline_media_enabled":true,"responsive_web_media_download_video_enabled":false,"responsive_web_enhance_cards_enabled":false}"#;

/// A [`TwitterSession`] backed by reqwest.
pub struct HttpSession {
    client: Client,
    jar: Arc<Jar>,
    proxy: Option<ProxyConfig>,
    csrf_token: Option<String>,
    verify_endpoint: Url,
    search_endpoint: Url,
}

impl HttpSession {
    /// Creates a session against the public endpoints.
    pub fn new() -> Result<Self> {
        Self::with_endpoints(VERIFY_ENDPOINT, SEARCH_ENDPOINT)
    }

    /// Creates a session against custom endpoints.
    pub fn with_endpoints(verify_endpoint: &str, search_endpoint: &str) -> Result<Self> {
        let verify_endpoint = Url::parse(verify_endpoint)
            .map_err(|e| CheckError::Config(format!("invalid verify endpoint: {}", e)))?;
        let search_endpoint = Url::parse(search_endpoint)
            .map_err(|e| CheckError::Config(format!("invalid search endpoint: {}", e)))?;
        let jar = Arc::new(Jar::default());
        let client = build_http_client(None, Some(Arc::clone(&jar)))?;

        Ok(Self {
            client,
            jar,
            proxy: None,
            csrf_token: None,
            verify_endpoint,
            search_endpoint,
        })
    }

    fn rebuild_client(&mut self) -> Result<()> {
        self.client = build_http_client(self.proxy.as_ref(), Some(Arc::clone(&self.jar)))?;
        Ok(())
    }

    fn csrf_token(&self) -> Result<&str> {
        self.csrf_token
            .as_deref()
            .ok_or_else(|| CheckError::Login("no ct0 cookie set on session".into()))
    }

    async fn fetch_page(
        &self,
        query: &str,
        count: usize,
        mode: SearchMode,
        cursor: Option<&str>,
    ) -> Result<Page> {
        let mut variables = json!({
            "rawQuery": query,
            "count": count,
            "querySource": "typed_query",
            "product": mode.product(),
        });
        if let Some(cursor) = cursor {
            variables["cursor"] = Value::String(cursor.to_string());
        }

        let mut url = self.search_endpoint.clone();
        url.query_pairs_mut()
            .append_pair("variables", &variables.to_string())
            .append_pair("features", SEARCH_FEATURES);

        let response = self
            .client
            .get(url)
            .headers(auth_headers(self.csrf_token()?)?)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if status != StatusCode::OK {
            return Err(CheckError::Api {
                status: status.as_u16(),
                body: truncate(body, MAX_ERROR_BODY),
            });
        }

        let value: Value = serde_json::from_str(&body)
            .map_err(|e| CheckError::Parse(format!("search response is not JSON: {}", e)))?;
        let page = parse_page(&value)?;
        debug!(
            "Search page returned {} tweets, cursor: {:?}",
            page.tweets.len(),
            page.cursor
        );
        Ok(page)
    }
}

#[async_trait]
impl TwitterSession for HttpSession {
    fn set_cookies(&mut self, cookies: &CookieSet) -> Result<()> {
        self.jar = cookies.jar_for(&self.search_endpoint);
        self.csrf_token = cookies.csrf_token().map(str::to_string);
        self.rebuild_client()
    }

    fn set_proxy(&mut self, proxy: &ProxyConfig) -> Result<()> {
        self.proxy = Some(proxy.clone());
        self.rebuild_client()
    }

    async fn is_logged_in(&self) -> bool {
        let headers = match self.csrf_token().and_then(auth_headers) {
            Ok(headers) => headers,
            Err(e) => {
                warn!("Cannot check login: {}", e);
                return false;
            }
        };

        match self
            .client
            .get(self.verify_endpoint.clone())
            .headers(headers)
            .send()
            .await
        {
            Ok(response) => {
                debug!("Login check returned {}", response.status());
                response.status() == StatusCode::OK
            }
            Err(e) => {
                warn!("Login check request failed: {}", e);
                false
            }
        }
    }

    fn search<'a>(&'a self, query: &'a str, max_count: usize, mode: SearchMode) -> TweetStream<'a> {
        let state = SearchState {
            cursor: None,
            remaining: max_count,
            buffer: VecDeque::new(),
            done: false,
        };

        futures::stream::unfold(state, move |mut state| async move {
            loop {
                if state.remaining == 0 {
                    return None;
                }
                if let Some(tweet) = state.buffer.pop_front() {
                    state.remaining -= 1;
                    return Some((Ok(tweet), state));
                }
                if state.done {
                    return None;
                }

                let count = state.remaining.min(PAGE_SIZE);
                match self
                    .fetch_page(query, count, mode, state.cursor.as_deref())
                    .await
                {
                    Ok(page) => {
                        if page.tweets.is_empty() {
                            state.done = true;
                        }
                        match page.cursor {
                            Some(next) if state.cursor.as_deref() != Some(next.as_str()) => {
                                state.cursor = Some(next);
                            }
                            _ => state.done = true,
                        }
                        state.buffer.extend(page.tweets);
                    }
                    Err(e) => {
                        state.done = true;
                        return Some((Err(e), state));
                    }
                }
            }
        })
        .boxed()
    }
}

struct SearchState {
    cursor: Option<String>,
    remaining: usize,
    buffer: VecDeque<Tweet>,
    done: bool,
}

/// One page of search results.
#[derive(Debug, Default)]
struct Page {
    tweets: Vec<Tweet>,
    cursor: Option<String>,
}

fn parse_page(value: &Value) -> Result<Page> {
    let instructions = value
        .pointer("/data/search_by_raw_query/search_timeline/timeline/instructions")
        .and_then(Value::as_array)
        .ok_or_else(|| CheckError::Parse("missing timeline instructions".into()))?;

    let mut page = Page::default();
    for instruction in instructions {
        let entries: Vec<&Value> = match instruction.get("type").and_then(Value::as_str) {
            Some("TimelineAddEntries") => instruction
                .get("entries")
                .and_then(Value::as_array)
                .map(|entries| entries.iter().collect())
                .unwrap_or_default(),
            Some("TimelineReplaceEntry") => instruction.get("entry").into_iter().collect(),
            _ => continue,
        };

        for entry in entries {
            let content = &entry["content"];
            if content.get("cursorType").and_then(Value::as_str) == Some("Bottom") {
                page.cursor = content
                    .get("value")
                    .and_then(Value::as_str)
                    .map(str::to_string);
                continue;
            }
            if let Some(result) = content.pointer("/itemContent/tweet_results/result") {
                if let Some(tweet) = parse_tweet(result) {
                    page.tweets.push(tweet);
                }
            }
        }
    }

    Ok(page)
}

/// Converts a GraphQL tweet result. Tombstones and unavailable tweets yield
/// `None`.
fn parse_tweet(result: &Value) -> Option<Tweet> {
    let result = match result.get("__typename").and_then(Value::as_str) {
        Some("TweetWithVisibilityResults") => result.get("tweet")?,
        _ => result,
    };
    let legacy = result.get("legacy")?;

    let id = legacy
        .get("id_str")
        .or_else(|| result.get("rest_id"))
        .and_then(Value::as_str)?
        .to_string();
    let username = result
        .pointer("/core/user_results/result/legacy/screen_name")
        .or_else(|| result.pointer("/core/user_results/result/core/screen_name"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let timestamp = legacy
        .get("created_at")
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_str(s, TWEET_DATE_FORMAT).ok())
        .map(|dt| dt.timestamp())
        .unwrap_or_default();

    Some(Tweet {
        id,
        text: str_field(legacy, "full_text"),
        username,
        timestamp,
        likes: count_field(legacy, "favorite_count"),
        retweets: count_field(legacy, "retweet_count"),
        replies: count_field(legacy, "reply_count"),
        is_retweet: legacy.get("retweeted_status_result").is_some(),
        urls: entity_strings(legacy, "urls", "expanded_url"),
        hashtags: entity_strings(legacy, "hashtags", "text"),
    })
}

fn str_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn count_field(value: &Value, key: &str) -> u64 {
    value.get(key).and_then(Value::as_u64).unwrap_or_default()
}

fn entity_strings(legacy: &Value, kind: &str, key: &str) -> Vec<String> {
    legacy
        .pointer(&format!("/entities/{}", kind))
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.get(key).and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn truncate(mut body: String, max: usize) -> String {
    if body.len() > max {
        let mut end = max;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        body.truncate(end);
        body.push_str("...");
    }
    body
}
