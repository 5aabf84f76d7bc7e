//! Endpoints and request headers for the Twitter web API.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, REFERER};

use crate::{CheckError, Result};

/// Public bearer token used by the web client.
pub const BEARER_TOKEN: &str = "AAAAAAAAAAAAAAAAAAAAAFQODgEAAAAAVHTp76lzh3rFzcHbmHVvQxYYpTw%3DckAlMINMjmCwxUcaXbAN4XqJVdgMJaHqNOFgPMK0zN1qLqLQCF";

/// Credential check endpoint.
pub const VERIFY_ENDPOINT: &str = "https://twitter.com/i/api/1.1/account/verify_credentials.json?skip_status=1&include_email=false";

/// GraphQL search timeline endpoint.
pub const SEARCH_ENDPOINT: &str = "https://twitter.com/i/api/graphql/nK1dw4oV3k4w5TdtcAdSww/SearchTimeline";

/// Browser user agent sent with every request.
pub const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/129.0.0.0 Safari/537.36";

/// Headers required on cookie-authenticated API calls.
pub fn auth_headers(csrf_token: &str) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", BEARER_TOKEN))
            .map_err(|e| CheckError::Parse(format!("invalid bearer header: {}", e)))?,
    );
    headers.insert(
        "x-csrf-token",
        HeaderValue::from_str(csrf_token)
            .map_err(|e| CheckError::Parse(format!("invalid ct0 value: {}", e)))?,
    );
    headers.insert("x-twitter-auth-type", HeaderValue::from_static("OAuth2Session"));
    headers.insert("x-twitter-active-user", HeaderValue::from_static("yes"));
    headers.insert(REFERER, HeaderValue::from_static("https://twitter.com/"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json, text/plain, */*"));
    Ok(headers)
}
