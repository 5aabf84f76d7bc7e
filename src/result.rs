//! Tweet and search result types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A tweet as produced by a [`TwitterSession`](crate::TwitterSession).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tweet {
    pub id: String,
    pub text: String,
    pub username: String,
    /// Creation time in Unix seconds.
    pub timestamp: i64,
    pub likes: u64,
    pub retweets: u64,
    pub replies: u64,
    pub is_retweet: bool,
    pub urls: Vec<String>,
    pub hashtags: Vec<String>,
}

/// A tweet in its output form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TweetRecord {
    pub id: String,
    pub text: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub likes: u64,
    pub retweets: u64,
    pub replies: u64,
    pub is_retweet: bool,
    pub urls: Vec<String>,
    pub hashtags: Vec<String>,
}

impl From<Tweet> for TweetRecord {
    fn from(tweet: Tweet) -> Self {
        Self {
            id: tweet.id,
            text: tweet.text,
            username: tweet.username,
            created_at: DateTime::from_timestamp(tweet.timestamp, 0).unwrap_or_default(),
            likes: tweet.likes,
            retweets: tweet.retweets,
            replies: tweet.replies,
            is_retweet: tweet.is_retweet,
            urls: tweet.urls,
            hashtags: tweet.hashtags,
        }
    }
}

/// Tweets collected by one search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResult {
    tweets: Vec<TweetRecord>,
    /// Whether the search ran to completion.
    pub complete: bool,
    /// Whether collection stopped because the deadline passed.
    pub deadline_reached: bool,
}

impl SearchResult {
    /// Creates a finished result.
    pub fn completed(tweets: Vec<TweetRecord>, deadline_reached: bool) -> Self {
        Self {
            tweets,
            complete: true,
            deadline_reached,
        }
    }

    /// Returns the tweets in stream order.
    pub fn tweets(&self) -> &[TweetRecord] {
        &self.tweets
    }

    /// Consumes the result and returns the tweets.
    pub fn into_tweets(self) -> Vec<TweetRecord> {
        self.tweets
    }

    /// Returns the number of tweets.
    pub fn len(&self) -> usize {
        self.tweets.len()
    }

    /// Returns whether no tweets were collected.
    pub fn is_empty(&self) -> bool {
        self.tweets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tweet() -> Tweet {
        Tweet {
            id: "1790000000000000000".to_string(),
            text: "hello #rust https://t.co/x".to_string(),
            username: "someone".to_string(),
            timestamp: 1_700_000_000,
            likes: 3,
            retweets: 2,
            replies: 1,
            is_retweet: false,
            urls: vec!["https://example.com".to_string()],
            hashtags: vec!["rust".to_string()],
        }
    }

    #[test]
    fn test_tweet_record_from_tweet() {
        let record = TweetRecord::from(tweet());
        assert_eq!(record.id, "1790000000000000000");
        assert_eq!(record.username, "someone");
        assert_eq!(record.created_at.timestamp(), 1_700_000_000);
        assert_eq!(record.hashtags, vec!["rust"]);
    }

    #[test]
    fn test_tweet_record_json_field_names() {
        let record = TweetRecord::from(tweet());
        let value = serde_json::to_value(&record).unwrap();
        for field in [
            "id",
            "text",
            "username",
            "created_at",
            "likes",
            "retweets",
            "replies",
            "is_retweet",
            "urls",
            "hashtags",
        ] {
            assert!(value.get(field).is_some(), "missing field {}", field);
        }
        assert_eq!(value["created_at"], "2023-11-14T22:13:20Z");
    }

    #[test]
    fn test_tweet_record_json_round_trip() {
        let records = vec![
            TweetRecord::from(tweet()),
            TweetRecord::from(Tweet {
                id: "2".into(),
                is_retweet: true,
                ..Tweet::default()
            }),
        ];
        let json = serde_json::to_string(&records).unwrap();
        let parsed: Vec<TweetRecord> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, records);
    }

    #[test]
    fn test_search_result_completed() {
        let result = SearchResult::completed(vec![TweetRecord::from(tweet())], true);
        assert!(result.complete);
        assert!(result.deadline_reached);
        assert_eq!(result.len(), 1);
        assert!(!result.is_empty());
    }

    #[test]
    fn test_search_result_default_is_empty() {
        let result = SearchResult::default();
        assert!(result.is_empty());
        assert!(!result.complete);
    }
}
