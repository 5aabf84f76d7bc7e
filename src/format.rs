//! Rendering of search results.

use std::fmt::Write;

use clap::ValueEnum;

use crate::{CheckError, Result, SearchResult};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output
    Json,
    /// Compact single-line output
    Compact,
}

/// Renders `result` in the requested format.
pub fn render(result: &SearchResult, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(result)),
        OutputFormat::Json => {
            serde_json::to_string_pretty(result.tweets()).map_err(CheckError::Serialization)
        }
        OutputFormat::Compact => Ok(render_compact(result)),
    }
}

fn render_text(result: &SearchResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n=== Search results ({} tweets) ===\n", result.len());

    for (i, tweet) in result.tweets().iter().enumerate() {
        let _ = writeln!(out, "--- Tweet {} ---", i + 1);
        let _ = writeln!(out, "User: @{}", tweet.username);
        let _ = writeln!(out, "Time: {}", tweet.created_at.format(TIME_FORMAT));
        let _ = writeln!(out, "Text: {}", tweet.text);
        let _ = writeln!(
            out,
            "Engagement: ❤️ {} | 🔄 {} | 💬 {}",
            tweet.likes, tweet.retweets, tweet.replies
        );
        out.push('\n');
    }

    out
}

fn render_compact(result: &SearchResult) -> String {
    result
        .tweets()
        .iter()
        .map(|tweet| {
            let text = tweet.text.split_whitespace().collect::<Vec<_>>().join(" ");
            format!("{}\t@{}\t{}\n", tweet.id, tweet.username, text)
        })
        .collect()
}
