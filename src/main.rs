//! cookie-probe CLI - check exported Twitter/X cookies end to end.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use cookie_probe::{
    config::{Overrides, RunConfig},
    format::{render, OutputFormat},
    HttpSession, LoginCheck, Pipeline,
};

/// Verify exported session cookies and run a live search with them
#[derive(Parser)]
#[command(name = "cookie-probe")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Cookie file path [env: TWITTER_COOKIE_FILE, default: <cookies dir>/<X_ACCOUNT>_twitter_cookies.json]
    #[arg(short, long)]
    cookies: Option<PathBuf>,

    /// Search query [env: SCRAPER_TEST_QUERY, default: from:<X_ACCOUNT>]
    #[arg(short, long)]
    query: Option<String>,

    /// Maximum number of tweets [env: SCRAPER_TEST_COUNT, default: 10]
    #[arg(short = 'n', long)]
    count: Option<usize>,

    /// Proxy URL, e.g. socks5://127.0.0.1:1080 [env: TWITTER_SCRAPER_PROXY]
    #[arg(short, long)]
    proxy: Option<String>,

    /// Output JSON (same as --format json)
    #[arg(long)]
    json: bool,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    /// Whether the session login check hits the API
    #[arg(long, default_value = "verify")]
    login_check: LoginCheckArg,

    /// Search deadline in seconds
    #[arg(
        short,
        long,
        default_value = "300",
        value_parser = clap::value_parser!(u64).range(1..=86_400)
    )]
    timeout: u64,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum LoginCheckArg {
    /// Ask the API whether the session is logged in
    Verify,
    /// Assume the session is logged in
    Skip,
}

impl From<LoginCheckArg> for LoginCheck {
    fn from(arg: LoginCheckArg) -> Self {
        match arg {
            LoginCheckArg::Verify => LoginCheck::Verify,
            LoginCheckArg::Skip => LoginCheck::Skip,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", error_chain(&e));
            ExitCode::FAILURE
        }
    }
}

/// Joins the error and its causes with ": ", skipping a cause whose text
/// the previous message already ends with.
fn error_chain(err: &anyhow::Error) -> String {
    let mut out = String::new();
    let mut previous = String::new();
    for cause in err.chain() {
        let message = cause.to_string();
        if previous.ends_with(&message) {
            continue;
        }
        if !out.is_empty() {
            out.push_str(": ");
        }
        out.push_str(&message);
        previous = message;
    }
    out
}

async fn run(cli: Cli) -> Result<()> {
    let format = if cli.json { OutputFormat::Json } else { cli.format };
    let overrides = Overrides {
        cookies: cli.cookies,
        query: cli.query,
        count: cli.count,
        proxy: cli.proxy,
        format,
        login_check: cli.login_check.into(),
        deadline: Duration::from_secs(cli.timeout),
    };

    let config = RunConfig::resolve(overrides).context("Invalid invocation")?;
    info!("Using cookie file: {}", config.cookie_file.display());
    info!("Search query: {} (max {})", config.query, config.count);
    if let Some(proxy) = &config.proxy {
        info!("Proxy: {}", proxy.redacted());
    }

    let session = HttpSession::new().context("Failed to create session")?;
    let pipeline = Pipeline::new(config);
    let report = pipeline.run(session).await.context("Cookie check failed")?;
    info!(
        "Direct verification: passed, session login: {}",
        report.login
    );

    let output = render(&report.result, pipeline.config().format)
        .context("Failed to render results")?;
    println!("{}", output);

    Ok(())
}
