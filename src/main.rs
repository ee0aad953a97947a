//! # News Summarizer
//!
//! Fetches news articles, extracts their text with a two-strategy HTML
//! pipeline, and asks an OpenAI-compatible LLM for a summary, key points,
//! sentiment and strategic insights.
//!
//! ## Usage
//!
//! ```sh
//! news_summarizer --url https://www.bbc.com/news/business-12345
//! news_summarizer --urls https://a.example/1 https://b.example/2 --save
//! news_summarizer --rss https://feeds.bbci.co.uk/news/rss.xml --limit 3 --style executive
//! ```
//!
//! ## Architecture
//!
//! 1. **Extraction**: [`scrapers::NewsParser`] runs the generic extractor and
//!    falls back to per-site CSS selectors
//! 2. **Summarization**: [`summarizer::Summarizer`] issues four completions
//!    per article through [`api::RetryAsk`]
//! 3. **Orchestration**: [`app::SummarizerApp`] handles single URLs, batches
//!    and feeds with politeness pacing
//! 4. **Output**: console rendering and an optional JSON file

use clap::Parser;
use std::error::Error;
use std::process::ExitCode;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod app;
mod cli;
mod config;
mod models;
mod outputs;
mod scrapers;
mod summarizer;
mod utils;

use api::client_with_backoff;
use app::SummarizerApp;
use cli::{Cli, Input};
use config::{AppConfig, Overrides};
use models::ProcessingOutcome;
use outputs::{console, json};
use scrapers::{ArticleSource, NewsParser};
use scrapers::http::HttpFetcher;
use summarizer::{Summarizer, SummaryStyle};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", error_line(e.as_ref()));
            ExitCode::FAILURE
        }
    }
}

/// The one line a fatal error is reported with.
fn error_line(e: &dyn Error) -> String {
    format!("Error: {e}")
}

#[instrument]
async fn run() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    let start_time = std::time::Instant::now();
    info!("news_summarizer starting up");

    match dotenvy::dotenv() {
        Ok(path) => debug!(path = %path.display(), "Loaded .env"),
        Err(e) if e.not_found() => {}
        Err(e) => warn!(error = %e, "Ignoring unreadable .env"),
    }

    let args = Cli::parse();
    debug!(input = ?args.input(), style = %args.style, "Parsed CLI arguments");

    // Validate everything before touching the network.
    let style: SummaryStyle = match args.style.parse() {
        Ok(style) => style,
        Err(e) => {
            error!(error = %e, "Invalid summary style");
            return Err(e.into());
        }
    };

    let overrides = Overrides {
        api_key: args.api_key.clone(),
        model: args.model.clone(),
        concurrency: args.concurrency.map(|n| n as usize),
    };
    let config = match AppConfig::load(args.config.as_deref(), overrides) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Configuration failed");
            return Err(e.into());
        }
    };

    let fetcher = HttpFetcher::new(&config.http)?;
    let parser = NewsParser::new(fetcher);

    if args.extract_only {
        run_extract_only(&args, &config, &parser).await?;
        info!(elapsed = ?start_time.elapsed(), "Execution complete");
        return Ok(());
    }

    let api_key = config.api_key().inspect_err(|e| error!(error = %e, "Configuration failed"))?;
    let api = client_with_backoff(&config.llm, api_key)?;
    let app = SummarizerApp::new(parser, Summarizer::new(api), config.pacing.batch_delay())
        .with_concurrency(config.pacing.concurrency);

    let results: Vec<ProcessingOutcome> = match args.input() {
        Input::Url(url) => match app.process_single_url(url, style).await {
            Ok(record) => vec![record.into()],
            Err(e) => {
                error!(%url, error = %e, "Application failed");
                return Err(e.into());
            }
        },
        Input::Urls(urls) => app.process_multiple_urls(urls, style).await,
        Input::Rss(feed) => match app.process_rss_feed(feed, style, args.limit as usize).await {
            Ok(results) => results,
            Err(e) => {
                error!(%feed, error = %e, "Application failed");
                return Err(e.into());
            }
        },
    };

    console::print_outcomes(&results);
    save_if_requested(&args, &results).await;

    let failed = results.iter().filter(|r| r.is_failed()).count();
    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        total = results.len(),
        successful = results.len() - failed,
        failed,
        "Execution complete"
    );
    Ok(())
}

/// Extraction without summarization: print the records as JSON.
#[instrument(level = "info", skip_all)]
async fn run_extract_only(
    args: &Cli,
    config: &AppConfig,
    parser: &NewsParser,
) -> Result<(), Box<dyn Error>> {
    match args.input() {
        Input::Url(url) => emit(args, &[parser.parse_news_url(url).await]).await,
        Input::Urls(urls) => {
            let articles = parser
                .batch_parse_urls(urls, config.pacing.parse_delay())
                .await;
            emit(args, &articles).await
        }
        Input::Rss(feed) => {
            let entries = parser.parse_rss_feed(feed, args.limit as usize).await;
            if entries.is_empty() {
                error!(%feed, "Feed produced no entries");
                return Err(app::AppError::EmptyFeed(feed.to_string()).into());
            }
            emit(args, &entries).await
        }
    }
}

async fn emit<T: serde::Serialize>(args: &Cli, items: &[T]) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(items)?);
    save_if_requested(args, items).await;
    Ok(())
}

/// Honour `--save`; a failed save is reported but does not fail the run.
async fn save_if_requested<T: serde::Serialize>(args: &Cli, results: &[T]) {
    let Some(save) = &args.save else {
        return;
    };
    match json::save_results(results, save.as_deref()).await {
        Ok(path) => println!("\nResults saved to {}", path.display()),
        Err(e) => {
            error!(error = %e, "Failed to save results");
            eprintln!("Error: failed to save results: {e}");
        }
    }
}
