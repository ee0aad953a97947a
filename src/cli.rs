//! Command-line interface definitions for the news summarizer.
//!
//! Exactly one input mode is required: `--url`, `--urls` or `--rss`. Other
//! options tune the summary style and output. The API key may also come
//! from the environment.

use clap::{ArgGroup, Parser};
use std::path::PathBuf;

/// Command-line arguments.
///
/// # Examples
///
/// ```sh
/// # One article
/// news_summarizer --url https://www.bbc.com/news/business-12345
///
/// # Several articles, detailed summaries, saved to a chosen file
/// news_summarizer --urls https://a.example/1 https://b.example/2 --style detailed --save out.json
///
/// # First three entries of a feed, saved under the default name
/// news_summarizer --rss https://feeds.bbci.co.uk/news/rss.xml --limit 3 --save
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
#[command(group(ArgGroup::new("input").required(true).args(["url", "urls", "rss"])))]
pub struct Cli {
    /// Single news URL to process
    #[arg(long)]
    pub url: Option<String>,

    /// Multiple news URLs to process
    #[arg(long, num_args = 1..)]
    pub urls: Vec<String>,

    /// RSS or Atom feed URL to process
    #[arg(long)]
    pub rss: Option<String>,

    /// Summary style: concise, detailed, bullet_points or executive
    #[arg(long, default_value = "concise")]
    pub style: String,

    /// Number of feed entries to process
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u64).range(1..))]
    pub limit: u64,

    /// Save results as JSON; a timestamped name is used when no file is given
    #[arg(long, num_args = 0..=1, value_name = "FILE")]
    pub save: Option<Option<PathBuf>>,

    /// OpenAI-compatible API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Optional path to a config.yaml file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Items processed concurrently (1 = sequential)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub concurrency: Option<u64>,

    /// Chat model name
    #[arg(long)]
    pub model: Option<String>,

    /// Only extract articles (or feed entries) and print them as JSON; no LLM calls
    #[arg(long)]
    pub extract_only: bool,
}

/// The selected input mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input<'a> {
    Url(&'a str),
    Urls(&'a [String]),
    Rss(&'a str),
}

impl Cli {
    pub fn input(&self) -> Input<'_> {
        if let Some(url) = &self.url {
            Input::Url(url)
        } else if let Some(feed) = &self.rss {
            Input::Rss(feed)
        } else {
            Input::Urls(&self.urls)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_url_defaults() {
        let cli = Cli::parse_from(["news_summarizer", "--url", "https://example.com/a"]);
        assert_eq!(cli.input(), Input::Url("https://example.com/a"));
        assert_eq!(cli.style, "concise");
        assert_eq!(cli.limit, 5);
        assert!(cli.save.is_none());
        assert!(cli.concurrency.is_none());
        assert!(!cli.extract_only);
    }

    #[test]
    fn test_extract_only_flag() {
        let cli = Cli::parse_from([
            "news_summarizer",
            "--urls",
            "https://a.example/1",
            "--extract-only",
            "--concurrency",
            "2",
        ]);
        assert!(cli.extract_only);
        assert_eq!(cli.concurrency, Some(2));
    }

    #[test]
    fn test_multiple_urls() {
        let cli = Cli::parse_from([
            "news_summarizer",
            "--urls",
            "https://a.example/1",
            "https://b.example/2",
            "--style",
            "bullet_points",
        ]);
        match cli.input() {
            Input::Urls(urls) => assert_eq!(urls.len(), 2),
            other => panic!("unexpected input {other:?}"),
        }
        assert_eq!(cli.style, "bullet_points");
    }

    #[test]
    fn test_save_with_and_without_filename() {
        let cli = Cli::parse_from(["news_summarizer", "--rss", "https://f.example/rss", "--save"]);
        assert_eq!(cli.save, Some(None));

        let cli = Cli::parse_from([
            "news_summarizer",
            "--rss",
            "https://f.example/rss",
            "--save",
            "out.json",
            "--limit",
            "3",
        ]);
        assert_eq!(cli.save, Some(Some(PathBuf::from("out.json"))));
        assert_eq!(cli.limit, 3);
        assert_eq!(cli.input(), Input::Rss("https://f.example/rss"));
    }

    #[test]
    fn test_input_is_required_and_exclusive() {
        assert!(Cli::try_parse_from(["news_summarizer"]).is_err());
        assert!(
            Cli::try_parse_from([
                "news_summarizer",
                "--url",
                "https://a.example",
                "--rss",
                "https://b.example/rss",
            ])
            .is_err()
        );
    }

    #[test]
    fn test_zero_limit_rejected() {
        assert!(
            Cli::try_parse_from(["news_summarizer", "--rss", "https://f.example", "--limit", "0"])
                .is_err()
        );
    }
}
