//! Data models for extracted articles and their summarized representations.
//!
//! This module defines the core data structures used throughout the application:
//! - [`ArticleRecord`]: Structured article produced by the extraction pipeline
//! - [`RssEntry`]: Lightweight feed stub, later re-fetched for full content
//! - [`SummaryRecord`]: LLM-enriched article (summary, key points, sentiment, insights)
//! - [`ProcessingOutcome`]: Per-item batch result, either a summary or a failure stand-in
//!
//! Everything here is serialized wholesale into the persisted JSON output.

use crate::scrapers::sites::SiteKey;
use serde::{Deserialize, Serialize};

/// Minimum content length (in characters) below which the selector-based
/// fallback is triggered.
pub const MIN_EXTRACTED_CHARS: usize = 100;

/// Minimum content length (in characters) required before summarization.
pub const MIN_SUMMARY_CHARS: usize = 50;

/// Which strategy produced an [`ArticleRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractionMethod {
    /// Readability-style heuristics over the whole document.
    Generic,
    /// Per-site CSS selector table.
    SelectorBased,
    /// Built from the feed entry alone (full re-fetch produced nothing usable).
    Rss,
    /// Every extractor failed.
    #[default]
    None,
}

impl ExtractionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionMethod::Generic => "generic",
            ExtractionMethod::SelectorBased => "selector-based",
            ExtractionMethod::Rss => "rss",
            ExtractionMethod::None => "none",
        }
    }
}

/// A news article as produced by the extraction pipeline.
///
/// `content` is the authoritative body text. A record whose `content` is
/// empty is still a valid value: the orchestrator never fails, it degrades.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ArticleRecord {
    /// The URL the article was fetched from.
    pub url: String,
    /// Selector-table key the URL's domain was classified as.
    pub website_type: SiteKey,
    pub title: String,
    pub content: String,
    pub summary: String,
    /// Comma-separated author names.
    pub author: String,
    pub date: String,
    pub keywords: Vec<String>,
    pub extraction_method: ExtractionMethod,
    /// Local capture time, `%Y-%m-%d %H:%M:%S`.
    pub extraction_time: String,
}

impl ArticleRecord {
    /// Length of the body text in characters (not bytes).
    pub fn content_chars(&self) -> usize {
        self.content.chars().count()
    }

    /// Minimal record used when every extraction strategy failed.
    pub fn empty(url: &str, website_type: SiteKey) -> Self {
        Self {
            url: url.to_string(),
            website_type,
            ..Self::default()
        }
    }
}

/// A single entry of an RSS or Atom feed. Missing fields are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RssEntry {
    pub title: String,
    pub summary: String,
    pub link: String,
    pub published: String,
    pub author: String,
}

impl RssEntry {
    /// Degraded article built from the feed data alone.
    pub fn to_article(&self, website_type: SiteKey, extraction_time: String) -> ArticleRecord {
        ArticleRecord {
            url: self.link.clone(),
            website_type,
            title: self.title.clone(),
            content: String::new(),
            summary: self.summary.clone(),
            author: self.author.clone(),
            date: self.published.clone(),
            keywords: Vec::new(),
            extraction_method: ExtractionMethod::Rss,
            extraction_time,
        }
    }
}

/// Overall tone of an article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    #[default]
    Neutral,
    Mixed,
}

impl SentimentLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
            SentimentLabel::Mixed => "mixed",
        }
    }
}

/// How sure the model claimed to be about its sentiment call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    #[default]
    Medium,
    Low,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::Low => "low",
        }
    }
}

/// Sentiment analysis result. `explanation` holds the raw model reply.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Sentiment {
    pub sentiment: SentimentLabel,
    pub confidence: Confidence,
    pub explanation: String,
}

impl Sentiment {
    /// Neutral, low-confidence placeholder with the given explanation.
    pub fn unknown(explanation: &str) -> Self {
        Self {
            sentiment: SentimentLabel::Neutral,
            confidence: Confidence::Low,
            explanation: explanation.to_string(),
        }
    }
}

/// An article together with everything the LLM produced for it.
///
/// Immutable once built; owned by whoever created it and serialized as-is.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SummaryRecord {
    pub original_article: ArticleRecord,
    pub summary: String,
    pub key_points: Vec<String>,
    pub sentiment: Sentiment,
    pub insights: Vec<String>,
    pub summary_style: String,
    pub generated_at: String,
    /// The feed entry this record came from, for RSS-driven runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rss_data: Option<RssEntry>,
}

/// Error-tagged stand-in for an item that could not be processed.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FailedItem {
    pub error: String,
    pub url: String,
    pub status: String,
}

impl FailedItem {
    pub fn new(url: &str, error: impl ToString) -> Self {
        Self {
            error: error.to_string(),
            url: url.to_string(),
            status: "failed".to_string(),
        }
    }
}

/// Result of processing one item of a batch or feed.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ProcessingOutcome {
    Failed(FailedItem),
    Summarized(Box<SummaryRecord>),
}

impl ProcessingOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, ProcessingOutcome::Failed(_))
    }
}

impl From<SummaryRecord> for ProcessingOutcome {
    fn from(record: SummaryRecord) -> Self {
        ProcessingOutcome::Summarized(Box::new(record))
    }
}

impl From<FailedItem> for ProcessingOutcome {
    fn from(failed: FailedItem) -> Self {
        ProcessingOutcome::Failed(failed)
    }
}
