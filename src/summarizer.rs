//! LLM-backed summarization of extracted articles.
//!
//! [`Summarizer`] issues four independent completions per article:
//!
//! | Call | Persona | Temperature | Token budget | On failure |
//! |------|---------|-------------|--------------|------------|
//! | summary | news analyst and summarizer | 0.3 (top_p 0.9) | words × 2 | error |
//! | key points | news analyst | 0.2 | 300 | `[]` |
//! | sentiment | sentiment analysis expert | 0.1 | 200 | neutral / low |
//! | insights | business analyst | 0.4 | 400 | `[]` |
//!
//! Replies are free text. Lists are recovered with [`parse_list_items`] and
//! sentiment with [`parse_sentiment`].

use crate::api::{ApiError, AskAsync, ChatRequest};
use crate::models::{
    ArticleRecord, Confidence, MIN_SUMMARY_CHARS, Sentiment, SentimentLabel, SummaryRecord,
};
use crate::utils::capture_timestamp;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::{error, info, instrument};

static LIST_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\d•\-*.\s]+").unwrap());
static SENTENCE_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]+").unwrap());

/// Prose-fallback sentences must be longer than this to count as items.
const MIN_SENTENCE_CHARS: usize = 20;

pub const DEFAULT_KEY_POINTS: usize = 5;
const MIN_INSIGHTS: usize = 3;
const MAX_INSIGHTS: usize = 5;

#[derive(Error, Debug)]
pub enum SummarizeError {
    #[error(
        "unknown summary style {0:?}; expected concise, detailed, bullet_points or executive"
    )]
    InvalidStyle(String),
    #[error("article content is too short or empty ({chars} chars, need {MIN_SUMMARY_CHARS})")]
    ContentTooShort { chars: usize },
    #[error("summary generation failed: {0}")]
    Generation(#[from] ApiError),
}

/// Shape and length of the generated summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SummaryStyle {
    #[default]
    Concise,
    Detailed,
    BulletPoints,
    Executive,
}

impl SummaryStyle {
    pub const ALL: [SummaryStyle; 4] = [
        SummaryStyle::Concise,
        SummaryStyle::Detailed,
        SummaryStyle::BulletPoints,
        SummaryStyle::Executive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryStyle::Concise => "concise",
            SummaryStyle::Detailed => "detailed",
            SummaryStyle::BulletPoints => "bullet_points",
            SummaryStyle::Executive => "executive",
        }
    }

    /// Approximate target length in words.
    pub fn word_budget(&self) -> u32 {
        match self {
            SummaryStyle::Concise => 200,
            SummaryStyle::Detailed => 400,
            SummaryStyle::BulletPoints => 200,
            SummaryStyle::Executive => 250,
        }
    }

    fn instruction(&self) -> String {
        let words = self.word_budget();
        match self {
            SummaryStyle::Concise => format!(
                "Please provide a concise summary of the following news article in approximately \
                 {words} words. Focus on the main facts, key points, and essential information."
            ),
            SummaryStyle::Detailed => format!(
                "Please provide a detailed summary of the following news article in approximately \
                 {words} words. Include main facts, context, key quotes, and implications."
            ),
            SummaryStyle::BulletPoints => "Please provide a summary of the following news article \
                 in bullet point format. Focus on main facts, key points, and important details."
                .to_string(),
            SummaryStyle::Executive => format!(
                "Please provide an executive summary of the following news article in \
                 approximately {words} words. Focus on business implications, key decisions, \
                 and strategic insights."
            ),
        }
    }
}

impl FromStr for SummaryStyle {
    type Err = SummarizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SummaryStyle::ALL
            .into_iter()
            .find(|style| style.as_str() == s)
            .ok_or_else(|| SummarizeError::InvalidStyle(s.to_string()))
    }
}

impl fmt::Display for SummaryStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn article_prompt(instruction: &str, content: &str, label: &str) -> String {
    format!("{instruction}\n\nArticle content:\n{content}\n\n{label}:")
}

/// Summary, key-point, sentiment and insight generation over an [`AskAsync`] backend.
#[derive(Debug)]
pub struct Summarizer<A> {
    api: A,
}

impl<A: AskAsync> Summarizer<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    /// Summarize `content` in the given style. Errors propagate.
    #[instrument(level = "info", skip(self, content), fields(chars = content.chars().count()))]
    pub async fn generate_summary(
        &self,
        content: &str,
        style: SummaryStyle,
    ) -> Result<String, SummarizeError> {
        let request = ChatRequest {
            system: "You are a professional news analyst and summarizer. Provide accurate, \
                     objective, and well-structured summaries."
                .to_string(),
            prompt: article_prompt(&style.instruction(), content, "Summary"),
            temperature: 0.3,
            top_p: Some(0.9),
            max_tokens: Some(style.word_budget() * 2),
        };
        let summary = self.api.ask(&request).await?;
        info!(%style, chars = summary.chars().count(), "Generated summary");
        Ok(summary)
    }

    /// Extract `n` key points; any failure yields an empty list.
    #[instrument(level = "info", skip(self, content))]
    pub async fn generate_key_points(&self, content: &str, n: usize) -> Vec<String> {
        let request = ChatRequest {
            system: "You are a news analyst. Extract key factual points from news articles."
                .to_string(),
            prompt: article_prompt(
                &format!(
                    "Please extract {n} key points from the following news article. Each point \
                     should be a concise, factual statement."
                ),
                content,
                "Key points",
            ),
            temperature: 0.2,
            top_p: None,
            max_tokens: Some(300),
        };
        match self.api.ask(&request).await {
            Ok(reply) => parse_list_items(&reply, n, n),
            Err(e) => {
                error!(error = %e, "Failed to generate key points");
                Vec::new()
            }
        }
    }

    /// Classify tone and confidence; any failure yields neutral / low.
    #[instrument(level = "info", skip_all)]
    pub async fn analyze_sentiment(&self, content: &str) -> Sentiment {
        let request = ChatRequest {
            system: "You are a sentiment analysis expert. Analyze news articles objectively."
                .to_string(),
            prompt: article_prompt(
                "Please analyze the sentiment of the following news article. Provide:\n\
                 1. Overall sentiment (positive, negative, neutral, or mixed)\n\
                 2. Confidence level (high, medium, or low)\n\
                 3. Brief explanation",
                content,
                "Analysis",
            ),
            temperature: 0.1,
            top_p: None,
            max_tokens: Some(200),
        };
        match self.api.ask(&request).await {
            Ok(reply) => parse_sentiment(&reply),
            Err(e) => {
                error!(error = %e, "Failed to analyze sentiment");
                Sentiment::unknown("Sentiment analysis failed")
            }
        }
    }

    /// Three to five strategic insights; any failure yields an empty list.
    #[instrument(level = "info", skip_all)]
    pub async fn generate_insights(&self, content: &str) -> Vec<String> {
        let request = ChatRequest {
            system: "You are a business analyst. Provide strategic insights from news articles."
                .to_string(),
            prompt: article_prompt(
                "Please provide 3-5 key insights or implications from the following news \
                 article. Focus on:\n- Business implications\n- Market impact\n\
                 - Strategic considerations\n- Future trends",
                content,
                "Insights",
            ),
            temperature: 0.4,
            top_p: None,
            max_tokens: Some(400),
        };
        match self.api.ask(&request).await {
            Ok(reply) => parse_list_items(&reply, MIN_INSIGHTS, MAX_INSIGHTS),
            Err(e) => {
                error!(error = %e, "Failed to generate insights");
                Vec::new()
            }
        }
    }

    /// Run all four generations for `article`.
    ///
    /// Content shorter than [`MIN_SUMMARY_CHARS`] is rejected before any
    /// request is made. Only a summary failure is fatal.
    #[instrument(level = "info", skip_all, fields(url = %article.url, %style))]
    pub async fn summarize_article(
        &self,
        article: &ArticleRecord,
        style: SummaryStyle,
    ) -> Result<SummaryRecord, SummarizeError> {
        let chars = article.content_chars();
        if chars < MIN_SUMMARY_CHARS {
            return Err(SummarizeError::ContentTooShort { chars });
        }
        let content = article.content.as_str();

        let summary = self.generate_summary(content, style).await?;
        let key_points = self.generate_key_points(content, DEFAULT_KEY_POINTS).await;
        let sentiment = self.analyze_sentiment(content).await;
        let insights = self.generate_insights(content).await;

        info!(
            key_points = key_points.len(),
            insights = insights.len(),
            sentiment = ?sentiment.sentiment,
            "Summarized article"
        );
        Ok(SummaryRecord {
            original_article: article.clone(),
            summary,
            key_points,
            sentiment,
            insights,
            summary_style: style.as_str().to_string(),
            generated_at: capture_timestamp(),
            rss_data: None,
        })
    }
}

/// Recover list items from a free-text model reply.
///
/// Lines starting with a digit, `•`, `-` or `*` are taken as items with
/// their leading markers stripped. If that yields fewer than `min` items,
/// the reply is instead split into sentences and those longer than 20
/// characters are kept. At most `max` items are returned.
pub fn parse_list_items(reply: &str, min: usize, max: usize) -> Vec<String> {
    let mut items: Vec<String> = reply
        .lines()
        .map(str::trim)
        .filter(|line| {
            line.chars()
                .next()
                .is_some_and(|c| c.is_ascii_digit() || matches!(c, '•' | '-' | '*'))
        })
        .map(|line| LIST_PREFIX.replace(line, "").trim().to_string())
        .filter(|item| !item.is_empty())
        .collect();

    if items.len() < min {
        items = SENTENCE_END
            .split(reply)
            .map(str::trim)
            .filter(|s| s.chars().count() > MIN_SENTENCE_CHARS)
            .map(str::to_string)
            .collect();
    }
    items.truncate(max);
    items
}

/// Keyword-spot the tone and confidence in a free-text sentiment reply.
///
/// The first of positive, negative or mixed found in the lower-cased reply
/// wins (default neutral). Then high or low (default medium). The reply is
/// kept verbatim as the explanation.
pub fn parse_sentiment(reply: &str) -> Sentiment {
    let lower = reply.to_lowercase();
    let sentiment = if lower.contains("positive") {
        SentimentLabel::Positive
    } else if lower.contains("negative") {
        SentimentLabel::Negative
    } else if lower.contains("mixed") {
        SentimentLabel::Mixed
    } else {
        SentimentLabel::Neutral
    };
    let confidence = if lower.contains("high") {
        Confidence::High
    } else if lower.contains("low") {
        Confidence::Low
    } else {
        Confidence::Medium
    };
    Sentiment {
        sentiment,
        confidence,
        explanation: reply.to_string(),
    }
}
