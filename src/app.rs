//! Application orchestration: extraction plus summarization per item.
//!
//! [`SummarizerApp`] drives three workflows:
//!
//! - **Single URL**: extract, then summarize. Any failure is returned.
//! - **URL batch**: each URL in order. A failure becomes a [`FailedItem`]
//!   in the output instead of aborting the batch.
//! - **Feed**: read entries, re-fetch each link and summarize it. Entries
//!   whose page yields too little text degrade to a record built from the
//!   feed data alone.
//!
//! # Pacing
//!
//! By default items run strictly in order with a fixed pause between them.
//! With `concurrency > 1` up to that many items are in flight at once
//! through an order-preserving `buffered` stream. A per-host pacer keeps
//! request starts against the same host at least one delay apart.

use crate::api::AskAsync;
use crate::models::{
    FailedItem, MIN_SUMMARY_CHARS, ProcessingOutcome, RssEntry, Sentiment, SummaryRecord,
};
use crate::scrapers::ArticleSource;
use crate::scrapers::sites::detect_website_type;
use crate::summarizer::{SummarizeError, Summarizer, SummaryStyle};
use crate::utils::capture_timestamp;
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::time::{sleep, sleep_until};
use tracing::{debug, error, info, instrument, warn};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("failed to extract article content")]
    NoContent,
    #[error(transparent)]
    Summarize(#[from] SummarizeError),
    #[error("no articles found in feed {0}")]
    EmptyFeed(String),
}

/// Spaces out request starts per host.
///
/// Each call reserves the earliest slot at least `delay` after the previous
/// reservation for the same host, so concurrent callers queue up in order.
#[derive(Debug)]
struct HostPacer {
    delay: Duration,
    next_slot: Mutex<HashMap<String, Instant>>,
}

impl HostPacer {
    fn new(delay: Duration) -> Self {
        Self {
            delay,
            next_slot: Mutex::new(HashMap::new()),
        }
    }

    fn reserve(&self, host: &str) -> Instant {
        let now = Instant::now();
        let mut slots = match self.next_slot.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let slot = slots
            .get(host)
            .map_or(now, |last| (*last + self.delay).max(now));
        slots.insert(host.to_string(), slot);
        slot
    }

    async fn wait_turn(&self, url: &str) {
        let host = host_of(url);
        let slot = self.reserve(&host);
        if slot > Instant::now() {
            let wait = slot.saturating_duration_since(Instant::now());
            debug!(%host, wait_ms = wait.as_millis() as u64, "Pacing host");
            sleep_until(slot.into()).await;
        }
    }
}

fn host_of(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_lowercase))
        .unwrap_or_default()
}

/// Ties a source of articles to a summarizer.
#[derive(Debug)]
pub struct SummarizerApp<P, A> {
    parser: P,
    summarizer: Summarizer<A>,
    delay: Duration,
    concurrency: usize,
    pacer: HostPacer,
}

impl<P, A> SummarizerApp<P, A>
where
    P: ArticleSource,
    A: AskAsync,
{
    pub fn new(parser: P, summarizer: Summarizer<A>, delay: Duration) -> Self {
        info!(delay_ms = delay.as_millis() as u64, "News summarizer initialized");
        Self {
            parser,
            summarizer,
            delay,
            concurrency: 1,
            pacer: HostPacer::new(delay),
        }
    }

    /// Allow up to `n` items in flight at once (clamped to at least 1).
    pub fn with_concurrency(mut self, n: usize) -> Self {
        self.concurrency = n.max(1);
        self
    }

    /// Extract and summarize one URL.
    #[instrument(level = "info", skip(self))]
    pub async fn process_single_url(
        &self,
        url: &str,
        style: SummaryStyle,
    ) -> Result<SummaryRecord, AppError> {
        let article = self.parser.parse_news_url(url).await;
        if article.content.is_empty() {
            return Err(AppError::NoContent);
        }
        info!(chars = article.content_chars(), "Extracted article");
        let record = self.summarizer.summarize_article(&article, style).await?;
        info!(%style, "Generated summary");
        Ok(record)
    }

    /// Process each URL in order; failures become [`FailedItem`]s.
    #[instrument(level = "info", skip_all, fields(count = urls.len(), %style))]
    pub async fn process_multiple_urls(
        &self,
        urls: &[String],
        style: SummaryStyle,
    ) -> Vec<ProcessingOutcome> {
        let total = urls.len();
        self.run_paced(urls, |i, url| async move {
            info!(n = i + 1, total, %url, "Processing URL");
            match self.process_single_url(url, style).await {
                Ok(record) => ProcessingOutcome::from(record),
                Err(e) => {
                    error!(%url, error = %e, "Failed to process URL");
                    FailedItem::new(url, e).into()
                }
            }
        })
        .await
    }

    /// Read up to `limit` feed entries and summarize each linked article.
    #[instrument(level = "info", skip(self))]
    pub async fn process_rss_feed(
        &self,
        feed_url: &str,
        style: SummaryStyle,
        limit: usize,
    ) -> Result<Vec<ProcessingOutcome>, AppError> {
        let entries = self.parser.parse_rss_feed(feed_url, limit).await;
        if entries.is_empty() {
            return Err(AppError::EmptyFeed(feed_url.to_string()));
        }
        info!(count = entries.len(), "Found articles in feed");

        let total = entries.len();
        let outcomes = self
            .run_paced(&entries, |i, entry| async move {
                info!(n = i + 1, total, link = %entry.link, "Processing feed article");
                self.process_feed_entry(entry, style).await
            })
            .await;
        Ok(outcomes)
    }

    async fn process_feed_entry(&self, entry: &RssEntry, style: SummaryStyle) -> ProcessingOutcome {
        if entry.link.is_empty() {
            warn!(title = %entry.title, "Feed entry has no link; using feed data");
            return degraded_record(entry, style).into();
        }

        let article = self.parser.parse_news_url(&entry.link).await;
        if article.content_chars() < MIN_SUMMARY_CHARS {
            warn!(
                link = %entry.link,
                chars = article.content_chars(),
                "Full article unusable; using feed data"
            );
            return degraded_record(entry, style).into();
        }

        match self.summarizer.summarize_article(&article, style).await {
            Ok(mut record) => {
                record.rss_data = Some(entry.clone());
                record.into()
            }
            Err(e) => {
                error!(link = %entry.link, error = %e, "Failed to process feed article");
                FailedItem::new(&entry.link, e).into()
            }
        }
    }

    /// Run `work` over `items`, keeping input order in the output.
    ///
    /// Sequential mode sleeps `delay` between items. Concurrent mode relies
    /// on the per-host pacer instead.
    async fn run_paced<'a, T, F, Fut>(&'a self, items: &'a [T], work: F) -> Vec<ProcessingOutcome>
    where
        T: PacedItem,
        F: Fn(usize, &'a T) -> Fut,
        Fut: Future<Output = ProcessingOutcome> + 'a,
    {
        if self.concurrency <= 1 {
            let mut outcomes = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    sleep(self.delay).await;
                }
                outcomes.push(work(i, item).await);
            }
            return outcomes;
        }

        info!(concurrency = self.concurrency, "Processing concurrently");
        let work = &work;
        stream::iter(items.iter().enumerate())
            .map(|(i, item)| async move {
                self.pacer.wait_turn(item.target_url()).await;
                work(i, item).await
            })
            .buffered(self.concurrency)
            .collect()
            .await
    }
}

/// Something with a URL to pace against.
trait PacedItem {
    fn target_url(&self) -> &str;
}

impl PacedItem for String {
    fn target_url(&self) -> &str {
        self
    }
}

impl PacedItem for RssEntry {
    fn target_url(&self) -> &str {
        &self.link
    }
}

/// Record built from the feed entry alone when the full page is unusable.
fn degraded_record(entry: &RssEntry, style: SummaryStyle) -> SummaryRecord {
    let now = capture_timestamp();
    let summary = if entry.summary.is_empty() {
        "No summary available".to_string()
    } else {
        entry.summary.clone()
    };
    SummaryRecord {
        original_article: entry.to_article(detect_website_type(&entry.link), now.clone()),
        summary,
        key_points: Vec::new(),
        sentiment: Sentiment::unknown("Limited data"),
        insights: Vec::new(),
        summary_style: style.as_str().to_string(),
        generated_at: now,
        rss_data: Some(entry.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ArticleRecord, Confidence, ExtractionMethod, SentimentLabel};
    use crate::summarizer::tests::FakeLlm;

    /// Source returning canned content per URL and a canned feed.
    #[derive(Default)]
    struct FakeSource {
        pages: HashMap<String, String>,
        feed: Vec<RssEntry>,
        fetched: Mutex<Vec<String>>,
    }

    impl FakeSource {
        fn with_pages(pages: &[(&str, &str)]) -> Self {
            Self {
                pages: pages
                    .iter()
                    .map(|(u, c)| (u.to_string(), c.to_string()))
                    .collect(),
                ..Self::default()
            }
        }
    }

    impl ArticleSource for FakeSource {
        async fn parse_news_url(&self, url: &str) -> ArticleRecord {
            self.fetched.lock().unwrap().push(url.to_string());
            ArticleRecord {
                url: url.to_string(),
                content: self.pages.get(url).cloned().unwrap_or_default(),
                extraction_method: ExtractionMethod::Generic,
                ..ArticleRecord::default()
            }
        }

        async fn parse_rss_feed(&self, _feed_url: &str, limit: usize) -> Vec<RssEntry> {
            self.feed.iter().take(limit).cloned().collect()
        }
    }

    fn long(tag: &str) -> String {
        format!("{tag} ").repeat(30)
    }

    fn app(source: FakeSource) -> SummarizerApp<FakeSource, FakeLlm> {
        SummarizerApp::new(source, Summarizer::new(FakeLlm::happy()), Duration::ZERO)
    }

    fn entry(title: &str, link: &str, summary: &str) -> RssEntry {
        RssEntry {
            title: title.to_string(),
            summary: summary.to_string(),
            link: link.to_string(),
            ..RssEntry::default()
        }
    }

    #[tokio::test]
    async fn test_single_url_without_content_fails() {
        let app = app(FakeSource::default());
        let err = app
            .process_single_url("https://example.com/none", SummaryStyle::Concise)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NoContent));
        assert_eq!(err.to_string(), "failed to extract article content");
    }

    #[tokio::test]
    async fn test_single_url_short_content_is_a_summarize_error() {
        let app = app(FakeSource::with_pages(&[("https://example.com/s", "too short")]));
        let err = app
            .process_single_url("https://example.com/s", SummaryStyle::Concise)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Summarize(SummarizeError::ContentTooShort { .. })
        ));
    }

    #[tokio::test]
    async fn test_batch_records_failure_in_place() {
        let a = long("alpha");
        let c = long("gamma");
        let app = app(FakeSource::with_pages(&[
            ("https://a.example/1", a.as_str()),
            ("https://c.example/3", c.as_str()),
        ]));
        let urls = vec![
            "https://a.example/1".to_string(),
            "https://b.example/2".to_string(),
            "https://c.example/3".to_string(),
        ];
        let outcomes = app.process_multiple_urls(&urls, SummaryStyle::Concise).await;

        assert_eq!(outcomes.len(), 3);
        assert!(!outcomes[0].is_failed());
        match &outcomes[1] {
            ProcessingOutcome::Failed(item) => {
                assert_eq!(item.url, "https://b.example/2");
                assert_eq!(item.status, "failed");
                assert_eq!(item.error, "failed to extract article content");
            }
            other => panic!("expected failure, got {other:?}"),
        }
        match &outcomes[2] {
            ProcessingOutcome::Summarized(record) => {
                assert_eq!(record.original_article.url, "https://c.example/3");
            }
            other => panic!("expected summary, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_feed_is_an_error() {
        let app = app(FakeSource::default());
        let err = app
            .process_rss_feed("https://example.com/feed", SummaryStyle::Concise, 5)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::EmptyFeed(_)));
    }

    #[tokio::test]
    async fn test_feed_degrades_and_attaches_rss_data() {
        let body = long("story");
        let mut source = FakeSource::with_pages(&[("https://www.bbc.com/news/1", body.as_str())]);
        source.feed = vec![
            entry("Full", "https://www.bbc.com/news/1", "feed blurb"),
            entry("Thin", "https://www.cnn.com/thin", "only the blurb"),
            entry("Linkless", "", ""),
        ];
        let app = app(source);
        let outcomes = app
            .process_rss_feed("https://example.com/feed", SummaryStyle::Executive, 5)
            .await
            .unwrap();
        assert_eq!(outcomes.len(), 3);

        let ProcessingOutcome::Summarized(full) = &outcomes[0] else {
            panic!("expected summary");
        };
        assert_eq!(full.summary, "A short summary.");
        assert_eq!(full.rss_data.as_ref().unwrap().title, "Full");

        let ProcessingOutcome::Summarized(thin) = &outcomes[1] else {
            panic!("expected degraded summary");
        };
        assert_eq!(thin.summary, "only the blurb");
        assert_eq!(thin.sentiment.sentiment, SentimentLabel::Neutral);
        assert_eq!(thin.sentiment.confidence, Confidence::Low);
        assert_eq!(thin.sentiment.explanation, "Limited data");
        assert!(thin.key_points.is_empty() && thin.insights.is_empty());
        assert_eq!(thin.original_article.extraction_method, ExtractionMethod::Rss);
        assert_eq!(thin.original_article.title, "Thin");
        assert_eq!(thin.summary_style, "executive");

        let ProcessingOutcome::Summarized(linkless) = &outcomes[2] else {
            panic!("expected degraded summary");
        };
        assert_eq!(linkless.summary, "No summary available");
        assert_eq!(linkless.rss_data.as_ref().unwrap().title, "Linkless");

        // The linkless entry is never fetched.
        assert_eq!(app.parser.fetched.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_feed_summary_failure_becomes_failed_item() {
        let body = long("story");
        let mut source = FakeSource::with_pages(&[("https://example.com/1", body.as_str())]);
        source.feed = vec![entry("One", "https://example.com/1", "")];
        let llm = FakeLlm {
            summary: None,
            ..FakeLlm::happy()
        };
        let app = SummarizerApp::new(source, Summarizer::new(llm), Duration::ZERO);
        let outcomes = app
            .process_rss_feed("https://example.com/feed", SummaryStyle::Concise, 5)
            .await
            .unwrap();
        let ProcessingOutcome::Failed(item) = &outcomes[0] else {
            panic!("expected failure");
        };
        assert_eq!(item.url, "https://example.com/1");
    }

    #[tokio::test]
    async fn test_feed_limit_is_respected() {
        let mut source = FakeSource::default();
        source.feed = (0..10).map(|i| entry(&format!("t{i}"), "", "s")).collect();
        let app = app(source);
        let outcomes = app
            .process_rss_feed("https://example.com/feed", SummaryStyle::Concise, 3)
            .await
            .unwrap();
        assert_eq!(outcomes.len(), 3);
    }

    #[tokio::test]
    async fn test_concurrent_mode_preserves_order() {
        let pages: Vec<(String, String)> = (0..6)
            .map(|i| (format!("https://h{}.example/{i}", i % 2), long(&format!("p{i}"))))
            .collect();
        let refs: Vec<(&str, &str)> = pages.iter().map(|(u, c)| (u.as_str(), c.as_str())).collect();
        let app = app(FakeSource::with_pages(&refs)).with_concurrency(3);
        let urls: Vec<String> = pages.iter().map(|(u, _)| u.clone()).collect();

        let outcomes = app.process_multiple_urls(&urls, SummaryStyle::Concise).await;
        let got: Vec<String> = outcomes
            .iter()
            .map(|o| match o {
                ProcessingOutcome::Summarized(r) => r.original_article.url.clone(),
                ProcessingOutcome::Failed(f) => f.url.clone(),
            })
            .collect();
        assert_eq!(got, urls);
        assert!(outcomes.iter().all(|o| !o.is_failed()));
    }

    #[test]
    fn test_host_pacer_spaces_same_host() {
        let pacer = HostPacer::new(Duration::from_secs(2));
        let first = pacer.reserve("a.example");
        let second = pacer.reserve("a.example");
        let other = pacer.reserve("b.example");
        assert!(second >= first + Duration::from_secs(2));
        assert!(other < first + Duration::from_secs(1));
    }

    #[test]
    fn test_host_of() {
        assert_eq!(host_of("https://WWW.BBC.com/news"), "www.bbc.com");
        assert_eq!(host_of("not a url"), "");
    }
}
