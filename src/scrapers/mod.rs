//! Article extraction: turning URLs and feeds into [`ArticleRecord`]s.
//!
//! Extraction follows a two-strategy pattern:
//!
//! 1. **Generic**: readability-style heuristics that work on unknown sites
//!    ([`generic`])
//! 2. **Selector-based**: a fixed per-site CSS selector table, tried only
//!    when the generic pass comes back thin ([`selectors`], [`sites`])
//!
//! [`NewsParser`] orchestrates the two and reconciles their results.
//!
//! # Submodules
//!
//! | Module | Role |
//! |--------|------|
//! | [`cleaner`] | Whitespace, boilerplate and URL scrubbing |
//! | [`sites`] | Site classification and selector registry |
//! | [`http`] | Shared HTTP fetcher and [`ExtractError`] |
//! | [`generic`] | Site-agnostic extractor |
//! | [`selectors`] | Selector-table extractor |
//! | [`feed`] | RSS/Atom feed reader |
//!
//! Failures inside either extractor never escape [`NewsParser::parse_news_url`]:
//! callers always get a record back, possibly with empty `content`.

pub mod cleaner;
pub mod feed;
pub mod generic;
pub mod http;
pub mod selectors;
pub mod sites;

use crate::models::{ArticleRecord, MIN_EXTRACTED_CHARS, RssEntry};
use crate::utils::capture_timestamp;
use feed::RssExtractor;
use generic::GenericExtractor;
use http::{ExtractError, HttpFetcher};
use selectors::SelectorExtractor;
use sites::{SiteKey, detect_website_type};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};

/// A strategy that turns a URL into a structured article.
pub trait Extractor {
    /// Fetch `url` and extract its fields using `site`'s configuration.
    async fn extract(&self, url: &str, site: SiteKey) -> Result<ArticleRecord, ExtractError>;
}

/// Where the application gets its articles from.
///
/// Implemented by [`NewsParser`]; tests substitute canned sources.
pub trait ArticleSource {
    /// Extract a single article. Never fails; see [`NewsParser::parse_news_url`].
    async fn parse_news_url(&self, url: &str) -> ArticleRecord;

    /// Read up to `limit` entries from a feed. Failures yield an empty vector.
    async fn parse_rss_feed(&self, feed_url: &str, limit: usize) -> Vec<RssEntry>;
}

/// Extraction orchestrator: generic first, selector table as fallback.
#[derive(Debug)]
pub struct NewsParser<G = GenericExtractor, S = SelectorExtractor> {
    generic: G,
    selector: S,
    feeds: RssExtractor,
}

impl NewsParser {
    /// Build the production parser; all strategies share one HTTP client.
    pub fn new(fetcher: HttpFetcher) -> Self {
        Self::with_extractors(
            GenericExtractor::new(fetcher.clone()),
            SelectorExtractor::new(fetcher.clone()),
            RssExtractor::new(fetcher),
        )
    }
}

impl<G, S> NewsParser<G, S>
where
    G: Extractor,
    S: Extractor,
{
    pub fn with_extractors(generic: G, selector: S, feeds: RssExtractor) -> Self {
        Self {
            generic,
            selector,
            feeds,
        }
    }

    /// Extract an article from `url`.
    ///
    /// 1. Classify the domain into a [`SiteKey`].
    /// 2. Run the generic extractor; an error counts as an empty result.
    /// 3. If that produced fewer than [`MIN_EXTRACTED_CHARS`] characters of
    ///    content, run the selector-based extractor.
    /// 4. Keep the selector-based result only if its content is strictly
    ///    longer than the generic one.
    /// 5. Stamp `url`, `website_type` and `extraction_time`.
    ///
    /// If both strategies fail the record carries only the URL, site and
    /// timestamp.
    #[instrument(level = "info", skip(self))]
    pub async fn parse_news_url(&self, url: &str) -> ArticleRecord {
        let site = detect_website_type(url);
        info!(%url, %site, "Parsing news");

        let mut result = match self.generic.extract(url, site).await {
            Ok(article) => Some(article),
            Err(e) => {
                warn!(%url, error = %e, "Generic extraction failed");
                None
            }
        };
        let generic_chars = result.as_ref().map_or(0, ArticleRecord::content_chars);

        if generic_chars < MIN_EXTRACTED_CHARS {
            info!(
                %url,
                chars = generic_chars,
                "Generic extractor returned minimal content; trying selector-based"
            );
            match self.selector.extract(url, site).await {
                Ok(fallback) if fallback.content_chars() > generic_chars => {
                    debug!(chars = fallback.content_chars(), "Selector-based result wins");
                    result = Some(fallback);
                }
                Ok(fallback) => {
                    debug!(
                        chars = fallback.content_chars(),
                        "Selector-based result not longer; keeping generic"
                    );
                }
                Err(e) => error!(%url, error = %e, "Selector-based extraction failed"),
            }
        }

        let mut article = result.unwrap_or_else(|| ArticleRecord::empty(url, site));
        article.url = url.to_string();
        article.website_type = site;
        article.extraction_time = capture_timestamp();
        info!(
            %url,
            chars = article.content_chars(),
            method = article.extraction_method.as_str(),
            "Extracted article"
        );
        article
    }

    /// Parse several URLs in order, pausing `delay` between requests.
    #[instrument(level = "info", skip_all, fields(count = urls.len()))]
    pub async fn batch_parse_urls(&self, urls: &[String], delay: Duration) -> Vec<ArticleRecord> {
        let mut results = Vec::with_capacity(urls.len());
        for (i, url) in urls.iter().enumerate() {
            if i > 0 {
                sleep(delay).await;
            }
            results.push(self.parse_news_url(url).await);
        }
        results
    }
}

impl<G, S> ArticleSource for NewsParser<G, S>
where
    G: Extractor,
    S: Extractor,
{
    async fn parse_news_url(&self, url: &str) -> ArticleRecord {
        NewsParser::<G, S>::parse_news_url(self, url).await
    }

    async fn parse_rss_feed(&self, feed_url: &str, limit: usize) -> Vec<RssEntry> {
        self.feeds.parse_rss_feed(feed_url, limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HttpConfig;
    use crate::models::ExtractionMethod;
    use crate::scrapers::http::fixture_server::serve;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Extractor returning a fixed outcome and counting its calls.
    struct Canned {
        content: Option<String>,
        method: ExtractionMethod,
        calls: AtomicUsize,
    }

    impl Canned {
        fn ok(content: &str, method: ExtractionMethod) -> Self {
            Self {
                content: Some(content.to_string()),
                method,
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                content: None,
                method: ExtractionMethod::None,
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Extractor for Canned {
        async fn extract(&self, url: &str, site: SiteKey) -> Result<ArticleRecord, ExtractError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.content {
                Some(content) => Ok(ArticleRecord {
                    title: format!("{} title", self.method.as_str()),
                    content: content.clone(),
                    website_type: site,
                    extraction_method: self.method,
                    ..ArticleRecord::default()
                }),
                None => Err(ExtractError::Status {
                    url: url.to_string(),
                    status: 503,
                }),
            }
        }
    }

    fn parser(generic: Canned, selector: Canned) -> NewsParser<Canned, Canned> {
        let fetcher = HttpFetcher::new(&HttpConfig::default()).unwrap();
        NewsParser::with_extractors(generic, selector, RssExtractor::new(fetcher))
    }

    #[tokio::test]
    async fn test_long_generic_result_skips_fallback() {
        let long = "g".repeat(150);
        let p = parser(
            Canned::ok(&long, ExtractionMethod::Generic),
            Canned::ok(&"s".repeat(500), ExtractionMethod::SelectorBased),
        );
        let article = p.parse_news_url("https://www.bbc.com/news/1").await;
        assert_eq!(article.content, long);
        assert_eq!(article.extraction_method, ExtractionMethod::Generic);
        assert_eq!(p.selector.calls(), 0);
    }

    #[tokio::test]
    async fn test_exactly_threshold_counts_as_enough() {
        let p = parser(
            Canned::ok(&"g".repeat(MIN_EXTRACTED_CHARS), ExtractionMethod::Generic),
            Canned::ok(&"s".repeat(500), ExtractionMethod::SelectorBased),
        );
        let article = p.parse_news_url("https://example.com/a").await;
        assert_eq!(article.extraction_method, ExtractionMethod::Generic);
        assert_eq!(p.selector.calls(), 0);
    }

    #[tokio::test]
    async fn test_short_generic_replaced_by_longer_selector_result() {
        let fallback = "s".repeat(300);
        let p = parser(
            Canned::ok("short", ExtractionMethod::Generic),
            Canned::ok(&fallback, ExtractionMethod::SelectorBased),
        );
        let article = p.parse_news_url("https://edition.cnn.com/x").await;
        assert_eq!(article.content, fallback);
        assert_eq!(article.extraction_method, ExtractionMethod::SelectorBased);
        assert_eq!(article.website_type, SiteKey::Cnn);
        assert_eq!(p.selector.calls(), 1);
    }

    #[tokio::test]
    async fn test_equal_length_keeps_generic() {
        let p = parser(
            Canned::ok("same length", ExtractionMethod::Generic),
            Canned::ok("SAME LENGTH", ExtractionMethod::SelectorBased),
        );
        let article = p.parse_news_url("https://example.com/a").await;
        assert_eq!(article.content, "same length");
        assert_eq!(article.extraction_method, ExtractionMethod::Generic);
    }

    #[tokio::test]
    async fn test_generic_failure_falls_through() {
        let p = parser(
            Canned::failing(),
            Canned::ok("selector text", ExtractionMethod::SelectorBased),
        );
        let article = p.parse_news_url("https://www.reuters.com/a").await;
        assert_eq!(article.content, "selector text");
        assert_eq!(article.website_type, SiteKey::Reuters);
        assert_eq!(p.generic.calls(), 1);
    }

    #[tokio::test]
    async fn test_selector_failure_keeps_short_generic() {
        let p = parser(Canned::ok("tiny", ExtractionMethod::Generic), Canned::failing());
        let article = p.parse_news_url("https://example.com/a").await;
        assert_eq!(article.content, "tiny");
        assert_eq!(article.extraction_method, ExtractionMethod::Generic);
    }

    #[tokio::test]
    async fn test_both_failing_yields_minimal_record() {
        let p = parser(Canned::failing(), Canned::failing());
        let article = p.parse_news_url("https://www.bbc.co.uk/news/2").await;
        assert_eq!(article.url, "https://www.bbc.co.uk/news/2");
        assert_eq!(article.website_type, SiteKey::Bbc);
        assert_eq!(article.content, "");
        assert_eq!(article.extraction_method, ExtractionMethod::None);
        assert!(!article.extraction_time.is_empty());
    }

    #[tokio::test]
    async fn test_stamps_url_and_time() {
        let p = parser(
            Canned::ok(&"g".repeat(200), ExtractionMethod::Generic),
            Canned::failing(),
        );
        let article = p.parse_news_url("https://example.com/story").await;
        assert_eq!(article.url, "https://example.com/story");
        assert_eq!(article.extraction_time.len(), "2025-05-06 14:30:00".len());
    }

    #[tokio::test]
    async fn test_production_parser_extracts_served_page() {
        let page = r#"<html><head>
            <meta property="og:title" content="Harbour reopens after storm">
            <meta name="description" content="Ferries resume on Monday.">
          </head><body><article>
            <p>The harbour reopened on Monday after a week of storm damage repairs.</p>
            <p>Ferry operators said the first crossings would run on a reduced timetable.</p>
          </article></body></html>"#;
        let server = serve("200 OK", "text/html; charset=utf-8", page.as_bytes().to_vec()).await;
        let url = format!("{}/news/harbour", server.base_url);

        let fetcher = HttpFetcher::new(&HttpConfig::default()).unwrap();
        let article = NewsParser::new(fetcher).parse_news_url(&url).await;

        assert_eq!(article.url, url);
        assert_eq!(article.title, "Harbour reopens after storm");
        assert_eq!(article.summary, "Ferries resume on Monday.");
        assert!(article.content.starts_with("The harbour reopened on Monday"));
        assert!(article.content_chars() >= MIN_EXTRACTED_CHARS);
        assert_eq!(article.extraction_method, ExtractionMethod::Generic);
        assert_eq!(article.website_type, SiteKey::Generic);
        assert_eq!(server.request_heads().len(), 1);
    }

    #[tokio::test]
    async fn test_production_parser_survives_server_errors() {
        let server = serve("503 Service Unavailable", "text/html", b"down".to_vec()).await;
        let url = format!("{}/story", server.base_url);

        let fetcher = HttpFetcher::new(&HttpConfig::default()).unwrap();
        let article = NewsParser::new(fetcher).parse_news_url(&url).await;

        assert_eq!(article.url, url);
        assert_eq!(article.content, "");
        assert_eq!(article.extraction_method, ExtractionMethod::None);
        assert_eq!(server.request_heads().len(), 2);
    }

    #[tokio::test]
    async fn test_batch_parse_keeps_order() {
        let p = parser(
            Canned::ok(&"g".repeat(200), ExtractionMethod::Generic),
            Canned::failing(),
        );
        let urls = vec![
            "https://example.com/1".to_string(),
            "https://example.com/2".to_string(),
        ];
        let articles = p.batch_parse_urls(&urls, Duration::ZERO).await;
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].url, urls[0]);
        assert_eq!(articles[1].url, urls[1]);
    }
}
