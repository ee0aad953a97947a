//! RSS 2.0 and Atom feed extraction.
//!
//! Feeds are only used to discover articles: each entry becomes a
//! lightweight [`RssEntry`] that the application later re-fetches for the
//! full text. RSS is tried first, then Atom.

use crate::models::RssEntry;
use crate::scrapers::http::{ExtractError, HttpFetcher};
use tracing::{error, info, instrument};

/// Reads feeds over HTTP and turns them into [`RssEntry`] values.
#[derive(Debug, Clone)]
pub struct RssExtractor {
    fetcher: HttpFetcher,
}

impl RssExtractor {
    pub fn new(fetcher: HttpFetcher) -> Self {
        Self { fetcher }
    }

    /// Fetch `feed_url` and return up to `limit` entries in feed order.
    ///
    /// Unreachable or malformed feeds are logged and yield an empty vector.
    #[instrument(level = "info", skip(self))]
    pub async fn parse_rss_feed(&self, feed_url: &str, limit: usize) -> Vec<RssEntry> {
        let body = match self.fetcher.fetch_bytes(feed_url).await {
            Ok(body) => body,
            Err(e) => {
                error!(%feed_url, error = %e, "RSS fetch failed");
                return Vec::new();
            }
        };

        match parse_feed(&body, limit) {
            Ok(entries) => {
                info!(%feed_url, count = entries.len(), "Parsed feed");
                entries
            }
            Err(e) => {
                error!(%feed_url, error = %e, "RSS parsing failed");
                Vec::new()
            }
        }
    }
}

/// Parse raw feed bytes as RSS, falling back to Atom.
pub fn parse_feed(body: &[u8], limit: usize) -> Result<Vec<RssEntry>, ExtractError> {
    if let Ok(channel) = rss::Channel::read_from(body) {
        return Ok(channel.items().iter().take(limit).map(rss_entry).collect());
    }

    match atom_syndication::Feed::read_from(body) {
        Ok(feed) => Ok(feed.entries().iter().take(limit).map(atom_entry).collect()),
        Err(e) => Err(ExtractError::Feed(e.to_string())),
    }
}

fn rss_entry(item: &rss::Item) -> RssEntry {
    let author = item
        .author()
        .map(str::to_string)
        .or_else(|| {
            item.dublin_core_ext()
                .and_then(|dc| dc.creators().first().cloned())
        })
        .unwrap_or_default();

    RssEntry {
        title: item.title().unwrap_or_default().to_string(),
        summary: item.description().unwrap_or_default().to_string(),
        link: item.link().unwrap_or_default().to_string(),
        published: item.pub_date().unwrap_or_default().to_string(),
        author,
    }
}

fn atom_entry(entry: &atom_syndication::Entry) -> RssEntry {
    let summary = entry
        .summary()
        .map(|s| s.as_str().to_string())
        .or_else(|| {
            entry
                .content()
                .and_then(|c| c.value())
                .map(str::to_string)
        })
        .unwrap_or_default();

    let link = entry
        .links()
        .iter()
        .find(|l| l.rel() == "alternate")
        .or_else(|| entry.links().first())
        .map(|l| l.href().to_string())
        .unwrap_or_default();

    RssEntry {
        title: entry.title().to_string(),
        summary,
        link,
        published: entry
            .published()
            .unwrap_or_else(|| entry.updated())
            .to_rfc3339(),
        author: entry
            .authors()
            .first()
            .map(|p| p.name().to_string())
            .unwrap_or_default(),
    }
}
