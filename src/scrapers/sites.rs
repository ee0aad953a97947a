//! Site classification and the per-site CSS selector registry.
//!
//! Each known news brand gets a [`SiteKey`] variant and a [`SiteSelectors`]
//! entry. URLs whose domain matches no brand fall back to
//! [`SiteKey::Generic`], whose selectors target common article markup.
//!
//! # Supported Sites
//!
//! | Site | Key | Domain token |
//! |------|-----|--------------|
//! | BBC | [`SiteKey::Bbc`] | `bbc` |
//! | CNN | [`SiteKey::Cnn`] | `cnn` |
//! | Reuters | [`SiteKey::Reuters`] | `reuters` |
//! | anything else | [`SiteKey::Generic`] | |
//!
//! Adding a site means adding a variant, its domain token, and a table entry.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;
use url::Url;

/// Selector-table key for a URL's domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SiteKey {
    #[default]
    Generic,
    Bbc,
    Cnn,
    Reuters,
}

/// Branded sites in match order. The first token contained in the domain wins.
const BRANDS: [(&str, SiteKey); 3] = [
    ("bbc", SiteKey::Bbc),
    ("cnn", SiteKey::Cnn),
    ("reuters", SiteKey::Reuters),
];

impl SiteKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SiteKey::Generic => "generic",
            SiteKey::Bbc => "bbc",
            SiteKey::Cnn => "cnn",
            SiteKey::Reuters => "reuters",
        }
    }

    /// Ordered selector lists for this site.
    pub fn selectors(&self) -> &'static SiteSelectors {
        match self {
            SiteKey::Generic => &GENERIC,
            SiteKey::Bbc => &BBC,
            SiteKey::Cnn => &CNN,
            SiteKey::Reuters => &REUTERS,
        }
    }
}

impl fmt::Display for SiteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured fields the selector-based extractor fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Content,
    Summary,
    Author,
    Date,
}

/// Candidate selectors per field, tried in order.
#[derive(Debug)]
pub struct SiteSelectors {
    pub title: &'static [&'static str],
    pub content: &'static [&'static str],
    pub summary: &'static [&'static str],
    pub author: &'static [&'static str],
    pub date: &'static [&'static str],
}

impl SiteSelectors {
    pub fn for_field(&self, field: Field) -> &'static [&'static str] {
        match field {
            Field::Title => self.title,
            Field::Content => self.content,
            Field::Summary => self.summary,
            Field::Author => self.author,
            Field::Date => self.date,
        }
    }
}

static GENERIC: SiteSelectors = SiteSelectors {
    title: &["h1", "h2", ".title", ".headline", "[class*=\"title\"]", "[class*=\"headline\"]"],
    content: &[
        "article",
        ".content",
        ".article-content",
        ".story-content",
        ".post-content",
        "[class*=\"content\"]",
    ],
    summary: &[".summary", ".excerpt", ".description", "[class*=\"summary\"]"],
    author: &[".author", ".byline", "[class*=\"author\"]", "[class*=\"byline\"]"],
    date: &[".date", ".time", ".published", "[class*=\"date\"]", "[class*=\"time\"]"],
};

static BBC: SiteSelectors = SiteSelectors {
    title: &["h1", ".story-body__h1"],
    content: &[".story-body__inner", ".story-body__introduction"],
    summary: &[".story-body__introduction"],
    author: &[".byline__name"],
    date: &[".date", ".timestamp"],
};

static CNN: SiteSelectors = SiteSelectors {
    title: &[".headline__text", "h1"],
    content: &[".article__content", ".l-container"],
    summary: &[".article__subtitle"],
    author: &[".byline__name"],
    date: &[".timestamp"],
};

static REUTERS: SiteSelectors = SiteSelectors {
    title: &["h1", ".article-header__title"],
    content: &[
        ".article-content__content__2gQno",
        ".article-body__content__17Yit",
    ],
    summary: &[".article-header__summary__1l7fm"],
    author: &[".article-header__author__1l7fm"],
    date: &[".article-header__timestamp__1l7fm"],
};

/// Classify a URL's domain into a selector-table key.
///
/// Matching is a case-insensitive substring test of the host against each
/// brand token. A URL that does not parse, or has no host, is `Generic`.
pub fn detect_website_type(url: &str) -> SiteKey {
    let host = match Url::parse(url) {
        Ok(parsed) => parsed.host_str().unwrap_or_default().to_lowercase(),
        Err(_) => String::new(),
    };

    let site = BRANDS
        .iter()
        .find(|(token, _)| host.contains(token))
        .map(|(_, key)| *key)
        .unwrap_or_default();
    debug!(%url, %host, %site, "Classified website");
    site
}
