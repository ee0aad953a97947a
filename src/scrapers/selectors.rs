//! Selector-based article extraction.
//!
//! Walks the per-site selector table (see [`crate::scrapers::sites`]) against
//! the fetched document and fills each field from the first selector that
//! matches. Precise for known sites, brittle when their markup changes,
//! which is why the orchestrator only reaches for it as a fallback.

use crate::models::{ArticleRecord, ExtractionMethod};
use crate::scrapers::cleaner::clean_text;
use crate::scrapers::http::{ExtractError, HttpFetcher};
use crate::scrapers::sites::{Field, SiteKey};
use crate::scrapers::Extractor;
use scraper::{ElementRef, Html, Selector};
use tracing::{info, instrument};

/// Extractor driven by the fixed per-site selector registry.
#[derive(Debug, Clone)]
pub struct SelectorExtractor {
    fetcher: HttpFetcher,
}

impl SelectorExtractor {
    pub fn new(fetcher: HttpFetcher) -> Self {
        Self { fetcher }
    }
}

impl Extractor for SelectorExtractor {
    #[instrument(level = "info", skip(self))]
    async fn extract(&self, url: &str, site: SiteKey) -> Result<ArticleRecord, ExtractError> {
        let html = self.fetcher.fetch_text(url).await?;
        let article = extract_from_html(&html, site)?;
        info!(chars = article.content_chars(), "Selector-based extraction finished");
        Ok(article)
    }
}

/// Fill the five structured fields from `html` using `site`'s selectors.
///
/// Single-valued fields take the first element with non-empty text. For
/// `content`, every element matched by the first productive selector is
/// joined with single spaces. `content` and `summary` are then cleaned.
pub fn extract_from_html(html: &str, site: SiteKey) -> Result<ArticleRecord, ExtractError> {
    let document = Html::parse_document(html);
    let table = site.selectors();

    let title = first_match(&document, table.for_field(Field::Title))?;
    let content = all_matches(&document, table.for_field(Field::Content))?;
    let summary = first_match(&document, table.for_field(Field::Summary))?;
    let author = first_match(&document, table.for_field(Field::Author))?;
    let date = first_match(&document, table.for_field(Field::Date))?;

    Ok(ArticleRecord {
        website_type: site,
        title,
        content: clean_text(&content),
        summary: clean_text(&summary),
        author,
        date,
        extraction_method: ExtractionMethod::SelectorBased,
        ..ArticleRecord::default()
    })
}

fn parse_selector(raw: &str) -> Result<Selector, ExtractError> {
    Selector::parse(raw).map_err(|e| ExtractError::Selector {
        selector: raw.to_string(),
        reason: e.to_string(),
    })
}

/// Text of an element with inner whitespace collapsed.
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element.text().flat_map(str::split_whitespace).collect::<Vec<_>>().join(" ")
}

fn first_match(document: &Html, selectors: &[&str]) -> Result<String, ExtractError> {
    for raw in selectors {
        let selector = parse_selector(raw)?;
        if let Some(text) = document
            .select(&selector)
            .map(element_text)
            .find(|text| !text.is_empty())
        {
            return Ok(text);
        }
    }
    Ok(String::new())
}

fn all_matches(document: &Html, selectors: &[&str]) -> Result<String, ExtractError> {
    for raw in selectors {
        let selector = parse_selector(raw)?;
        let texts: Vec<String> = document
            .select(&selector)
            .map(element_text)
            .filter(|text| !text.is_empty())
            .collect();
        if !texts.is_empty() {
            return Ok(texts.join(" "));
        }
    }
    Ok(String::new())
}
