//! General-purpose article extraction.
//!
//! Works on any page without per-site configuration by looking for the
//! densest block of prose: paragraphs are grouped by their parent element
//! and the parent carrying the most paragraph text wins. Metadata (title,
//! authors, publication date, description, keywords) comes from the usual
//! `<meta>` conventions with structural fallbacks.

use crate::models::{ArticleRecord, ExtractionMethod};
use crate::scrapers::cleaner::clean_text;
use crate::scrapers::http::{ExtractError, HttpFetcher};
use crate::scrapers::selectors::element_text;
use crate::scrapers::sites::SiteKey;
use crate::scrapers::Extractor;
use chrono::DateTime;
use itertools::Itertools;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use std::cmp::Reverse;
use tracing::{debug, instrument};

/// Paragraphs shorter than this are treated as chrome (captions, buttons).
const MIN_PARAGRAPH_CHARS: usize = 25;

/// Number of keywords derived from word frequency when the page has none.
const KEYWORD_COUNT: usize = 10;

/// Elements whose paragraphs never count as article body.
const BOILERPLATE_CONTAINERS: [&str; 7] =
    ["nav", "header", "footer", "aside", "script", "style", "form"];

const STOPWORDS: [&str; 40] = [
    "about", "after", "again", "also", "been", "before", "being", "between", "both", "could",
    "does", "during", "each", "from", "have", "having", "here", "into", "just", "more", "most",
    "only", "other", "over", "said", "same", "should", "some", "such", "than", "that", "their",
    "them", "then", "there", "these", "they", "this", "were", "with",
];

fn selector(raw: &str) -> Selector {
    Selector::parse(raw).unwrap()
}

static PARAGRAPH: Lazy<Selector> = Lazy::new(|| selector("p"));
static LINK: Lazy<Selector> = Lazy::new(|| selector("a"));
static TITLE: Lazy<Selector> = Lazy::new(|| selector("title"));
static H1: Lazy<Selector> = Lazy::new(|| selector("h1"));
static OG_TITLE: Lazy<Selector> = Lazy::new(|| selector(r#"meta[property="og:title"]"#));
static DESCRIPTION: Lazy<Selector> = Lazy::new(|| {
    selector(r#"meta[name="description"], meta[property="og:description"]"#)
});
static KEYWORDS: Lazy<Selector> = Lazy::new(|| selector(r#"meta[name="keywords"]"#));
static AUTHOR_META: Lazy<Selector> = Lazy::new(|| {
    selector(r#"meta[name="author"], meta[property="article:author"]"#)
});
static AUTHOR_NODES: Lazy<Selector> = Lazy::new(|| selector(r#"[rel="author"], [itemprop="author"]"#));
static DATE_META: Lazy<Selector> = Lazy::new(|| {
    selector(
        r#"meta[property="article:published_time"], meta[name="pubdate"], meta[itemprop="datePublished"]"#,
    )
});
static TIME: Lazy<Selector> = Lazy::new(|| selector("time[datetime]"));

/// Heuristic extractor that needs no knowledge of the site.
#[derive(Debug, Clone)]
pub struct GenericExtractor {
    fetcher: HttpFetcher,
}

impl GenericExtractor {
    pub fn new(fetcher: HttpFetcher) -> Self {
        Self { fetcher }
    }
}

impl Extractor for GenericExtractor {
    #[instrument(level = "info", skip(self))]
    async fn extract(&self, url: &str, site: SiteKey) -> Result<ArticleRecord, ExtractError> {
        let html = self.fetcher.fetch_text(url).await?;
        let mut article = extract_article(&html);
        article.website_type = site;
        debug!(chars = article.content_chars(), title = %article.title, "Generic extraction finished");
        Ok(article)
    }
}

/// Build an [`ArticleRecord`] from a full HTML document.
pub fn extract_article(html: &str) -> ArticleRecord {
    let document = Html::parse_document(html);
    let content = main_text(&document);
    let keywords = meta_keywords(&document).unwrap_or_else(|| frequent_words(&content));

    ArticleRecord {
        title: title(&document),
        summary: clean_text(&meta_content(&document, &DESCRIPTION).unwrap_or_default()),
        author: authors(&document),
        date: publish_date(&document),
        keywords,
        content,
        extraction_method: ExtractionMethod::Generic,
        ..ArticleRecord::default()
    }
}

fn meta_content(document: &Html, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .filter_map(|el| el.value().attr("content"))
        .map(str::trim)
        .find(|content| !content.is_empty())
        .map(str::to_string)
}

fn first_text(document: &Html, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .map(element_text)
        .find(|text| !text.is_empty())
}

fn title(document: &Html) -> String {
    meta_content(document, &OG_TITLE)
        .or_else(|| first_text(document, &TITLE))
        .or_else(|| first_text(document, &H1))
        .unwrap_or_default()
}

fn authors(document: &Html) -> String {
    let from_meta = document
        .select(&AUTHOR_META)
        .filter_map(|el| el.value().attr("content"))
        .map(|name| name.trim().to_string());
    let from_nodes = document.select(&AUTHOR_NODES).map(|el| {
        el.value()
            .attr("content")
            .map(|name| name.trim().to_string())
            .unwrap_or_else(|| element_text(el))
    });

    from_meta
        .chain(from_nodes)
        .filter(|name| !name.is_empty())
        .unique()
        .join(", ")
}

fn publish_date(document: &Html) -> String {
    let raw = meta_content(document, &DATE_META).or_else(|| {
        document
            .select(&TIME)
            .filter_map(|el| el.value().attr("datetime"))
            .map(str::trim)
            .find(|dt| !dt.is_empty())
            .map(str::to_string)
    });

    match raw {
        Some(raw) => DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S%:z").to_string())
            .unwrap_or(raw),
        None => String::new(),
    }
}

fn meta_keywords(document: &Html) -> Option<Vec<String>> {
    let raw = meta_content(document, &KEYWORDS)?;
    let keywords: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|kw| !kw.is_empty())
        .map(str::to_string)
        .collect();
    (!keywords.is_empty()).then_some(keywords)
}

/// Most frequent content words, ties broken by first appearance.
fn frequent_words(content: &str) -> Vec<String> {
    let words: Vec<String> = content
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() > 3)
        .map(str::to_lowercase)
        .filter(|w| !STOPWORDS.contains(&w.as_str()))
        .filter(|w| !w.chars().all(|c| c.is_numeric()))
        .collect();
    let counts = words.iter().counts();

    words
        .iter()
        .unique()
        .sorted_by_key(|w| Reverse(counts[w]))
        .take(KEYWORD_COUNT)
        .cloned()
        .collect()
}

fn inside_boilerplate(element: ElementRef<'_>) -> bool {
    element.ancestors().any(|node| {
        node.value()
            .as_element()
            .is_some_and(|el| BOILERPLATE_CONTAINERS.contains(&el.name()))
    })
}

fn link_heavy(paragraph: ElementRef<'_>, text_chars: usize) -> bool {
    let link_chars: usize = paragraph
        .select(&LINK)
        .map(|a| element_text(a).chars().count())
        .sum();
    link_chars * 2 > text_chars
}

/// Body text of the parent element holding the most paragraph text.
fn main_text(document: &Html) -> String {
    // (parent, paragraphs, total chars), kept in document order.
    let mut groups: Vec<(ElementRef<'_>, Vec<String>, usize)> = Vec::new();

    for paragraph in document.select(&PARAGRAPH) {
        let Some(parent) = paragraph.parent().and_then(ElementRef::wrap) else {
            continue;
        };
        if inside_boilerplate(paragraph) {
            continue;
        }
        let text = element_text(paragraph);
        let chars = text.chars().count();
        if chars < MIN_PARAGRAPH_CHARS || link_heavy(paragraph, chars) {
            continue;
        }

        match groups.iter_mut().find(|(el, _, _)| *el == parent) {
            Some((_, paragraphs, total)) => {
                paragraphs.push(text);
                *total += chars;
            }
            None => groups.push((parent, vec![text], chars)),
        }
    }

    groups
        .into_iter()
        .rev()
        .max_by_key(|(_, _, total)| *total)
        .map(|(_, paragraphs, _)| clean_paragraphs(paragraphs))
        .unwrap_or_default()
}

fn clean_paragraphs(paragraphs: Vec<String>) -> String {
    paragraphs
        .iter()
        .map(|p| clean_text(p))
        .filter(|p| !p.is_empty())
        .join("\n\n")
}
