//! Normalization of extracted article text.

use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

static BOILERPLATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)share\s+this\s+article|follow\s+us|subscribe|newsletter").unwrap()
});

static BARE_URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)https?://\S+").unwrap());

/// Clean and normalize extracted text.
///
/// Collapses whitespace runs to a single space, removes boilerplate phrases
/// ("Share this article", "Follow us", "Subscribe", "Newsletter", any case),
/// strips bare `http(s)://` URLs, and trims the ends.
///
/// Removal can expose new matches (a phrase wrapped around another) or leave
/// double spaces behind, so the pass repeats until nothing changes. That makes the
/// function idempotent: `clean_text(&clean_text(s)) == clean_text(s)`.
pub fn clean_text(text: &str) -> String {
    let mut current = collapse(text);
    loop {
        let next = clean_pass(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn clean_pass(text: &str) -> String {
    let without_phrases = BOILERPLATE.replace_all(text, "");
    let without_urls = BARE_URL.replace_all(&without_phrases, "");
    collapse(&without_urls)
}

fn collapse(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(clean_text("  one\t two\n\nthree  "), "one two three");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(clean_text(""), "");
        assert_eq!(clean_text(" \n\t "), "");
    }

    #[test]
    fn test_removes_boilerplate_any_case() {
        let cleaned = clean_text(
            "Rates rose. SHARE THIS ARTICLE Follow Us on social. subscribe to our NEWSLETTER today",
        );
        assert_eq!(cleaned, "Rates rose. on social. to our today");
        let lower = cleaned.to_lowercase();
        for phrase in ["share this article", "follow us", "subscribe", "newsletter"] {
            assert!(!lower.contains(phrase), "{phrase} survived");
        }
    }

    #[test]
    fn test_strips_bare_urls() {
        assert_eq!(
            clean_text("Read more at https://example.com/a?b=c and http://x.y/z."),
            "Read more at and"
        );
    }

    #[test]
    fn test_phrase_split_across_lines_is_removed() {
        assert_eq!(clean_text("Please share\nthis   article now"), "Please now");
    }

    #[test]
    fn test_removal_exposing_new_match() {
        // Removing the inner phrase reassembles the outer one.
        assert_eq!(clean_text("SubSubscribescribe end"), "end");
        assert_eq!(clean_text("Follow Follow usus today"), "today");
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "",
            "plain text",
            "  Share  this article  https://a.b/c  Follow us ",
            "SubSubscribescribe",
            "a Subscribe b",
            "Newsletterhttps://x.y Newsletter",
            "ünïcödé   text\u{00a0}with nbsp",
            "Follow\tus\nFollow us",
        ];
        for input in inputs {
            let once = clean_text(input);
            assert_eq!(clean_text(&once), once, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn test_keeps_regular_prose() {
        let text = "The central bank held rates steady on Tuesday.";
        assert_eq!(clean_text(text), text);
    }
}
