//! Plain-text rendering of results for the terminal.

use crate::models::{FailedItem, ProcessingOutcome, SummaryRecord};
use std::fmt::Write;

const HEAVY_RULE: usize = 80;

fn or_na(s: &str) -> &str {
    if s.is_empty() { "N/A" } else { s }
}

fn numbered(out: &mut String, heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let _ = writeln!(out, "\n{heading}:");
    for (i, item) in items.iter().enumerate() {
        let _ = writeln!(out, "  {}. {item}", i + 1);
    }
}

/// Render one summary as a framed block.
pub fn render_summary(record: &SummaryRecord) -> String {
    let heavy = "=".repeat(HEAVY_RULE);
    let light = "-".repeat(HEAVY_RULE);
    let article = &record.original_article;
    let mut out = String::new();

    let _ = writeln!(out, "\n{heavy}\nNEWS SUMMARY\n{heavy}");
    let _ = writeln!(out, "Title: {}", or_na(&article.title));
    let _ = writeln!(out, "URL: {}", or_na(&article.url));
    let _ = writeln!(out, "Author: {}", or_na(&article.author));
    let _ = writeln!(out, "Date: {}", or_na(&article.date));
    let _ = writeln!(out, "Extraction Method: {}", article.extraction_method.as_str());

    let _ = writeln!(out, "\n{light}\nAI GENERATED SUMMARY\n{light}");
    let _ = writeln!(out, "Style: {}", or_na(&record.summary_style));
    let _ = writeln!(out, "Generated: {}", or_na(&record.generated_at));
    let _ = writeln!(out, "\nSummary:\n{}", or_na(&record.summary));

    numbered(&mut out, "Key Points", &record.key_points);

    let sentiment = &record.sentiment;
    let _ = writeln!(out, "\nSentiment Analysis:");
    let _ = writeln!(out, "  Overall: {}", sentiment.sentiment.as_str());
    let _ = writeln!(out, "  Confidence: {}", sentiment.confidence.as_str());
    let _ = writeln!(out, "  Explanation: {}", or_na(&sentiment.explanation));

    numbered(&mut out, "Strategic Insights", &record.insights);

    let _ = write!(out, "\n{heavy}");
    out
}

pub fn render_failure(item: &FailedItem) -> String {
    format!("\nFailed to process {}: {}", item.url, item.error)
}

pub fn render_outcome(outcome: &ProcessingOutcome) -> String {
    match outcome {
        ProcessingOutcome::Summarized(record) => render_summary(record),
        ProcessingOutcome::Failed(item) => render_failure(item),
    }
}

/// Print every outcome to stdout, in order.
pub fn print_outcomes(outcomes: &[ProcessingOutcome]) {
    for outcome in outcomes {
        println!("{}", render_outcome(outcome));
    }
}
