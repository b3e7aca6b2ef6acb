use crate::review::{value_text, Review};
use regex::Regex;
use serde::de::DeserializeOwned;
use std::sync::LazyLock;
use thiserror::Error;

static CODE_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"```(\w*)\n([\s\S]*?)\n```").expect("code block pattern is valid")
});

#[derive(Error, Debug)]
pub enum ParseJsonError {
    #[error("No JSON object found in response: {0}")]
    NoJsonFound(String),
    #[error("Failed to parse JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Contents of the last code block tagged with `language`, or of the first
/// block when no language is requested.
pub fn parse_markdown_code_block(content: &str, language: Option<&str>) -> Option<String> {
    let mut last_match = None;
    for cap in CODE_BLOCK.captures_iter(content) {
        let block_language = cap.get(1).map_or("", |m| m.as_str());
        let parsed_content = cap.get(2).map_or("", |m| m.as_str()).trim();
        match language {
            None => return Some(parsed_content.to_string()),
            Some(lang) if block_language == lang => last_match = Some(parsed_content.to_string()),
            Some(_) => {}
        }
    }
    last_match
}

/// Parses a model reply that should be JSON, either bare or wrapped in a
/// ```json fence.
pub fn parse_json_response<T: DeserializeOwned>(completion: &str) -> Result<T, ParseJsonError> {
    let trimmed = completion.trim();
    if trimmed.starts_with('{') {
        return Ok(serde_json::from_str(trimmed)?);
    }
    match parse_markdown_code_block(trimmed, Some("json")) {
        Some(json_string) => Ok(serde_json::from_str(&json_string)?),
        None => Err(ParseJsonError::NoJsonFound(completion.to_string())),
    }
}

fn text_or_empty(value: &Option<serde_json::Value>) -> String {
    value_text(value, "")
}

/// Numbered review listing used as context for summaries.
pub fn display_reviews_for_summary(reviews: &[&Review]) -> String {
    reviews
        .iter()
        .enumerate()
        .map(|(i, r)| {
            format!(
                "Review {}:\nTitle: {}\nRating: {}/5 stars\nProduct: {}\nReview: {}\nBy: {}\n\n",
                i + 1,
                text_or_empty(&r.title),
                r.stars_display(),
                text_or_empty(&r.product),
                text_or_empty(&r.review_text),
                text_or_empty(&r.username),
            )
        })
        .collect()
}

/// Numbered review listing used as context for pros/cons extraction.
pub fn display_reviews_for_analysis(reviews: &[&Review]) -> String {
    reviews
        .iter()
        .enumerate()
        .map(|(i, r)| {
            format!(
                "Review {}:\nTitle: {}\nRating: {}/5 stars\nReview: {}\n\n",
                i + 1,
                text_or_empty(&r.title),
                r.stars_display(),
                text_or_empty(&r.review_text),
            )
        })
        .collect()
}
