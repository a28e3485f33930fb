//! Pulling a profile out of a DOM-analysis model response.
//!
//! The analysis prompt asks for a single JSON object, but responses usually
//! wrap it in a fenced ```` ```json ```` block surrounded by prose.

use regex::Regex;

use crate::error::LoadError;
use crate::model::SiteProfile;
use crate::storage::{parse_document, DocumentFormat};
use crate::validate::{validate_with, ValidationOptions};

/// Body of the first ```` ```json ```` fenced block in `text`, trimmed.
#[must_use]
pub fn extract_fenced_json(text: &str) -> Option<&str> {
    let fence = Regex::new(r"(?s)```json(.*?)```").expect("valid regex");
    fence
        .captures(text)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().trim())
}

/// Parse and validate the profile contained in an analysis response.
///
/// Uses the fenced JSON block when there is one and the whole text otherwise.
///
/// # Errors
///
/// Returns [`LoadError::Json`] if the selected text is not JSON, or
/// [`LoadError::Invalid`] if it is not a valid profile.
pub fn parse_analysis_response(
    text: &str,
    options: ValidationOptions,
) -> Result<SiteProfile, LoadError> {
    let body = match extract_fenced_json(text) {
        Some(body) => body,
        None => {
            tracing::debug!("analysis response has no fenced json block; parsing raw text");
            text.trim()
        }
    };

    let raw = parse_document(body, DocumentFormat::Json, "analysis response")?;
    validate_with(&raw, options).map_err(|source| LoadError::Invalid {
        context: "analysis response".to_owned(),
        source,
    })
}
