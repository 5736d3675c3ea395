//! Splitting generated text into paragraphs and pairing them with indicators.
//!
//! The model is asked for one paragraph per indicator (in prompt order) and a
//! final concluding paragraph. Pairing is positional; a reply with too few
//! paragraphs is reported instead of being indexed past its end.

use tracing::warn;

use crate::domain::{IndicatorKind, Language};
use crate::error::PipelineError;

/// A generated summary, paired with the indicators it describes.
#[derive(Debug, Clone, PartialEq)]
pub struct Narrative {
    pub language: Language,
    /// One paragraph per indicator, same order as the request.
    pub sections: Vec<(IndicatorKind, String)>,
    pub conclusion: String,
}

impl Narrative {
    pub fn section(&self, kind: IndicatorKind) -> Option<&str> {
        self.sections
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, p)| p.as_str())
    }
}

/// Split text on blank lines (whitespace-only lines count as blank).
pub fn split_paragraphs(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                out.push(current.join("\n").trim().to_string());
                current.clear();
            }
        } else {
            current.push(line.trim_end());
        }
    }
    if !current.is_empty() {
        out.push(current.join("\n").trim().to_string());
    }
    out
}

/// Pair the first N paragraphs with `indicators` and take the last as conclusion.
pub fn pair_with_indicators(
    text: &str,
    indicators: &[IndicatorKind],
    language: Language,
) -> Result<Narrative, PipelineError> {
    let mut paragraphs = split_paragraphs(text);
    let expected = indicators.len() + 1;
    if paragraphs.len() < expected {
        return Err(PipelineError::ParagraphCountMismatch {
            language,
            expected,
            found: paragraphs.len(),
        });
    }
    if paragraphs.len() > expected {
        warn!(
            language = language.code(),
            expected,
            found = paragraphs.len(),
            "dropping surplus summary paragraphs"
        );
    }

    let conclusion = paragraphs.pop().unwrap_or_default();
    let sections = indicators
        .iter()
        .copied()
        .zip(paragraphs)
        .collect();

    Ok(Narrative {
        language,
        sections,
        conclusion,
    })
}
