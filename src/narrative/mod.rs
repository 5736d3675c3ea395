//! Narrative summary: prompt building, the text-generation call, and pairing
//! the returned paragraphs with indicators.

pub mod client;
pub mod paragraphs;
pub mod prompt;

pub use client::{NarrativeService, OpenAiClient};
pub use paragraphs::{Narrative, pair_with_indicators, split_paragraphs};
pub use prompt::{NarrativeInput, render_table};
