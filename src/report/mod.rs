//! Reporting utilities: formatted terminal output for fetch and summary runs.

pub mod format;

pub use format::{PlotSize, format_fetch, format_summary};
