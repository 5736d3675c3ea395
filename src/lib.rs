//! `macro-brief` library crate.
//!
//! The binary (`mb`) is a thin wrapper around this library so that:
//!
//! - the fetch/normalize pipeline is testable without spawning processes
//! - the CLI and the TUI share one implementation of the workflow

pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod narrative;
pub mod plot;
pub mod report;
pub mod tui;

#[cfg(test)]
mod test_support;
