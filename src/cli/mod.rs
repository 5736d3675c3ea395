//! Command-line parsing for the macroeconomic summary tool.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the fetch/normalize and narrative code.

use clap::{Args, Parser, Subcommand};

use crate::domain::{IndicatorKind, SummaryLanguages, WordCount};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "mb",
    version,
    about = "Macroeconomic summary generator (HICP + GDP + Unemployment, Eurostat-based)"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch indicators for an address, print charts and a generated summary.
    Summary(SummaryArgs),
    /// Fetch and print the normalized indicator tables only (no summary).
    Fetch(FetchArgs),
    /// Print the country code detected for an address.
    Country(CountryArgs),
    /// Launch the interactive form.
    ///
    /// This uses the same underlying pipeline as `mb summary`, but renders
    /// results in a terminal UI using Ratatui.
    Tui(TuiArgs),
}

/// Options shared by every command that fetches indicators.
#[derive(Debug, Args, Clone)]
pub struct SelectionArgs {
    /// Free-text European address (city, street, ...).
    #[arg(short = 'a', long)]
    pub address: String,

    /// Indicators to include (comma-separated).
    #[arg(
        short = 'i',
        long,
        value_enum,
        value_delimiter = ',',
        default_values_t = IndicatorKind::ALL.to_vec()
    )]
    pub indicators: Vec<IndicatorKind>,
}

#[derive(Debug, Args, Clone)]
pub struct SummaryArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Approximate summary length in words (100-300, step 25).
    #[arg(short = 'w', long, default_value_t = WordCount::default().get(), value_parser = parse_word_count)]
    pub words: u16,

    /// Summary language(s).
    #[arg(short = 'l', long, value_enum, default_value_t = SummaryLanguages::English)]
    pub language: SummaryLanguages,

    /// Render an ASCII chart per indicator (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal charts.
    #[arg(long)]
    pub no_plot: bool,

    /// Chart width (columns).
    #[arg(long, default_value_t = 72)]
    pub width: usize,

    /// Chart height (rows).
    #[arg(long, default_value_t = 12)]
    pub height: usize,
}

#[derive(Debug, Args, Clone)]
pub struct FetchArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,
}

#[derive(Debug, Args, Clone)]
pub struct CountryArgs {
    /// Free-text address.
    pub address: String,
}

#[derive(Debug, Args, Clone, Default)]
pub struct TuiArgs {
    /// Pre-fill the address field.
    #[arg(short = 'a', long)]
    pub address: Option<String>,

    /// Start with both summary languages selected.
    #[arg(long)]
    pub bilingual: bool,
}

fn parse_word_count(raw: &str) -> Result<u16, String> {
    let n: u16 = raw.parse().map_err(|e| format!("{e}"))?;
    WordCount::new(n)
        .map(WordCount::get)
        .ok_or_else(|| format!("must be between {} and {} in steps of {}", WordCount::MIN, WordCount::MAX, WordCount::STEP))
}
