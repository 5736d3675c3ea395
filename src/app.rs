//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - initializes logging and settings
//! - builds the upstream clients
//! - runs the pipeline and prints reports

use chrono::Local;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, CountryArgs, FetchArgs, SummaryArgs};
use crate::config::Settings;
use crate::data::{EurostatClient, GeocodeClient};
use crate::domain::{SummaryRequest, WordCount, canonical_selection};
use crate::error::{AppError, PipelineError};
use crate::narrative::OpenAiClient;
use crate::report::PlotSize;

pub mod pipeline;

/// Entry point for the `mb` binary.
pub fn run() -> Result<(), AppError> {
    // We want `mb` and `mb -a Paris` to behave like `mb tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    // The TUI owns the terminal, so it stays quiet unless RUST_LOG asks otherwise.
    let default_level = match cli.command {
        Command::Tui(_) => "off",
        _ => "warn",
    };
    init_tracing(default_level);
    let settings = Settings::from_env();

    match cli.command {
        Command::Summary(args) => handle_summary(&settings, args),
        Command::Fetch(args) => handle_fetch(&settings, args),
        Command::Country(args) => handle_country(&settings, args),
        Command::Tui(args) => crate::tui::run(&settings, args),
    }
}

/// Log to stderr; `RUST_LOG` overrides `default_level`.
fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // A subscriber may already be installed (e.g. when embedded); that's fine.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn handle_summary(settings: &Settings, args: SummaryArgs) -> Result<(), AppError> {
    let word_count = WordCount::new(args.words)
        .ok_or_else(|| AppError::new(2, format!("Invalid word count {}.", args.words)))?;
    let request = SummaryRequest::new(
        args.selection.address,
        word_count,
        &args.selection.indicators,
        args.language,
    )
    .map_err(|e| AppError::new(2, e))?;

    let geocoder = GeocodeClient::new(settings)?;
    let source = EurostatClient::new(settings)?;
    let narrator = OpenAiClient::new(settings)?;
    if !narrator.has_api_key() {
        return Err(AppError::new(2, "Missing OPENAI_API_KEY in environment (.env)."));
    }

    let today = Local::now().date_naive();
    let run = pipeline::run_summary(&geocoder, &source, &narrator, &request, today)?;

    let plot = (args.plot && !args.no_plot).then_some(PlotSize {
        width: args.width,
        height: args.height,
    });
    println!("{}", crate::report::format_summary(&run, plot));
    Ok(())
}

fn handle_fetch(settings: &Settings, args: FetchArgs) -> Result<(), AppError> {
    let indicators = canonical_selection(&args.selection.indicators);
    if indicators.is_empty() {
        return Err(PipelineError::InvalidRequest("Select at least one indicator.".to_string()).into());
    }

    let geocoder = GeocodeClient::new(settings)?;
    let source = EurostatClient::new(settings)?;
    let today = Local::now().date_naive();
    let out = pipeline::fetch_only(&geocoder, &source, &args.selection.address, &indicators, today)?;

    println!("{}", crate::report::format_fetch(&out));
    Ok(())
}

fn handle_country(settings: &Settings, args: CountryArgs) -> Result<(), AppError> {
    let geocoder = GeocodeClient::new(settings)?;
    match geocoder.lookup(&args.address) {
        Ok(Some(code)) => {
            println!("{code}");
            Ok(())
        }
        Ok(None) => Err(PipelineError::GeocodeNotFound.into()),
        Err(e) => Err(AppError::new(4, format!("Could not detect the country: {e}"))),
    }
}

/// Rewrite argv so `mb` defaults to `mb tui`.
///
/// Rules:
/// - `mb`                      -> `mb tui`
/// - `mb -a Paris ...`         -> `mb tui -a Paris ...`
/// - `mb --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "summary" | "fetch" | "country" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}
