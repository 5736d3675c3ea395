//! Formatted terminal output for the CLI commands.
//!
//! We keep formatting code in one place so:
//! - the fetch/normalize code stays clean and testable
//! - output changes are localized (important for snapshot tests)

use crate::app::pipeline::{FetchOutput, SummaryRun};
use crate::domain::{Language, ObservationSeries};
use crate::narrative::render_table;
use crate::plot::render_series_plot;

/// Chart size for the summary report.
#[derive(Debug, Clone, Copy)]
pub struct PlotSize {
    pub width: usize,
    pub height: usize,
}

/// Format the resolved country and one table per fetched series.
pub fn format_fetch(out: &FetchOutput) -> String {
    let mut s = String::new();
    s.push_str(&format!(
        "=== Macroeconomic indicators: {} ({}) ===\n",
        out.country.display_name(Language::En),
        out.country
    ));
    for series in &out.series {
        s.push('\n');
        s.push_str(&format_series_block(series));
    }
    s
}

fn format_series_block(series: &ObservationSeries) -> String {
    let spec = series.indicator.spec();
    let mut s = format!(
        "## {} [{} {}, n={}]\n",
        spec.title,
        spec.dataset,
        spec.granularity.display_name(),
        series.len()
    );
    s.push_str(&render_table(series));
    s.push('\n');
    s
}

/// Format a full summary run: per-indicator chart + paragraphs, then conclusions.
pub fn format_summary(run: &SummaryRun, plot: Option<PlotSize>) -> String {
    let mut s = String::new();
    s.push_str(&format!(
        "=== Macroeconomic Summary: {} ({}) ===\n",
        run.country.display_name(Language::En),
        run.country
    ));

    s.push_str("\n## Results by Indicator\n");
    for series in &run.series {
        let kind = series.indicator;
        s.push_str(&format!("\n### {}\n", kind.display_name()));
        if let Some(size) = plot {
            s.push_str(&render_series_plot(series, size.width, size.height));
        }
        for narrative in &run.narratives {
            if let Some(p) = narrative.section(kind) {
                s.push_str(&format!("\n{}\n{p}\n", summary_heading(narrative.language)));
            }
        }
    }

    s.push_str("\n## Final Conclusion\n");
    for narrative in &run.narratives {
        s.push_str(&format!(
            "\n{}\n{}\n",
            conclusion_heading(narrative.language),
            narrative.conclusion
        ));
    }

    s
}

pub fn summary_heading(language: Language) -> String {
    format!("#### Summary – {}", language.code())
}

pub fn conclusion_heading(language: Language) -> &'static str {
    match language {
        Language::En => "#### Conclusion – EN",
        Language::Es => "#### Conclusión – ES",
    }
}
