//! Shared "generate" pipeline used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! geocode -> fetch each indicator (sequentially) -> prompt -> narrative -> pair
//!
//! The collaborators are traits so the workflow can be driven by in-memory
//! fakes in tests; the real clients implement them below.

use chrono::NaiveDate;
use tracing::info;

use crate::data::{EurostatClient, GeocodeClient, cutoff_year};
use crate::domain::{CountryCode, IndicatorKind, IndicatorSpec, ObservationSeries, SummaryRequest};
use crate::error::{FetchError, PipelineError};
use crate::narrative::{Narrative, NarrativeInput, NarrativeService, pair_with_indicators};

pub trait Geocoder {
    fn resolve_country(&self, address: &str) -> Option<CountryCode>;
}

pub trait SeriesSource {
    fn fetch_series(
        &self,
        country: &CountryCode,
        spec: &IndicatorSpec,
        cutoff_year: i32,
    ) -> Result<ObservationSeries, FetchError>;
}

impl Geocoder for GeocodeClient {
    fn resolve_country(&self, address: &str) -> Option<CountryCode> {
        GeocodeClient::resolve_country(self, address)
    }
}

impl SeriesSource for EurostatClient {
    fn fetch_series(
        &self,
        country: &CountryCode,
        spec: &IndicatorSpec,
        cutoff_year: i32,
    ) -> Result<ObservationSeries, FetchError> {
        EurostatClient::fetch_series(self, country, spec, cutoff_year)
    }
}

/// Resolved country plus one normalized series per selected indicator.
#[derive(Debug, Clone)]
pub struct FetchOutput {
    pub country: CountryCode,
    /// Same order as the request's indicators.
    pub series: Vec<ObservationSeries>,
}

/// All outputs of a single "generate" action.
#[derive(Debug, Clone)]
pub struct SummaryRun {
    pub country: CountryCode,
    pub series: Vec<ObservationSeries>,
    /// One per requested language, in display order.
    pub narratives: Vec<Narrative>,
}

/// Resolve the address and fetch every selected indicator.
///
/// Country detection failure stops the run before any statistics request.
pub fn fetch_only(
    geocoder: &dyn Geocoder,
    source: &dyn SeriesSource,
    address: &str,
    indicators: &[IndicatorKind],
    today: NaiveDate,
) -> Result<FetchOutput, PipelineError> {
    let country = geocoder
        .resolve_country(address)
        .ok_or(PipelineError::GeocodeNotFound)?;
    info!(%country, "country detected");

    let cutoff = cutoff_year(today);
    let mut series = Vec::with_capacity(indicators.len());
    for &kind in indicators {
        let s = source.fetch_series(&country, kind.spec(), cutoff)?;
        info!(indicator = ?kind, n = s.len(), "indicator fetched");
        series.push(s);
    }

    Ok(FetchOutput { country, series })
}

/// Execute the full pipeline for one request.
pub fn run_summary(
    geocoder: &dyn Geocoder,
    source: &dyn SeriesSource,
    narrator: &dyn NarrativeService,
    request: &SummaryRequest,
    today: NaiveDate,
) -> Result<SummaryRun, PipelineError> {
    let FetchOutput { country, series } =
        fetch_only(geocoder, source, &request.address, &request.indicators, today)?;

    let input = NarrativeInput::new(country.clone(), &series, request.word_count);

    let mut narratives = Vec::new();
    for language in request.languages.languages() {
        let text = narrator.complete(&input.prompt(language))?;
        narratives.push(pair_with_indicators(&text, &request.indicators, language)?);
        info!(language = language.code(), "narrative received");
    }

    Ok(SummaryRun {
        country,
        series,
        narratives,
    })
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use super::*;
    use crate::domain::{Language, Observation, PeriodLabel, SummaryLanguages, WordCount};
    use crate::error::NarrativeError;

    struct FakeGeocoder(Option<&'static str>);

    impl Geocoder for FakeGeocoder {
        fn resolve_country(&self, _address: &str) -> Option<CountryCode> {
            self.0.and_then(CountryCode::parse)
        }
    }

    #[derive(Default)]
    struct FakeSource {
        calls: RefCell<Vec<IndicatorKind>>,
    }

    impl SeriesSource for FakeSource {
        fn fetch_series(
            &self,
            _country: &CountryCode,
            spec: &IndicatorSpec,
            cutoff_year: i32,
        ) -> Result<ObservationSeries, FetchError> {
            self.calls.borrow_mut().push(spec.kind);
            let period = match spec.granularity {
                crate::domain::Granularity::Monthly => PeriodLabel::month(cutoff_year, 1),
                crate::domain::Granularity::Quarterly => PeriodLabel::quarter(cutoff_year, 1),
            }
            .unwrap();
            Ok(ObservationSeries {
                indicator: spec.kind,
                points: vec![Observation { period, value: 1.0 }],
            })
        }
    }

    struct FakeNarrator {
        reply: &'static str,
        calls: Cell<usize>,
        last_prompt: RefCell<String>,
    }

    impl FakeNarrator {
        fn new(reply: &'static str) -> Self {
            Self {
                reply,
                calls: Cell::new(0),
                last_prompt: RefCell::new(String::new()),
            }
        }
    }

    impl NarrativeService for FakeNarrator {
        fn complete(&self, prompt: &str) -> Result<String, NarrativeError> {
            self.calls.set(self.calls.get() + 1);
            *self.last_prompt.borrow_mut() = prompt.to_string();
            Ok(self.reply.to_string())
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[test]
    fn undetected_country_halts_before_fetch() {
        let source = FakeSource::default();
        let narrator = FakeNarrator::new("x");
        let req = SummaryRequest::new("asdfghjkl", WordCount::default(), &IndicatorKind::ALL, SummaryLanguages::Both)
            .unwrap();

        let err = run_summary(&FakeGeocoder(None), &source, &narrator, &req, today()).unwrap_err();
        assert!(matches!(err, PipelineError::GeocodeNotFound));
        assert!(source.calls.borrow().is_empty());
        assert_eq!(narrator.calls.get(), 0);
    }

    #[test]
    fn fetches_sequentially_in_canonical_order() {
        let source = FakeSource::default();
        let out = fetch_only(
            &FakeGeocoder(Some("nl")),
            &source,
            "Amsterdam, Netherlands",
            &[IndicatorKind::Hicp, IndicatorKind::Gdp, IndicatorKind::Unemployment],
            today(),
        )
        .unwrap();
        assert_eq!(out.country.as_str(), "NL");
        assert_eq!(*source.calls.borrow(), IndicatorKind::ALL.to_vec());
        assert!(out.series.iter().all(|s| s.first_year() == Some(2021)));
    }

    #[test]
    fn bilingual_run_requests_one_narrative_per_language() {
        let source = FakeSource::default();
        let narrator = FakeNarrator::new("Prices.\n\nOutput.\n\nJobs.\n\nAll together.");
        let req = SummaryRequest::new(
            "Amsterdam, Netherlands",
            WordCount::new(150).unwrap(),
            &IndicatorKind::ALL,
            SummaryLanguages::Both,
        )
        .unwrap();

        let run = run_summary(&FakeGeocoder(Some("nl")), &source, &narrator, &req, today()).unwrap();
        assert_eq!(narrator.calls.get(), 2);
        assert_eq!(run.series.len(), 3);
        let langs: Vec<Language> = run.narratives.iter().map(|n| n.language).collect();
        assert_eq!(langs, vec![Language::Es, Language::En]);
        assert_eq!(run.narratives[1].section(IndicatorKind::Gdp), Some("Output."));
        assert_eq!(run.narratives[1].conclusion, "All together.");

        let prompt = narrator.last_prompt.borrow();
        assert!(prompt.contains("approximately 150 words"));
        assert!(prompt.contains("HICP – Harmonized Inflation Index"));
    }

    #[test]
    fn short_reply_surfaces_paragraph_mismatch() {
        let source = FakeSource::default();
        let narrator = FakeNarrator::new("Just one paragraph.");
        let req = SummaryRequest::new("Madrid", WordCount::default(), &[IndicatorKind::Gdp], SummaryLanguages::English)
            .unwrap();
        let err = run_summary(&FakeGeocoder(Some("es")), &source, &narrator, &req, today()).unwrap_err();
        assert!(matches!(err, PipelineError::ParagraphCountMismatch { expected: 2, found: 1, .. }));
    }
}
