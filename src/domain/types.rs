//! Shared domain types.
//!
//! These are small value types passed between the resolver, the fetcher, the
//! narrative builder and the front-ends. Everything here is transient: created
//! for one "generate" action and dropped afterwards.

use std::fmt;

use clap::ValueEnum;

use super::indicator::IndicatorKind;

/// Two-letter uppercase country code.
///
/// Only ever derived from a geocoding response; never typed in by the user.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CountryCode(String);

impl CountryCode {
    pub fn parse(raw: &str) -> Option<Self> {
        let s = raw.trim();
        if s.len() != 2 || !s.bytes().all(|b| b.is_ascii_alphabetic()) {
            return None;
        }
        Some(Self(s.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Country name used inside prompts and headings.
    pub fn display_name(&self, language: Language) -> String {
        let known = match (self.0.as_str(), language) {
            ("NL", Language::En) => Some("the Netherlands"),
            ("NL", Language::Es) => Some("Países Bajos"),
            ("ES", Language::En) => Some("Spain"),
            ("ES", Language::Es) => Some("España"),
            ("FR", Language::En) => Some("France"),
            ("FR", Language::Es) => Some("Francia"),
            ("IT", Language::En) => Some("Italy"),
            ("IT", Language::Es) => Some("Italia"),
            ("DE", Language::En) => Some("Germany"),
            ("DE", Language::Es) => Some("Alemania"),
            ("BE", Language::En) => Some("Belgium"),
            ("BE", Language::Es) => Some("Bélgica"),
            _ => None,
        };
        match (known, language) {
            (Some(name), _) => name.to_string(),
            (None, Language::En) => format!("Country ({})", self.0),
            (None, Language::Es) => format!("País ({})", self.0),
        }
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Language of a generated summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    En,
    Es,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::En => "EN",
            Language::Es => "ES",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Es => "Español",
        }
    }
}

/// Which summary languages to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SummaryLanguages {
    #[value(name = "en")]
    English,
    #[value(name = "es")]
    Spanish,
    Both,
}

impl SummaryLanguages {
    /// Requested languages in display order (Spanish before English).
    pub fn languages(self) -> Vec<Language> {
        match self {
            SummaryLanguages::English => vec![Language::En],
            SummaryLanguages::Spanish => vec![Language::Es],
            SummaryLanguages::Both => vec![Language::Es, Language::En],
        }
    }

    pub fn next(self) -> Self {
        match self {
            SummaryLanguages::English => SummaryLanguages::Spanish,
            SummaryLanguages::Spanish => SummaryLanguages::Both,
            SummaryLanguages::Both => SummaryLanguages::English,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            SummaryLanguages::English => SummaryLanguages::Both,
            SummaryLanguages::Spanish => SummaryLanguages::English,
            SummaryLanguages::Both => SummaryLanguages::Spanish,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            SummaryLanguages::English => "English",
            SummaryLanguages::Spanish => "Spanish",
            SummaryLanguages::Both => "Spanish + English",
        }
    }
}

/// Target summary length in words: 100..=300, step 25.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct WordCount(u16);

impl WordCount {
    pub const MIN: u16 = 100;
    pub const MAX: u16 = 300;
    pub const STEP: u16 = 25;

    pub fn new(words: u16) -> Option<Self> {
        let valid = (Self::MIN..=Self::MAX).contains(&words) && (words - Self::MIN) % Self::STEP == 0;
        valid.then_some(Self(words))
    }

    pub fn get(self) -> u16 {
        self.0
    }

    pub fn step_up(self) -> Self {
        Self((self.0 + Self::STEP).min(Self::MAX))
    }

    pub fn step_down(self) -> Self {
        Self(self.0.saturating_sub(Self::STEP).max(Self::MIN))
    }
}

impl Default for WordCount {
    fn default() -> Self {
        Self(150)
    }
}

impl fmt::Display for WordCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One "generate" action as submitted by a front-end.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRequest {
    pub address: String,
    pub word_count: WordCount,
    /// Unique, in canonical encounter order.
    pub indicators: Vec<IndicatorKind>,
    pub languages: SummaryLanguages,
}

impl SummaryRequest {
    /// Build a request, rejecting the inputs the form would not submit.
    pub fn new(
        address: impl Into<String>,
        word_count: WordCount,
        indicators: &[IndicatorKind],
        languages: SummaryLanguages,
    ) -> Result<Self, String> {
        let address = address.into();
        if address.trim().is_empty() {
            return Err("Enter an address.".to_string());
        }
        let indicators = canonical_selection(indicators);
        if indicators.is_empty() {
            return Err("Select at least one indicator.".to_string());
        }
        Ok(Self {
            address,
            word_count,
            indicators,
            languages,
        })
    }
}

/// De-duplicate and order a selection by canonical encounter order.
pub fn canonical_selection(selected: &[IndicatorKind]) -> Vec<IndicatorKind> {
    IndicatorKind::ALL
        .into_iter()
        .filter(|k| selected.contains(k))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn country_code_is_uppercased_and_validated() {
        assert_eq!(CountryCode::parse("nl").unwrap().as_str(), "NL");
        assert_eq!(CountryCode::parse(" De ").unwrap().as_str(), "DE");
        assert!(CountryCode::parse("").is_none());
        assert!(CountryCode::parse("NLD").is_none());
        assert!(CountryCode::parse("1x").is_none());
    }

    #[test]
    fn unknown_countries_fall_back_to_code() {
        let pt = CountryCode::parse("pt").unwrap();
        assert_eq!(pt.display_name(Language::En), "Country (PT)");
        assert_eq!(pt.display_name(Language::Es), "País (PT)");
        let es = CountryCode::parse("es").unwrap();
        assert_eq!(es.display_name(Language::Es), "España");
    }

    #[test]
    fn word_count_respects_range_and_step() {
        assert!(WordCount::new(100).is_some());
        assert!(WordCount::new(175).is_some());
        assert!(WordCount::new(300).is_some());
        assert!(WordCount::new(90).is_none());
        assert!(WordCount::new(110).is_none());
        assert!(WordCount::new(325).is_none());

        let max = WordCount::new(300).unwrap();
        assert_eq!(max.step_up(), max);
        let min = WordCount::new(100).unwrap();
        assert_eq!(min.step_down(), min);
        assert_eq!(WordCount::default().step_up().get(), 175);
    }

    #[test]
    fn selection_is_deduplicated_and_ordered() {
        let req = SummaryRequest::new(
            "Amsterdam",
            WordCount::default(),
            &[IndicatorKind::Unemployment, IndicatorKind::Hicp, IndicatorKind::Unemployment],
            SummaryLanguages::English,
        )
        .unwrap();
        assert_eq!(req.indicators, vec![IndicatorKind::Hicp, IndicatorKind::Unemployment]);
    }

    #[test]
    fn empty_inputs_are_rejected() {
        assert!(SummaryRequest::new("  ", WordCount::default(), &IndicatorKind::ALL, SummaryLanguages::Both).is_err());
        assert!(SummaryRequest::new("Paris", WordCount::default(), &[], SummaryLanguages::Both).is_err());
    }

    #[test]
    fn bilingual_order_is_spanish_first() {
        assert_eq!(SummaryLanguages::Both.languages(), vec![Language::Es, Language::En]);
    }
}
