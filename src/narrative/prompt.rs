//! Prompt construction for the narrative summary.
//!
//! The prompt embeds one labeled table per selected indicator, always in the
//! canonical encounter order, so the model's paragraphs can be paired with the
//! charts positionally.

use crate::domain::{CountryCode, Language, ObservationSeries, WordCount};

/// Everything the text-generation call needs; consumed once per request.
#[derive(Debug, Clone)]
pub struct NarrativeInput {
    pub country: CountryCode,
    pub word_count: WordCount,
    /// Rendered table blocks, one per indicator.
    pub tables: String,
}

impl NarrativeInput {
    /// Render the tables of `series`, sorted into canonical indicator order.
    pub fn new(country: CountryCode, series: &[ObservationSeries], word_count: WordCount) -> Self {
        let mut ordered: Vec<&ObservationSeries> = series.iter().collect();
        ordered.sort_by_key(|s| s.indicator);

        let mut tables = String::new();
        for s in &ordered {
            tables.push_str(&format!(
                "\n\n📌 {}:\n{}",
                s.indicator.spec().table_heading,
                render_table(s)
            ));
        }

        Self {
            country,
            word_count,
            tables,
        }
    }

    /// The full prompt for one summary language.
    pub fn prompt(&self, language: Language) -> String {
        let country = self.country.display_name(language);
        let words = self.word_count;
        let tables = &self.tables;
        match language {
            Language::En => format!(
                "\nYou are an economist. Write a technical summary of approximately {words} words \
about the following real indicators for {country}, sourced from Eurostat:\n\n{tables}\n\n\
Write a separate paragraph for each KPI, and finish with a final paragraph that connects them. \
Separate paragraphs with a blank line. The text must be in English.\n"
            ),
            Language::Es => format!(
                "\nEres un economista. Redacta un resumen técnico de aproximadamente {words} palabras \
sobre los siguientes indicadores reales de {country} obtenidos de Eurostat:\n\n{tables}\n\n\
Escribe un párrafo separado por cada KPI, y concluye con un párrafo final que los relacione. \
Separa los párrafos con una línea en blanco. El texto debe estar en español.\n"
            ),
        }
    }
}

/// Render a series as a two-column, right-aligned text table.
///
/// Values keep the precision the statistics API published.
pub fn render_table(series: &ObservationSeries) -> String {
    let rows: Vec<(String, String)> = series
        .points
        .iter()
        .map(|o| (o.period.to_string(), o.value.to_string()))
        .collect();

    let w_period = rows.iter().map(|r| r.0.len()).max().unwrap_or(0).max("Period".len());
    let w_value = rows.iter().map(|r| r.1.len()).max().unwrap_or(0).max("Value".len());

    let mut out = format!("{:>w_period$} {:>w_value$}", "Period", "Value");
    for (period, value) in rows {
        out.push('\n');
        out.push_str(&format!("{period:>w_period$} {value:>w_value$}"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{IndicatorKind, Observation, PeriodLabel};

    fn series(kind: IndicatorKind, n: usize) -> ObservationSeries {
        ObservationSeries {
            indicator: kind,
            points: (1..=n as u8)
                .map(|q| Observation {
                    period: PeriodLabel::quarter(2024, q).unwrap(),
                    value: 100.0 + q as f64,
                })
                .collect(),
        }
    }

    #[test]
    fn table_is_right_aligned() {
        let t = render_table(&series(IndicatorKind::Gdp, 2));
        assert_eq!(t, " Period Value\n2024-Q1   101\n2024-Q2   102");
    }

    #[test]
    fn table_values_are_not_rounded() {
        let s = ObservationSeries {
            indicator: IndicatorKind::Hicp,
            points: vec![
                Observation { period: PeriodLabel::month(2024, 1).unwrap(), value: 125.37 },
                Observation { period: PeriodLabel::month(2024, 2).unwrap(), value: 0.125 },
            ],
        };
        let t = render_table(&s);
        assert!(t.contains("2024-01 125.37"), "{t}");
        assert!(t.contains("2024-02  0.125"), "{t}");
    }

    #[test]
    fn empty_series_renders_header_only() {
        let t = render_table(&series(IndicatorKind::Gdp, 0));
        assert_eq!(t, "Period Value");
    }

    #[test]
    fn three_blocks_in_fixed_order() {
        let input = NarrativeInput::new(
            CountryCode::parse("nl").unwrap(),
            &[
                series(IndicatorKind::Unemployment, 1),
                series(IndicatorKind::Hicp, 1),
                series(IndicatorKind::Gdp, 1),
            ],
            WordCount::new(150).unwrap(),
        );
        let hicp = input.tables.find("HICP – Harmonized Inflation Index").unwrap();
        let gdp = input.tables.find("GDP – Quarterly Volume").unwrap();
        let unemp = input.tables.find("Unemployment Rate").unwrap();
        assert!(hicp < gdp && gdp < unemp);
        assert_eq!(input.tables.matches("📌").count(), 3);
    }

    #[test]
    fn prompt_carries_words_country_and_language() {
        let input = NarrativeInput::new(
            CountryCode::parse("es").unwrap(),
            &[series(IndicatorKind::Gdp, 1)],
            WordCount::new(200).unwrap(),
        );
        let en = input.prompt(Language::En);
        assert!(en.contains("approximately 200 words"));
        assert!(en.contains("for Spain"));
        assert!(en.contains("must be in English"));
        assert!(en.contains(&input.tables));

        let es = input.prompt(Language::Es);
        assert!(es.contains("200 palabras"));
        assert!(es.contains("de España"));
    }
}
