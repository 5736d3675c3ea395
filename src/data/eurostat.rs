//! Eurostat dissemination API integration (JSON-stat responses).
//!
//! One GET per indicator; the response is reduced to `(period, value)` pairs:
//!
//! - the time dimension's `index` (label key → position) and `label` maps give
//!   position → native period label
//! - the sparse `value` map (position → number) is walked; absent or `null`
//!   positions are simply skipped
//! - periods older than the cutoff year are dropped
//! - native labels are canonicalized (`YYYY-Qn` / `YYYY-MM`) and sorted

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{Datelike, NaiveDate};
use reqwest::blocking::{Client, RequestBuilder};
use serde::Deserialize;
use tracing::debug;

use crate::config::Settings;
use crate::domain::{CountryCode, IndicatorSpec, Observation, ObservationSeries, PeriodLabel, leading_year};
use crate::error::{AppError, FetchError};

/// How many calendar years back a series reaches.
pub const LOOKBACK_YEARS: i32 = 5;

/// Earliest year kept for a fetch made on `today`.
pub fn cutoff_year(today: NaiveDate) -> i32 {
    today.year() - LOOKBACK_YEARS
}

pub struct EurostatClient {
    client: Client,
    base_url: String,
}

impl EurostatClient {
    pub fn new(settings: &Settings) -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent(settings.user_agent.clone())
            .build()
            .map_err(|e| AppError::new(2, format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: settings.eurostat_url.trim_end_matches('/').to_string(),
        })
    }

    /// `GET {base}/{dataset}?format=JSON&lang=EN&geo=..&<filters>`
    fn build_request(&self, country: &CountryCode, spec: &IndicatorSpec) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, spec.dataset);

        let mut params: Vec<(&str, &str)> = vec![
            ("format", "JSON"),
            ("lang", "EN"),
            ("geo", country.as_str()),
        ];
        params.extend_from_slice(spec.filters);

        debug!(%url, geo = %country, dataset = spec.dataset, "fetching indicator");
        self.client.get(url).query(&params)
    }

    pub fn fetch_series(
        &self,
        country: &CountryCode,
        spec: &IndicatorSpec,
        cutoff_year: i32,
    ) -> Result<ObservationSeries, FetchError> {
        let resp = self
            .build_request(country, spec)
            .send()
            .map_err(|source| FetchError::Transport {
                dataset: spec.dataset.to_string(),
                source,
            })?;

        if !resp.status().is_success() {
            return Err(FetchError::Status {
                dataset: spec.dataset.to_string(),
                status: resp.status().as_u16(),
            });
        }

        let body: DatasetResponse = resp.json().map_err(|e| FetchError::Malformed {
            dataset: spec.dataset.to_string(),
            message: e.to_string(),
        })?;

        let series = parse_dataset(&body, spec, cutoff_year)?;
        debug!(dataset = spec.dataset, n = series.len(), "indicator normalized");
        Ok(series)
    }
}

/// The subset of a JSON-stat dataset we read.
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetResponse {
    #[serde(default)]
    pub id: Vec<String>,
    #[serde(default)]
    pub size: Vec<usize>,
    pub dimension: Dimensions,
    #[serde(default)]
    pub value: BTreeMap<String, Option<f64>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Dimensions {
    pub time: Dimension,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Dimension {
    pub category: Category,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Category {
    pub index: CategoryIndex,
    #[serde(default)]
    pub label: HashMap<String, String>,
}

/// JSON-stat allows the index either as a key→position map or as an ordered list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CategoryIndex {
    Map(HashMap<String, usize>),
    List(Vec<String>),
}

impl CategoryIndex {
    fn positions(&self) -> Vec<(usize, &str)> {
        match self {
            CategoryIndex::Map(m) => m.iter().map(|(k, &v)| (v, k.as_str())).collect(),
            CategoryIndex::List(v) => v.iter().enumerate().map(|(i, k)| (i, k.as_str())).collect(),
        }
    }
}

/// Normalize a dataset response into an [`ObservationSeries`].
pub fn parse_dataset(
    body: &DatasetResponse,
    spec: &IndicatorSpec,
    cutoff_year: i32,
) -> Result<ObservationSeries, FetchError> {
    let malformed = |message: String| FetchError::Malformed {
        dataset: spec.dataset.to_string(),
        message,
    };

    check_only_time_varies(body).map_err(&malformed)?;

    // position (as string) -> native period label
    let category = &body.dimension.time.category;
    let mut native_by_pos: HashMap<String, &str> = HashMap::new();
    for (pos, key) in category.index.positions() {
        let label = category.label.get(key).map(String::as_str).unwrap_or(key);
        native_by_pos.insert(pos.to_string(), label);
    }

    let mut points = Vec::new();
    let mut seen = HashSet::new();
    for (pos, value) in &body.value {
        let Some(value) = value else {
            continue;
        };
        let native = native_by_pos
            .get(pos)
            .ok_or_else(|| malformed(format!("value position {pos} has no time label")))?;
        let year = leading_year(native)
            .ok_or_else(|| malformed(format!("time label '{native}' has no leading year")))?;
        if year < cutoff_year {
            continue;
        }

        let period = PeriodLabel::parse(native, spec.granularity).ok_or_else(|| FetchError::PeriodLabel {
            dataset: spec.dataset.to_string(),
            label: native.to_string(),
            granularity: spec.granularity.display_name(),
        })?;
        if !seen.insert(period) {
            return Err(malformed(format!("duplicate period {period}")));
        }

        points.push(Observation {
            period,
            value: *value,
        });
    }

    points.sort_by_key(|o| o.period);

    Ok(ObservationSeries {
        indicator: spec.kind,
        points,
    })
}

/// Every non-time dimension must be pinned to one category, otherwise value
/// positions do not map 1:1 onto time positions.
fn check_only_time_varies(body: &DatasetResponse) -> Result<(), String> {
    if body.id.is_empty() || body.size.is_empty() {
        return Ok(());
    }
    if body.id.len() != body.size.len() {
        return Err("dimension ids and sizes disagree".to_string());
    }
    for (id, &size) in body.id.iter().zip(&body.size) {
        if id != "time" && size > 1 {
            return Err(format!("dimension '{id}' has {size} categories; filters must pin it"));
        }
    }
    Ok(())
}
