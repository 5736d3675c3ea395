//! Fixed indicator configuration.
//!
//! Each supported indicator is a single static [`IndicatorSpec`] literal; the
//! fetcher, the prompt builder and both front-ends iterate over
//! [`IndicatorKind::ALL`] instead of carrying one code path per indicator.

use clap::ValueEnum;

use super::period::{Granularity, PeriodLabel};

/// Supported macroeconomic indicators, in canonical encounter order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, ValueEnum)]
pub enum IndicatorKind {
    Hicp,
    Gdp,
    Unemployment,
}

impl IndicatorKind {
    pub const ALL: [IndicatorKind; 3] = [
        IndicatorKind::Hicp,
        IndicatorKind::Gdp,
        IndicatorKind::Unemployment,
    ];

    pub fn spec(self) -> &'static IndicatorSpec {
        match self {
            IndicatorKind::Hicp => &HICP,
            IndicatorKind::Gdp => &GDP,
            IndicatorKind::Unemployment => &UNEMPLOYMENT,
        }
    }

    pub fn display_name(self) -> &'static str {
        self.spec().title
    }
}

/// Immutable request description for one indicator dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndicatorSpec {
    pub kind: IndicatorKind,
    /// Dataset identifier (path segment of the statistics API).
    pub dataset: &'static str,
    /// Dimension filters pinning every non-geo, non-time dimension.
    pub filters: &'static [(&'static str, &'static str)],
    pub granularity: Granularity,
    /// Short title used for chart headings and selection lists.
    pub title: &'static str,
    /// Heading of the table block inside the narrative prompt.
    pub table_heading: &'static str,
    /// Chart line color (RGB).
    pub chart_color: (u8, u8, u8),
}

pub static HICP: IndicatorSpec = IndicatorSpec {
    kind: IndicatorKind::Hicp,
    dataset: "prc_hicp_midx",
    filters: &[("coicop", "CP00"), ("unit", "I15")],
    granularity: Granularity::Monthly,
    title: "HICP – Harmonized Inflation",
    table_heading: "HICP – Harmonized Inflation Index",
    chart_color: (0xDA, 0xA5, 0x20),
};

pub static GDP: IndicatorSpec = IndicatorSpec {
    kind: IndicatorKind::Gdp,
    dataset: "namq_10_gdp",
    filters: &[("na_item", "B1GQ"), ("unit", "CLV10_MNAC"), ("s_adj", "NSA")],
    granularity: Granularity::Quarterly,
    title: "GDP – Gross Domestic Product",
    table_heading: "GDP – Quarterly Volume",
    chart_color: (0x46, 0x82, 0xB4),
};

pub static UNEMPLOYMENT: IndicatorSpec = IndicatorSpec {
    kind: IndicatorKind::Unemployment,
    dataset: "une_rt_m",
    filters: &[("unit", "PC_ACT"), ("sex", "T"), ("age", "TOTAL"), ("s_adj", "SA")],
    granularity: Granularity::Monthly,
    title: "Unemployment Rate",
    table_heading: "Unemployment Rate",
    chart_color: (0x2F, 0x4F, 0x4F),
};

/// One normalized observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub period: PeriodLabel,
    pub value: f64,
}

/// Normalized series for one indicator: unique canonical periods, ascending.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationSeries {
    pub indicator: IndicatorKind,
    pub points: Vec<Observation>,
}

impl ObservationSeries {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn first_year(&self) -> Option<i32> {
        self.points.first().map(|o| o.period.year)
    }

    /// `(min, max)` over finite values.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        let mut min_v = f64::INFINITY;
        let mut max_v = f64::NEG_INFINITY;
        for o in &self.points {
            if o.value.is_finite() {
                min_v = min_v.min(o.value);
                max_v = max_v.max(o.value);
            }
        }
        (min_v.is_finite() && max_v.is_finite()).then_some((min_v, max_v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn specs_are_keyed_by_their_kind() {
        for kind in IndicatorKind::ALL {
            assert_eq!(kind.spec().kind, kind);
        }
    }

    #[test]
    fn canonical_order_is_hicp_gdp_unemployment() {
        let mut v = vec![IndicatorKind::Unemployment, IndicatorKind::Hicp, IndicatorKind::Gdp];
        v.sort();
        assert_eq!(v, IndicatorKind::ALL.to_vec());
    }

    #[test]
    fn filters_never_pin_geo_or_time() {
        for kind in IndicatorKind::ALL {
            for (name, _) in kind.spec().filters {
                assert_ne!(*name, "geo");
                assert_ne!(*name, "time");
            }
        }
    }

    #[test]
    fn value_range_ignores_non_finite() {
        let series = ObservationSeries {
            indicator: IndicatorKind::Gdp,
            points: vec![
                Observation { period: PeriodLabel::quarter(2022, 1).unwrap(), value: 3.0 },
                Observation { period: PeriodLabel::quarter(2022, 2).unwrap(), value: f64::NAN },
                Observation { period: PeriodLabel::quarter(2022, 3).unwrap(), value: -1.0 },
            ],
        };
        assert_eq!(series.value_range(), Some((-1.0, 3.0)));
        assert_eq!(series.first_year(), Some(2022));
    }
}
