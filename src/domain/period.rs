//! Calendar periods for statistical time series.
//!
//! The statistics API labels its time dimension with a handful of textual
//! encodings (`2021-Q1`, `2021Q1`, `2021M01`, `2021-01`, ...). We normalize all
//! of them into a single [`PeriodLabel`] whose `Display` form is canonical:
//!
//! - quarterly: `YYYY-Qn`
//! - monthly:   `YYYY-MM`

use std::fmt;

/// Sampling granularity of an indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Granularity {
    Quarterly,
    Monthly,
}

impl Granularity {
    pub fn display_name(self) -> &'static str {
        match self {
            Granularity::Quarterly => "quarterly",
            Granularity::Monthly => "monthly",
        }
    }
}

/// Position of a period inside its year.
///
/// Ordering is only meaningful between values of the same granularity, which is
/// all a single series ever contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SubPeriod {
    Quarter(u8),
    Month(u8),
}

/// Canonical period label (chronologically ordered).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PeriodLabel {
    pub year: i32,
    pub sub: SubPeriod,
}

impl PeriodLabel {
    pub fn quarter(year: i32, quarter: u8) -> Option<Self> {
        (1..=4).contains(&quarter).then_some(Self {
            year,
            sub: SubPeriod::Quarter(quarter),
        })
    }

    pub fn month(year: i32, month: u8) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self {
            year,
            sub: SubPeriod::Month(month),
        })
    }

    /// Parse a native label as a period of the requested granularity.
    ///
    /// Returns `None` when the label is not a valid period of that granularity,
    /// including a well-formed label of the *other* granularity.
    pub fn parse(native: &str, granularity: Granularity) -> Option<Self> {
        let s = native.trim();
        let year = leading_year(s)?;
        let rest = s.get(4..)?;
        let rest = rest.strip_prefix(['-', ' ']).unwrap_or(rest);

        match granularity {
            Granularity::Quarterly => {
                let digits = rest.strip_prefix(['Q', 'q'])?;
                Self::quarter(year, parse_small(digits, 1)?)
            }
            Granularity::Monthly => {
                // `2021M01` / `2021-M01`
                if let Some(digits) = rest.strip_prefix(['M', 'm']) {
                    return Self::month(year, parse_small(digits, 2)?);
                }
                // `2021-01` or a full date `2021-01-31`
                let (mm, day) = match rest.split_once('-') {
                    Some((mm, dd)) => (mm, Some(dd)),
                    None => (rest, None),
                };
                if let Some(dd) = day {
                    let d = parse_small(dd, 2)?;
                    if !(1..=31).contains(&d) {
                        return None;
                    }
                }
                Self::month(year, parse_small(mm, 2)?)
            }
        }
    }
}

impl fmt::Display for PeriodLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.sub {
            SubPeriod::Quarter(q) => write!(f, "{:04}-Q{q}", self.year),
            SubPeriod::Month(m) => write!(f, "{:04}-{m:02}", self.year),
        }
    }
}

/// Leading 4-digit year of a native label, if any.
pub fn leading_year(s: &str) -> Option<i32> {
    let head = s.get(..4)?;
    if !head.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    head.parse().ok()
}

/// Parse an all-digit field of exactly `width` characters.
fn parse_small(s: &str, width: usize) -> Option<u8> {
    if s.len() != width || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}
