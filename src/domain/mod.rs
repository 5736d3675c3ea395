//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - canonical periods (`PeriodLabel`, `Granularity`)
//! - the fixed indicator table (`IndicatorKind`, `IndicatorSpec`)
//! - normalized series (`ObservationSeries`)
//! - request-level values (`CountryCode`, `WordCount`, `SummaryRequest`, ...)

pub mod indicator;
pub mod period;
pub mod types;

pub use indicator::*;
pub use period::*;
pub use types::*;
