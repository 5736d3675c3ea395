//! Upstream data sources: the geocoder and the statistics API.

pub mod eurostat;
pub mod geocode;

pub use eurostat::{EurostatClient, cutoff_year};
pub use geocode::GeocodeClient;
