//! Open-Meteo weather data for Skydeck
//!
//! Field catalogs, the WMO weather code lexicon, columnar payload types and
//! the HTTP client used to fetch forecasts and search for cities.

pub mod catalog;
pub mod provider;
pub mod types;
pub mod wmo;

pub use catalog::{FieldDescriptor, DAILY_FIELDS, HOURLY_FIELDS, TIME_KEY};
pub use provider::{OpenMeteoClient, WeatherApi};
pub use types::*;
pub use wmo::{describe, WeatherCondition};
