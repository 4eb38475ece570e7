use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use skydeck_core::{AppError, NetworkError};

use crate::catalog::TIME_KEY;

/// A single forecast value: numeric reading or text timestamp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Text(String),
}

impl Cell {
    /// Convert a JSON array entry; anything but a number or string is absent
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_f64().map(Cell::Number),
            Value::String(s) => Some(Cell::Text(s.clone())),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            Cell::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            Cell::Number(_) => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Number(n) => write!(f, "{}", n),
            Cell::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

/// One section of a forecast payload: one array per field, indexed by time step
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Columns {
    columns: HashMap<String, Vec<Option<Cell>>>,
}

impl Columns {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a JSON object of arrays.
    ///
    /// Non-array members are skipped and unusable entries become `None`, so a
    /// partially malformed section still yields every usable column.
    pub fn from_json(value: &Value) -> Self {
        let mut columns = HashMap::new();
        if let Value::Object(map) = value {
            for (key, member) in map {
                match member {
                    Value::Array(items) => {
                        columns.insert(key.clone(), items.iter().map(Cell::from_json).collect());
                    }
                    _ => tracing::debug!("Skipping non-array forecast member {}", key),
                }
            }
        }
        Self { columns }
    }

    pub fn insert(&mut self, key: impl Into<String>, values: Vec<Option<Cell>>) {
        self.columns.insert(key.into(), values);
    }

    /// Values for `key`; a missing column reads as empty
    pub fn get(&self, key: &str) -> &[Option<Cell>] {
        self.columns.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Cell at `index` of column `key`, `None` when absent or out of range
    pub fn cell(&self, key: &str, index: usize) -> Option<&Cell> {
        self.get(key).get(index).and_then(Option::as_ref)
    }

    /// Number of time steps, taken from the `time` column
    pub fn time_len(&self) -> usize {
        self.get(TIME_KEY).len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Forecast payload split into its hourly and daily sections
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForecastResponse {
    pub hourly: Columns,
    pub daily: Columns,
    /// IANA timezone the timestamps are localized to
    pub timezone: Option<String>,
}

impl ForecastResponse {
    pub fn from_json(value: &Value) -> Self {
        let section = |name: &str| value.get(name).map(Columns::from_json).unwrap_or_default();
        Self {
            hourly: section("hourly"),
            daily: section("daily"),
            timezone: value
                .get("timezone")
                .and_then(Value::as_str)
                .map(str::to_string),
        }
    }
}

/// City search hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    #[serde(default)]
    pub name: String,
    /// State or region
    #[serde(default)]
    pub admin1: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
}

impl GeocodeResult {
    /// "City, Region, Country", skipping empty parts
    pub fn display_name(&self) -> String {
        join_parts([
            Some(self.name.as_str()),
            self.admin1.as_deref(),
            self.country.as_deref(),
        ])
    }

    /// "City, Region" label used when saving the result as a location
    pub fn location_label(&self) -> String {
        join_parts([Some(self.name.as_str()), self.admin1.as_deref()])
    }
}

fn join_parts<'a>(parts: impl IntoIterator<Item = Option<&'a str>>) -> String {
    parts
        .into_iter()
        .flatten()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeocodeResponse {
    #[serde(default)]
    pub results: Vec<GeocodeResult>,
}

/// Weather provider errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },
    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<WeatherError> for AppError {
    fn from(e: WeatherError) -> Self {
        let network = match e {
            WeatherError::Network(e) if e.is_timeout() => NetworkError::Timeout,
            WeatherError::Network(e) => NetworkError::ConnectionFailed(e.to_string()),
            WeatherError::Status { status, message } => {
                NetworkError::ServerError { status, message }
            }
            WeatherError::Parse(msg) => NetworkError::InvalidResponse(msg),
        };
        AppError::Network(network)
    }
}
