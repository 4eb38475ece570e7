//! "Right now" card, taken from the first hourly row.

use std::sync::mpsc::Receiver;

use skydeck_weather::{describe, WeatherCondition};

use super::{ForecastModel, ModelEvent};
use crate::notify::Notifier;

#[derive(Debug, Clone, PartialEq)]
pub struct CurrentSnapshot {
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: i32,
    pub wind_speed: f64,
    pub wind_gusts: f64,
    pub wind_direction: i32,
    pub weather_code: i32,
    pub description: String,
    pub precip_probability: i32,
    pub cloud_cover: i32,
    pub icon: String,
}

impl Default for CurrentSnapshot {
    fn default() -> Self {
        Self::from_code(0)
    }
}

impl CurrentSnapshot {
    fn from_code(weather_code: i32) -> Self {
        Self {
            temperature: 0.0,
            feels_like: 0.0,
            humidity: 0,
            wind_speed: 0.0,
            wind_gusts: 0.0,
            wind_direction: 0,
            weather_code,
            description: describe(weather_code).to_string(),
            precip_probability: 0,
            cloud_cover: 0,
            icon: WeatherCondition::from_wmo_code(weather_code)
                .icon_name()
                .to_string(),
        }
    }
}

#[derive(Debug, Default)]
pub struct CurrentConditions {
    snapshot: CurrentSnapshot,
    notifier: Notifier<ModelEvent>,
}

impl CurrentConditions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the snapshot from hourly row 0. Missing values read as 0.
    /// Percentages and the wind bearing are truncated to whole numbers.
    pub fn update_from_hourly(&mut self, hourly: &ForecastModel) {
        let read = |role: &str| hourly.value(0, role).unwrap_or(0.0);

        let mut snapshot = CurrentSnapshot::from_code(read("weatherCode") as i32);
        snapshot.temperature = read("temperature");
        snapshot.feels_like = read("apparentTemperature");
        snapshot.humidity = read("humidity") as i32;
        snapshot.wind_speed = read("windSpeed");
        snapshot.wind_gusts = read("windGusts");
        snapshot.wind_direction = read("windDirection") as i32;
        snapshot.precip_probability = read("precipProbability") as i32;
        snapshot.cloud_cover = read("cloudCover") as i32;

        self.snapshot = snapshot;
        self.notifier.emit(ModelEvent::Changed);
    }

    pub fn snapshot(&self) -> &CurrentSnapshot {
        &self.snapshot
    }

    pub fn subscribe(&mut self) -> Receiver<ModelEvent> {
        self.notifier.subscribe()
    }
}
