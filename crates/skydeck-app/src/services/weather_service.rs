//! Weather backend: async forecast and city search.
//! All network work runs off the UI thread; results sent via mpsc.

use std::sync::mpsc::Sender;
use std::sync::Arc;

use skydeck_weather::{ForecastResponse, GeocodeResult, WeatherApi, WeatherError};
use tokio::runtime::Handle;

/// Messages sent from async operations back to the UI thread.
///
/// `generation` echoes the number the request was issued with, so the
/// controller can drop completions it no longer cares about.
#[derive(Debug)]
pub enum ServiceMessage {
    ForecastDone {
        generation: u64,
        result: Result<ForecastResponse, WeatherError>,
    },
    GeocodeDone {
        generation: u64,
        result: Result<Vec<GeocodeResult>, WeatherError>,
    },
}

/// Fetch the forecast for `(lat, lon)`. Sends `ForecastDone` when complete.
pub fn request_forecast(
    tx: &Sender<ServiceMessage>,
    runtime: &Handle,
    api: Arc<dyn WeatherApi>,
    generation: u64,
    lat: f64,
    lon: f64,
) {
    let tx = tx.clone();
    runtime.spawn(async move {
        let result = api.fetch_forecast(lat, lon).await;
        if let Err(e) = &result {
            tracing::warn!("Forecast fetch failed: {}", e);
        }
        let _ = tx.send(ServiceMessage::ForecastDone { generation, result });
    });
}

/// Search for cities named `query`. Sends `GeocodeDone` when complete.
pub fn request_geocode(
    tx: &Sender<ServiceMessage>,
    runtime: &Handle,
    api: Arc<dyn WeatherApi>,
    generation: u64,
    query: String,
    count: u32,
) {
    let tx = tx.clone();
    runtime.spawn(async move {
        let result = api.search_locations(&query, count).await;
        if let Err(e) = &result {
            tracing::warn!("City search for {:?} failed: {}", query, e);
        }
        let _ = tx.send(ServiceMessage::GeocodeDone { generation, result });
    });
}
