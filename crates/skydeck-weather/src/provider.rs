//! Open-Meteo HTTP client. No API key required.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use skydeck_core::ApiConfig;
use tracing::instrument;

use crate::catalog::{request_keys, DAILY_FIELDS, HOURLY_FIELDS};
use crate::types::{ForecastResponse, GeocodeResponse, GeocodeResult, WeatherError};

const FORECAST_DAYS: u32 = 7;

/// Forecast and geocode fetches, as consumed by the app controller.
#[async_trait]
pub trait WeatherApi: Send + Sync {
    /// 7-day hourly + daily forecast in US customary units, localized to the
    /// location's timezone.
    async fn fetch_forecast(&self, lat: f64, lon: f64) -> Result<ForecastResponse, WeatherError>;

    /// Up to `count` cities matching `query`, possibly none.
    async fn search_locations(
        &self,
        query: &str,
        count: u32,
    ) -> Result<Vec<GeocodeResult>, WeatherError>;
}

#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    client: Client,
    forecast_url: String,
    geocode_url: String,
    forecast_timeout: Duration,
    geocode_timeout: Duration,
}

impl OpenMeteoClient {
    pub fn new(config: &ApiConfig) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .user_agent(concat!("Skydeck/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            forecast_url: config.forecast_url.clone(),
            geocode_url: config.geocode_url.clone(),
            forecast_timeout: Duration::from_secs(config.forecast_timeout_secs),
            geocode_timeout: Duration::from_secs(config.geocode_timeout_secs),
        })
    }

    /// Turn a non-2xx status into `WeatherError::Status`, keeping the body text
    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, WeatherError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(WeatherError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl WeatherApi for OpenMeteoClient {
    #[instrument(skip(self), level = "info")]
    async fn fetch_forecast(&self, lat: f64, lon: f64) -> Result<ForecastResponse, WeatherError> {
        let hourly = request_keys(&HOURLY_FIELDS);
        let daily = request_keys(&DAILY_FIELDS);

        let response = self
            .client
            .get(&self.forecast_url)
            .query(&[
                ("latitude", lat.to_string()),
                ("longitude", lon.to_string()),
                ("hourly", hourly),
                ("daily", daily),
                ("temperature_unit", "fahrenheit".to_string()),
                ("wind_speed_unit", "mph".to_string()),
                ("precipitation_unit", "inch".to_string()),
                ("timezone", "auto".to_string()),
                ("forecast_days", FORECAST_DAYS.to_string()),
            ])
            .timeout(self.forecast_timeout)
            .send()
            .await?;

        let response = Self::check_status(response).await?;
        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| WeatherError::Parse(e.to_string()))?;

        let forecast = ForecastResponse::from_json(&body);
        tracing::debug!(
            hourly_rows = forecast.hourly.time_len(),
            daily_rows = forecast.daily.time_len(),
            "Forecast received"
        );
        Ok(forecast)
    }

    #[instrument(skip(self), level = "info")]
    async fn search_locations(
        &self,
        query: &str,
        count: u32,
    ) -> Result<Vec<GeocodeResult>, WeatherError> {
        let response = self
            .client
            .get(&self.geocode_url)
            .query(&[
                ("name", query.to_string()),
                ("count", count.to_string()),
                ("language", "en".to_string()),
                ("format", "json".to_string()),
            ])
            .timeout(self.geocode_timeout)
            .send()
            .await?;

        let response = Self::check_status(response).await?;
        let body: GeocodeResponse = response
            .json()
            .await
            .map_err(|e| WeatherError::Parse(e.to_string()))?;

        tracing::debug!("Geocode returned {} results", body.results.len());
        Ok(body.results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Cell;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> OpenMeteoClient {
        let config = ApiConfig {
            forecast_url: format!("{}/v1/forecast", server.uri()),
            geocode_url: format!("{}/v1/search", server.uri()),
            ..ApiConfig::default()
        };
        OpenMeteoClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_forecast() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .and(query_param("latitude", "52.5"))
            .and(query_param("longitude", "13.4"))
            .and(query_param("temperature_unit", "fahrenheit"))
            .and(query_param("timezone", "auto"))
            .and(query_param("forecast_days", "7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "timezone": "Europe/Berlin",
                "hourly": {
                    "time": ["2026-10-14T00:00", "2026-10-14T01:00"],
                    "temperature_2m": [51.2, 50.9],
                    "weather_code": [3, 61]
                },
                "daily": {
                    "time": ["2026-10-14"],
                    "temperature_2m_max": [58.0]
                }
            })))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let forecast = client.fetch_forecast(52.5, 13.4).await.unwrap();

        assert_eq!(forecast.hourly.time_len(), 2);
        assert_eq!(forecast.hourly.cell("weather_code", 1), Some(&Cell::Number(61.0)));
        assert_eq!(forecast.daily.time_len(), 1);
        assert_eq!(forecast.timezone.as_deref(), Some("Europe/Berlin"));
    }

    #[tokio::test]
    async fn test_fetch_forecast_requests_every_hourly_field() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .and(query_param("hourly", request_keys(&HOURLY_FIELDS).as_str()))
            .and(query_param("daily", request_keys(&DAILY_FIELDS).as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let forecast = client.fetch_forecast(0.0, 0.0).await.unwrap();
        assert!(forecast.hourly.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_forecast_server_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(400).set_body_string("Latitude must be in range"))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let err = client.fetch_forecast(123.0, 0.0).await.unwrap_err();

        match err {
            WeatherError::Status { status, message } => {
                assert_eq!(status, 400);
                assert!(message.contains("Latitude"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_forecast_invalid_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let err = client.fetch_forecast(1.0, 1.0).await.unwrap_err();
        assert!(matches!(err, WeatherError::Parse(_)));
    }

    #[tokio::test]
    async fn test_search_locations() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .and(query_param("name", "Berlin"))
            .and(query_param("count", "5"))
            .and(query_param("language", "en"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [
                    {"name": "Berlin", "admin1": "Land Berlin", "country": "Germany",
                     "latitude": 52.52, "longitude": 13.41},
                    {"name": "Berlin", "admin1": "New Hampshire", "country": "United States",
                     "latitude": 44.47, "longitude": -71.19}
                ]
            })))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let results = client.search_locations("Berlin", 5).await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].display_name(), "Berlin, Land Berlin, Germany");
        assert_eq!(results[1].location_label(), "Berlin, New Hampshire");
    }

    #[tokio::test]
    async fn test_search_locations_without_results_key() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"generationtime_ms": 0.3})),
            )
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let results = client.search_locations("Xq", 5).await.unwrap();
        assert!(results.is_empty());
    }
}
