//! Search, save and refresh against a mock Open-Meteo server, persisting to disk.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::json;
use skydeck_app::{AppController, ControllerOptions, JsonFileBackend, SettingsStore};
use skydeck_core::ApiConfig;
use skydeck_weather::OpenMeteoClient;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .unwrap()
}

fn forecast_body() -> serde_json::Value {
    let hours = 72;
    let times: Vec<String> = (0..hours)
        .map(|h| format!("2026-10-{:02}T{:02}:00", 14 + h / 24, h % 24))
        .collect();
    let rain: Vec<serde_json::Value> = (0..hours)
        .map(|h| if h % 2 == 0 { json!(0.1) } else { json!(null) })
        .collect();
    json!({
        "timezone": "Europe/Berlin",
        "hourly": {
            "time": times,
            "temperature_2m": (0..hours).map(|h| 60.0 + h as f64 / 10.0).collect::<Vec<_>>(),
            "apparent_temperature": (0..hours).map(|_| 58.0).collect::<Vec<_>>(),
            "rain": rain,
            "weather_code": (0..hours).map(|_| 61).collect::<Vec<_>>()
        },
        "daily": {
            "time": ["2026-10-14", "2026-10-15", "2026-10-16"],
            "temperature_2m_max": [64.0, 66.0, 59.0],
            "temperature_2m_min": [48.0, 50.0, 47.0],
            "sunrise": ["2026-10-14T07:31", "2026-10-15T07:33", "2026-10-16T07:35"]
        }
    })
}

async fn mount_mocks(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("name", "Berlin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {"name": "Berlin", "admin1": "Land Berlin", "country": "Germany",
                 "latitude": 52.52, "longitude": 13.41}
            ]
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("latitude", "52.52"))
        .and(query_param("longitude", "13.41"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .mount(server)
        .await;
}

fn pump_until(ctrl: &mut AppController, done: impl Fn(&AppController) -> bool) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while !done(ctrl) && Instant::now() < deadline {
        ctrl.wait_for_message(Duration::from_millis(50));
    }
    assert!(done(ctrl), "condition not reached in time");
}

#[test]
fn search_add_and_refresh_round_trip() {
    let rt = runtime();
    let server = rt.block_on(MockServer::start());
    rt.block_on(mount_mocks(&server));

    let config = ApiConfig {
        forecast_url: format!("{}/v1/forecast", server.uri()),
        geocode_url: format!("{}/v1/search", server.uri()),
        ..ApiConfig::default()
    };
    let dir = tempfile::tempdir().unwrap();
    let settings_path = dir.path().join("skydeck").join("settings.json");

    let store = SettingsStore::open(Box::new(JsonFileBackend::new(&settings_path)));
    let mut ctrl = AppController::new(
        Arc::new(OpenMeteoClient::new(&config).unwrap()),
        rt.handle().clone(),
        store,
        ControllerOptions::from(&config),
    );

    ctrl.search_city("Berlin");
    pump_until(&mut ctrl, |c| c.geocode_model().row_count() == 1);
    ctrl.add_geocoded_location(0);
    pump_until(&mut ctrl, |c| !c.loading());

    assert!(ctrl.error().is_empty(), "unexpected error: {}", ctrl.error());
    assert_eq!(ctrl.hourly_model().row_count(), 48);
    assert_eq!(ctrl.daily_model().row_count(), 3);
    assert_eq!(ctrl.current_conditions().snapshot().temperature, 60.0);
    assert_eq!(ctrl.current_conditions().snapshot().description, "Slight rain");
    assert_eq!(ctrl.hourly_model().series_data("rain").count(), 24);
    assert_eq!(
        ctrl.daily_model().data(0, "sunrise").map(|c| c.to_string()),
        Some("2026-10-14T07:31".to_string())
    );

    // A fresh store sees what the controller saved
    let reopened = SettingsStore::open(Box::new(JsonFileBackend::new(&settings_path)));
    assert_eq!(reopened.locations().len(), 1);
    assert_eq!(reopened.locations()[0].name, "Berlin, Land Berlin");
    assert_eq!(reopened.active_location_index(), 0);
}

#[test]
fn server_error_surfaces_as_message() {
    let rt = runtime();
    let server = rt.block_on(MockServer::start());
    rt.block_on(
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(
                ResponseTemplate::new(400).set_body_string("Parameter 'latitude' is invalid"),
            )
            .mount(&server),
    );

    let config = ApiConfig {
        forecast_url: format!("{}/v1/forecast", server.uri()),
        geocode_url: format!("{}/v1/search", server.uri()),
        ..ApiConfig::default()
    };
    let dir = tempfile::tempdir().unwrap();
    let store = SettingsStore::open(Box::new(JsonFileBackend::new(
        dir.path().join("settings.json"),
    )));
    let mut ctrl = AppController::new(
        Arc::new(OpenMeteoClient::new(&config).unwrap()),
        rt.handle().clone(),
        store,
        ControllerOptions::from(&config),
    );

    ctrl.add_manual_location("Nowhere", 0.0, 0.0);
    pump_until(&mut ctrl, |c| !c.loading());

    assert!(ctrl.error().contains("400"));
    assert!(ctrl.last_update().is_empty());
    assert_eq!(ctrl.hourly_model().row_count(), 0);
}
