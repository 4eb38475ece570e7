//! Application controller: owns the settings store and every view model,
//! issues fetches and applies their completions on the UI loop.
//!
//! Nothing here blocks on the network. Fetches are spawned on the tokio
//! runtime and report back as [`ServiceMessage`]s, which the loop delivers
//! through [`AppController::poll_channel`] or
//! [`AppController::wait_for_message`].

use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Local;
use skydeck_core::{ApiConfig, AppError};
use skydeck_weather::{ForecastResponse, GeocodeResult, WeatherApi, WeatherError};
use tokio::runtime::Handle;

use crate::models::{CurrentConditions, ForecastModel, GeocodeModel, LocationModel};
use crate::notify::Notifier;
use crate::services::{request_forecast, request_geocode, ServiceMessage};
use crate::settings::{SettingsEvent, SettingsStore};
use crate::timer::RefreshTimer;

/// Shortest query sent to the geocoder
const MIN_QUERY_CHARS: usize = 2;

const LAST_UPDATE_FORMAT: &str = "%I:%M %p";

#[derive(Debug, Clone)]
pub struct ControllerOptions {
    /// Maximum number of search results requested per query
    pub geocode_result_count: u32,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self::from(&ApiConfig::default())
    }
}

impl From<&ApiConfig> for ControllerOptions {
    fn from(api: &ApiConfig) -> Self {
        Self {
            geocode_result_count: api.geocode_result_count,
        }
    }
}

/// Controller state changes, one per observable property
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerEvent {
    LoadingChanged,
    ErrorChanged,
    LastUpdateChanged,
}

pub struct AppController {
    api: Arc<dyn WeatherApi>,
    runtime: Handle,
    options: ControllerOptions,

    settings: SettingsStore,
    settings_rx: Receiver<SettingsEvent>,

    hourly: ForecastModel,
    daily: ForecastModel,
    current: CurrentConditions,
    locations: LocationModel,
    geocode: GeocodeModel,

    tx: Sender<ServiceMessage>,
    rx: Receiver<ServiceMessage>,
    // Only the newest request of each kind is applied
    forecast_generation: u64,
    geocode_generation: u64,

    loading: bool,
    error: String,
    error_hint: &'static str,
    last_update: String,

    timer: RefreshTimer,
    notifier: Notifier<ControllerEvent>,
}

impl std::fmt::Debug for AppController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppController")
            .field("loading", &self.loading)
            .field("error", &self.error)
            .field("last_update", &self.last_update)
            .field("forecast_generation", &self.forecast_generation)
            .field("geocode_generation", &self.geocode_generation)
            .finish_non_exhaustive()
    }
}

impl AppController {
    /// Build the controller. If a location is already active, a refresh is
    /// issued right away.
    pub fn new(
        api: Arc<dyn WeatherApi>,
        runtime: Handle,
        mut settings: SettingsStore,
        options: ControllerOptions,
    ) -> Self {
        let settings_rx = settings.subscribe();
        let (tx, rx) = channel();
        let timer = RefreshTimer::from_minutes(settings.refresh_interval_minutes(), Instant::now());

        let mut locations = LocationModel::new();
        locations.update(settings.locations());

        let mut controller = Self {
            api,
            runtime,
            options,
            settings,
            settings_rx,
            hourly: ForecastModel::hourly(),
            daily: ForecastModel::daily(),
            current: CurrentConditions::new(),
            locations,
            geocode: GeocodeModel::new(),
            tx,
            rx,
            forecast_generation: 0,
            geocode_generation: 0,
            loading: false,
            error: String::new(),
            error_hint: "",
            last_update: String::new(),
            timer,
            notifier: Notifier::new(),
        };

        if controller.settings.active_location().is_some() {
            controller.refresh();
        }
        controller
    }

    // --- Actions ---

    /// Fetch the forecast for the active location; no-op without one.
    pub fn refresh(&mut self) {
        let Some(location) = self.settings.active_location() else {
            tracing::debug!("Refresh skipped: no active location");
            return;
        };
        let (lat, lon) = (location.lat, location.lon);
        tracing::info!("Refreshing forecast for {} ({}, {})", location.name, lat, lon);

        self.set_loading(true);
        self.set_error(String::new(), "");

        self.forecast_generation += 1;
        request_forecast(
            &self.tx,
            &self.runtime,
            Arc::clone(&self.api),
            self.forecast_generation,
            lat,
            lon,
        );
    }

    /// Search for cities. Queries shorter than two characters clear the
    /// results instead and cancel interest in any search still in flight.
    pub fn search_city(&mut self, query: &str) {
        self.geocode_generation += 1;

        if query.chars().count() < MIN_QUERY_CHARS {
            self.geocode.clear();
            return;
        }

        request_geocode(
            &self.tx,
            &self.runtime,
            Arc::clone(&self.api),
            self.geocode_generation,
            query.to_string(),
            self.options.geocode_result_count,
        );
    }

    /// Save search result `index` as a location and fetch its forecast.
    pub fn add_geocoded_location(&mut self, index: i32) {
        let Some(result) = self.geocode.get(index).cloned() else {
            tracing::debug!("No geocode result at {}", index);
            return;
        };

        self.settings
            .add_location(result.location_label(), result.latitude, result.longitude);
        self.geocode.clear();
        self.geocode_generation += 1;
        self.refresh_after_settings_change();
    }

    /// Save typed coordinates. An empty name becomes "lat, lon".
    pub fn add_manual_location(&mut self, name: &str, lat: f64, lon: f64) {
        let name = if name.is_empty() {
            format!("{:.2}, {:.2}", lat, lon)
        } else {
            name.to_string()
        };

        self.settings.add_location(name, lat, lon);
        self.refresh_after_settings_change();
    }

    pub fn remove_location(&mut self, index: i32) {
        self.settings.remove_location(index);
        self.process_settings_events();
    }

    pub fn set_active_location(&mut self, index: i32) {
        self.settings.set_active_location_index(index);
        self.process_settings_events();
    }

    pub fn set_refresh_interval_minutes(&mut self, minutes: u32) {
        self.settings.set_refresh_interval_minutes(minutes);
        self.process_settings_events();
    }

    pub fn set_element_enabled(&mut self, key: &str, enabled: bool) {
        self.settings.set_element_enabled(key, enabled);
        self.process_settings_events();
    }

    // --- UI loop ---

    /// Apply every completion that has arrived. Returns how many were handled.
    pub fn poll_channel(&mut self) -> usize {
        self.process_settings_events();

        let mut handled = 0;
        while let Ok(message) = self.rx.try_recv() {
            self.handle_message(message);
            handled += 1;
        }
        handled
    }

    /// Block up to `timeout` for a completion, then apply it and anything
    /// queued behind it. Returns how many were handled.
    pub fn wait_for_message(&mut self, timeout: Duration) -> usize {
        self.process_settings_events();

        match self.rx.recv_timeout(timeout) {
            Ok(message) => {
                self.handle_message(message);
                1 + self.poll_channel()
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => 0,
        }
    }

    /// Fire the auto-refresh timer if it is due.
    pub fn tick(&mut self, now: Instant) {
        self.process_settings_events();
        if self.timer.poll(now) {
            tracing::debug!("Auto-refresh timer fired");
            self.refresh();
        }
    }

    fn handle_message(&mut self, message: ServiceMessage) {
        match message {
            ServiceMessage::ForecastDone { generation, result } => {
                if generation != self.forecast_generation {
                    tracing::debug!(
                        "Dropping stale forecast {} (current {})",
                        generation,
                        self.forecast_generation
                    );
                    return;
                }
                match result {
                    Ok(forecast) => self.apply_forecast(&forecast),
                    Err(e) => {
                        self.set_loading(false);
                        self.set_failure(e);
                    }
                }
            }
            ServiceMessage::GeocodeDone { generation, result } => {
                if generation != self.geocode_generation {
                    tracing::debug!(
                        "Dropping stale geocode {} (current {})",
                        generation,
                        self.geocode_generation
                    );
                    return;
                }
                match result {
                    Ok(results) => self.apply_geocode(results),
                    Err(e) => self.set_failure(e),
                }
            }
        }
    }

    fn apply_forecast(&mut self, forecast: &ForecastResponse) {
        self.hourly.update(&forecast.hourly);
        self.daily.update(&forecast.daily);
        self.current.update_from_hourly(&self.hourly);

        self.set_loading(false);
        self.last_update = Local::now().format(LAST_UPDATE_FORMAT).to_string();
        self.notifier.emit(ControllerEvent::LastUpdateChanged);
        tracing::info!(
            hourly_rows = self.hourly.row_count(),
            daily_rows = self.daily.row_count(),
            "Forecast applied"
        );
    }

    fn apply_geocode(&mut self, results: Vec<GeocodeResult>) {
        tracing::debug!("Showing {} search results", results.len());
        self.geocode.update(results);
    }

    /// React to settings notifications. Returns true if a refresh was issued.
    fn process_settings_events(&mut self) -> bool {
        let events: Vec<SettingsEvent> = self.settings_rx.try_iter().collect();
        let mut refreshed = false;

        for event in events {
            match event {
                SettingsEvent::LocationsChanged => {
                    self.locations.update(self.settings.locations());
                }
                SettingsEvent::ActiveLocationIndexChanged => {
                    if !refreshed {
                        self.refresh();
                        refreshed = true;
                    }
                }
                SettingsEvent::RefreshIntervalChanged => {
                    let minutes = self.settings.refresh_interval_minutes();
                    tracing::info!("Refresh interval now {} minutes", minutes);
                    self.timer
                        .restart(Duration::from_secs(u64::from(minutes) * 60), Instant::now());
                }
                SettingsEvent::EnabledElementsChanged => {
                    tracing::debug!("Enabled chart elements changed");
                }
            }
        }
        refreshed
    }

    fn refresh_after_settings_change(&mut self) {
        if !self.process_settings_events() {
            self.refresh();
        }
    }

    fn set_loading(&mut self, loading: bool) {
        if self.loading != loading {
            self.loading = loading;
            self.notifier.emit(ControllerEvent::LoadingChanged);
        }
    }

    fn set_error(&mut self, error: String, hint: &'static str) {
        self.error_hint = hint;
        if self.error != error {
            self.error = error;
            self.notifier.emit(ControllerEvent::ErrorChanged);
        }
    }

    fn set_failure(&mut self, e: WeatherError) {
        let message = e.to_string();
        let hint = AppError::from(e).user_message();
        self.set_error(message, hint);
    }

    // --- State ---

    pub fn loading(&self) -> bool {
        self.loading
    }

    /// Last failure message, empty when the last attempt succeeded
    pub fn error(&self) -> &str {
        &self.error
    }

    /// User-facing hint for the last failure, empty when there is none
    pub fn error_hint(&self) -> &str {
        self.error_hint
    }

    /// Local time of the last successful forecast, e.g. "03:45 PM"
    pub fn last_update(&self) -> &str {
        &self.last_update
    }

    pub fn subscribe(&mut self) -> Receiver<ControllerEvent> {
        self.notifier.subscribe()
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    /// Direct store access; resulting notifications are handled on the next
    /// poll or tick.
    pub fn settings_mut(&mut self) -> &mut SettingsStore {
        &mut self.settings
    }

    pub fn hourly_model(&self) -> &ForecastModel {
        &self.hourly
    }

    pub fn hourly_model_mut(&mut self) -> &mut ForecastModel {
        &mut self.hourly
    }

    pub fn daily_model(&self) -> &ForecastModel {
        &self.daily
    }

    pub fn daily_model_mut(&mut self) -> &mut ForecastModel {
        &mut self.daily
    }

    pub fn current_conditions(&self) -> &CurrentConditions {
        &self.current
    }

    pub fn location_model(&self) -> &LocationModel {
        &self.locations
    }

    pub fn geocode_model(&self) -> &GeocodeModel {
        &self.geocode
    }

    pub fn refresh_timer(&self) -> &RefreshTimer {
        &self.timer
    }
}
