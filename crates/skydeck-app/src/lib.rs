//! Skydeck application state: settings, view models and the controller that
//! ties them to the weather service.

pub mod controller;
pub mod models;
pub mod notify;
pub mod persistence;
pub mod services;
pub mod settings;
pub mod timer;

pub use controller::{AppController, ControllerEvent, ControllerOptions};
pub use models::{
    pivot, CurrentConditions, CurrentSnapshot, ForecastModel, ForecastRow, GeocodeModel,
    LocationModel, ModelEvent, SeriesPoint,
};
pub use notify::Notifier;
pub use persistence::{JsonFileBackend, MemoryBackend, SettingsBackend};
pub use services::ServiceMessage;
pub use settings::{
    default_enabled_elements, Location, SettingsDocument, SettingsEvent, SettingsStore,
    NO_SELECTION,
};
pub use timer::RefreshTimer;
