//! Persistent user settings.
//!
//! The whole document is written back on every mutation. Element keys are
//! Open-Meteo parameter names.

use std::collections::BTreeMap;
use std::sync::mpsc::Receiver;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use skydeck_core::SettingsError;

use crate::notify::Notifier;
use crate::persistence::SettingsBackend;

/// Active index value meaning "no location selected"
pub const NO_SELECTION: i32 = -1;

pub const DEFAULT_REFRESH_INTERVAL_MINUTES: u32 = 30;

/// Chart elements and whether they start enabled
const DEFAULT_ELEMENTS: [(&str, bool); 10] = [
    ("temperature_2m", true),
    ("apparent_temperature", true),
    ("wind_speed_10m", true),
    ("wind_gusts_10m", true),
    ("relative_humidity_2m", true),
    ("cloud_cover", true),
    ("precipitation_probability", true),
    ("rain", false),
    ("snowfall", false),
    ("snow_depth", false),
];

pub fn default_enabled_elements() -> BTreeMap<String, bool> {
    DEFAULT_ELEMENTS
        .iter()
        .map(|(key, enabled)| (key.to_string(), *enabled))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

impl Location {
    pub fn new(name: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            name: name.into(),
            lat,
            lon,
        }
    }
}

/// The persisted settings document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsDocument {
    pub locations: Vec<Location>,
    pub active_location_index: i32,
    pub refresh_interval_minutes: u32,
    pub enabled_elements: BTreeMap<String, bool>,
}

impl Default for SettingsDocument {
    fn default() -> Self {
        Self {
            locations: Vec::new(),
            active_location_index: NO_SELECTION,
            refresh_interval_minutes: DEFAULT_REFRESH_INTERVAL_MINUTES,
            enabled_elements: default_enabled_elements(),
        }
    }
}

impl SettingsDocument {
    /// Parse a saved document over the defaults.
    ///
    /// Members are read one at a time: a missing or malformed member keeps
    /// its default without affecting the others, and malformed location
    /// entries are skipped individually. `enabled_elements` merges key-wise:
    /// saved values win for known keys, missing keys keep their default and
    /// unknown keys are dropped.
    pub fn from_saved(contents: &str) -> Result<Self, SettingsError> {
        let mut saved: Map<String, Value> = serde_json::from_str(contents)?;
        let mut doc = Self::default();

        if let Some(entries) = member::<Vec<Value>>(&mut saved, "locations") {
            doc.locations = entries
                .into_iter()
                .filter_map(|entry| parse_member("locations[]", entry))
                .collect();
        }
        if let Some(index) = member::<i32>(&mut saved, "active_location_index") {
            doc.active_location_index = index;
        }
        if let Some(minutes) =
            member::<u32>(&mut saved, "refresh_interval_minutes").filter(|m| *m > 0)
        {
            doc.refresh_interval_minutes = minutes;
        }
        if let Some(elements) = member::<Map<String, Value>>(&mut saved, "enabled_elements") {
            for (key, enabled) in elements {
                let Some(slot) = doc.enabled_elements.get_mut(&key) else {
                    continue;
                };
                if let Some(enabled) = parse_member::<bool>("enabled_elements", enabled) {
                    *slot = enabled;
                }
            }
        }

        doc.clamp_active_index();
        Ok(doc)
    }

    fn clamp_active_index(&mut self) {
        let len = self.locations.len() as i32;
        if self.active_location_index >= len {
            self.active_location_index = len - 1;
        }
        if self.active_location_index < NO_SELECTION {
            self.active_location_index = NO_SELECTION;
        }
    }

    fn active_location(&self) -> Option<&Location> {
        usize::try_from(self.active_location_index)
            .ok()
            .and_then(|i| self.locations.get(i))
    }
}

fn member<T: DeserializeOwned>(saved: &mut Map<String, Value>, key: &str) -> Option<T> {
    parse_member(key, saved.remove(key)?)
}

fn parse_member<T: DeserializeOwned>(key: &str, value: Value) -> Option<T> {
    match serde_json::from_value(value) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::warn!("Ignoring malformed settings member {}: {}", key, e);
            None
        }
    }
}

/// Logical groups of settings, one notification each
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsEvent {
    LocationsChanged,
    ActiveLocationIndexChanged,
    RefreshIntervalChanged,
    EnabledElementsChanged,
}

pub struct SettingsStore {
    doc: SettingsDocument,
    backend: Box<dyn SettingsBackend>,
    notifier: Notifier<SettingsEvent>,
}

impl std::fmt::Debug for SettingsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsStore")
            .field("doc", &self.doc)
            .finish_non_exhaustive()
    }
}

impl SettingsStore {
    /// Create a store and load whatever `backend` holds.
    pub fn open(backend: Box<dyn SettingsBackend>) -> Self {
        let mut store = Self {
            doc: SettingsDocument::default(),
            backend,
            notifier: Notifier::new(),
        };
        store.doc = store.read_document();
        store
    }

    /// Reload from the backend, falling back to defaults, and notify every group.
    pub fn load(&mut self) {
        self.doc = self.read_document();
        for event in [
            SettingsEvent::LocationsChanged,
            SettingsEvent::ActiveLocationIndexChanged,
            SettingsEvent::RefreshIntervalChanged,
            SettingsEvent::EnabledElementsChanged,
        ] {
            self.notifier.emit(event);
        }
    }

    fn read_document(&self) -> SettingsDocument {
        let loaded = self
            .backend
            .load()
            .and_then(|contents| {
                contents
                    .as_deref()
                    .map(SettingsDocument::from_saved)
                    .transpose()
            });

        match loaded {
            Ok(Some(doc)) => {
                tracing::info!("Loaded settings with {} locations", doc.locations.len());
                doc
            }
            Ok(None) => {
                tracing::info!("No saved settings, using defaults");
                SettingsDocument::default()
            }
            Err(e) => {
                tracing::warn!("Failed to load settings, using defaults: {}", e);
                SettingsDocument::default()
            }
        }
    }

    fn persist(&self) {
        let result = serde_json::to_string_pretty(&self.doc)
            .map_err(SettingsError::from)
            .and_then(|contents| self.backend.save(&contents));
        if let Err(e) = result {
            tracing::warn!("Failed to save settings: {}", e);
        }
    }

    pub fn subscribe(&mut self) -> Receiver<SettingsEvent> {
        self.notifier.subscribe()
    }

    pub fn document(&self) -> &SettingsDocument {
        &self.doc
    }

    // --- Locations ---

    pub fn locations(&self) -> &[Location] {
        &self.doc.locations
    }

    pub fn add_location(&mut self, name: impl Into<String>, lat: f64, lon: f64) {
        self.doc.locations.push(Location::new(name, lat, lon));
        // Auto-select the first location so data shows immediately
        let auto_selected = self.doc.active_location_index < 0;
        if auto_selected {
            self.doc.active_location_index = 0;
        }
        self.persist();

        if auto_selected {
            self.notifier.emit(SettingsEvent::ActiveLocationIndexChanged);
        }
        self.notifier.emit(SettingsEvent::LocationsChanged);
    }

    /// Remove the location at `index`; out-of-range indices are ignored.
    ///
    /// The active index follows the location it pointed at: removing an
    /// earlier entry shifts it down by one. Removing the active entry keeps
    /// the index (now the next entry), clamped to the end of the list.
    pub fn remove_location(&mut self, index: i32) {
        let Some(position) = usize::try_from(index)
            .ok()
            .filter(|i| *i < self.doc.locations.len())
        else {
            return;
        };

        self.doc.locations.remove(position);

        let previous = self.doc.active_location_index;
        if index < previous {
            self.doc.active_location_index -= 1;
        }
        self.doc.clamp_active_index();
        self.persist();

        if self.doc.active_location_index != previous || index == previous {
            self.notifier.emit(SettingsEvent::ActiveLocationIndexChanged);
        }
        self.notifier.emit(SettingsEvent::LocationsChanged);
    }

    // --- Active location ---

    pub fn active_location_index(&self) -> i32 {
        self.doc.active_location_index
    }

    /// Currently selected location, if any
    pub fn active_location(&self) -> Option<&Location> {
        self.doc.active_location()
    }

    /// Select a location; unchanged or out-of-range values are ignored.
    /// [`NO_SELECTION`] clears the selection.
    pub fn set_active_location_index(&mut self, index: i32) {
        let valid = index == NO_SELECTION || (0..self.doc.locations.len() as i32).contains(&index);
        if !valid || index == self.doc.active_location_index {
            return;
        }
        self.doc.active_location_index = index;
        self.persist();
        self.notifier.emit(SettingsEvent::ActiveLocationIndexChanged);
    }

    // --- Refresh interval ---

    pub fn refresh_interval_minutes(&self) -> u32 {
        self.doc.refresh_interval_minutes
    }

    /// Change the auto-refresh period; zero and unchanged values are ignored.
    pub fn set_refresh_interval_minutes(&mut self, minutes: u32) {
        if minutes == 0 || minutes == self.doc.refresh_interval_minutes {
            return;
        }
        self.doc.refresh_interval_minutes = minutes;
        self.persist();
        self.notifier.emit(SettingsEvent::RefreshIntervalChanged);
    }

    // --- Enabled elements ---

    pub fn enabled_elements(&self) -> &BTreeMap<String, bool> {
        &self.doc.enabled_elements
    }

    pub fn is_element_enabled(&self, key: &str) -> bool {
        self.doc.enabled_elements.get(key).copied().unwrap_or(false)
    }

    /// Toggle a chart element; unknown keys are ignored.
    pub fn set_element_enabled(&mut self, key: &str, enabled: bool) {
        match self.doc.enabled_elements.get_mut(key) {
            Some(slot) if *slot != enabled => *slot = enabled,
            _ => return,
        }
        self.persist();
        self.notifier.emit(SettingsEvent::EnabledElementsChanged);
    }
}
