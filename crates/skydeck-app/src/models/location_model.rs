use std::sync::mpsc::Receiver;

use skydeck_weather::Cell;

use super::{row_index, ModelEvent};
use crate::notify::Notifier;
use crate::settings::Location;

const ROLE_NAMES: [&str; 3] = ["name", "lat", "lon"];

/// Saved locations, mirrored from the settings store
#[derive(Debug, Default)]
pub struct LocationModel {
    locations: Vec<Location>,
    notifier: Notifier<ModelEvent>,
}

impl LocationModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, locations: &[Location]) {
        self.locations = locations.to_vec();
        self.notifier.emit(ModelEvent::Reset);
    }

    pub fn row_count(&self) -> i32 {
        self.locations.len() as i32
    }

    pub fn get(&self, row: i32) -> Option<&Location> {
        self.locations.get(row_index(row, self.locations.len())?)
    }

    pub fn data(&self, row: i32, role: &str) -> Option<Cell> {
        let location = self.get(row)?;
        match role {
            "name" => Some(Cell::from(location.name.as_str())),
            "lat" => Some(Cell::Number(location.lat)),
            "lon" => Some(Cell::Number(location.lon)),
            _ => None,
        }
    }

    pub fn role_names(&self) -> Vec<&'static str> {
        ROLE_NAMES.to_vec()
    }

    pub fn subscribe(&mut self) -> Receiver<ModelEvent> {
        self.notifier.subscribe()
    }
}
