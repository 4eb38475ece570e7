use std::sync::mpsc::Receiver;

use skydeck_weather::{Cell, GeocodeResult};

use super::{row_index, ModelEvent};
use crate::notify::Notifier;

const ROLE_NAMES: [&str; 6] = ["name", "admin", "country", "lat", "lon", "display"];

/// City search results
#[derive(Debug, Default)]
pub struct GeocodeModel {
    results: Vec<GeocodeResult>,
    notifier: Notifier<ModelEvent>,
}

impl GeocodeModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, results: Vec<GeocodeResult>) {
        self.results = results;
        self.notifier.emit(ModelEvent::Reset);
    }

    pub fn clear(&mut self) {
        if self.results.is_empty() {
            return;
        }
        self.results.clear();
        self.notifier.emit(ModelEvent::Reset);
    }

    pub fn row_count(&self) -> i32 {
        self.results.len() as i32
    }

    pub fn get(&self, row: i32) -> Option<&GeocodeResult> {
        self.results.get(row_index(row, self.results.len())?)
    }

    pub fn data(&self, row: i32, role: &str) -> Option<Cell> {
        let result = self.get(row)?;
        let text = |s: &Option<String>| Cell::from(s.as_deref().unwrap_or_default());
        match role {
            "name" => Some(Cell::from(result.name.as_str())),
            "admin" => Some(text(&result.admin1)),
            "country" => Some(text(&result.country)),
            "lat" => Some(Cell::Number(result.latitude)),
            "lon" => Some(Cell::Number(result.longitude)),
            "display" => Some(Cell::Text(result.display_name())),
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

#[cfg(test)]
mod tests {
    use super::*;

    fn portland() -> GeocodeResult {
        GeocodeResult {
            name: "Portland".into(),
            admin1: Some("Oregon".into()),
            country: None,
            latitude: 45.52,
            longitude: -122.68,
        }
    }

    #[test]
    fn roles_read_from_results() {
        let mut model = GeocodeModel::new();
        model.update(vec![portland()]);

        assert_eq!(model.row_count(), 1);
        assert_eq!(model.data(0, "admin"), Some(Cell::from("Oregon")));
        assert_eq!(model.data(0, "country"), Some(Cell::from("")));
        assert_eq!(model.data(0, "display"), Some(Cell::from("Portland, Oregon")));
        assert_eq!(model.data(0, "lat"), Some(Cell::Number(45.52)));
        assert_eq!(model.get(1), None);
        assert_eq!(model.get(-1), None);
    }

    #[test]
    fn clear_empties_and_notifies_once() {
        let mut model = GeocodeModel::new();
        model.update(vec![portland()]);
        let rx = model.subscribe();

        model.clear();
        model.clear();

        assert_eq!(model.row_count(), 0);
        assert_eq!(rx.try_iter().count(), 1);
    }
}
