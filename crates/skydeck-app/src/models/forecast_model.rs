//! Hourly and daily forecast tables.
//!
//! The provider returns one array per field; the models pivot that into one
//! row per time step so the rendering layer can address `(row, role)`.

use std::sync::mpsc::Receiver;

use skydeck_weather::catalog::position;
use skydeck_weather::{Cell, Columns, FieldDescriptor, DAILY_FIELDS, HOURLY_FIELDS, TIME_KEY};

use super::{row_index, ModelEvent};
use crate::notify::Notifier;

/// Hours kept in the hourly table (two days)
pub const HOURLY_ROW_LIMIT: usize = 48;

/// One time step: timestamp plus one cell per catalog field, in catalog order
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRow {
    pub time: Option<Cell>,
    pub cells: Vec<Option<Cell>>,
}

/// A numeric chart sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesPoint {
    pub x: usize,
    pub y: f64,
}

/// Pivot columnar data into the first `row_count` rows.
///
/// Fields missing from `columns`, or shorter than `row_count`, fill with `None`.
pub fn pivot(
    columns: &Columns,
    row_count: usize,
    catalog: &[FieldDescriptor],
) -> Vec<ForecastRow> {
    let times = columns.get(TIME_KEY);
    let fields: Vec<&[Option<Cell>]> = catalog
        .iter()
        .map(|f| columns.get(f.provider_key))
        .collect();

    (0..row_count)
        .map(|i| ForecastRow {
            time: times.get(i).cloned().flatten(),
            cells: fields
                .iter()
                .map(|values| values.get(i).cloned().flatten())
                .collect(),
        })
        .collect()
}

#[derive(Debug)]
pub struct ForecastModel {
    catalog: &'static [FieldDescriptor],
    time_role: &'static str,
    row_limit: Option<usize>,
    rows: Vec<ForecastRow>,
    revision: u64,
    notifier: Notifier<ModelEvent>,
}

impl ForecastModel {
    /// Next 48 hours of the hourly catalog
    pub fn hourly() -> Self {
        Self::new(&HOURLY_FIELDS, "time", Some(HOURLY_ROW_LIMIT))
    }

    /// Daily summaries, one row per supplied day
    pub fn daily() -> Self {
        Self::new(&DAILY_FIELDS, "date", None)
    }

    fn new(
        catalog: &'static [FieldDescriptor],
        time_role: &'static str,
        row_limit: Option<usize>,
    ) -> Self {
        Self {
            catalog,
            time_role,
            row_limit,
            rows: Vec::new(),
            revision: 0,
            notifier: Notifier::new(),
        }
    }

    /// Replace every row from a fresh forecast section
    pub fn update(&mut self, columns: &Columns) {
        let available = columns.time_len();
        let row_count = self
            .row_limit
            .map_or(available, |limit| available.min(limit));

        self.rows = pivot(columns, row_count, self.catalog);
        self.revision += 1;
        tracing::debug!(
            rows = self.rows.len(),
            revision = self.revision,
            "Forecast model updated"
        );
        self.notifier.emit(ModelEvent::Reset);
    }

    pub fn row_count(&self) -> i32 {
        self.rows.len() as i32
    }

    pub fn rows(&self) -> &[ForecastRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell at `row` for `role`: the timestamp role, a role name or a provider key
    pub fn data(&self, row: i32, role: &str) -> Option<Cell> {
        let row = &self.rows[row_index(row, self.rows.len())?];
        if role == self.time_role || role == TIME_KEY {
            return row.time.clone();
        }
        let column = position(self.catalog, role)?;
        row.cells.get(column).cloned().flatten()
    }

    /// Numeric value at `row` for `role`
    pub fn value(&self, row: i32, role: &str) -> Option<f64> {
        self.data(row, role).as_ref().and_then(Cell::as_f64)
    }

    /// Chart points for a field, skipping rows with no numeric value.
    ///
    /// Unknown names yield nothing.
    pub fn series_data(&self, name: &str) -> impl Iterator<Item = SeriesPoint> + '_ {
        let column = position(self.catalog, name);
        self.rows
            .iter()
            .enumerate()
            .filter_map(move |(x, row)| {
                let y = row.cells.get(column?)?.as_ref()?.as_f64()?;
                Some(SeriesPoint { x, y })
            })
    }

    /// Timestamp label per row; missing timestamps read as ""
    pub fn time_labels(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|row| row.time.as_ref().map(Cell::to_string).unwrap_or_default())
            .collect()
    }

    /// Role names by role id: the timestamp role first, then the catalog
    pub fn role_names(&self) -> Vec<&'static str> {
        std::iter::once(self.time_role)
            .chain(self.catalog.iter().map(|f| f.role_name))
            .collect()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn subscribe(&mut self) -> Receiver<ModelEvent> {
        self.notifier.subscribe()
    }
}
