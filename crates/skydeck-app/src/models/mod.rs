//! Row-oriented view models consumed by the rendering layer.
//!
//! Rows are addressed with `i32` indices; anything outside `0..row_count()`
//! reads as `None`.

pub mod current_conditions;
pub mod forecast_model;
pub mod geocode_model;
pub mod location_model;

pub use current_conditions::{CurrentConditions, CurrentSnapshot};
pub use forecast_model::{pivot, ForecastModel, ForecastRow, SeriesPoint};
pub use geocode_model::GeocodeModel;
pub use location_model::LocationModel;

/// Change notifications published by the models
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelEvent {
    /// Every row was replaced
    Reset,
    /// A non-list model changed as a whole
    Changed,
}

pub(crate) fn row_index(row: i32, len: usize) -> Option<usize> {
    usize::try_from(row).ok().filter(|i| *i < len)
}
