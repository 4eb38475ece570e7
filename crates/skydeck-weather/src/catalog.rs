//! Static catalogs of the forecast fields Skydeck displays.
//!
//! Each descriptor pairs the role name the rendering layer addresses with the
//! Open-Meteo parameter name, so role lookups, requests and pivoting all read
//! from one table.

/// Provider key of the timestamp column in both hourly and daily sections
pub const TIME_KEY: &str = "time";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub role_name: &'static str,
    pub provider_key: &'static str,
}

const fn field(role_name: &'static str, provider_key: &'static str) -> FieldDescriptor {
    FieldDescriptor {
        role_name,
        provider_key,
    }
}

/// Hourly fields, in row/chart order
pub const HOURLY_FIELDS: [FieldDescriptor; 12] = [
    field("temperature", "temperature_2m"),
    field("apparentTemperature", "apparent_temperature"),
    field("humidity", "relative_humidity_2m"),
    field("precipProbability", "precipitation_probability"),
    field("rain", "rain"),
    field("snowfall", "snowfall"),
    field("snowDepth", "snow_depth"),
    field("cloudCover", "cloud_cover"),
    field("windSpeed", "wind_speed_10m"),
    field("windGusts", "wind_gusts_10m"),
    field("windDirection", "wind_direction_10m"),
    field("weatherCode", "weather_code"),
];

/// Daily summary fields for the 7-day cards
pub const DAILY_FIELDS: [FieldDescriptor; 13] = [
    field("tempMax", "temperature_2m_max"),
    field("tempMin", "temperature_2m_min"),
    field("apparentMax", "apparent_temperature_max"),
    field("apparentMin", "apparent_temperature_min"),
    field("precipProbMax", "precipitation_probability_max"),
    field("precipSum", "precipitation_sum"),
    field("rainSum", "rain_sum"),
    field("snowfallSum", "snowfall_sum"),
    field("windMax", "wind_speed_10m_max"),
    field("gustMax", "wind_gusts_10m_max"),
    field("weatherCode", "weather_code"),
    field("sunrise", "sunrise"),
    field("sunset", "sunset"),
];

/// Position of a field in `catalog`, matched by role name or provider key.
pub fn position(catalog: &[FieldDescriptor], name: &str) -> Option<usize> {
    catalog
        .iter()
        .position(|f| f.role_name == name)
        .or_else(|| catalog.iter().position(|f| f.provider_key == name))
}

/// Comma-joined provider keys, as the forecast endpoint expects them
pub fn request_keys(catalog: &[FieldDescriptor]) -> String {
    catalog
        .iter()
        .map(|f| f.provider_key)
        .collect::<Vec<_>>()
        .join(",")
}
