use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::ConfigError;

const APP_DIR_NAME: &str = "skydeck";
const CONFIG_FILE_NAME: &str = "config.toml";
const SETTINGS_FILE_NAME: &str = "settings.json";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// All errors joined with "; "
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding config.toml and settings.json
    pub config_dir: PathBuf,

    /// Open-Meteo endpoints and request limits
    #[serde(default)]
    pub api: ApiConfig,

    /// UI loop behaviour
    #[serde(default)]
    pub ui: UiConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Forecast endpoint
    pub forecast_url: String,

    /// Geocoding (city search) endpoint
    pub geocode_url: String,

    /// Transport timeout for forecast requests
    #[serde(default = "default_forecast_timeout")]
    pub forecast_timeout_secs: u64,

    /// Transport timeout for geocode requests
    #[serde(default = "default_geocode_timeout")]
    pub geocode_timeout_secs: u64,

    /// Maximum number of search results requested per query
    #[serde(default = "default_geocode_result_count")]
    pub geocode_result_count: u32,
}

fn default_forecast_timeout() -> u64 {
    15
}

fn default_geocode_timeout() -> u64 {
    10
}

fn default_geocode_result_count() -> u32 {
    5
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            forecast_url: "https://api.open-meteo.com/v1/forecast".to_string(),
            geocode_url: "https://geocoding-api.open-meteo.com/v1/search".to_string(),
            forecast_timeout_secs: default_forecast_timeout(),
            geocode_timeout_secs: default_geocode_timeout(),
            geocode_result_count: default_geocode_result_count(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// How long the UI loop waits for a service completion before checking timers
    pub poll_interval_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 250,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive, overridden by `RUST_LOG`
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: crate::DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_dir: default_config_dir(),
            api: ApiConfig::default(),
            ui: UiConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default location, creating it if missing
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&default_config_dir().join(CONFIG_FILE_NAME))
    }

    /// Load configuration from `path`, writing defaults there if it doesn't exist.
    ///
    /// A freshly created config keeps `path`'s directory as its `config_dir`.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let mut config = Self::default();
            if let Some(parent) = path.parent() {
                config.config_dir = parent.to_path_buf();
            }
            config.save_to(path)?;
            return Ok(config);
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(&self.api.forecast_url, "api.forecast_url", &mut result);
        self.validate_url(&self.api.geocode_url, "api.geocode_url", &mut result);

        if self.api.forecast_timeout_secs == 0 {
            result.add_error("api.forecast_timeout_secs", "Timeout must be greater than 0");
        }
        if self.api.geocode_timeout_secs == 0 {
            result.add_error("api.geocode_timeout_secs", "Timeout must be greater than 0");
        }

        if self.api.geocode_result_count == 0 {
            result.add_error(
                "api.geocode_result_count",
                "At least one search result must be requested",
            );
        } else if self.api.geocode_result_count > 100 {
            // Open-Meteo caps search results at 100
            result.add_warning(
                "api.geocode_result_count",
                "More than 100 results requested; the API returns at most 100",
            );
        }

        if self.ui.poll_interval_ms == 0 {
            result.add_warning("ui.poll_interval_ms", "UI loop will busy-poll (0 ms)");
        }

        result
    }

    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }
                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&self.config_dir.join(CONFIG_FILE_NAME))
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Path of the persisted user settings document
    pub fn settings_path(&self) -> PathBuf {
        self.config_dir.join(SETTINGS_FILE_NAME)
    }
}
