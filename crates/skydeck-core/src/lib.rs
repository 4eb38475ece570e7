pub mod config;
pub mod error;

pub use config::{ApiConfig, Config, LoggingConfig, UiConfig, ValidationResult};
pub use error::{AppError, ConfigError, NetworkError, SettingsError};

use anyhow::Result;

/// Default log filter when neither `RUST_LOG` nor the config provides one
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Initialize logging for the application.
///
/// `RUST_LOG` takes precedence over `filter`; an unparsable filter falls back
/// to [`DEFAULT_LOG_FILTER`].
pub fn init(filter: &str) -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(filter))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))?;

    tracing::info!("Skydeck core initialized");
    Ok(())
}
