use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use skydeck_app::{
    AppController, ControllerEvent, ControllerOptions, JsonFileBackend, SettingsStore,
};
use skydeck_core::Config;
use skydeck_weather::{OpenMeteoClient, WeatherApi};
use tokio_util::sync::CancellationToken;

/// How long a startup city search may take before giving up
const SEED_SEARCH_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Parser)]
#[command(name = "skydeck")]
#[command(about = "Headless weather dashboard", long_about = None)]
#[command(version)]
struct Args {
    /// Exit after the first forecast attempt finishes
    #[arg(long)]
    once: bool,

    /// City searched and saved when no locations exist yet
    seed_city: Vec<String>,
}

impl Args {
    fn seed_city(&self) -> Option<String> {
        (!self.seed_city.is_empty()).then(|| self.seed_city.join(" "))
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load().context("Failed to load configuration")?;
    skydeck_core::init(&config.logging.filter)?;

    let validation = config.validate();
    for warning in &validation.warnings {
        tracing::warn!("Config warning: {}", warning);
    }
    if !validation.is_valid() {
        anyhow::bail!("Invalid configuration: {}", validation.error_summary());
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("skydeck-tokio")
        .build()
        .context("Failed to create tokio runtime")?;

    let api: Arc<dyn WeatherApi> = Arc::new(OpenMeteoClient::new(&config.api)?);
    let settings_path = config.settings_path();
    tracing::info!("Settings file: {}", settings_path.display());
    let settings = SettingsStore::open(Box::new(JsonFileBackend::new(settings_path)));

    let mut controller = AppController::new(
        api,
        runtime.handle().clone(),
        settings,
        ControllerOptions::from(&config.api),
    );
    let events = controller.subscribe();

    let shutdown = CancellationToken::new();
    let token = shutdown.clone();
    runtime.spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown requested");
            token.cancel();
        }
    });

    if let Some(city) = args.seed_city() {
        if controller.settings().locations().is_empty() {
            seed_location(&mut controller, &city);
        }
    }

    if controller.settings().active_location().is_none() {
        tracing::warn!(
            "No saved locations. Pass a city name to add one, e.g. `skydeck Berlin`"
        );
        return Ok(());
    }

    tracing::info!("Skydeck started");
    let poll_interval = Duration::from_millis(config.ui.poll_interval_ms);

    while !shutdown.is_cancelled() {
        controller.wait_for_message(poll_interval);
        controller.tick(Instant::now());

        if report_events(&controller, &events) && args.once {
            break;
        }
    }

    tracing::info!("Skydeck stopped");
    runtime.shutdown_timeout(Duration::from_secs(1));
    Ok(())
}

/// Search for `city` and save the first hit
fn seed_location(controller: &mut AppController, city: &str) {
    tracing::info!("Searching for {:?}", city);
    controller.search_city(city);

    let deadline = Instant::now() + SEED_SEARCH_TIMEOUT;
    while controller.geocode_model().row_count() == 0
        && controller.error().is_empty()
        && Instant::now() < deadline
    {
        controller.wait_for_message(Duration::from_millis(100));
    }

    match controller.geocode_model().get(0) {
        Some(hit) => {
            tracing::info!("Adding {}", hit.display_name());
            controller.add_geocoded_location(0);
        }
        None => tracing::warn!("No city found for {:?}", city),
    }
}

/// Log controller changes. Returns true when a fetch finished, either way.
fn report_events(controller: &AppController, events: &Receiver<ControllerEvent>) -> bool {
    let mut updated = false;
    for event in events.try_iter() {
        match event {
            ControllerEvent::LoadingChanged => {
                tracing::debug!("Loading: {}", controller.loading());
            }
            ControllerEvent::ErrorChanged => {
                if !controller.error().is_empty() {
                    tracing::error!("{} ({})", controller.error(), controller.error_hint());
                    updated = true;
                }
            }
            ControllerEvent::LastUpdateChanged => {
                log_snapshot(controller);
                updated = true;
            }
        }
    }
    updated
}

fn log_snapshot(controller: &AppController) {
    let name = controller
        .settings()
        .active_location()
        .map(|l| l.name.as_str())
        .unwrap_or_default();
    let now = controller.current_conditions().snapshot();
    tracing::info!(
        "{} at {}: {:.0}°F (feels {:.0}°F), {}, wind {:.0} mph gusting {:.0}, humidity {}%",
        name,
        controller.last_update(),
        now.temperature,
        now.feels_like,
        now.description,
        now.wind_speed,
        now.wind_gusts,
        now.humidity
    );

    let daily = controller.daily_model();
    for row in 0..daily.row_count() {
        let date = daily.data(row, "date").map(|c| c.to_string()).unwrap_or_default();
        let high = daily.value(row, "tempMax").unwrap_or_default();
        let low = daily.value(row, "tempMin").unwrap_or_default();
        let code = daily.value(row, "weatherCode").unwrap_or_default() as i32;
        tracing::info!(
            "  {}: {:.0}/{:.0}°F {}",
            date,
            high,
            low,
            skydeck_weather::describe(code)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn city_words_join_into_one_seed() {
        let args = Args::try_parse_from(["skydeck", "New", "York", "--once"]).unwrap();
        assert!(args.once);
        assert_eq!(args.seed_city().as_deref(), Some("New York"));
    }

    #[test]
    fn no_city_means_no_seed() {
        let args = Args::try_parse_from(["skydeck"]).unwrap();
        assert!(!args.once);
        assert_eq!(args.seed_city(), None);
    }

    #[test]
    fn unknown_flag_is_rejected() {
        assert!(Args::try_parse_from(["skydeck", "--forever"]).is_err());
    }
}
