//! Configuration management.

mod settings;

pub use settings::{
    AdvisorySettings, BotSettings, BrokerSettings, DedupSettings, LoggingSettings,
    SessionSettings, Settings, SettingsError, SizingSettings,
};

use config::{Config, Environment, File};
use std::path::Path;

/// Load configuration from file and environment.
///
/// Environment variables prefixed `CADENCE__` override file values, e.g.
/// `CADENCE__BOT__INTERVAL_MINUTES=5`.
pub fn load_config(path: &Path) -> Result<Settings, SettingsError> {
    let config = Config::builder()
        .add_source(File::from(path).required(true))
        .add_source(
            Environment::with_prefix("CADENCE")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(config.try_deserialize()?)
}
