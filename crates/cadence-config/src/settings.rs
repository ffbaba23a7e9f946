//! Configuration structures.

use std::path::PathBuf;

use chrono::NaiveTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use cadence_core::types::NewsMode;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub bot: BotSettings,
    #[serde(default)]
    pub sizing: SizingSettings,
    #[serde(default)]
    pub broker: BrokerSettings,
    #[serde(default)]
    pub dedup: DedupSettings,
    #[serde(default)]
    pub advisory: AdvisorySettings,
    #[serde(default)]
    pub session: SessionSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Settings {
    /// Validate the configuration as a whole.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.bot.symbols.iter().all(|s| s.trim().is_empty()) {
            return Err(SettingsError::Invalid("at least one symbol required".into()));
        }
        if self.bot.fast_period == 0 {
            return Err(SettingsError::Invalid(
                "fast period must be greater than 0".into(),
            ));
        }
        if self.bot.fast_period >= self.bot.slow_period {
            return Err(SettingsError::Invalid(
                "fast period must be less than slow period".into(),
            ));
        }
        if self.bot.interval_minutes == 0 {
            return Err(SettingsError::Invalid(
                "cycle interval must be at least one minute".into(),
            ));
        }
        self.sizing.validate()?;
        self.session.parse()?;
        if self.advisory.enabled && self.advisory.model.trim().is_empty() {
            return Err(SettingsError::Invalid(
                "advisory model identifier required when advisory is enabled".into(),
            ));
        }
        Ok(())
    }

    /// Symbols, trimmed and uppercased.
    pub fn symbols(&self) -> Vec<String> {
        self.bot
            .symbols
            .iter()
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// Core bot settings: what to trade and how often.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotSettings {
    /// Symbols to trade
    pub symbols: Vec<String>,
    /// Fast moving average period
    pub fast_period: usize,
    /// Slow moving average period
    pub slow_period: usize,
    /// Minutes between cycles
    pub interval_minutes: u64,
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            symbols: vec!["SPY".to_string()],
            fast_period: 10,
            slow_period: 30,
            interval_minutes: 15,
        }
    }
}

/// Position sizing: fixed shares, target dollars, or both (dollars win).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SizingSettings {
    /// Fixed share count per buy
    pub shares: Option<Decimal>,
    /// Target dollar amount per buy; takes precedence over `shares`
    pub notional: Option<Decimal>,
}

impl SizingSettings {
    fn validate(&self) -> Result<(), SettingsError> {
        match (self.shares, self.notional) {
            (None, None) => Err(SettingsError::Invalid(
                "configure sizing.shares or sizing.notional".into(),
            )),
            (Some(shares), _) if shares <= Decimal::ZERO => Err(SettingsError::Invalid(
                "sizing.shares must be positive".into(),
            )),
            (_, Some(notional)) if notional <= Decimal::ZERO => Err(SettingsError::Invalid(
                "sizing.notional must be positive".into(),
            )),
            _ => Ok(()),
        }
    }
}

impl Default for SizingSettings {
    fn default() -> Self {
        use rust_decimal_macros::dec;
        Self {
            shares: Some(dec!(1)),
            notional: None,
        }
    }
}

/// Broker settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerSettings {
    /// Trade against the paper environment
    pub paper: bool,
    /// Extra calendar days fetched beyond the slow window, to ride out
    /// weekends and holidays
    pub lookback_buffer_days: u32,
}

impl Default for BrokerSettings {
    fn default() -> Self {
        Self {
            paper: true,
            lookback_buffer_days: 60,
        }
    }
}

/// Duplicate-action guard settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DedupSettings {
    pub enabled: bool,
    /// Directory holding the persisted action records
    pub state_dir: PathBuf,
}

impl Default for DedupSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            state_dir: PathBuf::from("state"),
        }
    }
}

/// Advisory step settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisorySettings {
    pub enabled: bool,
    /// Which news queries to run
    pub news_mode: NewsMode,
    /// Judgment model identifier
    pub model: String,
}

impl Default for AdvisorySettings {
    fn default() -> Self {
        Self {
            enabled: false,
            news_mode: NewsMode::PerSymbol,
            model: "gemini-2.5-flash".to_string(),
        }
    }
}

/// Regular session window, in UTC.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Session open, `HH:MM`
    pub open: String,
    /// Session close, `HH:MM`
    pub close: String,
}

impl SessionSettings {
    /// Parse into a (open, close) time pair.
    pub fn parse(&self) -> Result<(NaiveTime, NaiveTime), SettingsError> {
        let open = NaiveTime::parse_from_str(&self.open, "%H:%M")
            .map_err(|e| SettingsError::Invalid(format!("session.open {:?}: {e}", self.open)))?;
        let close = NaiveTime::parse_from_str(&self.close, "%H:%M")
            .map_err(|e| SettingsError::Invalid(format!("session.close {:?}: {e}", self.close)))?;
        if open >= close {
            return Err(SettingsError::Invalid(
                "session.open must be before session.close".into(),
            ));
        }
        Ok((open, close))
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        // US regular session 09:30-16:00 Eastern, expressed in UTC
        Self {
            open: "14:30".to_string(),
            close: "21:00".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}
