use std::collections::HashMap;

use anyhow::Result;
use config::Value;
use serde::Deserialize;

const TRUE_FLAGS: &[&str] = &["1", "true", "yes", "on", "y", "t"];
const FALSE_FLAGS: &[&str] = &["0", "false", "no", "off", "n", "f"];

/// Environment variable overriding [`BacktestSettings::continue_on_broker_error`]
pub const CONTINUE_ON_BROKER_ERROR_ENV: &str = "BACKTEST_CONTINUE_ON_BROKER_ERROR";

#[derive(Debug, Deserialize)]
pub struct BacktestSettings {
    pub data: DataFeedConfig,
    pub strategy: StrategyConfig,
    /// Skip orders the broker fails to evaluate instead of aborting
    #[serde(default)]
    pub continue_on_broker_error: bool,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize)]
pub struct DataFeedConfig {
    pub name: String,
    /// Path to the OHLCV CSV file
    pub path: String,
    /// Stop reading after this many rows; 0 reads the whole file
    pub limit: Option<usize>,
    /// Keep only bars inside this `HH:MM-HH:MM` window
    pub session: Option<String>,
    /// Exchange offset such as `+05:30`, applied to timestamps that carry
    /// their own offset before the session check
    pub session_utc_offset: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StrategyConfig {
    /// The name of the strategy, also used as the order tag
    pub name: String,
    /// The type of the strategy
    pub r#type: StrategyType,
    /// Extra optional parameters that might be needed for the specific strategy
    pub params: Option<HashMap<String, Value>>,
}

#[derive(Debug, Deserialize)]
pub enum StrategyType {
    NoopStrategy,
    SmaCrossStrategy,
}

#[derive(Debug, Default, Deserialize)]
pub struct OutputConfig {
    /// Where to write the trade list as CSV
    pub trades_csv: Option<String>,
    /// JSON lines file receiving run events
    pub audit_log: Option<String>,
}

impl BacktestSettings {
    pub fn deserialize_from_file(path: &str) -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;
        let config = config.try_deserialize()?;
        Ok(config)
    }
}

/// Lenient boolean parsing: `None` for anything that is not a known flag.
pub fn parse_flag(value: &str) -> Option<bool> {
    let value = value.trim().to_ascii_lowercase();
    if TRUE_FLAGS.contains(&value.as_str()) {
        Some(true)
    } else if FALSE_FLAGS.contains(&value.as_str()) {
        Some(false)
    } else {
        None
    }
}

/// Reads a boolean environment variable, falling back to `default` when it
/// is unset or unrecognised.
pub fn env_flag(name: &str, default: bool) -> bool {
    std::env::var(name)
        .ok()
        .and_then(|v| parse_flag(&v))
        .unwrap_or(default)
}
