use crate::{
    backtester::{BacktestConfig, Backtester},
    broker::{Broker, sim::BrokerSim},
    config::{
        BacktestSettings, CONTINUE_ON_BROKER_ERROR_ENV, DataFeedConfig, StrategyConfig,
        StrategyType, env_flag,
    },
    data_feed::csv_data_feed::CsvDataFeed,
    filters::{SessionWindow, parse_utc_offset},
    strategy::{
        Strategy,
        noop::NoopStrategy,
        sma_cross::{
            DEFAULT_SMA_CROSS_FAST_WINDOW, DEFAULT_SMA_CROSS_QTY, DEFAULT_SMA_CROSS_SLOW_WINDOW,
            SmaCrossStrategy,
        },
    },
};
use config::Value;
use std::{collections::HashMap, sync::Arc};
use thiserror::Error;
use tracing::{debug, warn};

pub fn build_backtester(settings: &BacktestSettings) -> Result<Backtester, FactoryError> {
    let strategy = build_strategy(&settings.strategy)?;
    let broker: Arc<dyn Broker> = Arc::new(BrokerSim::default());
    let config = BacktestConfig {
        continue_on_broker_error: env_flag(
            CONTINUE_ON_BROKER_ERROR_ENV,
            settings.continue_on_broker_error,
        ),
    };
    debug!("Backtest config: {config:?}");
    Ok(Backtester::new(strategy, broker, config))
}

pub fn build_strategy(config: &StrategyConfig) -> Result<Box<dyn Strategy>, FactoryError> {
    let strategy: Box<dyn Strategy> = match config.r#type {
        StrategyType::NoopStrategy => Box::new(NoopStrategy {
            name: config.name.clone(),
        }),
        StrategyType::SmaCrossStrategy => {
            let fast_window =
                get_usize_param(&config.params, "fast_window", DEFAULT_SMA_CROSS_FAST_WINDOW);
            let slow_window =
                get_usize_param(&config.params, "slow_window", DEFAULT_SMA_CROSS_SLOW_WINDOW);
            let qty = get_i64_param(&config.params, "qty", DEFAULT_SMA_CROSS_QTY);
            if fast_window == 0 || slow_window == 0 {
                return Err(FactoryError::InvalidParameter(
                    "window".into(),
                    "SMA windows must be positive".into(),
                ));
            }
            Box::new(SmaCrossStrategy::new(
                config.name.clone(),
                fast_window,
                slow_window,
                qty,
            ))
        }
    };
    Ok(strategy)
}

pub fn build_data_feed(config: &DataFeedConfig) -> Result<CsvDataFeed, FactoryError> {
    let mut feed = CsvDataFeed::new(config.name.clone(), config.path.clone(), config.limit)
        .map_err(|err| FactoryError::CsvDataFeedInitError(err.to_string()))?;
    if let Some(session) = &config.session {
        let mut window = session
            .parse::<SessionWindow>()
            .map_err(|err| FactoryError::InvalidParameter("session".into(), err.to_string()))?;
        if let Some(offset) = &config.session_utc_offset {
            let offset = parse_utc_offset(offset).map_err(|err| {
                FactoryError::InvalidParameter("session_utc_offset".into(), err.to_string())
            })?;
            window = window.with_utc_offset(offset);
        }
        let before = feed.len();
        feed.retain_session(&window)
            .map_err(|err| FactoryError::CsvDataFeedInitError(err.to_string()))?;
        debug!("Session filter kept {} of {before} bars", feed.len());
    }
    Ok(feed)
}

fn get_usize_param(params: &Option<HashMap<String, Value>>, key: &str, default: usize) -> usize {
    params
        .as_ref()
        .and_then(|p| p.get(key))
        .and_then(|v| v.clone().into_uint().ok())
        .and_then(|v| v.try_into().ok())
        .unwrap_or(default)
}

fn get_i64_param(params: &Option<HashMap<String, Value>>, key: &str, default: i64) -> i64 {
    match params.as_ref().and_then(|p| p.get(key)) {
        None => default,
        Some(v) => v.clone().into_int().unwrap_or_else(|err| {
            warn!("Wrong type for '{key}' param. Using default: {default}. Error: {err}");
            default
        }),
    }
}

#[derive(Debug, Error)]
pub enum FactoryError {
    #[error("Invalid `{0}` parameter: {1}")]
    InvalidParameter(String, String),
    #[error("CSV Data Feed initialization failed: `{0}`")]
    CsvDataFeedInitError(String),
}
