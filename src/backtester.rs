use crate::{
    broker::{Broker, BrokerError},
    data_feed::DataFeed,
    strategy::Strategy,
    types::{Bar, Trade},
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, Default)]
pub struct BacktestConfig {
    /// Skip an order whose fill evaluation fails instead of aborting the run
    pub continue_on_broker_error: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    Signal,
    Broker,
}

/// A bar (or a single order on it) that was skipped after an error.
#[derive(Debug, Clone, PartialEq)]
pub struct StepFailure {
    pub ts: String,
    pub stage: FailureStage,
    pub message: String,
}

/// Replays bars through a strategy and a broker, one bar at a time.
///
/// Trades accumulate across calls to [`Backtester::run`] and survive an
/// aborted run, so they can still be read from [`Backtester::trades`].
pub struct Backtester {
    strategy: Box<dyn Strategy>,
    broker: Arc<dyn Broker>,
    config: BacktestConfig,
    trades: Vec<Trade>,
    failures: Vec<StepFailure>,
}

impl Backtester {
    pub fn new(strategy: Box<dyn Strategy>, broker: Arc<dyn Broker>, config: BacktestConfig) -> Self {
        Self {
            strategy,
            broker,
            config,
            trades: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn run(&mut self, bars: &[Bar]) -> Result<&[Trade], BacktestError> {
        info!(
            "Running {} over {} bars on broker {}",
            self.strategy.name(),
            bars.len(),
            self.broker.name()
        );
        for bar in bars {
            self.step(bar)?;
        }
        Ok(&self.trades)
    }

    pub fn run_feed(&mut self, feed: &mut dyn DataFeed) -> Result<&[Trade], BacktestError> {
        info!(
            "Running {} using feed {} on broker {}",
            self.strategy.name(),
            feed.name(),
            self.broker.name()
        );
        while let Some(bar) = feed.next_bar() {
            self.step(&bar)?;
        }
        Ok(&self.trades)
    }

    fn step(&mut self, bar: &Bar) -> Result<(), BacktestError> {
        let orders = match self.strategy.on_bar(bar) {
            Ok(orders) => orders,
            Err(err) => {
                error!("Strategy error @ {}: {err:#}", bar.ts);
                self.failures.push(StepFailure {
                    ts: bar.ts.clone(),
                    stage: FailureStage::Signal,
                    message: format!("{err:#}"),
                });
                return Ok(());
            }
        };

        for order in &orders {
            match self.broker.place(order, bar) {
                Ok(Some(fill)) => self.trades.push(Trade::new(bar, order, &fill)),
                Ok(None) => debug!("{:?} not filled @ {}", order, bar.ts),
                Err(err) if self.config.continue_on_broker_error => {
                    warn!("Skipping order @ {}: {err}", bar.ts);
                    self.failures.push(StepFailure {
                        ts: bar.ts.clone(),
                        stage: FailureStage::Broker,
                        message: err.to_string(),
                    });
                }
                Err(source) => {
                    return Err(BacktestError::Broker {
                        ts: bar.ts.clone(),
                        source,
                    });
                }
            }
        }
        Ok(())
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn failures(&self) -> &[StepFailure] {
        &self.failures
    }

    pub fn into_trades(self) -> Vec<Trade> {
        self.trades
    }
}

#[derive(Debug, Error)]
pub enum BacktestError {
    #[error("Broker failed to evaluate an order @ {ts}: {source}")]
    Broker {
        ts: String,
        #[source]
        source: BrokerError,
    },
}
