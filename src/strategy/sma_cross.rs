use crate::{
    strategy::Strategy,
    types::{Bar, Order, OrderSide},
};
use tracing::{debug, info};

pub const DEFAULT_SMA_CROSS_FAST_WINDOW: usize = 50;
pub const DEFAULT_SMA_CROSS_SLOW_WINDOW: usize = 200;
pub const DEFAULT_SMA_CROSS_QTY: i64 = 10;

pub struct SmaCrossStrategy {
    name: String,
    slow_window: usize,
    fast_window: usize,
    qty: i64,
    closes: Vec<f64>,
    last_signal: Option<SmaCrossSignal>,
}

impl SmaCrossStrategy {
    pub fn new(name: String, fast_window: usize, slow_window: usize, qty: i64) -> Self {
        Self {
            name,
            fast_window,
            slow_window,
            qty,
            closes: Vec::new(),
            last_signal: None,
        }
    }

    fn sma(&self, window: usize) -> Option<f64> {
        if window == 0 || self.closes.len() < window {
            return None;
        }
        let slice = &self.closes[self.closes.len() - window..];
        Some(slice.iter().copied().sum::<f64>() / window as f64)
    }

    fn check_signal(&mut self) -> Option<SmaCrossSignal> {
        let fast = self.sma(self.fast_window)?;
        let slow = self.sma(self.slow_window)?;

        let new_signal = if fast > slow {
            Some(SmaCrossSignal::Buy)
        } else if fast < slow {
            Some(SmaCrossSignal::Sell)
        } else {
            None
        };
        if new_signal != self.last_signal {
            self.last_signal = new_signal;
            return new_signal;
        }
        None
    }
}

impl Strategy for SmaCrossStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn on_bar(&mut self, bar: &Bar) -> anyhow::Result<Vec<Order>> {
        self.closes.push(bar.close);
        match self.check_signal() {
            Some(signal) => {
                let order = Order::market(signal.into(), self.qty).with_tag(self.name.clone());
                info!("{} signalled {:?} at {} (close {})", self.name, signal, bar.ts, bar.close);
                Ok(vec![order])
            }
            None => {
                debug!("No signal at close {}", bar.close);
                Ok(Vec::new())
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SmaCrossSignal {
    Buy,
    Sell,
}

impl From<SmaCrossSignal> for OrderSide {
    fn from(signal: SmaCrossSignal) -> Self {
        match signal {
            SmaCrossSignal::Buy => Self::Buy,
            SmaCrossSignal::Sell => Self::Sell,
        }
    }
}
