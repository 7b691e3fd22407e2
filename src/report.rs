use crate::types::{OrderSide, Trade};
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TradeSummary {
    pub trades: usize,
    pub buys: usize,
    pub sells: usize,
    /// Bought minus sold quantity
    pub net_qty: i64,
    /// Cash in minus cash out; buys count negative
    pub net_cash_flow: f64,
}

impl TradeSummary {
    pub fn from_trades(trades: &[Trade]) -> Self {
        trades.iter().fold(Self::default(), |mut summary, trade| {
            summary.trades += 1;
            let notional = trade.qty as f64 * trade.price;
            match trade.side {
                OrderSide::Buy => {
                    summary.buys += 1;
                    summary.net_qty += trade.qty;
                    summary.net_cash_flow -= notional;
                }
                OrderSide::Sell => {
                    summary.sells += 1;
                    summary.net_qty -= trade.qty;
                    summary.net_cash_flow += notional;
                }
            }
            summary
        })
    }
}

pub fn write_trades_csv(path: impl AsRef<Path>, trades: &[Trade]) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_path(path)?;
    for trade in trades {
        wtr.serialize(trade)?;
    }
    wtr.flush()?;
    Ok(())
}
