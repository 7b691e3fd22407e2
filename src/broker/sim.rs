use crate::types::{Bar, Fill, Numeric, Order, OrderSide, OrderType};

use super::{Broker, BrokerError};

/// Single-bar fill model with no state.
///
/// - MARKET fills at the bar close.
/// - LIMIT fills at the limit price when the bar touches it
///   (BUY on `low <= price`, SELL on `high >= price`).
/// - STOPLOSS_LIMIT fills at `price` once `high >= trigger`. The check is
///   the same for both sides: it models a buy-to-cover on a short exit.
pub struct BrokerSim {
    name: String,
}

impl BrokerSim {
    pub fn new(name: String) -> Self {
        Self { name }
    }
}

impl Default for BrokerSim {
    fn default() -> Self {
        Self::new("sim".to_string())
    }
}

impl Broker for BrokerSim {
    fn name(&self) -> &str {
        &self.name
    }

    fn place(&self, order: &Order, bar: &Bar) -> Result<Option<Fill>, BrokerError> {
        let price = resolve("price", order.price.as_ref(), bar.close)?;
        let trigger = resolve("trigger_price", order.trigger_price.as_ref(), price)?;

        let fill = match &order.order_type {
            OrderType::Market => Some(Fill { price: bar.close }),
            OrderType::Limit => {
                let touched = match order.side {
                    OrderSide::Buy => bar.low <= price,
                    OrderSide::Sell => bar.high >= price,
                };
                touched.then_some(Fill { price })
            }
            OrderType::StopLossLimit => (bar.high >= trigger).then_some(Fill { price }),
            OrderType::Other(_) => None,
        };
        Ok(fill)
    }
}

fn resolve(field: &'static str, value: Option<&Numeric>, default: f64) -> Result<f64, BrokerError> {
    match value {
        None => Ok(default),
        Some(value) => value.to_f64().map_err(|err| BrokerError::InvalidNumber {
            field,
            value: value.to_string(),
            reason: err.to_string(),
        }),
    }
}
