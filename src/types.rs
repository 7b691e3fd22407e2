use serde::{Deserialize, Serialize};
use std::{fmt, num::ParseFloatError, str::FromStr};
use thiserror::Error;

/// Tag recorded on trades whose order did not carry one
pub const DEFAULT_TAG: &str = "bt";

/// One OHLCV sample. `ts` is opaque and never validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    #[serde(default)]
    pub ts: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
}

impl Bar {
    pub fn new(ts: impl Into<String>, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            ts: ts.into(),
            open,
            high,
            low,
            close,
            volume: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum OrderSide {
    Buy,
    Sell,
}

#[derive(Debug, Error)]
#[error("Unknown order side `{0}`")]
pub struct UnknownSide(String);

impl FromStr for OrderSide {
    type Err = UnknownSide;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BUY" => Ok(Self::Buy),
            "SELL" => Ok(Self::Sell),
            _ => Err(UnknownSide(s.to_string())),
        }
    }
}

impl TryFrom<String> for OrderSide {
    type Error = UnknownSide;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => f.write_str("BUY"),
            Self::Sell => f.write_str("SELL"),
        }
    }
}

/// Order types understood by the fill model. Anything else is kept verbatim
/// in `Other` and never fills.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderType {
    #[default]
    Market,
    Limit,
    StopLossLimit,
    Other(String),
}

impl From<&str> for OrderType {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "MARKET" => Self::Market,
            "LIMIT" => Self::Limit,
            "STOPLOSS_LIMIT" | "SL" | "SL_LIMIT" => Self::StopLossLimit,
            _ => Self::Other(value.to_string()),
        }
    }
}

impl From<String> for OrderType {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<OrderType> for String {
    fn from(value: OrderType) -> Self {
        value.to_string()
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Market => f.write_str("MARKET"),
            Self::Limit => f.write_str("LIMIT"),
            Self::StopLossLimit => f.write_str("STOPLOSS_LIMIT"),
            Self::Other(raw) => f.write_str(raw),
        }
    }
}

/// A price field that may arrive as a number or as text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Numeric {
    Number(f64),
    Text(String),
}

impl Numeric {
    pub fn to_f64(&self) -> Result<f64, ParseFloatError> {
        match self {
            Self::Number(value) => Ok(*value),
            Self::Text(raw) => raw.trim().parse(),
        }
    }
}

impl fmt::Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(raw) => f.write_str(raw),
        }
    }
}

impl From<f64> for Numeric {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for Numeric {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub side: OrderSide,
    #[serde(default)]
    pub order_type: OrderType,
    pub qty: i64,
    /// Defaults to the bar close
    #[serde(default)]
    pub price: Option<Numeric>,
    /// Defaults to `price`
    #[serde(default)]
    pub trigger_price: Option<Numeric>,
    /// Defaults to [`DEFAULT_TAG`]
    #[serde(default)]
    pub tag: Option<String>,
}

impl Order {
    pub fn market(side: OrderSide, qty: i64) -> Self {
        Self {
            side,
            order_type: OrderType::Market,
            qty,
            price: None,
            trigger_price: None,
            tag: None,
        }
    }

    pub fn limit(side: OrderSide, qty: i64, price: impl Into<Numeric>) -> Self {
        Self {
            order_type: OrderType::Limit,
            price: Some(price.into()),
            ..Self::market(side, qty)
        }
    }

    pub fn stop_loss_limit(
        side: OrderSide,
        qty: i64,
        price: impl Into<Numeric>,
        trigger_price: impl Into<Numeric>,
    ) -> Self {
        Self {
            order_type: OrderType::StopLossLimit,
            price: Some(price.into()),
            trigger_price: Some(trigger_price.into()),
            ..Self::market(side, qty)
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn tag_or_default(&self) -> &str {
        self.tag.as_deref().unwrap_or(DEFAULT_TAG)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fill {
    pub price: f64,
}

/// An execution recorded by the backtester. Never mutated once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub ts: String,
    pub side: OrderSide,
    pub qty: i64,
    pub price: f64,
    pub tag: String,
}

impl Trade {
    pub fn new(bar: &Bar, order: &Order, fill: &Fill) -> Self {
        Self {
            ts: bar.ts.clone(),
            side: order.side,
            qty: order.qty,
            price: fill.price,
            tag: order.tag_or_default().to_string(),
        }
    }
}
