use crate::types::{Bar, Fill, Order};
use thiserror::Error;

pub mod sim;

/// Decides whether an order executes against a bar.
///
/// Implementations must return `Ok(None)` for an order that does not fill;
/// the caller never resubmits it on a later bar.
pub trait Broker: Send + Sync {
    fn name(&self) -> &str;
    fn place(&self, order: &Order, bar: &Bar) -> Result<Option<Fill>, BrokerError>;
}

#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("Invalid {field} `{value}`: {reason}")]
    InvalidNumber {
        field: &'static str,
        value: String,
        reason: String,
    },
}
