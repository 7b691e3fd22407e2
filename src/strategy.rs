use crate::types::{Bar, Order};

pub mod noop;
pub mod sma_cross;

/// Signal logic invoked once per bar. May keep state between calls and may
/// fail; a failure only costs the bar it happened on.
pub trait Strategy: Send {
    fn name(&self) -> &str;
    fn on_bar(&mut self, bar: &Bar) -> anyhow::Result<Vec<Order>>;
}

/// Wraps a closure so it can be used wherever a [`Strategy`] is expected.
pub struct SignalFn<F> {
    name: String,
    f: F,
}

impl<F> SignalFn<F>
where
    F: FnMut(&Bar) -> anyhow::Result<Vec<Order>> + Send,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> Strategy for SignalFn<F>
where
    F: FnMut(&Bar) -> anyhow::Result<Vec<Order>> + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn on_bar(&mut self, bar: &Bar) -> anyhow::Result<Vec<Order>> {
        (self.f)(bar)
    }
}
