use super::Strategy;
use crate::types::{Bar, Order};
use tracing::trace;

pub struct NoopStrategy {
    pub name: String,
}

impl Strategy for NoopStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn on_bar(&mut self, bar: &Bar) -> anyhow::Result<Vec<Order>> {
        trace!("{} ignoring bar {}", self.name, bar.ts);
        Ok(Vec::new())
    }
}
