use crate::types::Order;
use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

pub const DEFAULT_DEDUPE_WINDOW: Duration = Duration::from_millis(1500);
pub const DEFAULT_DEDUPE_CAPACITY: usize = 1024;

/// Remembers when each distinct order was last seen, so a resubmission
/// inside `window` can be rejected. Holds at most `capacity` fingerprints.
pub struct OrderDeduper {
    window: Duration,
    capacity: usize,
    seen: HashMap<String, Instant>,
}

impl OrderDeduper {
    pub fn new(window: Duration, capacity: usize) -> Self {
        Self {
            window,
            capacity: capacity.max(1),
            seen: HashMap::new(),
        }
    }

    /// Records `order` as seen at `now` and reports whether it was already
    /// seen less than `window` earlier.
    pub fn is_duplicate(&mut self, order: &Order, now: Instant) -> bool {
        let key = fingerprint(order);
        let duplicate = self
            .seen
            .get(&key)
            .is_some_and(|last| now.saturating_duration_since(*last) < self.window);
        self.seen.insert(key, now);
        if self.seen.len() > self.capacity {
            self.evict(now);
        }
        duplicate
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    fn evict(&mut self, now: Instant) {
        let window = self.window;
        self.seen
            .retain(|_, last| now.saturating_duration_since(*last) < window);
        while self.seen.len() > self.capacity {
            let Some(oldest) = self
                .seen
                .iter()
                .min_by_key(|(_, last)| **last)
                .map(|(key, _)| key.clone())
            else {
                break;
            };
            self.seen.remove(&oldest);
        }
    }
}

impl Default for OrderDeduper {
    fn default() -> Self {
        Self::new(DEFAULT_DEDUPE_WINDOW, DEFAULT_DEDUPE_CAPACITY)
    }
}

fn fingerprint(order: &Order) -> String {
    format!(
        "{}|{}|{}|{}|{}|{}",
        order.side,
        order.order_type,
        order.qty,
        order.price.as_ref().map(ToString::to_string).unwrap_or_default(),
        order
            .trigger_price
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default(),
        order.tag.as_deref().unwrap_or_default(),
    )
}
