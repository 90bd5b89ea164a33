//! Bounded, most-recent-first list of active alerts.

use super::types::ActiveAlert;
use std::collections::VecDeque;

/// Default number of alerts retained by the dashboard.
pub const DEFAULT_ALERT_CAPACITY: usize = 100;

/// Fixed-capacity alert list. Index 0 is the newest alert; once full, the
/// oldest entry is evicted on every insert.
#[derive(Debug, Clone)]
pub struct AlertList {
    entries: VecDeque<ActiveAlert>,
    capacity: usize,
    dedup: bool,
}

impl AlertList {
    /// Creates an empty list. A capacity of zero is bumped to one.
    pub fn new(capacity: usize, dedup: bool) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            dedup,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replace the whole list. Input is expected newest first; anything past
    /// capacity is dropped.
    pub fn replace(&mut self, alerts: Vec<ActiveAlert>) {
        self.entries.clear();
        self.entries.extend(alerts.into_iter().take(self.capacity));
    }

    /// Insert at the front, evicting the oldest entry when full.
    ///
    /// With dedup enabled an existing entry with the same id is removed first,
    /// so a redelivered alert moves to the front instead of appearing twice.
    pub fn push_front(&mut self, alert: ActiveAlert) {
        if self.dedup {
            self.entries.retain(|a| a.alert_id != alert.alert_id);
        }
        if self.entries.len() >= self.capacity {
            self.entries.pop_back();
        }
        self.entries.push_front(alert);
    }

    /// Remove every entry with `alert_id`. Returns true if anything was removed.
    pub fn remove(&mut self, alert_id: u64) -> bool {
        let before = self.entries.len();
        self.entries.retain(|a| a.alert_id != alert_id);
        self.entries.len() != before
    }

    /// Flip `acknowledged` on matching entries in place. Returns true if any
    /// entry changed.
    pub fn acknowledge(&mut self, alert_id: u64) -> bool {
        let mut changed = false;
        for alert in self.entries.iter_mut().filter(|a| a.alert_id == alert_id) {
            if !alert.acknowledged {
                alert.acknowledged = true;
                changed = true;
            }
        }
        changed
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActiveAlert> {
        self.entries.iter()
    }

    /// Entries newest first.
    pub fn to_vec(&self) -> Vec<ActiveAlert> {
        self.entries.iter().cloned().collect()
    }
}

impl Default for AlertList {
    fn default() -> Self {
        Self::new(DEFAULT_ALERT_CAPACITY, true)
    }
}
