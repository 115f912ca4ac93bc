// Client-side rate limit protecting the upstream providers
use std::collections::HashMap;
use std::hash::Hash;

/// Admits at most one refresh per key per `interval_secs`.
#[derive(Debug)]
pub struct CadenceGuard<K> {
    interval_secs: i64,
    last_started: HashMap<K, i64>,
}

impl<K: Eq + Hash + Clone> CadenceGuard<K> {
    pub fn new(interval_secs: i64) -> Self {
        Self {
            interval_secs,
            last_started: HashMap::new(),
        }
    }

    /// Returns true, and arms the guard for `key`, when a refresh is due at
    /// `now`. Arming happens before the fetch so overlapping callers inside
    /// the interval are turned away.
    pub fn try_acquire(&mut self, key: &K, now: i64) -> bool {
        match self.last_started.get(key) {
            Some(&last) if now - last < self.interval_secs => false,
            _ => {
                self.last_started.insert(key.clone(), now);
                true
            }
        }
    }
}
