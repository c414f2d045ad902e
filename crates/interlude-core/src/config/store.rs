//! Thread-safe holder for the active [`TriggerConfig`].
//!
//! Readers get an `Arc` snapshot and must re-read on every decision; writers
//! swap the whole value under one lock so a concurrent reader can never
//! observe a half-replaced config. Replacements bump a generation counter on
//! a watch channel, which is how the scheduler and engine learn that their
//! accumulated state is stale.

use std::sync::{Arc, Mutex};

use tokio::sync::watch;

use super::TriggerConfig;

pub struct ConfigStore {
    current: Mutex<Arc<TriggerConfig>>,
    generation: watch::Sender<u64>,
}

impl ConfigStore {
    pub fn new(initial: TriggerConfig) -> Self {
        let (generation, _) = watch::channel(0);
        Self {
            current: Mutex::new(Arc::new(initial)),
            generation,
        }
    }

    /// Latest config snapshot. Never blocks on I/O; the lock is held only for
    /// the pointer clone.
    pub fn current(&self) -> Arc<TriggerConfig> {
        self.current.lock().unwrap().clone()
    }

    /// Atomically swap the active config and notify subscribers.
    pub fn replace(&self, new: TriggerConfig) -> Arc<TriggerConfig> {
        let snapshot = Arc::new(new);
        *self.current.lock().unwrap() = snapshot.clone();
        self.generation.send_modify(|gen| *gen += 1);
        snapshot
    }

    /// Subscribe to replacement notifications. The payload is a generation
    /// counter, not the config itself; subscribers call [`current`] to read.
    ///
    /// [`current`]: ConfigStore::current
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.generation.subscribe()
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new(TriggerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Trigger;

    #[test]
    fn replace_is_visible_to_current() {
        let store = ConfigStore::default();
        assert_eq!(store.current().click_threshold(), 15);

        let mut next = TriggerConfig::default();
        next.trigger = Trigger::interval(60);
        store.replace(next);
        assert_eq!(store.current().interval_seconds(), 60);
    }

    #[tokio::test]
    async fn replace_notifies_subscribers() {
        let store = ConfigStore::default();
        let mut rx = store.subscribe();
        assert_eq!(*rx.borrow(), 0);

        store.replace(TriggerConfig::default());
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), 1);
    }
}
