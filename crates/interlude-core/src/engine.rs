//! Trigger decision core.
//!
//! The engine is a wall-clock-based state machine in the same spirit as a
//! timer engine: it holds only a click counter and the last-shown timestamp,
//! and every operation takes the current time as an argument so tests can
//! drive simulated clocks. It never performs I/O and never shows anything
//! itself -- `should_show_now` answers "may I show", and the caller that wins
//! the presentation gate reports back with `on_show_committed`.
//!
//! The check/commit split exists because the decision runs concurrently from
//! the event-driven path and the interval scheduler. Keeping the reset out of
//! the check means polling `should_show_now` from two call sites cannot
//! double-consume a click threshold; the gate stays the sole arbiter of
//! exclusivity.

use std::sync::Mutex;

use crate::config::{TriggerConfig, TriggerKind};

#[derive(Debug, Default)]
struct EngineState {
    click_count: u32,
    last_shown_at_ms: Option<u64>,
}

/// Stateful trigger bookkeeping: click counting and interval timing.
#[derive(Debug, Default)]
pub struct TriggerEngine {
    state: Mutex<EngineState>,
}

impl TriggerEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one qualifying host interaction.
    ///
    /// No-op unless the session is open and the active trigger is CLICKS; in
    /// INTERVAL mode interactions carry no signal.
    pub fn on_interaction(&self, config: &TriggerConfig, session_open: bool) {
        if !session_open || config.trigger.kind != TriggerKind::Clicks {
            return;
        }
        self.state.lock().unwrap().click_count += 1;
    }

    /// Pure decision: is an ad attempt eligible right now?
    ///
    /// Has no side effect of its own; on a `true` result the caller that goes
    /// on to show must immediately call [`on_show_committed`].
    ///
    /// [`on_show_committed`]: TriggerEngine::on_show_committed
    pub fn should_show_now(
        &self,
        config: &TriggerConfig,
        session_open: bool,
        gate_held: bool,
        now_ms: u64,
    ) -> bool {
        if !session_open || gate_held {
            return false;
        }
        let state = self.state.lock().unwrap();
        match config.trigger.kind {
            TriggerKind::Clicks => state.click_count >= config.click_threshold(),
            TriggerKind::Interval => match state.last_shown_at_ms {
                None => true,
                Some(last) => {
                    // Saturate: a hostile `seconds` off the wire must degrade
                    // to "never fires", not panic or wrap.
                    now_ms.saturating_sub(last) >= config.interval_seconds().saturating_mul(1000)
                }
            },
            // Fail open to "do nothing".
            TriggerKind::Unknown => false,
        }
    }

    /// The caller is committing to a show attempt: consume the accumulated
    /// clicks and stamp the interval clock. The timestamp is set in both
    /// modes so a policy switch from CLICKS to INTERVAL does not fire
    /// immediately off a cold `last_shown_at`.
    pub fn on_show_committed(&self, now_ms: u64) {
        let mut state = self.state.lock().unwrap();
        state.click_count = 0;
        state.last_shown_at_ms = Some(now_ms);
    }

    /// A config replacement invalidates progress toward the old policy.
    /// Idempotent.
    pub fn on_config_changed(&self) {
        let mut state = self.state.lock().unwrap();
        state.click_count = 0;
        state.last_shown_at_ms = None;
    }

    /// Milliseconds until the next interval boundary. Seeds the interval
    /// clock on first use so the first ad appears after one full interval,
    /// not immediately.
    pub fn interval_wait_ms(&self, config: &TriggerConfig, now_ms: u64) -> u64 {
        let mut state = self.state.lock().unwrap();
        let last = *state.last_shown_at_ms.get_or_insert(now_ms);
        let next_at = last.saturating_add(config.interval_seconds().saturating_mul(1000));
        next_at.saturating_sub(now_ms)
    }

    #[cfg(test)]
    pub(crate) fn click_count(&self) -> u32 {
        self.state.lock().unwrap().click_count
    }
}

/// Current wall-clock time as epoch milliseconds.
pub(crate) fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
