//! Autonomous interval-mode show loop.
//!
//! At most one loop instance runs per engine. Whether it should run is a
//! pure function of three inputs -- engine started, session open, trigger is
//! INTERVAL -- recomputed on every surface transition and config change.
//! Cancellation is observed only at the loop's own sleeps, never inside the
//! gate-serialized show flow, so stopping the scheduler can never leave the
//! presentation gate held.

use std::ops::ControlFlow;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::config::TriggerKind;
use crate::engine::now_ms;
use crate::sdk::{request_and_show, EngineInner};

/// Poll spacing while no usable presentation surface exists.
const SURFACE_POLL: Duration = Duration::from_millis(500);
/// Back-off when waking up to find the gate held by another attempt.
const GATE_BACKOFF: Duration = Duration::from_millis(300);

struct LoopHandle {
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

#[derive(Default)]
pub(crate) struct IntervalScheduler {
    slot: Mutex<Option<LoopHandle>>,
}

impl IntervalScheduler {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Re-evaluate the start/stop condition and reconcile the loop task.
    /// Starting while a live loop exists is a no-op.
    pub(crate) fn recompute(&self, inner: &Arc<EngineInner>) {
        let should_run = inner.initialized()
            && inner.session.is_open()
            && inner.store.current().trigger.kind == TriggerKind::Interval;

        let mut slot = self.slot.lock().unwrap();
        if !should_run {
            if let Some(handle) = slot.take() {
                let _ = handle.stop.send(true);
                debug!("interval loop stop requested");
            }
            return;
        }
        if slot.as_ref().is_some_and(|h| !h.task.is_finished()) {
            return;
        }

        let (stop, stop_rx) = watch::channel(false);
        let task = tokio::spawn(run_loop(inner.clone(), stop_rx));
        *slot = Some(LoopHandle { stop, task });
    }

    pub(crate) fn is_running(&self) -> bool {
        self.slot
            .lock()
            .unwrap()
            .as_ref()
            .is_some_and(|h| !h.task.is_finished())
    }
}

async fn run_loop(inner: Arc<EngineInner>, mut stop: watch::Receiver<bool>) {
    debug!("interval loop started");
    loop {
        if *stop.borrow() {
            break;
        }
        // The loop re-checks its own start conditions each iteration and
        // exits as soon as any goes false.
        if !inner.initialized() || !inner.session.is_open() {
            break;
        }
        let config = inner.store.current();
        if config.trigger.kind != TriggerKind::Interval {
            break;
        }

        // Never target the ad surface as its own presentation host.
        match inner.session.active_surface() {
            Some(surface) if !surface.is_ad_player() => {}
            _ => {
                if pause(&mut stop, SURFACE_POLL).await.is_break() {
                    break;
                }
                continue;
            }
        }

        let wait = inner.engine.interval_wait_ms(&config, now_ms());
        if pause(&mut stop, Duration::from_millis(wait)).await.is_break() {
            break;
        }

        if !inner.session.is_open() {
            continue;
        }
        if inner.gate.is_held() {
            // Back off rather than dropping the cycle.
            if pause(&mut stop, GATE_BACKOFF).await.is_break() {
                break;
            }
            continue;
        }

        let outcome = request_and_show(&inner).await;
        debug!(?outcome, "interval attempt finished");
        // A failed attempt still consumes the interval; hot-looping against
        // a failing backend is worse than a late ad.
        inner.engine.on_show_committed(now_ms());
    }
    debug!("interval loop stopped");
}

/// Sleep for `dur`, waking early if a stop is signalled (or the scheduler
/// dropped its sender).
async fn pause(stop: &mut watch::Receiver<bool>, dur: Duration) -> ControlFlow<()> {
    tokio::select! {
        _ = tokio::time::sleep(dur) => ControlFlow::Continue(()),
        _ = stop.changed() => ControlFlow::Break(()),
    }
}
