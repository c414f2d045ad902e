//! Single-flight guard for ad presentation.
//!
//! At most one show attempt may be in flight system-wide. The flag is a bare
//! `AtomicBool`; acquisition hands back an RAII [`GatePermit`] so the flag is
//! dropped back to free on every exit path of an attempt, including panics
//! and task cancellation. A leaked acquisition would permanently wedge the
//! engine into "never shows again", which is why releases are not left to
//! call discipline.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::error;

#[derive(Debug, Default)]
pub struct PresentationGate {
    busy: AtomicBool,
}

impl PresentationGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempt to win the single-flight race. Returns a permit when the gate
    /// was free; `None` means another attempt is already in flight. Never
    /// blocks.
    pub fn try_acquire(&self) -> Option<GatePermit<'_>> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            Some(GatePermit { gate: self })
        } else {
            None
        }
    }

    /// Whether an attempt currently holds the gate.
    pub fn is_held(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Proof of gate ownership for one show attempt. Releases on drop.
#[derive(Debug)]
pub struct GatePermit<'a> {
    gate: &'a PresentationGate,
}

impl Drop for GatePermit<'_> {
    fn drop(&mut self) {
        let was_held = self.gate.busy.swap(false, Ordering::AcqRel);
        if !was_held {
            // A permit existed while the flag read free: the single-flight
            // invariant is broken and ad delivery can no longer be trusted.
            error!("presentation gate released while not held; single-flight invariant violated");
        }
    }
}
