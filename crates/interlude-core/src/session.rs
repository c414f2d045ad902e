//! Foreground session tracking.
//!
//! The host reports surface lifecycle transitions; this module folds them
//! into a single "app is open" boolean plus the handle the interval
//! scheduler should present on. Ad-player surfaces participate in the open
//! count (a visible ad still means the app is open) but never become the
//! active handle -- the scheduler must not target the ad surface as its own
//! presentation host.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};

/// What kind of surface a handle refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurfaceKind {
    /// A regular host application screen.
    Host,
    /// The full-screen ad player itself.
    AdPlayer,
}

/// Opaque reference to a presentable screen in the host application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfaceHandle {
    pub id: u64,
    pub kind: SurfaceKind,
}

impl SurfaceHandle {
    pub fn host(id: u64) -> Self {
        Self {
            id,
            kind: SurfaceKind::Host,
        }
    }

    pub fn ad_player(id: u64) -> Self {
        Self {
            id,
            kind: SurfaceKind::AdPlayer,
        }
    }

    pub fn is_ad_player(&self) -> bool {
        self.kind == SurfaceKind::AdPlayer
    }
}

#[derive(Debug, Default)]
struct SessionState {
    open_surfaces: u32,
    active: Option<SurfaceHandle>,
}

/// Aggregates surface foreground/background signals into one session state.
#[derive(Debug, Default)]
pub struct SessionTracker {
    state: Mutex<SessionState>,
}

impl SessionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// A surface became visible. Records it as the active presentation
    /// target unless it is the ad player.
    pub fn on_surface_foreground(&self, handle: SurfaceHandle) {
        let mut state = self.state.lock().unwrap();
        state.open_surfaces += 1;
        if !handle.is_ad_player() {
            state.active = Some(handle);
        }
    }

    /// A surface left the foreground. The open count never goes negative.
    pub fn on_surface_background(&self, handle: SurfaceHandle) {
        let mut state = self.state.lock().unwrap();
        state.open_surfaces = state.open_surfaces.saturating_sub(1);
        if state.open_surfaces == 0 && state.active == Some(handle) {
            state.active = None;
        }
    }

    pub fn is_open(&self) -> bool {
        self.state.lock().unwrap().open_surfaces > 0
    }

    /// Most recently foregrounded non-ad surface, if any.
    pub fn active_surface(&self) -> Option<SurfaceHandle> {
        self.state.lock().unwrap().active
    }
}
