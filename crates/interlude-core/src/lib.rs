//! # Interlude Core Library
//!
//! Embeddable interstitial ad engine: given a stream of user-interaction and
//! surface-lifecycle signals, it decides when to fetch and display an ad,
//! enforces at most one ad visible at a time, and keeps its trigger policy in
//! sync with a remote configuration source.
//!
//! ## Architecture
//!
//! - **TriggerEngine**: wall-clock-based decision state machine (click
//!   counting, interval timing); pure bookkeeping, no I/O
//! - **PresentationGate**: single-flight guard with RAII release, the sole
//!   arbiter of "one ad at a time"
//! - **IntervalScheduler**: cancellable background loop driving
//!   interval-mode shows
//! - **SessionTracker**: folds surface foreground/background signals into
//!   one "app is open" boolean
//! - **AdsClient**: reqwest client for the config and serve endpoints, with
//!   bounded retry on config fetch
//! - **AdEngine**: the per-process root object tying the above together
//!
//! Presentation is out of scope: the engine hands an [`AdPlacement`] to an
//! injected [`AdPresenter`] and [`PlaybackControl`] captures the surface's
//! dismiss-delay and tap-debounce contract as pure logic.

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod gate;
pub mod player;
mod scheduler;
pub mod sdk;
pub mod session;

pub use api::{Ad, AdsClient, ConfigDocument};
pub use config::{ConfigStore, Preferences, Trigger, TriggerConfig, TriggerKind};
pub use engine::TriggerEngine;
pub use error::{ConfigSyncError, Result, SdkError, ShowError};
pub use gate::{GatePermit, PresentationGate};
pub use player::{PlaybackControl, TapAction};
pub use sdk::{AdEngine, AdPlacement, AdPresenter, EngineConfig, ShowOutcome};
pub use session::{SessionTracker, SurfaceHandle, SurfaceKind};
