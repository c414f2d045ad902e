//! Engine root object.
//!
//! [`AdEngine`] wires the trigger core, session tracker, presentation gate,
//! interval scheduler, and HTTP client into one handle constructed once per
//! process and passed by reference to all call sites. There is deliberately
//! no global singleton; the host owns the instance.
//!
//! Presentation is an injected collaborator: the engine hands a fully
//! resolved [`AdPlacement`] to an [`AdPresenter`] and does not care how the
//! host renders it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::api::AdsClient;
use crate::config::{ConfigStore, Preferences, TriggerConfig, TriggerKind};
use crate::engine::{now_ms, TriggerEngine};
use crate::error::{Result, SdkError, ShowError};
use crate::gate::PresentationGate;
use crate::scheduler::IntervalScheduler;
use crate::session::{SessionTracker, SurfaceHandle};

/// Everything the engine needs to know at construction.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Base URL of the ads backend.
    pub base_url: String,
    /// Application identifier sent with every request.
    pub app_id: String,
}

/// Fully resolved descriptor handed to the presentation collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdPlacement {
    pub video_url: String,
    pub target_url: Option<String>,
    /// Seconds before the dismiss control becomes interactive, already
    /// clamped to `[5, 30]`.
    pub dismiss_delay_seconds: u8,
}

/// How one show attempt ended. None of these are errors at the call site;
/// failures are logged and the engine simply tries again at the next trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowOutcome {
    /// An ad was handed to the presenter.
    Shown,
    /// Valid serve response with no ad available.
    NoFill,
    /// Fetch or presentation handoff failed.
    Failed,
    /// Another attempt already held the gate.
    Skipped,
}

/// Presentation collaborator. The handoff is fire-and-forget from the
/// engine's point of view; implementations should return promptly.
pub trait AdPresenter: Send + Sync {
    fn present(&self, placement: AdPlacement) -> std::result::Result<(), ShowError>;
}

pub(crate) struct EngineInner {
    pub(crate) app_id: String,
    pub(crate) api: AdsClient,
    pub(crate) store: ConfigStore,
    pub(crate) engine: TriggerEngine,
    pub(crate) session: SessionTracker,
    pub(crate) gate: PresentationGate,
    pub(crate) scheduler: IntervalScheduler,
    pub(crate) presenter: Arc<dyn AdPresenter>,
    initialized: AtomicBool,
}

impl EngineInner {
    pub(crate) fn initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }
}

/// The embeddable ad-presentation engine.
pub struct AdEngine {
    inner: Arc<EngineInner>,
}

impl AdEngine {
    /// Build an engine against the given backend. The config starts at its
    /// built-in default until the first sync lands.
    pub fn new(config: EngineConfig, presenter: Arc<dyn AdPresenter>) -> Result<Self> {
        let api = AdsClient::new(&config.base_url).map_err(SdkError::ConfigSync)?;
        Ok(Self {
            inner: Arc::new(EngineInner {
                app_id: config.app_id.trim().to_string(),
                api,
                store: ConfigStore::default(),
                engine: TriggerEngine::new(),
                session: SessionTracker::new(),
                gate: PresentationGate::new(),
                scheduler: IntervalScheduler::new(),
                presenter,
                initialized: AtomicBool::new(false),
            }),
        })
    }

    /// Mark the engine live and kick off the initial config sync in the
    /// background. Idempotent. Must be called from within a tokio runtime.
    pub fn start(&self) {
        if self.inner.initialized.swap(true, Ordering::AcqRel) {
            return;
        }
        info!(app_id = %self.inner.app_id, "ad engine starting");
        let inner = self.inner.clone();
        tokio::spawn(async move {
            match inner.api.fetch_config(&inner.app_id).await {
                Ok(config) => {
                    apply_config(&inner, config);
                }
                // Not fatal: the default/last-known config stays active.
                Err(err) => warn!(error = %err, "initial config sync failed, keeping defaults"),
            }
        });
        self.inner.scheduler.recompute(&self.inner);
    }

    /// Latest config snapshot.
    pub fn current_config(&self) -> Arc<TriggerConfig> {
        self.inner.store.current()
    }

    /// Whether the autonomous interval loop is currently alive.
    pub fn interval_loop_running(&self) -> bool {
        self.inner.scheduler.is_running()
    }

    /// Fetch the remote config and make it active. Resets trigger progress
    /// and reconfigures the interval scheduler.
    pub async fn refresh_config(&self) -> Result<Arc<TriggerConfig>> {
        self.ensure_started()?;
        let config = self.inner.api.fetch_config(&self.inner.app_id).await?;
        Ok(apply_config(&self.inner, config))
    }

    /// Push a developer preference override to the server and adopt the
    /// server's echo as the new active config.
    pub async fn set_preferences(&self, prefs: &Preferences) -> Result<Arc<TriggerConfig>> {
        self.ensure_started()?;
        let requested = self.inner.store.current().apply_preferences(prefs);
        let authoritative = self
            .inner
            .api
            .push_config(&self.inner.app_id, &requested)
            .await?;
        Ok(apply_config(&self.inner, authoritative))
    }

    /// A qualifying host interaction occurred on `source`. Counts the click
    /// and, when the CLICKS threshold is met, commits and launches a show
    /// attempt. Interactions from the ad player itself are ignored.
    ///
    /// Must be called from within a tokio runtime.
    pub fn notify_interaction(&self, source: SurfaceHandle) {
        let inner = &self.inner;
        if !inner.initialized() || source.is_ad_player() {
            return;
        }
        let config = inner.store.current();
        let open = inner.session.is_open();
        inner.engine.on_interaction(&config, open);

        if config.trigger.kind != TriggerKind::Clicks {
            return;
        }
        let now = now_ms();
        if inner
            .engine
            .should_show_now(&config, open, inner.gate.is_held(), now)
        {
            // Commit before the attempt so a second call site polling the
            // decision cannot consume the same threshold.
            inner.engine.on_show_committed(now);
            let inner = inner.clone();
            tokio::spawn(async move {
                let outcome = request_and_show(&inner).await;
                debug!(?outcome, "click-triggered attempt finished");
            });
        }
    }

    /// A surface became visible.
    pub fn surface_foregrounded(&self, handle: SurfaceHandle) {
        self.inner.session.on_surface_foreground(handle);
        self.inner.scheduler.recompute(&self.inner);
    }

    /// A surface left the foreground.
    pub fn surface_backgrounded(&self, handle: SurfaceHandle) {
        self.inner.session.on_surface_background(handle);
        self.inner.scheduler.recompute(&self.inner);
    }

    /// Run one fetch+present cycle through the single-flight gate.
    pub async fn request_and_show(&self) -> ShowOutcome {
        if !self.inner.initialized() {
            return ShowOutcome::Skipped;
        }
        request_and_show(&self.inner).await
    }

    fn ensure_started(&self) -> Result<()> {
        if self.inner.initialized() {
            Ok(())
        } else {
            Err(SdkError::NotInitialized)
        }
    }
}

/// Swap in a new config and propagate the reset it implies.
pub(crate) fn apply_config(inner: &Arc<EngineInner>, config: TriggerConfig) -> Arc<TriggerConfig> {
    let snapshot = inner.store.replace(config);
    inner.engine.on_config_changed();
    inner.scheduler.recompute(inner);
    debug!(trigger = ?snapshot.trigger.kind, "config applied");
    snapshot
}

/// Shared show flow for the event-driven path and the interval scheduler.
///
/// The gate permit is dropped on every exit path; no outcome leaves the gate
/// held.
pub(crate) async fn request_and_show(inner: &Arc<EngineInner>) -> ShowOutcome {
    let Some(_permit) = inner.gate.try_acquire() else {
        return ShowOutcome::Skipped;
    };

    // One config read per attempt; never re-read across the await below.
    let config = inner.store.current();

    let ad = match inner.api.serve_ad(&inner.app_id, &config.categories).await {
        Ok(Some(ad)) => ad,
        Ok(None) => {
            debug!("no fill for this attempt");
            return ShowOutcome::NoFill;
        }
        Err(err) => {
            debug!(error = %err, "ad fetch failed");
            return ShowOutcome::Failed;
        }
    };

    let placement = AdPlacement {
        video_url: ad.video_url,
        target_url: ad.target_url,
        dismiss_delay_seconds: config.dismiss_delay(),
    };
    match inner.presenter.present(placement) {
        Ok(()) => ShowOutcome::Shown,
        Err(err) => {
            warn!(error = %err, "presentation handoff failed");
            ShowOutcome::Failed
        }
    }
}
