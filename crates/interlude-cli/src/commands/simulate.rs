//! Drive a live engine against the backend with a scripted session:
//! foreground one surface, then either feed interactions (CLICKS) or let the
//! scheduler run (INTERVAL), printing every placement the presenter receives.

use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use interlude_core::{
    AdEngine, AdPlacement, AdPresenter, EngineConfig, ShowError, SurfaceHandle, TriggerKind,
};

use super::BackendArgs;

#[derive(Args)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub backend: BackendArgs,
    /// Interactions to feed in CLICKS mode
    #[arg(long, default_value_t = 20)]
    pub events: u32,
    /// Pause between interactions, in milliseconds
    #[arg(long, default_value_t = 200)]
    pub gap_ms: u64,
    /// How long to let the scheduler run in INTERVAL mode, in seconds
    #[arg(long, default_value_t = 30)]
    pub duration_secs: u64,
}

struct StdoutPresenter;

impl AdPresenter for StdoutPresenter {
    fn present(&self, placement: AdPlacement) -> Result<(), ShowError> {
        println!(
            "AD SHOWN: {} (target: {}, dismiss after {}s)",
            placement.video_url,
            placement.target_url.as_deref().unwrap_or("-"),
            placement.dismiss_delay_seconds,
        );
        Ok(())
    }
}

pub async fn run(args: SimulateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let engine = AdEngine::new(
        EngineConfig {
            base_url: args.backend.base_url.clone(),
            app_id: args.backend.app_id.clone(),
        },
        Arc::new(StdoutPresenter),
    )?;
    engine.start();

    let config = engine.refresh_config().await?;
    println!("active config: {}", serde_json::to_string(config.as_ref())?);

    let surface = SurfaceHandle::host(1);
    engine.surface_foregrounded(surface);

    match config.trigger.kind {
        TriggerKind::Clicks => {
            println!(
                "feeding {} interactions (threshold {})",
                args.events,
                config.click_threshold()
            );
            for i in 1..=args.events {
                engine.notify_interaction(surface);
                println!("interaction {i}");
                tokio::time::sleep(Duration::from_millis(args.gap_ms)).await;
            }
            // Let a trailing show attempt finish before tearing down.
            tokio::time::sleep(Duration::from_secs(1)).await;
        }
        TriggerKind::Interval => {
            println!(
                "interval mode ({}s cadence), running for {}s",
                config.interval_seconds(),
                args.duration_secs
            );
            tokio::time::sleep(Duration::from_secs(args.duration_secs)).await;
        }
        TriggerKind::Unknown => {
            println!("backend returned an unknown trigger type; nothing to do");
        }
    }

    engine.surface_backgrounded(surface);
    Ok(())
}
