use clap::Subcommand;
use interlude_core::{AdsClient, Preferences, TriggerKind};

use super::BackendArgs;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Fetch and print the stored trigger config
    Get {
        #[command(flatten)]
        backend: BackendArgs,
    },
    /// Push a preference override and print the server's echo
    Set {
        #[command(flatten)]
        backend: BackendArgs,
        /// Ad categories (comma separated); empty keeps the current set
        #[arg(long, value_delimiter = ',')]
        categories: Vec<String>,
        /// Trigger type: CLICKS or INTERVAL
        #[arg(long)]
        trigger: String,
        /// Click threshold (CLICKS mode)
        #[arg(long)]
        count: Option<u32>,
        /// Cadence in seconds (INTERVAL mode)
        #[arg(long)]
        seconds: Option<u64>,
        /// Dismiss-control delay in seconds (5-30)
        #[arg(long)]
        dismiss_delay: Option<u32>,
    },
}

pub async fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { backend } => {
            let client = AdsClient::new(&backend.base_url)?;
            let config = client.fetch_config(&backend.app_id).await?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigAction::Set {
            backend,
            categories,
            trigger,
            count,
            seconds,
            dismiss_delay,
        } => {
            let client = AdsClient::new(&backend.base_url)?;
            let current = client.fetch_config(&backend.app_id).await?;
            let prefs = Preferences {
                categories,
                trigger_kind: TriggerKind::from(trigger),
                click_count: count,
                interval_seconds: seconds,
                dismiss_delay_seconds: dismiss_delay,
            };
            let requested = current.apply_preferences(&prefs);
            let echoed = client.push_config(&backend.app_id, &requested).await?;
            println!("{}", serde_json::to_string_pretty(&echoed)?);
        }
    }
    Ok(())
}
