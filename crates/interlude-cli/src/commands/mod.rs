pub mod config;
pub mod serve;
pub mod simulate;

use clap::Args;

/// Backend connection parameters shared by every command.
#[derive(Args, Debug, Clone)]
pub struct BackendArgs {
    /// Ads backend base URL
    #[arg(long, default_value = "http://127.0.0.1:5000")]
    pub base_url: String,
    /// Application identifier
    #[arg(long, default_value = "demo_app")]
    pub app_id: String,
}
