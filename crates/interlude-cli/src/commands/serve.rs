use clap::Args;
use interlude_core::AdsClient;

use super::BackendArgs;

#[derive(Args)]
pub struct ServeArgs {
    #[command(flatten)]
    pub backend: BackendArgs,
    /// Categories to filter by (comma separated); empty means all
    #[arg(long, value_delimiter = ',')]
    pub categories: Vec<String>,
}

pub async fn run(args: ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let client = AdsClient::new(&args.backend.base_url)?;
    match client.serve_ad(&args.backend.app_id, &args.categories).await? {
        Some(ad) => println!("{}", serde_json::to_string_pretty(&ad)?),
        None => println!("no fill"),
    }
    Ok(())
}
