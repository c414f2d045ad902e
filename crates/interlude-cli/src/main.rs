use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "interlude-cli", version, about = "Interlude ads CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Remote trigger configuration
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Request a single ad from the backend
    Serve(commands::serve::ServeArgs),
    /// Run the engine against the backend with a scripted session
    Simulate(commands::simulate::SimulateArgs),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Config { action } => commands::config::run(action).await,
        Commands::Serve(args) => commands::serve::run(args).await,
        Commands::Simulate(args) => commands::simulate::run(args).await,
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
