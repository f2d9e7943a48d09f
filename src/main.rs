use anyhow::Result;
use clap::{Parser, Subcommand};
use jobboard_api::{config::Config, migration, server, telemetry};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "jobboard-api", version, about = "Job board REST API")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Apply pending migrations and serve HTTP (default)
    Serve,
    /// Create the database if needed and apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        error!("{:#}", e);
        // The subscriber may not be installed if configuration failed
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::from_env()?;
    let prometheus_handle = telemetry::init(&config.telemetry);

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            info!("Starting Jobs API");
            server::run(config, prometheus_handle).await
        }
        Command::Migrate => migration::run_migrations(&config).await,
    }
}
