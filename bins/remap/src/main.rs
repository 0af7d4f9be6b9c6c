mod cmd;

use clap::{Parser, Subcommand};

use remap_engine::config::RemapConfig;
use remap_platform::client::PlatformClient;

#[derive(Parser)]
#[command(name = "remap", about = "Schema auto-mapping engine for event-type field trees")]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(long, default_value = "config.toml", env = "REMAP_CONFIG")]
    config: String,

    /// Platform account email.
    #[arg(long, env = "REMAP_EMAIL")]
    email: String,

    /// Platform account password.
    #[arg(long, env = "REMAP_PASSWORD")]
    password: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Map unmapped event types: classify fields, create destination tables,
    /// commit mappings.
    Map,
    /// Recommit event types stuck between states, dropping untypeable fields.
    Repair,
    /// Drop blacklisted columns from already-mapped event types.
    Scrub,
    /// Delete mapped event-type definitions matching the include filter.
    Purge {
        /// Actually delete. Without this flag the candidates are only listed.
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    tracing::info!(config = %cli.config, "loading configuration");
    let config = match RemapConfig::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, "failed to load config");
            std::process::exit(1);
        }
    };

    let client = match PlatformClient::new(&config.platform.base_url) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, "failed to build platform client");
            std::process::exit(1);
        }
    };

    if let Err(e) = client.login(&cli.email, &cli.password).await {
        tracing::error!(error = %e, "login failed");
        std::process::exit(1);
    }

    let result = match cli.command {
        Command::Map => cmd::map::run(&config, &client).await,
        Command::Repair => cmd::repair::run(&config, &client).await,
        Command::Scrub => cmd::scrub::run(&config, &client).await,
        Command::Purge { force } => cmd::purge::run(&config, &client, force).await,
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "run failed");
        std::process::exit(1);
    }
}
