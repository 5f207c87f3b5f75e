//! Siteship CLI tool.

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "siteship")]
#[command(about = "Siteship publishing CLI", long_about = None)]
struct Cli {
    /// API server URL
    #[arg(long, env = "SITESHIP_API_URL", default_value = "http://localhost:3000")]
    api_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Publish a subscription's site
    Publish {
        /// Subscription ID
        subscription_id: String,
    },
    /// Show the latest publish status for a subscription
    Status {
        /// Subscription ID
        subscription_id: String,
    },
    /// Push a directory of files through a deploy configuration
    Deploy {
        /// Deploy configuration ID
        #[arg(long)]
        config: String,
        /// Directory holding the generated site
        #[arg(long, default_value = "./site")]
        dir: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Publish { subscription_id } => {
            commands::publish(&cli.api_url, &subscription_id).await?;
        }
        Commands::Status { subscription_id } => {
            commands::status(&cli.api_url, &subscription_id).await?;
        }
        Commands::Deploy { config, dir } => {
            commands::deploy::run(&cli.api_url, &config, &dir).await?;
        }
    }

    Ok(())
}
