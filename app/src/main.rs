#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

mod command;

use clap::{Parser, Subcommand};
use command::{
    CommandStrategy, InfoStrategy, RunInput, RunStrategy, ServeInput, ServeStrategy,
    VersionStrategy,
};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "botsim")]
#[command(about = "Drive simulated conversations against a remote bot", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one simulation and print the transcript
    Run {
        /// Seed message sent to the bot
        #[arg(default_value = "sẵn sàng")]
        initial_message: String,

        /// Number of user messages, seed included
        #[arg(default_value_t = 3, allow_negative_numbers = true)]
        turns: i64,

        /// Bot configuration to converse with
        #[arg(short, long)]
        bot_id: Option<i64>,
    },
    /// Serve the simulation HTTP API
    Serve {
        /// Listen address, e.g. 0.0.0.0:8000
        #[arg(short, long)]
        addr: Option<String>,
    },
    /// Show effective configuration
    Info,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            initial_message,
            turns,
            bot_id,
        } => {
            RunStrategy
                .execute(RunInput {
                    initial_message,
                    turns,
                    bot_id,
                })
                .await?;
        }
        Commands::Serve { addr } => {
            ServeStrategy.execute(ServeInput { addr }).await?;
        }
        Commands::Info => InfoStrategy.execute(()).await?,
        Commands::Version => VersionStrategy.execute(()).await?,
    }

    Ok(())
}
