mod check_cmd;
mod run_cmd;

use anyhow::Result;
use clap::{Parser, Subcommand};

use ackwatch_config::AckwatchConfig;

#[derive(Parser)]
#[command(name = "ackwatch")]
#[command(about = "ackwatch: announcement acknowledgment tracking and escalation")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect to Discord and start tracking (default)
    Run,
    /// Validate the environment configuration and exit
    CheckConfig {
        /// Print the effective configuration as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Configuration errors are fatal before anything connects.
    let config = match AckwatchConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("ackwatch: {e}");
            std::process::exit(2);
        }
    };

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_cmd::run(config).await?,
        Commands::CheckConfig { json } => check_cmd::run(&config, json)?,
    }

    Ok(())
}
