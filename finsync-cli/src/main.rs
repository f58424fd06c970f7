//! Finsync CLI - bank-data sync and budgeting from the terminal

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod output;

use commands::{budget, demo, exchange, provision, serve, status, sync};

const SERVE_LOG_FILTER: &str = "finsync=info,tower_http=info";
const COMMAND_LOG_FILTER: &str = "finsync=warn";

/// Finsync - link bank items, sync transactions and compute budgets
#[derive(Parser)]
#[command(name = "finsync", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve {
        /// Address to bind (overrides settings)
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on (overrides settings)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Replace public tokens with fresh sandbox tokens
    Provision {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Exchange stored public tokens for access tokens
    Exchange {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Fetch transactions for every access token
    Sync {
        /// First day to fetch (YYYY-MM-DD, default 30 days ago)
        #[arg(long)]
        start_date: Option<String>,
        /// Last day to fetch (YYYY-MM-DD, default today)
        #[arg(long)]
        end_date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Average transaction amount per category
    Budget {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show stored tokens and transactions
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage demo mode
    Demo {
        #[command(subcommand)]
        command: Option<demo::DemoCommands>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(match cli.command {
        Commands::Serve { .. } => SERVE_LOG_FILTER,
        _ => COMMAND_LOG_FILTER,
    });

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<finsync_core::Error>() {
                Some(finsync_core::Error::NotFound(msg)) => output::warning(msg),
                _ => output::error(&format!("{:#}", e)),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Serve { host, port } => serve::run(host, port).await,
        Commands::Provision { json } => provision::run(json).await,
        Commands::Exchange { json } => exchange::run(json).await,
        Commands::Sync { start_date, end_date, json } => sync::run(start_date, end_date, json).await,
        Commands::Budget { json } => budget::run(json).await,
        Commands::Status { json } => status::run(json).await,
        Commands::Demo { command } => demo::run(command),
    }
}

/// Logs go to stderr; `FINSYNC_LOG_FORMAT=json` switches to JSON lines
fn init_logging(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());
    let json = std::env::var("FINSYNC_LOG_FORMAT").is_ok_and(|format| format == "json");

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_flag_on_workflow_and_status_commands() {
        for command in ["provision", "exchange", "sync", "budget", "status"] {
            assert!(
                Cli::try_parse_from(["finsync", command, "--json"]).is_ok(),
                "{} should accept --json",
                command
            );
        }
    }

    #[test]
    fn test_serve_and_demo_have_no_json_flag() {
        assert!(Cli::try_parse_from(["finsync", "serve", "--json"]).is_err());
        assert!(Cli::try_parse_from(["finsync", "demo", "status", "--json"]).is_err());
        assert!(Cli::try_parse_from(["finsync", "demo", "status"]).is_ok());
    }
}
