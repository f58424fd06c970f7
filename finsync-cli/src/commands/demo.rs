//! Demo command - manage demo mode

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use finsync_core::config::Config;

use super::get_finsync_dir;

#[derive(Subcommand)]
pub enum DemoCommands {
    /// Enable demo mode
    #[command(name = "on")]
    On,
    /// Disable demo mode
    #[command(name = "off")]
    Off,
    /// Show demo mode status
    Status,
}

pub fn run(command: Option<DemoCommands>) -> Result<()> {
    let finsync_dir = get_finsync_dir()?;
    // Environment overrides are left out so they never end up in the file
    let mut config = Config::load_file(&finsync_dir)?;

    match command {
        Some(DemoCommands::On) => {
            config.demo_mode = true;
            config.save(&finsync_dir)?;
            println!("{}", "Demo mode enabled".green());
            println!("Run 'finsync provision' to start the demo workflow.");
        }
        Some(DemoCommands::Off) => {
            config.demo_mode = false;
            config.save(&finsync_dir)?;
            println!("{}", "Demo mode disabled".yellow());
        }
        Some(DemoCommands::Status) | None => {
            if config.demo_mode {
                println!("Demo mode is {}", "ON".green());
            } else {
                println!("Demo mode is {}", "OFF".yellow());
            }
        }
    }
    Ok(())
}
