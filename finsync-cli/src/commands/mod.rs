//! CLI command implementations

pub mod budget;
pub mod demo;
pub mod exchange;
pub mod provision;
pub mod serve;
pub mod status;
pub mod sync;

use std::path::PathBuf;

use anyhow::{Context, Result};
use finsync_core::FinsyncContext;

/// Get the finsync directory from environment or default
pub fn get_finsync_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("FINSYNC_DIR") {
        return Ok(PathBuf::from(dir));
    }
    let home = dirs::home_dir().context("Could not find home directory (set FINSYNC_DIR)")?;
    Ok(home.join(".finsync"))
}

/// Build a context from the settings in the finsync directory
pub fn get_context() -> Result<FinsyncContext> {
    let finsync_dir = get_finsync_dir()?;
    FinsyncContext::new(&finsync_dir).context("Failed to initialize finsync context")
}
