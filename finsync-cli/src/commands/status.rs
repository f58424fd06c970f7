//! Status command - stored tokens and transactions

use anyhow::Result;
use colored::Colorize;

use super::get_context;
use crate::output;

pub async fn run(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let status = ctx.status_service().status().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("{}", "Finsync Status".bold());
    println!();

    let mut table = output::create_table();
    table.add_row(vec!["Public tokens".to_string(), status.public_tokens.to_string()]);
    table.add_row(vec!["Access tokens".to_string(), status.access_tokens.to_string()]);
    table.add_row(vec!["Transactions".to_string(), status.transactions.to_string()]);
    table.add_row(vec!["Provider".to_string(), ctx.api.name().to_string()]);
    if let Some(db_path) = ctx.db_path() {
        table.add_row(vec!["Database".to_string(), db_path.display().to_string()]);
    } else {
        table.add_row(vec!["Database".to_string(), "in memory".to_string()]);
    }
    println!("{}", table);

    if let (Some(earliest), Some(latest)) = (status.date_range.earliest, status.date_range.latest) {
        println!();
        println!("Date range: {} to {}", earliest, latest);
    }

    if ctx.config.demo_mode {
        println!();
        println!("Demo mode is {}", "ON".green());
    }

    Ok(())
}
