//! Budget command - average transaction amount per category

use anyhow::Result;
use colored::Colorize;

use super::get_context;
use crate::output;

pub async fn run(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let budget = ctx.budget_service().monthly_budget().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&budget)?);
        return Ok(());
    }

    if budget.is_empty() {
        output::warning("No transactions stored. Run 'finsync sync' first.");
        return Ok(());
    }

    println!("{}", "Monthly Budget".bold());
    println!();

    let mut table = output::create_table();
    table.set_header(vec!["Category", "Average"]);
    for (category, mean) in budget.iter() {
        table.add_row(vec![category.clone(), output::format_amount(*mean)]);
    }
    println!("{}", table);
    Ok(())
}
