//! Provision command - fresh sandbox public tokens

use anyhow::Result;

use super::get_context;
use crate::output;

pub async fn run(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let result = ctx.token_provisioner().provision().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    output::success(&format!(
        "Created {} public token(s), cleared {}",
        result.tokens_created, result.tokens_cleared
    ));
    for institution in &result.institutions {
        println!("  • {}", institution);
    }
    Ok(())
}
