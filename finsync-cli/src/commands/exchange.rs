//! Exchange command - public tokens to access tokens

use anyhow::Result;

use super::get_context;
use crate::output;

pub async fn run(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let result = ctx.token_exchanger().exchange().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    output::success(&format!(
        "Exchanged {} public token(s), replaced {} access token(s)",
        result.tokens_exchanged, result.tokens_replaced
    ));
    Ok(())
}
