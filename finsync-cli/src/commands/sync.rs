//! Sync command - fetch transactions for every access token

use anyhow::{Context, Result};
use chrono::{Duration, Local, NaiveDate};
use colored::Colorize;
use finsync_core::DateRange;

use super::get_context;
use crate::output;

const DEFAULT_LOOKBACK_DAYS: i64 = 30;

pub async fn run(start_date: Option<String>, end_date: Option<String>, json: bool) -> Result<()> {
    let range = resolve_range(start_date, end_date, Local::now().date_naive())?;

    let ctx = get_context()?;
    let result = ctx.transaction_sync().sync(&range).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    output::success(&format!(
        "Stored {} transaction(s) from {} access token(s)",
        result.transactions_stored, result.access_tokens
    ));
    println!("  Date range: {} to {}", range.start_date, range.end_date);
    println!("  {} {}", "Previously stored:".dimmed(), result.transactions_cleared);
    Ok(())
}

/// Missing dates default to the `DEFAULT_LOOKBACK_DAYS` ending on `today`
///
/// Given dates are passed through as typed; only the default start date is
/// derived from an explicit end date, which then has to parse.
fn resolve_range(
    start_date: Option<String>,
    end_date: Option<String>,
    today: NaiveDate,
) -> Result<DateRange> {
    let end_date = end_date.unwrap_or_else(|| today.format("%Y-%m-%d").to_string());
    let start_date = match start_date {
        Some(start) => start,
        None => {
            let end = NaiveDate::parse_from_str(&end_date, "%Y-%m-%d")
                .with_context(|| format!("Invalid end date: {}", end_date))?;
            (end - Duration::days(DEFAULT_LOOKBACK_DAYS))
                .format("%Y-%m-%d")
                .to_string()
        }
    };
    Ok(DateRange::new(start_date, end_date))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    #[test]
    fn test_defaults_to_last_thirty_days() {
        let range = resolve_range(None, None, today()).unwrap();
        assert_eq!(range, DateRange::new("2024-02-14", "2024-03-15"));
    }

    #[test]
    fn test_explicit_dates_pass_through() {
        let range = resolve_range(
            Some("2024-01-01".to_string()),
            Some("not-a-date".to_string()),
            today(),
        )
        .unwrap();
        assert_eq!(range, DateRange::new("2024-01-01", "not-a-date"));
    }

    #[test]
    fn test_start_derived_from_end() {
        let range = resolve_range(None, Some("2024-01-31".to_string()), today()).unwrap();
        assert_eq!(range.start_date, "2024-01-01");

        assert!(resolve_range(None, Some("01/31/2024".to_string()), today()).is_err());
    }
}
