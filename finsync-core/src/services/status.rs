//! Status service - collection counts and transaction date span

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::result::Result;
use crate::ports::{Collection, DocumentStore};

/// Status service for a read-only overview of the stored data
pub struct StatusService {
    store: Arc<dyn DocumentStore>,
}

impl StatusService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Get overall status summary
    pub async fn status(&self) -> Result<StatusSummary> {
        let public_tokens = self.store.count(Collection::PublicTokens).await?;
        let access_tokens = self.store.count(Collection::AccessTokens).await?;
        let transactions = self.store.get_all(Collection::Transactions).await?;

        // Dates are read leniently; a missing or odd date is just not counted
        let dates: Vec<NaiveDate> = transactions
            .iter()
            .filter_map(|doc| doc.data.get("date")?.as_str())
            .filter_map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
            .collect();

        Ok(StatusSummary {
            public_tokens,
            access_tokens,
            transactions: transactions.len(),
            date_range: DateSpan {
                earliest: dates.iter().min().copied(),
                latest: dates.iter().max().copied(),
            },
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusSummary {
    pub public_tokens: usize,
    pub access_tokens: usize,
    pub transactions: usize,
    pub date_range: DateSpan,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateSpan {
    pub earliest: Option<NaiveDate>,
    pub latest: Option<NaiveDate>,
}
