//! Financial data API port
//!
//! Defines the interface to the remote banking-data aggregation service
//! (Plaid, or the offline demo stand-in).

use async_trait::async_trait;

use crate::domain::result::Result;
use crate::domain::{DateRange, Transaction};

/// Remote financial-data API
///
/// The service is treated as already authenticated; credentials are a
/// concern of the implementation's constructor.
#[async_trait]
pub trait FinancialDataApi: Send + Sync {
    /// Provider name (e.g., "plaid", "demo")
    fn name(&self) -> &str;

    /// Create a sandbox public token for an institution
    async fn create_sandbox_public_token(
        &self,
        institution_id: &str,
        products: &[String],
    ) -> Result<String>;

    /// Exchange a public token for a durable access token
    async fn exchange_public_token(&self, public_token: &str) -> Result<String>;

    /// Fetch the transactions of one item in a date range
    async fn get_transactions(
        &self,
        access_token: &str,
        range: &DateRange,
    ) -> Result<Vec<Transaction>>;
}
