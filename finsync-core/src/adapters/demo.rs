//! Demo financial data API
//!
//! Deterministic offline stand-in for Plaid, used in demo mode and tests:
//! - public tokens are `public-demo-<institution>-<n>`
//! - exchange turns `public-...` into `access-...`
//! - transactions come from a per-token script, or from a fixed catalogue
//!   dated at the start of the requested range

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::Value as JsonValue;

use crate::domain::result::{Error, Result};
use crate::domain::{DateRange, Transaction};
use crate::ports::FinancialDataApi;

/// A call received by the demo API
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DemoCall {
    CreatePublicToken {
        institution_id: String,
        products: Vec<String>,
    },
    ExchangePublicToken {
        public_token: String,
    },
    GetTransactions {
        access_token: String,
        range: DateRange,
    },
}

#[derive(Debug, Default)]
struct DemoState {
    tokens_issued: u64,
    scripted: HashMap<String, Vec<Transaction>>,
    failures: HashSet<String>,
    calls: Vec<DemoCall>,
}

/// Offline financial data API
#[derive(Debug, Default)]
pub struct DemoFinancialApi {
    state: Mutex<DemoState>,
}

impl DemoFinancialApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style variant of [`script_transactions`](Self::script_transactions)
    pub fn with_transactions(self, access_token: &str, transactions: Vec<Transaction>) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state.scripted.insert(access_token.to_string(), transactions);
        }
        self
    }

    /// Answer `get_transactions` for `access_token` with exactly these transactions
    pub fn script_transactions(&self, access_token: &str, transactions: Vec<Transaction>) -> Result<()> {
        self.lock()?
            .scripted
            .insert(access_token.to_string(), transactions);
        Ok(())
    }

    /// Make every call whose input equals `input` fail
    ///
    /// `input` is matched against the institution id, public token or
    /// access token of the call.
    pub fn fail_on(&self, input: &str) -> Result<()> {
        self.lock()?.failures.insert(input.to_string());
        Ok(())
    }

    /// Calls received so far, in order
    pub fn calls(&self) -> Vec<DemoCall> {
        self.state
            .lock()
            .map(|s| s.calls.clone())
            .unwrap_or_default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, DemoState>> {
        self.state
            .lock()
            .map_err(|_| Error::Other("Demo API state lock poisoned".to_string()))
    }

    /// Record a call and fail it if its input was marked
    fn record(&self, call: DemoCall, input: &str) -> Result<MutexGuard<'_, DemoState>> {
        let mut state = self.lock()?;
        state.calls.push(call);
        if state.failures.contains(input) {
            return Err(Error::remote(format!(
                "Demo API failure injected for '{}'",
                input
            )));
        }
        Ok(state)
    }
}

/// Fixed transaction catalogue: (name, amount in cents, category)
const CATALOGUE: &[(&str, i64, &[&str])] = &[
    ("Corner Cafe", 1250, &["Food and Drink", "Restaurants", "Coffee Shop"]),
    ("Fresh Market", 8420, &["Food and Drink", "Groceries"]),
    ("United Airlines", 50000, &["Travel", "Airlines and Aviation Services"]),
    ("Uber", 1875, &["Travel", "Taxi"]),
    ("ACME Corp Payroll", -250000, &["Transfer", "Payroll"]),
    ("ATM Withdrawal", 6000, &[]),
];

/// Generate the catalogue transactions for one access token
///
/// Ids are derived from the token, so two tokens never share an id and the
/// same token always gets the same ids.
pub fn generate_demo_transactions(access_token: &str, range: &DateRange) -> Vec<Transaction> {
    let date = NaiveDate::parse_from_str(range.start_date.trim(), "%Y-%m-%d").ok();
    let account_id = format!("demo-account-{}", token_suffix(access_token));

    CATALOGUE
        .iter()
        .enumerate()
        .map(|(i, (name, cents, category))| {
            let tx = Transaction::new(
                format!("demo-{}-{}", token_suffix(access_token), i + 1),
                Decimal::new(*cents, 2),
            )
            .with_category(category.iter().copied())
            .with_field("name", JsonValue::from(*name))
            .with_field("account_id", JsonValue::from(account_id.clone()));
            match date {
                Some(date) => tx.with_date(date),
                None => tx,
            }
        })
        .collect()
}

/// Token without its `public-` / `access-` prefix
fn token_suffix(token: &str) -> &str {
    token
        .strip_prefix("access-")
        .or_else(|| token.strip_prefix("public-"))
        .unwrap_or(token)
}

#[async_trait]
impl FinancialDataApi for DemoFinancialApi {
    fn name(&self) -> &str {
        "demo"
    }

    async fn create_sandbox_public_token(
        &self,
        institution_id: &str,
        products: &[String],
    ) -> Result<String> {
        let mut state = self.record(
            DemoCall::CreatePublicToken {
                institution_id: institution_id.to_string(),
                products: products.to_vec(),
            },
            institution_id,
        )?;
        state.tokens_issued += 1;
        Ok(format!(
            "public-demo-{}-{}",
            institution_id, state.tokens_issued
        ))
    }

    async fn exchange_public_token(&self, public_token: &str) -> Result<String> {
        let _state = self.record(
            DemoCall::ExchangePublicToken {
                public_token: public_token.to_string(),
            },
            public_token,
        )?;
        match public_token.strip_prefix("public-") {
            Some(rest) => Ok(format!("access-{}", rest)),
            None => Err(Error::remote(format!(
                "Demo API cannot exchange '{}': not a public token",
                public_token
            ))),
        }
    }

    async fn get_transactions(
        &self,
        access_token: &str,
        range: &DateRange,
    ) -> Result<Vec<Transaction>> {
        let state = self.record(
            DemoCall::GetTransactions {
                access_token: access_token.to_string(),
                range: range.clone(),
            },
            access_token,
        )?;
        Ok(match state.scripted.get(access_token) {
            Some(txs) => txs.clone(),
            None => generate_demo_transactions(access_token, range),
        })
    }
}
