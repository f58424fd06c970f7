//! Exchange service - public tokens to durable access tokens

use std::sync::Arc;

use serde::Serialize;

use super::clear_collection;
use crate::domain::result::{Error, Result};
use crate::domain::{redact, AccessToken, PublicToken};
use crate::ports::{Collection, DocumentStore, FinancialDataApi, WriteBatch};

/// Outcome of an exchange run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExchangeResult {
    pub tokens_exchanged: usize,
    /// Access tokens from the previous run that were deleted
    pub tokens_replaced: usize,
}

/// Turns every stored public token into an access token
pub struct TokenExchanger {
    store: Arc<dyn DocumentStore>,
    api: Arc<dyn FinancialDataApi>,
}

impl TokenExchanger {
    pub fn new(store: Arc<dyn DocumentStore>, api: Arc<dyn FinancialDataApi>) -> Self {
        Self { store, api }
    }

    /// Replace all access tokens with exchanges of the stored public tokens
    ///
    /// Returns [`Error::NotFound`] without touching anything when there are
    /// no public tokens. Old access tokens are deleted in their own batch
    /// first; the new ones are written in a single batch once every exchange
    /// has succeeded, so a failed exchange leaves no access tokens at all.
    pub async fn exchange(&self) -> Result<ExchangeResult> {
        let public_tokens = self
            .store
            .get_all(Collection::PublicTokens)
            .await?
            .into_iter()
            .map(|doc| serde_json::from_value::<PublicToken>(doc.data))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        if public_tokens.is_empty() {
            return Err(Error::not_found("No public tokens found"));
        }

        let tokens_replaced = clear_collection(self.store.as_ref(), Collection::AccessTokens).await?;
        tracing::info!(tokens_replaced, "Cleared access tokens");

        let mut batch = WriteBatch::new();
        for public_token in &public_tokens {
            let access_token = self.api.exchange_public_token(&public_token.token).await?;
            tracing::debug!(access_token = %redact(&access_token), "Exchanged public token");
            batch.create(
                Collection::AccessTokens,
                serde_json::to_value(AccessToken::new(access_token))?,
            );
        }
        let tokens_exchanged = batch.len();
        self.store.commit(batch).await?;

        tracing::info!(
            provider = self.api.name(),
            tokens_exchanged,
            "Stored access tokens"
        );

        Ok(ExchangeResult {
            tokens_exchanged,
            tokens_replaced,
        })
    }
}
