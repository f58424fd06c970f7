//! Provision service - fresh sandbox public tokens for the configured institutions

use std::sync::Arc;

use serde::Serialize;

use super::clear_collection;
use crate::domain::result::Result;
use crate::domain::{redact, PublicToken};
use crate::ports::{Collection, DocumentStore, FinancialDataApi};

/// Outcome of a provisioning run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvisionResult {
    /// Institutions a token was created for, in request order
    pub institutions: Vec<String>,
    pub tokens_created: usize,
    pub tokens_cleared: usize,
}

/// Replaces all public tokens with one new sandbox token per institution
pub struct TokenProvisioner {
    store: Arc<dyn DocumentStore>,
    api: Arc<dyn FinancialDataApi>,
    institution_ids: Vec<String>,
    products: Vec<String>,
}

impl TokenProvisioner {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        api: Arc<dyn FinancialDataApi>,
        institution_ids: Vec<String>,
        products: Vec<String>,
    ) -> Self {
        Self {
            store,
            api,
            institution_ids,
            products,
        }
    }

    /// Delete every stored public token, then create and store one per institution
    ///
    /// Institutions are handled one at a time. A failure stops the run; tokens
    /// already stored for earlier institutions are kept.
    pub async fn provision(&self) -> Result<ProvisionResult> {
        let tokens_cleared = clear_collection(self.store.as_ref(), Collection::PublicTokens).await?;
        tracing::info!(tokens_cleared, "Cleared public tokens");

        let mut institutions = Vec::with_capacity(self.institution_ids.len());
        for institution_id in &self.institution_ids {
            let token = self
                .api
                .create_sandbox_public_token(institution_id, &self.products)
                .await?;
            tracing::debug!(
                institution_id = %institution_id,
                public_token = %redact(&token),
                "Created sandbox public token"
            );

            self.store
                .create(
                    Collection::PublicTokens,
                    serde_json::to_value(PublicToken::new(token))?,
                )
                .await?;
            institutions.push(institution_id.clone());
        }

        tracing::info!(
            provider = self.api.name(),
            tokens_created = institutions.len(),
            "Provisioned public tokens"
        );

        Ok(ProvisionResult {
            tokens_created: institutions.len(),
            institutions,
            tokens_cleared,
        })
    }
}
