//! Sync service - replace stored transactions with a fresh fetch

use std::sync::Arc;

use serde::Serialize;

use super::clear_collection;
use crate::domain::result::{Error, Result};
use crate::domain::{redact, AccessToken, DateRange};
use crate::ports::{Collection, DocumentStore, FinancialDataApi, WriteBatch};

/// Outcome of a sync run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncResult {
    /// Number of access tokens fetched for
    pub access_tokens: usize,
    pub transactions_cleared: usize,
    /// Transactions written across all tokens (same-id writes count each time)
    pub transactions_stored: usize,
}

/// Fetches transactions for every stored access token
pub struct TransactionSyncService {
    store: Arc<dyn DocumentStore>,
    api: Arc<dyn FinancialDataApi>,
}

impl TransactionSyncService {
    pub fn new(store: Arc<dyn DocumentStore>, api: Arc<dyn FinancialDataApi>) -> Self {
        Self { store, api }
    }

    /// Replace the transaction collection with the transactions in `range`
    ///
    /// Returns [`Error::NotFound`] when there are no access tokens. Existing
    /// transactions are deleted in one batch that completes before the first
    /// fetch. Each token's transactions are then written in their own batch,
    /// keyed by transaction id.
    pub async fn sync(&self, range: &DateRange) -> Result<SyncResult> {
        let access_tokens = self
            .store
            .get_all(Collection::AccessTokens)
            .await?
            .into_iter()
            .map(|doc| serde_json::from_value::<AccessToken>(doc.data))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        if access_tokens.is_empty() {
            return Err(Error::not_found("No access tokens found"));
        }

        let transactions_cleared =
            clear_collection(self.store.as_ref(), Collection::Transactions).await?;
        tracing::info!(transactions_cleared, "Cleared transactions");

        let mut transactions_stored = 0;
        for token in &access_tokens {
            let transactions = self
                .api
                .get_transactions(&token.access_token, range)
                .await?;

            let mut batch = WriteBatch::new();
            for tx in &transactions {
                batch.set(
                    Collection::Transactions,
                    tx.transaction_id(),
                    serde_json::to_value(tx)?,
                );
            }
            let stored = batch.len();
            self.store.commit(batch).await?;
            transactions_stored += stored;

            tracing::info!(
                access_token = %redact(&token.access_token),
                transactions = stored,
                "Stored transactions"
            );
        }

        tracing::info!(
            provider = self.api.name(),
            start_date = %range.start_date,
            end_date = %range.end_date,
            access_tokens = access_tokens.len(),
            transactions_stored,
            "Transaction sync complete"
        );

        Ok(SyncResult {
            access_tokens: access_tokens.len(),
            transactions_cleared,
            transactions_stored,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::demo::{DemoCall, DemoFinancialApi};
    use crate::adapters::memory::MemoryDocumentStore;
    use crate::domain::Transaction;
    use rust_decimal::Decimal;
    use serde_json::{json, Value as JsonValue};

    fn range() -> DateRange {
        DateRange::new("2024-01-01", "2024-01-31")
    }

    async fn seed_access_token(store: &MemoryDocumentStore, token: &str) {
        store
            .set(
                Collection::AccessTokens,
                token,
                json!({ "accessToken": token }),
            )
            .await
            .unwrap();
    }

    async fn transaction_ids(store: &MemoryDocumentStore) -> Vec<String> {
        store
            .get_all(Collection::Transactions)
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.id)
            .collect()
    }

    #[tokio::test]
    async fn test_no_access_tokens_is_not_found() {
        let store = Arc::new(MemoryDocumentStore::new());
        store
            .set(Collection::Transactions, "old", json!({}))
            .await
            .unwrap();
        let service = TransactionSyncService::new(store.clone(), Arc::new(DemoFinancialApi::new()));

        let err = service.sync(&range()).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(transaction_ids(&store).await, vec!["old".to_string()]);
    }

    #[tokio::test]
    async fn test_sync_replaces_transactions_from_every_token() {
        let store = Arc::new(MemoryDocumentStore::new());
        seed_access_token(&store, "a1").await;
        seed_access_token(&store, "a2").await;
        store
            .set(Collection::Transactions, "stale", json!({"transaction_id": "stale"}))
            .await
            .unwrap();

        let api = Arc::new(
            DemoFinancialApi::new()
                .with_transactions("a1", vec![Transaction::new("t1", Decimal::from(5))])
                .with_transactions("a2", vec![Transaction::new("t2", Decimal::from(7))]),
        );
        let service = TransactionSyncService::new(store.clone(), api.clone());

        let result = service.sync(&range()).await.unwrap();
        assert_eq!(
            result,
            SyncResult {
                access_tokens: 2,
                transactions_cleared: 1,
                transactions_stored: 2,
            }
        );
        assert_eq!(
            transaction_ids(&store).await,
            vec!["t1".to_string(), "t2".to_string()]
        );
        assert_eq!(
            api.calls(),
            vec![
                DemoCall::GetTransactions {
                    access_token: "a1".to_string(),
                    range: range(),
                },
                DemoCall::GetTransactions {
                    access_token: "a2".to_string(),
                    range: range(),
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_stored_document_keeps_full_payload() {
        let store = Arc::new(MemoryDocumentStore::new());
        seed_access_token(&store, "a1").await;
        let payload = json!({
            "transaction_id": "t1",
            "amount": 12.5,
            "category": ["Food and Drink"],
            "date": "2024-01-02",
            "merchant_name": "Cafe",
            "pending": false
        });
        let tx: Transaction = serde_json::from_value(payload.clone()).unwrap();
        let api = Arc::new(DemoFinancialApi::new().with_transactions("a1", vec![tx]));
        let service = TransactionSyncService::new(store.clone(), api);

        service.sync(&range()).await.unwrap();
        let docs = store.get_all(Collection::Transactions).await.unwrap();
        assert_eq!(docs[0].data, payload);
    }

    #[tokio::test]
    async fn test_stored_document_keeps_sparse_payload_verbatim() {
        let store = Arc::new(MemoryDocumentStore::new());
        seed_access_token(&store, "a1").await;
        let payloads = vec![
            json!({"transaction_id": "t1", "amount": "1.50"}),
            json!({"transaction_id": "t2", "amount": 3, "name": null, "date": null}),
        ];
        let txs = payloads
            .iter()
            .map(|p| serde_json::from_value::<Transaction>(p.clone()).unwrap())
            .collect();
        let api = Arc::new(DemoFinancialApi::new().with_transactions("a1", txs));

        TransactionSyncService::new(store.clone(), api)
            .sync(&range())
            .await
            .unwrap();

        let docs: Vec<JsonValue> = store
            .get_all(Collection::Transactions)
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.data)
            .collect();
        assert_eq!(docs, payloads);
    }

    #[tokio::test]
    async fn test_duplicate_ids_across_tokens_overwrite() {
        let store = Arc::new(MemoryDocumentStore::new());
        seed_access_token(&store, "a1").await;
        seed_access_token(&store, "a2").await;
        let api = Arc::new(
            DemoFinancialApi::new()
                .with_transactions("a1", vec![Transaction::new("t1", Decimal::from(1))])
                .with_transactions("a2", vec![Transaction::new("t1", Decimal::from(2))]),
        );
        let service = TransactionSyncService::new(store.clone(), api);

        let result = service.sync(&range()).await.unwrap();
        assert_eq!(result.transactions_stored, 2);

        let docs = store.get_all(Collection::Transactions).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].data["amount"], json!(2.0));
    }

    #[tokio::test]
    async fn test_failure_on_second_token_keeps_first_batch() {
        let store = Arc::new(MemoryDocumentStore::new());
        seed_access_token(&store, "a1").await;
        seed_access_token(&store, "a2").await;
        let api = Arc::new(
            DemoFinancialApi::new()
                .with_transactions("a1", vec![Transaction::new("t1", Decimal::from(1))]),
        );
        api.fail_on("a2").unwrap();
        let service = TransactionSyncService::new(store.clone(), api);

        assert!(service.sync(&range()).await.is_err());
        assert_eq!(transaction_ids(&store).await, vec!["t1".to_string()]);
    }
}
