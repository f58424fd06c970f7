//! Budget service - mean transaction amount per category

use std::sync::Arc;

use crate::domain::result::{Error, Result};
use crate::domain::{MonthlyBudget, Transaction};
use crate::ports::{Collection, DocumentStore};

pub struct BudgetService {
    store: Arc<dyn DocumentStore>,
}

impl BudgetService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Aggregate every stored transaction by primary category
    ///
    /// Any document that does not decode as a transaction fails the whole
    /// calculation.
    pub async fn monthly_budget(&self) -> Result<MonthlyBudget> {
        let transactions = self
            .store
            .get_all(Collection::Transactions)
            .await?
            .into_iter()
            .map(|doc| {
                serde_json::from_value::<Transaction>(doc.data).map_err(|e| {
                    Error::validation(format!("Transaction document '{}' is invalid: {}", doc.id, e))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let budget = MonthlyBudget::from_transactions(&transactions)?;
        tracing::info!(
            transactions = transactions.len(),
            categories = budget.len(),
            "Calculated monthly budget"
        );
        Ok(budget)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryDocumentStore;
    use crate::domain::UNCATEGORIZED;
    use rust_decimal::Decimal;
    use serde_json::{json, Value as JsonValue};

    async fn store_with(docs: Vec<(&str, JsonValue)>) -> Arc<MemoryDocumentStore> {
        let store = Arc::new(MemoryDocumentStore::new());
        for (id, data) in docs {
            store.set(Collection::Transactions, id, data).await.unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_mean_per_first_category() {
        let store = store_with(vec![
            ("t1", json!({"transaction_id": "t1", "amount": 10, "category": ["food", "cafe"]})),
            ("t2", json!({"transaction_id": "t2", "amount": 30, "category": ["food"]})),
            ("t3", json!({"transaction_id": "t3", "amount": 100, "category": ["travel"]})),
        ])
        .await;
        let service = BudgetService::new(store);

        let budget = service.monthly_budget().await.unwrap();
        assert_eq!(
            serde_json::to_value(&budget).unwrap(),
            json!({"food": 20.0, "travel": 100.0})
        );

        // Unchanged input, same output
        assert_eq!(service.monthly_budget().await.unwrap(), budget);
    }

    #[tokio::test]
    async fn test_missing_or_empty_category_goes_to_uncategorized() {
        let store = store_with(vec![
            ("t1", json!({"transaction_id": "t1", "amount": 4, "category": []})),
            ("t2", json!({"transaction_id": "t2", "amount": "8", "category": null})),
            ("t3", json!({"transaction_id": "t3", "amount": 6})),
        ])
        .await;

        let budget = BudgetService::new(store).monthly_budget().await.unwrap();
        assert_eq!(budget.len(), 1);
        assert_eq!(budget.get(UNCATEGORIZED), Some(Decimal::from(6)));
    }

    #[tokio::test]
    async fn test_empty_collection_gives_empty_budget() {
        let store = store_with(vec![]).await;
        let budget = BudgetService::new(store).monthly_budget().await.unwrap();
        assert!(budget.is_empty());
        assert_eq!(serde_json::to_value(&budget).unwrap(), json!({}));
    }

    #[tokio::test]
    async fn test_undecodable_document_fails_without_partial_result() {
        let store = store_with(vec![
            ("t1", json!({"transaction_id": "t1", "amount": 10, "category": ["food"]})),
            ("t2", json!({"transaction_id": "t2", "amount": "lots"})),
        ])
        .await;

        let err = BudgetService::new(store).monthly_budget().await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(err.to_string().contains("t2"));
    }

    #[tokio::test]
    async fn test_overflowing_category_total_fails() {
        let store = store_with(vec![
            ("t1", json!({"transaction_id": "t1", "amount": 5e28, "category": ["big"]})),
            ("t2", json!({"transaction_id": "t2", "amount": "5e28", "category": ["big"]})),
        ])
        .await;

        let err = BudgetService::new(store).monthly_budget().await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }
}
