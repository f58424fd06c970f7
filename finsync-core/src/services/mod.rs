//! Service layer - business logic orchestration
//!
//! One service per workflow step. Services hold the store and API handles
//! they need and never reach for global state.

mod budget;
mod exchange;
pub mod migration;
mod provision;
mod status;
mod sync;

pub use budget::BudgetService;
pub use exchange::{ExchangeResult, TokenExchanger};
pub use migration::{MigrationResult, MigrationService};
pub use provision::{ProvisionResult, TokenProvisioner};
pub use status::{DateSpan, StatusService, StatusSummary};
pub use sync::{SyncResult, TransactionSyncService};

use crate::domain::result::Result;
use crate::ports::{Collection, DocumentStore, WriteBatch};

/// Delete every document in a collection as one batch
///
/// Returns the number of documents deleted.
pub(crate) async fn clear_collection(
    store: &dyn DocumentStore,
    collection: Collection,
) -> Result<usize> {
    let mut batch = WriteBatch::new();
    for doc in store.get_all(collection).await? {
        batch.delete(collection, doc.id);
    }
    let cleared = batch.len();
    store.commit(batch).await?;
    Ok(cleared)
}
