//! Finsync Core - bank-data token lifecycle, transaction sync and budgeting
//!
//! This crate implements the core domain logic following hexagonal architecture:
//!
//! - **domain**: Core business entities (tokens, Transaction, MonthlyBudget)
//! - **ports**: Trait definitions for external dependencies (DocumentStore, FinancialDataApi)
//! - **services**: The workflow steps (provision, exchange, sync, budget) plus status
//! - **adapters**: Concrete implementations (DuckDB, in-memory, Plaid, demo)

pub mod adapters;
pub mod config;
pub mod domain;
pub mod migrations;
pub mod ports;
pub mod services;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use adapters::demo::DemoFinancialApi;
use adapters::duckdb::DuckDbDocumentStore;
use adapters::memory::MemoryDocumentStore;
use config::Config;
use ports::{DocumentStore, FinancialDataApi};
use services::*;

// Re-export commonly used types at crate root
pub use domain::result::Error;
pub use domain::{AccessToken, DateRange, MonthlyBudget, PublicToken, Transaction};

/// Main context for Finsync operations
///
/// Holds the configuration and the two shared handles (document store and
/// remote API). Services are built on demand from those handles, so a
/// context can be shared between concurrent requests.
pub struct FinsyncContext {
    pub config: Config,
    pub store: Arc<dyn DocumentStore>,
    pub api: Arc<dyn FinancialDataApi>,
    db_path: Option<PathBuf>,
}

impl FinsyncContext {
    /// Create a context from the settings in `finsync_dir`
    pub fn new(finsync_dir: &Path) -> Result<Self> {
        let config = Config::load(finsync_dir)?;

        let (store, db_path): (Arc<dyn DocumentStore>, Option<PathBuf>) =
            if config.database.in_memory {
                (Arc::new(MemoryDocumentStore::new()), None)
            } else {
                std::fs::create_dir_all(finsync_dir).with_context(|| {
                    format!("Failed to create data directory {}", finsync_dir.display())
                })?;
                let db_path = config.db_path(finsync_dir);
                let store = DuckDbDocumentStore::new(&db_path)
                    .with_context(|| format!("Failed to open database {}", db_path.display()))?;
                store.ensure_schema()?;
                (Arc::new(store), Some(db_path))
            };

        let api: Arc<dyn FinancialDataApi> = if config.demo_mode {
            Arc::new(DemoFinancialApi::new())
        } else {
            Arc::new(
                config
                    .plaid
                    .client()
                    .context("Plaid is not configured (set plaid.clientId and plaid.secret, or enable demo mode)")?,
            )
        };

        tracing::debug!(
            provider = api.name(),
            demo_mode = config.demo_mode,
            database = ?db_path,
            "Finsync context ready"
        );

        Ok(Self {
            config,
            store,
            api,
            db_path,
        })
    }

    /// Assemble a context from existing parts
    pub fn from_parts(
        config: Config,
        store: Arc<dyn DocumentStore>,
        api: Arc<dyn FinancialDataApi>,
    ) -> Self {
        Self {
            config,
            store,
            api,
            db_path: None,
        }
    }

    /// Database file in use, `None` when the store is not file-backed
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    pub fn token_provisioner(&self) -> TokenProvisioner {
        TokenProvisioner::new(
            Arc::clone(&self.store),
            Arc::clone(&self.api),
            self.config.institution_ids.clone(),
            self.config.products.clone(),
        )
    }

    pub fn token_exchanger(&self) -> TokenExchanger {
        TokenExchanger::new(Arc::clone(&self.store), Arc::clone(&self.api))
    }

    pub fn transaction_sync(&self) -> TransactionSyncService {
        TransactionSyncService::new(Arc::clone(&self.store), Arc::clone(&self.api))
    }

    pub fn budget_service(&self) -> BudgetService {
        BudgetService::new(Arc::clone(&self.store))
    }

    pub fn status_service(&self) -> StatusService {
        StatusService::new(Arc::clone(&self.store))
    }
}
