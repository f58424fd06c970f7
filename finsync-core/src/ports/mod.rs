//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external dependencies. The workflow
//! services depend only on these traits, not on concrete implementations.

mod document_store;
mod financial_data;

pub use document_store::{Collection, Document, DocumentStore, WriteBatch, WriteOp};
pub use financial_data::FinancialDataApi;
