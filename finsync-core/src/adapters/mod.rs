//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - DuckDB and in-memory stores for the DocumentStore port
//! - Plaid HTTP client for FinancialDataApi
//! - Offline demo API for demo mode and tests

pub mod demo;
pub mod duckdb;
pub mod memory;
pub mod plaid;

#[cfg(test)]
pub mod plaid_mock;
