//! Core domain entities
//!
//! Pure data structures and the budget aggregation - no I/O or external
//! dependencies.

pub mod budget;
pub mod result;
mod token;
mod transaction;

pub use budget::{CategoryTotals, MonthlyBudget};
pub use token::{redact, AccessToken, PublicToken};
pub use transaction::{DateRange, Transaction, UNCATEGORIZED};
