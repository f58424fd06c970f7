//! Per-category budget aggregation

use std::collections::BTreeMap;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::result::{Error, Result};
use super::Transaction;

/// Running sum and count for one category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryTotals {
    pub total: Decimal,
    pub count: u64,
}

impl CategoryTotals {
    /// Fails when the running total leaves the range of `Decimal`
    pub fn add(&mut self, amount: Decimal) -> Result<()> {
        self.total = self
            .total
            .checked_add(amount)
            .ok_or_else(|| Error::validation(format!("Total overflows adding {}", amount)))?;
        self.count += 1;
        Ok(())
    }

    /// Mean amount, `None` before the first transaction is added
    pub fn mean(&self) -> Option<Decimal> {
        if self.count == 0 {
            return None;
        }
        Some((self.total / Decimal::from(self.count)).normalize())
    }
}

/// Accumulate totals keyed by each transaction's primary category
pub fn totals_by_category<'a, I>(transactions: I) -> Result<BTreeMap<String, CategoryTotals>>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut totals: BTreeMap<String, CategoryTotals> = BTreeMap::new();
    for tx in transactions {
        let category = tx.primary_category();
        totals
            .entry(category.to_string())
            .or_default()
            .add(tx.amount())
            .map_err(|e| {
                Error::validation(format!(
                    "Cannot total category '{}' at transaction '{}': {}",
                    category,
                    tx.transaction_id(),
                    e
                ))
            })?;
    }
    Ok(totals)
}

/// Mean transaction amount per category
///
/// The name follows the endpoint that serves it; values are plain means over
/// every stored transaction, not normalized by the number of months covered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonthlyBudget(BTreeMap<String, Decimal>);

impl MonthlyBudget {
    pub fn from_transactions<'a, I>(transactions: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        let means = totals_by_category(transactions)?
            .into_iter()
            .filter_map(|(category, totals)| totals.mean().map(|mean| (category, mean)))
            .collect();
        Ok(Self(means))
    }

    pub fn get(&self, category: &str) -> Option<Decimal> {
        self.0.get(category).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Decimal)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> BTreeMap<String, Decimal> {
        self.0
    }
}

/// Serialized as `{category: number}`
impl Serialize for MonthlyBudget {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (category, mean) in &self.0 {
            map.serialize_entry(category, &mean.to_f64().unwrap_or_default())?;
        }
        map.end()
    }
}
