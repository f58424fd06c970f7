//! Transaction domain model

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value as JsonValue};

use super::result::{Error, Result};

/// Bucket for transactions whose category list is missing or empty
pub const UNCATEGORIZED: &str = "Uncategorized";

/// A transaction as returned by the remote financial-data API
///
/// The remote payload is kept exactly as received and is what gets
/// serialized back, so the stored document is the full payload. The fields
/// the workflow reads are parsed from it once, when the payload is decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    transaction_id: String,
    amount: Decimal,
    category: Option<Vec<String>>,
    date: Option<NaiveDate>,
    payload: Map<String, JsonValue>,
}

impl Transaction {
    /// Create a transaction with only the required fields set
    pub fn new(transaction_id: impl Into<String>, amount: Decimal) -> Self {
        let transaction_id = transaction_id.into();
        let mut payload = Map::new();
        payload.insert("transaction_id".to_string(), JsonValue::from(transaction_id.clone()));
        payload.insert(
            "amount".to_string(),
            amount.to_f64().map(JsonValue::from).unwrap_or(JsonValue::Null),
        );
        Self {
            transaction_id,
            amount,
            category: None,
            date: None,
            payload,
        }
    }

    /// Builder-style category setter
    pub fn with_category<S: Into<String>>(mut self, category: impl IntoIterator<Item = S>) -> Self {
        let category: Vec<String> = category.into_iter().map(Into::into).collect();
        self.payload.insert("category".to_string(), JsonValue::from(category.clone()));
        self.category = Some(category);
        self
    }

    /// Builder-style date setter
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.payload
            .insert("date".to_string(), JsonValue::from(date.format("%Y-%m-%d").to_string()));
        self.date = Some(date);
        self
    }

    /// Builder-style setter for a field the workflow does not read
    ///
    /// Keys that are parsed into typed fields are left untouched.
    pub fn with_field(mut self, key: &str, value: JsonValue) -> Self {
        if !TYPED_KEYS.contains(&key) {
            self.payload.insert(key.to_string(), value);
        }
        self
    }

    pub fn transaction_id(&self) -> &str {
        &self.transaction_id
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Category hierarchy, most general first
    pub fn category(&self) -> Option<&[String]> {
        self.category.as_deref()
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn name(&self) -> Option<&str> {
        self.payload.get("name")?.as_str()
    }

    pub fn account_id(&self) -> Option<&str> {
        self.payload.get("account_id")?.as_str()
    }

    /// Any field of the remote payload
    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.payload.get(key)
    }

    /// Top-level category used for budgeting
    ///
    /// This is the first entry of the category list, as stored. A missing
    /// or empty list, or an empty first entry, yields [`UNCATEGORIZED`].
    pub fn primary_category(&self) -> &str {
        self.category
            .as_deref()
            .and_then(|c| c.first())
            .map(String::as_str)
            .filter(|c| !c.is_empty())
            .unwrap_or(UNCATEGORIZED)
    }
}

const TYPED_KEYS: [&str; 4] = ["transaction_id", "amount", "category", "date"];

impl TryFrom<Map<String, JsonValue>> for Transaction {
    type Error = Error;

    fn try_from(payload: Map<String, JsonValue>) -> Result<Self> {
        let transaction_id = match payload.get("transaction_id") {
            Some(JsonValue::String(id)) => id.clone(),
            Some(_) => return Err(Error::validation("transaction_id must be a string")),
            None => return Err(Error::validation("missing field `transaction_id`")),
        };

        let amount = match payload.get("amount") {
            Some(JsonValue::Number(n)) => parse_decimal(&n.to_string()),
            Some(JsonValue::String(s)) => parse_decimal(s.trim()),
            Some(_) => None,
            None => return Err(Error::validation("missing field `amount`")),
        }
        .ok_or_else(|| Error::validation("amount must be a decimal number or string"))?;

        let category = match payload.get("category") {
            None | Some(JsonValue::Null) => None,
            Some(JsonValue::Array(entries)) => Some(
                entries
                    .iter()
                    .map(|entry| entry.as_str().map(str::to_string))
                    .collect::<Option<Vec<_>>>()
                    .ok_or_else(|| Error::validation("category entries must be strings"))?,
            ),
            Some(_) => return Err(Error::validation("category must be a list")),
        };

        let date = match payload.get("date") {
            None | Some(JsonValue::Null) => None,
            Some(JsonValue::String(s)) => Some(
                NaiveDate::parse_from_str(s, "%Y-%m-%d")
                    .map_err(|_| Error::validation(format!("invalid date: {}", s)))?,
            ),
            Some(_) => return Err(Error::validation("date must be a string")),
        };

        Ok(Self {
            transaction_id,
            amount,
            category,
            date,
            payload,
        })
    }
}

impl From<Transaction> for Map<String, JsonValue> {
    fn from(tx: Transaction) -> Self {
        tx.payload
    }
}

impl Serialize for Transaction {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.payload.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Transaction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let payload = Map::<String, JsonValue>::deserialize(deserializer)?;
        Transaction::try_from(payload).map_err(de::Error::custom)
    }
}

/// Date range for a transaction fetch
///
/// Both bounds are opaque strings handed to the remote API unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start_date: String,
    pub end_date: String,
}

impl DateRange {
    pub fn new(start_date: impl Into<String>, end_date: impl Into<String>) -> Self {
        Self {
            start_date: start_date.into(),
            end_date: end_date.into(),
        }
    }
}

/// Parse a decimal that may be written in plain or scientific notation
fn parse_decimal(s: &str) -> Option<Decimal> {
    s.parse::<Decimal>()
        .ok()
        .or_else(|| Decimal::from_scientific(s).ok())
}
