//! Storage boundaries: whole-table CSV reads keyed by bucket/key, per-user
//! report persistence, and the key-value item encoding whose target store
//! rejects native floating-point numbers.

use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use log::{info, warn};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::error::{RecommenderError, Result};
use crate::schema::{
    Coupon, CreditCard, FinalReport, Loan, ProductCatalog, RawTransaction, SavingsAccount,
    UserCard, UserInfo,
};

/// Well-known table keys in the data dump.
pub const USER_TABLE: &str = "user.csv";
pub const TRANSACTIONS_TABLE: &str = "transaction_data_final.csv";
pub const COUPONS_TABLE: &str = "product_coupons_data.csv";
pub const LOANS_TABLE: &str = "loan_data.csv";
pub const CREDIT_CARDS_TABLE: &str = "credit_card_data.csv";
pub const SAVINGS_TABLE: &str = "high_yield_savings_data.csv";
pub const USER_CARDS_TABLE: &str = "user_card.csv";

/// Whole-table reads from an object store. No partial or streamed reads:
/// a fetch returns the complete CSV text for a bucket/key pair.
pub trait TableStore {
    fn fetch_raw(&self, bucket: &str, key: &str) -> Result<String>;
}

/// Table store backed by a local directory laid out as `<root>/<bucket>/<key>`.
#[derive(Debug, Clone)]
pub struct LocalTableStore {
    root: PathBuf,
}

impl LocalTableStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl TableStore for LocalTableStore {
    fn fetch_raw(&self, bucket: &str, key: &str) -> Result<String> {
        let path = self.root.join(bucket).join(key);
        Ok(fs::read_to_string(path)?)
    }
}

/// Decodes CSV text into typed records.
pub fn decode_table<T: DeserializeOwned>(csv_text: &str) -> Result<Vec<T>> {
    let mut reader = csv::Reader::from_reader(csv_text.as_bytes());
    let mut records = Vec::new();
    for row in reader.deserialize() {
        records.push(row?);
    }
    Ok(records)
}

/// High-level access to the data dump's tables for one run.
pub struct DataLoader<'a> {
    store: &'a dyn TableStore,
    bucket: String,
}

impl<'a> DataLoader<'a> {
    pub fn new(store: &'a dyn TableStore, bucket: impl Into<String>) -> Self {
        Self {
            store,
            bucket: bucket.into(),
        }
    }

    fn fetch<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>> {
        let raw = self.store.fetch_raw(&self.bucket, key)?;
        decode_table(&raw)
    }

    /// The user table. An unreadable or empty user table is fatal to the run.
    pub fn load_users(&self) -> Result<Vec<UserInfo>> {
        let users: Vec<UserInfo> = self.fetch(USER_TABLE)?;
        if users.is_empty() {
            return Err(RecommenderError::EmptyTable(USER_TABLE.to_string()));
        }
        Ok(users)
    }

    /// Distinct user ids in table order.
    pub fn user_ids(&self) -> Result<Vec<String>> {
        let users = self.load_users()?;
        let mut ids = Vec::with_capacity(users.len());
        for user in users {
            if !ids.contains(&user.user_id) {
                ids.push(user.user_id);
            }
        }
        Ok(ids)
    }

    pub fn find_user(&self, user_id: &str) -> Result<UserInfo> {
        self.load_users()?
            .into_iter()
            .find(|u| u.user_id == user_id)
            .ok_or_else(|| RecommenderError::UserNotFound(user_id.to_string()))
    }

    /// The user's rows from the transaction feed. A missing or unreadable
    /// feed degrades to an empty set rather than failing the user.
    pub fn load_user_transactions(&self, user_id: &str) -> Vec<RawTransaction> {
        match self.fetch::<RawTransaction>(TRANSACTIONS_TABLE) {
            Ok(rows) => {
                let filtered: Vec<RawTransaction> = rows
                    .into_iter()
                    .filter(|row| row.user_id == user_id)
                    .collect();
                if filtered.is_empty() {
                    warn!("No transactions found for user {}", user_id);
                }
                filtered
            }
            Err(e) => {
                warn!("Error reading transactions for user {}: {}", user_id, e);
                Vec::new()
            }
        }
    }

    /// All four product reference tables.
    pub fn load_catalog(&self) -> Result<ProductCatalog> {
        Ok(ProductCatalog {
            coupons: self.fetch::<Coupon>(COUPONS_TABLE)?,
            loans: self.fetch::<Loan>(LOANS_TABLE)?,
            credit_cards: self.fetch::<CreditCard>(CREDIT_CARDS_TABLE)?,
            savings: self.fetch::<SavingsAccount>(SAVINGS_TABLE)?,
        })
    }

    /// Card ids the user already holds; empty on any read error.
    pub fn load_user_cards(&self, user_id: &str) -> Vec<String> {
        match self.fetch::<UserCard>(USER_CARDS_TABLE) {
            Ok(rows) => rows
                .into_iter()
                .filter(|row| row.user_id == user_id)
                .map(|row| row.card_id)
                .collect(),
            Err(e) => {
                warn!("Error reading card ownership for user {}: {}", user_id, e);
                Vec::new()
            }
        }
    }
}

/// One logical record per user. Each write overwrites the prior snapshot.
pub trait ReportStore {
    fn put_report(&self, user_id: &str, report: &FinalReport) -> Result<()>;
}

pub fn report_file_name(user_id: &str) -> String {
    format!("output_{}.json", user_id)
}

/// Writes one JSON document per user into a fixed directory.
#[derive(Debug, Clone)]
pub struct FileReportStore {
    dir: PathBuf,
}

impl FileReportStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ReportStore for FileReportStore {
    fn put_report(&self, user_id: &str, report: &FinalReport) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(report_file_name(user_id));
        let json = serde_json::to_string_pretty(report)?;
        fs::write(&path, json).map_err(|e| RecommenderError::PersistenceError {
            key: path.display().to_string(),
            details: e.to_string(),
        })?;
        info!("Output saved for user {}", user_id);
        Ok(())
    }
}

/// Replaces every floating-point number in the tree with its
/// arbitrary-precision decimal rendering; integers pass through.
pub fn convert_floats_to_decimal(value: Value) -> Value {
    match value {
        Value::Array(items) => {
            Value::Array(items.into_iter().map(convert_floats_to_decimal).collect())
        }
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, item)| (key, convert_floats_to_decimal(item)))
                .collect(),
        ),
        Value::Number(n) if n.is_f64() => {
            let rendered = n.to_string();
            match Decimal::from_str(&rendered) {
                Ok(decimal) => Value::String(decimal.to_string()),
                Err(_) => Value::String(rendered),
            }
        }
        other => other,
    }
}

/// Encodes a report as a key-value store item: either a JSON string blob or
/// a nested structure whose floats have been converted to decimals, since
/// the target store rejects native floating-point types.
pub fn kv_item(user_id: &str, report: &FinalReport, as_json_string: bool) -> Result<Value> {
    if as_json_string {
        Ok(json!({
            "user_id": user_id,
            "output": serde_json::to_string(report)?,
        }))
    } else {
        Ok(json!({
            "user_id": user_id,
            "output": convert_floats_to_decimal(serde_json::to_value(report)?),
        }))
    }
}
