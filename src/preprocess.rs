//! Transaction preprocessing: date parsing, month bucketing, and field
//! selection before anything is serialized into a model payload.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use log::{debug, warn};

use crate::error::{RecommenderError, Result};
use crate::schema::{MonthBucket, RawTransaction, Transaction, INCOME_CATEGORY};

/// Date formats seen in the transaction feed. The dump mixes ISO dates with
/// the day-first short form the synthetic generator produced.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%y", "%d/%m/%Y", "%m/%d/%Y"];

pub fn parse_feed_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
}

/// Result of one preprocessing pass: the surviving normalized records plus
/// how many rows were dropped for unparseable dates.
#[derive(Debug, Clone)]
pub struct PreprocessOutcome {
    pub transactions: Vec<Transaction>,
    pub dropped: usize,
}

/// Normalizes raw feed rows for one user. Rows whose date fails to parse are
/// dropped and counted, never raised; an empty result is a valid outcome that
/// downstream stages must propagate as empty-result defaults.
pub fn normalize_transactions(rows: &[RawTransaction]) -> PreprocessOutcome {
    let mut transactions = Vec::with_capacity(rows.len());
    let mut dropped = 0usize;

    for row in rows {
        let Some(date) = parse_feed_date(&row.date) else {
            dropped += 1;
            continue;
        };

        transactions.push(Transaction {
            amount: row.amount,
            date: date.format("%Y-%m-%d").to_string(),
            category: row.category.clone(),
            mode: row.mode.clone(),
            merchant: row.merchant.clone(),
            bucket: MonthBucket::from_date(date),
        });
    }

    if dropped > 0 {
        warn!(
            "Dropped {} of {} transaction records with unparseable dates",
            dropped,
            rows.len()
        );
    }

    let distribution = month_distribution(&transactions);
    debug!("Found {} months of transaction data", distribution.len());
    for (bucket, count) in &distribution {
        debug!("  {}: {} transactions", bucket, count);
    }

    PreprocessOutcome {
        transactions,
        dropped,
    }
}

/// Groups normalized transactions by month bucket, chronologically ordered.
pub fn group_by_month(transactions: &[Transaction]) -> BTreeMap<MonthBucket, Vec<Transaction>> {
    let mut grouped: BTreeMap<MonthBucket, Vec<Transaction>> = BTreeMap::new();
    for txn in transactions {
        grouped.entry(txn.bucket).or_default().push(txn.clone());
    }
    grouped
}

fn month_distribution(transactions: &[Transaction]) -> BTreeMap<MonthBucket, usize> {
    let mut counts: BTreeMap<MonthBucket, usize> = BTreeMap::new();
    for txn in transactions {
        *counts.entry(txn.bucket).or_default() += 1;
    }
    counts
}

/// Verifies the amount sign convention the income/expense totals rely on:
/// wage-income amounts are negative, everything else non-negative.
pub fn check_amount_signs(transactions: &[Transaction]) -> Result<()> {
    for txn in transactions {
        if txn.category == INCOME_CATEGORY {
            if txn.amount >= 0.0 {
                return Err(RecommenderError::InvalidRecord(format!(
                    "{} transaction on {} has non-negative amount {}",
                    INCOME_CATEGORY, txn.date, txn.amount
                )));
            }
        } else if txn.amount < 0.0 {
            return Err(RecommenderError::InvalidRecord(format!(
                "{} transaction on {} has negative amount {}",
                txn.category, txn.date, txn.amount
            )));
        }
    }
    Ok(())
}
