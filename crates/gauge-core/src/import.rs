//! Ledger import parsers
//!
//! Loads transaction ledgers from CSV or JSON exports, plus the JSON
//! collections (budgets, goals, subscriptions) the engine consumes.
//!
//! Per-record malformation is recovered, not propagated: an unparseable
//! date or amount skips that row with a debug log, and a missing type
//! column falls back to the amount's sign. Only structural failures (bad
//! CSV framing, invalid JSON) surface as errors.

use std::io::Read;

use chrono::NaiveDate;
use csv::ReaderBuilder;
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{Budget, Goal, Subscription, Transaction, TxKind};

/// Parse a transaction ledger from CSV with a
/// `date,description,amount,type,category` header. Column order is free;
/// `type` and `category` are optional.
pub fn parse_ledger_csv<R: Read>(reader: R) -> Result<Vec<Transaction>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let col = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
    };

    let (Some(date_col), Some(desc_col), Some(amount_col)) =
        (col("date"), col("description"), col("amount"))
    else {
        return Err(Error::InvalidData(
            "ledger CSV needs date, description and amount columns".into(),
        ));
    };
    let type_col = col("type");
    let category_col = col("category");

    let mut transactions = Vec::new();

    for (row, record) in rdr.records().enumerate() {
        let record = record?;

        let Some(date) = record
            .get(date_col)
            .and_then(|v| v.trim().parse::<NaiveDate>().ok())
        else {
            debug!(row, "skipping row with unparseable date");
            continue;
        };

        let Some(raw_amount) = record
            .get(amount_col)
            .and_then(|v| v.trim().replace(['$', ','], "").parse::<f64>().ok())
        else {
            debug!(row, "skipping row with non-numeric amount");
            continue;
        };

        let description = record
            .get(desc_col)
            .map(|v| v.trim().to_string())
            .unwrap_or_default();

        // Explicit type column wins; otherwise infer from the sign the way
        // bank exports encode it (negative = money out)
        let kind = type_col
            .and_then(|c| record.get(c))
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .and_then(|v| v.parse::<TxKind>().ok())
            .unwrap_or(if raw_amount < 0.0 {
                TxKind::Expense
            } else {
                TxKind::Income
            });

        let category = category_col
            .and_then(|c| record.get(c))
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(String::from);

        transactions.push(Transaction {
            id: row_id(date, &description, raw_amount, row),
            date,
            amount: raw_amount.abs(),
            kind,
            category,
            description,
        });
    }

    Ok(transactions)
}

/// Parse a transaction ledger from a JSON array
pub fn parse_ledger_json<R: Read>(reader: R) -> Result<Vec<Transaction>> {
    from_json(reader)
}

pub fn parse_budgets_json<R: Read>(reader: R) -> Result<Vec<Budget>> {
    from_json(reader)
}

pub fn parse_goals_json<R: Read>(reader: R) -> Result<Vec<Goal>> {
    from_json(reader)
}

pub fn parse_subscriptions_json<R: Read>(reader: R) -> Result<Vec<Subscription>> {
    from_json(reader)
}

fn from_json<R: Read, T: DeserializeOwned>(reader: R) -> Result<Vec<T>> {
    Ok(serde_json::from_reader(reader)?)
}

/// Stable row identifier from the record's content
fn row_id(date: NaiveDate, description: &str, amount: f64, row: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(date.to_string().as_bytes());
    hasher.update(description.as_bytes());
    hasher.update(amount.to_le_bytes());
    hasher.update(row.to_le_bytes());
    hex::encode(&hasher.finalize()[..6])
}
