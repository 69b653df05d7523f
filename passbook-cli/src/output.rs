//! Transaction writers.

use anyhow::{Context, Result};
use clap::ValueEnum;
use passbook_core::Transaction;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Pretty-printed array of records; absent optional fields are omitted
    #[default]
    Json,
    /// One row per transaction, every field as a column
    Csv,
}

/// Flat CSV shape: optional fields become empty cells.
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    date: &'a str,
    value_date: Option<&'a str>,
    description: &'a str,
    reference: Option<&'a str>,
    cheque_number: Option<&'a str>,
    debit: Decimal,
    credit: Decimal,
    amount: Option<Decimal>,
    balance: Decimal,
    bank_tag: &'a str,
}

impl<'a> From<&'a Transaction> for CsvRow<'a> {
    fn from(t: &'a Transaction) -> Self {
        Self {
            date: &t.date,
            value_date: t.value_date.as_deref(),
            description: &t.description,
            reference: t.reference.as_deref(),
            cheque_number: t.cheque_number.as_deref(),
            debit: t.debit,
            credit: t.credit,
            amount: t.amount,
            balance: t.balance,
            bank_tag: &t.bank_tag,
        }
    }
}

pub fn write_transactions(path: &Path, txns: &[Transaction], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let s = serde_json::to_string_pretty(txns).context("serialize transactions")?;
            fs::write(path, s).with_context(|| format!("write {}", path.display()))?;
        }
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_path(path)
                .with_context(|| format!("create {}", path.display()))?;
            for t in txns {
                wtr.serialize(CsvRow::from(t))
                    .with_context(|| format!("write {}", path.display()))?;
            }
            wtr.flush().with_context(|| format!("write {}", path.display()))?;
        }
    }
    Ok(())
}
