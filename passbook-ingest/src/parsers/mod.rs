//! Per-family statement extractors.
//!
//! Table families (Axis, YesBank, Kotak, Standard) share [`table`]; the J&K
//! family and the per-page text fallback share [`lines`]; HDFC works from
//! word coordinates.

pub mod axis;
pub mod hdfc;
pub mod jk;
pub mod kotak;
pub mod lines;
pub mod standard;
pub mod table;
pub mod yesbank;

pub use axis::AxisExtractor;
pub use hdfc::HdfcExtractor;
pub use jk::JkExtractor;
pub use kotak::KotakExtractor;
pub use standard::StandardExtractor;
pub use yesbank::YesBankExtractor;

use passbook_core::{BankFamily, Direction, SourceError, Transaction};
use rust_decimal::Decimal;
use std::cmp::Ordering;
use tracing::warn;

use crate::error::ExtractError;

/// Accumulator for one document's extraction. Never shared across documents.
#[derive(Debug, Default)]
pub(crate) struct ExtractionState {
    transactions: Vec<Transaction>,
    open: Option<Transaction>,
    pending: Option<String>,
    /// Closing balance of the last classified transaction
    pub prev_balance: Option<Decimal>,
}

impl ExtractionState {
    pub fn emit(&mut self, txn: Transaction) {
        self.flush();
        self.transactions.push(txn);
    }

    /// Close the in-progress transaction (if any) and start `txn`
    pub fn open(&mut self, txn: Transaction) {
        self.flush();
        self.open = Some(txn);
    }

    pub fn open_mut(&mut self) -> Option<&mut Transaction> {
        self.open.as_mut()
    }

    pub fn flush(&mut self) {
        if let Some(txn) = self.open.take() {
            self.transactions.push(txn);
        }
    }

    /// Append to the open transaction, or else the most recently closed one
    pub fn continue_description(&mut self, text: &str) {
        if let Some(txn) = self.open.as_mut().or(self.transactions.last_mut()) {
            txn.append_description(text);
        }
    }

    /// Hold `text` for the next transaction's description
    pub fn buffer_pending(&mut self, text: &str) {
        let buffered = match self.pending.take() {
            Some(prev) => format!("{} {}", prev, text.trim()),
            None => text.trim().to_string(),
        };
        self.pending = Some(buffered);
    }

    pub fn take_pending(&mut self) -> Option<String> {
        self.pending.take()
    }

    pub fn finish(mut self) -> Vec<Transaction> {
        self.flush();
        self.transactions
    }
}

/// Infer an amount's side from how the running balance moved.
/// `None` when there is no prior balance or it did not change.
pub(crate) fn direction_from_delta(prev: Option<Decimal>, balance: Decimal) -> Option<Direction> {
    match balance.cmp(&prev?) {
        Ordering::Less => Some(Direction::Debit),
        Ordering::Greater => Some(Direction::Credit),
        Ordering::Equal => None,
    }
}

/// Unwrap a page fragment request. Page-local faults are logged and the page
/// skipped; anything else aborts the document.
pub(crate) fn page_fragment<T>(
    family: BankFamily,
    page: usize,
    fragment: Result<T, SourceError>,
) -> Result<Option<T>, ExtractError> {
    match fragment {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_page_local() => {
            warn!(%family, page, error = %e, "skipping unreadable page");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}
