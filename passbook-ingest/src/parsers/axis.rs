//! Axis Bank statements.
//!
//! Expected grid after text-strategy table inference:
//!   Tran Date   Particulars                       Amount      Balance
//!   01-04-2024  UPI/P2M/412345678901/ACME STORE   1,250.00    48,750.00
//!
//! The amount column carries no direction, so it is emitted as `amount` and
//! `debit`/`credit` stay at zero.

use passbook_core::{BankFamily, FieldClassifier, StatementDocument, Transaction, ZERO};

use super::ExtractionState;
use super::table::{RowLayout, extract_tables};
use crate::error::ExtractError;

pub struct AxisExtractor {
    fields: FieldClassifier,
}

impl AxisExtractor {
    pub fn new() -> Result<Self, ExtractError> {
        Ok(Self {
            fields: FieldClassifier::new()?,
        })
    }

    pub fn extract(&self, doc: &dyn StatementDocument) -> Result<Vec<Transaction>, ExtractError> {
        extract_tables(self, doc)
    }
}

impl RowLayout for AxisExtractor {
    type Columns = ();

    fn family(&self) -> BankFamily {
        BankFamily::Axis
    }

    fn fields(&self) -> &FieldClassifier {
        &self.fields
    }

    fn amount_keywords(&self) -> &[&'static str] {
        &["amount", "amt"]
    }

    fn columns(&self, _header: Option<&[String]>) -> Self::Columns {}

    fn classify_row(
        &self,
        cells: &[String],
        _columns: &(),
        _state: &mut ExtractionState,
    ) -> Option<Transaction> {
        let last = cells.len().saturating_sub(1);
        let mut date = None;
        let mut txn = self.blank("");

        for (i, cell) in cells.iter().enumerate() {
            if i == 0 && self.fields.starts_with_date(cell) {
                date = Some(cell.as_str());
                continue;
            }
            if i == last {
                if let Some(balance) = self.fields.parse_amount(cell) {
                    txn.balance = balance;
                    continue;
                }
            } else if i + 1 == last {
                if let Some(amount) = self.fields.parse_amount(cell) {
                    txn.amount = Some(amount.abs());
                    continue;
                }
            }
            txn.append_description(cell);
        }

        txn.date = date?.to_string();
        Some(txn)
    }

    fn blank(&self, date: &str) -> Transaction {
        let mut txn = Transaction::new(BankFamily::Axis, date);
        txn.amount = Some(ZERO);
        txn
    }
}
