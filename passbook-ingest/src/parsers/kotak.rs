//! Kotak Mahindra Bank statements.
//!
//! Expected grid:
//!   #   Date        Description                Chq/Ref No.        Withdrawal (Dr)  Deposit (Cr)  Balance
//!   1   01-04-2024  UPI/ACME STORE/Payment     UPI-412345678901   1,250.00                       8,750.00
//!
//! Text-strategy inference often fuses the serial number and the date into
//! one cell (`"1 01-04-2024"`, sometimes with narration trailing); those
//! cells are split back apart before classification.

use passbook_core::{BankFamily, Direction, FieldClassifier, StatementDocument, Transaction};
use regex::Regex;
use rust_decimal::Decimal;

use super::table::{RowLayout, extract_tables};
use super::{ExtractionState, direction_from_delta};
use crate::error::ExtractError;

pub struct KotakExtractor {
    fields: FieldClassifier,
    fused: Regex,
    opening: Regex,
}

impl KotakExtractor {
    pub fn new() -> Result<Self, ExtractError> {
        Ok(Self {
            fields: FieldClassifier::new()?,
            fused: Regex::new(concat!(
                r"^(?P<serial>\d{1,5})\s+",
                r"(?P<date>\d{2}[-/]\d{2}[-/]\d{2,4}|\d{1,2}[- ][A-Za-z]{3}[- ]\d{2,4})",
                r"(?:\s+(?P<rest>.+))?$"
            ))?,
            opening: Regex::new(r"(?i)opening\s+balance")?,
        })
    }

    pub fn extract(&self, doc: &dyn StatementDocument) -> Result<Vec<Transaction>, ExtractError> {
        extract_tables(self, doc)
    }

    /// An "Opening Balance" row seeds the balance used to classify the first transaction.
    fn seed_opening_balance(&self, cells: &[String], state: &mut ExtractionState) {
        if state.prev_balance.is_some() || !cells.iter().any(|c| self.opening.is_match(c)) {
            return;
        }
        state.prev_balance = cells
            .iter()
            .rev()
            .find_map(|c| self.fields.amount_with_marker(c))
            .map(|(value, marker)| signed_balance(value, marker));
    }

    /// Split leftover tokens into the reference (joined without separators)
    /// and the description (joined with spaces).
    fn partition_text<'a>(&self, cells: impl Iterator<Item = &'a String>, txn: &mut Transaction) {
        let mut reference = String::new();
        for token in cells.flat_map(|c| c.split_whitespace()) {
            if self.fields.is_reference(token) {
                reference.push_str(token);
            } else {
                txn.append_description(token);
            }
        }
        if !reference.is_empty() {
            txn.reference = Some(reference);
        }
    }
}

impl RowLayout for KotakExtractor {
    type Columns = ();

    fn family(&self) -> BankFamily {
        BankFamily::Kotak
    }

    fn fields(&self) -> &FieldClassifier {
        &self.fields
    }

    fn amount_keywords(&self) -> &[&'static str] {
        &["withdrawal", "deposit", "balance", "amount", "amt"]
    }

    fn columns(&self, _header: Option<&[String]>) -> Self::Columns {}

    fn repair_row(&self, cells: Vec<String>) -> Vec<String> {
        for i in 0..cells.len().min(2) {
            let Some(caps) = self.fused.captures(&cells[i]) else {
                continue;
            };
            let mut repaired = Vec::with_capacity(cells.len() + 2);
            repaired.extend_from_slice(&cells[..i]);
            repaired.push(caps["serial"].to_string());
            repaired.push(caps["date"].to_string());
            if let Some(rest) = caps.name("rest") {
                repaired.push(rest.as_str().to_string());
            }
            repaired.extend_from_slice(&cells[i + 1..]);
            return repaired;
        }
        cells
    }

    fn classify_row(
        &self,
        cells: &[String],
        _columns: &(),
        state: &mut ExtractionState,
    ) -> Option<Transaction> {
        let Some(date_idx) = cells.iter().take(2).position(|c| self.fields.starts_with_date(c))
        else {
            self.seed_opening_balance(cells, state);
            return None;
        };
        let body = &cells[date_idx + 1..];

        // Up to three trailing amount cells, ignoring empty columns.
        let mut amounts = Vec::new();
        for (i, cell) in body.iter().enumerate().rev() {
            if cell.is_empty() {
                continue;
            }
            match self.fields.amount_with_marker(cell) {
                Some((value, marker)) if amounts.len() < 3 && cell.contains('.') => {
                    amounts.push((i, value, marker))
                }
                _ => break,
            }
        }
        amounts.reverse();

        let mut txn = self.blank(&cells[date_idx]);
        if let Some(&(_, value, marker)) = amounts.last() {
            txn.balance = signed_balance(value, marker);
        }
        match amounts.as_slice() {
            [(_, withdrawal, _), (_, deposit, _), _] => {
                txn.debit = withdrawal.abs();
                txn.credit = deposit.abs();
            }
            [(_, amount, marker), _] => {
                let direction = marker.or_else(|| direction_from_delta(state.prev_balance, txn.balance));
                match direction {
                    Some(Direction::Debit) => txn.debit = amount.abs(),
                    Some(Direction::Credit) => txn.credit = amount.abs(),
                    None => txn.amount = Some(amount.abs()),
                }
            }
            _ => {}
        }
        if !amounts.is_empty() {
            state.prev_balance = Some(txn.balance);
        }

        let first_amount = amounts.first().map_or(body.len(), |&(i, _, _)| i);
        self.partition_text(body[..first_amount].iter(), &mut txn);
        Some(txn)
    }
}

fn signed_balance(value: Decimal, marker: Option<Direction>) -> Decimal {
    match marker {
        Some(Direction::Debit) => -value.abs(),
        _ => value,
    }
}
