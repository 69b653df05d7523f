//! Generic ruled-table statements (SBI and anything undetected).
//!
//! When a header row is found its wording decides what each column holds;
//! otherwise the first cell is the date and the last the balance. Pages
//! without a grid are skipped here: the dispatcher retries the whole
//! document line-by-line when this extractor finds nothing.

use passbook_core::{BankFamily, FieldClassifier, StatementDocument, TableStrategy, Transaction};

use super::ExtractionState;
use super::table::{RowLayout, extract_tables};
use crate::error::ExtractError;

pub struct StandardExtractor {
    fields: FieldClassifier,
}

/// Column roles resolved from a header row
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct ColumnMap {
    date: Option<usize>,
    value_date: Option<usize>,
    reference: Option<usize>,
    debit: Option<usize>,
    credit: Option<usize>,
    amount: Option<usize>,
    balance: Option<usize>,
}

impl ColumnMap {
    fn from_header(header: &[String]) -> Option<Self> {
        let mut map = ColumnMap::default();
        for (i, name) in header.iter().enumerate() {
            let name = name.to_lowercase();
            let words: Vec<&str> = name
                .split(|c: char| !c.is_alphanumeric())
                .filter(|w| !w.is_empty())
                .collect();
            let has = |keys: &[&str]| keys.iter().any(|k| words.contains(k));

            if name.contains("date") {
                if name.contains("value") {
                    map.value_date.get_or_insert(i);
                } else {
                    map.date.get_or_insert(i);
                }
            } else if name.contains("balance") || has(&["bal"]) {
                map.balance.get_or_insert(i);
            } else if has(&["debit", "debits", "withdrawal", "withdrawals", "dr"]) {
                map.debit.get_or_insert(i);
            } else if has(&["credit", "credits", "deposit", "deposits", "cr"]) {
                map.credit.get_or_insert(i);
            } else if has(&["ref", "reference", "cheque", "chq"]) {
                map.reference.get_or_insert(i);
            } else if has(&["amount", "amt"]) {
                map.amount.get_or_insert(i);
            }
        }
        if map.date.is_none() {
            map.date = map.value_date.take();
        }
        map.date.is_some().then_some(map)
    }

    fn role(&self, i: usize) -> Option<Role> {
        let is = |col: Option<usize>| col == Some(i);
        if is(self.date) {
            Some(Role::Date)
        } else if is(self.value_date) {
            Some(Role::ValueDate)
        } else if is(self.reference) {
            Some(Role::Reference)
        } else if is(self.debit) {
            Some(Role::Debit)
        } else if is(self.credit) {
            Some(Role::Credit)
        } else if is(self.amount) {
            Some(Role::Amount)
        } else if is(self.balance) {
            Some(Role::Balance)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Date,
    ValueDate,
    Reference,
    Debit,
    Credit,
    Amount,
    Balance,
}

impl StandardExtractor {
    pub fn new() -> Result<Self, ExtractError> {
        Ok(Self {
            fields: FieldClassifier::new()?,
        })
    }

    pub fn extract(&self, doc: &dyn StatementDocument) -> Result<Vec<Transaction>, ExtractError> {
        extract_tables(self, doc)
    }

    fn classify_mapped(&self, cells: &[String], map: &ColumnMap) -> Option<Transaction> {
        let date = cells.get(map.date?).filter(|c| self.fields.starts_with_date(c))?;
        let mut txn = self.blank(date);

        for (i, cell) in cells.iter().enumerate() {
            if cell.is_empty() {
                continue;
            }
            match map.role(i) {
                Some(Role::Date) => {}
                Some(Role::ValueDate) => txn.value_date = Some(cell.clone()),
                Some(Role::Reference) => txn.reference = Some(cell.clone()),
                Some(role @ (Role::Debit | Role::Credit | Role::Amount | Role::Balance)) => {
                    let Some(value) = self.fields.parse_amount(cell) else {
                        txn.append_description(cell);
                        continue;
                    };
                    match role {
                        Role::Debit => txn.debit = value.abs(),
                        Role::Credit => txn.credit = value.abs(),
                        Role::Amount => txn.amount = Some(value.abs()),
                        _ => txn.balance = value,
                    }
                }
                None => txn.append_description(cell),
            }
        }
        Some(txn)
    }

    fn classify_positional(&self, cells: &[String]) -> Option<Transaction> {
        let (first, rest) = cells.split_first()?;
        if !self.fields.starts_with_date(first) {
            return None;
        }
        let mut txn = self.blank(first);
        let last = rest.len().saturating_sub(1);
        for (i, cell) in rest.iter().enumerate() {
            match self.fields.parse_amount(cell) {
                Some(balance) if i == last => txn.balance = balance,
                _ => txn.append_description(cell),
            }
        }
        Some(txn)
    }
}

impl RowLayout for StandardExtractor {
    type Columns = Option<ColumnMap>;

    fn family(&self) -> BankFamily {
        BankFamily::Standard
    }

    fn fields(&self) -> &FieldClassifier {
        &self.fields
    }

    fn amount_keywords(&self) -> &[&'static str] {
        &["amount", "amt", "balance", "debit", "credit", "withdrawal", "deposit"]
    }

    fn strategy(&self) -> TableStrategy {
        TableStrategy::Lines
    }

    fn text_fallback(&self) -> bool {
        false
    }

    fn columns(&self, header: Option<&[String]>) -> Self::Columns {
        header.and_then(ColumnMap::from_header)
    }

    fn classify_row(
        &self,
        cells: &[String],
        columns: &Self::Columns,
        _state: &mut ExtractionState,
    ) -> Option<Transaction> {
        match columns {
            Some(map) => self.classify_mapped(cells, map),
            None => self.classify_positional(cells),
        }
    }
}
