//! Normalized transaction record emitted by every extractor.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::family::BankFamily;
use crate::fields::ZERO;

/// Bank-native date layouts tried by [`Transaction::parsed_date`]
/// (two-digit years first: `%Y` would also accept `24` as year 24)
const DATE_FORMATS: &[&str] = &[
    "%d/%m/%y", "%d/%m/%Y", "%d-%m-%y", "%d-%m-%Y", "%d.%m.%Y", "%d-%b-%y", "%d-%b-%Y",
    "%d %b %Y",
];

/// One statement line item. `date` is kept exactly as printed.
///
/// Which optional fields are populated depends on the family that produced
/// the record; `bank_tag` is always set and constant within one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_date: Option<String>,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cheque_number: Option<String>,
    pub debit: Decimal,
    pub credit: Decimal,
    /// Undirected amount for layouts that print a single amount column
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    pub balance: Decimal,
    pub bank_tag: String,
}

impl Transaction {
    /// Create an empty record for `family` with every amount at zero
    pub fn new(family: BankFamily, date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            value_date: None,
            description: String::new(),
            reference: None,
            cheque_number: None,
            debit: ZERO,
            credit: ZERO,
            amount: None,
            balance: ZERO,
            bank_tag: family.tag().to_string(),
        }
    }

    /// Space-join `text` onto the description
    pub fn append_description(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        if !self.description.is_empty() {
            self.description.push(' ');
        }
        self.description.push_str(text);
    }

    pub fn prepend_description(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        if self.description.is_empty() {
            self.description = text.to_string();
        } else {
            self.description = format!("{} {}", text, self.description);
        }
    }

    /// Best-effort calendar date; `None` when the printed form is unrecognised
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        let raw = self.date.trim();
        DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
    }

    /// Returns true if the debit side carries a value
    pub fn is_debit(&self) -> bool {
        !self.debit.is_zero()
    }

    /// Returns true if the credit side carries a value
    pub fn is_credit(&self) -> bool {
        !self.credit.is_zero()
    }
}
