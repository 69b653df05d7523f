//! YES Bank statements.
//!
//! Expected grid:
//!   Transaction Date  Value Date  Description     Withdrawals  Deposits   Balance
//!   01/04/2024        01/04/2024  NEFT CR-ACME                 5,000.00   12,000.00
//!
//! Withdrawal and deposit columns sit immediately left of the balance.

use passbook_core::{BankFamily, FieldClassifier, StatementDocument, Transaction};

use super::ExtractionState;
use super::table::{RowLayout, extract_tables};
use crate::error::ExtractError;

pub struct YesBankExtractor {
    fields: FieldClassifier,
}

impl YesBankExtractor {
    pub fn new() -> Result<Self, ExtractError> {
        Ok(Self {
            fields: FieldClassifier::new()?,
        })
    }

    pub fn extract(&self, doc: &dyn StatementDocument) -> Result<Vec<Transaction>, ExtractError> {
        extract_tables(self, doc)
    }
}

impl RowLayout for YesBankExtractor {
    type Columns = ();

    fn family(&self) -> BankFamily {
        BankFamily::YesBank
    }

    fn fields(&self) -> &FieldClassifier {
        &self.fields
    }

    fn amount_keywords(&self) -> &[&'static str] {
        &["amount", "amt", "balance"]
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
            if cell.is_empty() {
                continue;
            }
            if i == 0 && self.fields.starts_with_date(cell) {
                date = Some(cell.as_str());
                continue;
            }
            if i == 1 && date.is_some() && self.fields.is_date(cell) {
                txn.value_date = Some(cell.clone());
                continue;
            }
            if let Some(value) = self.fields.parse_amount(cell) {
                match last - i {
                    0 => {
                        txn.balance = value;
                        continue;
                    }
                    1 => {
                        txn.credit = value.abs();
                        continue;
                    }
                    2 => {
                        txn.debit = value.abs();
                        continue;
                    }
                    _ => {}
                }
            }
            txn.append_description(cell);
        }

        txn.date = date?.to_string();
        Some(txn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use passbook_core::{Page, PageSet, Table, ZERO};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_yesbank_columns() {
        let doc = PageSet::new(vec![Page::default().with_table(Table::from_cells(&[
            &["Transaction Date", "Value Date", "Description", "Withdrawals", "Deposits", "Balance"],
            &["01/04/2024", "01/04/2024", "NEFT CR-ACME", "", "5,000.00", "12,000.00"],
            &["03/04/2024", "03/04/2024", "ATM WDL", "2,000.00", "", "10,000.00"],
        ]))]);

        let txns = YesBankExtractor::new().unwrap().extract(&doc).unwrap();
        assert_eq!(txns.len(), 2);

        assert_eq!(txns[0].value_date.as_deref(), Some("01/04/2024"));
        assert_eq!(txns[0].description, "NEFT CR-ACME");
        assert_eq!(txns[0].credit, dec("5000.00"));
        assert_eq!(txns[0].debit, ZERO);
        assert_eq!(txns[0].balance, dec("12000.00"));

        assert_eq!(txns[1].debit, dec("2000.00"));
        assert_eq!(txns[1].credit, ZERO);
        assert_eq!(txns[1].bank_tag, "YESBANK");
    }

    #[test]
    fn test_spacer_rows_skipped() {
        let doc = PageSet::new(vec![Page::default().with_table(Table::from_cells(&[
            &["Date", "Description", "Balance"],
            &["", "", ""],
            &["01/04/2024", "", ""],
            &["02/04/2024", "IMPS", "900.00"],
        ]))]);
        let txns = YesBankExtractor::new().unwrap().extract(&doc).unwrap();
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].date, "02/04/2024");
    }
}
