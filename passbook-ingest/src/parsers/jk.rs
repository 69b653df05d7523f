//! Jammu & Kashmir Bank statements, read line by line from page text.
//!
//! Anchor lines look like:
//!   01/04/2024 01/04/2024 004512 BY CLG ACME 5,000.00 0.00 12,000.00 JK1234
//!   <value date> <txn date> [cheque|-] <narration..> [withdrawal] [deposit] [balance] <ref>
//!
//! Narration lines starting with a payment-network keyword are printed above
//! the anchor line they describe, so they are held for the next transaction.

use passbook_core::{BankFamily, FieldClassifier, StatementDocument, Transaction};
use tracing::debug;

use super::lines::{LineGrammar, is_noise_phrase, run_lines};
use super::{ExtractionState, page_fragment};
use crate::error::ExtractError;

/// Continuation lines with these prefixes belong to the next transaction
const START_KEYWORDS: &[&str] = &[
    "mTFR", "NEFT", "RTGS", "UPI", "By Cash", "To Transfer", "IMPS", "ACH", "BPAY", "MB:",
    "Dr Card", "eTFR", "REJECT", "By Inst", "Cheque", "To Clg", "Int. Pd", "Pos", "CMS", "TRF",
];

pub struct JkExtractor {
    fields: FieldClassifier,
}

impl JkExtractor {
    pub fn new() -> Result<Self, ExtractError> {
        Ok(Self {
            fields: FieldClassifier::new()?,
        })
    }

    pub fn extract(&self, doc: &dyn StatementDocument) -> Result<Vec<Transaction>, ExtractError> {
        let mut state = ExtractionState::default();
        for page in 0..doc.page_count() {
            let Some(text) = page_fragment(BankFamily::Jk, page, doc.text(page))?.flatten() else {
                debug!(page, "no text on page");
                continue;
            };
            run_lines(self, &self.fields, &text, &mut state);
        }
        Ok(state.finish())
    }

    fn pop_amount(&self, tokens: &mut Vec<&str>) -> Option<rust_decimal::Decimal> {
        let value = self.fields.parse_amount(tokens.last()?)?;
        tokens.pop();
        Some(value)
    }
}

impl LineGrammar for JkExtractor {
    fn is_noise(&self, line: &str) -> bool {
        is_noise_phrase(line)
    }

    fn starts_next(&self, line: &str) -> bool {
        let upper = line.to_uppercase();
        START_KEYWORDS
            .iter()
            .any(|kw| upper.starts_with(&kw.to_uppercase()))
    }

    fn parse_anchor(&self, line: &str) -> Option<Transaction> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 3 {
            return None;
        }

        let value_date = parts[0];
        let mut rest = &parts[1..];
        if self.fields.is_anchor_line(rest[0]) {
            rest = &rest[1..];
        }
        let mut tokens = rest.to_vec();
        let mut txn = Transaction::new(BankFamily::Jk, value_date);

        match tokens.first() {
            Some(first) if self.fields.is_cheque_number(first) => {
                txn.cheque_number = Some(tokens.remove(0).to_string());
            }
            Some(&"-") => {
                tokens.remove(0);
            }
            _ => {}
        }

        txn.reference = tokens.pop().map(str::to_string);
        if let Some(balance) = self.pop_amount(&mut tokens) {
            txn.balance = balance;
            if let Some(deposit) = self.pop_amount(&mut tokens) {
                txn.credit = deposit.abs();
                if let Some(withdrawal) = self.pop_amount(&mut tokens) {
                    txn.debit = withdrawal.abs();
                }
            }
        }

        txn.append_description(&tokens.join(" "));
        Some(txn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use passbook_core::{Page, PageSet, ZERO};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn extract(pages: &[&str]) -> Vec<Transaction> {
        let doc = PageSet::new(pages.iter().map(|t| Page::with_text(*t)).collect());
        JkExtractor::new().unwrap().extract(&doc).unwrap()
    }

    #[test]
    fn test_positional_fields_from_the_end() {
        let txns = extract(&[
            "01/04/2024 01/04/2024 004512 BY CLG ACME 5,000.00 0.00 12,000.00 JK1234",
        ]);
        assert_eq!(txns.len(), 1);
        let t = &txns[0];
        assert_eq!(t.date, "01/04/2024");
        assert_eq!(t.cheque_number.as_deref(), Some("004512"));
        assert_eq!(t.reference.as_deref(), Some("JK1234"));
        assert_eq!(t.debit, dec("5000.00"));
        assert_eq!(t.credit, dec("0.00"));
        assert_eq!(t.balance, dec("12000.00"));
        assert_eq!(t.description, "BY CLG ACME");
        assert_eq!(t.bank_tag, "J&K");
    }

    #[test]
    fn test_dash_placeholder_and_short_amount_runs() {
        let txns = extract(&["02/04/2024 02/04/2024 - SMS CHARGES 11,988.20 R99"]);
        let t = &txns[0];
        assert_eq!(t.cheque_number, None);
        assert_eq!(t.description, "SMS CHARGES");
        assert_eq!(t.balance, dec("11988.20"));
        assert_eq!(t.credit, ZERO);
        assert_eq!(t.debit, ZERO);
    }

    #[test]
    fn test_keyword_line_attaches_to_next_transaction() {
        let txns = extract(&["\
Value Date Txn Date Cheque Narration Withdrawal Deposit Balance Ref
01/04/2024 01/04/2024 - OPENING CREDIT 0.00 100.00 100.00 R1
ACME TRADERS
NEFT UTIB000123 FROM ACME
02/04/2024 02/04/2024 - CR 0.00 50.00 150.00 R2
Page 1 of 2"]);

        assert_eq!(txns.len(), 2);
        assert_eq!(txns[0].description, "OPENING CREDIT ACME TRADERS");
        assert_eq!(txns[1].description, "NEFT UTIB000123 FROM ACME CR");
    }

    #[test]
    fn test_pending_description_survives_page_break() {
        let txns = extract(&[
            "01/04/2024 01/04/2024 - FIRST 0.00 1.00 1.00 R1\nUPI/412345/SHOP",
            "02/04/2024 02/04/2024 - SECOND 1.00 0.00 0.00 R2\nmore detail",
        ]);
        assert_eq!(txns.len(), 2);
        assert_eq!(txns[0].description, "FIRST");
        assert_eq!(txns[1].description, "UPI/412345/SHOP SECOND more detail");
    }

    #[test]
    fn test_short_anchor_line_is_skipped() {
        let txns = extract(&["01/04/2024 X\n02/04/2024 02/04/2024 - OK 1.00 R3"]);
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].date, "02/04/2024");
    }

    #[test]
    fn test_repeat_runs_are_identical() {
        let doc = PageSet::new(vec![Page::with_text(
            "01/04/2024 01/04/2024 - A 1.00 0.00 9.00 R1\nIMPS 55\n02/04/2024 02/04/2024 - B 0.00 1.00 10.00 R2",
        )]);
        let extractor = JkExtractor::new().unwrap();
        assert_eq!(extractor.extract(&doc).unwrap(), extractor.extract(&doc).unwrap());
    }
}
