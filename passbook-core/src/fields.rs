//! Field classifiers: predicates and parsers over single tokens or cells.
//!
//! A [`FieldClassifier`] owns its compiled patterns. Extractors build one when
//! they are constructed and pass it around explicitly.

use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Canonical zero for amount fields, serialised as `0.00`.
pub const ZERO: Decimal = Decimal::from_parts(0, 0, 0, false, 2);

/// Minimum length of a pure-digit token treated as a reference number
const LONG_DIGITS: usize = 10;

/// Which side of the ledger an amount sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Debit,
    Credit,
}

#[derive(Debug, Clone)]
pub struct FieldClassifier {
    date_token: Regex,
    date_prefix: Regex,
    anchor: Regex,
    amount: Regex,
    cheque: Regex,
    reference: Regex,
}

impl FieldClassifier {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            date_token: Regex::new(concat!(
                r"^(?:\d{2}/\d{2}/\d{2,4}",
                r"|\d{2}-\d{2}-\d{2,4}",
                r"|\d{2}\.\d{2}\.\d{2,4}",
                r"|\d{1,2}-[A-Za-z]{3,9}-\d{2,4}",
                r"|\d{1,2}\s[A-Za-z]{3}\s\d{4})$"
            ))?,
            // Table cells: a date at the start of the cell is enough.
            date_prefix: Regex::new(r"^(?:\d{2}/\d{2}/\d{4}|\d{1,2}-\w+-\d{2})")?,
            anchor: Regex::new(r"^\d{2}/\d{2}/\d{4}")?,
            amount: Regex::new(concat!(
                r"^(?P<sign>-)?(?P<num>\d[\d,]*(?:\.\d+)?)",
                r"\s*(?:\(?(?P<marker>Dr|Cr|DR|CR|dr|cr)\)?\.?)?$"
            ))?,
            cheque: Regex::new(r"^\d{6}$")?,
            reference: Regex::new(concat!(
                r"^(?:(?:UPI|NEFT|IMPS|RTGS|NACH|ACH|MB|CHQ|CMS|IFT|INF|TRF|POS|ATM)",
                r"[A-Z]*[-/:]?[A-Z0-9]*\d{4,}[A-Z0-9]*",
                r"|\d{10,})$"
            ))?,
        })
    }

    /// Whole token is a date in one of the bank-native forms
    pub fn is_date(&self, token: &str) -> bool {
        self.date_token.is_match(token.trim())
    }

    /// Cell begins with a date (trailing text allowed)
    pub fn starts_with_date(&self, cell: &str) -> bool {
        self.date_prefix.is_match(cell)
    }

    /// Line begins with a `dd/mm/yyyy` date and so opens a transaction
    pub fn is_anchor_line(&self, line: &str) -> bool {
        self.anchor.is_match(line)
    }

    pub fn is_amount(&self, token: &str) -> bool {
        self.amount_with_marker(token).is_some()
    }

    /// Signed decimal with thousands separators, e.g. `-1,234.50`.
    pub fn parse_amount(&self, token: &str) -> Option<Decimal> {
        self.amount_with_marker(token).map(|(value, _)| value)
    }

    /// Parse an amount and any trailing `Dr`/`Cr` marker.
    pub fn amount_with_marker(&self, token: &str) -> Option<(Decimal, Option<Direction>)> {
        let caps = self.amount.captures(token.trim())?;
        let digits = caps["num"].replace(',', "");
        let mut value = Decimal::from_str(&digits).ok()?;
        if value.scale() < 2 {
            value.rescale(2);
        }
        if caps.name("sign").is_some() {
            value.set_sign_negative(true);
        }
        let marker = caps.name("marker").map(|m| {
            if m.as_str().eq_ignore_ascii_case("dr") {
                Direction::Debit
            } else {
                Direction::Credit
            }
        });
        Some((value, marker))
    }

    pub fn is_cheque_number(&self, token: &str) -> bool {
        self.cheque.is_match(token)
    }

    /// Payment-network reference (`UPI-4123..`, `NEFT:N0123..`) or a long digit run
    pub fn is_reference(&self, token: &str) -> bool {
        let token = token.trim();
        self.reference.is_match(token) || is_long_digits(token)
    }
}

fn is_long_digits(token: &str) -> bool {
    token.len() >= LONG_DIGITS && token.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_dates() {
        let f = FieldClassifier::new().unwrap();
        assert!(f.is_date("01/04/2024"));
        assert!(f.is_date("01/04/24"));
        assert!(f.is_date("5-Apr-24"));
        assert!(f.is_date("05-04-2024"));
        assert!(!f.is_date("1,200.00"));
        assert!(!f.is_date("UPI/123"));

        assert!(f.starts_with_date("01/04/2024 NEFT"));
        assert!(f.starts_with_date("1-Apr-24"));
        assert!(!f.starts_with_date("Opening 01/04/2024"));

        assert!(f.is_anchor_line("01/04/2024 02/04/2024 - UPI"));
        assert!(!f.is_anchor_line("1-Apr-24 UPI"));
    }

    #[test]
    fn test_amounts() {
        let f = FieldClassifier::new().unwrap();
        assert_eq!(f.parse_amount("1,234.50"), Some(dec("1234.50")));
        assert_eq!(f.parse_amount("-75"), Some(dec("-75.00")));
        assert_eq!(f.parse_amount("-75").unwrap().to_string(), "-75.00");
        assert_eq!(f.parse_amount("12AB"), None);
        assert_eq!(f.parse_amount(","), None);
        assert_eq!(f.parse_amount(""), None);
        assert_eq!(f.parse_amount("01/04/2024"), None);
    }

    #[test]
    fn test_amount_markers() {
        let f = FieldClassifier::new().unwrap();
        assert_eq!(
            f.amount_with_marker("2,000.00(Dr)"),
            Some((dec("2000.00"), Some(Direction::Debit)))
        );
        assert_eq!(
            f.amount_with_marker("150.00 Cr"),
            Some((dec("150.00"), Some(Direction::Credit)))
        );
        assert_eq!(f.amount_with_marker("150.00"), Some((dec("150.00"), None)));
    }

    #[test]
    fn test_zero_is_two_places() {
        assert_eq!(ZERO.to_string(), "0.00");
        assert!(ZERO.is_zero());
    }

    #[test]
    fn test_cheque_and_reference() {
        let f = FieldClassifier::new().unwrap();
        assert!(f.is_cheque_number("004512"));
        assert!(!f.is_cheque_number("04512"));
        assert!(f.is_reference("UPI-412345678901"));
        assert!(f.is_reference("0000412345678901"));
        assert!(f.is_reference("NEFT:N123242812345678"));
        assert!(f.is_reference("NEFTINW-0012345"));
        assert!(!f.is_reference("UPI-JOHN"));
        assert!(!f.is_reference("123456"));
        assert!(!f.is_reference("Mumbai"));
    }
}
