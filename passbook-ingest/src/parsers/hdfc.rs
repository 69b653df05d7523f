//! HDFC Bank statements, rebuilt from word coordinates.
//!
//! Printed columns:
//!   Date | Narration | Chq./Ref.No. | Value Dt | Withdrawal Amt. | Deposit Amt. | Closing Balance
//!
//! Words are grouped into printed lines, then each word is assigned to a
//! column band by its x position. Band edges are measured per page because
//! the layout drifts slightly between pages. Withdrawal and deposit share a
//! gap-separated region, so a lone amount is classified by how the closing
//! balance moved, falling back to its distance from the balance column.

use std::collections::BTreeMap;

use passbook_core::{
    BankFamily, Direction, FieldClassifier, StatementDocument, Transaction, Word, ZERO,
};
use regex::{Regex, RegexSet};
use rust_decimal::Decimal;
use tracing::debug;

use super::{ExtractionState, direction_from_delta, page_fragment};
use crate::config::HdfcConfig;
use crate::error::ExtractError;

/// Rows matching any of these are statement furniture, never narration
const JUNK: &[&str] = &[
    r"(?i)nomination",
    r"(?i)statement\s+summary",
    r"(?i)generated\s+(?:on|by)",
    r"(?i)\bpage\s*(?:no)?\s*[.:]*\s*\d+",
    r"(?i)opening\s+balance",
    r"(?i)\b(?:dr|cr)\s+count\b",
    r"(?i)closing\s+balance\s+includes",
    r"(?i)contents\s+of\s+this\s+statement",
    r"(?i)computer\s+generated",
    r"(?i)registered\s+office",
    r"(?i)^\s*hdfc\s+bank\s+limited\s*$",
];

/// Address and account-metadata words that drift into the reference band
const REFERENCE_BLOCKLIST: &[&str] = &[
    "A/C", "ACCOUNT", "ADDRESS", "BRANCH", "CITY", "CODE", "CURRENCY", "CUST", "DATE", "EMAIL",
    "HOLDERS", "ID", "IFSC", "INR", "JOINT", "LIMIT", "MICR", "NO", "NO.", "NOMINATION", "OD",
    "OPEN", "PHONE", "PRODUCT", "STATE", "STATUS", "TYPE",
];

/// x thresholds separating the narration, reference and trailing regions of one page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnBoundaries {
    pub narration_min: f64,
    pub narration_max: f64,
    pub reference_min: f64,
    pub reference_max: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Band {
    Leading,
    Narration,
    Reference,
    Trailing,
}

impl ColumnBoundaries {
    fn band(&self, x0: f64) -> Band {
        if x0 < self.narration_min {
            Band::Leading
        } else if x0 < self.narration_max {
            Band::Narration
        } else if x0 < self.reference_max {
            Band::Reference
        } else {
            Band::Trailing
        }
    }
}

/// An amount from a trailing column and the x of its right edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedAmount {
    pub value: Decimal,
    pub x: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classified {
    pub debit: Decimal,
    pub credit: Decimal,
    pub balance: Decimal,
}

/// Split a row's trailing amounts into withdrawal, deposit and closing balance.
///
/// The last amount is always the closing balance. With one other amount its
/// side comes from the balance movement against `prev_balance`; when that is
/// unknown or unchanged, an amount further than `withdrawal_min_gap` from the
/// balance sits in the withdrawal column. With two others they are withdrawal
/// then deposit. Any other count leaves both sides at zero.
pub fn classify_amounts(
    amounts: &[PlacedAmount],
    prev_balance: Option<Decimal>,
    withdrawal_min_gap: f64,
) -> Option<Classified> {
    let (balance, rest) = amounts.split_last()?;
    let mut out = Classified {
        debit: ZERO,
        credit: ZERO,
        balance: balance.value,
    };

    match rest {
        [amount] => {
            let direction = direction_from_delta(prev_balance, balance.value).unwrap_or(
                if balance.x - amount.x > withdrawal_min_gap {
                    Direction::Debit
                } else {
                    Direction::Credit
                },
            );
            match direction {
                Direction::Debit => out.debit = amount.value.abs(),
                Direction::Credit => out.credit = amount.value.abs(),
            }
        }
        [withdrawal, deposit] => {
            out.debit = withdrawal.value.abs();
            out.credit = deposit.value.abs();
        }
        _ => {}
    }
    Some(out)
}

/// Group words into printed lines by rounding their top to a shared bucket,
/// top to bottom, each line left to right.
pub fn group_rows(words: Vec<Word>, bucket: f64) -> Vec<Vec<Word>> {
    let bucket = if bucket > 0.0 { bucket } else { 1.0 };
    let mut rows: BTreeMap<i64, Vec<Word>> = BTreeMap::new();
    for word in words {
        let key = (word.top / bucket).round() as i64;
        rows.entry(key).or_default().push(word);
    }
    rows.into_values()
        .map(|mut row| {
            row.sort_by(|a, b| a.x0.total_cmp(&b.x0));
            row
        })
        .collect()
}

fn row_text(row: &[Word]) -> String {
    row.iter().map(|w| w.text.as_str()).collect::<Vec<_>>().join(" ")
}

struct PageRows {
    rows: Vec<Vec<Word>>,
    bounds: ColumnBoundaries,
}

pub struct HdfcExtractor {
    fields: FieldClassifier,
    config: HdfcConfig,
    junk: RegexSet,
    body_end: Regex,
    column_header: Regex,
    opening: Regex,
    trailing_boilerplate: Regex,
}

impl HdfcExtractor {
    pub fn new(config: HdfcConfig) -> Result<Self, ExtractError> {
        Ok(Self {
            fields: FieldClassifier::new()?,
            config,
            junk: RegexSet::new(JUNK)?,
            body_end: Regex::new(r"(?i)statement\s+summary|opening\s+balance")?,
            column_header: Regex::new(r"(?i)\bnarration\b.*\b(?:chq|ref)|withdrawal\s+amt")?,
            opening: Regex::new(r"(?i)opening\s+balance")?,
            trailing_boilerplate: Regex::new(
                r"(?i)\s*\b(?:statement\s+summary|generated\s+(?:on|by)|opening\s+balance)\b.*$",
            )?,
        })
    }

    pub fn extract(&self, doc: &dyn StatementDocument) -> Result<Vec<Transaction>, ExtractError> {
        let pages = self.load_pages(doc)?;
        let mut state = ExtractionState::default();
        state.prev_balance = self.opening_balance(&pages);

        for page in &pages {
            // Rows above the column header (address block, account details) are skipped.
            let mut in_body = false;
            for row in &page.rows {
                if self.is_anchor(row) {
                    in_body = true;
                    self.open_transaction(row, &page.bounds, &mut state);
                    continue;
                }
                let text = row_text(row);
                if self.column_header.is_match(&text) {
                    in_body = true;
                    continue;
                }
                // Summary values print under their banner without a label.
                if self.body_end.is_match(&text) {
                    in_body = false;
                    continue;
                }
                if self.junk.is_match(&text) {
                    continue;
                }
                if !in_body {
                    continue;
                }
                if let Some(txn) = state.open_mut() {
                    self.continue_transaction(row, &page.bounds, txn);
                }
            }
        }

        let mut txns = state.finish();
        for txn in &mut txns {
            self.tidy(txn);
        }
        Ok(txns)
    }

    fn load_pages(&self, doc: &dyn StatementDocument) -> Result<Vec<PageRows>, ExtractError> {
        let mut pages = Vec::with_capacity(doc.page_count());
        for page in 0..doc.page_count() {
            let Some(words) = page_fragment(BankFamily::Hdfc, page, doc.words(page))? else {
                continue;
            };
            let rows = group_rows(words, self.config.row_bucket);
            let bounds = self.boundaries(&rows);
            debug!(page, rows = rows.len(), ?bounds, "hdfc page layout");
            pages.push(PageRows { rows, bounds });
        }
        Ok(pages)
    }

    /// Measure column edges from the page's transaction rows.
    pub fn boundaries(&self, rows: &[Vec<Word>]) -> ColumnBoundaries {
        let cfg = &self.config;
        let anchored: Vec<&Word> = rows
            .iter()
            .filter(|row| self.is_anchor(row))
            .flatten()
            .collect();

        let narration_min = anchored
            .iter()
            .filter(|w| w.x0 < cfg.date_margin && self.fields.is_date(&w.text))
            .map(|w| w.x1)
            .reduce(f64::max)
            .map_or(cfg.default_narration_start, |x| x + cfg.boundary_gap);

        let reference_floor = cfg.min_reference_offset.max(narration_min);
        let reference_min = anchored
            .iter()
            .filter(|w| w.x0 >= reference_floor && self.fields.is_reference(&w.text))
            .map(|w| w.x0)
            .reduce(f64::min)
            .map_or(cfg.default_reference_start, |x| x - cfg.boundary_gap);

        let reference_max = anchored
            .iter()
            .filter(|w| w.x0 > reference_min)
            .filter(|w| self.fields.is_date(&w.text) || self.money(&w.text).is_some())
            .map(|w| w.x0)
            .reduce(f64::min)
            .map_or(cfg.default_reference_end, |x| x - cfg.boundary_gap)
            .max(reference_min);

        ColumnBoundaries {
            narration_min,
            narration_max: reference_min,
            reference_min,
            reference_max,
        }
    }

    fn is_anchor(&self, row: &[Word]) -> bool {
        row.first()
            .is_some_and(|w| w.x0 < self.config.date_margin && self.fields.is_date(&w.text))
    }

    /// HDFC always prints two decimal places; bare digit runs are references.
    fn money(&self, token: &str) -> Option<Decimal> {
        if !token.contains('.') {
            return None;
        }
        self.fields.parse_amount(token)
    }

    fn keep_reference(&self, token: &str) -> bool {
        let upper = token.trim_end_matches(':').to_uppercase();
        !REFERENCE_BLOCKLIST.contains(&upper.as_str()) && !token.chars().any(char::is_lowercase)
    }

    /// First "Opening Balance" banner in the document: its own amount, or the
    /// first amount on the line below (summary tables print values underneath).
    fn opening_balance(&self, pages: &[PageRows]) -> Option<Decimal> {
        let mut rows = pages.iter().flat_map(|p| p.rows.iter());
        while let Some(row) = rows.next() {
            if !self.opening.is_match(&row_text(row)) {
                continue;
            }
            let first_money = |row: &[Word]| row.iter().find_map(|w| self.money(&w.text));
            let value = first_money(row.as_slice())
                .or_else(|| rows.next().and_then(|r| first_money(r.as_slice())));
            debug!(?value, "opening balance banner");
            return value;
        }
        None
    }

    fn open_transaction(&self, row: &[Word], bounds: &ColumnBoundaries, state: &mut ExtractionState) {
        let Some((date, rest)) = row.split_first() else {
            return;
        };
        let mut txn = Transaction::new(BankFamily::Hdfc, date.text.as_str());
        let mut amounts = Vec::new();

        for word in rest {
            match bounds.band(word.x0) {
                Band::Leading | Band::Narration => txn.append_description(&word.text),
                Band::Reference => {
                    if self.keep_reference(&word.text) {
                        push_reference(&mut txn, &word.text);
                    }
                }
                Band::Trailing => {
                    if self.fields.is_date(&word.text) {
                        txn.value_date.get_or_insert_with(|| word.text.clone());
                    } else if let Some(value) = self.money(&word.text) {
                        amounts.push(PlacedAmount { value, x: word.x1 });
                    }
                }
            }
        }

        match classify_amounts(&amounts, state.prev_balance, self.config.withdrawal_min_gap) {
            Some(classified) => {
                txn.debit = classified.debit;
                txn.credit = classified.credit;
                txn.balance = classified.balance;
                state.prev_balance = Some(classified.balance);
            }
            None => debug!(date = %txn.date, "transaction row without amounts"),
        }
        state.open(txn);
    }

    fn continue_transaction(&self, row: &[Word], bounds: &ColumnBoundaries, txn: &mut Transaction) {
        for word in row {
            if self.fields.is_date(&word.text) || self.money(&word.text).is_some() {
                continue;
            }
            match bounds.band(word.x0) {
                Band::Narration => txn.append_description(&word.text),
                Band::Reference if self.keep_reference(&word.text) => {
                    push_reference(txn, &word.text)
                }
                _ => {}
            }
        }
    }

    fn tidy(&self, txn: &mut Transaction) {
        let narration = self
            .trailing_boilerplate
            .replace(txn.description.trim(), "")
            .trim()
            .to_string();
        txn.description = narration;
        txn.reference = txn
            .reference
            .take()
            .map(|r| r.split_whitespace().collect::<String>())
            .filter(|r| !r.is_empty());
    }
}

fn push_reference(txn: &mut Transaction, token: &str) {
    match txn.reference.as_mut() {
        Some(reference) => {
            reference.push(' ');
            reference.push_str(token);
        }
        None => txn.reference = Some(token.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use passbook_core::{Page, PageSet};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    /// Left-aligned word, 5pt per character
    fn w(text: &str, x0: f64, top: f64) -> Word {
        Word::new(text, x0, x0 + 5.0 * text.len() as f64, top)
    }

    /// Right-aligned word ending at `x1`
    fn r(text: &str, x1: f64, top: f64) -> Word {
        Word::new(text, x1 - 5.0 * text.len() as f64, x1, top)
    }

    fn placed(value: &str, x: f64) -> PlacedAmount {
        PlacedAmount { value: dec(value), x }
    }

    const WITHDRAWAL_X: f64 = 470.0;
    const DEPOSIT_X: f64 = 540.0;
    const BALANCE_X: f64 = 590.0;

    #[test]
    fn test_balance_delta_decides_direction() {
        let prev = Some(dec("1000.00"));

        let down = classify_amounts(
            &[placed("200.00", DEPOSIT_X), placed("800.00", BALANCE_X)],
            prev,
            90.0,
        )
        .unwrap();
        assert_eq!(down.debit, dec("200.00"));
        assert_eq!(down.credit, dec("0.00"));

        let up = classify_amounts(
            &[placed("200.00", WITHDRAWAL_X), placed("1200.00", BALANCE_X)],
            prev,
            90.0,
        )
        .unwrap();
        assert_eq!(up.credit, dec("200.00"));
        assert_eq!(up.debit, dec("0.00"));
        assert_eq!(up.balance, dec("1200.00"));
    }

    #[test]
    fn test_distance_breaks_ties_and_covers_unknown_prior() {
        let same = classify_amounts(
            &[placed("0.00", WITHDRAWAL_X), placed("500.00", BALANCE_X)],
            Some(dec("500.00")),
            90.0,
        )
        .unwrap();
        assert_eq!(same.debit, dec("0.00"));

        let far = classify_amounts(&[placed("75.00", WITHDRAWAL_X), placed("500.00", BALANCE_X)], None, 90.0)
            .unwrap();
        assert_eq!(far.debit, dec("75.00"));

        let near = classify_amounts(&[placed("75.00", DEPOSIT_X), placed("500.00", BALANCE_X)], None, 90.0)
            .unwrap();
        assert_eq!(near.credit, dec("75.00"));
    }

    #[test]
    fn test_three_and_odd_amount_counts() {
        let three = classify_amounts(
            &[placed("10.00", WITHDRAWAL_X), placed("20.00", DEPOSIT_X), placed("90.00", BALANCE_X)],
            Some(dec("1.00")),
            90.0,
        )
        .unwrap();
        assert_eq!((three.debit, three.credit, three.balance), (dec("10.00"), dec("20.00"), dec("90.00")));

        let lone = classify_amounts(&[placed("90.00", BALANCE_X)], None, 90.0).unwrap();
        assert_eq!((lone.debit, lone.credit), (ZERO, ZERO));
        assert_eq!(lone.balance, dec("90.00"));

        assert_eq!(classify_amounts(&[], None, 90.0), None);
    }

    #[test]
    fn test_rows_tolerate_subpixel_jitter() {
        let rows = group_rows(
            vec![w("B", 200.0, 100.2), w("A", 35.0, 99.9), w("C", 35.0, 112.0)],
            1.0,
        );
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].iter().map(|w| w.text.as_str()).collect::<Vec<_>>(), ["A", "B"]);
    }

    #[test]
    fn test_boundaries_fall_back_to_defaults() {
        let extractor = HdfcExtractor::new(HdfcConfig::default()).unwrap();
        let bounds = extractor.boundaries(&[vec![w("Account", 35.0, 10.0)]]);
        let cfg = HdfcConfig::default();
        assert_eq!(bounds.narration_min, cfg.default_narration_start);
        assert_eq!(bounds.reference_min, cfg.default_reference_start);
        assert_eq!(bounds.reference_max, cfg.default_reference_end);
    }

    fn column_header(top: f64) -> Vec<Word> {
        vec![
            w("Date", 35.0, top),
            w("Narration", 80.0, top),
            w("Chq./Ref.No.", 275.0, top),
            w("Value", 370.0, top),
            w("Dt", 400.0, top),
            w("Withdrawal", 420.0, top),
            w("Amt.", 475.0, top),
            w("Closing", 530.0, top),
            w("Balance", 560.0, top),
        ]
    }

    fn statement() -> PageSet {
        let mut first = vec![w("Account", 35.0, 40.0), w("Branch", 300.0, 40.0)];
        first.extend(column_header(80.0));
        first.extend([
            w("01/04/24", 35.0, 100.0),
            w("UPI-ACME", 80.0, 100.0),
            w("STORE", 125.0, 100.0),
            w("0000412345678901", 275.0, 100.0),
            w("01/04/24", 370.0, 100.0),
            r("1,250.00", DEPOSIT_X, 100.0),
            r("8,750.00", BALANCE_X, 100.0),
            w("PAYMENT", 80.0, 110.0),
            w("GROCERIES", 125.0, 110.0),
            w("Mumbai", 275.0, 110.0),
            w("02/04/24", 35.0, 120.0),
            w("NEFT", 80.0, 120.0),
            w("CR-SALARY", 105.0, 120.0),
            w("N123242812345678", 275.0, 120.0),
            w("02/04/24", 370.0, 120.0),
            r("50,000.00", DEPOSIT_X, 120.0),
            r("58,750.00", BALANCE_X, 120.0),
            w("5678", 275.0, 130.4),
            w("Page", 500.0, 800.0),
            w("No", 525.0, 800.0),
            w(".:", 540.0, 800.0),
            w("1", 555.0, 800.0),
        ]);

        let mut second = column_header(80.0);
        second.extend([
            w("03/04/24", 35.0, 100.0),
            w("ATM", 80.0, 100.0),
            w("WDL", 100.0, 100.0),
            w("0000512345678901", 275.0, 100.0),
            w("03/04/24", 370.0, 100.0),
            r("2,000.00", WITHDRAWAL_X, 100.0),
            r("56,750.00", BALANCE_X, 100.0),
            w("STATEMENT", 80.0, 110.0),
            w("SUMMARY", 130.0, 110.0),
            w("Opening", 35.0, 130.0),
            w("Balance", 75.0, 130.0),
            w("Dr", 160.0, 130.0),
            w("Count", 175.0, 130.0),
            w("10,000.00", 35.0, 140.0),
            w("2", 150.0, 140.0),
            w("1", 200.0, 140.0),
            w("3,250.00", 250.0, 140.0),
        ]);

        PageSet::new(vec![Page::with_words(first), Page::with_words(second)])
    }

    #[test]
    fn test_full_statement() {
        let extractor = HdfcExtractor::new(HdfcConfig::default()).unwrap();
        let txns = extractor.extract(&statement()).unwrap();
        assert_eq!(txns.len(), 3);

        // Opening balance from the closing summary seeds the first row: the
        // amount sits near the balance, but the balance fell.
        let t = &txns[0];
        assert_eq!(t.date, "01/04/24");
        assert_eq!(t.value_date.as_deref(), Some("01/04/24"));
        assert_eq!(t.description, "UPI-ACME STORE PAYMENT GROCERIES");
        assert_eq!(t.reference.as_deref(), Some("0000412345678901"));
        assert_eq!(t.debit, dec("1250.00"));
        assert_eq!(t.credit, ZERO);
        assert_eq!(t.balance, dec("8750.00"));
        assert_eq!(t.bank_tag, "HDFC");

        let t = &txns[1];
        assert_eq!(t.description, "NEFT CR-SALARY");
        assert_eq!(t.reference.as_deref(), Some("N1232428123456785678"));
        assert_eq!(t.credit, dec("50000.00"));
        assert_eq!(t.debit, ZERO);

        let t = &txns[2];
        assert_eq!(t.description, "ATM WDL");
        assert_eq!(t.debit, dec("2000.00"));
        assert_eq!(t.balance, dec("56750.00"));
    }

    #[test]
    fn test_page_boundaries_measured_from_rows() {
        let extractor = HdfcExtractor::new(HdfcConfig::default()).unwrap();
        let pages = extractor.load_pages(&statement()).unwrap();
        let bounds = pages[0].bounds;
        assert_eq!(bounds.narration_min, 76.0);
        assert_eq!(bounds.reference_min, 274.0);
        assert_eq!(bounds.narration_max, 274.0);
        assert_eq!(bounds.reference_max, 369.0);
    }

    #[test]
    fn test_trailing_boilerplate_is_stripped() {
        let extractor = HdfcExtractor::new(HdfcConfig::default()).unwrap();
        let mut txn = Transaction::new(BankFamily::Hdfc, "01/04/24");
        txn.description = " IMPS-JOHN STATEMENT SUMMARY :- Opening Balance ".to_string();
        txn.reference = Some(" 0000 4123 ".to_string());
        extractor.tidy(&mut txn);
        assert_eq!(txn.description, "IMPS-JOHN");
        assert_eq!(txn.reference.as_deref(), Some("00004123"));
    }

    #[test]
    fn test_narration_naming_the_bank_is_kept() {
        let mut words = column_header(80.0);
        words.extend([
            w("01/04/24", 35.0, 100.0),
            w("NEFT", 80.0, 100.0),
            w("0000412345678901", 275.0, 100.0),
            w("01/04/24", 370.0, 100.0),
            r("50,000.00", DEPOSIT_X, 100.0),
            r("60,000.00", BALANCE_X, 100.0),
            w("CR-HDFC0000001-ACME", 80.0, 110.0),
            w("HDFC", 180.0, 110.0),
            w("BANK", 205.0, 110.0),
            w("LIMITED", 230.0, 110.0),
            w("SALARY", 80.0, 120.0),
            w("APRIL", 120.0, 120.0),
            w("HDFC", 35.0, 780.0),
            w("BANK", 60.0, 780.0),
            w("LIMITED", 85.0, 780.0),
        ]);
        let doc = PageSet::new(vec![Page::with_words(words)]);

        let extractor = HdfcExtractor::new(HdfcConfig::default()).unwrap();
        let txns = extractor.extract(&doc).unwrap();
        assert_eq!(txns.len(), 1);
        assert_eq!(
            txns[0].description,
            "NEFT CR-HDFC0000001-ACME HDFC BANK LIMITED SALARY APRIL"
        );
        assert_eq!(txns[0].reference.as_deref(), Some("0000412345678901"));
    }
}
