//! Line-oriented state machine over a page's text.
//!
//! A line starting with a `dd/mm/yyyy` date opens a new transaction. Any
//! other line continues the open one, unless the grammar says it belongs to
//! the next transaction, in which case it is buffered until the next anchor.

use passbook_core::{FieldClassifier, Transaction};

use super::ExtractionState;
use super::table::is_header_text;

/// Header and footer phrases repeated on every page of a printed statement
pub(crate) const NOISE: &[&str] = &["Value Date", "Account Balance", "Page", "Balance Carried"];

pub(crate) fn is_noise_phrase(line: &str) -> bool {
    NOISE.iter().any(|n| line.contains(n))
}

pub(crate) trait LineGrammar {
    /// Header/footer lines dropped before the state machine sees them
    fn is_noise(&self, _line: &str) -> bool {
        false
    }

    /// Continuation lines that describe the next transaction, not the current one
    fn starts_next(&self, _line: &str) -> bool {
        false
    }

    /// Build a transaction from an anchor line. `None` drops the line.
    fn parse_anchor(&self, line: &str) -> Option<Transaction>;
}

/// Run one page of text through the state machine; the open transaction is
/// flushed at the end of the page.
pub(crate) fn run_lines<G: LineGrammar + ?Sized>(
    grammar: &G,
    fields: &FieldClassifier,
    text: &str,
    state: &mut ExtractionState,
) {
    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() || grammar.is_noise(line) {
            continue;
        }

        if fields.is_anchor_line(line) {
            let Some(mut txn) = grammar.parse_anchor(line) else {
                continue;
            };
            if let Some(pending) = state.take_pending() {
                txn.prepend_description(&pending);
            }
            state.open(txn);
        } else if grammar.starts_next(line) {
            state.buffer_pending(line);
        } else {
            state.continue_description(line);
        }
    }
    state.flush();
}

/// Fallback grammar for table families on pages without a grid: first token
/// is the date, the rest of the anchor line seeds the description. Repeated
/// column headers and page furniture are dropped.
pub(crate) struct DateLeadGrammar<'a, F> {
    blank: F,
    amount_keywords: &'a [&'static str],
}

impl<'a, F: Fn(&str) -> Transaction> DateLeadGrammar<'a, F> {
    pub fn new(blank: F, amount_keywords: &'a [&'static str]) -> Self {
        Self {
            blank,
            amount_keywords,
        }
    }
}

impl<F: Fn(&str) -> Transaction> LineGrammar for DateLeadGrammar<'_, F> {
    fn is_noise(&self, line: &str) -> bool {
        let leads_with_digit = line.starts_with(|c: char| c.is_ascii_digit());
        is_noise_phrase(line)
            || (!leads_with_digit && is_header_text(&line.to_lowercase(), self.amount_keywords))
    }

    fn parse_anchor(&self, line: &str) -> Option<Transaction> {
        let mut parts = line.split_whitespace();
        let date = parts.next()?;
        let mut txn = (self.blank)(date);
        txn.append_description(&parts.collect::<Vec<_>>().join(" "));
        Some(txn)
    }
}
