//! One statement in, one output file out.

use passbook_core::{Mode, Transaction};
use passbook_ingest::{Dispatcher, ExtractorConfig, open_document};
use std::path::Path;
use tracing::{debug, error, info, warn};

use crate::output::{OutputFormat, write_transactions};

#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub mode: Mode,
    pub format: OutputFormat,
    pub write_empty: bool,
    pub extractor: ExtractorConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Transactions were extracted and written
    Written(usize),
    /// Nothing was extracted
    Empty,
    /// The input could not be opened
    OpenFailed,
    /// Transactions were extracted but could not be written
    WriteFailed(usize),
}

impl Outcome {
    pub fn count(&self) -> usize {
        match self {
            Outcome::Written(n) | Outcome::WriteFailed(n) => *n,
            Outcome::Empty | Outcome::OpenFailed => 0,
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            Outcome::Written(_) => 0,
            _ => 1,
        }
    }
}

pub fn process(input: &Path, output: &Path, settings: &Settings) -> Outcome {
    let doc = match open_document(input) {
        Ok(doc) => doc,
        Err(e) => {
            error!(input = %input.display(), error = %e, "could not open statement");
            return write_placeholder(output, settings).unwrap_or(Outcome::OpenFailed);
        }
    };

    let extraction = Dispatcher::new(settings.extractor.clone()).run(doc.as_ref(), settings.mode);
    let txns = extraction.transactions;
    if txns.is_empty() {
        warn!(family = %extraction.family, "no transactions extracted");
        return write_placeholder(output, settings).unwrap_or(Outcome::Empty);
    }

    info!(
        family = %extraction.family,
        detected = extraction.detected,
        fell_back = extraction.fell_back,
        count = txns.len(),
        debits = txns.iter().filter(|t| t.is_debit()).count(),
        credits = txns.iter().filter(|t| t.is_credit()).count(),
        "extracted transactions"
    );
    log_period(&txns);

    match write_transactions(output, &txns, settings.format) {
        Ok(()) => Outcome::Written(txns.len()),
        Err(e) => {
            eprintln!("write_error: {e:#}");
            Outcome::WriteFailed(txns.len())
        }
    }
}

/// Empty output for runs that found nothing, when configured. `Some` only
/// when writing it failed.
fn write_placeholder(output: &Path, settings: &Settings) -> Option<Outcome> {
    if !settings.write_empty {
        return None;
    }
    match write_transactions(output, &[], settings.format) {
        Ok(()) => None,
        Err(e) => {
            eprintln!("write_error: {e:#}");
            Some(Outcome::WriteFailed(0))
        }
    }
}

fn log_period(txns: &[Transaction]) {
    let dates: Vec<_> = txns.iter().filter_map(Transaction::parsed_date).collect();
    if let (Some(first), Some(last)) = (dates.iter().min(), dates.iter().max()) {
        debug!(%first, %last, parsed = dates.len(), "statement period");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use passbook_core::BankFamily;
    use std::fs;
    use std::path::PathBuf;

    const JK_DUMP: &str = r#"{"pages": [{"text":
        "Jammu and Kashmir Bank\n01/04/2024 01/04/2024 004512 BY CLG ACME 5,000.00 0.00 12,000.00 JK1234\n"}]}"#;

    fn dump(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_written() {
        let dir = tempfile::tempdir().unwrap();
        let input = dump(dir.path(), "jk.json", JK_DUMP);
        let output = dir.path().join("out.json");

        let outcome = process(&input, &output, &Settings::default());
        assert_eq!(outcome, Outcome::Written(1));
        assert_eq!(outcome.exit_code(), 0);

        let txns: Vec<Transaction> = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(txns[0].bank_tag, BankFamily::Jk.tag());
        assert_eq!(txns[0].cheque_number.as_deref(), Some("004512"));
    }

    #[test]
    fn test_nothing_found_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dump(dir.path(), "empty.json", r#"{"pages": []}"#);
        let output = dir.path().join("out.json");

        let outcome = process(&input, &output, &Settings::default());
        assert_eq!(outcome, Outcome::Empty);
        assert_eq!(outcome.exit_code(), 1);
        assert!(!output.exists());
    }

    #[test]
    fn test_nothing_found_with_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let input = dump(dir.path(), "empty.json", r#"{"pages": []}"#);
        let output = dir.path().join("out.json");
        let settings = Settings {
            write_empty: true,
            ..Settings::default()
        };

        assert_eq!(process(&input, &output, &settings), Outcome::Empty);
        assert_eq!(fs::read_to_string(&output).unwrap(), "[]");
    }

    #[test]
    fn test_unopenable_input() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.json");

        let outcome = process(&dir.path().join("statement.docx"), &output, &Settings::default());
        assert_eq!(outcome, Outcome::OpenFailed);
        assert_eq!(outcome.count(), 0);
        assert!(!output.exists());
    }

    #[test]
    fn test_write_fault_keeps_count() {
        let dir = tempfile::tempdir().unwrap();
        let input = dump(dir.path(), "jk.json", JK_DUMP);
        let output = dir.path().join("missing").join("out.json");

        let outcome = process(&input, &output, &Settings::default());
        assert_eq!(outcome, Outcome::WriteFailed(1));
        assert_eq!(outcome.count(), 1);
        assert_eq!(outcome.exit_code(), 1);
    }

    #[test]
    fn test_forced_family() {
        let dir = tempfile::tempdir().unwrap();
        let input = dump(dir.path(), "jk.json", JK_DUMP);
        let output = dir.path().join("out.json");
        let settings = Settings {
            mode: Mode::Family(BankFamily::Axis),
            ..Settings::default()
        };

        // Axis reads the anchor line through its text fallback.
        let outcome = process(&input, &output, &settings);
        assert_eq!(outcome, Outcome::Written(1));
        let txns: Vec<Transaction> = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(txns[0].bank_tag, "AXIS");
    }
}
