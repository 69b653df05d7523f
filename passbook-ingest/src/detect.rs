//! Bank detection from the first page's text.
//!
//! Rules are checked in order and the first hit wins. Bank-unique markers
//! (Kotak's "Cust. Reln. No.", the KKBK IFSC prefix) come before plain bank
//! names, which also appear in other banks' boilerplate (NEFT counterparties,
//! "payable at" notes).

use passbook_core::{BankFamily, StatementDocument};
use tracing::{debug, warn};

/// Where a rule looks for its keyword
#[derive(Debug, Clone, Copy)]
enum Needle {
    /// Substring of the lower-cased text
    Text(&'static str),
    /// Substring of the lower-cased text with all whitespace removed
    Compact(&'static str),
}

struct Rule {
    family: BankFamily,
    /// Alternatives; any one matching is enough
    any: &'static [Needle],
    /// Additional keywords that must all be present
    all: &'static [&'static str],
}

const RULES: &[Rule] = &[
    Rule {
        family: BankFamily::Kotak,
        any: &[
            Needle::Text("cust. reln. no."),
            Needle::Text("kotak mahindra bank"),
            Needle::Compact("kkbk"),
        ],
        all: &[],
    },
    Rule {
        family: BankFamily::Jk,
        any: &[Needle::Text("jammu")],
        all: &["kashmir"],
    },
    Rule {
        family: BankFamily::Axis,
        any: &[Needle::Text("axis bank"), Needle::Compact("axisbank")],
        all: &[],
    },
    Rule {
        family: BankFamily::YesBank,
        any: &[Needle::Text("yes bank"), Needle::Compact("yesbank")],
        all: &[],
    },
    Rule {
        family: BankFamily::Hdfc,
        any: &[
            Needle::Text("hdfc bank"),
            Needle::Text("proc-dl-statement"),
            Needle::Compact("hdfcbank"),
        ],
        all: &[],
    },
];

/// Classify raw first-page text. Unmatched text is `Standard`.
pub fn detect_family_from_text(text: &str) -> BankFamily {
    let lower = text.to_lowercase();
    let compact: String = lower.chars().filter(|c| !c.is_whitespace()).collect();

    RULES
        .iter()
        .find(|rule| {
            rule.any.iter().any(|needle| match needle {
                Needle::Text(k) => lower.contains(k),
                Needle::Compact(k) => compact.contains(k),
            }) && rule.all.iter().all(|k| lower.contains(k))
        })
        .map_or(BankFamily::Standard, |rule| rule.family)
}

/// Detect the family of an opened document. Never fails: an empty document
/// or an unreadable first page resolves to `Standard`.
pub fn detect_family(doc: &dyn StatementDocument) -> BankFamily {
    if doc.page_count() == 0 {
        debug!("empty document, assuming standard layout");
        return BankFamily::Standard;
    }
    let family = match doc.text(0) {
        Ok(Some(text)) => detect_family_from_text(&text),
        Ok(None) => BankFamily::Standard,
        Err(e) => {
            warn!(error = %e, "first page unreadable, assuming standard layout");
            BankFamily::Standard
        }
    };
    debug!(%family, "detected bank family");
    family
}
