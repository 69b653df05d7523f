//! Family resolution and extractor dispatch.
//!
//! Every family maps to exactly one extractor. The only degrade path is
//! Standard → J&K: statements that fall through detection and produce no
//! ruled tables are often line-printed passbooks.

use passbook_core::{BankFamily, Mode, StatementDocument, Transaction};
use tracing::{debug, info, warn};

use crate::config::ExtractorConfig;
use crate::detect::detect_family;
use crate::error::ExtractError;
use crate::parsers::{
    AxisExtractor, HdfcExtractor, JkExtractor, KotakExtractor, StandardExtractor,
    YesBankExtractor,
};

/// One constructed extractor per family
pub enum Extractor {
    Axis(AxisExtractor),
    YesBank(YesBankExtractor),
    Kotak(KotakExtractor),
    Jk(JkExtractor),
    Hdfc(HdfcExtractor),
    Standard(StandardExtractor),
}

impl Extractor {
    pub fn for_family(family: BankFamily, config: &ExtractorConfig) -> Result<Self, ExtractError> {
        Ok(match family {
            BankFamily::Axis => Self::Axis(AxisExtractor::new()?),
            BankFamily::YesBank => Self::YesBank(YesBankExtractor::new()?),
            BankFamily::Kotak => Self::Kotak(KotakExtractor::new()?),
            BankFamily::Jk => Self::Jk(JkExtractor::new()?),
            BankFamily::Hdfc => Self::Hdfc(HdfcExtractor::new(config.hdfc)?),
            BankFamily::Standard => Self::Standard(StandardExtractor::new()?),
        })
    }

    pub fn family(&self) -> BankFamily {
        match self {
            Self::Axis(_) => BankFamily::Axis,
            Self::YesBank(_) => BankFamily::YesBank,
            Self::Kotak(_) => BankFamily::Kotak,
            Self::Jk(_) => BankFamily::Jk,
            Self::Hdfc(_) => BankFamily::Hdfc,
            Self::Standard(_) => BankFamily::Standard,
        }
    }

    pub fn extract(&self, doc: &dyn StatementDocument) -> Result<Vec<Transaction>, ExtractError> {
        match self {
            Self::Axis(e) => e.extract(doc),
            Self::YesBank(e) => e.extract(doc),
            Self::Kotak(e) => e.extract(doc),
            Self::Jk(e) => e.extract(doc),
            Self::Hdfc(e) => e.extract(doc),
            Self::Standard(e) => e.extract(doc),
        }
    }
}

/// Result of one dispatch
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    /// Family chosen by the mode or by detection
    pub family: BankFamily,
    /// Whether `family` came from detection rather than an explicit mode
    pub detected: bool,
    /// Whether the Standard → J&K degrade path produced `transactions`
    pub fell_back: bool,
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    config: ExtractorConfig,
}

impl Dispatcher {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    /// Resolve `mode` and run the matching extractor. Never fails: extractor
    /// faults are logged and yield an empty sequence.
    pub fn run(&self, doc: &dyn StatementDocument, mode: Mode) -> Extraction {
        let (family, detected) = match mode {
            Mode::Auto => (detect_family(doc), true),
            Mode::Family(family) => (family, false),
        };
        info!(%family, detected, pages = doc.page_count(), "extracting statement");

        let mut transactions = self.run_family(family, doc);
        let mut fell_back = false;
        if family == BankFamily::Standard && transactions.is_empty() {
            debug!("standard tables yielded nothing, retrying as line-printed statement");
            transactions = self.run_family(BankFamily::Jk, doc);
            fell_back = true;
        }

        Extraction {
            family,
            detected,
            fell_back,
            transactions,
        }
    }

    fn run_family(&self, family: BankFamily, doc: &dyn StatementDocument) -> Vec<Transaction> {
        let result = Extractor::for_family(family, &self.config).and_then(|e| e.extract(doc));
        match result {
            Ok(txns) => {
                debug!(%family, count = txns.len(), "extractor finished");
                txns
            }
            Err(e) => {
                warn!(%family, error = %e, "extractor failed");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extractor_family_roundtrip() {
        let config = ExtractorConfig::default();
        for family in BankFamily::ALL {
            let extractor = Extractor::for_family(family, &config).unwrap();
            assert_eq!(extractor.family(), family);
        }
    }

    #[test]
    fn test_empty_document_is_empty_result() {
        let doc = passbook_core::PageSet::default();
        let out = Dispatcher::default().run(&doc, Mode::Auto);
        assert_eq!(out.family, BankFamily::Standard);
        assert!(out.detected);
        assert!(out.fell_back);
        assert!(out.transactions.is_empty());
    }
}
