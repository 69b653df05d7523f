//! passbook-ingest: bank detection, dispatch and per-family statement extractors.

pub mod config;
pub mod detect;
pub mod dispatch;
pub mod error;
pub mod parsers;
pub mod source;

pub use config::{ExtractorConfig, HdfcConfig};
pub use detect::{detect_family, detect_family_from_text};
pub use dispatch::{Dispatcher, Extraction, Extractor};
pub use error::ExtractError;
pub use source::open_document;
