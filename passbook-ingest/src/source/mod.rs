//! Concrete statement documents.
//!
//! `.json` inputs are fragment dumps produced by an external extractor;
//! `.pdf` inputs go through poppler's `pdftotext`.

mod grid;
pub mod json;
pub mod poppler;

use std::path::Path;

use passbook_core::{SourceError, StatementDocument};
use tracing::debug;

pub use json::load_page_set;
pub use poppler::PopplerDocument;

/// Open `path` with the source matching its extension.
pub fn open_document(path: &Path) -> Result<Box<dyn StatementDocument>, SourceError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    let doc: Box<dyn StatementDocument> = match extension.as_deref() {
        Some("json") => Box::new(load_page_set(path)?),
        Some("pdf") => Box::new(PopplerDocument::open(path)?),
        _ => return Err(SourceError::Unsupported(path.to_path_buf())),
    };
    debug!(path = %path.display(), pages = doc.page_count(), "opened document");
    Ok(doc)
}
