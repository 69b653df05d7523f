//! Fragment dumps: `{"pages": [{"text": .., "words": [..], "tables": [..]}]}`

use std::fs;
use std::path::Path;

use passbook_core::{PageSet, SourceError};

pub fn load_page_set(path: &Path) -> Result<PageSet, SourceError> {
    let raw = fs::read_to_string(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_page_set(&raw)
}

pub fn parse_page_set(raw: &str) -> Result<PageSet, SourceError> {
    serde_json::from_str(raw).map_err(|e| SourceError::Malformed(e.to_string()))
}
