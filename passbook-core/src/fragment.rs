//! Page fragments supplied by the document-extraction collaborator, and the
//! trait extractors use to request them.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// A word token with its bounding coordinates (PDF points, origin top-left)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub text: String,
    pub x0: f64,
    pub x1: f64,
    pub top: f64,
}

impl Word {
    pub fn new(text: impl Into<String>, x0: f64, x1: f64, top: f64) -> Self {
        Self {
            text: text.into(),
            x0,
            x1,
            top,
        }
    }
}

/// Best-effort table grid: ordered rows of ordered cells, any cell may be missing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Table {
    pub rows: Vec<Vec<Option<String>>>,
}

impl Table {
    pub fn new(rows: Vec<Vec<Option<String>>>) -> Self {
        Self { rows }
    }

    /// Build a grid from string cells; empty strings become missing cells.
    pub fn from_cells(rows: &[&[&str]]) -> Self {
        Self {
            rows: rows
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|c| (!c.is_empty()).then(|| c.to_string()))
                        .collect()
                })
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// How the collaborator should infer table structure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableStrategy {
    /// Columns and rows inferred from text alignment (layout tolerant)
    Text,
    /// Columns and rows taken from ruled lines
    Lines,
}

/// Everything the collaborator knows about one page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub words: Vec<Word>,
    #[serde(default)]
    pub tables: Vec<Table>,
}

impl Page {
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn with_words(words: Vec<Word>) -> Self {
        Self {
            words,
            ..Self::default()
        }
    }

    pub fn with_table(mut self, table: Table) -> Self {
        self.tables.push(table);
        self
    }
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed page dump: {0}")]
    Malformed(String),

    #[error("{0} not installed (poppler-utils)")]
    ToolMissing(&'static str),

    #[error("{tool} failed: {message}")]
    ToolFailed { tool: &'static str, message: String },

    #[error("page {0} out of range")]
    PageOutOfRange(usize),

    #[error("unsupported input: {}", .0.display())]
    Unsupported(PathBuf),

    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

impl SourceError {
    /// Faults confined to one page; the rest of the document is still usable
    pub fn is_page_local(&self) -> bool {
        matches!(self, SourceError::Malformed(_) | SourceError::PageOutOfRange(_))
    }
}

/// Per-page access to an opened statement document.
///
/// Pages are zero-indexed. A document with no pages is valid.
pub trait StatementDocument {
    fn page_count(&self) -> usize;

    /// Plain extracted text, `None` when the page has no text layer
    fn text(&self, page: usize) -> Result<Option<String>, SourceError>;

    fn words(&self, page: usize) -> Result<Vec<Word>, SourceError>;

    /// Table grids found on the page; empty when none could be inferred
    fn tables(&self, page: usize, strategy: TableStrategy) -> Result<Vec<Table>, SourceError>;
}

/// In-memory document, also the shape of a JSON fragment dump
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageSet {
    #[serde(default)]
    pub pages: Vec<Page>,
}

impl PageSet {
    pub fn new(pages: Vec<Page>) -> Self {
        Self { pages }
    }

    fn page(&self, page: usize) -> Result<&Page, SourceError> {
        self.pages.get(page).ok_or(SourceError::PageOutOfRange(page))
    }
}

impl StatementDocument for PageSet {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn text(&self, page: usize) -> Result<Option<String>, SourceError> {
        Ok(self.page(page)?.text.clone())
    }

    fn words(&self, page: usize) -> Result<Vec<Word>, SourceError> {
        Ok(self.page(page)?.words.clone())
    }

    // Grids in a dump were already inferred by the producer, so both
    // strategies see the same tables.
    fn tables(&self, page: usize, _strategy: TableStrategy) -> Result<Vec<Table>, SourceError> {
        Ok(self.page(page)?.tables.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_from_cells_marks_gaps() {
        let t = Table::from_cells(&[&["01/04/2024", "", "10.00"]]);
        assert_eq!(t.rows[0][0].as_deref(), Some("01/04/2024"));
        assert_eq!(t.rows[0][1], None);
    }

    #[test]
    fn test_page_set_from_json() {
        let json = r#"{
            "pages": [
                {"text": "hello", "words": [{"text": "hello", "x0": 10.0, "x1": 30.0, "top": 50.2}]},
                {"tables": [[["Date", "Amount"], ["01/04/2024", null]]]}
            ]
        }"#;
        let set: PageSet = serde_json::from_str(json).unwrap();
        assert_eq!(set.page_count(), 2);
        assert_eq!(set.text(0).unwrap().as_deref(), Some("hello"));
        assert_eq!(set.words(0).unwrap()[0].x1, 30.0);
        assert_eq!(set.text(1).unwrap(), None);
        let tables = set.tables(1, TableStrategy::Text).unwrap();
        assert_eq!(tables[0].rows[1][1], None);
        assert!(matches!(set.words(5), Err(SourceError::PageOutOfRange(5))));
    }
}
