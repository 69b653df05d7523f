//! PDF statements through poppler's `pdftotext`.
//!
//! Two passes over the file: `-layout` for page text (pages separated by form
//! feeds) and `-bbox` for word boxes:
//!
//!   <page width="595.32" height="841.92">
//!     <word xMin="35.10" yMin="120.40" xMax="74.98" yMax="128.40">01/04/24</word>
//!
//! Table grids are inferred from the word boxes (see [`super::grid`]); pages
//! without dated rows have none, so table families read them through their
//! text fallback.

use std::path::Path;
use std::process::Command;

use passbook_core::{FieldClassifier, SourceError, StatementDocument, Table, TableStrategy, Word};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::debug;

use super::grid::infer_tables;

const TOOL: &str = "pdftotext";

#[derive(Debug, Clone, Default)]
pub struct PopplerDocument {
    texts: Vec<Option<String>>,
    words: Vec<Vec<Word>>,
    tables: Vec<Vec<Table>>,
}

impl PopplerDocument {
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        which::which(TOOL).map_err(|_| SourceError::ToolMissing(TOOL))?;
        let layout = run_pdftotext(path, "-layout")?;
        let bbox = run_pdftotext(path, "-bbox")?;
        Self::from_outputs(&layout, &bbox)
    }

    /// Build from captured `-layout` and `-bbox` output
    pub fn from_outputs(layout: &str, bbox: &str) -> Result<Self, SourceError> {
        let mut texts: Vec<Option<String>> = layout
            .split('\x0c')
            .map(|page| Some(page.to_string()).filter(|t| !t.trim().is_empty()))
            .collect();
        // pdftotext terminates every page, including the last, with a form feed.
        if layout.ends_with('\x0c') {
            texts.pop();
        }

        let mut words = parse_bbox(bbox)?;
        let pages = texts.len().max(words.len());
        texts.resize(pages, None);
        words.resize(pages, Vec::new());

        let fields = FieldClassifier::new()?;
        let tables: Vec<Vec<Table>> = words
            .iter()
            .map(|page| infer_tables(page.clone(), &fields))
            .collect();
        let gridded = tables.iter().filter(|t| !t.is_empty()).count();
        debug!(pages, gridded, "pdftotext output parsed");
        Ok(Self { texts, words, tables })
    }
}

fn run_pdftotext(path: &Path, mode: &str) -> Result<String, SourceError> {
    let output = Command::new(TOOL)
        .arg(mode)
        .arg(path)
        .arg("-")
        .output()
        .map_err(|source| SourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(SourceError::ToolFailed {
            tool: TOOL,
            message: format!(
                "exit {}: {}",
                output.status.code().unwrap_or(-1),
                stderr.trim()
            ),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Word boxes per `<page>` element of `-bbox` XHTML
fn parse_bbox(xhtml: &str) -> Result<Vec<Vec<Word>>, SourceError> {
    let mut reader = Reader::from_str(xhtml);
    reader.trim_text(true);

    let mut pages: Vec<Vec<Word>> = Vec::new();
    let mut open: Option<(f64, f64, f64)> = None;
    let mut text = String::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.name().as_ref() == b"word" => {
                open = word_box(&e);
                text.clear();
            }
            Ok(Event::Start(e) | Event::Empty(e)) if e.name().as_ref() == b"page" => {
                pages.push(Vec::new());
            }
            Ok(Event::Text(e)) if open.is_some() => {
                let unescaped = e
                    .unescape()
                    .map_err(|err| SourceError::Malformed(format!("pdftotext -bbox: {err}")))?;
                text.push_str(&unescaped);
            }
            Ok(Event::End(e)) if e.name().as_ref() == b"word" => {
                if let (Some((x0, x1, top)), Some(page)) = (open.take(), pages.last_mut()) {
                    let word = text.trim();
                    if !word.is_empty() {
                        page.push(Word::new(word, x0, x1, top));
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(err) => {
                return Err(SourceError::Malformed(format!(
                    "pdftotext -bbox at byte {}: {err}",
                    reader.buffer_position()
                )));
            }
            _ => {}
        }
        buf.clear();
    }
    Ok(pages)
}

/// `(xMin, xMax, yMin)` of a `<word>`, attributes in any order
fn word_box(e: &BytesStart) -> Option<(f64, f64, f64)> {
    let (mut x0, mut x1, mut top) = (None, None, None);
    for attr in e.attributes().flatten() {
        let value = std::str::from_utf8(&attr.value)
            .ok()
            .and_then(|v| v.trim().parse::<f64>().ok());
        match attr.key.as_ref() {
            b"xMin" => x0 = value,
            b"xMax" => x1 = value,
            b"yMin" => top = value,
            _ => {}
        }
    }
    Some((x0?, x1?, top?))
}

impl StatementDocument for PopplerDocument {
    fn page_count(&self) -> usize {
        self.texts.len()
    }

    fn text(&self, page: usize) -> Result<Option<String>, SourceError> {
        self.texts
            .get(page)
            .cloned()
            .ok_or(SourceError::PageOutOfRange(page))
    }

    fn words(&self, page: usize) -> Result<Vec<Word>, SourceError> {
        self.words
            .get(page)
            .cloned()
            .ok_or(SourceError::PageOutOfRange(page))
    }

    /// One inferred grid per page, whatever the requested strategy
    fn tables(&self, page: usize, _strategy: TableStrategy) -> Result<Vec<Table>, SourceError> {
        self.tables
            .get(page)
            .cloned()
            .ok_or(SourceError::PageOutOfRange(page))
    }
}
