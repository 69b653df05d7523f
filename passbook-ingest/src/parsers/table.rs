//! Table-grid extraction shared by the Axis, YesBank, Kotak and Standard
//! families.
//!
//! Rows without a recognisable date are dropped, never merged into the
//! previous transaction. The line-oriented extractors merge instead.

use passbook_core::{BankFamily, FieldClassifier, StatementDocument, TableStrategy, Transaction};
use tracing::debug;

use super::lines::{DateLeadGrammar, run_lines};
use super::{ExtractionState, page_fragment};
use crate::error::ExtractError;

/// Header keywords naming the date column
const DATE_KEYWORDS: &[&str] = &["date", "transaction", "txn"];

/// Column semantics of one table family
pub(crate) trait RowLayout {
    /// Per-table context derived from the header row
    type Columns;

    fn family(&self) -> BankFamily;

    fn fields(&self) -> &FieldClassifier;

    /// Amount/balance-like header keywords; one must co-occur with a date keyword
    fn amount_keywords(&self) -> &[&'static str];

    fn strategy(&self) -> TableStrategy {
        TableStrategy::Text
    }

    /// Read pages without a grid through the line fallback
    fn text_fallback(&self) -> bool {
        true
    }

    fn columns(&self, header: Option<&[String]>) -> Self::Columns;

    /// Fix up extraction artefacts before classification
    fn repair_row(&self, cells: Vec<String>) -> Vec<String> {
        cells
    }

    /// Classify a cleaned row. `None` when the row has no date.
    fn classify_row(
        &self,
        cells: &[String],
        columns: &Self::Columns,
        state: &mut ExtractionState,
    ) -> Option<Transaction>;

    /// Empty record with this family's output shape
    fn blank(&self, date: &str) -> Transaction {
        Transaction::new(self.family(), date)
    }
}

pub(crate) fn extract_tables<L: RowLayout>(
    layout: &L,
    doc: &dyn StatementDocument,
) -> Result<Vec<Transaction>, ExtractError> {
    let family = layout.family();
    let mut state = ExtractionState::default();

    for page in 0..doc.page_count() {
        let Some(mut tables) = page_fragment(family, page, doc.tables(page, layout.strategy()))?
        else {
            continue;
        };
        tables.retain(|t| !t.is_empty());

        if tables.is_empty() {
            if layout.text_fallback() {
                read_text_fallback(layout, doc, page, &mut state)?;
            } else {
                debug!(%family, page, "no table grid on page");
            }
            continue;
        }

        debug!(%family, page, tables = tables.len(), "reading table grids");
        for table in &tables {
            let rows: Vec<Vec<String>> = table.rows.iter().map(|r| clean_row(r)).collect();
            let header = find_header(&rows, layout.fields(), layout.amount_keywords());
            let columns = layout.columns(header.map(|i| rows[i].as_slice()));
            let start = header.map_or(0, |i| i + 1);

            for row in &rows[start..] {
                if row.iter().filter(|c| !c.is_empty()).count() < 2 {
                    continue;
                }
                let row = layout.repair_row(row.clone());
                match layout.classify_row(&row, &columns, &mut state) {
                    Some(txn) => state.emit(txn),
                    None => debug!(%family, page, ?row, "dropping row without date"),
                }
            }
        }
    }

    Ok(state.finish())
}

fn read_text_fallback<L: RowLayout>(
    layout: &L,
    doc: &dyn StatementDocument,
    page: usize,
    state: &mut ExtractionState,
) -> Result<(), ExtractError> {
    let family = layout.family();
    let Some(text) = page_fragment(family, page, doc.text(page))?.flatten() else {
        debug!(%family, page, "page has neither grid nor text");
        return Ok(());
    };
    debug!(%family, page, "no table grid, reading page text");
    let grammar = DateLeadGrammar::new(|date: &str| layout.blank(date), layout.amount_keywords());
    run_lines(&grammar, layout.fields(), &text, state);
    Ok(())
}

/// Trim cells and collapse in-cell line breaks; missing cells become empty.
pub(crate) fn clean_row(row: &[Option<String>]) -> Vec<String> {
    row.iter()
        .map(|cell| {
            cell.as_deref()
                .unwrap_or("")
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

/// Index of the first row mentioning both a date-like and an amount-like
/// keyword. A row that itself starts with a date is data, not a header.
pub(crate) fn find_header(
    rows: &[Vec<String>],
    fields: &FieldClassifier,
    amount_keywords: &[&str],
) -> Option<usize> {
    rows.iter().position(|row| {
        let leads_with_date = row
            .iter()
            .find(|c| !c.is_empty())
            .is_some_and(|c| fields.starts_with_date(c));
        if leads_with_date {
            return false;
        }
        is_header_text(&row.join(" ").to_lowercase(), amount_keywords)
    })
}

/// Lower-cased text naming both a date column and an amount column
pub(crate) fn is_header_text(text: &str, amount_keywords: &[&str]) -> bool {
    DATE_KEYWORDS.iter().any(|k| text.contains(k)) && amount_keywords.iter().any(|k| text.contains(k))
}
