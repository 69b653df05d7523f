//! Table grids inferred from word boxes.
//!
//! Words on one printed line are split into cells wherever the horizontal gap
//! exceeds [`CELL_GAP`]. Column spans come from the dated rows only, where
//! every cell sits in its own column; header and continuation lines are then
//! fitted into those columns. A page without dated rows yields no grid.

use passbook_core::{FieldClassifier, Table, Word};

use crate::parsers::hdfc::group_rows;

/// Words whose tops round to the same bucket share a printed line
const ROW_BUCKET: f64 = 2.0;

/// Horizontal gap wider than this separates two cells
const CELL_GAP: f64 = 5.0;

#[derive(Debug, Clone, PartialEq)]
struct Cell {
    text: String,
    x0: f64,
    x1: f64,
}

pub(crate) fn infer_tables(words: Vec<Word>, fields: &FieldClassifier) -> Vec<Table> {
    let rows: Vec<Vec<Cell>> = group_rows(words, ROW_BUCKET)
        .into_iter()
        .map(split_cells)
        .filter(|cells| !cells.is_empty())
        .collect();

    let dated = |cells: &[Cell]| cells.iter().take(2).any(|c| fields.starts_with_date(&c.text));
    let columns = merge_spans(
        rows.iter()
            .filter(|cells| dated(cells.as_slice()))
            .flatten()
            .map(|c| (c.x0, c.x1))
            .collect(),
    );
    if columns.is_empty() {
        return Vec::new();
    }

    let grid = rows
        .iter()
        .map(|cells| {
            let mut row: Vec<Option<String>> = vec![None; columns.len()];
            for cell in cells {
                let slot = &mut row[column_for(&columns, cell)];
                match slot.as_mut() {
                    Some(text) => {
                        text.push(' ');
                        text.push_str(&cell.text);
                    }
                    None => *slot = Some(cell.text.clone()),
                }
            }
            row
        })
        .collect();
    vec![Table::new(grid)]
}

fn split_cells(row: Vec<Word>) -> Vec<Cell> {
    let mut cells: Vec<Cell> = Vec::new();
    for word in row {
        match cells.last_mut() {
            Some(cell) if word.x0 - cell.x1 <= CELL_GAP => {
                cell.text.push(' ');
                cell.text.push_str(&word.text);
                cell.x1 = cell.x1.max(word.x1);
            }
            _ => cells.push(Cell {
                text: word.text,
                x0: word.x0,
                x1: word.x1,
            }),
        }
    }
    cells
}

/// Union of overlapping spans, left to right
fn merge_spans(mut spans: Vec<(f64, f64)>) -> Vec<(f64, f64)> {
    spans.sort_by(|a, b| a.0.total_cmp(&b.0));
    let mut merged: Vec<(f64, f64)> = Vec::new();
    for (x0, x1) in spans {
        match merged.last_mut() {
            Some(last) if x0 <= last.1 => last.1 = last.1.max(x1),
            _ => merged.push((x0, x1)),
        }
    }
    merged
}

/// Column with the widest overlap, else the one whose center is nearest.
fn column_for(columns: &[(f64, f64)], cell: &Cell) -> usize {
    let overlap = |&(x0, x1): &(f64, f64)| cell.x1.min(x1) - cell.x0.max(x0);
    let best = (0..columns.len()).max_by(|&a, &b| overlap(&columns[a]).total_cmp(&overlap(&columns[b])));
    if let Some(i) = best.filter(|&i| overlap(&columns[i]) > 0.0) {
        return i;
    }
    let center = (cell.x0 + cell.x1) / 2.0;
    let distance = |&(x0, x1): &(f64, f64)| ((x0 + x1) / 2.0 - center).abs();
    (0..columns.len())
        .min_by(|&a, &b| distance(&columns[a]).total_cmp(&distance(&columns[b])))
        .unwrap_or(0)
}
