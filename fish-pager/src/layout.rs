//! Greedy column layout: tries `MAX_COLUMNS` down to 1, picking the
//! largest column count whose preferred width fits the terminal, grounded
//! on `fish_pager.cpp`'s `completion_try_print`/`recalc_width`.

use crate::MAX_COLUMNS;

/// A chosen column layout: how many columns, and each column's width
/// (longest item in that column plus inter-column padding).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Layout {
    pub columns: usize,
    pub rows: usize,
    pub column_widths: Vec<usize>,
}

const COLUMN_PADDING: usize = 2;

/// Chooses the widest column count (from [`MAX_COLUMNS`] down to 1) whose
/// items, laid out column-major with `rows = ceil(len / columns)`, fit
/// within `term_width`. Falls back to 1 column, clamped to `term_width`,
/// if even that doesn't fit (`fish_pager.cpp`'s "force fit if one
/// column").
pub fn choose_layout(items: &[&str], term_width: usize) -> Layout {
    if items.is_empty() {
        return Layout { columns: 0, rows: 0, column_widths: Vec::new() };
    }
    for columns in (1..=MAX_COLUMNS.min(items.len())).rev() {
        let rows = items.len().div_ceil(columns);
        let widths = column_widths(items, columns, rows);
        let total: usize = widths.iter().sum();
        if columns == 1 || total <= term_width {
            return Layout { columns, rows, column_widths: widths };
        }
    }
    unreachable!("the columns == 1 case always returns")
}

fn column_widths(items: &[&str], columns: usize, rows: usize) -> Vec<usize> {
    (0..columns)
        .map(|col| {
            let max_item = (0..rows)
                .filter_map(|row| items.get(col * rows + row))
                .map(|s| s.chars().count())
                .max()
                .unwrap_or(0);
            if col + 1 == columns { max_item } else { max_item + COLUMN_PADDING }
        })
        .collect()
}
