//! Page geometry and pagination for the test-case table.
//!
//! All distances are PDF points measured top-down from the page's upper edge;
//! the canvas flips them when emitting operators.

use std::ops::Range;

use crate::error::ExportError;

/// Horizontal text placement inside a cell's interior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

/// One visible column of the table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Column {
    pub label: &'static str,
    pub width: f64,
    pub align: Align,
}

/// ID, Title, Category, Expected Result. Widths sum to the A4 printable width.
pub const COLUMNS: [Column; 4] = [
    Column { label: "ID", width: 50.0, align: Align::Center },
    Column { label: "Title", width: 140.0, align: Align::Left },
    Column { label: "Category", width: 80.0, align: Align::Center },
    Column { label: "Expected Result", width: 275.0, align: Align::Left },
];

/// Fixed page and table geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct TableLayout {
    pub page_width: f64,
    pub page_height: f64,
    pub margin: f64,
    /// Band at the top of every page holding the title line.
    pub title_height: f64,
    /// Space kept free above the bottom margin.
    pub bottom_safety: f64,
    pub header_height: f64,
    pub row_height: f64,
    /// Padding between a column edge and its text.
    pub cell_inset: f64,
    pub columns: Vec<Column>,
}

impl Default for TableLayout {
    /// A4 portrait.
    fn default() -> Self {
        Self {
            page_width: 595.0,
            page_height: 842.0,
            margin: 25.0,
            title_height: 30.0,
            bottom_safety: 25.0,
            header_height: 22.0,
            row_height: 35.0,
            cell_inset: 4.0,
            columns: COLUMNS.to_vec(),
        }
    }
}

impl TableLayout {
    pub fn printable_width(&self) -> f64 {
        self.page_width - 2.0 * self.margin
    }

    /// Top edge of the header band on every page.
    pub fn table_top(&self) -> f64 {
        self.margin + self.title_height
    }

    /// Lowest position a row may reach.
    pub fn table_bottom(&self) -> f64 {
        self.page_height - self.margin - self.bottom_safety
    }

    /// Height available to the header band plus rows on one page.
    pub fn table_height(&self) -> f64 {
        self.table_bottom() - self.table_top()
    }

    /// Rows that fit under one header band.
    pub fn rows_per_page(&self) -> usize {
        ((self.table_height() - self.header_height) / self.row_height).floor() as usize
    }

    /// Left edge of each column.
    pub fn column_offsets(&self) -> Vec<f64> {
        self.columns
            .iter()
            .scan(self.margin, |x, col| {
                let left = *x;
                *x += col.width;
                Some(left)
            })
            .collect()
    }

    /// Width available to text inside a column.
    pub fn interior_width(&self, column: &Column) -> f64 {
        column.width - 2.0 * self.cell_inset
    }

    /// Check that the numbers are self-consistent.
    pub fn validate(&self) -> Result<(), ExportError> {
        let total: f64 = self.columns.iter().map(|c| c.width).sum();
        if (total - self.printable_width()).abs() > 0.01 {
            return Err(ExportError::Rendering(format!(
                "column widths sum to {total}, printable width is {}",
                self.printable_width()
            )));
        }
        if let Some(col) = self.columns.iter().find(|c| self.interior_width(c) <= 0.0) {
            return Err(ExportError::Rendering(format!(
                "column '{}' is narrower than its padding",
                col.label
            )));
        }
        if self.row_height <= 2.0 * self.cell_inset {
            return Err(ExportError::Rendering("row height leaves no room for text".into()));
        }
        if self.rows_per_page() == 0 {
            return Err(ExportError::Rendering("no row fits on a page".into()));
        }
        Ok(())
    }

    /// Split `rows` rows into pages.
    ///
    /// Checked per row: before placing a row, if it would cross
    /// [`table_bottom`](Self::table_bottom) a new page starts and the header
    /// band is redrawn. An empty table still yields one page.
    pub fn paginate(&self, rows: usize) -> Vec<Range<usize>> {
        let fresh_cursor = self.table_top() + self.header_height;
        let mut pages = Vec::new();
        let mut start = 0;
        let mut cursor = fresh_cursor;

        for row in 0..rows {
            if cursor + self.row_height > self.table_bottom() && row > start {
                pages.push(start..row);
                start = row;
                cursor = fresh_cursor;
            }
            cursor += self.row_height;
        }
        pages.push(start..rows);
        pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout_is_consistent() {
        let layout = TableLayout::default();
        assert!(layout.validate().is_ok());
        assert_eq!(layout.printable_width(), 545.0);
        let total: f64 = layout.columns.iter().map(|c| c.width).sum();
        assert_eq!(total, layout.printable_width());
    }

    #[test]
    fn test_rows_per_page_default() {
        // (842 - 25 - 25 - 30 - 22) / 35 = 20.4
        assert_eq!(TableLayout::default().rows_per_page(), 20);
    }

    #[test]
    fn test_column_offsets() {
        let layout = TableLayout::default();
        assert_eq!(layout.column_offsets(), vec![25.0, 75.0, 215.0, 295.0]);
    }

    #[test]
    fn test_paginate_empty_table_has_one_page() {
        assert_eq!(TableLayout::default().paginate(0), vec![0..0]);
    }

    #[test]
    fn test_paginate_matches_rows_per_page() {
        let layout = TableLayout::default();
        let per_page = layout.rows_per_page();
        for total in [1, 19, 20, 21, 40, 41, 137, 1000] {
            let pages = layout.paginate(total);
            assert_eq!(pages.len(), total.div_ceil(per_page), "total = {total}");
            // Contiguous, ordered, complete.
            let mut next = 0;
            for page in &pages {
                assert_eq!(page.start, next);
                assert!(page.len() <= per_page);
                next = page.end;
            }
            assert_eq!(next, total);
        }
    }

    #[test]
    fn test_paginate_custom_geometry() {
        let layout = TableLayout {
            page_height: 300.0,
            margin: 10.0,
            title_height: 20.0,
            bottom_safety: 10.0,
            header_height: 20.0,
            row_height: 50.0,
            ..TableLayout::default()
        };
        // table height = (300 - 10 - 10) - (10 + 20) = 250, minus header = 230 -> 4 rows
        assert_eq!(layout.rows_per_page(), 4);
        let pages = layout.paginate(9);
        assert_eq!(pages, vec![0..4, 4..8, 8..9]);
    }

    #[test]
    fn test_validate_rejects_bad_widths() {
        let mut layout = TableLayout::default();
        layout.columns[3].width = 200.0;
        assert!(layout.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_oversized_rows() {
        let layout = TableLayout {
            row_height: 2000.0,
            ..TableLayout::default()
        };
        assert!(layout.validate().is_err());
    }

    #[test]
    fn test_interior_fits_inside_column() {
        let layout = TableLayout::default();
        for col in &layout.columns {
            let interior = layout.interior_width(col);
            assert!(interior > 0.0 && interior < col.width);
        }
    }
}
