//! Declarative description of the sales table.
//!
//! Column offsets, widths and alignments are data; [`TableLayout::cells`] is the only
//! routine that turns a row of values into draw operations, for the header and the body
//! alike.

use crate::model::{HorizontalAlignment, Rgb};

use super::{DrawOp, TextOp, TextStyle};

/// A fixed-width column box, measured in points from the left page edge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Column {
    pub label: &'static str,
    pub x: f32,
    pub width: f32,
    pub alignment: HorizontalAlignment,
}

impl Column {
    const fn new(label: &'static str, x: f32, width: f32, alignment: HorizontalAlignment) -> Self {
        Self {
            label,
            x,
            width,
            alignment,
        }
    }
}

/// Number of columns in the sales table.
pub const COLUMN_COUNT: usize = 4;

/// Geometry of the sales table.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TableLayout {
    pub left: f32,
    pub right: f32,
    /// Height of the shaded header banner.
    pub header_height: f32,
    /// Distance from the top of the banner to the header labels.
    pub header_inset: f32,
    /// Rows are moved to a new page once the cursor has passed this line.
    pub page_break_y: f32,
    pub columns: [Column; COLUMN_COUNT],
}

/// The table printed in the sales report: date, seller, subtotal and total.
pub const SALES_TABLE: TableLayout = TableLayout {
    left: 50.0,
    right: 550.0,
    header_height: 20.0,
    header_inset: 5.0,
    page_break_y: super::PAGE_BREAK_Y,
    columns: [
        Column::new("Fecha", 60.0, 100.0, HorizontalAlignment::Left),
        Column::new("Vendedor", 160.0, 200.0, HorizontalAlignment::Left),
        Column::new("Subtotal", 360.0, 80.0, HorizontalAlignment::Right),
        Column::new("Total", 450.0, 80.0, HorizontalAlignment::Right),
    ],
};

/// Index of the subtotal column, whose band also holds the footer label.
pub const SUBTOTAL_COLUMN: usize = 2;
/// Index of the total column, whose band also holds the grand total.
pub const TOTAL_COLUMN: usize = 3;

impl TableLayout {
    /// Total width spanned by the table.
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    /// Returns the column labels in order.
    pub fn labels(&self) -> [&'static str; COLUMN_COUNT] {
        self.columns.map(|column| column.label)
    }

    /// Places one text cell per column at the vertical position `y`.
    pub fn cells<S>(&self, values: [S; COLUMN_COUNT], y: f32, style: TextStyle) -> Vec<DrawOp>
    where
        S: Into<String>,
    {
        self.columns
            .iter()
            .zip(values)
            .map(|(column, value)| DrawOp::Text(Self::cell(column, value, y, style)))
            .collect()
    }

    /// Places a single text cell inside the band of `column`.
    pub fn cell(column: &Column, text: impl Into<String>, y: f32, style: TextStyle) -> TextOp {
        TextOp {
            text: text.into(),
            x: column.x,
            y,
            width: column.width,
            alignment: column.alignment,
            style,
        }
    }

    /// Shaded banner behind the header labels.
    pub fn header_band(&self, top: f32) -> DrawOp {
        DrawOp::Band {
            x: self.left,
            y: top,
            width: self.width(),
            height: self.header_height,
            color: Rgb::HEADER_FILL,
        }
    }

    /// Horizontal rule across the full table width.
    pub fn rule(&self, y: f32, color: Rgb) -> DrawOp {
        DrawOp::Rule {
            from_x: self.left,
            to_x: self.right,
            y,
            color,
        }
    }
}
