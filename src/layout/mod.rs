//! Report layout engine.
//!
//! The engine walks the report phases once (header, title, empty check, table header,
//! rows, footer) and records every drawing as a [`DrawOp`] in page order. Coordinates
//! are PDF points measured from the top-left corner of an A4 page, so the trace can be
//! inspected without a font cache or a PDF backend. [`crate::elements::PageCanvas`]
//! replays the trace onto a `genpdf` document.

pub mod table;

use chrono::{DateTime, FixedOffset, Utc};
use log::debug;
use thiserror::Error;

use crate::locale::format_date;
use crate::model::{CompanyProfile, HorizontalAlignment, Rgb, SaleRecord, MISSING_VALUE};
use crate::money::format_money;

pub use table::{Column, TableLayout, SALES_TABLE};

/// A4 width in points.
pub const PAGE_WIDTH: f32 = 595.28;
/// A4 height in points.
pub const PAGE_HEIGHT: f32 = 841.89;
/// Margin applied on every side of the page.
pub const MARGIN: f32 = 50.0;
/// Row page-break line of the sales table.
pub const PAGE_BREAK_Y: f32 = 750.0;

/// Line height as a multiple of the font size.
const LINE_HEIGHT_FACTOR: f32 = 1.156;

const LOGO_X: f32 = 50.0;
const LOGO_Y: f32 = 40.0;
const LOGO_WIDTH: f32 = 100.0;
const COMPANY_BLOCK_X: f32 = 400.0;
const COMPANY_BLOCK_Y: f32 = 50.0;

const FALLBACK_NAME_SIZE: u8 = 18;
const COMPANY_SIZE: u8 = 10;
const TITLE_SIZE: u8 = 22;
const SUBTITLE_SIZE: u8 = 12;
const EMPTY_MESSAGE_SIZE: u8 = 14;
const HEADER_LABEL_SIZE: u8 = 10;
const ROW_SIZE: u8 = 9;
const TOTAL_SIZE: u8 = 12;

pub const REPORT_TITLE: &str = "Reporte de Ventas";
pub const EMPTY_MESSAGE: &str = "No se encontraron ventas registradas.";
pub const GRAND_TOTAL_LABEL: &str = "Total General:";

/// Height of one line of text at `size` points.
pub fn line_height(size: u8) -> f32 {
    f32::from(size) * LINE_HEIGHT_FACTOR
}

/// Font attributes of a text operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextStyle {
    pub size: u8,
    pub bold: bool,
    pub color: Rgb,
}

impl TextStyle {
    /// Regular black text at the given size.
    pub const fn regular(size: u8) -> Self {
        Self {
            size,
            bold: false,
            color: Rgb::BLACK,
        }
    }

    /// Bold black text at the given size.
    pub const fn bold(size: u8) -> Self {
        Self {
            size,
            bold: true,
            color: Rgb::BLACK,
        }
    }

    /// Returns the style with a different color.
    pub const fn with_color(mut self, color: Rgb) -> Self {
        self.color = color;
        self
    }
}

/// A single line of text placed inside a horizontal box starting at `x`.
#[derive(Clone, Debug, PartialEq)]
pub struct TextOp {
    pub text: String,
    pub x: f32,
    /// Top of the text line.
    pub y: f32,
    pub width: f32,
    pub alignment: HorizontalAlignment,
    pub style: TextStyle,
}

/// One drawing on a page.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    /// The company logo, scaled to `width` with its aspect ratio kept.
    Logo { x: f32, y: f32, width: f32 },
    Text(TextOp),
    /// Horizontal 1pt stroke centered on `y`.
    Rule {
        from_x: f32,
        to_x: f32,
        y: f32,
        color: Rgb,
    },
    /// Filled rectangle with its top-left corner at (`x`, `y`).
    Band {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Rgb,
    },
}

/// Fixed inputs of a layout pass that do not come from the store.
#[derive(Clone, Debug)]
pub struct ReportHeader<'a> {
    pub company: &'a CompanyProfile,
    /// Whether a logo image will be available when the trace is replayed.
    pub logo_available: bool,
    pub generated_at: DateTime<Utc>,
    pub utc_offset: FixedOffset,
}

/// Result of a layout pass.
#[derive(Clone, Debug, PartialEq)]
pub struct ReportLayout {
    pub pages: Vec<Vec<DrawOp>>,
    pub grand_total: f64,
    pub row_count: usize,
}

impl ReportLayout {
    /// Number of pages in the trace.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Iterates over all text operations in page order.
    pub fn texts(&self) -> impl Iterator<Item = &TextOp> {
        self.pages.iter().flatten().filter_map(|op| match op {
            DrawOp::Text(text) => Some(text),
            _ => None,
        })
    }
}

/// Errors raised while laying out the report.
#[derive(Debug, Error, PartialEq)]
pub enum LayoutError {
    #[error("sale #{row} has a {field} that is not a finite amount ({value})")]
    InvalidAmount {
        row: usize,
        field: &'static str,
        value: f64,
    },
}

/// Mutable state of one layout pass.
struct LayoutState {
    cursor: f32,
    grand_total: f64,
    pages: Vec<Vec<DrawOp>>,
}

impl LayoutState {
    fn new() -> Self {
        Self {
            cursor: MARGIN,
            grand_total: 0.0,
            pages: vec![Vec::new()],
        }
    }

    fn push(&mut self, op: DrawOp) {
        if let Some(page) = self.pages.last_mut() {
            page.push(op);
        }
    }

    fn extend(&mut self, ops: impl IntoIterator<Item = DrawOp>) {
        for op in ops {
            self.push(op);
        }
    }

    fn advance(&mut self, distance: f32) {
        self.cursor += distance;
    }

    fn start_page(&mut self, cursor: f32) {
        self.pages.push(Vec::new());
        self.cursor = cursor;
    }

    /// Text centered between the page margins at the cursor, then one line down.
    fn centered_line(&mut self, text: impl Into<String>, style: TextStyle) {
        self.push(DrawOp::Text(TextOp {
            text: text.into(),
            x: MARGIN,
            y: self.cursor,
            width: PAGE_WIDTH - 2.0 * MARGIN,
            alignment: HorizontalAlignment::Center,
            style,
        }));
        self.advance(line_height(style.size));
    }

    fn finish(self, row_count: usize) -> ReportLayout {
        ReportLayout {
            pages: self.pages,
            grand_total: self.grand_total,
            row_count,
        }
    }
}

/// Lays out the sales report for `records`, which are printed in the given order.
pub fn lay_out(
    records: &[SaleRecord],
    header: &ReportHeader<'_>,
) -> Result<ReportLayout, LayoutError> {
    lay_out_table(records, header, &SALES_TABLE)
}

/// Lays out the report using an explicit table geometry.
pub fn lay_out_table(
    records: &[SaleRecord],
    header: &ReportHeader<'_>,
    table: &TableLayout,
) -> Result<ReportLayout, LayoutError> {
    let mut state = LayoutState::new();

    draw_company_header(&mut state, header);
    draw_title(&mut state, header);

    if records.is_empty() {
        state.centered_line(EMPTY_MESSAGE, TextStyle::regular(EMPTY_MESSAGE_SIZE));
        debug!("no sales found, laid out empty report");
        return Ok(state.finish(0));
    }

    draw_table_header(&mut state, table);
    for (index, record) in records.iter().enumerate() {
        draw_row(&mut state, table, index, record, header.utc_offset)?;
    }
    draw_footer(&mut state, table);

    let layout = state.finish(records.len());
    debug!(
        "laid out {} sales on {} page(s), grand total {}",
        layout.row_count,
        layout.page_count(),
        layout.grand_total
    );
    Ok(layout)
}

fn draw_company_header(state: &mut LayoutState, header: &ReportHeader<'_>) {
    if header.logo_available {
        state.push(DrawOp::Logo {
            x: LOGO_X,
            y: LOGO_Y,
            width: LOGO_WIDTH,
        });
    } else {
        state.push(DrawOp::Text(TextOp {
            text: header.company.display_name.clone(),
            x: LOGO_X,
            y: LOGO_Y,
            width: COMPANY_BLOCK_X - LOGO_X,
            alignment: HorizontalAlignment::Left,
            style: TextStyle::regular(FALLBACK_NAME_SIZE),
        }));
    }

    let style = TextStyle::regular(COMPANY_SIZE).with_color(Rgb::GRAY);
    state.cursor = COMPANY_BLOCK_Y;
    for line in header.company.identification_lines() {
        state.push(DrawOp::Text(TextOp {
            text: line.to_owned(),
            x: COMPANY_BLOCK_X,
            y: state.cursor,
            width: PAGE_WIDTH - MARGIN - COMPANY_BLOCK_X,
            alignment: HorizontalAlignment::Right,
            style,
        }));
        state.advance(line_height(COMPANY_SIZE));
    }
    state.advance(2.0 * line_height(COMPANY_SIZE));
}

fn draw_title(state: &mut LayoutState, header: &ReportHeader<'_>) {
    state.centered_line(
        REPORT_TITLE,
        TextStyle::regular(TITLE_SIZE).with_color(Rgb::ACCENT),
    );
    state.centered_line(
        format!(
            "Generado el: {}",
            format_date(header.generated_at, header.utc_offset)
        ),
        TextStyle::regular(SUBTITLE_SIZE),
    );
    state.advance(2.0 * line_height(SUBTITLE_SIZE));
}

fn draw_table_header(state: &mut LayoutState, table: &TableLayout) {
    let top = state.cursor;
    state.push(table.header_band(top));
    state.extend(table.cells(
        table.labels(),
        top + table.header_inset,
        TextStyle::bold(HEADER_LABEL_SIZE),
    ));
    state.push(table.rule(top + table.header_height, Rgb::GRAY));

    state.cursor = top + table.header_inset + line_height(HEADER_LABEL_SIZE);
    state.advance(2.5 * line_height(HEADER_LABEL_SIZE));
}

fn draw_row(
    state: &mut LayoutState,
    table: &TableLayout,
    index: usize,
    record: &SaleRecord,
    utc_offset: FixedOffset,
) -> Result<(), LayoutError> {
    let subtotal = finite_amount(index, "subtotal", record.subtotal_or_zero())?;
    let total = finite_amount(index, "total", record.total_or_zero())?;

    let date = record
        .timestamp
        .map(|timestamp| format_date(timestamp, utc_offset))
        .unwrap_or_else(|| MISSING_VALUE.to_owned());
    let seller = record.seller().unwrap_or(MISSING_VALUE).to_owned();

    if state.cursor > table.page_break_y {
        state.start_page(MARGIN + line_height(ROW_SIZE));
    }

    let y = state.cursor;
    state.extend(table.cells(
        [date, seller, format_money(subtotal), format_money(total)],
        y,
        TextStyle::regular(ROW_SIZE),
    ));
    state.advance(line_height(ROW_SIZE));
    state.grand_total += total;
    Ok(())
}

fn draw_footer(state: &mut LayoutState, table: &TableLayout) {
    let row = line_height(ROW_SIZE);
    let footer_height = 0.5 * row + row + line_height(TOTAL_SIZE);
    if state.cursor + footer_height > PAGE_HEIGHT - MARGIN {
        state.start_page(MARGIN);
    }

    state.advance(0.5 * row);
    state.push(table.rule(state.cursor, Rgb::BLACK));
    state.advance(row);

    // label and value share one baseline
    let y = state.cursor;
    let style = TextStyle::bold(TOTAL_SIZE);
    let label = TableLayout::cell(
        &table.columns[table::SUBTOTAL_COLUMN],
        GRAND_TOTAL_LABEL,
        y,
        style,
    );
    let value = TableLayout::cell(
        &table.columns[table::TOTAL_COLUMN],
        format_money(state.grand_total),
        y,
        style,
    );
    state.push(DrawOp::Text(label));
    state.push(DrawOp::Text(value));
    state.advance(line_height(TOTAL_SIZE));
}

fn finite_amount(row: usize, field: &'static str, value: f64) -> Result<f64, LayoutError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(LayoutError::InvalidAmount { row, field, value })
    }
}
