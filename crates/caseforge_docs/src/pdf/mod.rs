//! Paginated PDF report of test cases.
//!
//! Every page carries the title band, the blue header row and up to
//! [`TableLayout::rows_per_page`] data rows. Rows are shaded by their index in
//! the whole table, so alternation continues across page breaks.

pub mod canvas;
pub mod layout;
pub mod text;
pub mod writer;

use std::ops::Range;

use caseforge_core::{ExportData, TestCase};
use tracing::{debug, warn};

use crate::error::ExportError;
use crate::theme::{BODY_TEXT, BRAND_BLUE, GRID_LINE, HEADER_TEXT, row_shade};
use canvas::{Canvas, TextStyle};
use layout::{Align, TableLayout};
use text::{Font, fit_text, pdf_escape};
use writer::{BufferedSink, ChunkSink, PdfWriter};

const CATALOG_ID: usize = 1;
const PAGES_ID: usize = 2;
const BODY_FONT_ID: usize = 3;
const BOLD_FONT_ID: usize = 4;
const INFO_ID: usize = 5;
const FIRST_PAGE_ID: usize = 6;

const TITLE_SIZE: f64 = 16.0;
const HEADER_SIZE: f64 = 9.0;
const BODY_SIZE: f64 = 8.0;
const LINE_GAP: f64 = 2.0;
/// Helvetica cap height in em, for vertical centering.
const CAP_HEIGHT: f64 = 0.718;
const GRID_WIDTH: f64 = 0.5;

const REPORT_TITLE: &str = "Test Cases Report";

fn page_id(page: usize) -> usize {
    FIRST_PAGE_ID + 2 * page
}

fn content_id(page: usize) -> usize {
    page_id(page) + 1
}

/// Render `data` with the default A4 layout.
pub fn render_pdf(data: &ExportData) -> Result<Vec<u8>, ExportError> {
    render_pdf_with_layout(data, &TableLayout::default())
}

pub fn render_pdf_with_layout(
    data: &ExportData,
    layout: &TableLayout,
) -> Result<Vec<u8>, ExportError> {
    let mut sink = BufferedSink::new();
    render_to_sink(data, layout, &mut sink);
    sink.into_bytes()
}

/// Stream the document into `sink`, then signal its outcome exactly once.
pub fn render_to_sink<S: ChunkSink>(data: &ExportData, layout: &TableLayout, sink: &mut S) {
    let outcome = write_document(data, layout, sink);
    if let Err(ref e) = outcome {
        warn!(error = %e, "PDF rendering failed");
    }
    sink.finish(outcome);
}

fn write_document<S: ChunkSink>(
    data: &ExportData,
    layout: &TableLayout,
    sink: &mut S,
) -> Result<(), ExportError> {
    layout.validate()?;
    let pages = layout.paginate(data.cases.len());

    let mut writer = PdfWriter::new(sink);
    writer.write_header()?;

    writer.write_object(
        CATALOG_ID,
        &format!("<< /Type /Catalog /Pages {PAGES_ID} 0 R >>"),
    )?;

    let kids: Vec<String> = (0..pages.len())
        .map(|i| format!("{} 0 R", page_id(i)))
        .collect();
    writer.write_object(
        PAGES_ID,
        &format!(
            "<< /Type /Pages /Kids [{}] /Count {} /MediaBox [0 0 {} {}] >>",
            kids.join(" "),
            pages.len(),
            layout.page_width,
            layout.page_height
        ),
    )?;

    for (id, font) in [(BODY_FONT_ID, Font::Helvetica), (BOLD_FONT_ID, Font::HelveticaBold)] {
        writer.write_object(
            id,
            &format!(
                "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                font.base_font()
            ),
        )?;
    }

    writer.write_object(
        INFO_ID,
        &format!(
            "<< /Title ({}) /Producer (Caseforge) >>",
            pdf_escape(&title_line(data))
        ),
    )?;

    for (index, rows) in pages.iter().enumerate() {
        writer.write_object(
            page_id(index),
            &format!(
                "<< /Type /Page /Parent {PAGES_ID} 0 R /Contents {} 0 R \
                 /Resources << /Font << /F1 {BODY_FONT_ID} 0 R /F2 {BOLD_FONT_ID} 0 R >> >> >>",
                content_id(index)
            ),
        )?;
        let content = draw_page(data, layout, rows.clone());
        writer.write_stream(content_id(index), &content)?;
    }

    writer.finish(CATALOG_ID, INFO_ID)?;
    debug!(pages = pages.len(), rows = data.cases.len(), "PDF document written");
    Ok(())
}

fn title_line(data: &ExportData) -> String {
    let story = data.story_title.trim();
    if story.is_empty() {
        REPORT_TITLE.to_string()
    } else {
        format!("{REPORT_TITLE} - {story}")
    }
}

fn draw_page(data: &ExportData, layout: &TableLayout, rows: Range<usize>) -> Vec<u8> {
    let mut canvas = Canvas::new(layout.page_height);
    draw_title(&mut canvas, layout, &title_line(data));
    draw_header(&mut canvas, layout);

    let first_top = layout.table_top() + layout.header_height;
    for (slot, index) in rows.enumerate() {
        let top = first_top + slot as f64 * layout.row_height;
        draw_row(&mut canvas, layout, top, index, &data.cases[index]);
    }
    canvas.into_bytes()
}

fn draw_title(canvas: &mut Canvas, layout: &TableLayout, title: &str) {
    let style = TextStyle {
        font: Font::HelveticaBold,
        size: TITLE_SIZE,
        color: BODY_TEXT,
    };
    let width = layout.printable_width();
    let line = fit_text(title, style.font, style.size, width, 1)
        .into_iter()
        .next()
        .unwrap_or_default();
    let baseline = layout.margin + (layout.title_height + TITLE_SIZE * CAP_HEIGHT) / 2.0;
    canvas.centered_text(layout.margin, width, baseline, &style, &line);
}

fn draw_header(canvas: &mut Canvas, layout: &TableLayout) {
    let top = layout.table_top();
    let bottom = top + layout.header_height;
    canvas.fill_stroke_rect(
        layout.margin,
        top,
        layout.printable_width(),
        layout.header_height,
        BRAND_BLUE,
    );

    let style = TextStyle {
        font: Font::HelveticaBold,
        size: HEADER_SIZE,
        color: HEADER_TEXT,
    };
    let baseline = top + (layout.header_height + HEADER_SIZE * CAP_HEIGHT) / 2.0;
    let offsets = layout.column_offsets();

    for (i, (column, x)) in layout.columns.iter().zip(&offsets).enumerate() {
        if i > 0 {
            canvas.vertical_line(*x, top, bottom, HEADER_TEXT, GRID_WIDTH);
        }
        let interior = layout.interior_width(column);
        let label = fit_text(column.label, style.font, style.size, interior, 1)
            .into_iter()
            .next()
            .unwrap_or_default();
        place_text(canvas, column.align, *x + layout.cell_inset, interior, baseline, &style, &label);
    }
}

fn draw_row(canvas: &mut Canvas, layout: &TableLayout, top: f64, index: usize, case: &TestCase) {
    let width = layout.printable_width();
    canvas.fill_rect(layout.margin, top, width, layout.row_height, row_shade(index));
    canvas.stroke_rect(layout.margin, top, width, layout.row_height, GRID_LINE, GRID_WIDTH);

    let style = TextStyle {
        font: Font::Helvetica,
        size: BODY_SIZE,
        color: BODY_TEXT,
    };
    let line_height = BODY_SIZE + LINE_GAP;
    let inner_height = layout.row_height - 2.0 * layout.cell_inset;
    let max_lines = ((inner_height / line_height).floor() as usize).max(1);

    let values = [
        case.id.as_str(),
        case.title.as_str(),
        case.category.as_str(),
        case.expected_result.as_str(),
    ];
    let offsets = layout.column_offsets();

    for (i, ((column, x), value)) in layout.columns.iter().zip(&offsets).zip(values).enumerate() {
        if i > 0 {
            canvas.vertical_line(*x, top, top + layout.row_height, GRID_LINE, GRID_WIDTH);
        }
        let left = *x + layout.cell_inset;
        let interior = layout.interior_width(column);
        let lines = fit_text(value, style.font, style.size, interior, max_lines);

        canvas.clip(left, top + layout.cell_inset, interior, inner_height);
        for (n, line) in lines.iter().enumerate() {
            let baseline = top + layout.cell_inset + BODY_SIZE + n as f64 * line_height;
            place_text(canvas, column.align, left, interior, baseline, &style, line);
        }
        canvas.restore();
    }
}

fn place_text(
    canvas: &mut Canvas,
    align: Align,
    left: f64,
    width: f64,
    baseline: f64,
    style: &TextStyle,
    text: &str,
) {
    match align {
        Align::Left => canvas.text(left, baseline, style, text),
        Align::Center => canvas.centered_text(left, width, baseline, style, text),
    }
}
