//! Content-stream builder for a single page.
//!
//! Callers work in top-down coordinates; every operator is emitted in PDF
//! user space (origin bottom-left). Numbers are printed with two decimals so
//! identical input always yields identical bytes.

use std::fmt::Write;

use super::text::{Font, pdf_escape, text_width};
use crate::theme::rgb_channels;

/// Font, size and fill color for a run of text.
#[derive(Debug, Clone, Copy)]
pub struct TextStyle {
    pub font: Font,
    pub size: f64,
    pub color: u32,
}

pub struct Canvas {
    page_height: f64,
    ops: String,
}

fn channels(color: u32) -> String {
    let (r, g, b) = rgb_channels(color);
    format!(
        "{:.3} {:.3} {:.3}",
        f64::from(r) / 255.0,
        f64::from(g) / 255.0,
        f64::from(b) / 255.0
    )
}

impl Canvas {
    pub fn new(page_height: f64) -> Self {
        Self {
            page_height,
            ops: String::new(),
        }
    }

    fn flip(&self, y: f64) -> f64 {
        self.page_height - y
    }

    // `fmt::Write` for `String` never fails.
    fn op(&mut self, args: std::fmt::Arguments<'_>) {
        let _ = self.ops.write_fmt(args);
        self.ops.push('\n');
    }

    /// Filled rectangle with its top-left corner at (`x`, `top`).
    pub fn fill_rect(&mut self, x: f64, top: f64, width: f64, height: f64, color: u32) {
        let y = self.flip(top + height);
        let fill = channels(color);
        self.op(format_args!("{fill} rg"));
        self.op(format_args!("{x:.2} {y:.2} {width:.2} {height:.2} re f"));
    }

    /// Filled and stroked rectangle in a single color.
    pub fn fill_stroke_rect(&mut self, x: f64, top: f64, width: f64, height: f64, color: u32) {
        let y = self.flip(top + height);
        let c = channels(color);
        self.op(format_args!("{c} rg {c} RG"));
        self.op(format_args!("{x:.2} {y:.2} {width:.2} {height:.2} re B"));
    }

    /// Rectangle outline.
    pub fn stroke_rect(
        &mut self,
        x: f64,
        top: f64,
        width: f64,
        height: f64,
        color: u32,
        line_width: f64,
    ) {
        let y = self.flip(top + height);
        let stroke = channels(color);
        self.op(format_args!("{stroke} RG {line_width:.2} w"));
        self.op(format_args!("{x:.2} {y:.2} {width:.2} {height:.2} re S"));
    }

    /// Vertical line from `top` down to `bottom`.
    pub fn vertical_line(&mut self, x: f64, top: f64, bottom: f64, color: u32, line_width: f64) {
        let (y1, y2) = (self.flip(top), self.flip(bottom));
        let stroke = channels(color);
        self.op(format_args!("{stroke} RG {line_width:.2} w"));
        self.op(format_args!("{x:.2} {y1:.2} m {x:.2} {y2:.2} l S"));
    }

    /// One line of text whose baseline sits at `baseline` (top-down).
    pub fn text(&mut self, x: f64, baseline: f64, style: &TextStyle, text: &str) {
        let y = self.flip(baseline);
        let fill = channels(style.color);
        let resource = style.font.resource();
        let size = style.size;
        let body = pdf_escape(text);
        self.op(format_args!("{fill} rg"));
        self.op(format_args!(
            "BT /{resource} {size:.2} Tf {x:.2} {y:.2} Td ({body}) Tj ET"
        ));
    }

    /// Text centered horizontally in `[x, x + width]`.
    pub fn centered_text(
        &mut self,
        x: f64,
        width: f64,
        baseline: f64,
        style: &TextStyle,
        text: &str,
    ) {
        let offset = ((width - text_width(text, style.font, style.size)) / 2.0).max(0.0);
        self.text(x + offset, baseline, style, text);
    }

    /// Restrict drawing to a rectangle until [`restore`](Self::restore).
    pub fn clip(&mut self, x: f64, top: f64, width: f64, height: f64) {
        let y = self.flip(top + height);
        self.op(format_args!("q {x:.2} {y:.2} {width:.2} {height:.2} re W n"));
    }

    pub fn restore(&mut self) {
        self.op(format_args!("Q"));
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.ops.into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ops(canvas: Canvas) -> String {
        String::from_utf8(canvas.into_bytes()).unwrap()
    }

    #[test]
    fn test_fill_rect_flips_coordinates() {
        let mut canvas = Canvas::new(842.0);
        canvas.fill_rect(25.0, 55.0, 545.0, 22.0, 0x0052CC);
        let out = ops(canvas);
        assert!(out.contains("0.000 0.322 0.800 rg"));
        // bottom edge = 842 - (55 + 22)
        assert!(out.contains("25.00 765.00 545.00 22.00 re f"));
    }

    #[test]
    fn test_text_is_escaped() {
        let mut canvas = Canvas::new(842.0);
        let style = TextStyle {
            font: Font::HelveticaBold,
            size: 9.0,
            color: 0xFFFFFF,
        };
        canvas.text(10.0, 20.0, &style, "Login (happy path)");
        let out = ops(canvas);
        assert!(out.contains("/F2 9.00 Tf 10.00 822.00 Td (Login \\(happy path\\)) Tj"));
        assert!(out.contains("1.000 1.000 1.000 rg"));
    }

    #[test]
    fn test_centered_text_offset() {
        let mut canvas = Canvas::new(100.0);
        // "ID" = I(278) + D(722) = 1000 units -> 10pt at size 10.
        let style = TextStyle {
            font: Font::Helvetica,
            size: 10.0,
            color: 0,
        };
        canvas.centered_text(0.0, 50.0, 0.0, &style, "ID");
        assert!(ops(canvas).contains("20.00 100.00 Td"));
    }

    #[test]
    fn test_clip_and_restore_balance() {
        let mut canvas = Canvas::new(842.0);
        canvas.clip(0.0, 0.0, 10.0, 10.0);
        canvas.restore();
        let out = ops(canvas);
        assert_eq!(out.matches("q ").count(), out.matches("Q\n").count());
        assert!(out.contains("re W n"));
    }

    #[test]
    fn test_vertical_line() {
        let mut canvas = Canvas::new(842.0);
        canvas.vertical_line(75.0, 77.0, 112.0, 0xDDDDDD, 0.5);
        let out = ops(canvas);
        assert!(out.contains("75.00 765.00 m 75.00 730.00 l S"));
        assert!(out.contains("0.50 w"));
    }
}
