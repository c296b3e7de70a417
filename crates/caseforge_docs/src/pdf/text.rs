//! Text measurement, wrapping and PDF string encoding for the two built-in
//! fonts. Widths are the standard Type 1 metrics in 1/1000 em.

/// The two base-14 fonts the document uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Helvetica,
    HelveticaBold,
}

impl Font {
    /// Resource name inside the page's font dictionary.
    pub fn resource(self) -> &'static str {
        match self {
            Font::Helvetica => "F1",
            Font::HelveticaBold => "F2",
        }
    }

    pub fn base_font(self) -> &'static str {
        match self {
            Font::Helvetica => "Helvetica",
            Font::HelveticaBold => "Helvetica-Bold",
        }
    }

    fn widths(self) -> &'static [u16; 95] {
        match self {
            Font::Helvetica => &HELVETICA_WIDTHS,
            Font::HelveticaBold => &HELVETICA_BOLD_WIDTHS,
        }
    }
}

// Printable ASCII 0x20..=0x7E.
#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    278, 278, 584, 584, 584, 556, 1015,
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    278, 278, 278, 469, 556, 333,
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,
    334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    333, 333, 584, 584, 584, 611, 975,
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    333, 278, 333, 584, 556, 333,
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
    389, 280, 389, 584,
];

/// Width used for glyphs outside printable ASCII.
const FALLBACK_WIDTH: u16 = 556;

const ELLIPSIS: &str = "...";

fn char_width(font: Font, c: char) -> u16 {
    match c {
        ' '..='~' => font.widths()[c as usize - 0x20],
        _ => FALLBACK_WIDTH,
    }
}

/// Width of `text` in points at `size`.
pub fn text_width(text: &str, font: Font, size: f64) -> f64 {
    let units: u32 = text.chars().map(|c| u32::from(char_width(font, c))).sum();
    f64::from(units) * size / 1000.0
}

/// Greedy word wrap of `text` to `max_width` points.
///
/// Embedded newlines are hard breaks, runs of whitespace collapse, and a
/// single word wider than the box is split at character boundaries.
pub fn wrap_text(text: &str, font: Font, size: f64, max_width: f64) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            if text_width(&candidate, font, size) <= max_width {
                current = candidate;
                continue;
            }
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            // The word alone may still be too wide.
            for piece in split_word(word, font, size, max_width) {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                current = piece;
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }

    lines
}

fn split_word(word: &str, font: Font, size: f64, max_width: f64) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    for c in word.chars() {
        current.push(c);
        if text_width(&current, font, size) > max_width && current.chars().count() > 1 {
            current.pop();
            pieces.push(std::mem::take(&mut current));
            current.push(c);
        }
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

/// Wrap `text` into a box of `max_width` x `max_lines`.
///
/// When lines are dropped, the last kept line is shortened until an ellipsis
/// fits behind it.
pub fn fit_text(
    text: &str,
    font: Font,
    size: f64,
    max_width: f64,
    max_lines: usize,
) -> Vec<String> {
    let mut lines = wrap_text(text, font, size, max_width);
    if lines.len() <= max_lines {
        return lines;
    }

    lines.truncate(max_lines);
    if let Some(last) = lines.last_mut() {
        while !last.is_empty() && text_width(&format!("{last}{ELLIPSIS}"), font, size) > max_width
        {
            last.pop();
        }
        let trimmed_len = last.trim_end().len();
        last.truncate(trimmed_len);
        last.push_str(ELLIPSIS);
    }
    lines
}

/// Encode `text` as a PDF literal string body (without the parentheses).
///
/// Output is pure ASCII: `\`, `(` and `)` are escaped, Latin-1 and the
/// common typographic characters become WinAnsi octal escapes, and anything
/// else is replaced by `?`.
pub fn pdf_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '(' => out.push_str("\\("),
            ')' => out.push_str("\\)"),
            ' '..='~' => out.push(c),
            '\t' | '\r' | '\n' => out.push(' '),
            _ => match win_ansi_code(c) {
                Some(code) => out.push_str(&format!("\\{code:03o}")),
                None => out.push('?'),
            },
        }
    }
    out
}

fn win_ansi_code(c: char) -> Option<u8> {
    match c {
        '\u{A0}'..='\u{FF}' => Some(c as u8),
        '\u{2026}' => Some(0x85),
        '\u{2018}' => Some(0x91),
        '\u{2019}' => Some(0x92),
        '\u{201C}' => Some(0x93),
        '\u{201D}' => Some(0x94),
        '\u{2022}' => Some(0x95),
        '\u{2013}' => Some(0x96),
        '\u{2014}' => Some(0x97),
        '\u{20AC}' => Some(0x80),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_width() {
        // "Hi" = H(722) + i(222) at 10pt.
        assert!((text_width("Hi", Font::Helvetica, 10.0) - 9.44).abs() < 1e-9);
        assert!(text_width("Hi", Font::HelveticaBold, 10.0) > text_width("Hi", Font::Helvetica, 10.0));
        assert_eq!(text_width("", Font::Helvetica, 10.0), 0.0);
    }

    #[test]
    fn test_wrap_short_text_single_line() {
        let lines = wrap_text("Valid login", Font::Helvetica, 8.0, 200.0);
        assert_eq!(lines, vec!["Valid login"]);
    }

    #[test]
    fn test_wrap_respects_width() {
        let text = "The user is redirected to the dashboard and sees a welcome banner";
        let lines = wrap_text(text, Font::Helvetica, 8.0, 80.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width(line, Font::Helvetica, 8.0) <= 80.0, "{line}");
        }
        assert_eq!(lines.join(" "), text);
    }

    #[test]
    fn test_wrap_splits_long_words() {
        let word = "a".repeat(100);
        let lines = wrap_text(&word, Font::Helvetica, 8.0, 40.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), word);
        for line in &lines {
            assert!(text_width(line, Font::Helvetica, 8.0) <= 40.0);
        }
    }

    #[test]
    fn test_wrap_hard_breaks() {
        let lines = wrap_text("one\ntwo", Font::Helvetica, 8.0, 500.0);
        assert_eq!(lines, vec!["one", "two"]);
    }

    #[test]
    fn test_wrap_empty() {
        assert!(wrap_text("", Font::Helvetica, 8.0, 50.0).is_empty());
        assert!(wrap_text("   ", Font::Helvetica, 8.0, 50.0).is_empty());
    }

    #[test]
    fn test_fit_text_clips_with_ellipsis() {
        let text = "word ".repeat(60);
        let lines = fit_text(&text, Font::Helvetica, 8.0, 60.0, 2);
        assert_eq!(lines.len(), 2);
        assert!(lines[1].ends_with("..."));
        assert!(text_width(&lines[1], Font::Helvetica, 8.0) <= 60.0);
    }

    #[test]
    fn test_fit_text_untouched_when_it_fits() {
        let lines = fit_text("short", Font::Helvetica, 8.0, 60.0, 2);
        assert_eq!(lines, vec!["short"]);
    }

    #[test]
    fn test_pdf_escape() {
        assert_eq!(pdf_escape("hello"), "hello");
        assert_eq!(pdf_escape("(test)"), "\\(test\\)");
        assert_eq!(pdf_escape("a\\b"), "a\\\\b");
    }

    #[test]
    fn test_pdf_escape_non_ascii() {
        assert_eq!(pdf_escape("café"), "caf\\351");
        assert_eq!(pdf_escape("it’s"), "it\\222s");
        assert_eq!(pdf_escape("日本"), "??");
        assert_eq!(pdf_escape("a\tb"), "a b");
        assert!(pdf_escape("naïve – “quoted”").is_ascii());
    }
}
