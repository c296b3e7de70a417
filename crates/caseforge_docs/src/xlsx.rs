use caseforge_core::ExportData;
use rust_xlsxwriter::{
    Color, DocProperties, ExcelDateTime, Format, FormatAlign, FormatPattern, Workbook,
};

use crate::TABLE_HEADERS;
use crate::error::ExportError;
use crate::theme::{BRAND_BLUE, HEADER_TEXT};

pub const SHEET_NAME: &str = "Test Cases";

/// Column widths in character units, aligned with [`TABLE_HEADERS`].
pub const COLUMN_WIDTHS: [f64; 6] = [15.0, 30.0, 18.0, 30.0, 20.0, 50.0];

/// Steps share one cell, one visual line per step when the cell wraps.
pub const STEP_SEPARATOR: &str = "\n";

/// Render test cases as a single-sheet workbook.
///
/// Returns the raw bytes of the xlsx file.
pub fn render_xlsx(data: &ExportData) -> Result<Vec<u8>, ExportError> {
    let rows: Vec<Vec<String>> = data
        .cases
        .iter()
        .map(|case| {
            vec![
                case.id.clone(),
                case.title.clone(),
                case.category.clone(),
                case.expected_result.clone(),
                case.test_data_or_placeholder().to_string(),
                case.joined_steps(STEP_SEPARATOR),
            ]
        })
        .collect();

    generate_xlsx(SHEET_NAME, &TABLE_HEADERS, &COLUMN_WIDTHS, &rows)
}

fn header_format() -> Format {
    Format::new()
        .set_bold()
        .set_font_color(Color::RGB(HEADER_TEXT))
        .set_background_color(Color::RGB(BRAND_BLUE))
        .set_pattern(FormatPattern::Solid)
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::Top)
        .set_text_wrap()
}

/// Generate an XLSX file with one named sheet, a styled header row and
/// fixed column widths.
///
/// Every cell is written as a string so identifiers like `"001"` keep their
/// exact text. Data cells carry no format.
pub fn generate_xlsx(
    sheet_name: &str,
    headers: &[&str],
    widths: &[f64],
    rows: &[Vec<String>],
) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();

    // A fixed creation date keeps the output byte-for-byte reproducible.
    let created = ExcelDateTime::from_ymd(2024, 1, 1)?;
    workbook.set_properties(&DocProperties::new().set_creation_datetime(&created));

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name)?;

    for (col, width) in widths.iter().enumerate() {
        worksheet.set_column_width(col as u16, *width)?;
    }

    let header_format = header_format();
    for (col, header) in headers.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *header, &header_format)?;
    }

    for (row_idx, row) in rows.iter().enumerate() {
        let excel_row = (row_idx + 1) as u32;
        for (col_idx, cell) in row.iter().enumerate() {
            worksheet.write_string(excel_row, col_idx as u16, cell)?;
        }
    }

    Ok(workbook.save_to_buffer()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use caseforge_core::TestCase;
    use std::io::{Cursor, Read};

    fn case(id: &str, steps: &[&str], test_data: Option<&str>) -> TestCase {
        TestCase {
            id: id.into(),
            title: format!("Title {id}"),
            category: "Negative".into(),
            steps: steps.iter().map(|s| s.to_string()).collect(),
            test_data: test_data.map(String::from),
            expected_result: format!("Result {id}"),
        }
    }

    fn data(cases: Vec<TestCase>) -> ExportData {
        ExportData {
            story_title: "Login".into(),
            description: Some("As a user".into()),
            acceptance_criteria: None,
            cases,
        }
    }

    fn read_entry(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut file = archive.by_name(name).unwrap();
        let mut out = String::new();
        file.read_to_string(&mut out).unwrap();
        out
    }

    #[test]
    fn test_output_is_zip_container() {
        let bytes = render_xlsx(&data(vec![case("TC-01", &["a"], None)])).unwrap();
        assert!(bytes.len() > 100);
        assert_eq!(&bytes[0..2], b"PK");
    }

    #[test]
    fn test_sheet_is_named() {
        let bytes = render_xlsx(&data(vec![])).unwrap();
        let workbook = read_entry(&bytes, "xl/workbook.xml");
        assert!(workbook.contains(r#"name="Test Cases""#));
    }

    #[test]
    fn test_steps_joined_with_newline() {
        let bytes =
            render_xlsx(&data(vec![case("TC-01", &["Open app", "Tap login"], None)])).unwrap();
        let strings = read_entry(&bytes, "xl/sharedStrings.xml");
        assert!(strings.contains("Open app\nTap login"));
        assert!(!strings.contains("Open app | Tap login"));
    }

    #[test]
    fn test_missing_test_data_renders_placeholder() {
        let bytes = render_xlsx(&data(vec![case("TC-01", &["a"], None)])).unwrap();
        let strings = read_entry(&bytes, "xl/sharedStrings.xml");
        assert!(strings.contains(">N/A<"));
    }

    #[test]
    fn test_headers_and_row_order() {
        let cases = vec![
            case("TC-02", &[], Some("d2")),
            case("TC-01", &[], Some("d1")),
        ];
        let bytes = render_xlsx(&data(cases)).unwrap();
        let strings = read_entry(&bytes, "xl/sharedStrings.xml");

        let pos = |needle: &str| strings.find(needle).unwrap();
        assert!(pos("Test Case ID") < pos("Steps"));
        assert!(pos("Steps") < pos("TC-02"));
        assert!(pos("TC-02") < pos("TC-01"));
    }

    #[test]
    fn test_empty_steps_still_write_row() {
        let bytes = render_xlsx(&data(vec![case("TC-01", &[], None)])).unwrap();
        let sheet = read_entry(&bytes, "xl/worksheets/sheet1.xml");
        // Header row plus one data row.
        assert!(sheet.contains(r#"<row r="1""#));
        assert!(sheet.contains(r#"<row r="2""#));
        assert!(sheet.contains(r#"r="E2""#));
    }

    #[test]
    fn test_column_widths_are_fixed() {
        let bytes = render_xlsx(&data(vec![])).unwrap();
        let sheet = read_entry(&bytes, "xl/worksheets/sheet1.xml");
        assert_eq!(sheet.matches(r#"customWidth="1""#).count(), COLUMN_WIDTHS.len());
    }

    #[test]
    fn test_header_style_present() {
        let bytes = render_xlsx(&data(vec![])).unwrap();
        let styles = read_entry(&bytes, "xl/styles.xml");
        assert!(styles.contains("FF0052CC"));
        assert!(styles.contains("<b/>"));
        assert!(styles.contains(r#"wrapText="1""#));
    }

    #[test]
    fn test_numeric_looking_ids_stay_text() {
        let bytes = render_xlsx(&data(vec![case("001", &[], None)])).unwrap();
        let strings = read_entry(&bytes, "xl/sharedStrings.xml");
        assert!(strings.contains(">001<"));
    }

    #[test]
    fn test_deterministic_parts() {
        let d = data(vec![case("TC-01", &["a", "b"], Some("x"))]);
        let first = render_xlsx(&d).unwrap();
        let second = render_xlsx(&d).unwrap();
        for part in [
            "xl/worksheets/sheet1.xml",
            "xl/sharedStrings.xml",
            "xl/styles.xml",
        ] {
            assert_eq!(read_entry(&first, part), read_entry(&second, part), "{part}");
        }
    }

    #[test]
    fn test_large_dataset() {
        let cases: Vec<TestCase> = (0..500)
            .map(|i| case(&format!("TC-{i:03}"), &["step"], None))
            .collect();
        let bytes = render_xlsx(&data(cases)).unwrap();
        assert!(bytes.len() > 1000);
    }

    #[test]
    fn test_oversized_cell_fails_whole_workbook() {
        // Excel caps a cell at 32,767 characters.
        let mut tc = case("TC-01", &["a"], None);
        tc.expected_result = "x".repeat(40_000);
        let err = render_xlsx(&data(vec![case("TC-00", &[], None), tc])).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::RenderingFailure);
        assert!(matches!(err, ExportError::Xlsx(_)));
    }
}
