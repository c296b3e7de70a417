use caseforge_core::ExportData;
use csv::{QuoteStyle, Terminator};

use crate::TABLE_HEADERS;
use crate::error::ExportError;

/// Separator placed between steps inside the single Steps field.
pub const STEP_SEPARATOR: &str = " | ";

/// Render test cases as CSV: one header row, then one row per case in order.
pub fn render_csv(data: &ExportData) -> Result<String, ExportError> {
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

    generate_csv(&TABLE_HEADERS, &rows)
}

/// Generate a CSV string from headers and rows.
///
/// Every field is wrapped in double quotes and embedded quotes are doubled.
/// Rows are joined by `\n`; there is no terminator after the last row.
pub fn generate_csv(headers: &[&str], rows: &[Vec<String>]) -> Result<String, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .double_quote(true)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(headers)?;
    for row in rows {
        writer.write_record(row)?;
    }

    let mut bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Io(e.into_error()))?;
    if bytes.last() == Some(&b'\n') {
        bytes.pop();
    }

    String::from_utf8(bytes)
        .map_err(|e| ExportError::Rendering(format!("CSV output contained invalid UTF-8: {e}")))
}

/// Parse a CSV string into headers and rows.
///
/// The first record is treated as the header row.
pub fn parse_csv(input: &str) -> Result<(Vec<String>, Vec<Vec<String>>), ExportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(input.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(record.iter().map(String::from).collect());
    }

    Ok((headers, rows))
}
