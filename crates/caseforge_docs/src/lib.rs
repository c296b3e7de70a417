// Test-case export: CSV, XLSX and paginated PDF renderings of one ExportData.

pub mod csv;
pub mod error;
pub mod export;
pub mod pdf;
pub mod theme;
pub mod xlsx;

pub use error::{ErrorKind, ExportError};
pub use export::{
    CsvExporter, ExportFormat, ExportRequest, ExportedFile, Exporter, PdfExporter, XlsxExporter,
    export, export_async, export_on, suggested_filename,
};

/// Column titles shared by the CSV and XLSX renderings, in output order.
pub const TABLE_HEADERS: [&str; 6] = [
    "Test Case ID",
    "Title",
    "Category",
    "Expected Result",
    "Test Data",
    "Steps",
];
