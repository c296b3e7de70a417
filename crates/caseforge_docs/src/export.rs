//! Format selection and the single entry point used by outer layers.

use std::fmt;
use std::str::FromStr;

use caseforge_core::{ExportData, ModelError};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::error::ExportError;

/// One of the three supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Xlsx,
    Pdf,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Csv, ExportFormat::Xlsx, ExportFormat::Pdf];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Xlsx => "xlsx",
            Self::Pdf => "pdf",
        }
    }

    /// The serializer for this format.
    pub fn exporter(self) -> &'static dyn Exporter {
        match self {
            Self::Csv => &CsvExporter,
            Self::Xlsx => &XlsxExporter,
            Self::Pdf => &PdfExporter,
        }
    }

    pub fn mime_type(self) -> &'static str {
        self.exporter().mime_type()
    }

    pub fn extension(self) -> &'static str {
        self.exporter().extension()
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    /// Exact lowercase literals only.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "csv" => Ok(Self::Csv),
            "xlsx" => Ok(Self::Xlsx),
            "pdf" => Ok(Self::Pdf),
            other => Err(ExportError::InvalidFormat(other.to_string())),
        }
    }
}

/// A serializer from [`ExportData`] to the bytes of one file format.
pub trait Exporter: Send + Sync {
    fn export(&self, data: &ExportData) -> Result<Vec<u8>, ExportError>;
    fn mime_type(&self) -> &'static str;
    fn extension(&self) -> &'static str;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CsvExporter;

impl Exporter for CsvExporter {
    fn export(&self, data: &ExportData) -> Result<Vec<u8>, ExportError> {
        crate::csv::render_csv(data).map(String::into_bytes)
    }

    fn mime_type(&self) -> &'static str {
        "text/csv"
    }

    fn extension(&self) -> &'static str {
        "csv"
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct XlsxExporter;

impl Exporter for XlsxExporter {
    fn export(&self, data: &ExportData) -> Result<Vec<u8>, ExportError> {
        crate::xlsx::render_xlsx(data)
    }

    fn mime_type(&self) -> &'static str {
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    }

    fn extension(&self) -> &'static str {
        "xlsx"
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExporter;

impl Exporter for PdfExporter {
    fn export(&self, data: &ExportData) -> Result<Vec<u8>, ExportError> {
        crate::pdf::render_pdf(data)
    }

    fn mime_type(&self) -> &'static str {
        "application/pdf"
    }

    fn extension(&self) -> &'static str {
        "pdf"
    }
}

/// A validated request to export one [`ExportData`] in one format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRequest {
    pub format: ExportFormat,
    pub data: ExportData,
}

impl ExportRequest {
    pub fn new(format: ExportFormat, data: ExportData) -> Self {
        Self { format, data }
    }

    /// Decode a `{ "format": ..., "data": {...} }` body.
    ///
    /// The format is checked before the data is decoded, so an unknown format
    /// is reported as such even when the data is also broken.
    pub fn from_json(body: &str) -> Result<Self, ExportError> {
        let mut value: Value = serde_json::from_str(body)?;
        let Some(object) = value.as_object_mut() else {
            return Err(ExportError::MalformedInput(
                "export request must be a JSON object".into(),
            ));
        };

        let format = match object.get("format") {
            Some(Value::String(format)) => format.parse::<ExportFormat>()?,
            Some(other) => return Err(ExportError::InvalidFormat(other.to_string())),
            None => return Err(ModelError::MissingField("format").into()),
        };

        let data = match object.remove("data") {
            Some(Value::Null) | None => return Err(ModelError::MissingField("data").into()),
            Some(data) => serde_json::from_value::<ExportData>(data)?,
        };
        data.validate()?;

        Ok(Self { format, data })
    }
}

/// The rendered file handed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub bytes: Vec<u8>,
    pub mime_type: &'static str,
    pub filename: String,
}

/// `test-cases-YYYY-MM-DD.<ext>`
pub fn suggested_filename(format: ExportFormat, date: NaiveDate) -> String {
    format!("test-cases-{}.{}", date.format("%Y-%m-%d"), format.extension())
}

/// Export with a filename dated today (UTC).
pub fn export(request: &ExportRequest) -> Result<ExportedFile, ExportError> {
    export_on(request, Utc::now().date_naive())
}

/// Export with a filename dated `date`.
pub fn export_on(request: &ExportRequest, date: NaiveDate) -> Result<ExportedFile, ExportError> {
    request.data.validate()?;

    let exporter = request.format.exporter();
    let bytes = exporter.export(&request.data)?;
    let filename = suggested_filename(request.format, date);

    info!(
        format = %request.format,
        cases = request.data.cases.len(),
        bytes = bytes.len(),
        filename = %filename,
        "exported test cases"
    );

    Ok(ExportedFile {
        bytes,
        mime_type: exporter.mime_type(),
        filename,
    })
}

/// Run [`export`] on the blocking pool and resolve once with the whole file.
pub async fn export_async(request: ExportRequest) -> Result<ExportedFile, ExportError> {
    tokio::task::spawn_blocking(move || export(&request))
        .await
        .map_err(|e| ExportError::Rendering(format!("export task failed: {e}")))?
}
