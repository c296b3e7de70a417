use caseforge_core::ModelError;
use thiserror::Error;

/// Errors raised while exporting test cases.
///
/// A failed export never carries partial output; callers map the
/// [`ErrorKind`] onto their own response codes.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Invalid format: {0}. Must be csv, xlsx, or pdf")]
    InvalidFormat(String),

    #[error("Malformed export data: {0}")]
    MalformedInput(String),

    #[error("Rendering failed: {0}")]
    Rendering(String),

    #[error(transparent)]
    Csv(#[from] ::csv::Error),

    #[error(transparent)]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Coarse classification of an [`ExportError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The requested format is not one of csv, xlsx or pdf.
    InvalidFormat,
    /// The payload is missing required fields or breaks a model invariant.
    MalformedInput,
    /// The underlying writer failed mid-render.
    RenderingFailure,
}

impl ExportError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidFormat(_) => ErrorKind::InvalidFormat,
            Self::MalformedInput(_) => ErrorKind::MalformedInput,
            Self::Rendering(_) | Self::Csv(_) | Self::Xlsx(_) | Self::Io(_) => {
                ErrorKind::RenderingFailure
            }
        }
    }
}

impl From<ModelError> for ExportError {
    fn from(err: ModelError) -> Self {
        Self::MalformedInput(err.to_string())
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedInput(err.to_string())
    }
}
