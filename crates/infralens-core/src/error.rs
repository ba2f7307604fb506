//! Error types for the InfraLens core library.

use std::path::PathBuf;

/// The main error type for InfraLens operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error with optional path context.
    #[error("I/O error{}: {source}", path.as_ref().map(|p| format!(" at '{}'", p.display())).unwrap_or_default())]
    Io {
        source: std::io::Error,
        path: Option<PathBuf>,
    },

    /// Error decoding an xlsx workbook.
    #[error("workbook error: {message}")]
    Workbook { message: String },

    /// Error recognising or parsing an inventory export.
    #[error("inventory error: {message}")]
    Inventory { message: String },

    /// Error loading or fetching the hardware compatibility catalog.
    #[error("HCL error: {message}")]
    Hcl { message: String },

    /// Error generating the diagram document.
    #[error("diagram error: {message}")]
    Diagram { message: String },

    /// Error rendering a report export.
    #[error("report error: {message}")]
    Report { message: String },
}

/// A specialized Result type for InfraLens operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an I/O error with path context.
    pub fn io(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        Self::Io {
            source,
            path: Some(path.into()),
        }
    }

    /// Create an I/O error without path context.
    pub fn io_simple(source: std::io::Error) -> Self {
        Self::Io { source, path: None }
    }

    /// Create a workbook decoding error.
    pub fn workbook(message: impl Into<String>) -> Self {
        Self::Workbook {
            message: message.into(),
        }
    }

    /// Create an inventory error.
    pub fn inventory(message: impl Into<String>) -> Self {
        Self::Inventory {
            message: message.into(),
        }
    }

    /// Create an HCL error.
    pub fn hcl(message: impl Into<String>) -> Self {
        Self::Hcl {
            message: message.into(),
        }
    }

    /// Create a diagram generation error.
    pub fn diagram(message: impl Into<String>) -> Self {
        Self::Diagram {
            message: message.into(),
        }
    }

    /// Create a report rendering error.
    pub fn report(message: impl Into<String>) -> Self {
        Self::Report {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Self::io_simple(source)
    }
}

impl From<calamine::XlsxError> for Error {
    fn from(source: calamine::XlsxError) -> Self {
        Self::workbook(source.to_string())
    }
}
