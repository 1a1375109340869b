//! Error types for memoria operations.

use thiserror::Error;

/// Errors that can occur while building or exporting a document.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Invalid content tree: {0}")]
    Json(#[from] serde_json::Error),

    #[error("UTF-8 decoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// The content tree was missing or empty; no document is produced.
    #[error("Nothing to export")]
    NothingToExport,

    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// The writer finished without error but produced no bytes.
    #[error("Export produced an empty document")]
    EmptyOutput,
}

impl Error {
    /// Whether the caller may retry the export (normally on the from-scratch
    /// path).
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Serialization(_) | Error::EmptyOutput | Error::Io(_) | Error::Zip(_)
        )
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::Xml(quick_xml::Error::InvalidAttr(err))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
