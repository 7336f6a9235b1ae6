use std::io;
use std::string::FromUtf8Error;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to load PDF: {0}")]
    PdfLoad(#[from] lopdf::Error),

    #[error("failed to extract PDF text: {0}")]
    PdfExtract(String),

    #[error("{strategy} extractor panicked: {message}")]
    Panicked {
        strategy: &'static str,
        message: String,
    },

    #[error("invalid option: {0}")]
    InvalidOption(String),

    #[error("CSV output is not valid UTF-8: {0}")]
    Utf8(#[from] FromUtf8Error),

    #[error("document has no pages")]
    NoPages,
}

impl ExtractError {
    /// True when the failure came from the filesystem, including CSV writes
    /// that failed underneath the encoder.
    #[must_use]
    pub fn is_io(&self) -> bool {
        match self {
            Self::Io(_) => true,
            Self::Csv(error) => matches!(error.kind(), csv::ErrorKind::Io(_)),
            _ => false,
        }
    }
}
