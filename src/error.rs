use std::fmt::{Display, Formatter};

use pdf_table_extract::ExtractError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HarvestError {
    /// The server answered with a non-success status.
    Fetch(String),
    /// The request could not be completed at all.
    Http(String),
    InvalidUrl(String),
    Io(String),
    Extract(String),
    Serialize(String),
    Config(String),
}

impl HarvestError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Fetch(_) => "fetch_error",
            Self::Http(_) => "http_error",
            Self::InvalidUrl(_) => "invalid_url",
            Self::Io(_) => "io_error",
            Self::Extract(_) => "extract_error",
            Self::Serialize(_) => "serialize_error",
            Self::Config(_) => "config_error",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Fetch(message)
            | Self::Http(message)
            | Self::InvalidUrl(message)
            | Self::Io(message)
            | Self::Extract(message)
            | Self::Serialize(message)
            | Self::Config(message) => message,
        }
    }
}

impl Display for HarvestError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}

impl std::error::Error for HarvestError {}

impl From<reqwest::Error> for HarvestError {
    fn from(error: reqwest::Error) -> Self {
        Self::Http(error.to_string())
    }
}

impl From<std::io::Error> for HarvestError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

impl From<url::ParseError> for HarvestError {
    fn from(error: url::ParseError) -> Self {
        Self::InvalidUrl(error.to_string())
    }
}

impl From<ExtractError> for HarvestError {
    fn from(error: ExtractError) -> Self {
        if error.is_io() {
            Self::Io(error.to_string())
        } else {
            Self::Extract(error.to_string())
        }
    }
}

impl From<serde_json::Error> for HarvestError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialize(error.to_string())
    }
}
