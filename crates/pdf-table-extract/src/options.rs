use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::error::ExtractError;

/// Table extraction backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Lines rebuilt from content-stream text operators, split on wide gaps.
    Layout,
    /// pdf-extract page text with a whitespace heuristic.
    Stream,
}

impl Strategy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Layout => "layout",
            Self::Stream => "stream",
        }
    }

    /// Parses a comma separated, ordered strategy list such as `layout,stream`.
    ///
    /// # Errors
    ///
    /// Returns a message naming the first unknown or duplicated entry.
    pub fn parse_list(spec: &str) -> Result<Vec<Self>, String> {
        let mut strategies = Vec::new();
        for token in spec.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let strategy = token.parse::<Self>()?;
            if strategies.contains(&strategy) {
                return Err(format!("strategy '{token}' listed twice"));
            }
            strategies.push(strategy);
        }

        if strategies.is_empty() {
            return Err("strategy list cannot be empty".to_string());
        }
        Ok(strategies)
    }
}

impl Display for Strategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "layout" => Ok(Self::Layout),
            "stream" => Ok(Self::Stream),
            other => Err(format!(
                "unknown extraction strategy '{other}', expected layout or stream"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Minimum cells a line needs to count as a table row.
    pub min_cols: usize,
    /// Strategies tried in order until one yields tables.
    pub strategies: Vec<Strategy>,
}

impl ExtractOptions {
    /// # Errors
    ///
    /// Fails when `min_cols` is below 2 or no strategy is configured.
    pub fn validate(&self) -> Result<(), ExtractError> {
        if self.min_cols < 2 {
            return Err(ExtractError::InvalidOption(
                "min_cols must be at least 2".to_string(),
            ));
        }
        if self.strategies.is_empty() {
            return Err(ExtractError::InvalidOption(
                "at least one extraction strategy is required".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            min_cols: 2,
            strategies: vec![Strategy::Layout, Strategy::Stream],
        }
    }
}
