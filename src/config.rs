use std::path::PathBuf;
use std::time::Duration;

use pdf_table_extract::{ExtractOptions, Strategy};

use crate::error::HarvestError;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_USER_AGENT: &str = concat!("pdf-table-harvest/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_SAMPLE_ROWS: usize = 3;

pub const ENV_TIMEOUT_SECS: &str = "PDF_HARVEST_TIMEOUT_SECS";
pub const ENV_USER_AGENT: &str = "PDF_HARVEST_USER_AGENT";
pub const ENV_OUTPUT_DIR: &str = "PDF_HARVEST_OUTPUT_DIR";
pub const ENV_STAGING_DIR: &str = "PDF_HARVEST_STAGING_DIR";
pub const ENV_SAMPLE_ROWS: &str = "PDF_HARVEST_SAMPLE_ROWS";
pub const ENV_MIN_COLS: &str = "PDF_HARVEST_MIN_COLS";
pub const ENV_STRATEGIES: &str = "PDF_HARVEST_STRATEGIES";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestConfig {
    pub request_timeout: Duration,
    pub user_agent: String,
    /// Where generated CSV files go.
    pub output_dir: PathBuf,
    /// Where uploaded PDFs are staged before extraction.
    pub staging_dir: PathBuf,
    pub sample_rows: usize,
    pub extract: ExtractOptions,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            output_dir: std::env::temp_dir(),
            staging_dir: PathBuf::from("."),
            sample_rows: DEFAULT_SAMPLE_ROWS,
            extract: ExtractOptions::default(),
        }
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, HarvestError> {
    value
        .trim()
        .parse()
        .map_err(|_| HarvestError::Config(format!("{key} must be a non-negative integer, got '{value}'")))
}

impl HarvestConfig {
    pub fn from_env() -> Result<Self, HarvestError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from `lookup`, falling back to defaults for
    /// unset or empty keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, HarvestError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(value) = get(ENV_TIMEOUT_SECS) {
            config.request_timeout = Duration::from_secs(parse_number(ENV_TIMEOUT_SECS, &value)?);
        }
        if let Some(value) = get(ENV_USER_AGENT) {
            config.user_agent = value;
        }
        if let Some(value) = get(ENV_OUTPUT_DIR) {
            config.output_dir = PathBuf::from(value);
        }
        if let Some(value) = get(ENV_STAGING_DIR) {
            config.staging_dir = PathBuf::from(value);
        }
        if let Some(value) = get(ENV_SAMPLE_ROWS) {
            config.sample_rows = parse_number(ENV_SAMPLE_ROWS, &value)?;
        }
        if let Some(value) = get(ENV_MIN_COLS) {
            config.extract.min_cols = parse_number(ENV_MIN_COLS, &value)?;
        }
        if let Some(value) = get(ENV_STRATEGIES) {
            config.extract.strategies = Strategy::parse_list(&value)
                .map_err(|error| HarvestError::Config(format!("{ENV_STRATEGIES}: {error}")))?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), HarvestError> {
        if self.request_timeout.is_zero() {
            return Err(HarvestError::Config(
                "request timeout must be greater than zero".to_string(),
            ));
        }
        self.extract
            .validate()
            .map_err(|error| HarvestError::Config(error.to_string()))
    }
}
