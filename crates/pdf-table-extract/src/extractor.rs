use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::Path;

use lopdf::Document;

use crate::error::ExtractError;
use crate::model::{DetectedTable, ExtractionOutcome, RawTable};
use crate::options::{ExtractOptions, Strategy};
use crate::pdf_reader::{read_layout_pages, read_stream_pages};
use crate::table_detect::{CellSplit, detect_tables};

/// A table detection backend. Implementations return every candidate table
/// in document order, first row included.
pub trait TableExtractor: Send + Sync {
    fn name(&self) -> &'static str;

    /// # Errors
    ///
    /// Returns an error when the document cannot be read by this backend.
    fn detect(&self, input_pdf: &Path) -> Result<Vec<DetectedTable>, ExtractError>;
}

#[derive(Debug, Clone, Copy)]
pub struct LayoutExtractor {
    pub min_cols: usize,
}

impl TableExtractor for LayoutExtractor {
    fn name(&self) -> &'static str {
        Strategy::Layout.as_str()
    }

    fn detect(&self, input_pdf: &Path) -> Result<Vec<DetectedTable>, ExtractError> {
        let document = Document::load(input_pdf)?;
        let pages = read_layout_pages(&document)?;
        Ok(detect_tables(&pages, self.min_cols, CellSplit::Gaps))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StreamExtractor {
    pub min_cols: usize,
}

impl TableExtractor for StreamExtractor {
    fn name(&self) -> &'static str {
        Strategy::Stream.as_str()
    }

    fn detect(&self, input_pdf: &Path) -> Result<Vec<DetectedTable>, ExtractError> {
        let document = Document::load(input_pdf)?;
        let pages = read_stream_pages(input_pdf, &document)?;
        Ok(detect_tables(&pages, self.min_cols, CellSplit::GapsOrWords))
    }
}

fn build_extractor(strategy: Strategy, min_cols: usize) -> Box<dyn TableExtractor> {
    match strategy {
        Strategy::Layout => Box::new(LayoutExtractor { min_cols }),
        Strategy::Stream => Box::new(StreamExtractor { min_cols }),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|message| (*message).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

/// Numbers the usable tables 1-based, dropping those without a body row.
fn into_raw_tables(detected: Vec<DetectedTable>) -> Vec<RawTable> {
    detected
        .into_iter()
        .filter(|table| table.rows.len() >= 2)
        .enumerate()
        .filter_map(|(position, table)| RawTable::from_rows(position + 1, table.page, table.rows))
        .collect()
}

/// Runs extraction backends in order and keeps the first non-empty result.
pub struct FallbackExtractor {
    extractors: Vec<Box<dyn TableExtractor>>,
}

impl FallbackExtractor {
    /// # Errors
    ///
    /// Fails when `options` do not validate.
    pub fn new(options: &ExtractOptions) -> Result<Self, ExtractError> {
        options.validate()?;
        Ok(Self::with_extractors(
            options
                .strategies
                .iter()
                .map(|strategy| build_extractor(*strategy, options.min_cols))
                .collect(),
        ))
    }

    #[must_use]
    pub fn with_extractors(extractors: Vec<Box<dyn TableExtractor>>) -> Self {
        Self { extractors }
    }

    #[must_use]
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.extractors.iter().map(|extractor| extractor.name()).collect()
    }

    /// Never fails: backend errors and panics become
    /// [`ExtractionOutcome::Failed`] when no backend produced a table.
    #[must_use]
    pub fn extract_tables(&self, input_pdf: &Path) -> ExtractionOutcome {
        let mut first_error = None;

        for extractor in &self.extractors {
            let name = extractor.name();
            let result = catch_unwind(AssertUnwindSafe(|| extractor.detect(input_pdf)))
                .unwrap_or_else(|payload| {
                    Err(ExtractError::Panicked {
                        strategy: name,
                        message: panic_message(payload.as_ref()),
                    })
                });

            match result {
                Ok(detected) => {
                    let tables = into_raw_tables(detected);
                    if !tables.is_empty() {
                        tracing::debug!(
                            strategy = name,
                            tables = tables.len(),
                            path = %input_pdf.display(),
                            "extraction strategy found tables"
                        );
                        return ExtractionOutcome::Tables(tables);
                    }
                    tracing::debug!(strategy = name, path = %input_pdf.display(), "no tables");
                }
                Err(error) => {
                    tracing::debug!(strategy = name, %error, "extraction strategy failed");
                    first_error.get_or_insert(error);
                }
            }
        }

        match first_error {
            Some(error) => ExtractionOutcome::Failed(error),
            None => ExtractionOutcome::NoTables,
        }
    }
}

impl Default for FallbackExtractor {
    fn default() -> Self {
        let options = ExtractOptions::default();
        Self::with_extractors(
            options
                .strategies
                .iter()
                .map(|strategy| build_extractor(*strategy, options.min_cols))
                .collect(),
        )
    }
}
