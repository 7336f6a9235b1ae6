use std::path::{Path, PathBuf};

use pdf_table_extract::{
    ExtractOptions, ExtractionOutcome, FallbackExtractor, MergedTable, TextOutcome,
    base_pdf_name, extract_text, write_grouped_tables,
};

use crate::error::HarvestError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionStatus {
    Tables,
    NoTables,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedCsv {
    pub path: PathBuf,
    pub table: MergedTable,
}

/// Everything one pipeline run over one PDF produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineRun {
    pub source_pdf: PathBuf,
    pub status: ExtractionStatus,
    pub csvs: Vec<GeneratedCsv>,
    /// Set when a CSV write failed. `csvs` then lists the files written
    /// before the failure.
    pub write_error: Option<HarvestError>,
}

impl PipelineRun {
    pub fn created_files(&self) -> Vec<PathBuf> {
        self.csvs.iter().map(|csv| csv.path.clone()).collect()
    }
}

/// Extract, group, merge and write, for one PDF at a time.
pub struct TablePipeline {
    extractor: FallbackExtractor,
}

impl TablePipeline {
    pub fn new(options: &ExtractOptions) -> Result<Self, HarvestError> {
        Ok(Self {
            extractor: FallbackExtractor::new(options)?,
        })
    }

    pub fn with_extractor(extractor: FallbackExtractor) -> Self {
        Self { extractor }
    }

    pub fn process_pdf(
        &self,
        pdf_path: &Path,
        output_dir: &Path,
    ) -> Result<PipelineRun, HarvestError> {
        if !pdf_path.is_file() {
            return Err(HarvestError::Io(format!(
                "PDF not found: {}",
                pdf_path.display()
            )));
        }

        tracing::info!(path = %pdf_path.display(), "starting PDF processing");
        match extract_text(pdf_path) {
            TextOutcome::Text(text) => {
                tracing::debug!(chars = text.chars().count(), "extracted plain text");
            }
            TextOutcome::Empty => tracing::debug!("document has no plain text"),
            TextOutcome::Failed(error) => {
                tracing::debug!(%error, "could not extract plain text");
            }
        }

        let (status, tables) = match self.extractor.extract_tables(pdf_path) {
            ExtractionOutcome::Tables(tables) => (ExtractionStatus::Tables, tables),
            ExtractionOutcome::NoTables => {
                tracing::warn!(path = %pdf_path.display(), "no tables found");
                (ExtractionStatus::NoTables, Vec::new())
            }
            ExtractionOutcome::Failed(error) => {
                tracing::warn!(path = %pdf_path.display(), %error, "failed to extract tables");
                (ExtractionStatus::Failed(error.to_string()), Vec::new())
            }
        };

        for table in &tables {
            tracing::info!(
                table = table.index,
                page = table.page,
                rows = table.body.len(),
                "extracted table"
            );
        }

        let (written, write_error) =
            match write_grouped_tables(tables, output_dir, &base_pdf_name(pdf_path)) {
                Ok(written) => (written, None),
                Err(failure) => {
                    tracing::warn!(
                        path = %pdf_path.display(),
                        written = failure.written.len(),
                        error = %failure.error,
                        "failed to write CSV"
                    );
                    (failure.written, Some(HarvestError::from(failure.error)))
                }
            };
        if !written.is_empty() {
            tracing::info!(groups = written.len(), "grouped tables by matching headers");
        }
        let csvs = written
            .into_iter()
            .map(|entry| GeneratedCsv {
                path: entry.path,
                table: entry.table,
            })
            .collect::<Vec<_>>();

        tracing::info!(
            path = %pdf_path.display(),
            csv_count = csvs.len(),
            "completed PDF processing"
        );
        Ok(PipelineRun {
            source_pdf: pdf_path.to_path_buf(),
            status,
            csvs,
            write_error,
        })
    }
}

impl Default for TablePipeline {
    fn default() -> Self {
        Self::with_extractor(FallbackExtractor::default())
    }
}
