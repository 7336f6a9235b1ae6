use std::path::{Path, PathBuf};
use std::sync::Arc;

use reqwest::Client;
use url::Url;

use crate::csv_pipeline::{ExtractionStatus, PipelineRun, TablePipeline};
use crate::error::HarvestError;
use crate::models::{
    ArchiveReport, DocumentReport, DocumentStatus, Provenance, TableRecord, UploadOutcome,
};
use crate::source_scraper;

pub const UPLOAD_PREFIX: &str = "uploaded_";
pub const FALLBACK_UPLOAD_NAME: &str = "document.pdf";

/// Staging file name for an upload. Only the final path component of the
/// client-supplied name is kept.
pub fn staged_upload_name(original_filename: Option<&str>) -> String {
    let name = original_filename
        .and_then(|name| name.rsplit(['/', '\\']).next())
        .map(str::trim)
        .filter(|name| !name.is_empty() && *name != "." && *name != "..")
        .unwrap_or(FALLBACK_UPLOAD_NAME);
    format!("{UPLOAD_PREFIX}{name}")
}

fn document_status(run: &PipelineRun) -> DocumentStatus {
    if let Some(error) = &run.write_error {
        return DocumentStatus::Failed {
            code: error.code().to_string(),
            message: error.message().to_string(),
        };
    }
    match &run.status {
        ExtractionStatus::Failed(message) => DocumentStatus::ExtractionFailed {
            message: message.clone(),
        },
        ExtractionStatus::Tables if !run.csvs.is_empty() => DocumentStatus::Extracted {
            csv_count: run.csvs.len(),
        },
        ExtractionStatus::Tables | ExtractionStatus::NoTables => DocumentStatus::NoTables,
    }
}

fn failed_report(source: String, error: &HarvestError) -> DocumentReport {
    DocumentReport::new(
        source,
        DocumentStatus::Failed {
            code: error.code().to_string(),
            message: error.message().to_string(),
        },
    )
}

fn records_for_run(run: &PipelineRun, sample_rows: usize, source: Provenance) -> Vec<TableRecord> {
    run.csvs
        .iter()
        .map(|csv| {
            TableRecord::from_table(&csv.path, &run.source_pdf, &csv.table, sample_rows, source)
        })
        .collect()
}

impl ArchiveReport {
    fn push_result(
        &mut self,
        label: String,
        result: Result<PipelineRun, HarvestError>,
        sample_rows: usize,
        source: Provenance,
    ) {
        match result {
            Ok(run) => {
                let mut report = DocumentReport::new(label, document_status(&run));
                for path in run.created_files() {
                    if self.created_files.contains(&path) {
                        tracing::warn!(
                            path = %path.display(),
                            source = %report.source,
                            "CSV name clashes with an earlier document; keeping the newer file"
                        );
                        let stale = path.display().to_string();
                        self.records.retain(|record| record.filename != stale);
                        report.overwritten.push(path);
                    } else {
                        self.created_files.push(path);
                    }
                }
                self.records.extend(records_for_run(&run, sample_rows, source));
                self.documents.push(report);
            }
            Err(error) => {
                tracing::warn!(source = %label, %error, "skipping document");
                self.documents.push(failed_report(label, &error));
            }
        }
    }
}

/// Stages uploaded bytes next to the other uploads, then extracts tables
/// from the staged copy.
pub fn process_uploaded_pdf(
    pipeline: &TablePipeline,
    bytes: &[u8],
    original_filename: Option<&str>,
    staging_dir: &Path,
    output_dir: &Path,
    sample_rows: usize,
) -> Result<UploadOutcome, HarvestError> {
    std::fs::create_dir_all(staging_dir)?;
    let staged = std::path::absolute(staging_dir.join(staged_upload_name(original_filename)))?;
    std::fs::write(&staged, bytes)?;
    tracing::info!(path = %staged.display(), bytes = bytes.len(), "staged uploaded PDF");

    let mut created_files = vec![staged.clone()];
    let label = staged.display().to_string();
    let outcome = match pipeline.process_pdf(&staged, output_dir) {
        Ok(run) => {
            created_files.extend(run.created_files());
            UploadOutcome {
                records: records_for_run(&run, sample_rows, Provenance::UploadedPdf),
                created_files,
                document: DocumentReport::new(label, document_status(&run)),
            }
        }
        Err(error) => {
            tracing::warn!(path = %staged.display(), %error, "uploaded PDF could not be processed");
            UploadOutcome {
                records: Vec::new(),
                created_files,
                document: failed_report(label, &error),
            }
        }
    };
    Ok(outcome)
}

/// Processes already-extracted archive members in order. A document that
/// fails is reported and the batch moves on.
pub fn process_archive_files<P: AsRef<Path>>(
    pipeline: &TablePipeline,
    paths: &[P],
    output_dir: &Path,
    sample_rows: usize,
) -> ArchiveReport {
    let mut report = ArchiveReport::default();
    for path in paths {
        let path = path.as_ref();
        let result = pipeline.process_pdf(path, output_dir);
        report.push_result(
            path.display().to_string(),
            result,
            sample_rows,
            Provenance::ArchiveExtraction,
        );
    }
    tracing::info!(
        documents = report.documents.len(),
        records = report.records.len(),
        "processed archive files"
    );
    report
}

fn points_at_pdf(url: &Url) -> bool {
    url.path().to_ascii_lowercase().ends_with(".pdf")
}

/// Runs the synchronous pipeline on the blocking thread pool.
async fn process_on_blocking_pool(
    pipeline: &Arc<TablePipeline>,
    pdf_path: PathBuf,
    output_dir: &Path,
) -> Result<PipelineRun, HarvestError> {
    let pipeline = Arc::clone(pipeline);
    let output_dir = output_dir.to_path_buf();
    match tokio::task::spawn_blocking(move || pipeline.process_pdf(&pdf_path, &output_dir)).await {
        Ok(result) => result,
        Err(error) => Err(HarvestError::Extract(format!(
            "extraction task did not finish: {error}"
        ))),
    }
}

/// Downloads the PDF behind `url`, or every PDF linked from the page at
/// `url`, and extracts tables from each one. Extraction runs on tokio's
/// blocking pool.
pub async fn harvest_url(
    client: &Client,
    pipeline: &Arc<TablePipeline>,
    url: &str,
    download_dir: &Path,
    output_dir: &Path,
    sample_rows: usize,
) -> Result<ArchiveReport, HarvestError> {
    let parsed = Url::parse(url)?;
    let links: Vec<String> = if points_at_pdf(&parsed) {
        vec![url.to_string()]
    } else {
        source_scraper::discover_pdf_links(client, url)
            .await?
            .into_iter()
            .collect()
    };

    let mut report = ArchiveReport::default();
    for link in links {
        let result = match source_scraper::download_pdf(client, &link, download_dir).await {
            Ok(path) => process_on_blocking_pool(pipeline, path, output_dir).await,
            Err(error) => Err(error),
        };
        report.push_result(link, result, sample_rows, Provenance::UrlDownload);
    }
    tracing::info!(
        url,
        documents = report.documents.len(),
        records = report.records.len(),
        "harvest finished"
    );
    Ok(report)
}
