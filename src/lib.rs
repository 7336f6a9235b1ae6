pub mod config;
pub mod csv_pipeline;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod source_scraper;

pub use config::HarvestConfig;
pub use csv_pipeline::{ExtractionStatus, GeneratedCsv, PipelineRun, TablePipeline};
pub use error::HarvestError;
pub use models::{
    ArchiveReport, DocumentReport, DocumentStatus, Provenance, TableRecord, UploadOutcome,
};
pub use orchestrator::{harvest_url, process_archive_files, process_uploaded_pdf};
