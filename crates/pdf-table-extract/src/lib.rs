mod csv_out;
mod error;
mod extractor;
mod group;
mod header;
mod model;
mod options;
mod pdf_reader;
mod table_detect;
mod table_parse;

use std::path::{Path, PathBuf};

pub use csv_out::{base_pdf_name, csv_file_name, sanitize_fragment, write_csv, write_csv_to_string};
pub use error::ExtractError;
pub use extractor::{FallbackExtractor, LayoutExtractor, StreamExtractor, TableExtractor};
pub use group::{group_and_merge, group_tables, merge_group};
pub use header::{headers_match, normalize_header_cell};
pub use model::{
    DetectedTable, ExtractionOutcome, HeaderGroup, MergedTable, RawTable, TextOutcome,
};
pub use options::{ExtractOptions, Strategy};
pub use pdf_reader::extract_text;

/// One CSV written for one merged header group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenTable {
    pub path: PathBuf,
    pub table: MergedTable,
}

/// A CSV write that failed partway through a document. `written` holds the
/// files already on disk when `error` happened.
#[derive(Debug, thiserror::Error)]
#[error("failed after writing {} CSV file(s): {error}", .written.len())]
pub struct WriteFailure {
    pub written: Vec<WrittenTable>,
    #[source]
    pub error: ExtractError,
}

/// Groups `tables`, merges each group and writes one CSV per group into
/// `output_dir`, in group-creation order.
///
/// # Errors
///
/// Stops at the first CSV that cannot be written and returns the ones
/// written before it alongside the error.
pub fn write_grouped_tables(
    tables: Vec<RawTable>,
    output_dir: &Path,
    base_name: &str,
) -> Result<Vec<WrittenTable>, WriteFailure> {
    let merged = group_and_merge(tables);
    let total_groups = merged.len();

    let mut written = Vec::with_capacity(total_groups);
    for (position, table) in merged.into_iter().enumerate() {
        match write_csv(&table, output_dir, base_name, position + 1, total_groups) {
            Ok(path) => {
                tracing::debug!(
                    path = %path.display(),
                    rows = table.row_count(),
                    group = position + 1,
                    "wrote merged table"
                );
                written.push(WrittenTable { path, table });
            }
            Err(error) => return Err(WriteFailure { written, error }),
        }
    }
    Ok(written)
}
