use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use pdf_table_extract::MergedTable;

/// Where a processed PDF came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    UploadedPdf,
    ArchiveExtraction,
    UrlDownload,
}

impl Provenance {
    pub const fn label(self) -> &'static str {
        match self {
            Self::UploadedPdf => "uploaded_pdf",
            Self::ArchiveExtraction => "archive_extraction",
            Self::UrlDownload => "url_download",
        }
    }
}

/// Metadata describing one generated CSV.
///
/// `source` is `uploaded_pdf` or `archive_extraction` for the upload and
/// archive entry points, and `url_download` for PDFs fetched by a URL
/// harvest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TableRecord {
    pub filename: String,
    pub source_pdf: String,
    pub shape: [usize; 2],
    pub columns: Vec<String>,
    pub sample_data: Vec<Map<String, Value>>,
    pub description: String,
    pub source: Provenance,
}

impl TableRecord {
    pub fn from_table(
        csv_path: &std::path::Path,
        source_pdf: &std::path::Path,
        table: &MergedTable,
        sample_rows: usize,
        source: Provenance,
    ) -> Self {
        let sample_data = table
            .rows
            .iter()
            .take(sample_rows)
            .map(|row| {
                table
                    .headers
                    .iter()
                    .zip(row)
                    .map(|(column, cell)| (column.clone(), Value::String(cell.clone())))
                    .collect::<Map<_, _>>()
            })
            .collect();

        let pdf_name = source_pdf
            .file_name()
            .map_or_else(|| source_pdf.display().to_string(), |name| {
                name.to_string_lossy().into_owned()
            });

        Self {
            filename: csv_path.display().to_string(),
            source_pdf: source_pdf.display().to_string(),
            shape: [table.row_count(), table.column_count()],
            columns: table.headers.clone(),
            sample_data,
            description: format!(
                "Table extracted from {pdf_name}: {} rows x {} columns ({})",
                table.row_count(),
                table.column_count(),
                source.label()
            ),
            source,
        }
    }
}

/// How one document in a batch ended.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DocumentStatus {
    Extracted { csv_count: usize },
    NoTables,
    ExtractionFailed { message: String },
    Failed { code: String, message: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocumentReport {
    pub source: String,
    #[serde(flatten)]
    pub status: DocumentStatus,
    /// CSVs this document wrote over that an earlier document in the same
    /// batch had already produced.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub overwritten: Vec<PathBuf>,
}

impl DocumentReport {
    pub fn new(source: String, status: DocumentStatus) -> Self {
        Self {
            source,
            status,
            overwritten: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UploadOutcome {
    pub records: Vec<TableRecord>,
    /// The staged PDF followed by every CSV written for it.
    pub created_files: Vec<PathBuf>,
    pub document: DocumentReport,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ArchiveReport {
    pub records: Vec<TableRecord>,
    pub documents: Vec<DocumentReport>,
    pub created_files: Vec<PathBuf>,
}

impl ArchiveReport {
    pub fn failures(&self) -> impl Iterator<Item = &DocumentReport> {
        self.documents
            .iter()
            .filter(|report| matches!(report.status, DocumentStatus::Failed { .. }))
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use pdf_table_extract::MergedTable;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::{DocumentReport, DocumentStatus, Provenance, TableRecord};

    fn table(rows: usize) -> MergedTable {
        MergedTable {
            reference_header: vec!["Name".to_string(), "Age".to_string()],
            headers: vec!["Name".to_string(), "Age".to_string()],
            rows: (0..rows)
                .map(|index| vec![format!("person{index}"), index.to_string()])
                .collect(),
            source_tables: vec![1],
        }
    }

    #[test]
    fn record_serializes_to_documented_shape() {
        let record = TableRecord::from_table(
            Path::new("/out/people.csv"),
            Path::new("/in/people.pdf"),
            &table(5),
            3,
            Provenance::UploadedPdf,
        );

        let value = serde_json::to_value(&record).expect("record should serialize");
        assert_eq!(value["filename"], json!("/out/people.csv"));
        assert_eq!(value["source_pdf"], json!("/in/people.pdf"));
        assert_eq!(value["shape"], json!([5, 2]));
        assert_eq!(value["columns"], json!(["Name", "Age"]));
        assert_eq!(value["source"], json!("uploaded_pdf"));
        assert_eq!(
            value["sample_data"],
            json!([
                {"Name": "person0", "Age": "0"},
                {"Name": "person1", "Age": "1"},
                {"Name": "person2", "Age": "2"},
            ])
        );
        assert!(record.description.contains("people.pdf"));
    }

    #[test]
    fn short_tables_sample_every_row() {
        let record = TableRecord::from_table(
            Path::new("a.csv"),
            Path::new("a.pdf"),
            &table(1),
            3,
            Provenance::ArchiveExtraction,
        );
        assert_eq!(record.sample_data.len(), 1);
        assert_eq!(
            serde_json::to_value(record.source).expect("label serializes"),
            json!(Provenance::ArchiveExtraction.label())
        );
    }

    #[test]
    fn document_status_is_tagged() {
        let report = DocumentReport::new(
            "x.pdf".to_string(),
            DocumentStatus::Extracted { csv_count: 2 },
        );
        assert_eq!(
            serde_json::to_value(&report).expect("report should serialize"),
            json!({"source": "x.pdf", "status": "extracted", "csv_count": 2})
        );
    }

    #[test]
    fn overwritten_files_are_listed_only_when_present() {
        let mut report = DocumentReport::new("b/people.pdf".to_string(), DocumentStatus::NoTables);
        report.overwritten.push("out/people.csv".into());
        assert_eq!(
            serde_json::to_value(&report).expect("report should serialize"),
            json!({"source": "b/people.pdf", "status": "no_tables", "overwritten": ["out/people.csv"]})
        );
    }
}
