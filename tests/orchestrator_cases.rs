#[path = "../crates/pdf-table-extract/tests/common/mod.rs"]
mod common;

use common::{PdfFixture, corrupt_pdf_bytes};
use pdf_table_extract::{ExtractOptions, Strategy};
use pdf_table_harvest::{
    DocumentStatus, Provenance, TablePipeline, process_archive_files, process_uploaded_pdf,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::tempdir;

fn layout_pipeline() -> TablePipeline {
    TablePipeline::new(&ExtractOptions {
        strategies: vec![Strategy::Layout],
        ..ExtractOptions::default()
    })
    .expect("layout options are valid")
}

fn people_fixture() -> PdfFixture {
    PdfFixture::new()
        .page(&["Name  Age", "Alice  30", "Bob  25"])
        .page(&["name   AGE ", "Carol  40"])
}

#[test]
fn upload_is_staged_under_its_final_name_component() {
    let staging = tempdir().expect("tempdir should be created");
    let output = tempdir().expect("tempdir should be created");
    let bytes = people_fixture().to_bytes().expect("PDF fixture should be created");

    let outcome = process_uploaded_pdf(
        &layout_pipeline(),
        &bytes,
        Some("../nested/dir/people.pdf"),
        staging.path(),
        output.path(),
        3,
    )
    .expect("upload should be processed");

    let staged = staging.path().join("uploaded_people.pdf");
    let csv = output.path().join("uploaded_people.csv");
    assert_eq!(outcome.created_files, vec![staged.clone(), csv.clone()]);
    assert_eq!(std::fs::read(&staged).expect("staged PDF exists"), bytes);
    assert_eq!(
        std::fs::read_to_string(&csv).expect("CSV should be readable"),
        "Name,Age\nAlice,30\nBob,25\nCarol,40\n"
    );

    assert_eq!(outcome.records.len(), 1);
    let record = &outcome.records[0];
    assert_eq!(record.source, Provenance::UploadedPdf);
    assert_eq!(record.shape, [3, 2]);
    assert_eq!(record.filename, csv.display().to_string());
    assert_eq!(
        serde_json::to_value(&record.sample_data).expect("sample serializes"),
        json!([
            {"Name": "Alice", "Age": "30"},
            {"Name": "Bob", "Age": "25"},
            {"Name": "Carol", "Age": "40"},
        ])
    );
    assert_eq!(
        outcome.document.status,
        DocumentStatus::Extracted { csv_count: 1 }
    );
}

#[test]
fn unreadable_upload_yields_no_records() {
    let staging = tempdir().expect("tempdir should be created");
    let output = tempdir().expect("tempdir should be created");

    let outcome = process_uploaded_pdf(
        &layout_pipeline(),
        &corrupt_pdf_bytes(),
        None,
        staging.path(),
        output.path(),
        3,
    )
    .expect("staging should succeed");

    assert!(outcome.records.is_empty());
    assert_eq!(
        outcome.created_files,
        vec![staging.path().join("uploaded_document.pdf")]
    );
    assert!(matches!(
        outcome.document.status,
        DocumentStatus::ExtractionFailed { .. }
    ));
    assert_eq!(
        std::fs::read_dir(output.path())
            .expect("output dir is readable")
            .count(),
        0
    );
}

#[test]
fn archive_batch_continues_after_a_missing_file() {
    let input = tempdir().expect("tempdir should be created");
    let output = tempdir().expect("tempdir should be created");
    let people = input.path().join("people.pdf");
    let mixed = input.path().join("mixed.pdf");
    let missing = input.path().join("missing.pdf");
    people_fixture().save(&people).expect("PDF fixture should be created");
    PdfFixture::new()
        .page(&["A  B", "1  2"])
        .page(&["X  Y", "3  4", "5  6"])
        .save(&mixed)
        .expect("PDF fixture should be created");

    let report = process_archive_files(
        &layout_pipeline(),
        &[missing.clone(), people, mixed],
        output.path(),
        3,
    );

    assert_eq!(report.documents.len(), 3);
    assert_eq!(report.documents[0].source, missing.display().to_string());
    assert!(matches!(
        &report.documents[0].status,
        DocumentStatus::Failed { code, .. } if code == "io_error"
    ));
    assert_eq!(
        report.documents[1].status,
        DocumentStatus::Extracted { csv_count: 1 }
    );
    assert_eq!(
        report.documents[2].status,
        DocumentStatus::Extracted { csv_count: 2 }
    );
    assert_eq!(report.failures().count(), 1);

    assert_eq!(
        report.created_files,
        vec![
            output.path().join("people.csv"),
            output.path().join("mixed_A_1.csv"),
            output.path().join("mixed_X_2.csv"),
        ]
    );
    assert!(
        report
            .records
            .iter()
            .all(|record| record.source == Provenance::ArchiveExtraction)
    );
    assert_eq!(
        std::fs::read_to_string(output.path().join("mixed_X_2.csv"))
            .expect("CSV should be readable"),
        "X,Y\n3,4\n5,6\n"
    );
}

#[test]
fn prose_document_reports_no_tables() {
    let input = tempdir().expect("tempdir should be created");
    let output = tempdir().expect("tempdir should be created");
    let prose = input.path().join("prose.pdf");
    PdfFixture::new()
        .page(&[
            "This quarterly letter has no tabular content at all.",
            "It only talks about the weather and the harvest.",
        ])
        .save(&prose)
        .expect("PDF fixture should be created");

    let report = process_archive_files(&layout_pipeline(), &[prose], output.path(), 3);

    assert!(report.records.is_empty());
    assert!(report.created_files.is_empty());
    assert_eq!(report.documents[0].status, DocumentStatus::NoTables);
}

#[test]
fn partial_write_failure_still_reports_written_files() {
    let input = tempdir().expect("tempdir should be created");
    let output = tempdir().expect("tempdir should be created");
    let mixed = input.path().join("mixed.pdf");
    PdfFixture::new()
        .page(&["A  B", "1  2"])
        .page(&["X  Y", "3  4"])
        .save(&mixed)
        .expect("PDF fixture should be created");
    std::fs::create_dir(output.path().join("mixed_X_2.csv")).expect("blocker dir is created");

    let report = process_archive_files(&layout_pipeline(), &[mixed], output.path(), 3);

    assert_eq!(report.created_files, vec![output.path().join("mixed_A_1.csv")]);
    assert!(output.path().join("mixed_A_1.csv").is_file());
    assert_eq!(report.records.len(), 1);
    assert!(matches!(
        &report.documents[0].status,
        DocumentStatus::Failed { code, .. } if code == "io_error"
    ));
}

#[test]
fn same_stem_documents_keep_only_the_newer_csv() {
    let first_dir = tempdir().expect("tempdir should be created");
    let second_dir = tempdir().expect("tempdir should be created");
    let output = tempdir().expect("tempdir should be created");
    let first = first_dir.path().join("people.pdf");
    let second = second_dir.path().join("people.pdf");
    people_fixture().save(&first).expect("PDF fixture should be created");
    PdfFixture::new()
        .page(&["City  Pop", "Oslo  700"])
        .save(&second)
        .expect("PDF fixture should be created");

    let report = process_archive_files(&layout_pipeline(), &[first, second], output.path(), 3);

    let csv = output.path().join("people.csv");
    assert_eq!(report.created_files, vec![csv.clone()]);
    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].columns, vec!["City", "Pop"]);
    assert_eq!(report.records[0].shape, [1, 2]);
    assert!(report.documents[0].overwritten.is_empty());
    assert_eq!(report.documents[1].overwritten, vec![csv.clone()]);
    assert_eq!(
        std::fs::read_to_string(&csv).expect("CSV should be readable"),
        "City,Pop\nOslo,700\n"
    );
}
