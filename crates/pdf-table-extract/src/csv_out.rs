use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use csv::{Terminator, WriterBuilder};
use regex::Regex;

use crate::error::ExtractError;
use crate::model::MergedTable;

const FRAGMENT_MAX_CHARS: usize = 20;
const FALLBACK_FRAGMENT: &str = "group";
const FALLBACK_BASE_NAME: &str = "document";

static UNSAFE_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_]+").expect("hardcoded filename regex is valid"));

/// Filename-safe form of a column name: runs of characters outside
/// `[A-Za-z0-9_]` become one `_`, capped at 20 characters. A name with no
/// safe character at all maps to `group`.
#[must_use]
pub fn sanitize_fragment(column: &str) -> String {
    if !column
        .chars()
        .any(|ch| ch.is_ascii_alphanumeric() || ch == '_')
    {
        return FALLBACK_FRAGMENT.to_string();
    }

    UNSAFE_RUN_RE
        .replace_all(column, "_")
        .chars()
        .take(FRAGMENT_MAX_CHARS)
        .collect()
}

/// CSV file name for one merged group. `group_index` is 1-based.
#[must_use]
pub fn csv_file_name(
    merged: &MergedTable,
    base_pdf_name: &str,
    group_index: usize,
    total_groups: usize,
) -> String {
    if total_groups == 1 {
        return format!("{base_pdf_name}.csv");
    }

    let fragment = merged
        .reference_header
        .first()
        .map_or_else(|| FALLBACK_FRAGMENT.to_string(), |column| sanitize_fragment(column));
    format!("{base_pdf_name}_{fragment}_{group_index}.csv")
}

/// File stem of the source PDF, used as the CSV base name.
#[must_use]
pub fn base_pdf_name(input_pdf: &Path) -> String {
    input_pdf
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| FALLBACK_BASE_NAME.to_string())
}

fn csv_writer() -> WriterBuilder {
    let mut builder = WriterBuilder::new();
    builder.terminator(Terminator::Any(b'\n'));
    builder
}

fn write_records<W: std::io::Write>(
    writer: &mut csv::Writer<W>,
    merged: &MergedTable,
) -> Result<(), ExtractError> {
    writer.write_record(&merged.headers)?;
    for row in &merged.rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes `merged` into `output_dir`, replacing any file of the same name.
///
/// # Errors
///
/// Fails when the directory cannot be created or the file cannot be written.
pub fn write_csv(
    merged: &MergedTable,
    output_dir: &Path,
    base_pdf_name: &str,
    group_index: usize,
    total_groups: usize,
) -> Result<PathBuf, ExtractError> {
    fs::create_dir_all(output_dir)?;
    let path = output_dir.join(csv_file_name(
        merged,
        base_pdf_name,
        group_index,
        total_groups,
    ));

    let mut writer = csv_writer().from_path(&path)?;
    write_records(&mut writer, merged)?;
    Ok(path)
}

/// # Errors
///
/// Fails when the CSV encoder rejects a record.
pub fn write_csv_to_string(merged: &MergedTable) -> Result<String, ExtractError> {
    let mut writer = csv_writer().from_writer(Vec::<u8>::new());
    write_records(&mut writer, merged)?;

    let bytes = writer
        .into_inner()
        .map_err(|error| ExtractError::Io(error.into_error()))?;
    Ok(String::from_utf8(bytes)?)
}
