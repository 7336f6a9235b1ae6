use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

static CELL_GAP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\t|\s{2,}").expect("hardcoded cell gap regex is valid"));

/// Splits a text line on tabs or runs of two or more whitespace characters.
pub(crate) fn split_line_into_cells(line: &str) -> Vec<String> {
    CELL_GAP_RE
        .split(line.trim())
        .map(str::trim)
        .filter(|cell| !cell.is_empty())
        .map(str::to_string)
        .collect()
}

/// Splits on every whitespace run. Only used when a line has too few
/// gap-separated cells.
pub(crate) fn split_line_into_words(line: &str) -> Vec<String> {
    line.split_whitespace().map(str::to_string).collect()
}

pub(crate) fn looks_like_sentence(line: &str) -> bool {
    line.trim_end().ends_with(['.', '!', '?'])
}

pub(crate) fn normalize_rows(rows: &[Vec<String>], width: usize) -> Vec<Vec<String>> {
    rows.iter()
        .map(|row| {
            let mut out = row.clone();
            if out.len() < width {
                out.resize(width, String::new());
            }
            out
        })
        .collect()
}

pub(crate) fn modal_width(rows: &[Vec<String>]) -> usize {
    let mut freq: HashMap<usize, usize> = HashMap::new();
    for row in rows {
        *freq.entry(row.len()).or_default() += 1;
    }

    freq.into_iter()
        .max_by_key(|&(width, count)| (count, width))
        .map_or(0, |(width, _)| width)
}
