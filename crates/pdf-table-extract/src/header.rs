/// Comparison form of a column name: trimmed and lower-cased.
#[must_use]
pub fn normalize_header_cell(cell: &str) -> String {
    cell.trim().to_lowercase()
}

/// Positional, case- and whitespace-insensitive header equality. Headers of
/// different widths never match.
#[must_use]
pub fn headers_match(left: &[String], right: &[String]) -> bool {
    left.len() == right.len()
        && left
            .iter()
            .zip(right)
            .all(|(a, b)| normalize_header_cell(a) == normalize_header_cell(b))
}

/// Header used for merged output. Columns past the reference header get
/// positional `col_{n}` names.
pub(crate) fn widen_header(reference: &[String], width: usize) -> Vec<String> {
    let mut headers = reference.to_vec();
    headers.extend((reference.len() + 1..=width).map(|index| format!("col_{index}")));
    headers
}
