use crate::model::{DetectedTable, PageText};
use crate::table_parse::{
    looks_like_sentence, modal_width, split_line_into_cells, split_line_into_words,
};

pub(crate) const LOW_CONFIDENCE_THRESHOLD: f32 = 0.60;

/// How a text line is cut into cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CellSplit {
    /// Tabs and wide gaps only.
    Gaps,
    /// Wide gaps, falling back to single spaces for short non-prose lines.
    GapsOrWords,
}

fn table_confidence(rows: &[Vec<String>]) -> f32 {
    if rows.len() < 2 {
        return 0.0;
    }

    let modal = modal_width(rows);
    if modal == 0 {
        return 0.0;
    }

    let consistent =
        rows.iter().filter(|row| row.len() == modal).count() as f32 / rows.len() as f32;
    let max_width = rows.iter().map(Vec::len).max().unwrap_or(modal);
    let min_width = rows.iter().map(Vec::len).min().unwrap_or(modal);
    let uniformity = 1.0 - ((max_width - min_width) as f32 / max_width as f32);

    (consistent * 0.75 + uniformity * 0.25).clamp(0.0, 1.0)
}

fn line_cells(line: &str, min_cols: usize, split: CellSplit) -> Vec<String> {
    let cells = split_line_into_cells(line);
    if cells.len() >= min_cols || split == CellSplit::Gaps {
        return cells;
    }

    let words = split_line_into_words(line);
    let has_numeric = words
        .iter()
        .any(|word| word.chars().any(|ch| ch.is_ascii_digit()));
    if words.len() >= min_cols && !looks_like_sentence(line) && (has_numeric || words.len() <= 6) {
        words
    } else {
        cells
    }
}

pub(crate) fn detect_tables_in_page(
    page: &PageText,
    min_cols: usize,
    split: CellSplit,
) -> Vec<DetectedTable> {
    let mut tables = Vec::new();
    let mut current: Vec<Vec<String>> = Vec::new();

    let mut flush = |rows: &mut Vec<Vec<String>>| {
        if rows.len() >= 2 {
            let confidence = table_confidence(rows);
            if confidence < LOW_CONFIDENCE_THRESHOLD {
                tracing::debug!(
                    page = page.page_number,
                    confidence,
                    "keeping low-confidence table"
                );
            }
            tables.push(DetectedTable {
                page: page.page_number,
                rows: std::mem::take(rows),
                confidence,
            });
        } else {
            rows.clear();
        }
    };

    for line in page.text.lines() {
        let cells = line_cells(line, min_cols, split);
        if cells.len() >= min_cols {
            current.push(cells);
        } else {
            flush(&mut current);
        }
    }
    flush(&mut current);

    tables
}

pub(crate) fn detect_tables(
    pages: &[PageText],
    min_cols: usize,
    split: CellSplit,
) -> Vec<DetectedTable> {
    pages
        .iter()
        .flat_map(|page| detect_tables_in_page(page, min_cols.max(2), split))
        .collect()
}
