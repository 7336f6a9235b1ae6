use std::collections::BTreeMap;
use std::path::Path;

use encoding_rs::{BIG5, UTF_16BE};
use lopdf::content::Content;
use lopdf::{Document, Object, ObjectId};

use crate::error::ExtractError;
use crate::model::{PageText, TextOutcome};

fn split_text_into_pages(raw_text: &str) -> Vec<String> {
    let mut pages = raw_text
        .split('\u{000C}')
        .map(str::to_string)
        .collect::<Vec<_>>();
    if pages.last().is_some_and(String::is_empty) {
        pages.pop();
    }
    pages
}

fn looks_decoding_broken(text: &str) -> bool {
    if text.contains("?Identity-H Unimplemented?") {
        return true;
    }

    let total = text.chars().count();
    if total == 0 {
        return false;
    }

    let replacement = text.matches('\u{FFFD}').count();
    let control = text
        .chars()
        .filter(|ch| ch.is_control() && !matches!(ch, '\n' | '\r' | '\t'))
        .count();

    replacement * 8 > total || control * 5 > total
}

fn decode_utf16(bytes: &[u8]) -> Option<String> {
    let bytes = bytes.strip_prefix(b"\xFE\xFF").unwrap_or(bytes);
    let (text, had_errors) = UTF_16BE.decode_without_bom_handling(bytes);
    (!had_errors && !text.is_empty()).then(|| text.into_owned())
}

/// Decodes a PDF string operand, recovering from fonts whose declared
/// encoding lopdf cannot map.
fn decode_pdf_bytes(encoding: Option<&str>, bytes: &[u8]) -> String {
    let decoded = Document::decode_text(encoding, bytes);
    if !looks_decoding_broken(&decoded) {
        return decoded;
    }

    if bytes.starts_with(&[0xFE, 0xFF]) {
        if let Some(text) = decode_utf16(bytes) {
            return text;
        }
    }

    let hint = encoding.map(str::to_ascii_lowercase).unwrap_or_default();
    if ["utf16", "ucs2", "identity-h", "unicode"]
        .iter()
        .any(|needle| hint.contains(needle))
    {
        if let Some(text) = decode_utf16(bytes) {
            return text;
        }
    }
    if ["big5", "b5", "eten", "cns"]
        .iter()
        .any(|needle| hint.contains(needle))
    {
        let (text, _, had_errors) = BIG5.decode(bytes);
        if !had_errors && !text.is_empty() {
            return text.into_owned();
        }
    }

    String::from_utf8_lossy(bytes).into_owned()
}

fn collect_operand_text(text: &mut String, encoding: Option<&str>, operands: &[Object]) {
    for operand in operands {
        match operand {
            Object::String(bytes, _) => text.push_str(&decode_pdf_bytes(encoding, bytes)),
            Object::Array(items) => {
                collect_operand_text(text, encoding, items);
                text.push(' ');
            }
            // Large negative kerning inside TJ is a visual gap.
            Object::Integer(value) if *value < -100 => text.push(' '),
            _ => {}
        }
    }
}

/// Rebuilds the text lines of one page from its content-stream operators.
fn page_lines_from_content(document: &Document, page_id: ObjectId) -> Option<String> {
    let raw_content = document.get_page_content(page_id).ok()?;
    let content = Content::decode(&raw_content).ok()?;
    let encodings = document
        .get_page_fonts(page_id)
        .into_iter()
        .map(|(name, font)| (name, font.get_font_encoding()))
        .collect::<BTreeMap<Vec<u8>, &str>>();

    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_encoding = None;
    for operation in content.operations {
        match operation.operator.as_str() {
            "Tf" => {
                current_encoding = operation
                    .operands
                    .first()
                    .and_then(|operand| operand.as_name().ok())
                    .and_then(|name| encodings.get(name).copied());
            }
            "Tj" | "TJ" | "'" | "\"" => {
                collect_operand_text(&mut current, current_encoding, &operation.operands);
            }
            "T*" | "Td" | "TD" | "ET" => {
                if !current.trim().is_empty() {
                    lines.push(std::mem::take(&mut current));
                } else {
                    current.clear();
                }
            }
            _ => {}
        }
    }
    if !current.trim().is_empty() {
        lines.push(current);
    }

    (!lines.is_empty()).then(|| lines.join("\n"))
}

/// Page texts rebuilt from content-stream text operators.
pub(crate) fn read_layout_pages(document: &Document) -> Result<Vec<PageText>, ExtractError> {
    let pages_map = document.get_pages();
    if pages_map.is_empty() {
        return Err(ExtractError::NoPages);
    }

    Ok(pages_map
        .iter()
        .map(|(page_no, page_id)| PageText {
            page_number: *page_no,
            text: page_lines_from_content(document, *page_id).unwrap_or_default(),
        })
        .collect())
}

/// Page texts as laid out by pdf-extract, one entry per form feed. When
/// pdf-extract disagrees with the page tree, lopdf's own per-page text is
/// used instead.
pub(crate) fn read_stream_pages(
    input_pdf: &Path,
    document: &Document,
) -> Result<Vec<PageText>, ExtractError> {
    let pages_map = document.get_pages();
    if pages_map.is_empty() {
        return Err(ExtractError::NoPages);
    }

    let raw_text = pdf_extract::extract_text(input_pdf)
        .map_err(|error| ExtractError::PdfExtract(error.to_string()))?;
    let split = split_text_into_pages(&raw_text);

    if split.len() == pages_map.len() {
        return Ok(pages_map
            .keys()
            .zip(split)
            .map(|(page_no, text)| PageText {
                page_number: *page_no,
                text,
            })
            .collect());
    }

    tracing::debug!(
        extracted = split.len(),
        expected = pages_map.len(),
        "pdf-extract page count mismatch; using lopdf page text"
    );
    Ok(pages_map
        .keys()
        .map(|page_no| PageText {
            page_number: *page_no,
            text: document.extract_text(&[*page_no]).unwrap_or_default(),
        })
        .collect())
}

/// Best-effort plain text of the whole document.
#[must_use]
pub fn extract_text(input_pdf: &Path) -> TextOutcome {
    let result = std::panic::catch_unwind(|| pdf_extract::extract_text(input_pdf));
    match result {
        Ok(Ok(text)) if text.trim().is_empty() => TextOutcome::Empty,
        Ok(Ok(text)) => TextOutcome::Text(text),
        Ok(Err(error)) => TextOutcome::Failed(ExtractError::PdfExtract(error.to_string())),
        Err(_) => TextOutcome::Failed(ExtractError::Panicked {
            strategy: "text",
            message: "pdf-extract panicked while reading text".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::{decode_pdf_bytes, looks_decoding_broken, split_text_into_pages};

    #[test]
    fn splits_form_feed_delimited_pages() {
        assert_eq!(split_text_into_pages("p1\u{000C}p2\u{000C}"), vec!["p1", "p2"]);
    }

    #[test]
    fn plain_text_is_not_broken() {
        assert!(!looks_decoding_broken("Name  Age"));
        assert!(!looks_decoding_broken(""));
        assert!(looks_decoding_broken("\u{FFFD}\u{FFFD}ab"));
    }

    #[test]
    fn recovers_big5_from_encoding_hint() {
        let (bytes, _, had_errors) = encoding_rs::BIG5.encode("測試");
        assert!(!had_errors);
        assert_eq!(decode_pdf_bytes(Some("ETen-B5-H"), &bytes), "測試");
    }
}
