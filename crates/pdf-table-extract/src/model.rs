use crate::error::ExtractError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    pub page_number: u32,
    pub text: String,
}

/// A block of consecutive multi-cell lines found on one page.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedTable {
    pub page: u32,
    pub rows: Vec<Vec<String>>,
    pub confidence: f32,
}

/// One extracted table: the first row is the header, the rest is the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    pub index: usize,
    pub page: u32,
    pub header: Vec<String>,
    pub body: Vec<Vec<String>>,
}

impl RawTable {
    /// Splits `rows` into header and body. Tables without a body row are
    /// rejected.
    #[must_use]
    pub fn from_rows(index: usize, page: u32, mut rows: Vec<Vec<String>>) -> Option<Self> {
        if rows.len() < 2 {
            return None;
        }

        let body = rows.split_off(1);
        let header = rows.pop()?;
        Some(Self {
            index,
            page,
            header,
            body,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderGroup {
    pub reference_header: Vec<String>,
    pub members: Vec<RawTable>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedTable {
    /// Header of the first table placed into the group.
    pub reference_header: Vec<String>,
    /// Output header: the reference header, widened with `col_{n}` names when
    /// a body row is longer than it.
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub source_tables: Vec<usize>,
}

impl MergedTable {
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }
}

/// Result of running the table extractors over one document.
#[derive(Debug)]
pub enum ExtractionOutcome {
    Tables(Vec<RawTable>),
    NoTables,
    Failed(ExtractError),
}

impl ExtractionOutcome {
    #[must_use]
    pub fn tables(&self) -> &[RawTable] {
        match self {
            Self::Tables(tables) => tables,
            Self::NoTables | Self::Failed(_) => &[],
        }
    }

    #[must_use]
    pub fn into_tables(self) -> Vec<RawTable> {
        match self {
            Self::Tables(tables) => tables,
            Self::NoTables | Self::Failed(_) => Vec::new(),
        }
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Result of best-effort plain text extraction.
#[derive(Debug)]
pub enum TextOutcome {
    Text(String),
    Empty,
    Failed(ExtractError),
}
