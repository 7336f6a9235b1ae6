#![allow(dead_code)]

use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, dictionary};

type FixtureResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Builds small text PDFs: one Courier text block per page, one line per
/// entry, so gap-separated cells survive extraction.
#[derive(Debug, Default)]
pub struct PdfFixture {
    pages: Vec<Vec<String>>,
}

impl PdfFixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, lines: &[&str]) -> Self {
        self.pages
            .push(lines.iter().map(ToString::to_string).collect());
        self
    }

    fn page_operations(lines: &[String]) -> Vec<Operation> {
        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 11.into()]),
            Operation::new("TL", vec![15.into()]),
            Operation::new("Td", vec![40.into(), 790.into()]),
        ];
        for (index, line) in lines.iter().enumerate() {
            if index > 0 {
                operations.push(Operation::new("T*", vec![]));
            }
            operations.push(Operation::new(
                "Tj",
                vec![Object::string_literal(line.as_str())],
            ));
        }
        operations.push(Operation::new("ET", vec![]));
        operations
    }

    fn build(&self) -> FixtureResult<Document> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<ObjectId> = Vec::with_capacity(self.pages.len());
        for lines in &self.pages {
            let content = Content {
                operations: Self::page_operations(lines),
            };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
            kids.push(doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            }));
        }

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids.iter().map(|id| Object::Reference(*id)).collect::<Vec<_>>(),
                "Count" => i64::try_from(kids.len())?,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.compress();
        Ok(doc)
    }

    pub fn save(&self, path: &Path) -> FixtureResult<()> {
        self.build()?.save(path)?;
        Ok(())
    }

    pub fn to_bytes(&self) -> FixtureResult<Vec<u8>> {
        let mut bytes = Vec::new();
        self.build()?.save_to(&mut bytes)?;
        Ok(bytes)
    }
}

/// Bytes that no PDF parser accepts.
pub fn corrupt_pdf_bytes() -> Vec<u8> {
    b"%PDF-1.5\nthis is not a pdf body at all\n".to_vec()
}
