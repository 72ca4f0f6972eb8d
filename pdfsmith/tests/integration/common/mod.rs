//! Shared fixtures for the integration tests.
//!
//! Fixtures are generated into a temporary directory so the tests carry no
//! binary files.

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, Stream, dictionary};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary directory holding generated inputs.
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Create an empty workspace.
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    /// Path of `name` inside the workspace.
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Root of the workspace.
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Write a PDF with `pages` pages of width `width` points.
    pub fn pdf(&self, name: &str, pages: usize, width: i64) -> PathBuf {
        self.write(name, &pdf_bytes(pages, width))
    }

    /// Write a PNG gradient.
    pub fn png(&self, name: &str, width: u32, height: u32) -> PathBuf {
        self.write(name, &image_bytes(width, height, ImageFormat::Png))
    }

    /// Write a JPEG gradient.
    pub fn jpeg(&self, name: &str, width: u32, height: u32) -> PathBuf {
        self.write(name, &image_bytes(width, height, ImageFormat::Jpeg))
    }

    /// Write raw bytes.
    pub fn write(&self, name: &str, bytes: &[u8]) -> PathBuf {
        let path = self.path(name);
        std::fs::write(&path, bytes).expect("Failed to write fixture");
        path
    }
}

/// A document whose pages each show "Page n" and are `width` points wide.
pub fn pdf_document(pages: usize, width: i64) -> Document {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for n in 1..=pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(format!("Page {n}"))]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            Dictionary::new(),
            content.encode().expect("Failed to encode content"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), width.into(), 792.into()],
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    doc
}

/// Serialized [`pdf_document`].
pub fn pdf_bytes(pages: usize, width: i64) -> Vec<u8> {
    let mut doc = pdf_document(pages, width);
    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("Failed to serialize fixture");
    bytes
}

/// Encoded gradient image.
pub fn image_bytes(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let image = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 255 / width) as u8, (y * 255 / height) as u8, 128])
    });
    let mut cursor = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(image)
        .write_to(&mut cursor, format)
        .expect("Failed to encode image");
    cursor.into_inner()
}

/// Widths of all pages, in page order, read from each page's `MediaBox`.
pub fn page_widths(doc: &Document) -> Vec<f32> {
    doc.get_pages()
        .values()
        .map(|&id| {
            let media_box = doc
                .get_dictionary(id)
                .and_then(|page| page.get(b"MediaBox"))
                .and_then(Object::as_array)
                .expect("page has no MediaBox");
            media_box[2].as_float().unwrap() - media_box[0].as_float().unwrap()
        })
        .collect()
}

/// Load a written PDF back from disk.
pub fn reload(path: &Path) -> Document {
    Document::load(path).expect("Failed to reload output")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_writes_fixtures() {
        let workspace = Workspace::new();
        let pdf = workspace.pdf("a.pdf", 2, 500);
        let png = workspace.png("a.png", 4, 3);

        assert!(pdf.starts_with(workspace.root()));
        assert_eq!(page_widths(&reload(&pdf)), vec![500.0, 500.0]);
        assert!(std::fs::read(png).unwrap().starts_with(b"\x89PNG"));
    }
}
