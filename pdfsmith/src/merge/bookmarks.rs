//! Document outline (bookmarks) for merged documents.

use crate::error::{Error, Result};
use lopdf::{Dictionary, Document, Object, ObjectId, StringFormat};

/// One top-level outline entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineEntry {
    /// Text shown in the viewer's outline pane.
    pub title: String,
    /// Page the entry jumps to.
    pub page: ObjectId,
}

/// Manager for PDF bookmarks (outlines).
#[derive(Debug, Clone, Copy, Default)]
pub struct BookmarkManager;

impl BookmarkManager {
    /// Create a new bookmark manager.
    pub fn new() -> Self {
        Self
    }

    /// Replace the document outline with a flat list of entries.
    ///
    /// Returns the number of entries written; an empty list leaves the
    /// document untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be found.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use pdfsmith::merge::bookmarks::{BookmarkManager, OutlineEntry};
    /// # use lopdf::Document;
    /// # fn example(mut doc: Document) -> Result<(), Box<dyn std::error::Error>> {
    /// let first_page = *doc.get_pages().get(&1).unwrap();
    /// let entries = vec![OutlineEntry { title: "Chapter 1".into(), page: first_page }];
    /// BookmarkManager::new().set_outline(&mut doc, &entries)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn set_outline(&self, doc: &mut Document, entries: &[OutlineEntry]) -> Result<usize> {
        if entries.is_empty() {
            return Ok(0);
        }

        let outline_id = doc.new_object_id();
        let item_ids: Vec<ObjectId> = entries.iter().map(|_| doc.new_object_id()).collect();

        for (i, entry) in entries.iter().enumerate() {
            let mut item = Dictionary::new();
            item.set(
                "Title",
                Object::String(pdf_text(&entry.title), StringFormat::Literal),
            );
            item.set("Parent", Object::Reference(outline_id));
            item.set(
                "Dest",
                vec![
                    Object::Reference(entry.page),
                    Object::Name(b"XYZ".to_vec()),
                    Object::Null,
                    Object::Null,
                    Object::Null,
                ],
            );
            if i > 0 {
                item.set("Prev", Object::Reference(item_ids[i - 1]));
            }
            if let Some(&next) = item_ids.get(i + 1) {
                item.set("Next", Object::Reference(next));
            }

            doc.objects.insert(item_ids[i], Object::Dictionary(item));
        }

        let mut outline = Dictionary::new();
        outline.set("Type", Object::Name(b"Outlines".to_vec()));
        outline.set("Count", item_ids.len() as i64);
        if let (Some(&first), Some(&last)) = (item_ids.first(), item_ids.last()) {
            outline.set("First", Object::Reference(first));
            outline.set("Last", Object::Reference(last));
        }
        doc.objects.insert(outline_id, Object::Dictionary(outline));

        doc.catalog_mut()
            .map_err(|e| Error::operation_failed("Bookmarks", format!("no catalog: {e}")))?
            .set("Outlines", Object::Reference(outline_id));

        Ok(item_ids.len())
    }

    /// Check if a document has bookmarks.
    pub fn has_bookmarks(&self, doc: &Document) -> bool {
        doc.catalog()
            .map(|catalog| catalog.has(b"Outlines"))
            .unwrap_or(false)
    }

    /// Titles of the top-level outline entries, in order.
    pub fn titles(&self, doc: &Document) -> Vec<String> {
        let mut titles = Vec::new();

        let first = doc
            .catalog()
            .and_then(|c| c.get(b"Outlines"))
            .and_then(Object::as_reference)
            .and_then(|id| doc.get_dictionary(id))
            .and_then(|outline| outline.get(b"First"))
            .and_then(Object::as_reference);

        let mut next = first.ok();
        while let Some(id) = next {
            let Ok(item) = doc.get_dictionary(id) else {
                break;
            };
            if let Ok(Object::String(bytes, _)) = item.get(b"Title") {
                titles.push(String::from_utf8_lossy(bytes).into_owned());
            }
            next = item.get(b"Next").and_then(Object::as_reference).ok();
            if titles.len() > doc.objects.len() {
                break;
            }
        }

        titles
    }
}

/// Text strings that are not plain ASCII are written as UTF-16BE with a BOM.
fn pdf_text(title: &str) -> Vec<u8> {
    if title.is_ascii() {
        return title.as_bytes().to_vec();
    }

    let mut bytes = vec![0xFE, 0xFF];
    for unit in title.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    bytes
}
