//! Page tree operations shared by the tools.
//!
//! Pages may inherit `Resources`, `MediaBox`, `CropBox` and `Rotate` from
//! any ancestor node of the page tree. Before a page is moved to another
//! tree those attributes are copied onto the page itself, so it renders the
//! same under its new parent.

use lopdf::{Document, Object, ObjectId};

use crate::error::{Error, Result};
use crate::range::PageSet;

const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Deepest page tree we follow before assuming a `Parent` cycle.
const MAX_TREE_DEPTH: usize = 64;

/// Object id of the root `Pages` node.
///
/// # Errors
///
/// Returns an error if the catalog or its `Pages` entry is missing.
pub fn root_id(doc: &Document) -> Result<ObjectId> {
    let catalog = doc
        .catalog()
        .map_err(|e| Error::operation_failed("Page tree", format!("no catalog: {e}")))?;

    catalog
        .get(b"Pages")
        .and_then(Object::as_reference)
        .map_err(|e| Error::operation_failed("Page tree", format!("no Pages reference: {e}")))
}

/// Copy inherited attributes onto every page and return the page ids in
/// page order.
///
/// # Errors
///
/// Returns an error if a page object is not a dictionary.
pub fn inherit_attributes(doc: &mut Document) -> Result<Vec<ObjectId>> {
    let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();

    for &page_id in &page_ids {
        let inherited = inherited_values(doc, page_id)?;
        if inherited.is_empty() {
            continue;
        }

        let page = doc.get_dictionary_mut(page_id)?;
        for (key, value) in inherited {
            page.set(key, value);
        }
    }

    Ok(page_ids)
}

fn inherited_values(doc: &Document, page_id: ObjectId) -> Result<Vec<(&'static [u8], Object)>> {
    let page = doc.get_dictionary(page_id)?;

    let mut missing: Vec<&'static [u8]> = INHERITABLE
        .iter()
        .copied()
        .filter(|key| !page.has(key))
        .collect();
    let mut found = Vec::new();
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();

    for _ in 0..MAX_TREE_DEPTH {
        let Some(node_id) = parent else { break };
        if missing.is_empty() {
            break;
        }
        let Ok(node) = doc.get_dictionary(node_id) else {
            break;
        };

        missing.retain(|key| match node.get(key) {
            Ok(value) => {
                found.push((*key, value.clone()));
                false
            }
            Err(_) => true,
        });
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
    }

    Ok(found)
}

/// Remove the inheritable attributes from a page tree node.
///
/// Call after [`inherit_attributes`] so pages moved under `node` from
/// another document cannot pick up values meant for the original pages.
///
/// # Errors
///
/// Returns an error if `node` is not a dictionary.
pub fn strip_inheritable(doc: &mut Document, node: ObjectId) -> Result<()> {
    let node = doc.get_dictionary_mut(node)?;
    for key in INHERITABLE {
        node.remove(key);
    }
    Ok(())
}

/// Make `kids` the complete, flat list of pages under `root`.
///
/// # Errors
///
/// Returns an error if `root` or a page is not a dictionary.
pub fn set_kids(doc: &mut Document, root: ObjectId, kids: &[ObjectId]) -> Result<()> {
    for &page_id in kids {
        doc.get_dictionary_mut(page_id)?
            .set("Parent", Object::Reference(root));
    }

    let node = doc.get_dictionary_mut(root)?;
    node.set(
        "Kids",
        kids.iter()
            .map(|&id| Object::Reference(id))
            .collect::<Vec<Object>>(),
    );
    node.set("Count", kids.len() as i64);

    Ok(())
}

/// Delete every page not in `keep` and prune what only they referenced.
pub fn retain_pages(doc: &mut Document, keep: &PageSet) {
    let total = doc.get_pages().len() as u32;
    let doomed: Vec<u32> = (1..=total).filter(|&page| !keep.contains(page)).collect();

    if !doomed.is_empty() {
        doc.delete_pages(&doomed);
    }
    doc.prune_objects();
}

/// Effective `MediaBox` of a page as `[llx, lly, urx, ury]`.
pub fn media_box(doc: &Document, page_id: ObjectId) -> Option<[f32; 4]> {
    let mut node_id = page_id;

    for _ in 0..MAX_TREE_DEPTH {
        let node = doc.get_dictionary(node_id).ok()?;
        if let Ok(value) = node.get(b"MediaBox") {
            let array = match value {
                Object::Reference(id) => doc.get_object(*id).ok()?.as_array().ok()?,
                other => other.as_array().ok()?,
            };
            if array.len() != 4 {
                return None;
            }
            let mut rect = [0.0; 4];
            for (slot, number) in rect.iter_mut().zip(array) {
                *slot = number.as_float().ok()?;
            }
            return Some(rect);
        }
        node_id = node.get(b"Parent").and_then(Object::as_reference).ok()?;
    }

    None
}

/// Extracts page subsets into standalone documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageExtractor;

impl PageExtractor {
    /// Create a new page extractor.
    pub fn new() -> Self {
        Self
    }

    /// Copy `doc` keeping only the pages in `pages`, in their original order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PageOutOfBounds`] if `pages` names a page the
    /// document does not have.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use pdfsmith::merge::pages::PageExtractor;
    /// # use pdfsmith::range::PageRange;
    /// # use lopdf::Document;
    /// # fn example(doc: Document) -> Result<(), Box<dyn std::error::Error>> {
    /// let pages = PageRange::parse("1-5,10")?.resolve(doc.get_pages().len())?;
    /// let extracted = PageExtractor::new().extract(&doc, &pages)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn extract(&self, doc: &Document, pages: &PageSet) -> Result<Document> {
        let total = self.page_count(doc);
        if let Some(page) = pages.iter().find(|&p| p as usize > total) {
            return Err(Error::PageOutOfBounds {
                page,
                total_pages: total,
            });
        }

        let mut extracted = doc.clone();
        retain_pages(&mut extracted, pages);
        Ok(extracted)
    }

    /// Get the number of pages in a document.
    pub fn page_count(&self, doc: &Document) -> usize {
        doc.get_pages().len()
    }
}
