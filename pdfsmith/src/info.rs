//! Basic facts about PDF files.

use lopdf::Document;
use serde::Serialize;
use std::path::PathBuf;

use crate::error::Result;
use crate::io::{LoadedPdf, PdfReader};
use crate::merge::{BookmarkManager, pages};
use crate::selection::{FileKind, FileSelection, Rejection};
use crate::utils::format_file_size;

/// What [`inspect`] reports for one file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentInfo {
    /// File path.
    pub path: PathBuf,
    /// Number of pages.
    pub pages: usize,
    /// PDF version from the header.
    pub version: String,
    /// File size in bytes.
    pub size: u64,
    /// Number of indirect objects.
    pub objects: usize,
    /// Width and height of the first page in points.
    pub first_page_size: Option<(f32, f32)>,
    /// Whether the catalog has an outline.
    pub has_outline: bool,
}

impl DocumentInfo {
    /// Collect the facts from a loaded document.
    pub fn from_loaded(loaded: &LoadedPdf) -> Self {
        let doc = &loaded.document;
        Self {
            path: loaded.path.clone(),
            pages: loaded.page_count,
            version: doc.version.clone(),
            size: loaded.file_size,
            objects: doc.objects.len(),
            first_page_size: first_page_size(doc),
            has_outline: BookmarkManager::new().has_bookmarks(doc),
        }
    }

    /// Multi-line human summary.
    pub fn summary(&self) -> String {
        let mut lines = vec![
            format!("{}", self.path.display()),
            format!("  Pages:    {}", self.pages),
            format!("  Version:  PDF {}", self.version),
            format!("  Size:     {}", format_file_size(self.size)),
            format!("  Objects:  {}", self.objects),
        ];
        if let Some((width, height)) = self.first_page_size {
            lines.push(format!("  Page 1:   {width:.0} x {height:.0} pt"));
        }
        if self.has_outline {
            lines.push("  Outline:  yes".to_string());
        }
        lines.join("\n")
    }
}

fn first_page_size(doc: &Document) -> Option<(f32, f32)> {
    let first = *doc.get_pages().values().next()?;
    let [llx, lly, urx, ury] = pages::media_box(doc, first)?;
    Some(((urx - llx).abs(), (ury - lly).abs()))
}

/// Inspect every PDF among `paths`, in order.
///
/// Files that are not PDFs are returned as rejections.
///
/// # Errors
///
/// Returns the first read or parse failure, or a validation error if no
/// PDF is left after filtering.
pub async fn inspect(paths: &[PathBuf], jobs: usize) -> Result<(Vec<DocumentInfo>, Vec<Rejection>)> {
    let (selection, rejected) = FileSelection::collect(paths, FileKind::DOCUMENTS).await?;

    let reader = PdfReader::allow_empty();
    let (results, _) = reader.load_all(selection.into_files(), jobs).await;

    let infos = results
        .into_iter()
        .map(|loaded| loaded.map(|loaded| DocumentInfo::from_loaded(&loaded)))
        .collect::<Result<Vec<_>>>()?;

    Ok((infos, rejected))
}
