//! Core PDF merging implementation.
//!
//! The first input becomes the base document. Every other input is
//! renumbered past the base's highest object id, its objects are imported,
//! and its pages are appended to the base's root page tree. Catalogs and
//! page trees of the imported documents are left unreferenced and pruned.

use lopdf::{Document, ObjectId};
use serde::Serialize;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::compress;
use crate::config::{Config, MergeOptions};
use crate::error::{Error, Result};
use crate::io::{LoadedPdf, PdfReader};
use crate::merge::bookmarks::{BookmarkManager, OutlineEntry};
use crate::merge::pages;
use crate::selection::{FileKind, FileSelection, Rejection};
use crate::utils::format_file_size;

/// Where one input ended up in the merged document.
#[derive(Debug, Clone, Serialize)]
pub struct MergedSource {
    /// Input path.
    pub path: PathBuf,
    /// First page of the input in the merged document (1-based).
    pub first_page: usize,
    /// Pages contributed.
    pub page_count: usize,
}

/// Statistics about a merge operation.
#[derive(Debug, Clone, Serialize)]
pub struct MergeStatistics {
    /// Number of PDFs merged.
    pub files_merged: usize,

    /// Total number of pages in merged document.
    pub total_pages: usize,

    /// Total size of input files.
    pub input_size: u64,

    /// Number of outline entries added.
    pub bookmarks_added: usize,

    /// Inputs in merge order.
    pub sources: Vec<MergedSource>,

    /// Inputs left out because they are not PDFs.
    pub rejected: Vec<Rejection>,

    /// Time spent loading inputs.
    #[serde(skip)]
    pub load_time: Duration,

    /// Total time taken for merge.
    #[serde(skip)]
    pub merge_time: Duration,
}

impl MergeStatistics {
    /// Format input size as human-readable string.
    pub fn format_input_size(&self) -> String {
        format_file_size(self.input_size)
    }
}

/// Result of a merge operation.
#[derive(Debug)]
pub struct MergeResult {
    /// The merged PDF document.
    pub document: Document,

    /// Statistics about the merge.
    pub statistics: MergeStatistics,
}

/// PDF merger that combines multiple documents.
#[derive(Debug, Clone, Default)]
pub struct Merger {
    reader: PdfReader,
    bookmarks: BookmarkManager,
}

impl Merger {
    /// Create a new merger with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `config.inputs` and merge them in order.
    ///
    /// Inputs that are not PDFs are skipped and listed in
    /// [`MergeStatistics::rejected`].
    ///
    /// # Errors
    ///
    /// Returns an error if no PDF is left after filtering, any PDF fails to
    /// load, or the merged document cannot be assembled.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use pdfsmith::merge::Merger;
    /// # use pdfsmith::config::{Config, MergeOptions, Operation};
    /// # use std::path::PathBuf;
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let options = MergeOptions::default();
    /// let config = Config::new(
    ///     vec![PathBuf::from("a.pdf"), PathBuf::from("b.pdf")],
    ///     PathBuf::from("merged.pdf"),
    ///     Operation::Merge(options.clone()),
    /// );
    /// let result = Merger::new().merge(&config, &options).await?;
    /// println!("Merged {} pages", result.statistics.total_pages);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn merge(&self, config: &Config, options: &MergeOptions) -> Result<MergeResult> {
        let merge_start = Instant::now();

        let inputs = apply_order(&config.inputs, options.order.as_deref())?;
        let (selection, rejected) = FileSelection::collect(&inputs, FileKind::DOCUMENTS).await?;

        let load_start = Instant::now();
        let (results, _) = self
            .reader
            .load_all(selection.into_files(), config.effective_jobs())
            .await;
        let loaded = results.into_iter().collect::<Result<Vec<LoadedPdf>>>()?;
        let load_time = load_start.elapsed();

        let input_size = loaded.iter().map(|p| p.file_size).sum();
        let options = options.clone();
        let bookmarks = self.bookmarks;

        let (document, sources, bookmarks_added) =
            tokio::task::spawn_blocking(move || merge_loaded(loaded, &options, bookmarks))
                .await
                .map_err(|e| Error::operation_failed("Merge", format!("task failed: {e}")))??;

        let statistics = MergeStatistics {
            files_merged: sources.len(),
            total_pages: document.get_pages().len(),
            input_size,
            bookmarks_added,
            sources,
            rejected,
            load_time,
            merge_time: merge_start.elapsed(),
        };

        tracing::info!(
            files = statistics.files_merged,
            pages = statistics.total_pages,
            "merge finished"
        );

        Ok(MergeResult {
            document,
            statistics,
        })
    }
}

/// Merge already-loaded documents in order.
///
/// # Errors
///
/// Returns [`Error::NoInputs`] for an empty list, or an error if a page
/// tree is malformed.
pub fn merge_documents(loaded: Vec<LoadedPdf>, options: &MergeOptions) -> Result<Document> {
    merge_loaded(loaded, options, BookmarkManager::new()).map(|(document, _, _)| document)
}

fn merge_loaded(
    loaded: Vec<LoadedPdf>,
    options: &MergeOptions,
    bookmarks: BookmarkManager,
) -> Result<(Document, Vec<MergedSource>, usize)> {
    let mut inputs = loaded.into_iter();
    let first = inputs.next().ok_or(Error::NoInputs)?;

    let mut merged = first.document;
    let root = pages::root_id(&merged)?;
    let mut kids: Vec<ObjectId> = pages::inherit_attributes(&mut merged)?;
    pages::strip_inheritable(&mut merged, root)?;

    let mut sources = vec![MergedSource {
        path: first.path,
        first_page: 1,
        page_count: kids.len(),
    }];
    let mut first_pages = vec![kids.first().copied()];

    for loaded in inputs {
        let mut doc = loaded.document;
        pages::inherit_attributes(&mut doc)?;

        doc.renumber_objects_with(merged.max_id + 1);
        let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();
        merged.max_id = merged.max_id.max(doc.max_id);

        tracing::debug!(
            path = %loaded.path.display(),
            pages = page_ids.len(),
            "appending document"
        );

        first_pages.push(page_ids.first().copied());
        sources.push(MergedSource {
            path: loaded.path,
            first_page: kids.len() + 1,
            page_count: page_ids.len(),
        });

        merged.objects.extend(doc.objects);
        kids.extend(page_ids);
    }

    pages::set_kids(&mut merged, root, &kids)?;

    let mut bookmarks_added = 0;
    if options.bookmarks {
        let entries: Vec<OutlineEntry> = sources
            .iter()
            .zip(first_pages)
            .filter_map(|(source, page)| {
                Some(OutlineEntry {
                    title: outline_title(&source.path),
                    page: page?,
                })
            })
            .collect();
        bookmarks_added = bookmarks.set_outline(&mut merged, &entries)?;
    }

    merged.prune_objects();

    compress::optimize(&mut merged, options.compression);

    Ok((merged, sources, bookmarks_added))
}

fn outline_title(path: &std::path::Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Rearrange `inputs` by 1-based `order`.
fn apply_order(inputs: &[PathBuf], order: Option<&[usize]>) -> Result<Vec<PathBuf>> {
    match order {
        None => Ok(inputs.to_vec()),
        Some(order) => {
            crate::config::validate_order(order, inputs.len())?;
            Ok(order.iter().map(|&p| inputs[p - 1].clone()).collect())
        }
    }
}
