//! Splitting one PDF into several, or extracting a page subset.
//!
//! The selected pages (every page when no range is given) are distributed
//! over output files according to the [`SplitMode`]:
//!
//! | mode      | outputs                          | file name                     |
//! |-----------|----------------------------------|-------------------------------|
//! | `ranges`  | one per run of consecutive pages | `{stem}_pages_{a}-{b}.pdf`    |
//! | `pages`   | one per page                     | `{stem}_page_{n}.pdf`         |
//! | `extract` | one with every selected page     | `{stem}_extracted.pdf`        |
//!
//! A run of a single page is named like a single page. `stem` is the input
//! file stem unless [`SplitOptions::prefix`] is set.
//!
//! # Examples
//!
//! ```no_run
//! use pdfsmith::config::{Config, Operation, SplitMode, SplitOptions};
//! use pdfsmith::range::PageRange;
//! use pdfsmith::split::Splitter;
//! use std::path::PathBuf;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let options = SplitOptions {
//!     pages: Some(PageRange::parse("1-3,7")?),
//!     mode: SplitMode::Ranges,
//!     prefix: None,
//! };
//! let config = Config::new(
//!     vec![PathBuf::from("report.pdf")],
//!     PathBuf::from("parts"),
//!     Operation::Split(options.clone()),
//! );
//! let result = Splitter::new().split(&config, &options).await?;
//! for part in &result.parts {
//!     println!("{}: {} page(s)", part.file_name, part.pages.len());
//! }
//! # Ok(())
//! # }
//! ```

use lopdf::Document;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::config::{Config, SplitMode, SplitOptions, validate_prefix};
use crate::error::{Error, Result};
use crate::io::PdfReader;
use crate::merge::PageExtractor;
use crate::range::PageSet;
use crate::selection::{FileKind, FileSelection};

/// Name and pages of one planned output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartPlan {
    /// Output file name.
    pub file_name: String,
    /// Pages of the input it holds.
    pub pages: PageSet,
}

/// One output document.
#[derive(Debug, Clone)]
pub struct SplitPart {
    /// Output file name, relative to the output directory.
    pub file_name: String,
    /// Input pages it holds, ascending.
    pub pages: Vec<u32>,
    /// The document.
    pub document: Document,
}

impl SplitPart {
    /// Where the part goes inside `dir`.
    pub fn output_path(&self, dir: &Path) -> PathBuf {
        dir.join(&self.file_name)
    }
}

/// Summary of one output for reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartSummary {
    /// Output file name.
    pub file_name: String,
    /// Input pages it holds.
    pub pages: Vec<u32>,
}

/// What a split produced.
#[derive(Debug, Clone, Serialize)]
pub struct SplitReport {
    /// Input path.
    pub input: PathBuf,
    /// Pages in the input.
    pub total_pages: usize,
    /// Mode applied.
    pub mode: SplitMode,
    /// Pages selected.
    pub selected_pages: usize,
    /// Outputs, in page order.
    pub parts: Vec<PartSummary>,
}

/// Split output documents and their report.
#[derive(Debug, Clone)]
pub struct SplitResult {
    /// Output documents, in page order.
    pub parts: Vec<SplitPart>,
    /// What happened.
    pub report: SplitReport,
}

/// Splits a PDF into parts.
#[derive(Debug, Clone, Default)]
pub struct Splitter {
    reader: PdfReader,
    extractor: PageExtractor,
}

impl Splitter {
    /// Create a new splitter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the single input of `config` and split it.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a prefix that is not a plain file
    /// name, a non-PDF input, a malformed range or a page beyond the end of
    /// the document; otherwise load failures.
    pub async fn split(&self, config: &Config, options: &SplitOptions) -> Result<SplitResult> {
        if let Some(prefix) = &options.prefix {
            validate_prefix(prefix)?;
        }

        let (selection, _) = FileSelection::collect(&config.inputs, FileKind::DOCUMENTS).await?;
        let file = selection
            .into_files()
            .into_iter()
            .next()
            .ok_or(Error::NoInputs)?;

        let stem = options.prefix.clone().unwrap_or_else(|| file.stem());
        let loaded = self.reader.load_selected(file).await?;

        let selected = match &options.pages {
            Some(range) => range.resolve(loaded.page_count)?,
            None => PageSet::all(loaded.page_count),
        };
        let plans = plan_parts(&selected, options.mode, &stem);

        tracing::debug!(
            path = %loaded.path.display(),
            parts = plans.len(),
            mode = %options.mode,
            "splitting document"
        );

        let extractor = self.extractor;
        let document = loaded.document;
        let parts = tokio::task::spawn_blocking(move || extract_parts(&extractor, &document, plans))
            .await
            .map_err(|e| Error::operation_failed("Split", format!("task failed: {e}")))??;

        let report = SplitReport {
            input: loaded.path,
            total_pages: loaded.page_count,
            mode: options.mode,
            selected_pages: selected.len(),
            parts: parts
                .iter()
                .map(|part| PartSummary {
                    file_name: part.file_name.clone(),
                    pages: part.pages.clone(),
                })
                .collect(),
        };

        Ok(SplitResult { parts, report })
    }
}

/// Split an already-loaded document.
///
/// # Errors
///
/// Returns [`Error::PageOutOfBounds`] if `selected` names a page the
/// document does not have.
pub fn split_document(
    doc: &Document,
    selected: &PageSet,
    mode: SplitMode,
    stem: &str,
) -> Result<Vec<SplitPart>> {
    extract_parts(&PageExtractor::new(), doc, plan_parts(selected, mode, stem))
}

fn extract_parts(
    extractor: &PageExtractor,
    doc: &Document,
    plans: Vec<PartPlan>,
) -> Result<Vec<SplitPart>> {
    plans
        .into_iter()
        .map(|plan| {
            let document = extractor.extract(doc, &plan.pages)?;
            Ok(SplitPart {
                file_name: plan.file_name,
                pages: plan.pages.to_vec(),
                document,
            })
        })
        .collect()
}

/// Distribute `selected` over outputs named after `stem`.
pub fn plan_parts(selected: &PageSet, mode: SplitMode, stem: &str) -> Vec<PartPlan> {
    match mode {
        SplitMode::Extract => {
            if selected.is_empty() {
                return Vec::new();
            }
            vec![PartPlan {
                file_name: format!("{stem}_extracted.pdf"),
                pages: selected.clone(),
            }]
        }
        SplitMode::Pages => selected
            .iter()
            .map(|page| PartPlan {
                file_name: page_name(stem, page),
                pages: [page].into_iter().collect(),
            })
            .collect(),
        SplitMode::Ranges => selected
            .runs()
            .into_iter()
            .map(|run| {
                let (start, end) = (*run.start(), *run.end());
                let file_name = if start == end {
                    page_name(stem, start)
                } else {
                    format!("{stem}_pages_{start}-{end}.pdf")
                };
                PartPlan {
                    file_name,
                    pages: run.collect(),
                }
            })
            .collect(),
    }
}

fn page_name(stem: &str, page: u32) -> String {
    format!("{stem}_page_{page}.pdf")
}
