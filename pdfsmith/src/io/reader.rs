//! PDF loading.
//!
//! Parsing runs on the blocking pool so a large document does not stall the
//! runtime. Batches are loaded with bounded concurrency and come back in
//! input order.
//!
//! # Examples
//!
//! ```no_run
//! use pdfsmith::io::reader::PdfReader;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let reader = PdfReader::new();
//! let loaded = reader.load(Path::new("document.pdf")).await?;
//! println!("{} pages", loaded.page_count);
//! # Ok(())
//! # }
//! ```

use lopdf::Document;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::error::{Error, Result};
use crate::selection::SelectedFile;
use crate::utils::format_file_size;

/// A parsed PDF document and where it came from.
#[derive(Debug, Clone)]
pub struct LoadedPdf {
    /// The PDF document.
    pub document: Document,

    /// Path to the source file.
    pub path: PathBuf,

    /// Number of pages in the document.
    pub page_count: usize,

    /// Time taken to parse the document.
    pub load_time: Duration,

    /// Size of the source bytes.
    pub file_size: u64,
}

impl LoadedPdf {
    /// File name for messages and outline titles.
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Result of a load operation.
pub type LoadResult = Result<LoadedPdf>;

/// Statistics for a batch load.
#[derive(Debug, Clone)]
pub struct LoadStatistics {
    /// Number of PDFs successfully loaded.
    pub success_count: usize,

    /// Number of PDFs that failed to load.
    pub failure_count: usize,

    /// Wall time for the whole batch.
    pub total_time: Duration,

    /// Total size of successfully loaded files.
    pub total_size: u64,

    /// Total number of pages loaded.
    pub total_pages: usize,
}

impl LoadStatistics {
    fn from_results(results: &[LoadResult], total_time: Duration) -> Self {
        let mut stats = Self {
            success_count: 0,
            failure_count: 0,
            total_time,
            total_size: 0,
            total_pages: 0,
        };

        for result in results {
            match result {
                Ok(loaded) => {
                    stats.success_count += 1;
                    stats.total_size += loaded.file_size;
                    stats.total_pages += loaded.page_count;
                }
                Err(_) => stats.failure_count += 1,
            }
        }

        stats
    }

    /// Format total size as human-readable string.
    pub fn format_total_size(&self) -> String {
        format_file_size(self.total_size)
    }
}

/// PDF reader.
#[derive(Debug, Clone, Copy)]
pub struct PdfReader {
    /// Reject documents without pages.
    require_pages: bool,
}

impl PdfReader {
    /// Create a reader that rejects documents without pages.
    pub fn new() -> Self {
        Self {
            require_pages: true,
        }
    }

    /// Create a reader that accepts documents without pages.
    pub fn allow_empty() -> Self {
        Self {
            require_pages: false,
        }
    }

    /// Read and parse a PDF from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not a valid PDF, is
    /// encrypted, or has no pages.
    pub async fn load(&self, path: &Path) -> Result<LoadedPdf> {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::file_not_found(path.to_path_buf())
            } else {
                Error::FileNotAccessible {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;

        self.load_bytes(path.to_path_buf(), bytes).await
    }

    /// Parse PDF bytes that were read elsewhere.
    ///
    /// # Errors
    ///
    /// Same as [`PdfReader::load`], minus the I/O failures.
    pub async fn load_bytes(&self, path: PathBuf, bytes: Vec<u8>) -> Result<LoadedPdf> {
        let require_pages = self.require_pages;

        tokio::task::spawn_blocking(move || parse(path, &bytes, require_pages))
            .await
            .map_err(|e| Error::operation_failed("Load", e.to_string()))?
    }

    /// Parse a selected file.
    pub async fn load_selected(&self, file: SelectedFile) -> Result<LoadedPdf> {
        self.load_bytes(file.path, file.bytes).await
    }

    /// Parse a batch of selected files, at most `jobs` at a time.
    ///
    /// Results are in the same order as `files`.
    pub async fn load_all(
        &self,
        files: Vec<SelectedFile>,
        jobs: usize,
    ) -> (Vec<LoadResult>, LoadStatistics) {
        use futures::stream::{self, StreamExt};

        let start = Instant::now();
        let reader = *self;

        let results: Vec<LoadResult> = stream::iter(files)
            .map(|file| async move { reader.load_selected(file).await })
            .buffered(jobs.max(1))
            .collect()
            .await;

        let stats = LoadStatistics::from_results(&results, start.elapsed());
        tracing::debug!(
            loaded = stats.success_count,
            failed = stats.failure_count,
            pages = stats.total_pages,
            size = %stats.format_total_size(),
            "batch load finished"
        );

        (results, stats)
    }
}

impl Default for PdfReader {
    fn default() -> Self {
        Self::new()
    }
}

fn parse(path: PathBuf, bytes: &[u8], require_pages: bool) -> Result<LoadedPdf> {
    let start = Instant::now();

    let document = Document::load_mem(bytes).map_err(|e| {
        let message = e.to_string();
        let lower = message.to_lowercase();
        if lower.contains("encrypt") || lower.contains("password") || lower.contains("decrypt") {
            Error::encrypted_pdf(path.clone())
        } else {
            Error::failed_to_load_pdf(path.clone(), message)
        }
    })?;

    let page_count = document.get_pages().len();
    if require_pages && page_count == 0 {
        return Err(Error::corrupted_pdf(path, "PDF has no pages"));
    }

    tracing::trace!(path = %path.display(), page_count, "parsed PDF");

    Ok(LoadedPdf {
        document,
        path,
        page_count,
        load_time: start.elapsed(),
        file_size: bytes.len() as u64,
    })
}
