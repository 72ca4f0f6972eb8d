//! Reading and writing PDF files.
//!
//! # Examples
//!
//! ```no_run
//! use pdfsmith::io::{load_pdf, save_pdf};
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let doc = load_pdf(Path::new("input.pdf")).await?;
//! save_pdf(doc, Path::new("copy.pdf")).await?;
//! # Ok(())
//! # }
//! ```

pub mod reader;
pub mod writer;

pub use reader::{LoadResult, LoadStatistics, LoadedPdf, PdfReader};
pub use writer::{PdfWriter, WriteOptions, WriteStatistics};

use crate::error::Result;
use lopdf::Document;
use std::path::Path;

/// Load a PDF document from a file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid PDF.
pub async fn load_pdf(path: &Path) -> Result<Document> {
    let loaded = PdfReader::new().load(path).await?;
    Ok(loaded.document)
}

/// Save a PDF document to a file with the default write options.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub async fn save_pdf(doc: Document, path: &Path) -> Result<WriteStatistics> {
    PdfWriter::new().save_with_stats(doc, path).await
}
