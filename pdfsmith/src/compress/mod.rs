//! PDF size reduction.
//!
//! Each [`CompressionLevel`] adds passes on top of the previous one:
//!
//! - **Low**: Flate-compress every stream that has no filter yet.
//! - **Medium**: also drop zero-length streams, the catalog's XMP metadata
//!   stream and every unreferenced object, then renumber densely.
//! - **High**: also re-encode simple images as JPEG (see [`images`]).
//!
//! The [`Compressor`] never makes a file bigger: if the rewritten document
//! is not smaller than the input, the input bytes are kept.
//!
//! # Examples
//!
//! ```no_run
//! use pdfsmith::compress::Compressor;
//! use pdfsmith::config::CompressionLevel;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let result = Compressor::new()
//!     .compress_file(Path::new("scan.pdf"), CompressionLevel::High)
//!     .await?;
//! println!("saved {:.1}%", result.report.saved_percent);
//! # Ok(())
//! # }
//! ```

pub mod images;

pub use images::{ImagePassStatistics, ImageSettings};

use lopdf::Document;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::config::{CompressionLevel, Config};
use crate::error::{Error, Result};
use crate::io::{PdfReader, PdfWriter};
use crate::selection::{FileKind, FileSelection};
use crate::utils::format_file_size;

/// What the structural passes did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OptimizeStatistics {
    /// Objects before optimizing.
    pub objects_before: usize,
    /// Objects after optimizing.
    pub objects_after: usize,
    /// Image pass results (`High` only).
    pub images: ImagePassStatistics,
}

/// Apply the passes of `level` to `doc` in place.
pub fn optimize(doc: &mut Document, level: CompressionLevel) -> OptimizeStatistics {
    optimize_with(doc, level, &ImageSettings::default())
}

/// [`optimize`] with explicit image settings.
pub fn optimize_with(
    doc: &mut Document,
    level: CompressionLevel,
    image_settings: &ImageSettings,
) -> OptimizeStatistics {
    let mut stats = OptimizeStatistics {
        objects_before: doc.objects.len(),
        ..Default::default()
    };

    if level == CompressionLevel::High {
        stats.images = images::recompress_images(doc, image_settings);
    }

    if level != CompressionLevel::Low {
        doc.delete_zero_length_streams();
        if let Ok(catalog) = doc.catalog_mut() {
            catalog.remove(b"Metadata");
        }
        doc.prune_objects();
    }

    doc.compress();

    if level != CompressionLevel::Low {
        doc.renumber_objects();
    }

    stats.objects_after = doc.objects.len();
    tracing::debug!(
        %level,
        before = stats.objects_before,
        after = stats.objects_after,
        images = stats.images.images_recompressed,
        "optimized document"
    );

    stats
}

/// Outcome of compressing one file.
#[derive(Debug, Clone, Serialize)]
pub struct CompressionReport {
    /// Input path.
    pub input: PathBuf,
    /// Level applied.
    pub level: CompressionLevel,
    /// Input size in bytes.
    pub original_size: u64,
    /// Output size in bytes.
    pub output_size: u64,
    /// Bytes saved.
    pub saved_bytes: u64,
    /// Bytes saved relative to the input, in percent.
    pub saved_percent: f64,
    /// Whether the input bytes were kept because rewriting did not help.
    pub kept_original: bool,
    /// Pages in the document.
    pub page_count: usize,
    /// Structural pass results.
    pub passes: OptimizeStatistics,
}

impl CompressionReport {
    /// One-line human summary.
    pub fn summary(&self) -> String {
        if self.kept_original {
            format!(
                "{} is already compact, kept as is ({})",
                self.input.display(),
                format_file_size(self.original_size)
            )
        } else {
            format!(
                "{} -> {} (saved {:.1}%)",
                format_file_size(self.original_size),
                format_file_size(self.output_size),
                self.saved_percent
            )
        }
    }
}

/// Compressed bytes and the report describing them.
#[derive(Debug, Clone)]
pub struct CompressResult {
    /// Bytes to write out.
    pub bytes: Vec<u8>,
    /// What happened.
    pub report: CompressionReport,
}

/// Shrinks PDF files.
#[derive(Debug, Clone)]
pub struct Compressor {
    reader: PdfReader,
    writer: PdfWriter,
    image_settings: ImageSettings,
}

impl Default for Compressor {
    fn default() -> Self {
        Self::with_image_settings(ImageSettings::default())
    }
}

impl Compressor {
    /// Create a compressor with default image settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a compressor with custom image settings for `High`.
    pub fn with_image_settings(image_settings: ImageSettings) -> Self {
        Self {
            reader: PdfReader::new(),
            writer: PdfWriter::verbatim(),
            image_settings,
        }
    }

    /// Compress the single input of `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is missing, not a PDF, or cannot be
    /// parsed or serialized.
    pub async fn compress(&self, config: &Config, level: CompressionLevel) -> Result<CompressResult> {
        let (selection, _) = FileSelection::collect(&config.inputs, FileKind::DOCUMENTS).await?;
        let file = selection
            .into_files()
            .into_iter()
            .next()
            .ok_or(Error::NoInputs)?;

        self.compress_bytes(file.path, file.bytes, level).await
    }

    /// Read and compress one file.
    ///
    /// # Errors
    ///
    /// Same as [`Compressor::compress`].
    pub async fn compress_file(&self, path: &Path, level: CompressionLevel) -> Result<CompressResult> {
        self.compress(
            &Config::new(
                vec![path.to_path_buf()],
                PathBuf::new(),
                crate::config::Operation::Compress(level),
            ),
            level,
        )
        .await
    }

    /// Compress PDF bytes read elsewhere.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes cannot be parsed or the result cannot
    /// be serialized.
    pub async fn compress_bytes(
        &self,
        path: PathBuf,
        original: Vec<u8>,
        level: CompressionLevel,
    ) -> Result<CompressResult> {
        let loaded = self
            .reader
            .load_bytes(path.clone(), original.clone())
            .await?;
        let page_count = loaded.page_count;

        let mut document = loaded.document;
        let settings = self.image_settings;
        let (document, passes) = tokio::task::spawn_blocking(move || {
            let passes = optimize_with(&mut document, level, &settings);
            (document, passes)
        })
        .await
        .map_err(|e| Error::operation_failed("Compression", format!("task failed: {e}")))?;

        let rewritten = self.writer.to_bytes(document).await?;

        let original_size = original.len() as u64;
        let kept_original = rewritten.len() >= original.len();
        let bytes = if kept_original { original } else { rewritten };
        let output_size = bytes.len() as u64;
        let saved_bytes = original_size - output_size;
        let saved_percent = if original_size == 0 {
            0.0
        } else {
            saved_bytes as f64 * 100.0 / original_size as f64
        };

        if kept_original {
            tracing::info!(path = %path.display(), "rewritten document was not smaller, keeping input");
        }

        Ok(CompressResult {
            bytes,
            report: CompressionReport {
                input: path,
                level,
                original_size,
                output_size,
                saved_bytes,
                saved_percent,
                kept_original,
                page_count,
                passes,
            },
        })
    }
}
