//! PDF serialization and output files.
//!
//! Documents are serialized on the blocking pool. Output files are written
//! to a sibling temp file and renamed into place, so a failed write never
//! leaves a truncated document behind.
//!
//! # Examples
//!
//! ```no_run
//! use pdfsmith::io::writer::PdfWriter;
//! use lopdf::Document;
//! use std::path::Path;
//!
//! # async fn example(doc: Document) -> Result<(), Box<dyn std::error::Error>> {
//! let writer = PdfWriter::new();
//! let stats = writer.save_with_stats(doc, Path::new("output.pdf")).await?;
//! println!("Wrote {}", stats.format_file_size());
//! # Ok(())
//! # }
//! ```

use lopdf::Document;
use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::task;

use crate::error::{Error, Result};
use crate::utils::format_file_size;

/// Options for serializing PDF documents.
#[derive(Debug, Clone, Copy)]
pub struct WriteOptions {
    /// Write to a temp file and rename it into place.
    pub atomic: bool,

    /// Flate-compress uncompressed streams before writing.
    pub compress: bool,

    /// Renumber objects densely before writing.
    pub renumber: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            atomic: true,
            compress: true,
            renumber: true,
        }
    }
}

/// Statistics about a write operation.
#[derive(Debug, Clone)]
pub struct WriteStatistics {
    /// Time taken to serialize and write the file.
    pub write_time: Duration,

    /// Size of the written file in bytes.
    pub file_size: u64,

    /// Path where the file was written.
    pub output_path: PathBuf,
}

impl WriteStatistics {
    /// Format file size as human-readable string.
    pub fn format_file_size(&self) -> String {
        format_file_size(self.file_size)
    }
}

/// PDF writer with configurable behavior.
#[derive(Debug, Clone, Default)]
pub struct PdfWriter {
    options: WriteOptions,
}

impl PdfWriter {
    /// Create a new PDF writer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer with custom options.
    pub fn with_options(options: WriteOptions) -> Self {
        Self { options }
    }

    /// Create a writer that leaves streams and object numbers untouched.
    pub fn verbatim() -> Self {
        Self {
            options: WriteOptions {
                compress: false,
                renumber: false,
                ..Default::default()
            },
        }
    }

    /// Serialize a document to bytes without touching the filesystem.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OperationFailed`] if the document cannot be
    /// serialized.
    pub async fn to_bytes(&self, doc: Document) -> Result<Vec<u8>> {
        let options = self.options;
        task::spawn_blocking(move || render(doc, options))
            .await
            .map_err(|e| Error::operation_failed("Write", format!("task failed: {e}")))?
    }

    /// Serialize a document and write it to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the output cannot be created or written.
    pub async fn save_with_stats(&self, doc: Document, path: &Path) -> Result<WriteStatistics> {
        let start = Instant::now();
        let bytes = self.to_bytes(doc).await?;
        let mut stats = self.write_bytes(bytes, path).await?;
        stats.write_time = start.elapsed();
        Ok(stats)
    }

    /// Write already-serialized bytes to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the output cannot be created or written.
    pub async fn write_bytes(&self, bytes: Vec<u8>, path: &Path) -> Result<WriteStatistics> {
        let path_buf = path.to_path_buf();
        let atomic = self.options.atomic;

        task::spawn_blocking(move || {
            let start = Instant::now();

            let write_path = if atomic {
                temp_path(&path_buf)
            } else {
                path_buf.clone()
            };

            let file = std::fs::File::create(&write_path).map_err(|e| {
                Error::FailedToCreateOutput {
                    path: write_path.clone(),
                    source: e,
                }
            })?;

            let mut writer = std::io::BufWriter::new(file);
            let written = writer
                .write_all(&bytes)
                .and_then(|()| writer.flush())
                .map_err(|e| Error::FailedToWrite {
                    path: write_path.clone(),
                    source: e,
                });
            drop(writer);

            if let Err(e) = written {
                if atomic {
                    let _ = std::fs::remove_file(&write_path);
                }
                return Err(e);
            }

            if atomic {
                std::fs::rename(&write_path, &path_buf).map_err(|e| {
                    let _ = std::fs::remove_file(&write_path);
                    Error::FailedToWrite {
                        path: path_buf.clone(),
                        source: e,
                    }
                })?;
            }

            tracing::debug!(path = %path_buf.display(), size = bytes.len(), "wrote output");

            Ok(WriteStatistics {
                write_time: start.elapsed(),
                file_size: bytes.len() as u64,
                output_path: path_buf,
            })
        })
        .await
        .map_err(|e| Error::operation_failed("Write", format!("task failed: {e}")))?
    }

    /// Check that an output file could be created at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the parent directory is missing or
    /// read-only.
    pub async fn can_write(&self, path: &Path) -> Result<()> {
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => return Ok(()),
        };

        let metadata = tokio::fs::metadata(parent).await.map_err(|_| {
            Error::invalid_config(format!(
                "Output directory does not exist: {}",
                parent.display()
            ))
        })?;

        if !metadata.is_dir() {
            return Err(Error::invalid_config(format!(
                "Output directory is not a directory: {}",
                parent.display()
            )));
        }

        if metadata.permissions().readonly() {
            return Err(Error::invalid_config(format!(
                "Output directory is not writable: {}",
                parent.display()
            )));
        }

        Ok(())
    }

    /// Check if output file exists.
    pub async fn exists(&self, path: &Path) -> bool {
        tokio::fs::metadata(path).await.is_ok()
    }
}

fn render(mut doc: Document, options: WriteOptions) -> Result<Vec<u8>> {
    if options.compress {
        doc.compress();
    }
    if options.renumber {
        doc.renumber_objects();
    }

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| Error::operation_failed("Write", e.to_string()))?;
    Ok(bytes)
}

/// `out.pdf` is staged as `.out.pdf.tmp` next to it.
fn temp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(path.file_name().unwrap_or_else(|| path.as_os_str()));
    name.push(".tmp");
    path.with_file_name(name)
}
