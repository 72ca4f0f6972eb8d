//! Input file selection.
//!
//! A [`FileSelection`] is the ordered list of files a tool works on. Files are
//! sniffed when they are added: anything that is not one of the kinds the
//! tool accepts is left out and reported as a [`Rejection`] instead of
//! failing the whole selection. The order of the list is the order of the
//! output (pages of a merge, pages of an image conversion) and can be
//! rearranged with [`FileSelection::swap`] and [`FileSelection::reorder`].

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::validate_order;
use crate::error::{Error, Result};

/// Kinds of file the tools understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    /// PDF document.
    Pdf,
    /// PNG image.
    Png,
    /// JPEG image.
    Jpeg,
}

impl FileKind {
    /// Kinds accepted by the PDF tools.
    pub const DOCUMENTS: &'static [FileKind] = &[FileKind::Pdf];

    /// Kinds accepted by the image converter.
    pub const IMAGES: &'static [FileKind] = &[FileKind::Png, FileKind::Jpeg];

    /// Sniff the kind from the leading bytes, falling back to the extension.
    pub fn detect(path: &Path, bytes: &[u8]) -> Option<Self> {
        Self::from_magic(bytes).or_else(|| Self::from_extension(path))
    }

    /// Sniff the kind from the leading bytes.
    pub fn from_magic(bytes: &[u8]) -> Option<Self> {
        const PNG: &[u8] = b"\x89PNG\r\n\x1a\n";
        const JPEG: &[u8] = b"\xFF\xD8\xFF";

        if bytes.starts_with(PNG) {
            Some(Self::Png)
        } else if bytes.starts_with(JPEG) {
            Some(Self::Jpeg)
        } else if has_pdf_header(bytes) {
            Some(Self::Pdf)
        } else {
            None
        }
    }

    /// Guess the kind from the file extension.
    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "pdf" => Some(Self::Pdf),
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            _ => None,
        }
    }

    /// MIME type of the kind.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }

    /// Whether the kind is an image.
    pub fn is_image(&self) -> bool {
        matches!(self, Self::Png | Self::Jpeg)
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pdf => "PDF",
            Self::Png => "PNG",
            Self::Jpeg => "JPEG",
        })
    }
}

/// PDF headers may be preceded by junk; readers look in the first kilobyte.
fn has_pdf_header(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(1024)];
    head.windows(5).any(|w| w == b"%PDF-")
}

fn describe_kinds(kinds: &[FileKind]) -> String {
    kinds
        .iter()
        .map(|k| k.to_string())
        .collect::<Vec<_>>()
        .join(" or ")
}

/// Identifier of a file inside one selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct FileId(u64);

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A file held by a selection.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    /// Identifier, unique within the selection.
    pub id: FileId,
    /// Where the file came from.
    pub path: PathBuf,
    /// Raw contents.
    pub bytes: Vec<u8>,
    /// Detected kind.
    pub kind: FileKind,
}

impl SelectedFile {
    /// File name for messages and outline titles.
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// File name without extension.
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string())
    }

    /// Size of the contents in bytes.
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Notice for a file that was left out of a selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    /// The rejected file.
    pub path: PathBuf,
    /// Kind that was detected, if any.
    pub detected: Option<FileKind>,
    /// What the selection accepts.
    pub expected: String,
}

impl Rejection {
    /// Turn the notice into a validation error.
    pub fn into_error(self) -> Error {
        Error::UnsupportedFileType {
            path: self.path,
            expected: self.expected,
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.detected {
            Some(kind) => write!(
                f,
                "Skipped {}: {} file, expected {}",
                self.path.display(),
                kind,
                self.expected
            ),
            None => write!(
                f,
                "Skipped {}: unrecognized file type, expected {}",
                self.path.display(),
                self.expected
            ),
        }
    }
}

/// Ordered list of files accepted for one tool.
#[derive(Debug, Clone)]
pub struct FileSelection {
    accepted: &'static [FileKind],
    files: Vec<SelectedFile>,
    next_id: u64,
}

impl FileSelection {
    /// Create an empty selection accepting `accepted` kinds.
    pub fn new(accepted: &'static [FileKind]) -> Self {
        Self {
            accepted,
            files: Vec::new(),
            next_id: 1,
        }
    }

    /// Read `paths` from disk, in order, into a new selection.
    ///
    /// Files of the wrong kind are skipped and returned as rejections.
    ///
    /// # Errors
    ///
    /// Returns an error if a path does not exist, is not a regular file or
    /// cannot be read.
    pub async fn from_paths(
        paths: &[PathBuf],
        accepted: &'static [FileKind],
    ) -> Result<(Self, Vec<Rejection>)> {
        let mut selection = Self::new(accepted);
        let mut rejections = Vec::new();

        for path in paths {
            let bytes = read_input(path).await?;
            if let Err(rejection) = selection.add(path.clone(), bytes) {
                tracing::warn!(path = %path.display(), "rejected input: {rejection}");
                rejections.push(rejection);
            }
        }

        Ok((selection, rejections))
    }

    /// Like [`FileSelection::from_paths`], but a selection left empty by
    /// filtering is an error.
    ///
    /// # Errors
    ///
    /// Besides the I/O errors of `from_paths`, returns the rejection itself
    /// when the only input was rejected, or [`Error::NoInputs`].
    pub async fn collect(
        paths: &[PathBuf],
        accepted: &'static [FileKind],
    ) -> Result<(Self, Vec<Rejection>)> {
        let (selection, mut rejections) = Self::from_paths(paths, accepted).await?;

        if selection.is_empty() {
            return Err(if rejections.len() == 1 {
                rejections.remove(0).into_error()
            } else {
                Error::NoInputs
            });
        }

        Ok((selection, rejections))
    }

    /// Add a file at the end of the selection.
    ///
    /// Returns the new file's id, or the rejection notice if its kind is not
    /// accepted.
    pub fn add(&mut self, path: PathBuf, bytes: Vec<u8>) -> std::result::Result<FileId, Rejection> {
        let detected = FileKind::detect(&path, &bytes);

        match detected {
            Some(kind) if self.accepted.contains(&kind) => {
                let id = FileId(self.next_id);
                self.next_id += 1;
                tracing::debug!(%id, path = %path.display(), %kind, "selected input");
                self.files.push(SelectedFile {
                    id,
                    path,
                    bytes,
                    kind,
                });
                Ok(id)
            }
            _ => Err(Rejection {
                path,
                detected,
                expected: describe_kinds(self.accepted),
            }),
        }
    }

    /// Remove a file, releasing its contents.
    pub fn remove(&mut self, id: FileId) -> Option<SelectedFile> {
        let index = self.files.iter().position(|f| f.id == id)?;
        Some(self.files.remove(index))
    }

    /// Swap the files at two positions (0-based).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if either position is out of range.
    pub fn swap(&mut self, a: usize, b: usize) -> Result<()> {
        let len = self.files.len();
        if a >= len || b >= len {
            return Err(Error::invalid_config(format!(
                "Cannot swap positions {a} and {b} in a selection of {len} file(s)"
            )));
        }
        self.files.swap(a, b);
        Ok(())
    }

    /// Rearrange the files. `order[i]` is the current 1-based position of the
    /// file that should end up at position `i`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `order` is not a permutation of
    /// `1..=len`.
    pub fn reorder(&mut self, order: &[usize]) -> Result<()> {
        validate_order(order, self.files.len())?;

        let mut slots: Vec<Option<SelectedFile>> = self.files.drain(..).map(Some).collect();
        self.files = order
            .iter()
            .filter_map(|&position| slots[position - 1].take())
            .collect();

        Ok(())
    }

    /// Look up a file by id.
    pub fn get(&self, id: FileId) -> Option<&SelectedFile> {
        self.files.iter().find(|f| f.id == id)
    }

    /// Files in order.
    pub fn files(&self) -> &[SelectedFile] {
        &self.files
    }

    /// Take the files out, in order.
    pub fn into_files(self) -> Vec<SelectedFile> {
        self.files
    }

    /// Number of files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the selection is empty.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Total size of all contents in bytes.
    pub fn total_size(&self) -> u64 {
        self.files.iter().map(SelectedFile::size).sum()
    }
}

async fn read_input(path: &Path) -> Result<Vec<u8>> {
    let metadata = tokio::fs::metadata(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::file_not_found(path.to_path_buf())
        } else {
            Error::FileNotAccessible {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;

    if !metadata.is_file() {
        return Err(Error::NotAFile {
            path: path.to_path_buf(),
        });
    }

    tokio::fs::read(path)
        .await
        .map_err(|e| Error::FileNotAccessible {
            path: path.to_path_buf(),
            source: e,
        })
}
