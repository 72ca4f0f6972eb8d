//! Error types for pdfsmith.
//!
//! Every failure surfaces through [`Error`]. Callers only ever need to tell
//! two situations apart, which [`Error::category`] reports:
//!
//! - **Validation**: the request itself is wrong (unsupported file type,
//!   malformed page range, page out of bounds, bad setting). The message is
//!   descriptive and meant to be shown as-is.
//! - **Failure**: the document library or the filesystem rejected an
//!   otherwise valid request. The user is told the operation failed and the
//!   cause is logged.

use serde::Serialize;
use std::io;
use std::path::PathBuf;

/// Result type alias for pdfsmith operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The two user-visible error classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    /// The input or settings were rejected before any work was done.
    Validation,
    /// The operation itself failed.
    Failure,
}

/// Main error type for pdfsmith operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Input file was not found.
    #[error("File not found: {}", .path.display())]
    FileNotFound {
        /// Path to the file that was not found.
        path: PathBuf,
    },

    /// Input file exists but could not be read.
    #[error("Cannot access file: {}\n  Reason: {source}", .path.display())]
    FileNotAccessible {
        /// Path to the inaccessible file.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Input path is not a regular file.
    #[error("Not a file: {}", .path.display())]
    NotAFile {
        /// Path that is not a file.
        path: PathBuf,
    },

    /// Input file is not one of the kinds the operation accepts.
    #[error("Unsupported file type: {}\n  Expected: {expected}", .path.display())]
    UnsupportedFileType {
        /// Path to the rejected file.
        path: PathBuf,
        /// Human-readable list of accepted kinds.
        expected: String,
    },

    /// Nothing left to process after filtering the inputs.
    #[error("No input files to process")]
    NoInputs,

    /// The PDF library could not parse the file.
    #[error("Failed to load PDF: {}\n  Reason: {reason}", .path.display())]
    FailedToLoadPdf {
        /// Path to the PDF file.
        path: PathBuf,
        /// Reason for the failure.
        reason: String,
    },

    /// PDF file is encrypted and cannot be processed.
    #[error(
        "PDF is encrypted and cannot be processed: {}\n  \
         Hint: Decrypt the PDF first using 'qpdf --decrypt' or similar tools",
        .path.display()
    )]
    EncryptedPdf {
        /// Path to the encrypted PDF.
        path: PathBuf,
    },

    /// PDF parsed but is structurally unusable.
    #[error("Corrupted or invalid PDF: {}\n  Details: {details}", .path.display())]
    CorruptedPdf {
        /// Path to the corrupted PDF.
        path: PathBuf,
        /// Details about the corruption.
        details: String,
    },

    /// Image could not be decoded.
    #[error("Failed to decode image: {}\n  Reason: {reason}", .path.display())]
    FailedToDecodeImage {
        /// Path to the image.
        path: PathBuf,
        /// Reason for the failure.
        reason: String,
    },

    /// Page range string is malformed.
    #[error("Invalid page range '{range}': {reason}")]
    InvalidPageRange {
        /// The range as entered.
        range: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Page range names a page the document does not have.
    #[error(
        "Page {page} is out of range\n  \
         Document has {total_pages} page(s). Page numbers must be between 1 and {total_pages}"
    )]
    PageOutOfBounds {
        /// Offending page number (1-based).
        page: u32,
        /// Pages in the document.
        total_pages: usize,
    },

    /// A setting value is not one of its enumerated values.
    #[error("Invalid {setting}: {value}. Must be one of: {allowed}")]
    InvalidSetting {
        /// Setting name.
        setting: &'static str,
        /// Value that was given.
        value: String,
        /// Comma-separated allowed values.
        allowed: &'static str,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of what's wrong with the configuration.
        message: String,
    },

    /// Output file already exists and overwrite is not allowed.
    #[error(
        "Output file already exists: {}\n  \
         Use --force to overwrite or choose a different output path",
        .path.display()
    )]
    OutputExists {
        /// Path to the existing output file.
        path: PathBuf,
    },

    /// Failed to create output file.
    #[error("Failed to create output file: {}\n  Reason: {source}", .path.display())]
    FailedToCreateOutput {
        /// Path where output should be created.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Failed to write to output file.
    #[error("Failed to write to output file: {}\n  Reason: {source}", .path.display())]
    FailedToWrite {
        /// Path being written to.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// A document transformation failed.
    #[error("{operation} failed: {reason}")]
    OperationFailed {
        /// Which operation failed.
        operation: &'static str,
        /// Description of what went wrong.
        reason: String,
    },

    /// User cancelled the operation.
    #[error("Operation cancelled by user")]
    Cancelled,

    /// Generic I/O error.
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error.
        #[from]
        source: io::Error,
    },

    /// Error raised by the PDF object model.
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// Error raised while encoding or decoding pixels.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

impl Error {
    /// Create a FileNotFound error.
    pub fn file_not_found(path: PathBuf) -> Self {
        Self::FileNotFound { path }
    }

    /// Create a FailedToLoadPdf error.
    pub fn failed_to_load_pdf(path: PathBuf, reason: impl Into<String>) -> Self {
        Self::FailedToLoadPdf {
            path,
            reason: reason.into(),
        }
    }

    /// Create a CorruptedPdf error.
    pub fn corrupted_pdf(path: PathBuf, details: impl Into<String>) -> Self {
        Self::CorruptedPdf {
            path,
            details: details.into(),
        }
    }

    /// Create an EncryptedPdf error.
    pub fn encrypted_pdf(path: PathBuf) -> Self {
        Self::EncryptedPdf { path }
    }

    /// Create an InvalidPageRange error.
    pub fn invalid_page_range(range: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPageRange {
            range: range.into(),
            reason: reason.into(),
        }
    }

    /// Create an OutputExists error.
    pub fn output_exists(path: PathBuf) -> Self {
        Self::OutputExists { path }
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an OperationFailed error.
    pub fn operation_failed(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::OperationFailed {
            operation,
            reason: reason.into(),
        }
    }

    /// Which of the two user-visible classes this error belongs to.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::FileNotFound { .. }
            | Self::NotAFile { .. }
            | Self::UnsupportedFileType { .. }
            | Self::NoInputs
            | Self::InvalidPageRange { .. }
            | Self::PageOutOfBounds { .. }
            | Self::InvalidSetting { .. }
            | Self::InvalidConfig { .. }
            | Self::OutputExists { .. }
            | Self::Cancelled => ErrorCategory::Validation,
            _ => ErrorCategory::Failure,
        }
    }

    /// Get the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::FileNotFound { .. } => 2,
            Self::FileNotAccessible { .. } => 2,
            Self::NotAFile { .. } => 2,
            Self::UnsupportedFileType { .. } => 1,
            Self::NoInputs => 1,
            Self::FailedToLoadPdf { .. } => 3,
            Self::EncryptedPdf { .. } => 3,
            Self::CorruptedPdf { .. } => 3,
            Self::FailedToDecodeImage { .. } => 3,
            Self::InvalidPageRange { .. } => 1,
            Self::PageOutOfBounds { .. } => 1,
            Self::InvalidSetting { .. } => 1,
            Self::InvalidConfig { .. } => 1,
            Self::OutputExists { .. } => 4,
            Self::FailedToCreateOutput { .. } => 5,
            Self::FailedToWrite { .. } => 5,
            Self::Io { .. } => 5,
            Self::OperationFailed { .. } => 6,
            Self::Pdf(_) => 6,
            Self::Image(_) => 6,
            Self::Cancelled => 130, // Standard exit code for SIGINT
        }
    }
}
