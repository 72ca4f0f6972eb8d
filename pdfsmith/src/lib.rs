//! pdfsmith - small PDF utilities built on `lopdf`.
//!
//! Four tools share one file-selection and error model:
//!
//! - [`images`]: one PDF page per PNG or JPEG image
//! - [`merge`]: concatenate PDFs in a chosen order, with optional bookmarks
//! - [`split`]: split a PDF by page ranges, burst it, or extract pages
//! - [`compress`]: shrink a PDF at one of three levels
//!
//! plus [`info`] for page counts and basic document facts.
//!
//! # Examples
//!
//! ## Basic Merge
//!
//! ```no_run
//! use pdfsmith::config::{Config, MergeOptions, Operation};
//! use pdfsmith::io::PdfWriter;
//! use pdfsmith::merge;
//! use std::path::PathBuf;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::new(
//!     vec![PathBuf::from("a.pdf"), PathBuf::from("b.pdf")],
//!     PathBuf::from("merged.pdf"),
//!     Operation::Merge(MergeOptions::default()),
//! );
//! config.validate()?;
//!
//! let result = merge::merge_pdfs(&config).await?;
//! PdfWriter::new()
//!     .save_with_stats(result.document, &config.output)
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Page ranges
//!
//! ```
//! use pdfsmith::range::PageRange;
//!
//! let pages = PageRange::parse("1-3, 5").unwrap().resolve(6).unwrap();
//! assert_eq!(pages.to_vec(), vec![1, 2, 3, 5]);
//! assert!(PageRange::parse("3-1").is_err());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod compress;
pub mod config;
pub mod error;
pub mod images;
pub mod info;
pub mod io;
pub mod merge;
pub mod output;
pub mod range;
pub mod selection;
pub mod split;
pub mod utils;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use config::Config;
pub use error::{Error, ErrorCategory, Result};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
