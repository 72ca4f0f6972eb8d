//! PDF merging and page tree operations.
//!
//! This module provides:
//! - Document concatenation in selection order
//! - Page subset extraction (used by [`crate::split`])
//! - One outline entry per merged input
//!
//! # Examples
//!
//! ```no_run
//! use pdfsmith::merge::merge_pdfs;
//! use pdfsmith::config::{Config, MergeOptions, Operation};
//! use std::path::PathBuf;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::new(
//!     vec![PathBuf::from("a.pdf"), PathBuf::from("b.pdf")],
//!     PathBuf::from("merged.pdf"),
//!     Operation::Merge(MergeOptions {
//!         bookmarks: true,
//!         ..MergeOptions::default()
//!     }),
//! );
//!
//! let result = merge_pdfs(&config).await?;
//! println!("Merged {} pages", result.statistics.total_pages);
//! # Ok(())
//! # }
//! ```

pub mod bookmarks;
pub mod merger;
pub mod pages;

pub use bookmarks::{BookmarkManager, OutlineEntry};
pub use merger::{MergeResult, MergeStatistics, MergedSource, Merger, merge_documents};
pub use pages::PageExtractor;

use crate::config::{Config, Operation};
use crate::error::{Error, Result};

/// Merge the inputs of a merge configuration.
///
/// # Errors
///
/// Returns [`Error::InvalidConfig`] if `config` does not describe a merge,
/// otherwise whatever [`Merger::merge`] returns.
pub async fn merge_pdfs(config: &Config) -> Result<MergeResult> {
    let Operation::Merge(options) = &config.operation else {
        return Err(Error::invalid_config(format!(
            "{} is not a merge",
            config.operation.name()
        )));
    };

    Merger::new().merge(config, options).await
}
