//! Utilities for input path expansion and size formatting.

use crate::{Error, Result};
use std::path::PathBuf;

/// Expand input arguments into file paths, keeping argument order.
///
/// Arguments containing glob metacharacters (`*`, `?`, `[`) are expanded
/// and their matches sorted; a pattern that matches nothing is an error.
/// Other arguments are kept verbatim, so a missing file is reported later
/// with its own path.
///
/// Accepts anything iterable with items that convert to `&str`, e.g.:
/// `&[&str]`, `Vec<String>`, or `Vec<&str>`.
///
/// # Errors
///
/// Returns [`Error::InvalidConfig`] for malformed patterns or patterns with
/// no matches.
pub fn expand_inputs<T>(arguments: T) -> Result<Vec<PathBuf>>
where
    T: IntoIterator,
    T::Item: AsRef<str>,
{
    let mut resolved_paths = Vec::new();

    for argument in arguments {
        let argument = argument.as_ref();
        if is_pattern(argument) {
            let paths = collect_paths_for_pattern(argument)?;
            if paths.is_empty() {
                return Err(Error::invalid_config(format!(
                    "Pattern matched no files: {argument}"
                )));
            }
            resolved_paths.extend(paths);
        } else {
            resolved_paths.push(PathBuf::from(argument));
        }
    }

    Ok(resolved_paths)
}

fn is_pattern(argument: &str) -> bool {
    argument.contains(['*', '?', '['])
}

/// Expand a single glob pattern into file paths.
///
/// Pattern examples:
/// - `"scans/*.jpg"`
/// - `"./docs/**/*.pdf"`
fn collect_paths_for_pattern(pattern: &str) -> Result<Vec<PathBuf>> {
    let entries = glob::glob(pattern)
        .map_err(|err| Error::invalid_config(format!("Invalid pattern '{pattern}': {err}")))?;

    let mut paths = Vec::new();
    for entry in entries {
        let path = entry.map_err(|err| Error::FileNotAccessible {
            path: err.path().to_path_buf(),
            source: std::io::Error::new(err.error().kind(), err.error().to_string()),
        })?;
        if path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();

    Ok(paths)
}

/// Format a byte count for humans: `500 bytes`, `1.50 KB`, `2.00 MB`.
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{size} bytes")
    }
}
