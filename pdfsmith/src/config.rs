//! Configuration for pdfsmith operations.
//!
//! CLI arguments are turned into a [`Config`]: the input files, the output
//! location, one [`Operation`] with its settings record, and the shared
//! output flags. [`Config::validate`] rejects combinations that cannot work
//! before any file is touched.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::range::PageRange;

/// Implements `FromStr` (case-insensitive) and `Display` for a settings enum.
macro_rules! setting_enum {
    ($ty:ident, $setting:literal, $allowed:literal, { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            /// Name of the value as accepted on the command line.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)+
                }
            }
        }

        impl FromStr for $ty {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                match s.trim().to_lowercase().as_str() {
                    $($name => Ok(Self::$variant),)+
                    _ => Err(Error::InvalidSetting {
                        setting: $setting,
                        value: s.to_string(),
                        allowed: $allowed,
                    }),
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

/// Page orientation for image pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Tall page.
    #[default]
    Portrait,
    /// Wide page.
    Landscape,
    /// Portrait or landscape, whichever matches the image.
    Auto,
}

setting_enum!(Orientation, "orientation", "portrait, landscape, auto", {
    Portrait => "portrait",
    Landscape => "landscape",
    Auto => "auto",
});

/// How an image is sized onto its page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PageFit {
    /// A4 page, image scaled up or down to fill the printable area.
    #[default]
    Fit,
    /// A4 page, image scaled down when too large, natural size otherwise.
    Shrink,
    /// Page sized to the image itself.
    Original,
}

setting_enum!(PageFit, "page fit", "fit, shrink, original", {
    Fit => "fit",
    Shrink => "shrink",
    Original => "original",
});

/// Blank border around an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Margin {
    /// No border.
    None,
    /// 10 mm border.
    #[default]
    Small,
    /// 20 mm border.
    Large,
}

setting_enum!(Margin, "margin", "none, small, large", {
    None => "none",
    Small => "small",
    Large => "large",
});

impl Margin {
    /// Border width in millimetres.
    pub fn millimetres(&self) -> f64 {
        match self {
            Self::None => 0.0,
            Self::Small => 10.0,
            Self::Large => 20.0,
        }
    }
}

/// Settings for image to PDF conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ImageLayout {
    /// Page orientation.
    pub orientation: Orientation,
    /// Page fit mode.
    pub fit: PageFit,
    /// Border class.
    pub margin: Margin,
}

/// How hard the compressor tries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionLevel {
    /// Compress uncompressed streams only.
    Low,
    /// Also drop unused objects and embedded XMP metadata.
    #[default]
    Medium,
    /// Also re-encode large or uncompressed images as JPEG.
    High,
}

setting_enum!(CompressionLevel, "compression level", "low, medium, high", {
    Low => "low",
    Medium => "medium",
    High => "high",
});

/// How selected pages are distributed over output files when splitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitMode {
    /// One file per run of consecutive pages.
    #[default]
    Ranges,
    /// One file per page.
    Pages,
    /// All selected pages in one file.
    Extract,
}

setting_enum!(SplitMode, "split mode", "ranges, pages, extract", {
    Ranges => "ranges",
    Pages => "pages",
    Extract => "extract",
});

/// Settings for splitting.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SplitOptions {
    /// Pages to keep; `None` selects every page.
    pub pages: Option<PageRange>,
    /// How to distribute the pages.
    pub mode: SplitMode,
    /// File name prefix for the parts; defaults to the input's stem.
    pub prefix: Option<String>,
}

/// Settings for merging.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MergeOptions {
    /// New order of the inputs as 1-based positions.
    pub order: Option<Vec<usize>>,
    /// Add one outline entry per input.
    pub bookmarks: bool,
    /// Compression applied to the merged document.
    pub compression: CompressionLevel,
}

/// The tool to run and its settings record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Concatenate PDFs.
    Merge(MergeOptions),
    /// Split or extract pages of one PDF.
    Split(SplitOptions),
    /// Turn images into a PDF, one page per image.
    Images(ImageLayout),
    /// Shrink one PDF.
    Compress(CompressionLevel),
    /// Report page counts and basic facts.
    Info,
}

impl Operation {
    /// Short name used in messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Merge(_) => "Merge",
            Self::Split(_) => "Split",
            Self::Images(_) => "Image conversion",
            Self::Compress(_) => "Compression",
            Self::Info => "Inspection",
        }
    }

    /// Whether the operation takes exactly one input.
    pub fn single_input(&self) -> bool {
        matches!(self, Self::Split(_) | Self::Compress(_))
    }
}

/// Output file overwrite behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverwriteMode {
    /// Prompt the user before overwriting (default).
    #[default]
    Prompt,
    /// Always overwrite without prompting.
    Force,
    /// Never overwrite, error if file exists.
    NoClobber,
}

/// Complete configuration for one pdfsmith run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Input files, in user order.
    pub inputs: Vec<PathBuf>,

    /// Output file, or output directory for [`Operation::Split`].
    /// Unused by [`Operation::Info`].
    pub output: PathBuf,

    /// What to do.
    pub operation: Operation,

    /// Dry run mode - validate without creating output.
    pub dry_run: bool,

    /// Verbose output mode.
    pub verbose: bool,

    /// Quiet mode - suppress non-error output.
    pub quiet: bool,

    /// Print a JSON report on stdout.
    pub json: bool,

    /// File overwrite behavior.
    pub overwrite_mode: OverwriteMode,

    /// Number of concurrent file loads (None = auto-detect).
    pub jobs: Option<usize>,
}

impl Config {
    /// Create a configuration with default flags.
    pub fn new(inputs: Vec<PathBuf>, output: PathBuf, operation: Operation) -> Self {
        Self {
            inputs,
            output,
            operation,
            dry_run: false,
            verbose: false,
            quiet: false,
            json: false,
            overwrite_mode: OverwriteMode::default(),
            jobs: None,
        }
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if:
    /// - No input files are specified
    /// - A single-input operation got several inputs
    /// - Verbose and quiet modes are both enabled
    /// - Jobs count is zero
    /// - The output path is also an input
    /// - A merge order is not a permutation of the inputs
    /// - A split prefix is not a plain file name
    pub fn validate(&self) -> Result<()> {
        if self.inputs.is_empty() {
            return Err(Error::invalid_config("No input files specified"));
        }

        if self.operation.single_input() && self.inputs.len() > 1 {
            return Err(Error::invalid_config(format!(
                "{} takes exactly one input file, got {}",
                self.operation.name(),
                self.inputs.len()
            )));
        }

        if self.verbose && self.quiet {
            return Err(Error::invalid_config("Cannot use both --verbose and --quiet"));
        }

        if self.jobs == Some(0) {
            return Err(Error::invalid_config("Number of jobs must be at least 1"));
        }

        if self.operation != Operation::Info && self.inputs.contains(&self.output) {
            return Err(Error::invalid_config(format!(
                "Output file cannot be the same as an input file: {}",
                self.output.display()
            )));
        }

        if let Operation::Merge(MergeOptions {
            order: Some(order), ..
        }) = &self.operation
        {
            validate_order(order, self.inputs.len())?;
        }

        if let Operation::Split(SplitOptions {
            prefix: Some(prefix),
            ..
        }) = &self.operation
        {
            validate_prefix(prefix)?;
        }

        Ok(())
    }

    /// Get the effective number of concurrent loads.
    pub fn effective_jobs(&self) -> usize {
        self.jobs.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }
}

/// Check that a split prefix names files inside the output directory.
pub fn validate_prefix(prefix: &str) -> Result<()> {
    if prefix.is_empty() || prefix == "." || prefix == ".." {
        return Err(Error::invalid_config(format!(
            "Invalid file name prefix: {prefix:?}"
        )));
    }
    if prefix.contains(['/', '\\']) {
        return Err(Error::invalid_config(format!(
            "File name prefix cannot contain path separators: {prefix}"
        )));
    }

    Ok(())
}

/// Check that `order` is a permutation of `1..=len`.
pub fn validate_order(order: &[usize], len: usize) -> Result<()> {
    if order.len() != len {
        return Err(Error::invalid_config(format!(
            "Order lists {} position(s) but there are {} input file(s)",
            order.len(),
            len
        )));
    }

    let mut seen = vec![false; len];
    for &position in order {
        if position == 0 || position > len {
            return Err(Error::invalid_config(format!(
                "Order position {position} is out of range 1-{len}"
            )));
        }
        if std::mem::replace(&mut seen[position - 1], true) {
            return Err(Error::invalid_config(format!(
                "Order position {position} appears more than once"
            )));
        }
    }

    Ok(())
}
