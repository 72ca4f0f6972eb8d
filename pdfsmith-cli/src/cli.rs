//! CLI argument parsing for pdfsmith.
//!
//! This module defines the command-line interface structure using `clap`
//! and turns parsed arguments into a validated [`Config`]. It is also
//! compiled by `build.rs` to render the man page, so it only depends on
//! `clap`, `pdfsmith` and the standard library.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use pdfsmith::config::{
    CompressionLevel, Config, ImageLayout, MergeOptions, Operation, OverwriteMode, SplitOptions,
};
use pdfsmith::error::{Error, Result};
use pdfsmith::range::PageRange;
use pdfsmith::utils::expand_inputs;

/// Merge, split, compress and create PDF documents.
///
/// Every subcommand reads its inputs, transforms them in memory and writes
/// the result atomically. Inputs of the wrong type are skipped with a
/// warning.
#[derive(Parser, Debug)]
#[command(name = "pdfsmith")]
#[command(version)]
#[command(about = "Merge, split, compress and create PDF documents", long_about = None)]
#[command(author)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Flags shared by every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Tool to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Flags shared by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Verbose output - show details about each input and output
    ///
    /// Also raises the default log level to debug.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all non-error output
    ///
    /// Only errors and warnings will be printed. An existing output file is
    /// never overwritten without --force.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Dry run - read and process inputs without writing anything
    #[arg(short = 'n', long, global = true)]
    pub dry_run: bool,

    /// Overwrite existing output files without confirmation
    #[arg(short, long, global = true)]
    pub force: bool,

    /// Never overwrite existing output files
    ///
    /// If an output file already exists, exit with an error instead of
    /// prompting.
    #[arg(long, global = true, conflicts_with = "force")]
    pub no_clobber: bool,

    /// Print a JSON report on stdout instead of status lines
    #[arg(long, global = true)]
    pub json: bool,

    /// Number of PDFs parsed concurrently
    ///
    /// Default is the number of CPU cores. Use 1 for sequential loading.
    #[arg(short, long, global = true, value_name = "N")]
    pub jobs: Option<usize>,
}

/// The tools.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Concatenate PDFs into one document
    ///
    /// Examples:
    ///   pdfsmith merge a.pdf b.pdf -o both.pdf
    ///   pdfsmith merge 'chapters/*.pdf' --bookmarks -o book.pdf
    ///   pdfsmith merge a.pdf b.pdf c.pdf --order 3,1,2 -o out.pdf
    Merge(MergeArgs),

    /// Split a PDF by page ranges, into single pages, or extract pages
    ///
    /// Examples:
    ///   pdfsmith split report.pdf --pages 1-3,7 -d parts
    ///   pdfsmith split report.pdf --mode pages -d pages
    ///   pdfsmith split report.pdf --pages 2,4 --mode extract
    Split(SplitArgs),

    /// Turn PNG and JPEG images into a PDF, one page per image
    ///
    /// Examples:
    ///   pdfsmith images scan-*.jpg -o scans.pdf
    ///   pdfsmith images photo.png --fit original --margin none -o photo.pdf
    Images(ImagesArgs),

    /// Reduce the size of a PDF
    ///
    /// Examples:
    ///   pdfsmith compress big.pdf -o small.pdf
    ///   pdfsmith compress scan.pdf --level high -o scan-small.pdf
    Compress(CompressArgs),

    /// Show page count and basic facts about PDFs
    Info(InfoArgs),
}

/// Arguments of `merge`.
#[derive(Args, Debug, Clone)]
pub struct MergeArgs {
    /// Input PDF files or glob patterns, in merge order
    #[arg(required = true, value_name = "FILE")]
    pub inputs: Vec<String>,

    /// Output PDF file path
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// New order of the inputs as 1-based positions (e.g. "2,1,3")
    #[arg(long, value_name = "POSITIONS")]
    pub order: Option<String>,

    /// Add a bookmark at the first page of each input, titled with its name
    #[arg(short, long)]
    pub bookmarks: bool,

    /// Compression applied to the merged document: low, medium, high
    #[arg(short, long, value_name = "LEVEL", default_value = "low")]
    pub level: String,
}

/// Arguments of `split`.
#[derive(Args, Debug, Clone)]
pub struct SplitArgs {
    /// Input PDF file
    #[arg(value_name = "FILE")]
    pub input: String,

    /// Directory for the output files (created if missing)
    #[arg(short = 'd', long, value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Pages to use (e.g. "1-5,10,15-20"); all pages when omitted
    #[arg(short, long, value_name = "RANGE")]
    pub pages: Option<String>,

    /// How pages are distributed: ranges, pages, extract
    #[arg(short, long, value_name = "MODE", default_value = "ranges")]
    pub mode: String,

    /// File name prefix for the outputs (default: input file stem)
    #[arg(long, value_name = "NAME")]
    pub prefix: Option<String>,
}

/// Arguments of `images`.
#[derive(Args, Debug, Clone)]
pub struct ImagesArgs {
    /// Input PNG/JPEG files or glob patterns, in page order
    #[arg(required = true, value_name = "IMAGE")]
    pub inputs: Vec<String>,

    /// Output PDF file path
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// Page orientation: portrait, landscape, auto
    #[arg(long, value_name = "ORIENTATION", default_value = "portrait")]
    pub orientation: String,

    /// Page fit: fit, shrink, original
    #[arg(long, value_name = "FIT", default_value = "fit")]
    pub fit: String,

    /// Margin around each image: none, small, large
    #[arg(long, value_name = "MARGIN", default_value = "small")]
    pub margin: String,
}

/// Arguments of `compress`.
#[derive(Args, Debug, Clone)]
pub struct CompressArgs {
    /// Input PDF file
    #[arg(value_name = "FILE")]
    pub input: String,

    /// Output PDF file path
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// Compression level: low, medium, high
    #[arg(short, long, value_name = "LEVEL", default_value = "medium")]
    pub level: String,
}

/// Arguments of `info`.
#[derive(Args, Debug, Clone)]
pub struct InfoArgs {
    /// Input PDF files or glob patterns
    #[arg(required = true, value_name = "FILE")]
    pub inputs: Vec<String>,
}

impl Cli {
    /// Convert CLI arguments into a validated Config.
    ///
    /// # Errors
    ///
    /// Returns a validation error if:
    /// - A setting is not one of its allowed values
    /// - The page range or merge order is malformed
    /// - A glob pattern is malformed or matches nothing
    /// - Configuration validation fails
    pub fn to_config(&self) -> Result<Config> {
        let (inputs, output, operation) = match &self.command {
            Command::Merge(args) => {
                let options = MergeOptions {
                    order: args.order.as_deref().map(parse_order).transpose()?,
                    bookmarks: args.bookmarks,
                    compression: args.level.parse()?,
                };
                (
                    expand_inputs(&args.inputs)?,
                    args.output.clone(),
                    Operation::Merge(options),
                )
            }
            Command::Split(args) => {
                let options = SplitOptions {
                    pages: args.pages.as_deref().map(PageRange::parse).transpose()?,
                    mode: args.mode.parse()?,
                    prefix: args.prefix.clone(),
                };
                (
                    expand_inputs([&args.input])?,
                    args.output_dir.clone(),
                    Operation::Split(options),
                )
            }
            Command::Images(args) => {
                let layout = ImageLayout {
                    orientation: args.orientation.parse()?,
                    fit: args.fit.parse()?,
                    margin: args.margin.parse()?,
                };
                (
                    expand_inputs(&args.inputs)?,
                    args.output.clone(),
                    Operation::Images(layout),
                )
            }
            Command::Compress(args) => {
                let level: CompressionLevel = args.level.parse()?;
                (
                    expand_inputs([&args.input])?,
                    args.output.clone(),
                    Operation::Compress(level),
                )
            }
            Command::Info(args) => (expand_inputs(&args.inputs)?, PathBuf::new(), Operation::Info),
        };

        let global = &self.global;
        let overwrite_mode = if global.force {
            OverwriteMode::Force
        } else if global.no_clobber {
            OverwriteMode::NoClobber
        } else {
            OverwriteMode::Prompt
        };

        let config = Config {
            inputs,
            output,
            operation,
            dry_run: global.dry_run,
            verbose: global.verbose,
            quiet: global.quiet,
            json: global.json,
            overwrite_mode,
            jobs: global.jobs,
        };
        config.validate()?;

        Ok(config)
    }
}

/// Parse a merge order such as `"2, 1, 3"`.
///
/// # Errors
///
/// Returns [`Error::InvalidConfig`] for anything but comma-separated
/// positive integers.
pub fn parse_order(order: &str) -> Result<Vec<usize>> {
    order
        .split(',')
        .map(|token| {
            let token = token.trim();
            token.parse::<usize>().map_err(|_| {
                Error::invalid_config(format!("Invalid position '{token}' in order '{order}'"))
            })
        })
        .collect()
}
