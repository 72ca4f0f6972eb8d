//! pdfsmith - merge, split, compress and create PDF documents.
//!
//! Thin front end over the `pdfsmith` library: parse arguments, run one
//! tool, write its output and report.

mod cli;

use anyhow::Context;
use clap::Parser;
use serde_json::json;
use std::path::Path;
use std::process;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use pdfsmith::compress::Compressor;
use pdfsmith::config::{Config, Operation, OverwriteMode};
use pdfsmith::images::ImageConverter;
use pdfsmith::io::{PdfWriter, WriteStatistics};
use pdfsmith::merge::Merger;
use pdfsmith::output::{self, OutputFormatter};
use pdfsmith::split::Splitter;
use pdfsmith::{Error, ErrorCategory};

/// Environment variable holding the tracing filter.
const LOG_ENV: &str = "PDFSMITH_LOG";

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        process::exit(report_error(&err));
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "pdfsmith=debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

/// Print `err` the way its category asks for and return the exit code.
fn report_error(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<Error>() {
        Some(error) if error.category() == ErrorCategory::Validation => {
            eprintln!("Error: {error}");
            error.exit_code()
        }
        Some(error) => {
            tracing::error!("{err:#}");
            eprintln!("Operation failed, please try again");
            eprintln!("  Cause: {err:#}");
            error.exit_code()
        }
        None => {
            tracing::error!("{err:#}");
            eprintln!("Operation failed, please try again");
            eprintln!("  Cause: {err:#}");
            1
        }
    }
}

/// Main application logic.
async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.to_config()?;
    let formatter = OutputFormatter::from_config(&config);

    formatter.debug(&format!("{} v{}", pdfsmith::NAME, pdfsmith::VERSION));
    tracing::debug!(operation = config.operation.name(), inputs = config.inputs.len(), "starting");

    match config.operation.clone() {
        Operation::Merge(options) => {
            check_output(&config, &config.output, &formatter).await?;
            let result = Merger::new()
                .merge(&config, &options)
                .await
                .context("merging documents")?;
            output::display_merge_statistics(&formatter, &result.statistics);

            let written = write_document(&config, result.document, &config.output, &formatter)
                .await?;
            if config.json {
                output::print_json(&json!({
                    "operation": "merge",
                    "output": written.as_ref().map(|w| &w.output_path),
                    "dry_run": config.dry_run,
                    "report": result.statistics,
                }))?;
            }
        }

        Operation::Images(layout) => {
            check_output(&config, &config.output, &formatter).await?;
            let result = ImageConverter::new()
                .convert(&config, &layout)
                .await
                .context("converting images")?;
            output::display_conversion_report(&formatter, &result.report);

            let written = write_document(&config, result.document, &config.output, &formatter)
                .await?;
            if config.json {
                output::print_json(&json!({
                    "operation": "images",
                    "output": written.as_ref().map(|w| &w.output_path),
                    "dry_run": config.dry_run,
                    "report": result.report,
                }))?;
            }
        }

        Operation::Compress(level) => {
            check_output(&config, &config.output, &formatter).await?;
            let result = Compressor::new()
                .compress(&config, level)
                .await
                .context("compressing document")?;
            output::display_compression_report(&formatter, &result.report);

            let written = if config.dry_run {
                None
            } else {
                let stats = PdfWriter::verbatim()
                    .write_bytes(result.bytes, &config.output)
                    .await?;
                output::display_write_statistics(&formatter, &stats);
                Some(stats)
            };
            if config.json {
                output::print_json(&json!({
                    "operation": "compress",
                    "output": written.as_ref().map(|w| &w.output_path),
                    "dry_run": config.dry_run,
                    "report": result.report,
                }))?;
            }
        }

        Operation::Split(options) => {
            let result = Splitter::new()
                .split(&config, &options)
                .await
                .context("splitting document")?;
            output::display_split_report(&formatter, &result.report);

            if !config.dry_run {
                tokio::fs::create_dir_all(&config.output)
                    .await
                    .map_err(|e| Error::FailedToCreateOutput {
                        path: config.output.clone(),
                        source: e,
                    })?;
                for part in &result.parts {
                    check_output(&config, &part.output_path(&config.output), &formatter).await?;
                }
            }

            let mut written = Vec::new();
            for part in result.parts {
                let path = part.output_path(&config.output);
                if let Some(stats) = write_document(&config, part.document, &path, &formatter).await? {
                    written.push(stats.output_path);
                }
            }
            if config.json {
                output::print_json(&json!({
                    "operation": "split",
                    "outputs": written,
                    "dry_run": config.dry_run,
                    "report": result.report,
                }))?;
            }
        }

        Operation::Info => {
            let (infos, rejected) = pdfsmith::info::inspect(&config.inputs, config.effective_jobs())
                .await
                .context("inspecting documents")?;
            output::display_rejections(&formatter, &rejected);
            if config.json {
                output::print_json(&json!({
                    "operation": "info",
                    "documents": infos,
                    "rejected": rejected,
                }))?;
            } else {
                output::display_document_info(&formatter, &infos);
            }
        }
    }

    Ok(())
}

/// Write `document` to `path` unless this is a dry run.
async fn write_document(
    config: &Config,
    document: lopdf::Document,
    path: &Path,
    formatter: &OutputFormatter,
) -> pdfsmith::Result<Option<WriteStatistics>> {
    if config.dry_run {
        formatter.success(&format!("Dry run: would write {}", path.display()));
        return Ok(None);
    }

    let stats = PdfWriter::new().save_with_stats(document, path).await?;
    output::display_write_statistics(formatter, &stats);
    Ok(Some(stats))
}

/// Check that `path` can be written and apply the overwrite policy.
async fn check_output(
    config: &Config,
    path: &Path,
    formatter: &OutputFormatter,
) -> pdfsmith::Result<()> {
    if config.dry_run {
        return Ok(());
    }

    let writer = PdfWriter::new();
    writer.can_write(path).await?;
    if !writer.exists(path).await {
        return Ok(());
    }

    match config.overwrite_mode {
        OverwriteMode::Force => Ok(()),
        OverwriteMode::NoClobber => Err(Error::output_exists(path.to_path_buf())),
        OverwriteMode::Prompt => {
            // Quiet and JSON runs cannot ask, so they refuse
            if formatter.is_quiet() {
                return Err(Error::output_exists(path.to_path_buf()));
            }

            formatter.warning(&format!("Output file already exists: {}", path.display()));

            use std::io::{self, Write};
            eprint!("Overwrite? [y/N]: ");
            io::stderr().flush().ok();

            let mut response = String::new();
            io::stdin().read_line(&mut response)?;

            let response = response.trim().to_lowercase();
            if response == "y" || response == "yes" {
                Ok(())
            } else {
                Err(Error::Cancelled)
            }
        }
    }
}
