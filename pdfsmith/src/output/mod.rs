//! Output formatting and display for pdfsmith.
//!
//! This module handles all user-facing output:
//! - Formatted status messages ([`OutputFormatter`])
//! - Human summaries of each operation's report
//! - JSON reports for `--json`
//!
//! # Examples
//!
//! ```no_run
//! use pdfsmith::output::OutputFormatter;
//! use pdfsmith::config::Config;
//!
//! # fn example(config: Config) {
//! let formatter = OutputFormatter::from_config(&config);
//! formatter.info("Starting merge");
//! formatter.success("Merge completed");
//! # }
//! ```

pub mod formatter;

pub use formatter::{MessageLevel, OutputFormatter};

use serde::Serialize;

use crate::compress::CompressionReport;
use crate::error::{Error, Result};
use crate::images::ConversionReport;
use crate::info::DocumentInfo;
use crate::io::{LoadStatistics, WriteStatistics};
use crate::merge::MergeStatistics;
use crate::selection::Rejection;
use crate::split::SplitReport;

/// Serialize `report` as pretty JSON.
///
/// # Errors
///
/// Returns an error if the report cannot be serialized.
pub fn to_json<T: Serialize>(report: &T) -> Result<String> {
    serde_json::to_string_pretty(report)
        .map_err(|e| Error::operation_failed("Report", e.to_string()))
}

/// Print `report` as pretty JSON on stdout.
///
/// # Errors
///
/// Returns an error if the report cannot be serialized.
pub fn print_json<T: Serialize>(report: &T) -> Result<()> {
    println!("{}", to_json(report)?);
    Ok(())
}

/// Warn about every input left out of a selection.
pub fn display_rejections(formatter: &OutputFormatter, rejections: &[Rejection]) {
    for rejection in rejections {
        formatter.warning(&rejection.to_string());
    }
}

/// Display load statistics to the user.
pub fn display_load_statistics(formatter: &OutputFormatter, stats: &LoadStatistics) {
    if stats.failure_count > 0 {
        formatter.warning(&format!(
            "Warning: {} file(s) failed to load",
            stats.failure_count
        ));
    }

    formatter.debug(&format!(
        "Loaded {} file(s) in {:.2}s: {} pages, {}",
        stats.success_count,
        stats.total_time.as_secs_f64(),
        stats.total_pages,
        stats.format_total_size()
    ));
}

/// Display what a merge did.
pub fn display_merge_statistics(formatter: &OutputFormatter, stats: &MergeStatistics) {
    display_rejections(formatter, &stats.rejected);

    formatter.info(&format!(
        "Merged {} file(s) ({}) into {} page(s)",
        stats.files_merged,
        stats.format_input_size(),
        stats.total_pages
    ));
    for (index, source) in stats.sources.iter().enumerate() {
        formatter.detail(
            &format!("{}", index + 1),
            &format!(
                "{} -> pages {}-{}",
                source.path.display(),
                source.first_page,
                source.first_page + source.page_count.saturating_sub(1)
            ),
        );
    }
    if stats.bookmarks_added > 0 {
        formatter.debug(&format!("Added {} bookmark(s)", stats.bookmarks_added));
    }
    formatter.debug(&format!(
        "Loading took {:.2}s, merging {:.2}s",
        stats.load_time.as_secs_f64(),
        stats.merge_time.as_secs_f64()
    ));
}

/// Display what a split produced.
pub fn display_split_report(formatter: &OutputFormatter, report: &SplitReport) {
    formatter.info(&format!(
        "Split {} ({} of {} page(s)) into {} file(s)",
        report.input.display(),
        report.selected_pages,
        report.total_pages,
        report.parts.len()
    ));
    for (index, part) in report.parts.iter().enumerate() {
        formatter.list_item(
            index + 1,
            &format!("{} ({} page(s))", part.file_name, part.pages.len()),
        );
    }
}

/// Display what an image conversion produced.
pub fn display_conversion_report(formatter: &OutputFormatter, report: &ConversionReport) {
    display_rejections(formatter, &report.rejected);

    formatter.info(&format!(
        "Converted {} image(s) ({}, {}, {} margin)",
        report.pages.len(),
        report.layout.orientation,
        report.layout.fit,
        report.layout.margin
    ));
    for page in &report.pages {
        formatter.detail(
            &page.path.display().to_string(),
            &format!(
                "{}x{} px on {:.0}x{:.0} pt",
                page.width_px,
                page.height_px,
                page.placement.page_width,
                page.placement.page_height
            ),
        );
    }
}

/// Display what compression achieved.
pub fn display_compression_report(formatter: &OutputFormatter, report: &CompressionReport) {
    if report.kept_original {
        formatter.warning(&report.summary());
    } else {
        formatter.info(&report.summary());
    }
    formatter.detail("Level", report.level.as_str());
    formatter.detail(
        "Objects",
        &format!(
            "{} -> {}",
            report.passes.objects_before, report.passes.objects_after
        ),
    );
    if report.passes.images.images_found > 0 {
        formatter.detail(
            "Images",
            &format!(
                "{} of {} re-encoded",
                report.passes.images.images_recompressed, report.passes.images.images_found
            ),
        );
    }
}

/// Display inspection results.
pub fn display_document_info(formatter: &OutputFormatter, infos: &[DocumentInfo]) {
    for info in infos {
        formatter.info(&info.summary());
    }
}

/// Confirm a written file.
pub fn display_write_statistics(formatter: &OutputFormatter, stats: &WriteStatistics) {
    formatter.success(&format!(
        "Wrote {} ({})",
        stats.output_path.display(),
        stats.format_file_size()
    ));
    formatter.debug(&format!("Write took {:.2}s", stats.write_time.as_secs_f64()));
}
