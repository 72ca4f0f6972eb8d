//! End-to-end merges: load from disk, merge, write, reload.

use pdfsmith::config::{CompressionLevel, Config, MergeOptions, Operation};
use pdfsmith::io::PdfWriter;
use pdfsmith::merge::{BookmarkManager, Merger, merge_pdfs};
use rstest::rstest;
use std::path::PathBuf;

use crate::common::{Workspace, page_widths, reload};

fn merge_config(inputs: Vec<PathBuf>, output: PathBuf, options: MergeOptions) -> Config {
    let mut config = Config::new(inputs, output, Operation::Merge(options));
    config.quiet = true;
    config
}

#[tokio::test]
async fn test_merge_two_documents_round_trip() {
    let workspace = Workspace::new();
    let a = workspace.pdf("a.pdf", 2, 100);
    let b = workspace.pdf("b.pdf", 3, 200);
    let output = workspace.path("merged.pdf");

    let config = merge_config(vec![a, b], output.clone(), MergeOptions::default());
    config.validate().unwrap();

    let result = merge_pdfs(&config).await.unwrap();
    assert_eq!(result.statistics.files_merged, 2);
    assert_eq!(result.statistics.total_pages, 5);
    assert_eq!(result.statistics.sources[1].first_page, 3);

    let stats = PdfWriter::new()
        .save_with_stats(result.document, &output)
        .await
        .unwrap();
    assert_eq!(stats.output_path, output);
    assert!(stats.file_size > 0);

    let merged = reload(&output);
    assert_eq!(
        page_widths(&merged),
        vec![100.0, 100.0, 200.0, 200.0, 200.0]
    );
}

#[tokio::test]
async fn test_merge_custom_order() {
    let workspace = Workspace::new();
    let a = workspace.pdf("a.pdf", 1, 100);
    let b = workspace.pdf("b.pdf", 1, 200);
    let c = workspace.pdf("c.pdf", 1, 300);

    let options = MergeOptions {
        order: Some(vec![3, 1, 2]),
        ..Default::default()
    };
    let config = merge_config(vec![a, b, c], workspace.path("out.pdf"), options.clone());
    config.validate().unwrap();

    let result = Merger::new().merge(&config, &options).await.unwrap();

    assert_eq!(page_widths(&result.document), vec![300.0, 100.0, 200.0]);
}

#[tokio::test]
async fn test_merge_bookmarks_survive_write() {
    let workspace = Workspace::new();
    let intro = workspace.pdf("intro.pdf", 1, 100);
    let body = workspace.pdf("body.pdf", 2, 200);
    let output = workspace.path("book.pdf");

    let options = MergeOptions {
        bookmarks: true,
        ..Default::default()
    };
    let config = merge_config(vec![intro, body], output.clone(), options.clone());

    let result = Merger::new().merge(&config, &options).await.unwrap();
    assert_eq!(result.statistics.bookmarks_added, 2);

    PdfWriter::new()
        .save_with_stats(result.document, &output)
        .await
        .unwrap();

    let merged = reload(&output);
    let bookmarks = BookmarkManager::new();
    assert!(bookmarks.has_bookmarks(&merged));
    assert_eq!(bookmarks.titles(&merged), vec!["intro", "body"]);
}

#[tokio::test]
async fn test_merge_skips_non_pdf_inputs() {
    let workspace = Workspace::new();
    let a = workspace.pdf("a.pdf", 1, 100);
    let picture = workspace.png("picture.png", 4, 4);
    let b = workspace.pdf("b.pdf", 1, 200);

    let config = merge_config(
        vec![a, picture.clone(), b],
        workspace.path("out.pdf"),
        MergeOptions::default(),
    );

    let result = merge_pdfs(&config).await.unwrap();

    assert_eq!(result.statistics.files_merged, 2);
    assert_eq!(result.statistics.rejected.len(), 1);
    assert_eq!(result.statistics.rejected[0].path, picture);
    assert_eq!(page_widths(&result.document), vec![100.0, 200.0]);
}

#[rstest]
#[case::low(CompressionLevel::Low)]
#[case::medium(CompressionLevel::Medium)]
#[case::high(CompressionLevel::High)]
#[tokio::test]
async fn test_merge_at_every_compression_level(#[case] level: CompressionLevel) {
    let workspace = Workspace::new();
    let a = workspace.pdf("a.pdf", 2, 100);
    let b = workspace.pdf("b.pdf", 2, 200);
    let output = workspace.path("out.pdf");

    let options = MergeOptions {
        compression: level,
        ..Default::default()
    };
    let config = merge_config(vec![a, b], output.clone(), options.clone());

    let result = Merger::new().merge(&config, &options).await.unwrap();
    PdfWriter::new()
        .save_with_stats(result.document, &output)
        .await
        .unwrap();

    assert_eq!(reload(&output).get_pages().len(), 4);
}

#[tokio::test]
async fn test_merge_same_file_twice() {
    let workspace = Workspace::new();
    let a = workspace.pdf("a.pdf", 2, 150);

    let config = merge_config(
        vec![a.clone(), a],
        workspace.path("twice.pdf"),
        MergeOptions::default(),
    );

    let result = merge_pdfs(&config).await.unwrap();

    assert_eq!(result.statistics.total_pages, 4);
    assert_eq!(page_widths(&result.document), vec![150.0; 4]);
}
