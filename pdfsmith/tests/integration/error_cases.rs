//! Failure paths and how they are classified.

use pdfsmith::config::{
    CompressionLevel, Config, ImageLayout, MergeOptions, Operation, SplitOptions,
};
use pdfsmith::images::ImageConverter;
use pdfsmith::merge::merge_pdfs;
use pdfsmith::range::PageRange;
use pdfsmith::{Error, ErrorCategory};
use rstest::rstest;
use std::path::PathBuf;

use crate::common::Workspace;

#[tokio::test]
async fn test_missing_input_file() {
    let workspace = Workspace::new();
    let a = workspace.pdf("a.pdf", 1, 100);
    let missing = workspace.path("missing.pdf");

    let config = Config::new(
        vec![a, missing.clone()],
        workspace.path("out.pdf"),
        Operation::Merge(MergeOptions::default()),
    );

    let err = merge_pdfs(&config).await.unwrap_err();

    assert!(matches!(&err, Error::FileNotFound { path } if *path == missing));
    assert_eq!(err.category(), ErrorCategory::Validation);
    assert_eq!(err.exit_code(), 2);
}

#[tokio::test]
async fn test_directory_input() {
    let workspace = Workspace::new();
    let a = workspace.pdf("a.pdf", 1, 100);

    let config = Config::new(
        vec![a, workspace.root().to_path_buf()],
        workspace.path("out.pdf"),
        Operation::Merge(MergeOptions::default()),
    );

    let err = merge_pdfs(&config).await.unwrap_err();
    assert!(matches!(err, Error::NotAFile { .. }));
}

#[tokio::test]
async fn test_corrupted_pdf_is_a_failure() {
    let workspace = Workspace::new();
    let a = workspace.pdf("a.pdf", 1, 100);
    let broken = workspace.write("broken.pdf", b"%PDF-1.7\nthis is not a pdf body\n");

    let config = Config::new(
        vec![a, broken],
        workspace.path("out.pdf"),
        Operation::Merge(MergeOptions::default()),
    );

    let err = merge_pdfs(&config).await.unwrap_err();

    assert!(matches!(
        err,
        Error::FailedToLoadPdf { .. } | Error::CorruptedPdf { .. }
    ));
    assert_eq!(err.category(), ErrorCategory::Failure);
    assert_eq!(err.exit_code(), 3);
}

#[tokio::test]
async fn test_only_wrong_kind_inputs() {
    let workspace = Workspace::new();
    let a = workspace.write("a.txt", b"plain text");
    let b = workspace.write("b.txt", b"more text");

    let config = Config::new(
        vec![a, b],
        workspace.path("out.pdf"),
        Operation::Merge(MergeOptions::default()),
    );

    let err = merge_pdfs(&config).await.unwrap_err();
    assert!(matches!(err, Error::NoInputs));
    assert_eq!(err.category(), ErrorCategory::Validation);
}

#[tokio::test]
async fn test_undecodable_image() {
    let workspace = Workspace::new();
    let mut bytes = b"\x89PNG\r\n\x1a\n".to_vec();
    bytes.extend_from_slice(&[0u8; 32]);
    let broken = workspace.write("broken.png", &bytes);

    let layout = ImageLayout::default();
    let config = Config::new(
        vec![broken],
        workspace.path("out.pdf"),
        Operation::Images(layout),
    );

    let err = ImageConverter::new()
        .convert(&config, &layout)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::FailedToDecodeImage { .. }));
    assert_eq!(err.category(), ErrorCategory::Failure);
}

#[rstest]
#[case::backwards("5-2")]
#[case::zero("0")]
#[case::letters("1-x")]
#[case::empty(" , ")]
fn test_malformed_page_ranges(#[case] input: &str) {
    let err = PageRange::parse(input).unwrap_err();
    assert!(matches!(err, Error::InvalidPageRange { .. }));
    assert_eq!(err.category(), ErrorCategory::Validation);
}

#[rstest]
#[case::duplicate(vec![1, 1])]
#[case::out_of_range(vec![1, 3])]
#[case::too_short(vec![1])]
fn test_invalid_merge_order(#[case] order: Vec<usize>) {
    let config = Config::new(
        vec![PathBuf::from("a.pdf"), PathBuf::from("b.pdf")],
        PathBuf::from("out.pdf"),
        Operation::Merge(MergeOptions {
            order: Some(order),
            ..Default::default()
        }),
    );

    assert!(matches!(config.validate(), Err(Error::InvalidConfig { .. })));
}

#[rstest]
#[case::split(Operation::Split(SplitOptions::default()))]
#[case::compress(Operation::Compress(CompressionLevel::Medium))]
fn test_single_input_operations_reject_several(#[case] operation: Operation) {
    let config = Config::new(
        vec![PathBuf::from("a.pdf"), PathBuf::from("b.pdf")],
        PathBuf::from("out"),
        operation,
    );

    assert!(matches!(config.validate(), Err(Error::InvalidConfig { .. })));
}

#[test]
fn test_output_same_as_input() {
    let config = Config::new(
        vec![PathBuf::from("a.pdf")],
        PathBuf::from("a.pdf"),
        Operation::Compress(CompressionLevel::Low),
    );

    assert!(matches!(config.validate(), Err(Error::InvalidConfig { .. })));
}
