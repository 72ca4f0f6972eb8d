//! Splitting documents from disk and writing the parts.

use pdfsmith::config::{Config, Operation, SplitMode, SplitOptions};
use pdfsmith::io::PdfWriter;
use pdfsmith::range::PageRange;
use pdfsmith::split::Splitter;
use pdfsmith::{Error, ErrorCategory};
use std::path::PathBuf;

use crate::common::{Workspace, page_widths, reload};

fn split_config(input: PathBuf, output_dir: PathBuf, options: &SplitOptions) -> Config {
    let mut config = Config::new(vec![input], output_dir, Operation::Split(options.clone()));
    config.quiet = true;
    config
}

/// A document whose page n is `n * 10` points wide, so pages can be told
/// apart after a split.
fn numbered(workspace: &Workspace, name: &str, pages: usize) -> PathBuf {
    let mut doc = crate::common::pdf_document(pages, 10);
    let ids: Vec<_> = doc.get_pages().into_values().collect();
    for (index, id) in ids.into_iter().enumerate() {
        let width = ((index + 1) * 10) as i64;
        doc.get_dictionary_mut(id)
            .unwrap()
            .set("MediaBox", vec![0.into(), 0.into(), width.into(), 792.into()]);
    }
    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    workspace.write(name, &bytes)
}

#[tokio::test]
async fn test_split_ranges_writes_one_file_per_run() {
    let workspace = Workspace::new();
    let input = numbered(&workspace, "report.pdf", 10);
    let out_dir = workspace.path("parts");
    std::fs::create_dir(&out_dir).unwrap();

    let options = SplitOptions {
        pages: Some(PageRange::parse("1-3, 5, 8-10").unwrap()),
        mode: SplitMode::Ranges,
        prefix: None,
    };
    let config = split_config(input, out_dir.clone(), &options);

    let result = Splitter::new().split(&config, &options).await.unwrap();

    let names: Vec<&str> = result.report.parts.iter().map(|p| p.file_name.as_str()).collect();
    assert_eq!(
        names,
        vec!["report_pages_1-3.pdf", "report_page_5.pdf", "report_pages_8-10.pdf"]
    );
    assert_eq!(result.report.total_pages, 10);
    assert_eq!(result.report.selected_pages, 7);

    for part in result.parts {
        let path = part.output_path(&out_dir);
        PdfWriter::new()
            .save_with_stats(part.document, &path)
            .await
            .unwrap();
    }

    assert_eq!(
        page_widths(&reload(&out_dir.join("report_pages_1-3.pdf"))),
        vec![10.0, 20.0, 30.0]
    );
    assert_eq!(
        page_widths(&reload(&out_dir.join("report_page_5.pdf"))),
        vec![50.0]
    );
    assert_eq!(
        page_widths(&reload(&out_dir.join("report_pages_8-10.pdf"))),
        vec![80.0, 90.0, 100.0]
    );
}

#[tokio::test]
async fn test_split_every_page_with_prefix() {
    let workspace = Workspace::new();
    let input = numbered(&workspace, "deck.pdf", 3);

    let options = SplitOptions {
        pages: None,
        mode: SplitMode::Pages,
        prefix: Some("slide".to_string()),
    };
    let config = split_config(input, workspace.path("out"), &options);

    let result = Splitter::new().split(&config, &options).await.unwrap();

    assert_eq!(result.parts.len(), 3);
    for (index, part) in result.parts.iter().enumerate() {
        let page = index as u32 + 1;
        assert_eq!(part.file_name, format!("slide_page_{page}.pdf"));
        assert_eq!(part.pages, vec![page]);
        assert_eq!(page_widths(&part.document), vec![page as f32 * 10.0]);
    }
}

#[tokio::test]
async fn test_extract_keeps_selected_pages_in_order() {
    let workspace = Workspace::new();
    let input = numbered(&workspace, "notes.pdf", 6);

    let options = SplitOptions {
        pages: Some(PageRange::parse("6,2,4,2").unwrap()),
        mode: SplitMode::Extract,
        prefix: None,
    };
    let config = split_config(input, workspace.path("out"), &options);

    let result = Splitter::new().split(&config, &options).await.unwrap();

    assert_eq!(result.parts.len(), 1);
    assert_eq!(result.parts[0].file_name, "notes_extracted.pdf");
    assert_eq!(result.parts[0].pages, vec![2, 4, 6]);
    assert_eq!(page_widths(&result.parts[0].document), vec![20.0, 40.0, 60.0]);
}

#[tokio::test]
async fn test_split_page_beyond_end_is_validation_error() {
    let workspace = Workspace::new();
    let input = numbered(&workspace, "short.pdf", 3);

    let options = SplitOptions {
        pages: Some(PageRange::parse("2-5").unwrap()),
        mode: SplitMode::Ranges,
        prefix: None,
    };
    let config = split_config(input, workspace.path("out"), &options);

    let err = Splitter::new().split(&config, &options).await.unwrap_err();

    assert!(matches!(err, Error::PageOutOfBounds { .. }));
    assert_eq!(err.category(), ErrorCategory::Validation);
}

#[tokio::test]
async fn test_split_rejects_image_input() {
    let workspace = Workspace::new();
    let input = workspace.jpeg("photo.jpg", 8, 8);

    let options = SplitOptions::default();
    let config = split_config(input, workspace.path("out"), &options);

    let err = Splitter::new().split(&config, &options).await.unwrap_err();

    assert!(matches!(err, Error::UnsupportedFileType { .. }));
}
