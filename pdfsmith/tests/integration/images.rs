//! Converting image files into a PDF and reading it back.

use pdfsmith::config::{Config, ImageLayout, Margin, Operation, Orientation, PageFit};
use pdfsmith::images::ImageConverter;
use pdfsmith::images::layout::{A4_HEIGHT_MM, A4_WIDTH_MM, MM_TO_PT};
use pdfsmith::io::PdfWriter;
use pdfsmith::selection::FileKind;
use rstest::rstest;
use std::path::PathBuf;

use crate::common::{Workspace, reload};

const EPSILON: f64 = 0.01;

fn images_config(inputs: Vec<PathBuf>, output: PathBuf, layout: ImageLayout) -> Config {
    let mut config = Config::new(inputs, output, Operation::Images(layout));
    config.quiet = true;
    config
}

fn media_box(doc: &lopdf::Document, page: u32) -> (f32, f32) {
    let id = doc.get_pages()[&page];
    let media_box = doc
        .get_dictionary(id)
        .unwrap()
        .get(b"MediaBox")
        .unwrap()
        .as_array()
        .unwrap();
    (
        media_box[2].as_float().unwrap(),
        media_box[3].as_float().unwrap(),
    )
}

#[tokio::test]
async fn test_convert_png_and_jpeg_in_order() {
    let workspace = Workspace::new();
    let png = workspace.png("first.png", 40, 30);
    let jpeg = workspace.jpeg("second.jpg", 30, 40);
    let output = workspace.path("album.pdf");

    let layout = ImageLayout::default();
    let config = images_config(vec![png.clone(), jpeg.clone()], output.clone(), layout);
    config.validate().unwrap();

    let result = ImageConverter::new().convert(&config, &layout).await.unwrap();

    assert_eq!(result.report.pages.len(), 2);
    assert_eq!(result.report.pages[0].path, png);
    assert_eq!(result.report.pages[0].kind, FileKind::Png);
    assert_eq!(result.report.pages[1].path, jpeg);
    assert_eq!(result.report.pages[1].kind, FileKind::Jpeg);
    assert!(result.report.rejected.is_empty());

    PdfWriter::new()
        .save_with_stats(result.document, &output)
        .await
        .unwrap();

    let doc = reload(&output);
    assert_eq!(doc.get_pages().len(), 2);
    let (width, height) = media_box(&doc, 1);
    assert!((f64::from(width) - A4_WIDTH_MM * MM_TO_PT).abs() < EPSILON);
    assert!((f64::from(height) - A4_HEIGHT_MM * MM_TO_PT).abs() < EPSILON);
}

#[rstest]
#[case::portrait(Orientation::Portrait, 40, 30, false)]
#[case::landscape(Orientation::Landscape, 30, 40, true)]
#[case::auto_wide(Orientation::Auto, 40, 30, true)]
#[case::auto_tall(Orientation::Auto, 30, 40, false)]
#[tokio::test]
async fn test_orientation_sets_page_shape(
    #[case] orientation: Orientation,
    #[case] width: u32,
    #[case] height: u32,
    #[case] expect_landscape: bool,
) {
    let workspace = Workspace::new();
    let png = workspace.png("image.png", width, height);

    let layout = ImageLayout {
        orientation,
        ..ImageLayout::default()
    };
    let config = images_config(vec![png], workspace.path("out.pdf"), layout);

    let result = ImageConverter::new().convert(&config, &layout).await.unwrap();
    let placement = result.report.pages[0].placement;

    assert_eq!(placement.page_width > placement.page_height, expect_landscape);
}

#[tokio::test]
async fn test_original_size_page_wraps_image() {
    let workspace = Workspace::new();
    let png = workspace.png("stamp.png", 100, 50);

    let layout = ImageLayout {
        fit: PageFit::Original,
        margin: Margin::None,
        ..ImageLayout::default()
    };
    let config = images_config(vec![png], workspace.path("out.pdf"), layout);

    let result = ImageConverter::new().convert(&config, &layout).await.unwrap();
    let placement = result.report.pages[0].placement;

    assert!((placement.page_width - placement.width).abs() < EPSILON);
    assert!((placement.page_height - placement.height).abs() < EPSILON);
    assert!(placement.x.abs() < EPSILON);
    assert!(placement.y.abs() < EPSILON);
}

#[tokio::test]
async fn test_shrink_keeps_small_image_at_natural_size() {
    let workspace = Workspace::new();
    let png = workspace.png("icon.png", 16, 16);

    let layout = ImageLayout {
        fit: PageFit::Shrink,
        ..ImageLayout::default()
    };
    let config = images_config(vec![png], workspace.path("out.pdf"), layout);

    let result = ImageConverter::new().convert(&config, &layout).await.unwrap();
    let placement = result.report.pages[0].placement;

    let natural = 16.0 * 0.264583 * MM_TO_PT;
    assert!((placement.width - natural).abs() < EPSILON);
    assert!(
        (placement.x * 2.0 + placement.width - placement.page_width).abs() < EPSILON,
        "image should be centred horizontally"
    );
}

#[tokio::test]
async fn test_convert_skips_pdf_inputs() {
    let workspace = Workspace::new();
    let png = workspace.png("keep.png", 8, 8);
    let pdf = workspace.pdf("skip.pdf", 1, 100);

    let layout = ImageLayout::default();
    let config = images_config(vec![pdf.clone(), png], workspace.path("out.pdf"), layout);

    let result = ImageConverter::new().convert(&config, &layout).await.unwrap();

    assert_eq!(result.report.pages.len(), 1);
    assert_eq!(result.report.rejected.len(), 1);
    assert_eq!(result.report.rejected[0].path, pdf);
    assert_eq!(result.report.rejected[0].detected, Some(FileKind::Pdf));
}
