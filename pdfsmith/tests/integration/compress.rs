//! Compressing files on disk.

use lopdf::{Dictionary, Document, Object, Stream, dictionary};
use pdfsmith::compress::Compressor;
use pdfsmith::config::{CompressionLevel, Config, Operation};
use pdfsmith::io::PdfWriter;
use rstest::rstest;

use crate::common::{Workspace, pdf_document, reload};

/// A document with long uncompressed content streams and an orphaned
/// object, so every level has something to remove.
fn bloated_pdf(pages: usize) -> Vec<u8> {
    let mut doc = pdf_document(pages, 612);

    let ids: Vec<_> = doc.get_pages().into_values().collect();
    for id in ids {
        let mut content = String::new();
        for line in 0..200 {
            content.push_str(&format!("BT /F1 12 Tf 72 {} Td (Line {line}) Tj ET\n", 700 - line));
        }
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));
        doc.get_dictionary_mut(id)
            .unwrap()
            .set("Contents", content_id);
    }
    doc.add_object(dictionary! { "Orphan" => Object::string_literal("x".repeat(2048)) });

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

#[rstest]
#[case::low(CompressionLevel::Low)]
#[case::medium(CompressionLevel::Medium)]
#[case::high(CompressionLevel::High)]
#[tokio::test]
async fn test_compress_shrinks_bloated_file(#[case] level: CompressionLevel) {
    let workspace = Workspace::new();
    let input = workspace.write("bloated.pdf", &bloated_pdf(3));
    let output = workspace.path("small.pdf");

    let mut config = Config::new(vec![input.clone()], output.clone(), Operation::Compress(level));
    config.quiet = true;
    config.validate().unwrap();

    let result = Compressor::new().compress(&config, level).await.unwrap();
    let report = &result.report;

    assert!(!report.kept_original);
    assert!(report.output_size < report.original_size);
    assert_eq!(report.original_size, std::fs::metadata(&input).unwrap().len());
    assert_eq!(report.original_size - report.output_size, report.saved_bytes);
    assert_eq!(report.page_count, 3);

    PdfWriter::verbatim()
        .write_bytes(result.bytes, &output)
        .await
        .unwrap();
    assert_eq!(reload(&output).get_pages().len(), 3);
}

#[tokio::test]
async fn test_higher_levels_do_not_lose_to_low() {
    let workspace = Workspace::new();
    let input = workspace.write("bloated.pdf", &bloated_pdf(2));
    let compressor = Compressor::new();

    let low = compressor
        .compress_file(&input, CompressionLevel::Low)
        .await
        .unwrap();
    let medium = compressor
        .compress_file(&input, CompressionLevel::Medium)
        .await
        .unwrap();

    assert!(medium.report.output_size <= low.report.output_size);
    assert!(medium.report.passes.objects_after < medium.report.passes.objects_before);
}

#[tokio::test]
async fn test_recompressing_never_grows_file() {
    let workspace = Workspace::new();
    let input = workspace.write("bloated.pdf", &bloated_pdf(2));
    let once = workspace.path("once.pdf");
    let compressor = Compressor::new();

    let first = compressor
        .compress_file(&input, CompressionLevel::High)
        .await
        .unwrap();
    PdfWriter::verbatim()
        .write_bytes(first.bytes, &once)
        .await
        .unwrap();

    let second = compressor
        .compress_file(&once, CompressionLevel::High)
        .await
        .unwrap();

    assert!(second.report.output_size <= second.report.original_size);
    let reloaded = Document::load_mem(&second.bytes).unwrap();
    assert_eq!(reloaded.get_pages().len(), 2);
}
