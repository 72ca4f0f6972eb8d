//! Image to PDF conversion.
//!
//! Every PNG or JPEG in the selection becomes one page, in selection order.
//! The page size and image position come from [`layout::compute_placement`];
//! the pixels are embedded by [`embed::embed_image`].
//!
//! # Examples
//!
//! ```no_run
//! use pdfsmith::config::{Config, ImageLayout, Operation, PageFit};
//! use pdfsmith::images::ImageConverter;
//! use std::path::PathBuf;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let layout = ImageLayout {
//!     fit: PageFit::Shrink,
//!     ..ImageLayout::default()
//! };
//! let config = Config::new(
//!     vec![PathBuf::from("scan-1.jpg"), PathBuf::from("scan-2.png")],
//!     PathBuf::from("scans.pdf"),
//!     Operation::Images(layout),
//! );
//! let result = ImageConverter::new().convert(&config, &layout).await?;
//! println!("{} page(s)", result.report.pages.len());
//! # Ok(())
//! # }
//! ```

pub mod embed;
pub mod layout;

pub use embed::{EmbeddedImage, embed_image};
pub use layout::{Placement, compute_placement};

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, dictionary};
use serde::Serialize;
use std::path::PathBuf;

use crate::config::{Config, ImageLayout};
use crate::error::{Error, Result};
use crate::selection::{FileKind, FileSelection, Rejection, SelectedFile};

/// One converted image.
#[derive(Debug, Clone, Serialize)]
pub struct ImagePage {
    /// Source image.
    pub path: PathBuf,
    /// Detected image kind.
    pub kind: FileKind,
    /// Image width in pixels.
    pub width_px: u32,
    /// Image height in pixels.
    pub height_px: u32,
    /// Page geometry in points.
    pub placement: Placement,
}

/// What a conversion produced.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionReport {
    /// Settings used.
    pub layout: ImageLayout,
    /// One entry per page, in page order.
    pub pages: Vec<ImagePage>,
    /// Inputs left out because they are not images.
    pub rejected: Vec<Rejection>,
}

/// The new document and its report.
#[derive(Debug)]
pub struct ConversionResult {
    /// Document with one page per image.
    pub document: Document,
    /// What happened.
    pub report: ConversionReport,
}

/// Turns images into a PDF.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageConverter;

impl ImageConverter {
    /// Create a new converter.
    pub fn new() -> Self {
        Self
    }

    /// Read the image inputs of `config` and lay them out with `layout`.
    ///
    /// Inputs that are not PNG or JPEG are skipped and listed in
    /// [`ConversionReport::rejected`].
    ///
    /// # Errors
    ///
    /// Returns an error if no image is left after filtering or an image
    /// cannot be decoded.
    pub async fn convert(&self, config: &Config, layout: &ImageLayout) -> Result<ConversionResult> {
        let (selection, rejected) = FileSelection::collect(&config.inputs, FileKind::IMAGES).await?;
        let files = selection.into_files();
        let layout = *layout;

        let (document, pages) = tokio::task::spawn_blocking(move || build_document(&files, &layout))
            .await
            .map_err(|e| Error::operation_failed("Image conversion", format!("task failed: {e}")))??;

        tracing::info!(pages = pages.len(), "image conversion finished");

        Ok(ConversionResult {
            document,
            report: ConversionReport {
                layout,
                pages,
                rejected,
            },
        })
    }
}

/// Build a document with one page per image in `files`.
///
/// # Errors
///
/// Returns [`Error::NoInputs`] for an empty list and
/// [`Error::FailedToDecodeImage`] for unreadable pixels.
pub fn build_document(
    files: &[SelectedFile],
    layout: &ImageLayout,
) -> Result<(Document, Vec<ImagePage>)> {
    if files.is_empty() {
        return Err(Error::NoInputs);
    }

    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let mut kids: Vec<Object> = Vec::with_capacity(files.len());
    let mut pages = Vec::with_capacity(files.len());

    for file in files {
        let image = embed_image(&file.path, file.kind, &file.bytes)?;
        let placement = compute_placement(image.width, image.height, layout);
        let page_id = add_image_page(&mut doc, pages_id, image.stream, image.soft_mask, &placement)?;

        tracing::debug!(
            path = %file.path.display(),
            width = image.width,
            height = image.height,
            "added image page"
        );

        kids.push(page_id.into());
        pages.push(ImagePage {
            path: file.path.clone(),
            kind: file.kind,
            width_px: image.width,
            height_px: image.height,
            placement,
        });
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => kids.len() as i64,
            "Kids" => kids,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    Ok((doc, pages))
}

fn add_image_page(
    doc: &mut Document,
    pages_id: ObjectId,
    mut image: Stream,
    soft_mask: Option<Stream>,
    placement: &Placement,
) -> Result<ObjectId> {
    if let Some(mask) = soft_mask {
        let mask_id = doc.add_object(mask);
        image.dict.set("SMask", mask_id);
    }
    let image_id = doc.add_object(image);

    let real = |v: f64| Object::Real(v as f32);
    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    real(placement.width),
                    0.into(),
                    0.into(),
                    real(placement.height),
                    real(placement.x),
                    real(placement.y),
                ],
            ),
            Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

    Ok(doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![
            0.into(),
            0.into(),
            real(placement.page_width),
            real(placement.page_height),
        ],
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => dictionary! { "Im0" => image_id },
        },
    }))
}
