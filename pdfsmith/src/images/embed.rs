//! Image XObjects built from PNG and JPEG files.

use flate2::Compression;
use flate2::write::ZlibEncoder;
use image::codecs::jpeg::JpegDecoder;
use image::{DynamicImage, ExtendedColorType, ImageDecoder, ImageFormat};
use lopdf::{Object, Stream, dictionary};
use std::io::{Cursor, Write};
use std::path::Path;

use crate::error::{Error, Result};
use crate::selection::FileKind;

/// Image ready to be added to a document.
#[derive(Debug, Clone)]
pub struct EmbeddedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// The image XObject; `SMask` is set when the caller adds the mask.
    pub stream: Stream,
    /// Alpha channel as a `DeviceGray` image, if any pixel is not opaque.
    pub soft_mask: Option<Stream>,
}

/// Build the XObject for one image file.
///
/// JPEG files in gray or RGB are embedded untouched with `DCTDecode`.
/// Everything else is decoded and stored as 8-bit RGB with `FlateDecode`.
///
/// # Errors
///
/// Returns [`Error::FailedToDecodeImage`] if the bytes cannot be decoded.
pub fn embed_image(path: &Path, kind: FileKind, bytes: &[u8]) -> Result<EmbeddedImage> {
    let decode_error = |e: image::ImageError| Error::FailedToDecodeImage {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };

    if kind == FileKind::Jpeg {
        let decoder = JpegDecoder::new(Cursor::new(bytes)).map_err(decode_error)?;
        let (width, height) = decoder.dimensions();
        let color_space = match decoder.original_color_type() {
            ExtendedColorType::L8 => Some("DeviceGray"),
            ExtendedColorType::Rgb8 => Some("DeviceRGB"),
            _ => None,
        };

        if let Some(color_space) = color_space {
            return Ok(EmbeddedImage {
                width,
                height,
                stream: passthrough_jpeg(bytes, width, height, color_space),
                soft_mask: None,
            });
        }
        tracing::debug!(path = %path.display(), "JPEG is not gray or RGB, converting");
    }

    let format = match kind {
        FileKind::Jpeg => ImageFormat::Jpeg,
        _ => ImageFormat::Png,
    };
    let decoded = image::load_from_memory_with_format(bytes, format).map_err(decode_error)?;
    decoded_image(&decoded)
}

fn passthrough_jpeg(bytes: &[u8], width: u32, height: u32, color_space: &str) -> Stream {
    let dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => i64::from(width),
        "Height" => i64::from(height),
        "ColorSpace" => Object::Name(color_space.as_bytes().to_vec()),
        "BitsPerComponent" => 8,
        "Filter" => "DCTDecode",
    };
    let mut stream = Stream::new(dict, bytes.to_vec());
    stream.allows_compression = false;
    stream
}

fn decoded_image(decoded: &DynamicImage) -> Result<EmbeddedImage> {
    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();

    let pixels = width as usize * height as usize;
    let mut rgb = Vec::with_capacity(pixels * 3);
    let mut alpha = Vec::with_capacity(pixels);
    let mut has_alpha = false;
    for pixel in rgba.pixels() {
        let [r, g, b, a] = pixel.0;
        has_alpha |= a != 255;
        rgb.extend_from_slice(&[r, g, b]);
        alpha.push(a);
    }

    let stream = flate_image(&rgb, width, height, "DeviceRGB")?;
    let soft_mask = if has_alpha {
        Some(flate_image(&alpha, width, height, "DeviceGray")?)
    } else {
        None
    };

    Ok(EmbeddedImage {
        width,
        height,
        stream,
        soft_mask,
    })
}

fn flate_image(samples: &[u8], width: u32, height: u32, color_space: &str) -> Result<Stream> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(samples)?;
    let compressed = encoder.finish()?;

    let dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => i64::from(width),
        "Height" => i64::from(height),
        "ColorSpace" => Object::Name(color_space.as_bytes().to_vec()),
        "BitsPerComponent" => 8,
        "Filter" => "FlateDecode",
    };
    let mut stream = Stream::new(dict, compressed);
    stream.allows_compression = false;
    Ok(stream)
}
