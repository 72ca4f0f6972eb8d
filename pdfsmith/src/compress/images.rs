//! Lossy re-encoding of embedded images.
//!
//! Only simple images are touched: 8 bits per component, `DeviceRGB` or
//! `DeviceGray`, stored raw, Flate-compressed without predictors, or as
//! JPEG, and not masked in any way. Each candidate is decoded, downscaled
//! if a side is above [`ImageSettings::max_dimension`], and encoded as JPEG.
//! The new stream replaces the old one only if it is smaller.

use flate2::read::ZlibDecoder;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ExtendedColorType, GrayImage, ImageEncoder, ImageFormat, RgbImage};
use lopdf::{Document, Object, ObjectId, Stream};
use serde::Serialize;
use std::io::Read;

/// Knobs for the image pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSettings {
    /// JPEG quality (1-100).
    pub quality: u8,
    /// Longest side kept, in pixels.
    pub max_dimension: u32,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            quality: 60,
            max_dimension: 2000,
        }
    }
}

/// Outcome of an image pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImagePassStatistics {
    /// Image XObjects in the document.
    pub images_found: usize,
    /// Images replaced by a smaller JPEG.
    pub images_recompressed: usize,
    /// Stream bytes saved by the replacements.
    pub bytes_saved: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Raw,
    Flate,
    Jpeg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Colors {
    Rgb,
    Gray,
}

/// Re-encode every eligible image XObject in `doc`.
pub fn recompress_images(doc: &mut Document, settings: &ImageSettings) -> ImagePassStatistics {
    let mut stats = ImagePassStatistics::default();

    let image_ids: Vec<ObjectId> = doc
        .objects
        .iter()
        .filter_map(|(id, object)| match object {
            Object::Stream(stream) if is_image(stream) => Some(*id),
            _ => None,
        })
        .collect();
    stats.images_found = image_ids.len();

    for id in image_ids {
        let Some(Object::Stream(stream)) = doc.objects.get(&id) else {
            continue;
        };

        let replacement = match reencode(stream, settings) {
            Ok(Some(replacement)) => replacement,
            Ok(None) => continue,
            Err(reason) => {
                tracing::debug!(?id, "left image as is: {reason}");
                continue;
            }
        };

        let before = stream.content.len();
        let after = replacement.content.len();
        if after >= before {
            tracing::trace!(?id, before, after, "re-encoded image is not smaller");
            continue;
        }

        tracing::debug!(?id, before, after, "re-encoded image");
        stats.images_recompressed += 1;
        stats.bytes_saved += (before - after) as u64;
        doc.objects.insert(id, Object::Stream(replacement));
    }

    stats
}

fn is_image(stream: &Stream) -> bool {
    matches!(stream.dict.get(b"Subtype"), Ok(Object::Name(name)) if name == b"Image")
}

/// Entries that change how samples map to colors or coverage.
const MASKING: [&[u8]; 4] = [b"SMask", b"Mask", b"Decode", b"DecodeParms"];

/// `Ok(None)` means the image is not a candidate.
fn reencode(stream: &Stream, settings: &ImageSettings) -> Result<Option<Stream>, String> {
    let dict = &stream.dict;

    for key in MASKING {
        if dict.has(key) {
            return Ok(None);
        }
    }
    if matches!(dict.get(b"ImageMask"), Ok(Object::Boolean(true))) {
        return Ok(None);
    }
    if !matches!(dict.get(b"BitsPerComponent"), Ok(Object::Integer(8))) {
        return Ok(None);
    }

    let colors = match dict.get(b"ColorSpace") {
        Ok(Object::Name(name)) if name == b"DeviceRGB" => Colors::Rgb,
        Ok(Object::Name(name)) if name == b"DeviceGray" => Colors::Gray,
        _ => return Ok(None),
    };

    let source = match dict.get(b"Filter") {
        Err(_) => Source::Raw,
        Ok(filter) => match single_filter(filter) {
            Some(b"FlateDecode") => Source::Flate,
            Some(b"DCTDecode") => Source::Jpeg,
            _ => return Ok(None),
        },
    };

    let width = dimension(stream, b"Width")?;
    let height = dimension(stream, b"Height")?;

    let image = decode(stream, source, colors, width, height)?;
    let image = if width.max(height) > settings.max_dimension {
        image.resize(
            settings.max_dimension,
            settings.max_dimension,
            FilterType::Triangle,
        )
    } else {
        image
    };

    encode_jpeg(&image, colors, settings.quality, stream).map(Some)
}

fn single_filter(filter: &Object) -> Option<&[u8]> {
    match filter {
        Object::Name(name) => Some(name.as_slice()),
        Object::Array(filters) if filters.len() == 1 => match &filters[0] {
            Object::Name(name) => Some(name.as_slice()),
            _ => None,
        },
        _ => None,
    }
}

fn dimension(stream: &Stream, key: &[u8]) -> Result<u32, String> {
    match stream.dict.get(key) {
        Ok(Object::Integer(n)) if *n > 0 => u32::try_from(*n).map_err(|e| e.to_string()),
        _ => Err(format!("bad {}", String::from_utf8_lossy(key))),
    }
}

fn decode(
    stream: &Stream,
    source: Source,
    colors: Colors,
    width: u32,
    height: u32,
) -> Result<DynamicImage, String> {
    let samples = match source {
        Source::Jpeg => {
            return image::load_from_memory_with_format(&stream.content, ImageFormat::Jpeg)
                .map_err(|e| e.to_string());
        }
        Source::Raw => stream.content.clone(),
        Source::Flate => {
            let mut decoded = Vec::new();
            ZlibDecoder::new(&stream.content[..])
                .read_to_end(&mut decoded)
                .map_err(|e| e.to_string())?;
            decoded
        }
    };

    let channels = match colors {
        Colors::Rgb => 3,
        Colors::Gray => 1,
    };
    let expected = (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(channels))
        .ok_or_else(|| format!("bad dimensions {width}x{height}"))?;

    match colors {
        Colors::Rgb => {
            if samples.len() < expected {
                return Err(format!("{} bytes, expected {expected}", samples.len()));
            }
            RgbImage::from_raw(width, height, samples[..expected].to_vec())
                .map(DynamicImage::ImageRgb8)
                .ok_or_else(|| "RGB buffer does not match dimensions".to_string())
        }
        Colors::Gray => {
            if samples.len() < expected {
                return Err(format!("{} bytes, expected {expected}", samples.len()));
            }
            GrayImage::from_raw(width, height, samples[..expected].to_vec())
                .map(DynamicImage::ImageLuma8)
                .ok_or_else(|| "gray buffer does not match dimensions".to_string())
        }
    }
}

fn encode_jpeg(
    image: &DynamicImage,
    colors: Colors,
    quality: u8,
    original: &Stream,
) -> Result<Stream, String> {
    let mut jpeg = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut jpeg, quality);

    let (width, height) = (image.width(), image.height());
    match colors {
        Colors::Rgb => encoder.write_image(
            image.to_rgb8().as_raw(),
            width,
            height,
            ExtendedColorType::Rgb8,
        ),
        Colors::Gray => encoder.write_image(
            image.to_luma8().as_raw(),
            width,
            height,
            ExtendedColorType::L8,
        ),
    }
    .map_err(|e| e.to_string())?;

    let mut dict = original.dict.clone();
    dict.set("Width", i64::from(width));
    dict.set("Height", i64::from(height));
    dict.set("Filter", Object::Name(b"DCTDecode".to_vec()));
    dict.remove(b"DecodeParms");

    let mut stream = Stream::new(dict, jpeg);
    stream.allows_compression = false;
    Ok(stream)
}
