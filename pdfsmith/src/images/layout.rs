//! Page geometry for image pages.
//!
//! Image pixels are taken at 96 DPI. Sizes are worked out in millimetres
//! and converted to PDF points at the end.

use serde::Serialize;

use crate::config::{ImageLayout, Orientation, PageFit};

/// Millimetres per pixel at 96 DPI.
pub const PX_TO_MM: f64 = 0.264583;

/// Points per millimetre.
pub const MM_TO_PT: f64 = 72.0 / 25.4;

/// A4 short side in millimetres.
pub const A4_WIDTH_MM: f64 = 210.0;

/// A4 long side in millimetres.
pub const A4_HEIGHT_MM: f64 = 297.0;

/// Page size and image rectangle, in points from the lower-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Placement {
    /// Page width.
    pub page_width: f64,
    /// Page height.
    pub page_height: f64,
    /// Left edge of the image.
    pub x: f64,
    /// Bottom edge of the image.
    pub y: f64,
    /// Drawn image width.
    pub width: f64,
    /// Drawn image height.
    pub height: f64,
}

/// Where an image of `width_px` × `height_px` goes on its page.
///
/// ```
/// use pdfsmith::config::ImageLayout;
/// use pdfsmith::images::layout::{compute_placement, MM_TO_PT};
///
/// let placement = compute_placement(800, 600, &ImageLayout::default());
/// assert!((placement.page_width - 210.0 * MM_TO_PT).abs() < 1e-6);
/// ```
pub fn compute_placement(width_px: u32, height_px: u32, layout: &ImageLayout) -> Placement {
    let image_w = f64::from(width_px) * PX_TO_MM;
    let image_h = f64::from(height_px) * PX_TO_MM;
    let margin = layout.margin.millimetres();

    let (page_w, page_h, x, y, w, h) = match layout.fit {
        PageFit::Original => (
            image_w + 2.0 * margin,
            image_h + 2.0 * margin,
            margin,
            margin,
            image_w,
            image_h,
        ),
        PageFit::Fit | PageFit::Shrink => {
            let landscape = match layout.orientation {
                Orientation::Portrait => false,
                Orientation::Landscape => true,
                Orientation::Auto => width_px > height_px,
            };
            let (page_w, page_h) = if landscape {
                (A4_HEIGHT_MM, A4_WIDTH_MM)
            } else {
                (A4_WIDTH_MM, A4_HEIGHT_MM)
            };

            let avail_w = page_w - 2.0 * margin;
            let avail_h = page_h - 2.0 * margin;
            let mut scale = (avail_w / image_w).min(avail_h / image_h);
            if layout.fit == PageFit::Shrink {
                scale = scale.min(1.0);
            }

            let (w, h) = (image_w * scale, image_h * scale);
            (
                page_w,
                page_h,
                margin + (avail_w - w) / 2.0,
                margin + (avail_h - h) / 2.0,
                w,
                h,
            )
        }
    };

    Placement {
        page_width: page_w * MM_TO_PT,
        page_height: page_h * MM_TO_PT,
        x: x * MM_TO_PT,
        y: y * MM_TO_PT,
        width: w * MM_TO_PT,
        height: h * MM_TO_PT,
    }
}
