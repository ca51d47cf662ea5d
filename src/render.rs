// src/render.rs - Side-by-side diagnostic image: original | mask | contours

use bresenham::Bresenham;
use image::RgbImage;
use serde::Serialize;

use crate::classification::TattooType;
use crate::contours::Contour;
use crate::font::{glyph, GLYPH_HEIGHT, GLYPH_WIDTH};
use crate::image_io::encode_png;
use crate::image_utils::{hstack_images, plot_square};
use crate::segmentation::BinaryMask;

pub const CONTOUR_COLOR: [u8; 3] = [0, 255, 0];
pub const CONTOUR_THICKNESS: u32 = 2;
pub const LABEL_COLOR: [u8; 3] = [255, 0, 0];
pub const LABEL_SCALE: u32 = 2;
pub const LABEL_ORIGIN: (i64, i64) = (10, 16);

/// The diagnostic image could not be produced; the analysis itself is unaffected
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderingFailed {
    pub reason: String,
}

impl RenderingFailed {
    /// Text shown to the user in place of the image
    pub fn notice(&self) -> String {
        "Could not visualize the processing steps.".to_string()
    }
}

/// Draw text with the bitmap font, each font pixel becoming a `scale` x `scale` block
pub fn draw_text(image: &mut RgbImage, text: &str, x: i64, y: i64, scale: u32, color: [u8; 3]) {
    let advance = ((GLYPH_WIDTH + 1) as u32 * scale) as i64;
    let mut cursor_x = x;

    for c in text.chars() {
        let bitmap = glyph(c);
        for (row, bits) in bitmap.iter().enumerate().take(GLYPH_HEIGHT) {
            for col in 0..GLYPH_WIDTH {
                if bits & (0b10000 >> col) != 0 {
                    let px = cursor_x + (col as u32 * scale) as i64;
                    let py = y + (row as u32 * scale) as i64;
                    plot_square(image, px, py, scale, color);
                }
            }
        }
        cursor_x += advance;
    }
}

/// Draw every contour as a closed polyline
pub fn draw_contours(image: &mut RgbImage, contours: &[Contour], color: [u8; 3], thickness: u32) {
    for contour in contours {
        let n = contour.points.len();
        if n == 1 {
            let (x, y) = contour.points[0];
            plot_square(image, x as i64, y as i64, thickness, color);
            continue;
        }

        for i in 0..n {
            let (x0, y0) = contour.points[i];
            let (x1, y1) = contour.points[(i + 1) % n];
            let segment = Bresenham::new((x0 as isize, y0 as isize), (x1 as isize, y1 as isize));
            for (x, y) in segment {
                plot_square(image, x as i64, y as i64, thickness, color);
            }
        }
    }
}

/// Compose original | mask | original with contours, labelled with the detected type
pub fn render_diagnostic(
    original: &RgbImage,
    mask: &BinaryMask,
    contours: &[Contour],
    tattoo_type: TattooType,
) -> Result<RgbImage, RenderingFailed> {
    if original.dimensions() != mask.dimensions() {
        return Err(RenderingFailed {
            reason: format!(
                "mask is {:?} but image is {:?}",
                mask.dimensions(),
                original.dimensions()
            ),
        });
    }

    let mask_rgb = mask.to_rgb();
    let mut with_contours = original.clone();
    draw_contours(&mut with_contours, contours, CONTOUR_COLOR, CONTOUR_THICKNESS);

    let mut panel = hstack_images(&[original, &mask_rgb, &with_contours]).ok_or_else(|| {
        RenderingFailed {
            reason: "combined width overflows".to_string(),
        }
    })?;

    let label = format!("Type: {}", tattoo_type);
    draw_text(&mut panel, &label, LABEL_ORIGIN.0, LABEL_ORIGIN.1, LABEL_SCALE, LABEL_COLOR);

    Ok(panel)
}

/// Render and encode the diagnostic image as PNG
pub fn render_diagnostic_png(
    original: &RgbImage,
    mask: &BinaryMask,
    contours: &[Contour],
    tattoo_type: TattooType,
) -> Result<Vec<u8>, RenderingFailed> {
    let panel = render_diagnostic(original, mask, contours, tattoo_type)?;
    encode_png(&panel).map_err(|e| RenderingFailed {
        reason: e.to_string(),
    })
}
