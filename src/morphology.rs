use std::collections::HashSet;

use image::{GrayImage, Luma};
use imageproc::distance_transform::Norm;
use imageproc::region_labelling::{connected_components, Connectivity};

use crate::image_utils::{BACKGROUND, FOREGROUND};
use crate::segmentation::BinaryMask;

/// Radius of the square structuring element used for closing (3x3)
pub const CLOSING_RADIUS: u8 = 1;

/// Morphological closing (dilation followed by erosion) with a 3x3 square
///
/// Fills pinholes and hairline gaps between strokes.
pub fn close_mask(mask: &BinaryMask) -> BinaryMask {
    let closed = imageproc::morphology::close(mask.as_gray(), Norm::LInf, CLOSING_RADIUS);
    BinaryMask::from_gray(&closed)
}

/// Union of all contour interiors, every contour filled solid
///
/// Background regions that cannot reach the image border through
/// 4-connected background are enclosed by some contour, so they are filled
/// together with the foreground itself.
pub fn fill_interiors(mask: &BinaryMask) -> BinaryMask {
    let (width, height) = mask.dimensions();
    if width == 0 || height == 0 {
        return mask.clone();
    }

    // Invert so the background becomes the labelled value
    let inverted = GrayImage::from_fn(width, height, |x, y| {
        Luma([if mask.is_foreground(x, y) { BACKGROUND } else { FOREGROUND }])
    });
    let labels = connected_components(&inverted, Connectivity::Four, Luma([BACKGROUND]));

    let mut outside = HashSet::new();
    for x in 0..width {
        outside.insert(labels.get_pixel(x, 0)[0]);
        outside.insert(labels.get_pixel(x, height.saturating_sub(1))[0]);
    }
    for y in 0..height {
        outside.insert(labels.get_pixel(0, y)[0]);
        outside.insert(labels.get_pixel(width.saturating_sub(1), y)[0]);
    }

    BinaryMask::from_fn(width, height, |x, y| {
        let label = labels.get_pixel(x, y)[0];
        label == 0 || !outside.contains(&label)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring(size: u32, inset: u32) -> BinaryMask {
        BinaryMask::from_fn(size, size, |x, y| {
            let on_x = x == inset || x == size - 1 - inset;
            let on_y = y == inset || y == size - 1 - inset;
            let within = x >= inset && x <= size - 1 - inset && y >= inset && y <= size - 1 - inset;
            within && (on_x || on_y)
        })
    }

    #[test]
    fn closing_fills_single_pixel_hole() {
        let mask = BinaryMask::from_fn(9, 9, |x, y| {
            (2..7).contains(&x) && (2..7).contains(&y) && !(x == 4 && y == 4)
        });
        let closed = close_mask(&mask);
        assert!(closed.is_foreground(4, 4));
        assert!(!closed.is_foreground(0, 0));
        assert_eq!(closed.foreground_count(), 25);
    }

    #[test]
    fn ring_interior_is_filled() {
        let mask = ring(10, 2);
        let filled = fill_interiors(&mask);
        assert!(filled.is_foreground(5, 5));
        assert!(filled.is_foreground(2, 2));
        assert!(!filled.is_foreground(0, 0));
        assert!(!filled.is_foreground(9, 5));
        assert_eq!(filled.foreground_count(), 36);
    }

    #[test]
    fn shape_touching_border_keeps_outside_background() {
        let mask = BinaryMask::from_fn(6, 6, |x, _| x == 0);
        let filled = fill_interiors(&mask);
        assert_eq!(filled.foreground_count(), 6);
    }

    #[test]
    fn empty_mask_stays_empty() {
        let mask = BinaryMask::from_fn(5, 5, |_, _| false);
        assert_eq!(fill_interiors(&mask).foreground_count(), 0);
    }
}
