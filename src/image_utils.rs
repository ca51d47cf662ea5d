use image::{GrayImage, Rgb, RgbImage};

/// Mask value for design pixels
pub const FOREGROUND: u8 = 255;
/// Mask value for background pixels
pub const BACKGROUND: u8 = 0;

/// Build a normalized 1-D Gaussian kernel with a fixed number of taps
///
/// `taps` must be odd; the weights sum to 1.
pub fn gaussian_kernel(taps: usize, sigma: f32) -> Vec<f32> {
    let radius = (taps / 2) as i32;
    let two_sigma_sq = 2.0 * sigma * sigma;

    let mut kernel: Vec<f32> = (-radius..=radius)
        .map(|i| (-((i * i) as f32) / two_sigma_sq).exp())
        .collect();

    let sum: f32 = kernel.iter().sum();
    for weight in kernel.iter_mut() {
        *weight /= sum;
    }
    kernel
}

/// Check if a point is inside the image bounds
#[inline]
pub fn in_bounds(x: i64, y: i64, width: u32, height: u32) -> bool {
    x >= 0 && y >= 0 && x < width as i64 && y < height as i64
}

/// Expand a single-channel image into RGB
pub fn gray_to_rgb(image: &GrayImage) -> RgbImage {
    let (width, height) = image.dimensions();
    RgbImage::from_fn(width, height, |x, y| {
        let v = image.get_pixel(x, y)[0];
        Rgb([v, v, v])
    })
}

/// Place images side by side, left to right, on a white canvas
///
/// Returns `None` if the combined width does not fit in a `u32`.
pub fn hstack_images(images: &[&RgbImage]) -> Option<RgbImage> {
    let mut total_width: u32 = 0;
    let mut max_height: u32 = 0;
    for image in images {
        total_width = total_width.checked_add(image.width())?;
        max_height = max_height.max(image.height());
    }

    let mut canvas = RgbImage::from_pixel(total_width, max_height, Rgb([255, 255, 255]));
    let mut offset_x = 0;
    for image in images {
        image::imageops::replace(&mut canvas, *image, offset_x as i64, 0);
        offset_x += image.width();
    }

    Some(canvas)
}

/// Paint a `size` x `size` square whose top-left corner is at (x, y), clipped to the image
pub fn plot_square(image: &mut RgbImage, x: i64, y: i64, size: u32, color: [u8; 3]) {
    let (width, height) = image.dimensions();
    for dy in 0..size as i64 {
        for dx in 0..size as i64 {
            let (px, py) = (x + dx, y + dy);
            if in_bounds(px, py, width, height) {
                image.put_pixel(px as u32, py as u32, Rgb(color));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn kernel_is_normalized_and_symmetric() {
        let kernel = gaussian_kernel(7, 1.4);
        assert_eq!(kernel.len(), 7);
        assert_approx_eq!(kernel.iter().sum::<f32>(), 1.0, 1e-6);
        assert_approx_eq!(kernel[0], kernel[6], 1e-9);
        assert!(kernel[3] > kernel[2]);
    }

    #[test]
    fn stacks_side_by_side() {
        let a = RgbImage::from_pixel(2, 3, Rgb([1, 1, 1]));
        let b = RgbImage::from_pixel(4, 1, Rgb([2, 2, 2]));
        let stacked = hstack_images(&[&a, &b]).unwrap();
        assert_eq!(stacked.dimensions(), (6, 3));
        assert_eq!(*stacked.get_pixel(1, 2), Rgb([1, 1, 1]));
        assert_eq!(*stacked.get_pixel(5, 0), Rgb([2, 2, 2]));
        assert_eq!(*stacked.get_pixel(5, 2), Rgb([255, 255, 255]));
    }

    #[test]
    fn plotting_clips_at_edges() {
        let mut image = RgbImage::new(3, 3);
        plot_square(&mut image, 2, 2, 2, [0, 255, 0]);
        plot_square(&mut image, -1, -1, 2, [0, 255, 0]);
        assert_eq!(*image.get_pixel(2, 2), Rgb([0, 255, 0]));
        assert_eq!(*image.get_pixel(0, 0), Rgb([0, 255, 0]));
        assert_eq!(*image.get_pixel(1, 1), Rgb([0, 0, 0]));
    }
}
