// src/segmentation.rs - Separate the drawn design from its background

use image::{GrayImage, Luma, RgbImage};
use imageproc::contrast::otsu_level;
use imageproc::filter::separable_filter_equal;

use crate::image_utils::{gaussian_kernel, gray_to_rgb, BACKGROUND, FOREGROUND};
use crate::morphology::close_mask;

/// Smoothing kernel size; sigma is the one a 7-tap Gaussian implies
pub const BLUR_KERNEL_SIZE: usize = 7;
pub const BLUR_SIGMA: f32 = 1.4;

/// Neighbourhood for the adaptive threshold
pub const ADAPTIVE_BLOCK_SIZE: usize = 21;
pub const ADAPTIVE_SIGMA: f32 = 3.5;
/// A pixel must be this much darker than its local mean to count as ink
pub const ADAPTIVE_OFFSET: f32 = 10.0;

/// Foreground/background classification of every pixel
///
/// Values are only ever `FOREGROUND` or `BACKGROUND`.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryMask {
    image: GrayImage,
}

impl BinaryMask {
    /// Build a mask by evaluating `is_foreground` for every pixel
    pub fn from_fn<F>(width: u32, height: u32, mut is_foreground: F) -> Self
    where
        F: FnMut(u32, u32) -> bool,
    {
        let image = GrayImage::from_fn(width, height, |x, y| {
            Luma([if is_foreground(x, y) { FOREGROUND } else { BACKGROUND }])
        });
        Self { image }
    }

    /// Any non-zero value is foreground
    pub fn from_gray(gray: &GrayImage) -> Self {
        let (width, height) = gray.dimensions();
        Self::from_fn(width, height, |x, y| gray.get_pixel(x, y)[0] != BACKGROUND)
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    #[inline]
    pub fn is_foreground(&self, x: u32, y: u32) -> bool {
        self.image.get_pixel(x, y)[0] == FOREGROUND
    }

    pub fn foreground_count(&self) -> u64 {
        self.image.as_raw().iter().filter(|&&v| v == FOREGROUND).count() as u64
    }

    /// Foreground if set in either mask
    pub fn union(&self, other: &BinaryMask) -> BinaryMask {
        let (width, height) = self.dimensions();
        BinaryMask::from_fn(width, height, |x, y| {
            self.is_foreground(x, y) || other.is_foreground(x, y)
        })
    }

    pub fn as_gray(&self) -> &GrayImage {
        &self.image
    }

    pub fn to_rgb(&self) -> RgbImage {
        gray_to_rgb(&self.image)
    }
}

/// Output of the segmenter
#[derive(Debug, Clone)]
pub struct Segmentation {
    /// Smoothed luminance, reused for the texture statistic
    pub luminance: GrayImage,
    pub otsu_level: u8,
    pub mask: BinaryMask,
}

/// Convert to single-channel luminance
pub fn to_luminance(image: &RgbImage) -> GrayImage {
    image::imageops::grayscale(image)
}

/// Suppress scan and compression noise with the fixed 7x7 Gaussian
///
/// Edge pixels are repeated past the border.
pub fn smooth_luminance(gray: &GrayImage) -> GrayImage {
    separable_filter_equal(gray, &gaussian_kernel(BLUR_KERNEL_SIZE, BLUR_SIGMA))
}

/// Global inverse Otsu threshold: pixels at or below the level are ink
pub fn global_threshold(gray: &GrayImage) -> (BinaryMask, u8) {
    let level = otsu_level(gray);
    let (width, height) = gray.dimensions();
    let mask = BinaryMask::from_fn(width, height, |x, y| gray.get_pixel(x, y)[0] <= level);
    (mask, level)
}

/// Adaptive inverse threshold against a Gaussian-weighted local mean
///
/// Recovers faint or unevenly lit strokes the global level misses.
pub fn adaptive_threshold(gray: &GrayImage) -> BinaryMask {
    let (width, height) = gray.dimensions();
    let local_mean = separable_filter_equal(gray, &gaussian_kernel(ADAPTIVE_BLOCK_SIZE, ADAPTIVE_SIGMA));

    BinaryMask::from_fn(width, height, |x, y| {
        let mean = local_mean.get_pixel(x, y)[0] as f32;
        gray.get_pixel(x, y)[0] as f32 <= mean - ADAPTIVE_OFFSET
    })
}

/// Run the full segmentation chain on an opaque RGB image
pub fn segment(image: &RgbImage) -> Segmentation {
    let luminance = smooth_luminance(&to_luminance(image));

    let (global, level) = global_threshold(&luminance);
    let adaptive = adaptive_threshold(&luminance);
    let mask = close_mask(&global.union(&adaptive));

    log::debug!(
        "Segmentation: otsu level {}, global {} px, adaptive {} px, closed {} px",
        level,
        global.foreground_count(),
        adaptive.foreground_count(),
        mask.foreground_count()
    );

    Segmentation {
        luminance,
        otsu_level: level,
        mask,
    }
}
