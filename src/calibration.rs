// src/calibration.rs - Pixel to centimetre scale from a user supplied height

use serde::Serialize;

use crate::errors::{TattooQuoteError, Result};

/// Pixels per centimetre for one analysis
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScaleFactor(f64);

impl ScaleFactor {
    /// Derive the scale from the image height in pixels and the height the
    /// design should have on the skin.
    pub fn from_height(pixel_height: u32, height_cm: f64) -> Result<Self> {
        if pixel_height == 0 || !height_cm.is_finite() || height_cm <= 0.0 {
            return Err(TattooQuoteError::InvalidScale { pixel_height, height_cm });
        }
        Ok(Self(pixel_height as f64 / height_cm))
    }

    pub fn px_per_cm(self) -> f64 {
        self.0
    }

    /// Convert a pixel count to square centimetres
    pub fn area_to_cm2(self, area_px: f64) -> f64 {
        area_px / (self.0 * self.0)
    }

    /// Convert a pixel length to centimetres
    pub fn length_to_cm(self, length_px: f64) -> f64 {
        length_px / self.0
    }
}

/// Parse a height typed by the user, e.g. `"10"`, `"12.5"` or `"12,5"`
pub fn parse_height(text: &str) -> Result<f64> {
    let normalized = text.trim().replace(',', ".");
    let height: f64 = normalized
        .parse()
        .map_err(|_| TattooQuoteError::InvalidHeight(format!("'{}' is not a number", text.trim())))?;

    if !height.is_finite() || height <= 0.0 {
        return Err(TattooQuoteError::InvalidHeight(format!(
            "height must be greater than 0, got {}",
            text.trim()
        )));
    }

    Ok(height)
}
