// src/pipeline.rs - Image + height + location -> type, geometry and price

use std::path::PathBuf;

use image::RgbImage;
use serde::Serialize;

use crate::calibration::ScaleFactor;
use crate::classification::{classify_with_rule, texture_std, ClassificationInput, TattooType};
use crate::config::{Config, WeightedOption};
use crate::contours::{count_holes, extract_contours, Contour};
use crate::errors::{TattooQuoteError, Result};
use crate::image_io::{decode_image, save_gray_image, save_image, InputImage};
use crate::morphology::fill_interiors;
use crate::output::write_json_report;
use crate::pricing::{PriceQuote, PricingEngine, PricingInput};
use crate::render::render_diagnostic_png;
use crate::segmentation::{segment, BinaryMask, Segmentation};
use crate::shape_analysis::{measure_geometry, Measurement};

/// Everything the caller needs to present an image-based estimate
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub tattoo_type: TattooType,
    pub filled_area_cm2: f64,
    pub contour_area_cm2: f64,
    pub perimeter_cm: f64,
    pub contour_count: usize,
    pub hole_count: usize,
    pub texture_std: f64,
    pub px_per_cm: f64,
    pub measurement: Measurement,
    pub price: PriceQuote,
    /// Original | mask | contours, PNG encoded
    #[serde(skip)]
    pub debug_image_png: Option<Vec<u8>>,
    /// Set instead of the image when rendering failed
    pub rendering_notice: Option<String>,
}

/// Intermediate products kept for diagnostics
#[derive(Debug, Clone)]
pub struct AnalysisArtifacts {
    pub image: RgbImage,
    pub segmentation: Segmentation,
    pub contours: Vec<Contour>,
    /// All contours filled solid; the region the texture statistic is taken over
    pub interior: BinaryMask,
    pub scale: ScaleFactor,
}

/// Run every stage on an opaque RGB image
pub fn analyze_rgb(
    image: RgbImage,
    height_cm: f64,
    location_factor: f64,
    engine: &PricingEngine,
) -> Result<(AnalysisResult, AnalysisArtifacts)> {
    if !height_cm.is_finite() || height_cm <= 0.0 {
        return Err(TattooQuoteError::InvalidHeight(format!(
            "height must be greater than 0, got {}",
            height_cm
        )));
    }

    let (width, height) = image.dimensions();
    log::info!("Analyzing {}x{} image printed {:.1} cm tall", width, height, height_cm);

    // Step 1: Scale
    let scale = ScaleFactor::from_height(height, height_cm)?;

    // Step 2: Segment and find contours
    let segmentation = segment(&image);
    let contours = extract_contours(&segmentation.mask)?;
    let contour_count = contours.len();

    // Step 3: Measure
    let measurement = measure_geometry(&segmentation.mask, &contours, scale);
    let geometry = measurement.geometry();

    // Step 4: Classify
    let interior = fill_interiors(&segmentation.mask);
    let texture = texture_std(&segmentation.luminance, &interior);
    let classification_input = ClassificationInput {
        filled_area_cm2: geometry.filled_area_cm2,
        contour_area_cm2: geometry.contour_area_cm2,
        texture_std: texture,
    };
    let (tattoo_type, rule) = classify_with_rule(&classification_input);
    log::debug!(
        "Classified as {} by rule {} (fill ratio {:.3}, texture std {:.1})",
        tattoo_type,
        rule,
        classification_input.fill_ratio(),
        texture
    );

    // Step 5: Price
    let price = engine.calculate_price(&PricingInput {
        filled_area_cm2: geometry.filled_area_cm2,
        contour_area_cm2: geometry.contour_area_cm2,
        perimeter_cm: geometry.perimeter_cm,
        contour_count,
        tattoo_type,
        location_factor,
    });

    // Step 6: Diagnostic image (never affects the price)
    let (debug_image_png, rendering_notice) =
        match render_diagnostic_png(&image, &segmentation.mask, &contours, tattoo_type) {
            Ok(bytes) => (Some(bytes), None),
            Err(failure) => {
                log::warn!("Diagnostic rendering failed: {}", failure.reason);
                (None, Some(failure.notice()))
            }
        };

    log::info!(
        "Estimate: {} design, {:.1} cm², {:.1} cm perimeter, {} contours -> {}",
        tattoo_type,
        geometry.filled_area_cm2,
        geometry.perimeter_cm,
        contour_count,
        price.amount
    );

    let result = AnalysisResult {
        tattoo_type,
        filled_area_cm2: geometry.filled_area_cm2,
        contour_area_cm2: geometry.contour_area_cm2,
        perimeter_cm: geometry.perimeter_cm,
        contour_count,
        hole_count: count_holes(&contours),
        texture_std: texture,
        px_per_cm: scale.px_per_cm(),
        measurement,
        price,
        debug_image_png,
        rendering_notice,
    };

    let artifacts = AnalysisArtifacts {
        image,
        segmentation,
        contours,
        interior,
        scale,
    };

    Ok((result, artifacts))
}

/// Estimate a price from encoded image bytes
pub fn analyze(
    image_bytes: &[u8],
    height_cm: f64,
    location_factor: f64,
    config: &Config,
) -> Result<AnalysisResult> {
    let image = decode_image(image_bytes)?;
    let engine = PricingEngine::new(config.pricing.clone());
    let (result, _) = analyze_rgb(image, height_cm, location_factor, &engine)?;
    Ok(result)
}

/// Analyze a loaded file and, if requested, save its debug artifacts
pub fn process_image(
    input_image: InputImage,
    height_cm: f64,
    location: &WeightedOption,
    config: &Config,
    debug: bool,
) -> Result<AnalysisResult> {
    let InputImage { image, filename, .. } = input_image;

    let engine = PricingEngine::new(config.pricing.clone());
    let (result, artifacts) = analyze_rgb(image, height_cm, location.weight, &engine)?;

    if debug || config.save_debug_images {
        let debug_dir = PathBuf::from(&config.output_base_dir).join("debug");
        std::fs::create_dir_all(&debug_dir)?;

        save_image(&artifacts.image, debug_dir.join(format!("{}_original.png", filename)))?;
        save_gray_image(
            artifacts.segmentation.mask.as_gray(),
            debug_dir.join(format!("{}_binary.png", filename)),
        )?;
        if let Some(bytes) = &result.debug_image_png {
            std::fs::write(debug_dir.join(format!("{}_diagnostic.png", filename)), bytes)?;
        }
        write_json_report(&result, debug_dir.join(format!("{}_report.json", filename)))?;

        log::info!("Saved debug artifacts for {} to {}", filename, debug_dir.display());
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PricingConfig;
    use crate::shape_analysis::measure_geometry;
    use image::Rgb;

    fn engine() -> PricingEngine {
        PricingEngine::new(PricingConfig::default())
    }

    fn white(width: u32, height: u32) -> RgbImage {
        RgbImage::from_pixel(width, height, Rgb([255, 255, 255]))
    }

    #[test]
    fn white_image_has_no_contours() {
        let err = analyze_rgb(white(64, 64), 10.0, 1.0, &engine()).unwrap_err();
        assert!(matches!(err, TattooQuoteError::NoContoursFound));
        assert!(err.requires_retry());
    }

    #[test]
    fn non_positive_height_is_rejected() {
        for height in [0.0, -5.0, f64::NAN] {
            let err = analyze_rgb(white(8, 8), height, 1.0, &engine()).unwrap_err();
            assert!(matches!(err, TattooQuoteError::InvalidHeight(_)));
        }
    }

    #[test]
    fn artifacts_measure_back_to_the_same_geometry() {
        let mut image = white(80, 80);
        for y in 20..60 {
            for x in 20..60 {
                if (x + y) % 9 < 4 {
                    image.put_pixel(x, y, Rgb([0, 0, 0]));
                }
            }
        }

        let (result, artifacts) = analyze_rgb(image, 8.0, 1.0, &engine()).unwrap();
        let again = measure_geometry(&artifacts.segmentation.mask, &artifacts.contours, artifacts.scale);

        assert_eq!(again, result.measurement);
        assert_eq!(artifacts.contours.len(), result.contour_count);
        assert!(result.debug_image_png.is_some());
        assert!(result.rendering_notice.is_none());
    }

    #[test]
    fn price_respects_the_floor_for_tiny_marks() {
        let mut image = white(100, 100);
        image.put_pixel(50, 50, Rgb([0, 0, 0]));
        image.put_pixel(51, 50, Rgb([0, 0, 0]));

        let (result, _) = analyze_rgb(image, 5.0, 1.0, &engine()).unwrap();
        assert_eq!(result.tattoo_type, TattooType::Outline);
        assert_eq!(result.price.amount, PricingConfig::default().minimum_price as u64);
    }
}
