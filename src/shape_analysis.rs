// src/shape_analysis.rs - Physical area and perimeter of the segmented design

use serde::Serialize;

use crate::calibration::ScaleFactor;
use crate::contours::Contour;
use crate::segmentation::BinaryMask;

/// Geometry of a design in physical units
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct GeometryMeasurement {
    /// Foreground pixels converted to cm²
    pub filled_area_cm2: f64,
    /// Sum of per-contour bounding boxes in cm²; nested boxes overlap and are
    /// counted again, the price rates are calibrated against this
    pub contour_area_cm2: f64,
    pub perimeter_cm: f64,
}

/// Result of measuring: either real numbers or zeros with the reason
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Measurement {
    Healthy(GeometryMeasurement),
    Degraded {
        zeroed: GeometryMeasurement,
        reason: String,
    },
}

impl Measurement {
    pub fn geometry(&self) -> GeometryMeasurement {
        match self {
            Measurement::Healthy(geometry) => *geometry,
            Measurement::Degraded { zeroed, .. } => *zeroed,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Measurement::Degraded { .. })
    }

    pub fn degradation_reason(&self) -> Option<&str> {
        match self {
            Measurement::Healthy(_) => None,
            Measurement::Degraded { reason, .. } => Some(reason),
        }
    }
}

/// Count the foreground pixels of the mask
pub fn calculate_filled_pixels(mask: &BinaryMask) -> u64 {
    mask.foreground_count()
}

/// Sum of bounding-box areas over all contours, in pixels
pub fn calculate_contour_box_area(contours: &[Contour]) -> u64 {
    contours
        .iter()
        .filter_map(Contour::bounding_box)
        .map(|bbox| bbox.area())
        .sum()
}

/// Total closed arc length over all contours, in pixels
pub fn calculate_perimeter_px(contours: &[Contour]) -> f64 {
    contours.iter().map(Contour::arc_length).sum()
}

fn check_contours_within(mask: &BinaryMask, contours: &[Contour]) -> Result<(), String> {
    let (width, height) = mask.dimensions();
    for (index, contour) in contours.iter().enumerate() {
        let outside = contour.points.iter().find(|&&(x, y)| {
            x < 0 || y < 0 || x as i64 >= width as i64 || y as i64 >= height as i64
        });
        if let Some(&(x, y)) = outside {
            return Err(format!(
                "contour {} has point ({}, {}) outside the {}x{} mask",
                index, x, y, width, height
            ));
        }
    }
    Ok(())
}

fn try_measure(
    mask: &BinaryMask,
    contours: &[Contour],
    scale: ScaleFactor,
) -> Result<GeometryMeasurement, String> {
    let px_per_cm = scale.px_per_cm();
    if !px_per_cm.is_finite() || px_per_cm <= 0.0 {
        return Err(format!("scale {} px/cm is not usable", px_per_cm));
    }

    check_contours_within(mask, contours)?;

    let filled_px = calculate_filled_pixels(mask);
    let box_px = calculate_contour_box_area(contours);
    let perimeter_px = calculate_perimeter_px(contours);

    let geometry = GeometryMeasurement {
        filled_area_cm2: scale.area_to_cm2(filled_px as f64),
        contour_area_cm2: scale.area_to_cm2(box_px as f64),
        perimeter_cm: scale.length_to_cm(perimeter_px),
    };

    let values = [geometry.filled_area_cm2, geometry.contour_area_cm2, geometry.perimeter_cm];
    if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
        return Err(format!("measurement produced invalid values {:?}", values));
    }

    log::debug!(
        "Geometry: filled {} px -> {:.2} cm², boxes {} px -> {:.2} cm², perimeter {:.1} px -> {:.2} cm ({:.1} px/cm)",
        filled_px,
        geometry.filled_area_cm2,
        box_px,
        geometry.contour_area_cm2,
        perimeter_px,
        geometry.perimeter_cm,
        px_per_cm
    );

    Ok(geometry)
}

/// Measure filled area, contour box area and perimeter in physical units
///
/// Never fails: any internal problem yields zeroed geometry with a reason,
/// which still prices at the floor.
pub fn measure_geometry(mask: &BinaryMask, contours: &[Contour], scale: ScaleFactor) -> Measurement {
    match try_measure(mask, contours, scale) {
        Ok(geometry) => Measurement::Healthy(geometry),
        Err(reason) => {
            log::warn!("Measurement degraded: {}", reason);
            Measurement::Degraded {
                zeroed: GeometryMeasurement::default(),
                reason,
            }
        }
    }
}
