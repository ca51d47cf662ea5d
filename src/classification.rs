// src/classification.rs - Outline / filled / mixed decision for a measured design

use std::fmt;

use image::GrayImage;
use serde::{Deserialize, Serialize};

use crate::segmentation::BinaryMask;

/// Below this filled area the fill signal is not trusted
pub const MIN_TRUSTED_FILLED_AREA_CM2: f64 = 1.0;
/// Added to the contour area before dividing
pub const FILL_RATIO_EPSILON: f64 = 1e-5;
pub const FILLED_MIN_RATIO: f64 = 0.7;
pub const MIXED_MIN_RATIO: f64 = 0.2;
/// Luminance standard deviation separating flat fills from detailed work
pub const TEXTURE_STD_LIMIT: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TattooType {
    Outline,
    Filled,
    Mixed,
}

impl TattooType {
    /// Human readable name used in reports
    pub fn display_name(self) -> &'static str {
        match self {
            TattooType::Outline => "Outline",
            TattooType::Filled => "Filled",
            TattooType::Mixed => "Mixed",
        }
    }
}

impl fmt::Display for TattooType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TattooType::Outline => "outline",
            TattooType::Filled => "filled",
            TattooType::Mixed => "mixed",
        };
        f.write_str(name)
    }
}

/// Signals the decision table looks at
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassificationInput {
    pub filled_area_cm2: f64,
    pub contour_area_cm2: f64,
    pub texture_std: f64,
}

impl ClassificationInput {
    pub fn fill_ratio(&self) -> f64 {
        fill_ratio(self.filled_area_cm2, self.contour_area_cm2)
    }
}

/// Condition of one row in the decision table
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Condition {
    FilledAreaBelow(f64),
    RatioAboveAndTextureBelow { ratio: f64, texture_std: f64 },
    RatioAboveOrTextureAbove { ratio: f64, texture_std: f64 },
    Always,
}

impl Condition {
    fn matches(&self, input: &ClassificationInput) -> bool {
        match *self {
            Condition::FilledAreaBelow(limit) => input.filled_area_cm2 < limit,
            Condition::RatioAboveAndTextureBelow { ratio, texture_std } => {
                input.fill_ratio() > ratio && input.texture_std < texture_std
            }
            Condition::RatioAboveOrTextureAbove { ratio, texture_std } => {
                input.fill_ratio() > ratio || input.texture_std > texture_std
            }
            Condition::Always => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassificationRule {
    pub condition: Condition,
    pub outcome: TattooType,
}

/// Rules evaluated top to bottom; the first match wins
pub const CLASSIFICATION_RULES: [ClassificationRule; 4] = [
    ClassificationRule {
        condition: Condition::FilledAreaBelow(MIN_TRUSTED_FILLED_AREA_CM2),
        outcome: TattooType::Outline,
    },
    ClassificationRule {
        condition: Condition::RatioAboveAndTextureBelow {
            ratio: FILLED_MIN_RATIO,
            texture_std: TEXTURE_STD_LIMIT,
        },
        outcome: TattooType::Filled,
    },
    ClassificationRule {
        condition: Condition::RatioAboveOrTextureAbove {
            ratio: MIXED_MIN_RATIO,
            texture_std: TEXTURE_STD_LIMIT,
        },
        outcome: TattooType::Mixed,
    },
    ClassificationRule {
        condition: Condition::Always,
        outcome: TattooType::Outline,
    },
];

/// Filled area over the (overestimated) contour box area
pub fn fill_ratio(filled_area_cm2: f64, contour_area_cm2: f64) -> f64 {
    filled_area_cm2 / (contour_area_cm2 + FILL_RATIO_EPSILON)
}

/// Classify and report which table row decided
pub fn classify_with_rule(input: &ClassificationInput) -> (TattooType, usize) {
    CLASSIFICATION_RULES
        .iter()
        .enumerate()
        .find(|(_, rule)| rule.condition.matches(input))
        .map(|(index, rule)| (rule.outcome, index))
        .unwrap_or((TattooType::Outline, CLASSIFICATION_RULES.len() - 1))
}

pub fn classify(input: &ClassificationInput) -> TattooType {
    classify_with_rule(input).0
}

/// Population standard deviation of luminance inside the region
///
/// Returns 0 for an empty region.
pub fn texture_std(luminance: &GrayImage, region: &BinaryMask) -> f64 {
    let (width, height) = region.dimensions();
    let mut count = 0u64;
    let mut sum = 0.0f64;
    let mut sum_sq = 0.0f64;

    for y in 0..height {
        for x in 0..width {
            if region.is_foreground(x, y) {
                let v = luminance.get_pixel(x, y)[0] as f64;
                count += 1;
                sum += v;
                sum_sq += v * v;
            }
        }
    }

    if count == 0 {
        return 0.0;
    }

    let mean = sum / count as f64;
    let variance = (sum_sq / count as f64 - mean * mean).max(0.0);
    variance.sqrt()
}
