// src/lib.rs - Library interface for TattooQuote

pub mod calibration;
pub mod classification;
pub mod config;
pub mod contours;
pub mod errors;
pub mod font;
pub mod image_io;
pub mod image_utils;
pub mod morphology;
pub mod output;
pub mod pipeline;
pub mod pricing;
pub mod render;
pub mod report;
pub mod segmentation;
pub mod shape_analysis;

// Re-export commonly used types and functions
pub use errors::{TattooQuoteError, Result};
pub use config::{Config, PricingConfig};
pub use pipeline::{analyze, analyze_rgb, process_image, AnalysisResult};
pub use image_io::{InputImage, load_image, save_image};
pub use calibration::{parse_height, ScaleFactor};

// Re-export the estimation stages
pub use segmentation::{segment, BinaryMask, Segmentation};
pub use contours::{extract_contours, Contour};
pub use shape_analysis::{measure_geometry, GeometryMeasurement, Measurement};
pub use classification::{classify, TattooType};
pub use render::{render_diagnostic_png, RenderingFailed};

// Re-export pricing
pub use pricing::{
    PriceQuote,
    PricingEngine,
    PricingFailure,
    QuestionnaireQuote,
    QuestionnaireWeights,
    SizeWeight,
    SpecialProjectNotice,
};

pub use report::{format_analysis_report, format_questionnaire_summary, QuestionnaireLabels};
