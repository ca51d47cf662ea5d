use thiserror::Error;
use std::io;
use std::path::PathBuf;

/// Custom error types for TattooQuote
#[derive(Error, Debug)]
pub enum TattooQuoteError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load configuration from {path}: {source}")]
    ConfigLoad {
        source: toml::de::Error,
        path: PathBuf,
    },

    /// Height text was not a number or not greater than zero
    #[error("Invalid height: {0}")]
    InvalidHeight(String),

    /// Scale calibration was asked to divide by a non-positive value
    #[error("Invalid scale: image height {pixel_height} px over {height_cm} cm")]
    InvalidScale {
        pixel_height: u32,
        height_cm: f64,
    },

    /// Segmentation produced no foreground, so there is nothing to measure
    #[error("No contours found in image")]
    NoContoursFound,

    #[error("Unknown body location: {0}")]
    InvalidLocation(String),

    #[error("Invalid questionnaire answer: {0}")]
    InvalidAnswer(String),

    #[error("CSV output error: {0}")]
    CsvOutput(#[from] csv::Error),

    #[error("JSON output error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid input path: {0}")]
    InvalidPath(PathBuf),

    #[error("Unexpected error: {0}")]
    Other(String),
}

impl TattooQuoteError {
    /// Whether the caller should ask the user for new input and retry.
    pub fn requires_retry(&self) -> bool {
        matches!(
            self,
            TattooQuoteError::InvalidHeight(_) | TattooQuoteError::NoContoursFound
        )
    }
}

/// Type alias for Result with our custom error type
pub type Result<T> = std::result::Result<T, TattooQuoteError>;
