// src/config.rs - Pricing calibration, body locations and questionnaire tables

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{TattooQuoteError, Result};

/// Configuration for TattooQuote
///
/// Loaded once at start-up and shared read-only by every analysis.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    #[serde(default = "default_input_path")]
    pub input_path: String,

    #[serde(default = "default_output_base_dir")]
    pub output_base_dir: String,

    #[serde(default = "default_parallel")]
    pub use_parallel: bool,

    /// Save `debug_original.png` / `debug_binary.png` next to each diagnostic image
    #[serde(default)]
    pub save_debug_images: bool,

    #[serde(default)]
    pub pricing: PricingConfig,

    // Body locations offered to the user; the chosen factor multiplies the price
    #[serde(default = "default_locations")]
    pub locations: Vec<WeightedOption>,

    // Questionnaire answer tables
    #[serde(default = "default_type_options")]
    pub type_options: Vec<WeightedOption>,

    #[serde(default = "default_size_options")]
    pub size_options: Vec<SizeOption>,

    #[serde(default = "default_detail_options")]
    pub detail_options: Vec<WeightedOption>,
}

/// Rates and floors the price formulas were calibrated with
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PricingConfig {
    #[serde(default = "default_rate_per_cm2")]
    pub rate_per_cm2: f64,

    #[serde(default = "default_rate_per_cm")]
    pub rate_per_cm: f64,

    /// Floor shared by the image and questionnaire paths
    #[serde(default = "default_minimum_price")]
    pub minimum_price: u32,

    #[serde(default = "default_session_rate")]
    pub session_rate: u32,

    #[serde(default = "default_special_project_min_sessions")]
    pub special_project_min_sessions: u32,

    /// Quotes above this are likely to need several sessions
    #[serde(default = "default_multi_session_threshold")]
    pub multi_session_threshold: u32,
}

/// A labelled answer carrying a price multiplier
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct WeightedOption {
    pub label: String,
    pub weight: f64,
}

/// A size answer; `special` marks a project that needs a master's estimate
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SizeOption {
    pub label: String,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub special: bool,
}

impl WeightedOption {
    fn new(label: &str, weight: f64) -> Self {
        Self { label: label.to_string(), weight }
    }
}

impl SizeOption {
    fn weighted(label: &str, weight: f64) -> Self {
        Self { label: label.to_string(), weight: Some(weight), special: false }
    }

    fn special(label: &str) -> Self {
        Self { label: label.to_string(), weight: None, special: true }
    }
}

fn default_input_path() -> String {
    "./input".to_string()
}

fn default_output_base_dir() -> String {
    "./output".to_string()
}

fn default_parallel() -> bool {
    true
}

fn default_rate_per_cm2() -> f64 {
    100.0
}

fn default_rate_per_cm() -> f64 {
    150.0
}

fn default_minimum_price() -> u32 {
    5000
}

fn default_session_rate() -> u32 {
    15000
}

fn default_special_project_min_sessions() -> u32 {
    3
}

fn default_multi_session_threshold() -> u32 {
    30000
}

fn default_locations() -> Vec<WeightedOption> {
    vec![
        WeightedOption::new("Neck", 1.5),
        WeightedOption::new("Chest", 1.0),
        WeightedOption::new("Shoulder", 1.0),
        WeightedOption::new("Forearm", 1.0),
        WeightedOption::new("Ribs", 1.5),
        WeightedOption::new("Back", 1.0),
        WeightedOption::new("Thigh", 1.0),
        WeightedOption::new("Shin", 1.0),
    ]
}

fn default_type_options() -> Vec<WeightedOption> {
    vec![
        WeightedOption::new("New tattoo", 1.0),
        WeightedOption::new("Cover-up", 1.5),
    ]
}

fn default_size_options() -> Vec<SizeOption> {
    vec![
        SizeOption::weighted("Small (palm-sized or less)", 1.0),
        SizeOption::weighted("Medium (fits A4 with room to spare)", 1.5),
        SizeOption::weighted("Large (slightly bigger than A4)", 2.0),
        SizeOption::special("Very large project (sleeve, thigh, etc.)"),
    ]
}

fn default_detail_options() -> Vec<WeightedOption> {
    vec![
        WeightedOption::new("Low", 0.5),
        WeightedOption::new("Medium", 1.0),
        WeightedOption::new("High", 2.0),
    ]
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            rate_per_cm2: default_rate_per_cm2(),
            rate_per_cm: default_rate_per_cm(),
            minimum_price: default_minimum_price(),
            session_rate: default_session_rate(),
            special_project_min_sessions: default_special_project_min_sessions(),
            multi_session_threshold: default_multi_session_threshold(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_path: default_input_path(),
            output_base_dir: default_output_base_dir(),
            use_parallel: default_parallel(),
            save_debug_images: false,
            pricing: PricingConfig::default(),
            locations: default_locations(),
            type_options: default_type_options(),
            size_options: default_size_options(),
            detail_options: default_detail_options(),
        }
    }
}

/// Find an option by zero-based index or case-insensitive label
fn find_option<'a, T>(
    options: &'a [T],
    key: &str,
    label_of: impl Fn(&T) -> &str,
) -> Option<&'a T> {
    let key = key.trim();
    if let Ok(index) = key.parse::<usize>() {
        return options.get(index);
    }
    options
        .iter()
        .find(|option| label_of(option).eq_ignore_ascii_case(key))
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            TattooQuoteError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| TattooQuoteError::ConfigLoad {
            source: e,
            path: path.to_path_buf(),
        })?;

        Ok(config)
    }

    /// Load the file if it exists, otherwise fall back to defaults
    pub fn from_file_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::from_file(path)
        } else {
            log::info!("Config file '{}' not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let pricing = &self.pricing;

        if !(pricing.rate_per_cm2.is_finite() && pricing.rate_per_cm2 > 0.0) {
            return Err(TattooQuoteError::Config(
                "pricing.rate_per_cm2 must be > 0.0".to_string(),
            ));
        }

        if !(pricing.rate_per_cm.is_finite() && pricing.rate_per_cm > 0.0) {
            return Err(TattooQuoteError::Config(
                "pricing.rate_per_cm must be > 0.0".to_string(),
            ));
        }

        if pricing.minimum_price == 0 {
            return Err(TattooQuoteError::Config(
                "pricing.minimum_price must be > 0".to_string(),
            ));
        }

        if pricing.session_rate == 0 || pricing.special_project_min_sessions == 0 {
            return Err(TattooQuoteError::Config(
                "pricing.session_rate and pricing.special_project_min_sessions must be > 0".to_string(),
            ));
        }

        validate_weights("locations", &self.locations)?;
        validate_weights("type_options", &self.type_options)?;
        validate_weights("detail_options", &self.detail_options)?;

        if self.size_options.is_empty() {
            return Err(TattooQuoteError::Config(
                "size_options must not be empty".to_string(),
            ));
        }

        for option in &self.size_options {
            match (option.special, option.weight) {
                (true, _) => {}
                (false, Some(w)) if w.is_finite() && w > 0.0 => {}
                _ => {
                    return Err(TattooQuoteError::Config(format!(
                        "size option '{}' needs a weight > 0.0 or special = true",
                        option.label
                    )));
                }
            }
        }

        Ok(())
    }

    /// Ensure the input path exists (batch and single-file runs)
    pub fn validate_input_path(&self) -> Result<PathBuf> {
        let input_path = PathBuf::from(&self.input_path);
        if !input_path.exists() {
            return Err(TattooQuoteError::InvalidPath(input_path));
        }
        Ok(input_path)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| {
            TattooQuoteError::Config(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(path, content)?;

        Ok(())
    }

    /// Look up a body location by index or label
    pub fn location(&self, key: &str) -> Result<&WeightedOption> {
        find_option(&self.locations, key, |o| o.label.as_str())
            .ok_or_else(|| TattooQuoteError::InvalidLocation(key.to_string()))
    }

    pub fn type_option(&self, key: &str) -> Result<&WeightedOption> {
        find_option(&self.type_options, key, |o| o.label.as_str())
            .ok_or_else(|| TattooQuoteError::InvalidAnswer(format!("type '{}'", key)))
    }

    pub fn size_option(&self, key: &str) -> Result<&SizeOption> {
        find_option(&self.size_options, key, |o| o.label.as_str())
            .ok_or_else(|| TattooQuoteError::InvalidAnswer(format!("size '{}'", key)))
    }

    pub fn detail_option(&self, key: &str) -> Result<&WeightedOption> {
        find_option(&self.detail_options, key, |o| o.label.as_str())
            .ok_or_else(|| TattooQuoteError::InvalidAnswer(format!("detail '{}'", key)))
    }
}

fn validate_weights(name: &str, options: &[WeightedOption]) -> Result<()> {
    if options.is_empty() {
        return Err(TattooQuoteError::Config(format!("{} must not be empty", name)));
    }
    for option in options {
        if !(option.weight.is_finite() && option.weight > 0.0) {
            return Err(TattooQuoteError::Config(format!(
                "{}: weight for '{}' must be > 0.0",
                name, option.label
            )));
        }
    }
    Ok(())
}
