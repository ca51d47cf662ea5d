// src/pricing.rs - Price formulas for the image and questionnaire paths

use serde::Serialize;

use crate::classification::TattooType;
use crate::config::{PricingConfig, SizeOption};

/// Contour counts below this price at the simple tier
pub const SIMPLE_TIER_MAX_CONTOURS: usize = 15;
/// Contour counts below this (and at least 15) price at the standard tier
pub const STANDARD_TIER_MAX_CONTOURS: usize = 500;

pub const SIMPLE_COMPLEXITY: f64 = 0.8;
pub const STANDARD_COMPLEXITY: f64 = 1.0;
pub const INTRICATE_COMPLEXITY: f64 = 1.2;

/// Boundaries for the complexity label shown in reports (not used for pricing)
pub const LOW_LABEL_MAX_CONTOURS: usize = 15;
pub const MEDIUM_LABEL_MAX_CONTOURS: usize = 1000;

/// Price multiplier for how many distinct shapes the design has
pub fn complexity_factor(contour_count: usize) -> f64 {
    if contour_count < SIMPLE_TIER_MAX_CONTOURS {
        SIMPLE_COMPLEXITY
    } else if contour_count < STANDARD_TIER_MAX_CONTOURS {
        STANDARD_COMPLEXITY
    } else {
        INTRICATE_COMPLEXITY
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplexityLevel {
    Low,
    Medium,
    High,
}

impl ComplexityLevel {
    pub fn from_contour_count(contour_count: usize) -> Self {
        if contour_count < LOW_LABEL_MAX_CONTOURS {
            ComplexityLevel::Low
        } else if contour_count < MEDIUM_LABEL_MAX_CONTOURS {
            ComplexityLevel::Medium
        } else {
            ComplexityLevel::High
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ComplexityLevel::Low => "low",
            ComplexityLevel::Medium => "medium",
            ComplexityLevel::High => "high",
        }
    }
}

/// Everything the image price depends on
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PricingInput {
    pub filled_area_cm2: f64,
    pub contour_area_cm2: f64,
    pub perimeter_cm: f64,
    pub contour_count: usize,
    pub tattoo_type: TattooType,
    pub location_factor: f64,
}

/// Why a price fell back to the floor
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricingFailure {
    pub reason: String,
}

/// Final image-based price, never below the configured minimum
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceQuote {
    pub amount: u64,
    /// Set when the formula could not be evaluated and the floor was returned
    pub fallback: Option<PricingFailure>,
}

/// Size answer of the questionnaire
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum SizeWeight {
    Factor(f64),
    /// Large or custom project, priced by the master in person
    Special,
}

impl From<&SizeOption> for SizeWeight {
    fn from(option: &SizeOption) -> Self {
        match (option.special, option.weight) {
            (false, Some(weight)) => SizeWeight::Factor(weight),
            _ => SizeWeight::Special,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QuestionnaireWeights {
    pub type_weight: f64,
    pub location_weight: f64,
    pub size: SizeWeight,
    pub detail_weight: f64,
}

/// Returned instead of a number for special projects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SpecialProjectNotice {
    pub min_sessions: u32,
    pub session_rate: u32,
}

impl SpecialProjectNotice {
    pub fn message(&self) -> String {
        format!(
            "This looks like a fairly large project whose cost is hard to estimate without the master.\n\
             Work like this usually takes at least {} sessions at {} each.\n\
             Please contact the master for details.",
            self.min_sessions, self.session_rate
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuestionnaireQuote {
    Price { amount: u64 },
    SpecialProject(SpecialProjectNotice),
}

/// Price calculator bound to one immutable set of rates
#[derive(Debug, Clone)]
pub struct PricingEngine {
    config: PricingConfig,
}

impl PricingEngine {
    pub fn new(config: PricingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    pub fn minimum_price(&self) -> u64 {
        self.config.minimum_price as u64
    }

    fn filled_price(&self, input: &PricingInput, complexity: f64) -> f64 {
        input.filled_area_cm2 * self.config.rate_per_cm2 * complexity
    }

    fn outline_price(&self, input: &PricingInput, complexity: f64) -> f64 {
        input.perimeter_cm * self.config.rate_per_cm * complexity
    }

    fn try_price(&self, input: &PricingInput) -> Result<u64, String> {
        let signals = [
            ("filled area", input.filled_area_cm2),
            ("contour area", input.contour_area_cm2),
            ("perimeter", input.perimeter_cm),
            ("location factor", input.location_factor),
        ];
        if let Some((name, value)) = signals.iter().find(|(_, v)| !v.is_finite() || *v < 0.0) {
            return Err(format!("{} is {}", name, value));
        }

        let complexity = complexity_factor(input.contour_count);
        let base = match input.tattoo_type {
            TattooType::Filled => self.filled_price(input, complexity),
            TattooType::Outline => self.outline_price(input, complexity),
            TattooType::Mixed => {
                (self.filled_price(input, complexity) + self.outline_price(input, complexity)) / 2.0
            }
        };

        let price = base * input.location_factor;
        if !price.is_finite() || price >= u64::MAX as f64 {
            return Err(format!("price {} is out of range", price));
        }

        // `as` truncates toward zero
        Ok((price as u64).max(self.minimum_price()))
    }

    /// Price a measured design; always returns at least the minimum price
    pub fn calculate_price(&self, input: &PricingInput) -> PriceQuote {
        match self.try_price(input) {
            Ok(amount) => {
                log::debug!(
                    "Price for {} design: {} (complexity {}, location x{})",
                    input.tattoo_type,
                    amount,
                    complexity_factor(input.contour_count),
                    input.location_factor
                );
                PriceQuote { amount, fallback: None }
            }
            Err(reason) => {
                log::warn!("Pricing fell back to the minimum: {}", reason);
                PriceQuote {
                    amount: self.minimum_price(),
                    fallback: Some(PricingFailure { reason }),
                }
            }
        }
    }

    /// Questionnaire price: the minimum price scaled by every answer weight
    pub fn price_from_answers(&self, weights: &QuestionnaireWeights) -> QuestionnaireQuote {
        let size_weight = match weights.size {
            SizeWeight::Special => {
                return QuestionnaireQuote::SpecialProject(SpecialProjectNotice {
                    min_sessions: self.config.special_project_min_sessions,
                    session_rate: self.config.session_rate,
                });
            }
            SizeWeight::Factor(weight) => weight,
        };

        let price = self.config.minimum_price as f64
            * weights.type_weight
            * weights.location_weight
            * size_weight
            * weights.detail_weight;

        let amount = if price.is_finite() && price >= 0.0 && price < u64::MAX as f64 {
            price as u64
        } else {
            log::warn!("Questionnaire price {} is invalid, using the minimum", price);
            self.minimum_price()
        };

        QuestionnaireQuote::Price { amount }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> PricingEngine {
        PricingEngine::new(PricingConfig {
            rate_per_cm2: 100.0,
            rate_per_cm: 150.0,
            minimum_price: 5000,
            session_rate: 15000,
            special_project_min_sessions: 3,
            multi_session_threshold: 30000,
        })
    }

    fn input(tattoo_type: TattooType, filled: f64, perimeter: f64, count: usize) -> PricingInput {
        PricingInput {
            filled_area_cm2: filled,
            contour_area_cm2: filled,
            perimeter_cm: perimeter,
            contour_count: count,
            tattoo_type,
            location_factor: 1.0,
        }
    }

    #[test]
    fn complexity_tier_boundaries() {
        assert_eq!(complexity_factor(0), 0.8);
        assert_eq!(complexity_factor(14), 0.8);
        assert_eq!(complexity_factor(15), 1.0);
        assert_eq!(complexity_factor(499), 1.0);
        assert_eq!(complexity_factor(500), 1.2);
    }

    #[test]
    fn complexity_label_uses_its_own_boundaries() {
        assert_eq!(ComplexityLevel::from_contour_count(14), ComplexityLevel::Low);
        assert_eq!(ComplexityLevel::from_contour_count(15), ComplexityLevel::Medium);
        assert_eq!(ComplexityLevel::from_contour_count(500), ComplexityLevel::Medium);
        assert_eq!(ComplexityLevel::from_contour_count(999), ComplexityLevel::Medium);
        assert_eq!(ComplexityLevel::from_contour_count(1000), ComplexityLevel::High);
    }

    #[test]
    fn formulas_per_type() {
        let engine = engine();
        // 100 cm² * 100 * 1.0
        let filled = engine.calculate_price(&input(TattooType::Filled, 100.0, 80.0, 20));
        assert_eq!(filled.amount, 10000);
        // 80 cm * 150 * 1.0
        let outline = engine.calculate_price(&input(TattooType::Outline, 100.0, 80.0, 20));
        assert_eq!(outline.amount, 12000);
        let mixed = engine.calculate_price(&input(TattooType::Mixed, 100.0, 80.0, 20));
        assert_eq!(mixed.amount, 11000);
        assert!(mixed.fallback.is_none());
    }

    #[test]
    fn location_factor_and_truncation() {
        let engine = engine();
        let mut neck = input(TattooType::Filled, 100.123, 0.0, 600);
        neck.location_factor = 1.5;
        // 100.123 * 100 * 1.2 * 1.5 = 18022.14 -> 18022
        assert_eq!(engine.calculate_price(&neck).amount, 18022);
    }

    #[test]
    fn never_below_the_minimum() {
        let engine = engine();
        for tattoo_type in [TattooType::Filled, TattooType::Outline, TattooType::Mixed] {
            let quote = engine.calculate_price(&input(tattoo_type, 0.0, 0.0, 0));
            assert_eq!(quote.amount, 5000);
            assert!(quote.fallback.is_none());
        }
    }

    #[test]
    fn invalid_inputs_fall_back_to_minimum() {
        let engine = engine();
        let mut bad = input(TattooType::Filled, f64::NAN, 1.0, 3);
        let quote = engine.calculate_price(&bad);
        assert_eq!(quote.amount, 5000);
        assert!(quote.fallback.is_some());

        bad = input(TattooType::Outline, 1.0, 1.0, 3);
        bad.location_factor = -1.0;
        assert_eq!(engine.calculate_price(&bad).amount, 5000);

        bad = input(TattooType::Filled, f64::MAX, 1.0, 3);
        assert_eq!(engine.calculate_price(&bad).amount, 5000);
    }

    #[test]
    fn monotone_in_area_and_perimeter() {
        let engine = engine();
        let mut last_filled = 0;
        let mut last_outline = 0;
        for step in 0..200 {
            let value = step as f64 * 1.7;
            let filled = engine.calculate_price(&input(TattooType::Filled, value, 10.0, 40)).amount;
            let outline = engine.calculate_price(&input(TattooType::Outline, 10.0, value, 40)).amount;
            assert!(filled >= last_filled);
            assert!(outline >= last_outline);
            last_filled = filled;
            last_outline = outline;
        }
    }

    #[test]
    fn questionnaire_multiplies_weights() {
        let engine = engine();
        let quote = engine.price_from_answers(&QuestionnaireWeights {
            type_weight: 1.5,
            location_weight: 1.5,
            size: SizeWeight::Factor(2.0),
            detail_weight: 2.0,
        });
        assert_eq!(quote, QuestionnaireQuote::Price { amount: 45000 });

        let quote = engine.price_from_answers(&QuestionnaireWeights {
            type_weight: 1.0,
            location_weight: 1.0,
            size: SizeWeight::Factor(1.5),
            detail_weight: 0.5,
        });
        assert_eq!(quote, QuestionnaireQuote::Price { amount: 3750 });
    }

    #[test]
    fn special_size_never_yields_a_number() {
        let engine = engine();
        for detail in [0.5, 1.0, 2.0] {
            let quote = engine.price_from_answers(&QuestionnaireWeights {
                type_weight: 1.5,
                location_weight: 1.0,
                size: SizeWeight::Special,
                detail_weight: detail,
            });
            match quote {
                QuestionnaireQuote::SpecialProject(notice) => {
                    assert_eq!(notice.min_sessions, 3);
                    assert_eq!(notice.session_rate, 15000);
                    assert!(notice.message().contains("at least 3 sessions"));
                }
                other => panic!("expected special project notice, got {:?}", other),
            }
        }
    }

    #[test]
    fn size_answers_map_to_weights() {
        let config = crate::config::Config::default();
        let small = config.size_option("0").unwrap();
        let huge = config.size_option("3").unwrap();
        assert_eq!(SizeWeight::from(small), SizeWeight::Factor(1.0));
        assert_eq!(SizeWeight::from(huge), SizeWeight::Special);
    }
}
