// src/report.rs - User facing texts for both estimation paths

use crate::pipeline::AnalysisResult;
use crate::pricing::{ComplexityLevel, PricingEngine, QuestionnaireQuote};

/// Chosen questionnaire answers, by label
#[derive(Debug, Clone)]
pub struct QuestionnaireLabels<'a> {
    pub tattoo_type: &'a str,
    pub location: &'a str,
    pub size: &'a str,
    pub detail: &'a str,
}

fn multi_session_advice(engine: &PricingEngine) -> String {
    let config = engine.config();
    format!(
        "If the price comes out above {}, the work is most likely done over several sessions.\n\
         Multi-session work is paid per session, {} each.",
        config.multi_session_threshold, config.session_rate
    )
}

/// Report for an image-based estimate
pub fn format_analysis_report(
    result: &AnalysisResult,
    location_label: &str,
    engine: &PricingEngine,
) -> String {
    let complexity = ComplexityLevel::from_contour_count(result.contour_count);
    let mut report = format!(
        "Analysis results:\n\
         ▸ Type: {}\n\
         ▸ Location: {}\n\
         ▸ Area: {:.1} cm²\n\
         ▸ Perimeter: {:.1} cm\n\
         ▸ Contours: {} ({} complexity)\n\
         Estimated price: {}\n",
        result.tattoo_type.display_name(),
        location_label,
        result.filled_area_cm2,
        result.perimeter_cm,
        result.contour_count,
        complexity.label(),
        result.price.amount,
    );

    if let Some(reason) = result.measurement.degradation_reason() {
        report.push_str(&format!("Note: measurement failed ({}), showing the minimum price.\n", reason));
    }
    if let Some(notice) = &result.rendering_notice {
        report.push_str(notice);
        report.push('\n');
    }

    report.push('\n');
    report.push_str(&multi_session_advice(engine));
    report
}

/// Summary for a questionnaire estimate
pub fn format_questionnaire_summary(
    labels: &QuestionnaireLabels<'_>,
    quote: &QuestionnaireQuote,
    engine: &PricingEngine,
) -> String {
    match quote {
        QuestionnaireQuote::SpecialProject(notice) => notice.message(),
        QuestionnaireQuote::Price { amount } => format!(
            "Your answers:\n\
             ▸ Type: {}\n\
             ▸ Location: {}\n\
             ▸ Size: {}\n\
             ▸ Detail: {}\n\n\
             ▸ Estimated price: {}\n\n{}",
            labels.tattoo_type,
            labels.location,
            labels.size,
            labels.detail,
            amount,
            multi_session_advice(engine)
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classification::TattooType;
    use crate::config::PricingConfig;
    use crate::pricing::{PriceQuote, SpecialProjectNotice};
    use crate::shape_analysis::{GeometryMeasurement, Measurement};

    fn result(contour_count: usize) -> AnalysisResult {
        let geometry = GeometryMeasurement {
            filled_area_cm2: 12.34,
            contour_area_cm2: 20.0,
            perimeter_cm: 30.06,
        };
        AnalysisResult {
            tattoo_type: TattooType::Mixed,
            filled_area_cm2: geometry.filled_area_cm2,
            contour_area_cm2: geometry.contour_area_cm2,
            perimeter_cm: geometry.perimeter_cm,
            contour_count,
            hole_count: 0,
            texture_std: 12.0,
            px_per_cm: 10.0,
            measurement: Measurement::Healthy(geometry),
            price: PriceQuote { amount: 7400, fallback: None },
            debug_image_png: None,
            rendering_notice: None,
        }
    }

    #[test]
    fn analysis_report_lists_measurements() {
        let engine = PricingEngine::new(PricingConfig::default());
        let text = format_analysis_report(&result(600), "Neck", &engine);
        assert!(text.contains("Type: Mixed"));
        assert!(text.contains("Location: Neck"));
        assert!(text.contains("Area: 12.3 cm²"));
        assert!(text.contains("Perimeter: 30.1 cm"));
        assert!(text.contains("600 (medium complexity)"));
        assert!(text.contains("Estimated price: 7400"));
        assert!(text.contains("15000 each"));
    }

    #[test]
    fn degraded_measurement_is_mentioned() {
        let engine = PricingEngine::new(PricingConfig::default());
        let mut degraded = result(3);
        degraded.measurement = Measurement::Degraded {
            zeroed: GeometryMeasurement::default(),
            reason: "bad scale".to_string(),
        };
        let text = format_analysis_report(&degraded, "Back", &engine);
        assert!(text.contains("(low complexity)"));
        assert!(text.contains("bad scale"));
    }

    #[test]
    fn questionnaire_summary_and_special_notice() {
        let engine = PricingEngine::new(PricingConfig::default());
        let labels = QuestionnaireLabels {
            tattoo_type: "Cover-up",
            location: "Ribs",
            size: "Small",
            detail: "High",
        };

        let text = format_questionnaire_summary(&labels, &QuestionnaireQuote::Price { amount: 22500 }, &engine);
        assert!(text.contains("Type: Cover-up"));
        assert!(text.contains("Estimated price: 22500"));

        let special = QuestionnaireQuote::SpecialProject(SpecialProjectNotice {
            min_sessions: 3,
            session_rate: 15000,
        });
        let text = format_questionnaire_summary(&labels, &special, &engine);
        assert!(text.contains("at least 3 sessions at 15000"));
        assert!(!text.contains("Estimated price"));
    }
}
