//! Presentation of prediction outcomes and failures. Everything here is a
//! pure function from data to display text; the chat and the results panel
//! are two views over the same outcome shape.

use crate::client::PredictionError;
use crate::parse::AmountError;
use crate::types::PredictionOutcome;

/// Euro amount with thousands separators, rounded to whole euros.
pub fn format_euro(amount: f64) -> String {
    let whole = amount.round() as i64;
    let digits = whole.unsigned_abs().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if whole < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Chat-transcript presentation of a successful prediction.
pub fn chat_reply(outcome: &PredictionOutcome) -> String {
    let mut message = format!(
        "✅ Prediction complete! Based on your input, your ideal segment is the {}-Segment.",
        outcome.predicted_segment
    );

    match outcome.recommendations.first() {
        Some(top) => {
            message.push_str("\n\nHere is the top recommendation in that segment:");
            message.push_str(&format!("\n🚗 {} {}", top.brand, top.model));
            message.push_str(&format!("\n- Price: €{}", format_euro(top.price_euro)));
            message.push_str(&format!("\n- Range: {} km", top.range_km));
        }
        None => {
            message.push_str(
                "\n\nNo specific models were found in this segment with your filters.",
            );
        }
    }

    message
}

/// Inline results-panel presentation of a successful prediction.
pub fn results_panel(outcome: &PredictionOutcome) -> String {
    let mut panel = String::from("Prediction Results\n");
    panel.push_str(&format!(
        "Predicted Segment: {}\n",
        outcome.predicted_segment
    ));

    if outcome.recommendations.is_empty() {
        panel.push_str("\nNo models found in this segment that match your price filter.\n");
        return panel;
    }

    panel.push_str(&format!(
        "\nTop {} Recommended Models:\n",
        outcome.recommendations.len()
    ));
    for car in &outcome.recommendations {
        panel.push_str(&format!(
            "\n{} {}\n  Price: €{}\n  Range: {} km | 0-100 km/h: {} s\n",
            car.brand,
            car.model,
            format_euro(car.price_euro),
            car.range_km,
            car.accel_sec
        ));
    }

    panel
}

/// Chat-transcript presentation of a failed prediction.
pub fn chat_error(err: &PredictionError) -> String {
    match err {
        PredictionError::Rejected(message) => format!("Prediction failed: {message}"),
        PredictionError::Connection(_) => {
            "Could not reach the prediction service. Please make sure it is running and try again."
                .to_string()
        }
    }
}

/// Results-panel presentation of a failed prediction.
pub fn panel_error(err: &PredictionError) -> String {
    match err {
        PredictionError::Rejected(message) => format!("Error\nAPI Error: {message}\n"),
        PredictionError::Connection(_) => {
            "Connection Error\nCould not connect to the prediction service. Please ensure it is running.\n"
                .to_string()
        }
    }
}

/// Re-prompt for a chat turn that did not contain a usable number, naming
/// the field the conversation is still waiting on.
pub fn invalid_amount(field: &str, err: &AmountError) -> String {
    match err {
        AmountError::Missing => format!(
            "Sorry, I need a valid number for your {field} requirement to proceed."
        ),
        AmountError::Negative => format!(
            "The {field} cannot be negative. Please give me a plain number."
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Recommendation;

    fn outcome() -> PredictionOutcome {
        PredictionOutcome {
            predicted_segment: "C".to_string(),
            recommendations: vec![Recommendation {
                brand: "X".to_string(),
                model: "Y".to_string(),
                price_euro: 30000.0,
                range_km: 400.0,
                accel_sec: 6.5,
                body_style: None,
            }],
        }
    }

    #[test]
    fn euro_formatting_groups_thousands() {
        assert_eq!(format_euro(30000.0), "30,000");
        assert_eq!(format_euro(999.0), "999");
        assert_eq!(format_euro(1234567.0), "1,234,567");
        assert_eq!(format_euro(46380.4), "46,380");
    }

    #[test]
    fn chat_reply_names_segment_and_top_model() {
        let reply = chat_reply(&outcome());
        assert!(reply.contains("C-Segment"));
        assert!(reply.contains("X Y"));
        assert!(reply.contains("€30,000"));
        assert!(reply.contains("400 km"));
    }

    #[test]
    fn chat_reply_without_recommendations() {
        let empty = PredictionOutcome {
            predicted_segment: "F".to_string(),
            recommendations: vec![],
        };
        let reply = chat_reply(&empty);
        assert!(reply.contains("F-Segment"));
        assert!(reply.contains("No specific models were found"));
    }

    #[test]
    fn panel_lists_each_recommendation() {
        let panel = results_panel(&outcome());
        assert!(panel.contains("Predicted Segment: C"));
        assert!(panel.contains("Top 1 Recommended Models"));
        assert!(panel.contains("X Y"));
        assert!(panel.contains("0-100 km/h: 6.5 s"));
    }

    #[test]
    fn panel_without_recommendations() {
        let empty = PredictionOutcome {
            predicted_segment: "A".to_string(),
            recommendations: vec![],
        };
        let panel = results_panel(&empty);
        assert!(panel.contains("No models found in this segment"));
        assert!(!panel.contains("Recommended Models"));
    }

    #[test]
    fn rejection_text_is_surfaced_verbatim() {
        let err = PredictionError::Rejected("bad input".to_string());
        assert!(chat_error(&err).contains("bad input"));
        assert!(panel_error(&err).contains("bad input"));
        // No recommendation content alongside an error
        assert!(!panel_error(&err).contains("Recommended"));
    }

    #[test]
    fn connection_failure_gets_generic_message() {
        let err = PredictionError::Connection("dns failure".to_string());
        assert!(chat_error(&err).contains("Could not reach the prediction service"));
        assert!(panel_error(&err).contains("Connection Error"));
    }

    #[test]
    fn invalid_amount_names_the_pending_field() {
        let missing = invalid_amount("price", &AmountError::Missing);
        assert!(missing.contains("price"));

        let negative = invalid_amount("range", &AmountError::Negative);
        assert!(negative.contains("range"));
    }
}
