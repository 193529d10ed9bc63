//! Cutting arithmetic. Everything in here is pure so the form can call it on
//! every keystroke.

use crate::models::{CalculationInput, CalculationResult};

/// Work out how many full segments one bar yields and what is left over.
///
/// Inputs that cannot describe a real cut (non-positive or non-finite lengths,
/// zero bars) produce [`CalculationResult::ZERO`] instead of an error. The
/// remainder follows floating-point `%`, so it keeps the sign of the bar
/// length and stays below the segment length.
pub fn compute(input: &CalculationInput) -> CalculationResult {
    let CalculationInput {
        bar_length,
        segment_length,
        quantity,
    } = *input;

    if !bar_length.is_finite() || !segment_length.is_finite() {
        return CalculationResult::ZERO;
    }
    if bar_length <= 0.0 || segment_length <= 0.0 || quantity == 0 {
        return CalculationResult::ZERO;
    }

    let segments_per_bar = (bar_length / segment_length).floor() as u64;
    let remainder_per_bar = bar_length % segment_length;

    CalculationResult {
        segments_per_bar,
        remainder_per_bar,
        total_remainder: remainder_per_bar * f64::from(quantity),
    }
}

/// Lenient length parsing for form fields: blank or garbage reads as zero.
pub fn parse_length(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .unwrap_or(0.0)
}

/// Lenient bar-count parsing for form fields: blank or garbage reads as zero.
pub fn parse_quantity(raw: &str) -> u32 {
    raw.trim().parse::<u32>().unwrap_or(0)
}

/// Render a length without a trailing `.0` for whole numbers.
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        // also folds -0.0
        return "0".to_string();
    }
    value.to_string()
}
