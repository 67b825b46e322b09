//! Prediction output shown to the user

use serde::{Deserialize, Serialize};
use std::fmt;

/// Currency symbol of the displayed amount
pub const CURRENCY_SYMBOL: &str = "₺";

/// Predicted expense ratio and the payout it implies for a coverage amount
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    /// Model output in the model's trained numeric space
    pub ratio: f64,
    pub coverage: u64,
    /// `ratio * coverage`
    pub amount: f64,
    /// Identifier of the model that produced the estimate
    pub model_id: String,
}

impl Estimate {
    pub fn new(ratio: f64, coverage: u64, model_id: String) -> Self {
        Self {
            ratio,
            coverage,
            amount: ratio * coverage as f64,
            model_id,
        }
    }

    /// Ratio with two decimals and thousands separators
    pub fn ratio_display(&self) -> String {
        group_thousands(self.ratio)
    }

    /// Amount with two decimals, thousands separators and currency symbol
    pub fn amount_display(&self) -> String {
        format!("{} {CURRENCY_SYMBOL}", group_thousands(self.amount))
    }
}

impl fmt::Display for Estimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Expected expense ratio:  {}", self.ratio_display())?;
        write!(f, "Expected expense amount: {}", self.amount_display())
    }
}

/// Format with two decimals and `,` between thousands
fn group_thousands(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(fixed.len() + int_part.len() / 3 + 1);
    if value.is_sign_negative() && fixed.chars().any(|c| c.is_ascii_digit() && c != '0') {
        grouped.push('-');
    }
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped.push('.');
    grouped.push_str(frac_part);
    grouped
}
