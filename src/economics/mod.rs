pub mod formula;
pub mod margin;
pub mod unit_cost;

use thiserror::Error;

pub use formula::{generate, PricingQuote, QuoteInputs, QuoteTerms};
pub use margin::{margin_snapshot, MarginBand, MarginInputs, MarginSnapshot};
pub use unit_cost::{
    unit_cost, HumanReview, InferenceCost, LlmPreset, UnitCostBreakdown, UnitCostInputs,
};

/// Target gross margin used when deriving a floor price from unit cost.
pub const TARGET_MARGIN_PCT: f64 = 65.0;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EconomicsError {
    #[error("`{name}` must be a finite number, got {value}")]
    NotFinite { name: &'static str, value: f64 },
    #[error("`{name}` must be greater than zero, got {value}")]
    NotPositive { name: &'static str, value: f64 },
    #[error("`{name}` must be between {min} and {max}, got {value}")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

pub(crate) fn require_positive(name: &'static str, value: f64) -> Result<f64, EconomicsError> {
    if !value.is_finite() {
        return Err(EconomicsError::NotFinite { name, value });
    }
    if value <= 0.0 {
        return Err(EconomicsError::NotPositive { name, value });
    }
    Ok(value)
}

pub(crate) fn require_range(
    name: &'static str,
    value: f64,
    min: f64,
    max: f64,
) -> Result<f64, EconomicsError> {
    if !value.is_finite() {
        return Err(EconomicsError::NotFinite { name, value });
    }
    if value < min || value > max {
        return Err(EconomicsError::OutOfRange {
            name,
            value,
            min,
            max,
        });
    }
    Ok(value)
}

pub(crate) fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Price that yields `margin_pct` gross margin on `cost`.
pub fn price_for_margin(cost: f64, margin_pct: f64) -> f64 {
    cost / (1.0 - margin_pct / 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_for_margin_inverts_margin() {
        let price = price_for_margin(0.35, 65.0);
        assert!((price - 1.0).abs() < 1e-9);
        assert_eq!(round_cents(1.005_1), 1.01);
    }

    #[test]
    fn input_guards() {
        assert!(require_positive("cost", 0.0).is_err());
        assert!(require_positive("cost", f64::INFINITY).is_err());
        assert_eq!(require_range("pct", 40.0, 0.0, 100.0), Ok(40.0));
        assert!(matches!(
            require_range("pct", 140.0, 0.0, 100.0),
            Err(EconomicsError::OutOfRange { .. })
        ));
    }
}
