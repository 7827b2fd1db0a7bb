use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::economics::{require_positive, round_cents, EconomicsError};

pub const SAAS_BENCHMARK_PCT: f64 = 80.0;
pub const AI_AVERAGE_PCT: f64 = 55.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MarginBand {
    Healthy,
    Watch,
    AtRisk,
}

impl MarginBand {
    pub fn from_margin(margin_pct: f64) -> Self {
        if margin_pct > 65.0 {
            Self::Healthy
        } else if margin_pct >= 50.0 {
            Self::Watch
        } else {
            Self::AtRisk
        }
    }
}

impl Display for MarginBand {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let display = match self {
            Self::Healthy => "healthy",
            Self::Watch => "watch",
            Self::AtRisk => "at risk",
        };
        write!(f, "{display}")
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MarginInputs {
    pub cost_per_unit: f64,
    pub price_per_unit: f64,
    pub units_per_customer: f64,
    pub customers: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MarginSnapshot {
    pub margin_pct: f64,
    pub profit_per_unit: f64,
    pub profit_per_customer: f64,
    pub total_profit: f64,
    pub band: MarginBand,
    pub vs_saas_benchmark: f64,
    pub vs_ai_average: f64,
}

pub fn margin_snapshot(inputs: &MarginInputs) -> Result<MarginSnapshot, EconomicsError> {
    let cost = require_positive("cost_per_unit", inputs.cost_per_unit)?;
    let price = require_positive("price_per_unit", inputs.price_per_unit)?;
    let units = require_positive("units_per_customer", inputs.units_per_customer)?;
    let customers = require_positive("customers", inputs.customers)?;

    let margin = (price - cost) / price * 100.0;
    let profit_per_unit = price - cost;
    let profit_per_customer = profit_per_unit * units;
    Ok(MarginSnapshot {
        margin_pct: round_cents(margin),
        profit_per_unit: round_cents(profit_per_unit),
        profit_per_customer: round_cents(profit_per_customer),
        total_profit: round_cents(profit_per_customer * customers),
        band: MarginBand::from_margin(margin),
        vs_saas_benchmark: round_cents(margin - SAAS_BENCHMARK_PCT),
        vs_ai_average: round_cents(margin - AI_AVERAGE_PCT),
    })
}
