use serde::{Deserialize, Serialize};

use crate::economics::{price_for_margin, round_cents, TARGET_MARGIN_PCT};
use crate::profile::CustomerType;
use crate::reference::FormulaKind;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct QuoteInputs {
    pub cost_per_unit: f64,
    pub target_margin_pct: f64,
    pub annual_deal_size: f64,
    pub customer_type: CustomerType,
    pub formula: FormulaKind,
}

/// Deal terms a caller supplies; the formula and customer type come from
/// the profile and its recommendation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct QuoteTerms {
    pub cost_per_unit: f64,
    #[serde(default = "default_target_margin")]
    pub target_margin_pct: f64,
    pub annual_deal_size: f64,
}

impl QuoteTerms {
    pub fn inputs(&self, customer_type: CustomerType, formula: FormulaKind) -> QuoteInputs {
        QuoteInputs {
            cost_per_unit: self.cost_per_unit,
            target_margin_pct: self.target_margin_pct,
            annual_deal_size: self.annual_deal_size,
            customer_type,
            formula,
        }
    }
}

fn default_target_margin() -> f64 {
    TARGET_MARGIN_PCT
}

/// Concrete price points for one pricing model. All money is in dollars,
/// rounded to cents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PricingQuote {
    pub formula: FormulaKind,
    pub price_per_unit: f64,
    pub platform_fee_annual: f64,
    pub platform_fee_monthly: f64,
    pub included_units: u64,
    pub overage_rate: f64,
    pub effective_price_per_unit: f64,
    pub gross_margin_pct: f64,
    pub explanation: String,
}

impl PricingQuote {
    pub fn empty(formula: FormulaKind) -> Self {
        Self {
            formula,
            price_per_unit: 0.0,
            platform_fee_annual: 0.0,
            platform_fee_monthly: 0.0,
            included_units: 0,
            overage_rate: 0.0,
            effective_price_per_unit: 0.0,
            gross_margin_pct: 0.0,
            explanation: String::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.price_per_unit == 0.0 && self.included_units == 0
    }
}

/// Expected monthly volume for a deal of this size.
pub fn monthly_units(annual_deal_size: f64) -> u64 {
    if annual_deal_size <= 5_000.0 {
        50
    } else if annual_deal_size <= 25_000.0 {
        200
    } else if annual_deal_size <= 100_000.0 {
        500
    } else {
        1_000
    }
}

pub fn typical_seats(customer_type: CustomerType) -> u64 {
    match customer_type {
        CustomerType::Consumer => 1,
        CustomerType::Smb => 5,
        CustomerType::Developer => 10,
        CustomerType::Enterprise => 100,
    }
}

// Floors a unit count, absorbing float noise just below an integer.
fn whole_units(value: f64) -> u64 {
    (value + 1e-9).floor() as u64
}

/// Builds a quote for `inputs.formula`. Inputs that cannot produce a price
/// (non-positive cost or deal size, margin of 100% or more) give an empty
/// quote rather than an error.
pub fn generate(inputs: &QuoteInputs) -> PricingQuote {
    let QuoteInputs {
        cost_per_unit: cost,
        target_margin_pct: margin,
        annual_deal_size: deal,
        customer_type,
        formula,
    } = *inputs;
    let usable = cost.is_finite()
        && margin.is_finite()
        && deal.is_finite()
        && cost > 0.0
        && deal > 0.0
        && margin < 100.0;
    if !usable {
        return PricingQuote::empty(formula);
    }

    let price = price_for_margin(cost, margin);
    let units = monthly_units(deal);
    let quote = match formula {
        FormulaKind::Hybrid => {
            let fee_monthly = round_cents(cost * units as f64 * 2.0);
            let fee_annual = fee_monthly * 12.0;
            let included = whole_units(fee_annual / (price * 1.5)).max(1);
            let overage = price * 1.2;
            let gross_margin = (fee_annual - cost * included as f64) / fee_annual * 100.0;
            PricingQuote {
                formula,
                price_per_unit: price,
                platform_fee_annual: fee_annual,
                platform_fee_monthly: fee_monthly,
                included_units: included,
                overage_rate: overage,
                effective_price_per_unit: price,
                gross_margin_pct: gross_margin,
                explanation: format!(
                    "A platform fee of twice the cost of {units} units a month covers \
                     {included} included units a year; usage beyond that is billed at a \
                     20% premium."
                ),
            }
        }
        FormulaKind::Outcome => {
            let commit = deal * 0.7;
            let outcomes = whole_units(commit / price).max(1);
            PricingQuote {
                formula,
                price_per_unit: price,
                platform_fee_annual: commit,
                platform_fee_monthly: commit / 12.0,
                included_units: outcomes,
                overage_rate: price,
                effective_price_per_unit: price,
                gross_margin_pct: margin,
                explanation: format!(
                    "A minimum annual commitment of 70% of the deal covers {outcomes} \
                     outcomes; each additional outcome is billed at the same rate."
                ),
            }
        }
        FormulaKind::Workflow => {
            let fee_monthly = units as f64 * price;
            PricingQuote {
                formula,
                price_per_unit: price,
                platform_fee_annual: fee_monthly * 12.0,
                platform_fee_monthly: fee_monthly,
                included_units: units * 12,
                overage_rate: price * 0.85,
                effective_price_per_unit: price,
                gross_margin_pct: margin,
                explanation: format!(
                    "{units} tasks a month are bundled into the fee; extra tasks get a 15% \
                     volume discount."
                ),
            }
        }
        FormulaKind::PerSeat => {
            let seats = typical_seats(customer_type);
            let per_seat = deal / 12.0 / seats as f64;
            let cost_per_seat = cost * units as f64 / seats as f64;
            let gross_margin = (per_seat - cost_per_seat) / per_seat * 100.0;
            PricingQuote {
                formula,
                price_per_unit: per_seat,
                platform_fee_annual: per_seat * seats as f64 * 12.0,
                platform_fee_monthly: per_seat * seats as f64,
                included_units: seats,
                overage_rate: per_seat * 1.5,
                effective_price_per_unit: per_seat,
                gross_margin_pct: gross_margin,
                explanation: format!(
                    "{seats} seats for a typical {customer_type} account; seats added \
                     outside the plan cost 1.5x."
                ),
            }
        }
    };

    PricingQuote {
        price_per_unit: round_cents(quote.price_per_unit),
        platform_fee_annual: round_cents(quote.platform_fee_annual),
        platform_fee_monthly: round_cents(quote.platform_fee_monthly),
        overage_rate: round_cents(quote.overage_rate),
        effective_price_per_unit: round_cents(quote.effective_price_per_unit),
        gross_margin_pct: round_cents(quote.gross_margin_pct),
        ..quote
    }
}
