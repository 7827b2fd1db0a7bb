use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::economics::{
    price_for_margin, require_positive, require_range, round_cents, EconomicsError,
    TARGET_MARGIN_PCT,
};
use crate::profile::{normalize_key, EnumParseError};

/// Blended input/output cost per 1K tokens for common model families.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LlmPreset {
    Gpt4o,
    Gpt4oMini,
    ClaudeSonnet,
    ClaudeHaiku,
    SelfHosted,
}

impl LlmPreset {
    pub const ALL: [LlmPreset; 5] = [
        LlmPreset::Gpt4o,
        LlmPreset::Gpt4oMini,
        LlmPreset::ClaudeSonnet,
        LlmPreset::ClaudeHaiku,
        LlmPreset::SelfHosted,
    ];

    pub fn cost_per_1k_tokens(&self) -> f64 {
        match self {
            Self::Gpt4o => 0.01,
            Self::Gpt4oMini => 0.0004,
            Self::ClaudeSonnet => 0.009,
            Self::ClaudeHaiku => 0.002,
            Self::SelfHosted => 0.001,
        }
    }

    pub fn as_slug(&self) -> &'static str {
        match self {
            Self::Gpt4o => "gpt4o",
            Self::Gpt4oMini => "gpt4o_mini",
            Self::ClaudeSonnet => "claude_sonnet",
            Self::ClaudeHaiku => "claude_haiku",
            Self::SelfHosted => "self_hosted",
        }
    }
}

impl Display for LlmPreset {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let display = match self {
            Self::Gpt4o => "OpenAI GPT-4o",
            Self::Gpt4oMini => "OpenAI GPT-4o mini",
            Self::ClaudeSonnet => "Anthropic Claude Sonnet",
            Self::ClaudeHaiku => "Anthropic Claude Haiku",
            Self::SelfHosted => "Open source / self-hosted",
        };
        write!(f, "{display}")
    }
}

impl FromStr for LlmPreset {
    type Err = EnumParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_key(s).as_str() {
            "gpt4o" | "gpt_4o" => Ok(Self::Gpt4o),
            "gpt4o_mini" | "gpt_4o_mini" => Ok(Self::Gpt4oMini),
            "claude_sonnet" | "sonnet" => Ok(Self::ClaudeSonnet),
            "claude_haiku" | "haiku" => Ok(Self::ClaudeHaiku),
            "self_hosted" | "open_source" => Ok(Self::SelfHosted),
            _ => Err(EnumParseError {
                field: "llm_preset",
                value: s.to_string(),
            }),
        }
    }
}

/// How inference cost per unit is known.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum InferenceCost {
    Tokens {
        tokens_per_call: f64,
        cost_per_1k_tokens: f64,
        calls_per_unit: f64,
    },
    MonthlyBill {
        monthly_spend: f64,
        units_per_month: f64,
    },
}

impl InferenceCost {
    pub fn from_preset(preset: LlmPreset, tokens_per_call: f64, calls_per_unit: f64) -> Self {
        Self::Tokens {
            tokens_per_call,
            cost_per_1k_tokens: preset.cost_per_1k_tokens(),
            calls_per_unit,
        }
    }

    fn per_unit(&self) -> Result<f64, EconomicsError> {
        match *self {
            Self::Tokens {
                tokens_per_call,
                cost_per_1k_tokens,
                calls_per_unit,
            } => {
                let tokens = require_positive("tokens_per_call", tokens_per_call)?;
                let rate = require_positive("cost_per_1k_tokens", cost_per_1k_tokens)?;
                let calls = require_positive("calls_per_unit", calls_per_unit)?;
                Ok(tokens / 1000.0 * rate * calls)
            }
            Self::MonthlyBill {
                monthly_spend,
                units_per_month,
            } => {
                let spend = require_range("monthly_spend", monthly_spend, 0.0, f64::MAX)?;
                let units = require_positive("units_per_month", units_per_month)?;
                Ok(spend / units)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct HumanReview {
    pub review_pct: f64,
    pub minutes_per_review: f64,
    pub hourly_cost: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct UnitCostInputs {
    pub inference: InferenceCost,
    #[serde(default)]
    pub human_review: Option<HumanReview>,
    #[serde(default)]
    pub monthly_infra: f64,
    #[serde(default = "default_monthly_units")]
    pub monthly_units: f64,
}

fn default_monthly_units() -> f64 {
    1000.0
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UnitCostBreakdown {
    pub inference: f64,
    pub human_review: f64,
    pub infrastructure: f64,
    pub total: f64,
    pub inference_share_pct: f64,
    pub human_share_pct: f64,
    pub infrastructure_share_pct: f64,
    pub minimum_price: f64,
}

/// Fully loaded cost of one unit of delivered value, and the lowest price
/// that keeps the target margin.
pub fn unit_cost(inputs: &UnitCostInputs) -> Result<UnitCostBreakdown, EconomicsError> {
    let inference = inputs.inference.per_unit()?;
    let human_review = match inputs.human_review {
        Some(review) => {
            let pct = require_range("review_pct", review.review_pct, 0.0, 100.0)?;
            let minutes = require_positive("minutes_per_review", review.minutes_per_review)?;
            let hourly = require_positive("hourly_cost", review.hourly_cost)?;
            pct / 100.0 * (minutes / 60.0) * hourly
        }
        None => 0.0,
    };
    let infra_spend = require_range("monthly_infra", inputs.monthly_infra, 0.0, f64::MAX)?;
    let units = require_positive("monthly_units", inputs.monthly_units)?;
    let infrastructure = infra_spend / units;

    let total = inference + human_review + infrastructure;
    let share = |part: f64| {
        if total > 0.0 {
            round_cents(part / total * 100.0)
        } else {
            0.0
        }
    };

    Ok(UnitCostBreakdown {
        inference,
        human_review,
        infrastructure,
        total,
        inference_share_pct: share(inference),
        human_share_pct: share(human_review),
        infrastructure_share_pct: share(infrastructure),
        minimum_price: round_cents(price_for_margin(total, TARGET_MARGIN_PCT)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_based_breakdown() {
        let breakdown = unit_cost(&UnitCostInputs {
            inference: InferenceCost::from_preset(LlmPreset::Gpt4o, 2000.0, 1.0),
            human_review: Some(HumanReview {
                review_pct: 20.0,
                minutes_per_review: 6.0,
                hourly_cost: 50.0,
            }),
            monthly_infra: 100.0,
            monthly_units: 1000.0,
        })
        .unwrap();
        assert!((breakdown.inference - 0.02).abs() < 1e-12);
        assert!((breakdown.human_review - 1.0).abs() < 1e-12);
        assert!((breakdown.infrastructure - 0.1).abs() < 1e-12);
        assert!((breakdown.total - 1.12).abs() < 1e-12);
        assert_eq!(breakdown.minimum_price, 3.2);
    }

    #[test]
    fn monthly_bill_breakdown() {
        let breakdown = unit_cost(&UnitCostInputs {
            inference: InferenceCost::MonthlyBill {
                monthly_spend: 500.0,
                units_per_month: 5000.0,
            },
            human_review: None,
            monthly_infra: 0.0,
            monthly_units: 1000.0,
        })
        .unwrap();
        assert!((breakdown.total - 0.1).abs() < 1e-12);
        assert_eq!(breakdown.inference_share_pct, 100.0);
        assert_eq!(breakdown.human_share_pct, 0.0);
    }

    #[test]
    fn preset_parsing() {
        assert_eq!("Claude-Haiku".parse::<LlmPreset>().unwrap(), LlmPreset::ClaudeHaiku);
        assert_eq!("gpt4o-mini".parse::<LlmPreset>().unwrap(), LlmPreset::Gpt4oMini);
        assert!("llama".parse::<LlmPreset>().is_err());
        for preset in LlmPreset::ALL {
            assert_eq!(preset.as_slug().parse::<LlmPreset>().unwrap(), preset);
        }
    }

    #[test]
    fn rejects_review_share_over_100() {
        let err = unit_cost(&UnitCostInputs {
            inference: InferenceCost::from_preset(LlmPreset::SelfHosted, 1000.0, 1.0),
            human_review: Some(HumanReview {
                review_pct: 120.0,
                minutes_per_review: 5.0,
                hourly_cost: 40.0,
            }),
            monthly_infra: 0.0,
            monthly_units: 1000.0,
        })
        .unwrap_err();
        assert!(matches!(err, EconomicsError::OutOfRange { name: "review_pct", .. }));
    }
}
