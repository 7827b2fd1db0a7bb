pub mod input;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use input::{load_profile_input, InvalidProfile, ProfileInput};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown {field} value: {value}")]
pub struct EnumParseError {
    pub field: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum CustomerType {
    Consumer,
    Smb,
    Enterprise,
    Developer,
}

impl CustomerType {
    pub const ALL: [CustomerType; 4] = [
        CustomerType::Consumer,
        CustomerType::Smb,
        CustomerType::Enterprise,
        CustomerType::Developer,
    ];

    pub fn as_slug(&self) -> &'static str {
        match self {
            Self::Consumer => "consumer",
            Self::Smb => "smb",
            Self::Enterprise => "enterprise",
            Self::Developer => "developer",
        }
    }
}

impl Display for CustomerType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let display = match self {
            Self::Consumer => "Consumer",
            Self::Smb => "SMB",
            Self::Enterprise => "Enterprise",
            Self::Developer => "Developer",
        };
        write!(f, "{display}")
    }
}

impl FromStr for CustomerType {
    type Err = EnumParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_key(s).as_str() {
            "consumer" | "b2c" => Ok(Self::Consumer),
            "smb" | "small_business" => Ok(Self::Smb),
            "enterprise" | "ent" => Ok(Self::Enterprise),
            "developer" | "developers" | "dev" => Ok(Self::Developer),
            _ => Err(EnumParseError {
                field: "customer_type",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum RevenueStage {
    PreRevenue,
    Early,
    Growth,
    Scale,
}

impl RevenueStage {
    pub const ALL: [RevenueStage; 4] = [
        RevenueStage::PreRevenue,
        RevenueStage::Early,
        RevenueStage::Growth,
        RevenueStage::Scale,
    ];

    pub fn as_slug(&self) -> &'static str {
        match self {
            Self::PreRevenue => "pre_revenue",
            Self::Early => "early",
            Self::Growth => "growth",
            Self::Scale => "scale",
        }
    }
}

impl Display for RevenueStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let display = match self {
            Self::PreRevenue => "Pre-revenue",
            Self::Early => "Early",
            Self::Growth => "Growth",
            Self::Scale => "Scale",
        };
        write!(f, "{display}")
    }
}

impl FromStr for RevenueStage {
    type Err = EnumParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_key(s).as_str() {
            "pre_revenue" | "prerevenue" | "idea" => Ok(Self::PreRevenue),
            "early" | "seed" => Ok(Self::Early),
            "growth" => Ok(Self::Growth),
            "scale" | "mature" => Ok(Self::Scale),
            _ => Err(EnumParseError {
                field: "revenue_stage",
                value: s.to_string(),
            }),
        }
    }
}

/// Validated input to every engine call.
///
/// Deserialization goes through [`ProfileInput`], so a record that reaches
/// the engine has every required field and only in-enum values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "ProfileInput")]
pub struct BusinessProfile {
    pub product: String,
    pub customer_type: CustomerType,
    pub revenue_stage: RevenueStage,
    pub usage_patterns: BTreeSet<String>,
    pub capabilities: BTreeSet<String>,
    pub cost_signals: BTreeMap<String, f64>,
    pub notes: String,
}

impl BusinessProfile {
    pub fn new(customer_type: CustomerType, revenue_stage: RevenueStage) -> Self {
        Self {
            product: String::new(),
            customer_type,
            revenue_stage,
            usage_patterns: BTreeSet::new(),
            capabilities: BTreeSet::new(),
            cost_signals: BTreeMap::new(),
            notes: String::new(),
        }
    }

    pub fn with_product(mut self, product: impl Into<String>) -> Self {
        self.product = product.into();
        self
    }

    pub fn with_usage(mut self, tag: &str) -> Self {
        self.usage_patterns.insert(normalize_tag(tag));
        self
    }

    pub fn with_capability(mut self, tag: &str) -> Self {
        self.capabilities.insert(normalize_tag(tag));
        self
    }

    pub fn with_signal(mut self, name: &str, value: f64) -> Self {
        self.cost_signals.insert(normalize_key(name), value);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn cost_signal(&self, name: &str) -> Option<f64> {
        self.cost_signals.get(&normalize_key(name)).copied()
    }

    pub fn field_value(&self, field: &ProfileField) -> FieldValue<'_> {
        match field {
            ProfileField::CustomerType => FieldValue::Text(self.customer_type.as_slug()),
            ProfileField::RevenueStage => FieldValue::Text(self.revenue_stage.as_slug()),
            ProfileField::UsagePatterns => FieldValue::Tags(&self.usage_patterns),
            ProfileField::Capabilities => FieldValue::Tags(&self.capabilities),
            ProfileField::CostSignal(name) => self
                .cost_signals
                .get(name)
                .map(|v| FieldValue::Numeric(*v))
                .unwrap_or(FieldValue::Missing),
        }
    }
}

/// Profile attribute a predicate can inspect.
///
/// Serialized as `customer_type`, `revenue_stage`, `usage_patterns`,
/// `capabilities` or `cost_signal:<name>`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "String", into = "String")]
pub enum ProfileField {
    CustomerType,
    RevenueStage,
    UsagePatterns,
    Capabilities,
    CostSignal(String),
}

impl ProfileField {
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::CostSignal(_))
    }

    pub fn is_tag_set(&self) -> bool {
        matches!(self, Self::UsagePatterns | Self::Capabilities)
    }
}

impl Display for ProfileField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CustomerType => write!(f, "customer_type"),
            Self::RevenueStage => write!(f, "revenue_stage"),
            Self::UsagePatterns => write!(f, "usage_patterns"),
            Self::Capabilities => write!(f, "capabilities"),
            Self::CostSignal(name) => write!(f, "cost_signal:{name}"),
        }
    }
}

#[derive(Debug, Error)]
#[error("unknown profile field: {0}")]
pub struct FieldParseError(pub String);

impl FromStr for ProfileField {
    type Err = FieldParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize_key(s);
        let field = match normalized.as_str() {
            "customer_type" | "customer" => ProfileField::CustomerType,
            "revenue_stage" | "stage" => ProfileField::RevenueStage,
            "usage_patterns" | "usage" => ProfileField::UsagePatterns,
            "capabilities" | "capability" => ProfileField::Capabilities,
            other => {
                let name = other
                    .strip_prefix("cost_signal:")
                    .or_else(|| other.strip_prefix("signal:"))
                    .unwrap_or_default();
                if name.is_empty() {
                    return Err(FieldParseError(s.to_string()));
                }
                ProfileField::CostSignal(name.to_string())
            }
        };
        Ok(field)
    }
}

impl TryFrom<String> for ProfileField {
    type Error = FieldParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ProfileField> for String {
    fn from(value: ProfileField) -> Self {
        value.to_string()
    }
}

/// Borrowed view of one profile attribute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Text(&'static str),
    Tags(&'a BTreeSet<String>),
    Numeric(f64),
    Missing,
}

/// Lowercases and snake-cases enum values and signal names.
pub fn normalize_key(raw: &str) -> String {
    raw.trim().to_ascii_lowercase().replace(['-', ' '], "_")
}

/// Lowercases and kebab-cases usage and capability tags.
pub fn normalize_tag(raw: &str) -> String {
    raw.trim().to_ascii_lowercase().replace(['_', ' '], "-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_field_names_and_signal_prefixes() {
        assert_eq!(
            "customer".parse::<ProfileField>().unwrap(),
            ProfileField::CustomerType
        );
        assert_eq!(
            "cost_signal:Inference-Cost-Ratio"
                .parse::<ProfileField>()
                .unwrap(),
            ProfileField::CostSignal("inference_cost_ratio".to_string())
        );
        assert!("cost_signal:".parse::<ProfileField>().is_err());
        assert!("pricing".parse::<ProfileField>().is_err());
    }

    #[test]
    fn field_round_trips_through_serde_string() {
        let field = ProfileField::CostSignal("cost_variance".to_string());
        let json = serde_json::to_string(&field).unwrap();
        assert_eq!(json, "\"cost_signal:cost_variance\"");
        let back: ProfileField = serde_json::from_str(&json).unwrap();
        assert_eq!(back, field);
    }

    #[test]
    fn tags_and_signals_are_normalized() {
        let profile = BusinessProfile::new(CustomerType::Smb, RevenueStage::Early)
            .with_usage(" Seat_Based ")
            .with_capability("usage telemetry")
            .with_signal("Inference-Cost-Ratio", 0.2);
        assert!(profile.usage_patterns.contains("seat-based"));
        assert!(profile.capabilities.contains("usage-telemetry"));
        assert_eq!(profile.cost_signal("inference_cost_ratio"), Some(0.2));
    }

    #[test]
    fn missing_signal_is_reported_as_missing() {
        let profile = BusinessProfile::new(CustomerType::Developer, RevenueStage::Growth);
        assert_eq!(
            profile.field_value(&ProfileField::CostSignal("autonomy".to_string())),
            FieldValue::Missing
        );
        assert_eq!(
            profile.field_value(&ProfileField::CustomerType),
            FieldValue::Text("developer")
        );
    }

    #[test]
    fn enum_aliases_parse() {
        assert_eq!("B2C".parse::<CustomerType>().unwrap(), CustomerType::Consumer);
        assert_eq!(
            "pre-revenue".parse::<RevenueStage>().unwrap(),
            RevenueStage::PreRevenue
        );
        let err = "galactic".parse::<CustomerType>().unwrap_err();
        assert_eq!(err.field, "customer_type");
    }
}
