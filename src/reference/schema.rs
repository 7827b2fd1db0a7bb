use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::profile::{normalize_key, ProfileField};

/// Identifier shared by every reference table. Ordering is plain string
/// ordering, which is what tie-breaks fall back to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct CatalogId(String);

impl CatalogId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CatalogId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CatalogId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    AtLeast,
    AtMost,
    Above,
    Below,
}

impl Comparison {
    pub fn holds(self, observed: f64, threshold: f64) -> bool {
        match self {
            Self::AtLeast => observed >= threshold,
            Self::AtMost => observed <= threshold,
            Self::Above => observed > threshold,
            Self::Below => observed < threshold,
        }
    }
}

impl Display for Comparison {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let symbol = match self {
            Self::AtLeast => ">=",
            Self::AtMost => "<=",
            Self::Above => ">",
            Self::Below => "<",
        };
        write!(f, "{symbol}")
    }
}

/// Boolean rule over one profile field.
///
/// On tag-set fields (`usage_patterns`, `capabilities`) `field_equals` means
/// "contains" and `field_in_set` means "shares at least one tag".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Condition {
    FieldEquals {
        field: ProfileField,
        value: String,
    },
    FieldInSet {
        field: ProfileField,
        values: Vec<String>,
    },
    NumericThreshold {
        field: ProfileField,
        op: Comparison,
        value: f64,
    },
}

impl Condition {
    pub fn field(&self) -> &ProfileField {
        match self {
            Self::FieldEquals { field, .. }
            | Self::FieldInSet { field, .. }
            | Self::NumericThreshold { field, .. } => field,
        }
    }

    pub fn equals(field: ProfileField, value: &str) -> Self {
        Self::FieldEquals {
            field,
            value: value.to_string(),
        }
    }

    pub fn in_set(field: ProfileField, values: &[&str]) -> Self {
        Self::FieldInSet {
            field,
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }

    pub fn threshold(signal: &str, op: Comparison, value: f64) -> Self {
        Self::NumericThreshold {
            field: ProfileField::CostSignal(normalize_key(signal)),
            op,
            value,
        }
    }
}

impl Display for Condition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FieldEquals { field, value } => write!(f, "{field} == {value}"),
            Self::FieldInSet { field, values } => {
                write!(f, "{field} in [{}]", values.join(", "))
            }
            Self::NumericThreshold { field, op, value } => write!(f, "{field} {op} {value}"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Predicate {
    #[serde(flatten)]
    pub condition: Condition,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

impl Predicate {
    pub fn new(condition: Condition, weight: f64) -> Self {
        Self { condition, weight }
    }
}

fn default_weight() -> f64 {
    1.0
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArchetypeDefinition {
    pub id: CatalogId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub pricing_implications: String,
    #[serde(default)]
    pub examples: Vec<String>,
    #[serde(default)]
    pub principles: Vec<String>,
    pub predicates: Vec<Predicate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValueMetric {
    pub id: CatalogId,
    pub name: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub description: String,
    /// Empty means the metric is not tied to any archetype.
    #[serde(default)]
    pub applicable_archetypes: BTreeSet<CatalogId>,
    #[serde(default)]
    pub suitability: Vec<Predicate>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum FormulaKind {
    PerSeat,
    Hybrid,
    Outcome,
    Workflow,
}

impl Display for FormulaKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let display = match self {
            Self::PerSeat => "per-seat",
            Self::Hybrid => "hybrid",
            Self::Outcome => "outcome",
            Self::Workflow => "workflow",
        };
        write!(f, "{display}")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelConstraint {
    pub name: String,
    #[serde(flatten)]
    pub condition: Condition,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PricingModel {
    pub id: CatalogId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub compatible_value_metrics: BTreeSet<CatalogId>,
    /// Empty means the model is offered regardless of archetype.
    #[serde(default)]
    pub compatible_archetypes: BTreeSet<CatalogId>,
    #[serde(default)]
    pub designed_for: Option<CatalogId>,
    #[serde(default)]
    pub constraints: Vec<ModelConstraint>,
    pub rationale: String,
    pub formula: FormulaKind,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthDimension {
    pub id: CatalogId,
    pub name: String,
    #[serde(default)]
    pub weight: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthCriterion {
    pub id: CatalogId,
    pub dimension: CatalogId,
    pub question: String,
    pub weight: f64,
    pub check: Condition,
    #[serde(default)]
    pub action: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Comparable {
    pub company: String,
    pub archetype: CatalogId,
    pub pricing_model: String,
    pub detail: String,
    pub value_driver: String,
}

/// Raw reference tables as authored. Only [`crate::reference::Catalog`]
/// hands them to the engine, after validation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReferenceData {
    pub version: String,
    #[serde(default)]
    pub archetypes: Vec<ArchetypeDefinition>,
    #[serde(default)]
    pub value_metrics: Vec<ValueMetric>,
    #[serde(default)]
    pub pricing_models: Vec<PricingModel>,
    #[serde(default)]
    pub dimensions: Vec<HealthDimension>,
    #[serde(default)]
    pub criteria: Vec<HealthCriterion>,
    #[serde(default)]
    pub comparables: Vec<Comparable>,
}

impl ReferenceData {
    pub fn fingerprint(&self) -> String {
        let canonical = serde_json::to_string(self).unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}
