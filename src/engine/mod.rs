pub mod classifier;
pub mod orchestrator;
pub mod predicate;
pub mod recommender;
pub mod scorecard;
pub mod value_mapper;
pub mod value_position;

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::reference::{CatalogId, ConfigIssue, ConfigurationError, FormulaKind};

pub use classifier::classify;
pub use orchestrator::{
    Engine, Evaluation, ModelQuote, QuoteOutcome, UnknownModel, ValueReport,
};
pub use predicate::{evaluate_condition, PredicateTally};
pub use recommender::recommend;
pub use scorecard::score;
pub use value_mapper::map_value_metrics;
pub use value_position::{value_position, Quadrant, ValuePosition};

pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.3;
pub const DEFAULT_RELATED_ARCHETYPE_CREDIT: f64 = 0.5;
pub const DEFAULT_TOP_VALUE_METRICS: usize = 3;
pub const DEFAULT_PRIORITY_ACTIONS: usize = 3;

/// Tunables for one engine instance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct EngineSettings {
    pub confidence_threshold: f64,
    pub related_archetype_credit: f64,
    pub top_value_metrics: usize,
    pub priority_actions: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            related_archetype_credit: DEFAULT_RELATED_ARCHETYPE_CREDIT,
            top_value_metrics: DEFAULT_TOP_VALUE_METRICS,
            priority_actions: DEFAULT_PRIORITY_ACTIONS,
        }
    }
}

impl EngineSettings {
    pub fn with_confidence_threshold(mut self, threshold: f64) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    pub fn with_related_archetype_credit(mut self, credit: f64) -> Self {
        self.related_archetype_credit = credit;
        self
    }

    pub fn with_top_value_metrics(mut self, k: usize) -> Self {
        self.top_value_metrics = k;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let mut issues = Vec::new();
        let unit = 0.0..=1.0;
        if !unit.contains(&self.confidence_threshold) {
            issues.push(ConfigIssue::SettingOutOfRange {
                name: "confidence_threshold",
                value: self.confidence_threshold,
            });
        }
        if !unit.contains(&self.related_archetype_credit) {
            issues.push(ConfigIssue::SettingOutOfRange {
                name: "related_archetype_credit",
                value: self.related_archetype_credit,
            });
        }
        if self.top_value_metrics == 0 {
            issues.push(ConfigIssue::SettingOutOfRange {
                name: "top_value_metrics",
                value: 0.0,
            });
        }
        if issues.is_empty() {
            Ok(())
        } else {
            Err(ConfigurationError { issues })
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArchetypeScore {
    pub archetype: CatalogId,
    pub name: String,
    pub score: f64,
    pub satisfied: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Classification {
    Matched { archetype: CatalogId, name: String },
    Unclassified,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassificationResult {
    pub classification: Classification,
    pub confidence: f64,
    pub threshold: f64,
    /// Every archetype, best first. The head is the winner when matched.
    pub ranking: Vec<ArchetypeScore>,
}

impl ClassificationResult {
    pub fn archetype(&self) -> Option<&CatalogId> {
        match &self.classification {
            Classification::Matched { archetype, .. } => Some(archetype),
            Classification::Unclassified => None,
        }
    }

    pub fn archetype_name(&self) -> Option<&str> {
        match &self.classification {
            Classification::Matched { name, .. } => Some(name),
            Classification::Unclassified => None,
        }
    }

    pub fn is_unclassified(&self) -> bool {
        matches!(self.classification, Classification::Unclassified)
    }

    pub fn runners_up(&self) -> &[ArchetypeScore] {
        match self.classification {
            Classification::Matched { .. } => self.ranking.get(1..).unwrap_or_default(),
            Classification::Unclassified => &self.ranking,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankedValueMetric {
    pub metric: CatalogId,
    pub name: String,
    pub unit: String,
    pub score: f64,
    pub satisfied: usize,
    pub total: usize,
}

/// Value metrics applicable to the profile, best first.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct ValueMetricRanking {
    metrics: Vec<RankedValueMetric>,
}

impl ValueMetricRanking {
    pub fn new(metrics: Vec<RankedValueMetric>) -> Self {
        Self { metrics }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RankedValueMetric> {
        self.metrics.iter()
    }

    pub fn top(&self, n: usize) -> &[RankedValueMetric] {
        &self.metrics[..n.min(self.metrics.len())]
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}

impl<'a> IntoIterator for &'a ValueMetricRanking {
    type Item = &'a RankedValueMetric;
    type IntoIter = std::slice::Iter<'a, RankedValueMetric>;

    fn into_iter(self) -> Self::IntoIter {
        self.metrics.iter()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub model: CatalogId,
    pub name: String,
    pub score: f64,
    pub affinity: f64,
    pub value_overlap: f64,
    pub matched_metrics: Vec<CatalogId>,
    pub rationale: String,
    pub formula: FormulaKind,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonCode {
    NoCompatibleModel,
}

impl Display for ReasonCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoCompatibleModel => write!(f, "NO_COMPATIBLE_MODEL"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum ExclusionReason {
    ArchetypeMismatch,
    UnmetConstraints { constraints: Vec<String> },
}

impl Display for ExclusionReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ArchetypeMismatch => write!(f, "archetype mismatch"),
            Self::UnmetConstraints { constraints } => {
                write!(f, "unmet: {}", constraints.join(", "))
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExcludedModel {
    pub model: CatalogId,
    pub name: String,
    #[serde(flatten)]
    pub reason: ExclusionReason,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationResult {
    pub recommendations: Vec<Recommendation>,
    pub excluded: Vec<ExcludedModel>,
    /// Set exactly when `recommendations` is empty.
    pub reason: Option<ReasonCode>,
}

impl RecommendationResult {
    pub fn top(&self) -> Option<&Recommendation> {
        self.recommendations.first()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReadinessBand {
    Advanced,
    Strong,
    Developing,
    EarlyStage,
}

impl ReadinessBand {
    pub fn from_composite(composite: f64) -> Self {
        if composite >= 85.0 {
            Self::Advanced
        } else if composite >= 70.0 {
            Self::Strong
        } else if composite >= 50.0 {
            Self::Developing
        } else {
            Self::EarlyStage
        }
    }
}

impl Display for ReadinessBand {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let display = match self {
            Self::Advanced => "Advanced",
            Self::Strong => "Strong",
            Self::Developing => "Developing",
            Self::EarlyStage => "Early Stage",
        };
        write!(f, "{display}")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DimensionScore {
    pub dimension: CatalogId,
    pub name: String,
    pub weight: f64,
    pub score: f64,
    pub met: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UnmetCriterion {
    pub criterion: CatalogId,
    pub dimension: CatalogId,
    pub question: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriorityAction {
    pub criterion: CatalogId,
    pub dimension: CatalogId,
    pub lost_points: f64,
    pub action: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScorecardResult {
    pub composite: f64,
    pub band: ReadinessBand,
    pub dimensions: Vec<DimensionScore>,
    pub unmet: Vec<UnmetCriterion>,
    pub priority_actions: Vec<PriorityAction>,
    pub met: usize,
    pub total: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_are_valid() {
        let settings = EngineSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.confidence_threshold, 0.3);
        assert_eq!(settings.top_value_metrics, 3);
    }

    #[test]
    fn out_of_range_settings_are_reported_together() {
        let settings = EngineSettings::default()
            .with_confidence_threshold(1.5)
            .with_related_archetype_credit(-0.1)
            .with_top_value_metrics(0);
        assert_eq!(settings.validate().unwrap_err().issues.len(), 3);
    }

    #[test]
    fn band_boundaries() {
        assert_eq!(ReadinessBand::from_composite(85.0), ReadinessBand::Advanced);
        assert_eq!(ReadinessBand::from_composite(84.9), ReadinessBand::Strong);
        assert_eq!(ReadinessBand::from_composite(50.0), ReadinessBand::Developing);
        assert_eq!(ReadinessBand::from_composite(0.0), ReadinessBand::EarlyStage);
    }

    #[test]
    fn reason_code_serializes_screaming() {
        let json = serde_json::to_string(&ReasonCode::NoCompatibleModel).unwrap();
        assert_eq!(json, "\"NO_COMPATIBLE_MODEL\"");
    }

    #[test]
    fn ranking_prefix_is_clamped() {
        let ranking = ValueMetricRanking::new(vec![RankedValueMetric {
            metric: CatalogId::from("per_seat"),
            name: "Per seat".to_string(),
            unit: "seat/month".to_string(),
            score: 1.0,
            satisfied: 1,
            total: 1,
        }]);
        assert_eq!(ranking.top(3).len(), 1);
        assert_eq!(ranking.iter().count(), ranking.iter().count());
    }
}
