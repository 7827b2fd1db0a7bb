use tracing::debug;

use crate::engine::predicate::evaluate_condition;
use crate::engine::{
    DimensionScore, EngineSettings, PriorityAction, ReadinessBand, ScorecardResult,
    UnmetCriterion,
};
use crate::profile::BusinessProfile;
use crate::reference::{HealthCriterion, HealthDimension};

/// Composite weight of a dimension. Without explicit weights every
/// dimension counts equally.
pub fn dimension_weight(dimension: &HealthDimension, dimension_count: usize) -> f64 {
    dimension
        .weight
        .unwrap_or(1.0 / dimension_count.max(1) as f64)
}

pub fn score(
    profile: &BusinessProfile,
    dimensions: &[HealthDimension],
    criteria: &[HealthCriterion],
    settings: &EngineSettings,
) -> ScorecardResult {
    let outcomes: Vec<(&HealthCriterion, bool)> = criteria
        .iter()
        .filter(|c| dimensions.iter().any(|d| d.id == c.dimension))
        .map(|c| (c, evaluate_condition(profile, &c.check)))
        .collect();

    let mut dimension_scores = Vec::with_capacity(dimensions.len());
    let mut composite = 0.0;
    for dimension in dimensions {
        let weight = dimension_weight(dimension, dimensions.len());
        let mut sub_score = 0.0;
        let mut met = 0;
        let mut total = 0;
        for (criterion, passed) in outcomes.iter().filter(|(c, _)| c.dimension == dimension.id) {
            total += 1;
            if *passed {
                met += 1;
                sub_score += criterion.weight;
            }
        }
        let sub_score = if total > 0 && met == total {
            1.0
        } else {
            f64::clamp(sub_score, 0.0, 1.0)
        };
        composite += weight * sub_score * 100.0;
        dimension_scores.push(DimensionScore {
            dimension: dimension.id.clone(),
            name: dimension.name.clone(),
            weight,
            score: sub_score,
            met,
            total,
        });
    }

    let total = outcomes.len();
    let met = outcomes.iter().filter(|(_, passed)| *passed).count();
    let composite = if total > 0 && met == total {
        100.0
    } else if met == 0 {
        0.0
    } else {
        f64::clamp(composite, 0.0, 100.0)
    };

    let unmet: Vec<UnmetCriterion> = outcomes
        .iter()
        .filter(|(_, passed)| !passed)
        .map(|(c, _)| UnmetCriterion {
            criterion: c.id.clone(),
            dimension: c.dimension.clone(),
            question: c.question.clone(),
        })
        .collect();

    let mut priority_actions: Vec<PriorityAction> = outcomes
        .iter()
        .filter(|(_, passed)| !passed)
        .map(|(c, _)| {
            let weight = dimensions
                .iter()
                .find(|d| d.id == c.dimension)
                .map(|d| dimension_weight(d, dimensions.len()))
                .unwrap_or(0.0);
            PriorityAction {
                criterion: c.id.clone(),
                dimension: c.dimension.clone(),
                lost_points: weight * c.weight * 100.0,
                action: c.action.clone(),
            }
        })
        .collect();
    // stable sort keeps catalog order among equal losses
    priority_actions.sort_by(|a, b| b.lost_points.total_cmp(&a.lost_points));
    priority_actions.truncate(settings.priority_actions);

    let band = ReadinessBand::from_composite(composite);
    debug!(composite, %band, met, total, "scorecard computed");

    ScorecardResult {
        composite,
        band,
        dimensions: dimension_scores,
        unmet,
        priority_actions,
        met,
        total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{CustomerType, ProfileField, RevenueStage};
    use crate::reference::{CatalogId, Condition};

    fn dimension(id: &str, weight: Option<f64>) -> HealthDimension {
        HealthDimension {
            id: CatalogId::from(id),
            name: id.to_uppercase(),
            weight,
        }
    }

    fn criterion(id: &str, dimension: &str, weight: f64, capability: &str) -> HealthCriterion {
        HealthCriterion {
            id: CatalogId::from(id),
            dimension: CatalogId::from(dimension),
            question: format!("has {capability}?"),
            weight,
            check: Condition::equals(ProfileField::Capabilities, capability),
            action: format!("add {capability}"),
        }
    }

    fn profile(capabilities: &[&str]) -> BusinessProfile {
        capabilities.iter().fold(
            BusinessProfile::new(CustomerType::Smb, RevenueStage::Growth),
            |p, c| p.with_capability(c),
        )
    }

    #[test]
    fn explicit_dimension_weights_are_used() {
        let dimensions = vec![dimension("a", Some(0.75)), dimension("b", Some(0.25))];
        let criteria = vec![
            criterion("c1", "a", 1.0, "pricing-page"),
            criterion("c2", "b", 1.0, "usage-telemetry"),
        ];
        let result = score(
            &profile(&["usage-telemetry"]),
            &dimensions,
            &criteria,
            &EngineSettings::default(),
        );
        assert_eq!(result.composite, 25.0);
        assert_eq!(result.band, ReadinessBand::EarlyStage);
        assert_eq!(result.priority_actions[0].lost_points, 75.0);
    }

    #[test]
    fn all_met_is_exactly_one_hundred() {
        let dimensions = vec![dimension("a", None), dimension("b", None), dimension("c", None)];
        let criteria = vec![
            criterion("c1", "a", 0.1, "x"),
            criterion("c2", "a", 0.2, "y"),
            criterion("c3", "a", 0.7, "z"),
            criterion("c4", "b", 1.0, "x"),
            criterion("c5", "c", 1.0, "y"),
        ];
        let result = score(
            &profile(&["x", "y", "z"]),
            &dimensions,
            &criteria,
            &EngineSettings::default(),
        );
        assert_eq!(result.composite, 100.0);
        assert!(result.unmet.is_empty());
        assert!(result.dimensions.iter().all(|d| d.score == 1.0));
        assert_eq!(result.band, ReadinessBand::Advanced);
    }

    #[test]
    fn priority_actions_order_by_lost_points_then_catalog() {
        let dimensions = vec![dimension("a", None), dimension("b", None)];
        let criteria = vec![
            criterion("small", "a", 0.2, "x"),
            criterion("big", "a", 0.8, "y"),
            criterion("tie", "b", 0.2, "z"),
            criterion("met", "b", 0.8, "w"),
        ];
        let settings = EngineSettings {
            priority_actions: 2,
            ..EngineSettings::default()
        };
        let result = score(&profile(&["w"]), &dimensions, &criteria, &settings);
        let ids: Vec<_> = result
            .priority_actions
            .iter()
            .map(|a| a.criterion.as_str())
            .collect();
        assert_eq!(ids, vec!["big", "small"]);
        let unmet: Vec<_> = result.unmet.iter().map(|u| u.criterion.as_str()).collect();
        assert_eq!(unmet, vec!["small", "big", "tie"]);
    }
}
