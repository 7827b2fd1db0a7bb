use std::cmp::Ordering;

use tracing::debug;

use crate::engine::predicate::PredicateTally;
use crate::engine::{ArchetypeScore, Classification, ClassificationResult, EngineSettings};
use crate::profile::BusinessProfile;
use crate::reference::ArchetypeDefinition;

pub fn classify(
    profile: &BusinessProfile,
    archetypes: &[ArchetypeDefinition],
    settings: &EngineSettings,
) -> ClassificationResult {
    let mut ranking: Vec<ArchetypeScore> = archetypes
        .iter()
        .map(|archetype| {
            let tally = PredicateTally::of(profile, &archetype.predicates);
            ArchetypeScore {
                archetype: archetype.id.clone(),
                name: archetype.name.clone(),
                score: tally.weighted_share(),
                satisfied: tally.satisfied,
                total: tally.total,
            }
        })
        .collect();
    ranking.sort_by(rank_order);

    let threshold = settings.confidence_threshold;
    let (classification, confidence) = match ranking.first() {
        Some(best) if best.score >= threshold => (
            Classification::Matched {
                archetype: best.archetype.clone(),
                name: best.name.clone(),
            },
            best.score,
        ),
        Some(best) => (Classification::Unclassified, best.score),
        None => (Classification::Unclassified, 0.0),
    };

    debug!(
        ?classification,
        confidence,
        candidates = ranking.len(),
        "profile classified"
    );

    ClassificationResult {
        classification,
        confidence: confidence.clamp(0.0, 1.0),
        threshold,
        ranking,
    }
}

fn rank_order(a: &ArchetypeScore, b: &ArchetypeScore) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| b.satisfied.cmp(&a.satisfied))
        .then_with(|| a.archetype.cmp(&b.archetype))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{CustomerType, ProfileField, RevenueStage};
    use crate::reference::{CatalogId, Condition, Predicate};

    fn archetype(id: &str, predicates: Vec<Predicate>) -> ArchetypeDefinition {
        ArchetypeDefinition {
            id: CatalogId::from(id),
            name: id.to_string(),
            description: String::new(),
            pricing_implications: String::new(),
            examples: Vec::new(),
            principles: Vec::new(),
            predicates,
        }
    }

    fn uses(tag: &str, weight: f64) -> Predicate {
        Predicate::new(Condition::equals(ProfileField::UsagePatterns, tag), weight)
    }

    #[test]
    fn highest_normalized_score_wins() {
        let profile = BusinessProfile::new(CustomerType::Smb, RevenueStage::Early)
            .with_usage("seat-based");
        let archetypes = vec![
            archetype("seat", vec![uses("seat-based", 1.0), uses("chat", 1.0)]),
            archetype("api", vec![uses("token-based", 1.0)]),
        ];
        let result = classify(&profile, &archetypes, &EngineSettings::default());
        assert_eq!(result.archetype(), Some(&CatalogId::from("seat")));
        assert_eq!(result.confidence, 0.5);
        assert_eq!(result.runners_up().len(), 1);
    }

    #[test]
    fn ties_prefer_more_satisfied_predicates_then_lowest_id() {
        let profile = BusinessProfile::new(CustomerType::Smb, RevenueStage::Early)
            .with_usage("a")
            .with_usage("b");
        let archetypes = vec![
            archetype("zeta", vec![uses("a", 1.0), uses("b", 1.0)]),
            archetype("alpha", vec![uses("a", 1.0)]),
            archetype("beta", vec![uses("b", 2.0)]),
        ];
        let result = classify(&profile, &archetypes, &EngineSettings::default());
        assert_eq!(result.archetype(), Some(&CatalogId::from("zeta")));
        let order: Vec<_> = result.ranking.iter().map(|s| s.archetype.as_str()).collect();
        assert_eq!(order, vec!["zeta", "alpha", "beta"]);
    }

    #[test]
    fn below_threshold_is_unclassified_with_raw_confidence() {
        let profile = BusinessProfile::new(CustomerType::Enterprise, RevenueStage::Scale)
            .with_usage("chat");
        let archetypes = vec![archetype(
            "seat",
            vec![uses("chat", 1.0), uses("seat-based", 4.0)],
        )];
        let result = classify(&profile, &archetypes, &EngineSettings::default());
        assert!(result.is_unclassified());
        assert_eq!(result.confidence, 0.2);
        assert_eq!(result.runners_up().len(), 1);
    }

    #[test]
    fn empty_catalog_is_unclassified_at_zero() {
        let profile = BusinessProfile::new(CustomerType::Consumer, RevenueStage::PreRevenue);
        let result = classify(&profile, &[], &EngineSettings::default());
        assert!(result.is_unclassified());
        assert_eq!(result.confidence, 0.0);
    }
}
