use crate::engine::predicate::PredicateTally;
use crate::engine::{ClassificationResult, RankedValueMetric, ValueMetricRanking};
use crate::profile::BusinessProfile;
use crate::reference::ValueMetric;

/// Ranks the value metrics open to the classified archetype. Unclassified
/// profiles only see metrics that carry no archetype restriction.
pub fn map_value_metrics(
    profile: &BusinessProfile,
    classification: &ClassificationResult,
    metrics: &[ValueMetric],
) -> ValueMetricRanking {
    let archetype = classification.archetype();
    let mut ranked: Vec<RankedValueMetric> = metrics
        .iter()
        .filter(|metric| match archetype {
            Some(id) => metric.applicable_archetypes.contains(id),
            None => metric.applicable_archetypes.is_empty(),
        })
        .map(|metric| {
            let tally = PredicateTally::of(profile, &metric.suitability);
            RankedValueMetric {
                metric: metric.id.clone(),
                name: metric.name.clone(),
                unit: metric.unit.clone(),
                score: tally.count_share(),
                satisfied: tally.satisfied,
                total: tally.total,
            }
        })
        .collect();

    ranked.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.metric.cmp(&b.metric)));
    ValueMetricRanking::new(ranked)
}
