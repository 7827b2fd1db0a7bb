use std::cmp::Ordering;

use tracing::{debug, warn};

use crate::engine::predicate::evaluate_condition;
use crate::engine::{
    ClassificationResult, EngineSettings, ExcludedModel, ExclusionReason, ReasonCode,
    Recommendation, RecommendationResult, ValueMetricRanking,
};
use crate::profile::BusinessProfile;
use crate::reference::{Catalog, CatalogId, Placeholder, PricingModel, TemplateParams};

pub const VALUE_OVERLAP_WEIGHT: f64 = 0.6;
pub const AFFINITY_WEIGHT: f64 = 0.4;

/// Archetype label used in rationales for unclassified profiles.
const UNCLASSIFIED_LABEL: &str = "AI product";

pub fn recommend(
    profile: &BusinessProfile,
    classification: &ClassificationResult,
    value_metrics: &ValueMetricRanking,
    catalog: &Catalog,
    settings: &EngineSettings,
) -> RecommendationResult {
    let archetype = classification.archetype();
    let top: Vec<&CatalogId> = value_metrics
        .top(settings.top_value_metrics)
        .iter()
        .map(|m| &m.metric)
        .collect();

    let mut recommendations = Vec::new();
    let mut excluded = Vec::new();

    for model in catalog.pricing_models() {
        if let Some(reason) = exclusion(profile, archetype, model) {
            excluded.push(ExcludedModel {
                model: model.id.clone(),
                name: model.name.clone(),
                reason,
            });
            continue;
        }

        let matched_metrics: Vec<CatalogId> = top
            .iter()
            .filter(|id| model.compatible_value_metrics.contains(**id))
            .map(|id| (*id).clone())
            .collect();
        let value_overlap = if top.is_empty() {
            0.0
        } else {
            matched_metrics.len() as f64 / top.len() as f64
        };
        let affinity = match (archetype, &model.designed_for) {
            (Some(classified), Some(designed)) if classified == designed => 1.0,
            _ => settings.related_archetype_credit,
        };
        let score = VALUE_OVERLAP_WEIGHT * value_overlap + AFFINITY_WEIGHT * affinity;
        let rationale = render_rationale(
            profile,
            classification,
            value_metrics,
            catalog,
            model,
            &matched_metrics,
        );

        recommendations.push(Recommendation {
            model: model.id.clone(),
            name: model.name.clone(),
            score,
            affinity,
            value_overlap,
            matched_metrics,
            rationale,
            formula: model.formula,
        });
    }

    recommendations.sort_by(rank_order);
    let reason = recommendations
        .is_empty()
        .then_some(ReasonCode::NoCompatibleModel);

    debug!(
        recommended = recommendations.len(),
        excluded = excluded.len(),
        ?reason,
        "pricing models ranked"
    );

    RecommendationResult {
        recommendations,
        excluded,
        reason,
    }
}

fn exclusion(
    profile: &BusinessProfile,
    archetype: Option<&CatalogId>,
    model: &PricingModel,
) -> Option<ExclusionReason> {
    let compatible = model.compatible_archetypes.is_empty()
        || archetype
            .map(|id| model.compatible_archetypes.contains(id))
            .unwrap_or(false);
    if !compatible {
        return Some(ExclusionReason::ArchetypeMismatch);
    }

    let unmet: Vec<String> = model
        .constraints
        .iter()
        .filter(|c| !evaluate_condition(profile, &c.condition))
        .map(|c| c.name.clone())
        .collect();
    if unmet.is_empty() {
        None
    } else {
        Some(ExclusionReason::UnmetConstraints { constraints: unmet })
    }
}

fn rank_order(a: &Recommendation, b: &Recommendation) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| b.affinity.total_cmp(&a.affinity))
        .then_with(|| a.model.cmp(&b.model))
}

fn render_rationale(
    profile: &BusinessProfile,
    classification: &ClassificationResult,
    value_metrics: &ValueMetricRanking,
    catalog: &Catalog,
    model: &PricingModel,
    matched_metrics: &[CatalogId],
) -> String {
    let metric_name = |id: &CatalogId| {
        catalog
            .value_metric(id)
            .map(|m| m.name.to_lowercase())
            .unwrap_or_else(|| id.to_string())
    };

    let mut names: Vec<String> = matched_metrics.iter().map(metric_name).collect();
    if names.is_empty() {
        names = model.compatible_value_metrics.iter().map(metric_name).collect();
    }
    let primary = matched_metrics
        .first()
        .or_else(|| {
            value_metrics
                .iter()
                .map(|m| &m.metric)
                .find(|id| model.compatible_value_metrics.contains(*id))
        })
        .or_else(|| model.compatible_value_metrics.iter().next())
        .map(metric_name)
        .unwrap_or_default();

    let params = TemplateParams::from([
        (Placeholder::Model, model.name.clone()),
        (
            Placeholder::Archetype,
            classification
                .archetype_name()
                .unwrap_or(UNCLASSIFIED_LABEL)
                .to_string(),
        ),
        (Placeholder::Metrics, names.join(", ")),
        (Placeholder::PrimaryMetric, primary),
        (Placeholder::Customer, profile.customer_type.to_string()),
    ]);

    match catalog.template(&model.id).map(|template| template.render(&params)) {
        Some(Ok(rendered)) => rendered,
        Some(Err(error)) => {
            warn!(model = %model.id, %error, "rationale render failed");
            model.rationale.clone()
        }
        None => model.rationale.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{classify, map_value_metrics};
    use crate::profile::{CustomerType, RevenueStage};

    fn evaluate(profile: &BusinessProfile) -> RecommendationResult {
        let catalog = Catalog::builtin().unwrap();
        let settings = EngineSettings::default();
        let classification = classify(profile, catalog.archetypes(), &settings);
        let ranking = map_value_metrics(profile, &classification, catalog.value_metrics());
        recommend(profile, &classification, &ranking, &catalog, &settings)
    }

    fn copilot_profile() -> BusinessProfile {
        BusinessProfile::new(CustomerType::Smb, RevenueStage::Growth)
            .with_usage("seat-based")
            .with_usage("in-app-assist")
            .with_capability("human-in-the-loop")
            .with_capability("usage-telemetry")
            .with_signal("autonomy", 0.2)
            .with_signal("cost_variance", 0.2)
    }

    #[test]
    fn designed_for_model_leads_for_copilot() {
        let result = evaluate(&copilot_profile());
        let top = result.top().unwrap();
        assert_eq!(top.model.as_str(), "per_seat_tiers");
        assert_eq!(top.affinity, 1.0);
        assert!(result.reason.is_none());
        assert!(!top.rationale.contains("{{"));
    }

    #[test]
    fn scores_are_non_increasing() {
        let result = evaluate(&copilot_profile());
        for pair in result.recommendations.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn every_model_is_either_recommended_or_excluded() {
        let result = evaluate(&copilot_profile());
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(
            result.recommendations.len() + result.excluded.len(),
            catalog.pricing_models().len()
        );
        assert!(result
            .excluded
            .iter()
            .any(|e| e.reason == ExclusionReason::ArchetypeMismatch));
    }

    #[test]
    fn constraint_failures_are_named() {
        let profile = copilot_profile().with_signal("cost_variance", 0.9);
        let result = evaluate(&profile);
        let per_seat = result
            .excluded
            .iter()
            .find(|e| e.model.as_str() == "per_seat_tiers")
            .unwrap();
        assert_eq!(
            per_seat.reason,
            ExclusionReason::UnmetConstraints {
                constraints: vec!["requires predictable inference cost".to_string()]
            }
        );
    }

    #[test]
    fn unclassified_profiles_reach_only_unrestricted_models() {
        let profile = BusinessProfile::new(CustomerType::Consumer, RevenueStage::PreRevenue);
        let result = evaluate(&profile);
        assert_eq!(result.recommendations.len(), 1);
        let top = result.top().unwrap();
        assert_eq!(top.model.as_str(), "flat_subscription");
        assert!(top.rationale.contains("AI product"));
    }
}
