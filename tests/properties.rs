use pricing_navigator::engine::{Classification, Quadrant};
use pricing_navigator::{BusinessProfile, CustomerType, Engine, RevenueStage};

const USAGE: [&str; 8] = [
    "seat-based",
    "task-based",
    "outcome-based",
    "token-based",
    "deliverable-based",
    "chat",
    "workflow-based",
    "api-based",
];

const CAPABILITIES: [&str; 8] = [
    "usage-telemetry",
    "human-in-the-loop",
    "human-qa",
    "outcome-tracking",
    "pricing-page",
    "self-serve-billing",
    "cost-monitoring",
    "value-aligned-pricing",
];

const SIGNALS: [&str; 7] = [
    "autonomy",
    "cost_variance",
    "roi_hardness",
    "service_replacement",
    "gross_margin",
    "revenue_uplift",
    "cost_savings",
];

/// Deterministic spread of profiles over every enum value and a rotating
/// selection of tags and signal levels.
fn profiles() -> Vec<BusinessProfile> {
    let mut out = Vec::new();
    let mut seed: usize = 7;
    for customer in CustomerType::ALL {
        for stage in RevenueStage::ALL {
            for round in 0..12 {
                seed = seed.wrapping_mul(31).wrapping_add(17 + round);
                let mut profile = BusinessProfile::new(customer, stage);
                for (bit, tag) in USAGE.iter().enumerate() {
                    if (seed >> bit) & 1 == 1 {
                        profile = profile.with_usage(tag);
                    }
                }
                for (bit, tag) in CAPABILITIES.iter().enumerate() {
                    if (seed >> (bit + 8)) & 1 == 1 {
                        profile = profile.with_capability(tag);
                    }
                }
                for (idx, name) in SIGNALS.iter().enumerate() {
                    let level = ((seed >> (idx * 2)) % 11) as f64 / 10.0;
                    profile = profile.with_signal(name, level);
                }
                out.push(profile);
            }
        }
    }
    out
}

#[test]
fn confidence_is_bounded_and_threshold_decides_classification() {
    let engine = Engine::builtin().unwrap();
    let threshold = engine.settings().confidence_threshold;
    for profile in profiles() {
        let result = engine.classify(&profile);
        assert!((0.0..=1.0).contains(&result.confidence));
        match &result.classification {
            Classification::Matched { .. } => assert!(result.confidence >= threshold),
            Classification::Unclassified => assert!(result.confidence < threshold),
        }
        assert_eq!(result.ranking.len(), engine.catalog().archetypes().len());
        assert!(result
            .ranking
            .windows(2)
            .all(|w| w[0].score >= w[1].score));
    }
}

#[test]
fn recommendations_are_ordered_and_partition_the_catalog() {
    let engine = Engine::builtin().unwrap();
    for profile in profiles() {
        let evaluation = engine.evaluate(&profile);
        let result = &evaluation.recommendation;
        assert!(result
            .recommendations
            .iter()
            .all(|r| (0.0..=1.0).contains(&r.score)));
        assert!(result.recommendations.windows(2).all(|w| {
            w[0].score > w[1].score
                || (w[0].score == w[1].score
                    && (w[0].affinity > w[1].affinity
                        || (w[0].affinity == w[1].affinity && w[0].model < w[1].model)))
        }));
        assert_eq!(
            result.recommendations.len() + result.excluded.len(),
            engine.catalog().pricing_models().len()
        );
        assert_eq!(result.recommendations.is_empty(), result.reason.is_some());
        assert!(result.recommendations.iter().all(|r| !r.rationale.contains("{{")));
    }
}

#[test]
fn composite_is_bounded_and_hits_extremes_only_at_all_or_nothing() {
    let engine = Engine::builtin().unwrap();
    for profile in profiles() {
        let scorecard = engine.score(&profile);
        assert!((0.0..=100.0).contains(&scorecard.composite));
        assert_eq!(scorecard.composite == 100.0, scorecard.unmet.is_empty());
        assert_eq!(scorecard.composite == 0.0, scorecard.met == 0);
        assert_eq!(scorecard.met + scorecard.unmet.len(), scorecard.total);
        assert!(scorecard.priority_actions.len() <= engine.settings().priority_actions);
    }
}

#[test]
fn value_position_is_bounded_and_quadrant_matches_axes() {
    let engine = Engine::builtin().unwrap();
    for profile in profiles() {
        let position = engine.evaluate(&profile).value_position;
        assert!((-1.0..=1.0).contains(&position.x));
        assert!((-1.0..=1.0).contains(&position.y));
        assert_eq!(position.quadrant, Quadrant::locate(position.x, position.y));
        assert_eq!(
            position.renewal_risk,
            matches!(position.quadrant, Quadrant::PromiseZone | Quadrant::DangerZone)
        );
    }
}

#[test]
fn repeated_evaluation_is_identical() {
    let engine = Engine::builtin().unwrap();
    for profile in profiles().into_iter().step_by(7) {
        let first = serde_json::to_string(&engine.evaluate(&profile)).unwrap();
        let second = serde_json::to_string(&engine.evaluate(&profile)).unwrap();
        assert_eq!(first, second);
    }
}

#[test]
fn builtin_catalog_survives_export_round_trip() {
    let engine = Engine::builtin().unwrap();
    for ext in ["json", "toml"] {
        let path = std::env::temp_dir()
            .join(format!("pricing-navigator-properties-reference.{ext}"));
        pricing_navigator::reference::export_builtin(&path).unwrap();
        let reloaded = pricing_navigator::reference::load_catalog(Some(&path)).unwrap();
        assert_eq!(reloaded.fingerprint(), engine.catalog().fingerprint(), "{ext}");
        let _ = std::fs::remove_file(path);
    }
}
