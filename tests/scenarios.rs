use pricing_navigator::engine::{ExclusionReason, ReasonCode};
use pricing_navigator::reference::ReferenceData;
use pricing_navigator::{BusinessProfile, Catalog, CustomerType, Engine, EngineSettings, RevenueStage};
use serde_json::json;

fn engine_from(value: serde_json::Value) -> Engine {
    let data: ReferenceData = serde_json::from_value(value).expect("reference json");
    let catalog = Catalog::new(data).expect("reference data validates");
    Engine::new(catalog, EngineSettings::default()).expect("default settings are valid")
}

fn single_criterion_checklist() -> (serde_json::Value, serde_json::Value) {
    (
        json!([{"id": "clarity", "name": "Clarity"}]),
        json!([{
            "id": "pricing_page",
            "dimension": "clarity",
            "question": "Is pricing published?",
            "weight": 1.0,
            "check": {"kind": "field_equals", "field": "capabilities", "value": "pricing-page"}
        }]),
    )
}

fn seat_and_api_engine() -> Engine {
    let (dimensions, criteria) = single_criterion_checklist();
    engine_from(json!({
        "version": "test",
        "archetypes": [
            {
                "id": "saas_seat",
                "name": "SaaS seat",
                "predicates": [
                    {"kind": "field_equals", "field": "customer_type", "value": "smb", "weight": 1.0},
                    {"kind": "field_equals", "field": "usage_patterns", "value": "seat-based", "weight": 1.0}
                ]
            },
            {
                "id": "usage_api",
                "name": "Usage API",
                "predicates": [
                    {"kind": "field_equals", "field": "usage_patterns", "value": "token-based", "weight": 1.0},
                    {"kind": "field_equals", "field": "customer_type", "value": "developer", "weight": 1.0}
                ]
            }
        ],
        "dimensions": dimensions,
        "criteria": criteria
    }))
}

#[test]
fn seat_profile_classifies_with_full_confidence() {
    let engine = seat_and_api_engine();
    let profile = BusinessProfile::new(CustomerType::Smb, RevenueStage::Growth)
        .with_usage("seat-based")
        .with_signal("inference_cost_ratio", 0.1);
    let result = engine.classify(&profile);
    assert_eq!(result.archetype().map(|a| a.as_str()), Some("saas_seat"));
    assert_eq!(result.confidence, 1.0);
    assert_eq!(result.ranking[0].satisfied, 2);
}

#[test]
fn nothing_matching_is_unclassified_at_zero() {
    let engine = seat_and_api_engine();
    let profile = BusinessProfile::new(CustomerType::Enterprise, RevenueStage::Growth);
    let result = engine.classify(&profile);
    assert!(result.is_unclassified());
    assert_eq!(result.confidence, 0.0);
    assert!(result.archetype().is_none());
}

#[test]
fn telemetry_constraint_leaves_no_compatible_model() {
    let (dimensions, criteria) = single_criterion_checklist();
    let engine = engine_from(json!({
        "version": "test",
        "archetypes": [{
            "id": "agent",
            "name": "Agent",
            "predicates": [{"kind": "field_equals", "field": "usage_patterns", "value": "task-based"}]
        }],
        "value_metrics": [{
            "id": "credits",
            "name": "Credits",
            "unit": "credit",
            "suitability": [{"kind": "field_equals", "field": "usage_patterns", "value": "task-based"}]
        }],
        "pricing_models": [{
            "id": "credit_packs",
            "name": "Credit packs",
            "compatible_value_metrics": ["credits"],
            "constraints": [{
                "name": "requires usage telemetry",
                "kind": "field_equals",
                "field": "capabilities",
                "value": "usage-telemetry"
            }],
            "rationale": "Credits let {{ archetype }} customers prepay.",
            "formula": "hybrid"
        }],
        "dimensions": dimensions,
        "criteria": criteria
    }));

    let profile = BusinessProfile::new(CustomerType::Smb, RevenueStage::Growth).with_usage("task-based");
    let evaluation = engine.evaluate(&profile);
    let result = &evaluation.recommendation;
    assert!(result.recommendations.is_empty());
    assert_eq!(result.reason, Some(ReasonCode::NoCompatibleModel));
    assert_eq!(result.excluded.len(), 1);
    assert!(matches!(
        &result.excluded[0].reason,
        ExclusionReason::UnmetConstraints { constraints } if constraints == &["requires usage telemetry".to_string()]
    ));

    let with_telemetry = profile.with_capability("usage-telemetry");
    let result = engine.evaluate(&with_telemetry).recommendation;
    assert_eq!(result.reason, None);
    assert_eq!(result.top().map(|r| r.model.as_str()), Some("credit_packs"));
    assert_eq!(result.top().map(|r| r.rationale.as_str()), Some("Credits let Agent customers prepay."));
}

#[test]
fn half_met_checklist_scores_fifty() {
    let engine = engine_from(json!({
        "version": "test",
        "archetypes": [{
            "id": "copilot",
            "name": "Copilot",
            "predicates": [{"kind": "field_equals", "field": "usage_patterns", "value": "seat-based"}]
        }],
        "dimensions": [
            {"id": "a", "name": "Dimension A"},
            {"id": "b", "name": "Dimension B"}
        ],
        "criteria": [
            {
                "id": "criterion1",
                "dimension": "a",
                "question": "Is there a pricing page?",
                "weight": 1.0,
                "check": {"kind": "field_equals", "field": "capabilities", "value": "pricing-page"}
            },
            {
                "id": "criterion2",
                "dimension": "b",
                "question": "Is usage tracked?",
                "weight": 1.0,
                "check": {"kind": "field_equals", "field": "capabilities", "value": "usage-tracking"},
                "action": "Instrument usage before changing the pricing model."
            }
        ]
    }));

    let profile = BusinessProfile::new(CustomerType::Smb, RevenueStage::Growth).with_capability("pricing-page");
    let scorecard = engine.score(&profile);
    assert_eq!(scorecard.composite, 50.0);
    let unmet: Vec<_> = scorecard.unmet.iter().map(|u| u.criterion.as_str()).collect();
    assert_eq!(unmet, ["criterion2"]);
    assert_eq!(scorecard.dimensions[0].score, 1.0);
    assert_eq!(scorecard.dimensions[1].score, 0.0);
    assert_eq!(scorecard.priority_actions.len(), 1);
    assert_eq!(scorecard.priority_actions[0].lost_points, 50.0);
}

#[test]
fn reference_errors_are_reported_together() {
    let data: ReferenceData = serde_json::from_value(json!({
        "version": "broken",
        "archetypes": [{"id": "agent", "name": "", "predicates": []}],
        "pricing_models": [{
            "id": "outcome",
            "name": "Outcome",
            "compatible_value_metrics": ["missing_metric"],
            "rationale": "Priced per {{ discount }}.",
            "formula": "outcome"
        }]
    }))
    .expect("reference json");
    let error = Catalog::new(data).expect_err("invalid reference data");
    assert!(error.issues.len() >= 4, "{error}");
}
