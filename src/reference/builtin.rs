use std::collections::BTreeSet;

use crate::profile::ProfileField;
use crate::reference::schema::{
    ArchetypeDefinition, CatalogId, Comparable, Comparison, Condition, FormulaKind,
    HealthCriterion, HealthDimension, ModelConstraint, Predicate, PricingModel, ReferenceData,
    ValueMetric,
};

pub const BUILTIN_VERSION: &str = "2026.1";

pub const COPILOT: &str = "copilot";
pub const AGENT: &str = "agent";
pub const AI_SERVICE: &str = "ai_service";

/// Reference tables shipped with the binary: the three AI business-model
/// archetypes with their value metrics, pricing models, health checklist
/// and comparable companies.
pub fn builtin_dataset() -> ReferenceData {
    ReferenceData {
        version: BUILTIN_VERSION.to_string(),
        archetypes: archetypes(),
        value_metrics: value_metrics(),
        pricing_models: pricing_models(),
        dimensions: dimensions(),
        criteria: criteria(),
        comparables: comparables(),
    }
}

fn ids(values: &[&str]) -> BTreeSet<CatalogId> {
    values.iter().map(|v| CatalogId::from(*v)).collect()
}

fn usage_any(values: &[&str], weight: f64) -> Predicate {
    Predicate::new(Condition::in_set(ProfileField::UsagePatterns, values), weight)
}

fn has_capability(tag: &str) -> Condition {
    Condition::equals(ProfileField::Capabilities, tag)
}

fn customer_any(values: &[&str], weight: f64) -> Predicate {
    Predicate::new(Condition::in_set(ProfileField::CustomerType, values), weight)
}

fn signal(name: &str, op: Comparison, value: f64, weight: f64) -> Predicate {
    Predicate::new(Condition::threshold(name, op, value), weight)
}

fn archetypes() -> Vec<ArchetypeDefinition> {
    vec![
        ArchetypeDefinition {
            id: AGENT.into(),
            name: "Agent".to_string(),
            description: "Completes entire tasks or workflows with minimal human \
                intervention. Value is measured in outcomes delivered, not time spent \
                in the product."
                .to_string(),
            pricing_implications: "Outcome-based or per-task pricing aligns cost with \
                value delivered. Minimum commitments smooth usage variance."
                .to_string(),
            examples: vec![
                "Intercom Fin - resolves support tickets autonomously".to_string(),
                "Devin - completes coding tasks end-to-end".to_string(),
                "Resolve AI - autonomous incident response".to_string(),
            ],
            principles: vec![
                "Charge for outcomes, not effort: agents replace work, so price the \
                    result rather than the compute behind it."
                    .to_string(),
                "Cap the downside: minimum commitments protect against usage variance \
                    while keeping the outcome promise."
                    .to_string(),
                "Build trust with transparency: show customers what the agent did and \
                    what it saved; this drives upsell."
                    .to_string(),
            ],
            predicates: vec![
                usage_any(&["task-based", "automation", "workflow-based"], 0.35),
                signal("autonomy", Comparison::AtLeast, 0.6, 0.3),
                usage_any(&["outcome-based"], 0.2),
                customer_any(&["smb", "enterprise"], 0.15),
            ],
        },
        ArchetypeDefinition {
            id: AI_SERVICE.into(),
            name: "AI-enabled Service".to_string(),
            description: "Delivers a finished output that replaces work previously \
                bought from agencies, consultants or service providers, often with a \
                human QA layer."
                .to_string(),
            pricing_implications: "Anchor to the cost of the service replaced, at a \
                discount. Per-deliverable pricing makes the value concrete."
                .to_string(),
            examples: vec![
                "EvenUp - demand packages replacing paralegal work".to_string(),
                "Pepper Content - content replacing freelance writers".to_string(),
                "Jasper - marketing copy replacing agency work".to_string(),
            ],
            principles: vec![
                "Anchor to what you replace: the price ceiling is the cost of the human \
                    service displaced, minus a discount for switching risk."
                    .to_string(),
                "Per-deliverable pricing makes ROI obvious: customers paying per output \
                    compare cost directly against the alternative."
                    .to_string(),
                "Add SLA tiers for premium capture: speed, quality guarantees and \
                    dedicated support justify 2-3x pricing for enterprise."
                    .to_string(),
            ],
            predicates: vec![
                usage_any(&["deliverable-based", "per-output", "outcome-based"], 0.35),
                Predicate::new(has_capability("human-qa"), 0.25),
                signal("service_replacement", Comparison::AtLeast, 0.5, 0.25),
                customer_any(&["smb", "enterprise"], 0.15),
            ],
        },
        ArchetypeDefinition {
            id: COPILOT.into(),
            name: "Copilot".to_string(),
            description: "Works alongside a human in real time, suggesting, drafting \
                and recommending while the user stays in control. Value scales with \
                adoption across an organization."
                .to_string(),
            pricing_implications: "Per-seat pricing ties revenue to individual users; \
                feature tiers capture different willingness to pay."
                .to_string(),
            examples: vec![
                "GitHub Copilot - in-editor pair programmer".to_string(),
                "Grammarly - writing assistant".to_string(),
                "Notion AI - drafting inside the user's workflow".to_string(),
            ],
            principles: vec![
                "Price for adoption: copilots succeed when every user activates, so keep \
                    per-seat prices accessible for org-wide rollout."
                    .to_string(),
                "Feature-gate, don't usage-gate: copilot value is continuous and users \
                    should not worry about running out of interactions."
                    .to_string(),
                "Track seats and engagement: revenue scales with both headcount and daily active usage."
                    .to_string(),
            ],
            predicates: vec![
                usage_any(&["seat-based", "in-app-assist", "chat"], 0.35),
                Predicate::new(has_capability("human-in-the-loop"), 0.25),
                signal("autonomy", Comparison::AtMost, 0.4, 0.25),
                customer_any(&["smb", "enterprise", "developer"], 0.15),
            ],
        },
    ]
}

fn value_metrics() -> Vec<ValueMetric> {
    vec![
        ValueMetric {
            id: "credits".into(),
            name: "Prepaid credits".to_string(),
            unit: "credit".to_string(),
            description: "Customers buy blocks of usage up front and draw them down."
                .to_string(),
            applicable_archetypes: BTreeSet::new(),
            suitability: vec![
                usage_any(&["token-based", "api-based"], 1.0),
                signal("cost_variance", Comparison::AtLeast, 0.5, 1.0),
            ],
        },
        ValueMetric {
            id: "feature_tier".into(),
            name: "Feature tier".to_string(),
            unit: "tier/month".to_string(),
            description: "Packages gate advanced capabilities rather than usage.".to_string(),
            applicable_archetypes: ids(&[COPILOT]),
            suitability: vec![
                customer_any(&["consumer", "smb"], 1.0),
                Predicate::new(has_capability("pricing-page"), 1.0),
            ],
        },
        ValueMetric {
            id: "per_account".into(),
            name: "Per account".to_string(),
            unit: "account/month".to_string(),
            description: "One subscription per customer account, independent of usage."
                .to_string(),
            applicable_archetypes: BTreeSet::new(),
            suitability: vec![
                customer_any(&["consumer", "smb"], 1.0),
                Predicate::new(
                    Condition::in_set(ProfileField::RevenueStage, &["pre_revenue", "early"]),
                    1.0,
                ),
            ],
        },
        ValueMetric {
            id: "per_deliverable".into(),
            name: "Per deliverable".to_string(),
            unit: "deliverable".to_string(),
            description: "Each finished output (document, asset, case) is billed."
                .to_string(),
            applicable_archetypes: ids(&[AI_SERVICE]),
            suitability: vec![
                usage_any(&["deliverable-based", "per-output"], 1.0),
                Predicate::new(has_capability("human-qa"), 1.0),
            ],
        },
        ValueMetric {
            id: "per_outcome".into(),
            name: "Per outcome".to_string(),
            unit: "resolution".to_string(),
            description: "Billing happens only when a measurable result is achieved."
                .to_string(),
            applicable_archetypes: ids(&[AGENT, AI_SERVICE]),
            suitability: vec![
                usage_any(&["outcome-based"], 1.0),
                Predicate::new(has_capability("outcome-tracking"), 1.0),
                signal("roi_hardness", Comparison::AtLeast, 0.5, 1.0),
            ],
        },
        ValueMetric {
            id: "per_seat".into(),
            name: "Per seat".to_string(),
            unit: "seat/month".to_string(),
            description: "Each named user pays; revenue grows with adoption.".to_string(),
            applicable_archetypes: ids(&[COPILOT]),
            suitability: vec![
                usage_any(&["seat-based"], 1.0),
                customer_any(&["smb", "enterprise"], 1.0),
                Predicate::new(
                    Condition::in_set(ProfileField::RevenueStage, &["growth", "scale"]),
                    1.0,
                ),
            ],
        },
        ValueMetric {
            id: "per_task".into(),
            name: "Per task".to_string(),
            unit: "task".to_string(),
            description: "Each completed task or workflow run is billed.".to_string(),
            applicable_archetypes: ids(&[AGENT, AI_SERVICE]),
            suitability: vec![
                usage_any(&["task-based", "workflow-based", "automation"], 1.0),
                Predicate::new(has_capability("usage-telemetry"), 1.0),
            ],
        },
        ValueMetric {
            id: "per_token".into(),
            name: "Per token".to_string(),
            unit: "1K tokens".to_string(),
            description: "Consumption is metered on tokens or API calls.".to_string(),
            applicable_archetypes: ids(&[AGENT, COPILOT]),
            suitability: vec![
                usage_any(&["token-based", "api-based"], 1.0),
                customer_any(&["developer"], 1.0),
                Predicate::new(has_capability("usage-telemetry"), 1.0),
            ],
        },
        ValueMetric {
            id: "platform_fee".into(),
            name: "Platform fee".to_string(),
            unit: "year".to_string(),
            description: "A fixed access fee that covers baseline cost and support."
                .to_string(),
            applicable_archetypes: ids(&[AGENT, AI_SERVICE, COPILOT]),
            suitability: vec![
                Predicate::new(
                    Condition::in_set(ProfileField::RevenueStage, &["growth", "scale"]),
                    1.0,
                ),
                customer_any(&["enterprise"], 1.0),
            ],
        },
    ]
}

fn requires(name: &str, condition: Condition) -> ModelConstraint {
    ModelConstraint {
        name: name.to_string(),
        condition,
    }
}

fn pricing_models() -> Vec<PricingModel> {
    vec![
        PricingModel {
            id: "credit_packs".into(),
            name: "Prepaid Credit Packs".to_string(),
            description: "Customers prepay for usage in blocks.".to_string(),
            compatible_value_metrics: ids(&["credits", "per_token"]),
            compatible_archetypes: BTreeSet::new(),
            designed_for: None,
            constraints: vec![requires(
                "requires usage telemetry",
                has_capability("usage-telemetry"),
            )],
            rationale: "Prepaid credits let a {{ archetype }} charge for consumption without \
                surprise invoices; {{ customer }} buyers budget up front while {{ metrics }} keeps \
                revenue tied to what they use."
                .to_string(),
            formula: FormulaKind::Hybrid,
        },
        PricingModel {
            id: "flat_subscription".into(),
            name: "Flat Subscription".to_string(),
            description: "One price per account with optional tiers.".to_string(),
            compatible_value_metrics: ids(&["per_account", "platform_fee"]),
            compatible_archetypes: BTreeSet::new(),
            designed_for: None,
            constraints: Vec::new(),
            rationale: "A flat subscription keeps the offer simple for {{ customer }} buyers \
                while the {{ archetype }} model firms up; revisit once {{ primary_metric }} can \
                be measured per customer."
                .to_string(),
            formula: FormulaKind::PerSeat,
        },
        PricingModel {
            id: "hybrid_outcome_credits".into(),
            name: "Hybrid (Base + Outcome Credits)".to_string(),
            description: "A base fee covers fixed cost; outcome credits capture upside."
                .to_string(),
            compatible_value_metrics: ids(&["platform_fee", "per_outcome", "credits"]),
            compatible_archetypes: ids(&[AGENT]),
            designed_for: Some(AGENT.into()),
            constraints: vec![requires(
                "requires outcome tracking",
                has_capability("outcome-tracking"),
            )],
            rationale: "Your {{ archetype }} delivers measurable results but cost variance \
                makes pure outcome pricing risky. A base fee covers fixed cost while \
                credits on {{ metrics }} capture the upside."
                .to_string(),
            formula: FormulaKind::Hybrid,
        },
        PricingModel {
            id: "hybrid_usage".into(),
            name: "Hybrid (Base + Usage Tiers)".to_string(),
            description: "Platform fee plus usage tiers.".to_string(),
            compatible_value_metrics: ids(&["platform_fee", "per_token", "credits"]),
            compatible_archetypes: ids(&[AGENT, COPILOT]),
            designed_for: Some(COPILOT.into()),
            constraints: vec![requires(
                "requires usage telemetry",
                has_capability("usage-telemetry"),
            )],
            rationale: "A platform fee gives a {{ archetype }} revenue predictability while \
                usage tiers on {{ metrics }} align revenue with the value {{ customer }} users \
                extract and protect margin when costs vary."
                .to_string(),
            formula: FormulaKind::Hybrid,
        },
        PricingModel {
            id: "outcome_based".into(),
            name: "Outcome-based".to_string(),
            description: "Charge per successful outcome.".to_string(),
            compatible_value_metrics: ids(&["per_outcome", "per_task"]),
            compatible_archetypes: ids(&[AGENT]),
            designed_for: Some(AGENT.into()),
            constraints: vec![
                requires(
                    "requires outcome tracking",
                    has_capability("outcome-tracking"),
                ),
                requires(
                    "cost variance must be manageable",
                    Condition::threshold("cost_variance", Comparison::AtMost, 0.6),
                ),
            ],
            rationale: "Your {{ archetype }} delivers measurable results with manageable \
                cost variance. Charging on {{ primary_metric }} aligns price with the value \
                {{ customer }} customers receive and makes ROI self-evident."
                .to_string(),
            formula: FormulaKind::Outcome,
        },
        PricingModel {
            id: "outcome_per_deliverable".into(),
            name: "Outcome-based (Per Deliverable)".to_string(),
            description: "Charge per finished deliverable.".to_string(),
            compatible_value_metrics: ids(&["per_deliverable", "per_outcome"]),
            compatible_archetypes: ids(&[AI_SERVICE]),
            designed_for: Some(AI_SERVICE.into()),
            constraints: vec![requires(
                "requires measurable ROI",
                Condition::threshold("roi_hardness", Comparison::AtLeast, 0.5),
            )],
            rationale: "An {{ archetype }} replaces existing spend. Pricing on {{ metrics }} \
                anchors to the service you replace and makes the ROI calculation trivial \
                for {{ customer }} buyers."
                .to_string(),
            formula: FormulaKind::Outcome,
        },
        PricingModel {
            id: "per_seat_tiers".into(),
            name: "Per-seat + Feature Tiers".to_string(),
            description: "Per-user pricing with capability tiers.".to_string(),
            compatible_value_metrics: ids(&["per_seat", "feature_tier"]),
            compatible_archetypes: ids(&[COPILOT]),
            designed_for: Some(COPILOT.into()),
            constraints: vec![requires(
                "requires predictable inference cost",
                Condition::threshold("cost_variance", Comparison::AtMost, 0.4),
            )],
            rationale: "A {{ archetype }} with predictable cost captures value as adoption \
                grows. {{ model }} prices on {{ metrics }} so expansion across {{ customer }} teams \
                shows up as revenue."
                .to_string(),
            formula: FormulaKind::PerSeat,
        },
        PricingModel {
            id: "workflow_per_task".into(),
            name: "Workflow-based (Per Task)".to_string(),
            description: "Charge per completed task.".to_string(),
            compatible_value_metrics: ids(&["per_task"]),
            compatible_archetypes: ids(&[AGENT, AI_SERVICE]),
            designed_for: Some(AGENT.into()),
            constraints: vec![requires(
                "requires usage telemetry",
                has_capability("usage-telemetry"),
            )],
            rationale: "Charging on {{ primary_metric }} makes the price concrete and \
                predictable for {{ customer }} buyers of a {{ archetype }}, and caps cost \
                exposure per unit of revenue."
                .to_string(),
            formula: FormulaKind::Workflow,
        },
        PricingModel {
            id: "workflow_sla_tiers".into(),
            name: "Workflow-based + SLA Tiers".to_string(),
            description: "Per-workflow pricing with turnaround and quality tiers."
                .to_string(),
            compatible_value_metrics: ids(&["per_deliverable", "per_task", "platform_fee"]),
            compatible_archetypes: ids(&[AI_SERVICE]),
            designed_for: Some(AI_SERVICE.into()),
            constraints: Vec::new(),
            rationale: "Workflow pricing on {{ metrics }} keeps the unit economics of an \
                {{ archetype }} clear, while SLA tiers let premium {{ customer }} customers pay \
                for speed and quality guarantees."
                .to_string(),
            formula: FormulaKind::Workflow,
        },
    ]
}

fn dimensions() -> Vec<HealthDimension> {
    ["alignment", "simplicity", "scalability", "defensibility"]
        .into_iter()
        .zip(["Alignment", "Simplicity", "Scalability", "Defensibility"])
        .map(|(id, name)| HealthDimension {
            id: id.into(),
            name: name.to_string(),
            weight: None,
        })
        .collect()
}

fn criterion(
    id: &str,
    dimension: &str,
    weight: f64,
    question: &str,
    check: Condition,
    action: &str,
) -> HealthCriterion {
    HealthCriterion {
        id: id.into(),
        dimension: dimension.into(),
        question: question.to_string(),
        weight,
        check,
        action: action.to_string(),
    }
}

fn criteria() -> Vec<HealthCriterion> {
    vec![
        criterion(
            "model_fit",
            "alignment",
            0.4,
            "Is the pricing model matched to how the product delivers value?",
            has_capability("value-aligned-pricing"),
            "Map the delivery model (copilot, agent or service) to the pricing models \
             buyers expect. Misalignment between how value is delivered and how you charge \
             is the most common source of pricing friction.",
        ),
        criterion(
            "ai_metrics",
            "alignment",
            0.3,
            "Do you track AI-specific metrics such as cost per interaction?",
            has_capability("ai-metrics"),
            "Track cost per AI interaction, resolution rate, value delivered per dollar \
             of inference and output quality alongside NRR and CAC.",
        ),
        criterion(
            "free_to_paid",
            "alignment",
            0.3,
            "Are upgrades triggered by value signals rather than a trial clock?",
            has_capability("activation-signals"),
            "Define activation signals (several high-value outputs, team sharing, an \
             integration set up) and convert on those instead of time-boxed trials.",
        ),
        criterion(
            "price_clarity",
            "simplicity",
            0.6,
            "Can a first-time visitor tell what they will pay?",
            has_capability("pricing-page"),
            "Make the pricing page pass a five-second test: drop usage dimensions that \
             need explanation and anchor on a metric the buyer already tracks.",
        ),
        criterion(
            "self_serve",
            "simplicity",
            0.4,
            "Can customers buy and expand without custom quotes?",
            has_capability("self-serve-billing"),
            "Remove custom quotes, manual provisioning and per-customer exceptions where \
             possible; each adds overhead that compounds as you grow.",
        ),
        criterion(
            "cost_monitoring",
            "scalability",
            0.35,
            "Do you monitor inference cost per customer?",
            has_capability("cost-monitoring"),
            "Build a per-customer inference cost dashboard with spike alerts, and use \
             caps, prompt caching or model cascading to reduce variance.",
        ),
        criterion(
            "unit_economics",
            "scalability",
            0.35,
            "Is gross margin at or above half of revenue?",
            Condition::threshold("gross_margin", Comparison::AtLeast, 0.5),
            "Model unit economics with every hidden cost: inference, fine-tuning, human \
             review, storage and retraining. True costs are often 30-50% higher than \
             first estimates.",
        ),
        criterion(
            "cost_headroom",
            "scalability",
            0.3,
            "Does inference stay under 35% of revenue?",
            Condition::threshold("inference_cost_ratio", Comparison::AtMost, 0.35),
            "Stress-test pricing against doubled inference cost, doubled usage and a \
             competitor free tier. A break under any scenario is a sustainability gap.",
        ),
        criterion(
            "pricing_moat",
            "defensibility",
            0.6,
            "Does differentiation come from more than the foundation model?",
            Condition::in_set(
                ProfileField::Capabilities,
                &["proprietary-data", "workflow-integration", "domain-expertise"],
            ),
            "If competitors use the same foundation models, differentiate on proprietary \
             data, fine-tuning, workflow integration or domain expertise and price the \
             outcome rather than the model.",
        ),
        criterion(
            "usage_metering",
            "defensibility",
            0.4,
            "Is usage metered per customer?",
            has_capability("usage-telemetry"),
            "Meter usage per customer so pricing changes can be tested against real \
             consumption before they ship.",
        ),
    ]
}

fn comparable(
    company: &str,
    archetype: &str,
    pricing_model: &str,
    detail: &str,
    value_driver: &str,
) -> Comparable {
    Comparable {
        company: company.to_string(),
        archetype: archetype.into(),
        pricing_model: pricing_model.to_string(),
        detail: detail.to_string(),
        value_driver: value_driver.to_string(),
    }
}

fn comparables() -> Vec<Comparable> {
    vec![
        comparable(
            "DeepL",
            COPILOT,
            "Hybrid",
            "Per user + per editable file",
            "Accuracy & customization",
        ),
        comparable(
            "EvenUp",
            AI_SERVICE,
            "Outcome-based",
            "Per AI-generated demand package",
            "Legal time saved",
        ),
        comparable(
            "Graph AI",
            AI_SERVICE,
            "Outcome-based",
            "Per case processed",
            "Regulatory compliance",
        ),
        comparable(
            "Intercom (Fin)",
            AGENT,
            "Outcome-based",
            "$0.99 per AI resolution",
            "Support efficiency",
        ),
        comparable(
            "Leena AI",
            AGENT,
            "Outcome-based",
            "ROI-basis, ticket threshold",
            "Back office automation",
        ),
        comparable(
            "Pepper Content",
            AI_SERVICE,
            "Outcome-based",
            "Per word/graphic/content piece",
            "Assets created",
        ),
        comparable(
            "Resolve AI",
            AGENT,
            "Outcome-based",
            "Pay when AI ensures uptime",
            "Reliability",
        ),
        comparable(
            "Sett.ai",
            AGENT,
            "Hybrid",
            "Per module + share of ad spend",
            "Campaign performance",
        ),
        comparable(
            "Zenskar",
            AI_SERVICE,
            "Hybrid",
            "Annual subscription + usage fees",
            "Billing automation",
        ),
    ]
}
