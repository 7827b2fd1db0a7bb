use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

use crate::profile::{normalize_key, normalize_tag, CustomerType, ProfileField, RevenueStage};
use crate::reference::schema::{CatalogId, Condition, Predicate, ReferenceData};
use crate::reference::template::{RationaleTemplate, TemplateError};

pub const WEIGHT_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigIssue {
    #[error("{catalog} `{id}`: duplicate id")]
    DuplicateId { catalog: &'static str, id: CatalogId },
    #[error("{catalog} `{id}`: missing required field `{field}`")]
    MissingField {
        catalog: &'static str,
        id: CatalogId,
        field: &'static str,
    },
    #[error("{catalog} `{id}`: weight {weight} is negative or not finite")]
    InvalidWeight {
        catalog: &'static str,
        id: CatalogId,
        weight: f64,
    },
    #[error("{catalog} `{id}`: weight {weight} must be in (0, 1]")]
    WeightOutOfRange {
        catalog: &'static str,
        id: CatalogId,
        weight: f64,
    },
    #[error("archetype `{0}`: predicate weights sum to zero")]
    ZeroWeightSum(CatalogId),
    #[error("dimension `{dimension}`: criterion weights sum to {sum}, expected 1")]
    CriterionWeightSum { dimension: CatalogId, sum: f64 },
    #[error("dimension weights sum to {0}, expected 1")]
    DimensionWeightSum(f64),
    #[error("dimension weights must be given for every dimension or for none")]
    PartialDimensionWeights,
    #[error("dimension `{0}` has no criteria")]
    EmptyDimension(CatalogId),
    #[error("{catalog} `{id}` references unknown {target} `{reference}`")]
    DanglingReference {
        catalog: &'static str,
        id: CatalogId,
        target: &'static str,
        reference: CatalogId,
    },
    #[error("{catalog} `{id}`: condition `{condition}` is invalid: {reason}")]
    InvalidCondition {
        catalog: &'static str,
        id: CatalogId,
        condition: String,
        reason: &'static str,
    },
    #[error("pricing model `{id}`: rationale template: {error}")]
    Template { id: CatalogId, error: TemplateError },
    #[error("health checklist has no criteria")]
    NoCriteria,
    #[error("setting `{name}` = {value} is out of range")]
    SettingOutOfRange { name: &'static str, value: f64 },
}

/// Every problem found in one validation pass. Nothing is corrected; a
/// non-empty list aborts engine construction.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("reference data failed validation: {}", render_issues(.issues))]
pub struct ConfigurationError {
    pub issues: Vec<ConfigIssue>,
}

impl ConfigurationError {
    pub fn single(issue: ConfigIssue) -> Self {
        Self {
            issues: vec![issue],
        }
    }
}

fn render_issues(issues: &[ConfigIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Checks structure, weights and cross references, and parses every
/// rationale template. Returns the parsed templates keyed by model id.
pub fn validate(
    data: &ReferenceData,
) -> Result<BTreeMap<CatalogId, RationaleTemplate>, ConfigurationError> {
    let mut issues = Vec::new();

    let archetype_ids = unique_ids(
        "archetype",
        data.archetypes.iter().map(|a| &a.id),
        &mut issues,
    );
    let metric_ids = unique_ids(
        "value metric",
        data.value_metrics.iter().map(|m| &m.id),
        &mut issues,
    );
    unique_ids(
        "pricing model",
        data.pricing_models.iter().map(|m| &m.id),
        &mut issues,
    );
    let dimension_ids = unique_ids(
        "dimension",
        data.dimensions.iter().map(|d| &d.id),
        &mut issues,
    );
    unique_ids(
        "criterion",
        data.criteria.iter().map(|c| &c.id),
        &mut issues,
    );

    for archetype in &data.archetypes {
        require_text("archetype", &archetype.id, "name", &archetype.name, &mut issues);
        for principle in &archetype.principles {
            require_text("archetype", &archetype.id, "principles", principle, &mut issues);
        }
        check_predicates("archetype", &archetype.id, &archetype.predicates, &mut issues);
        let total: f64 = archetype.predicates.iter().map(|p| p.weight.max(0.0)).sum();
        if total <= 0.0 {
            issues.push(ConfigIssue::ZeroWeightSum(archetype.id.clone()));
        }
    }

    for metric in &data.value_metrics {
        require_text("value metric", &metric.id, "name", &metric.name, &mut issues);
        check_predicates("value metric", &metric.id, &metric.suitability, &mut issues);
        for archetype in &metric.applicable_archetypes {
            check_reference(
                "value metric",
                &metric.id,
                "archetype",
                archetype,
                &archetype_ids,
                &mut issues,
            );
        }
    }

    let mut templates = BTreeMap::new();
    for model in &data.pricing_models {
        require_text("pricing model", &model.id, "name", &model.name, &mut issues);
        if model.compatible_value_metrics.is_empty() {
            issues.push(ConfigIssue::MissingField {
                catalog: "pricing model",
                id: model.id.clone(),
                field: "compatible_value_metrics",
            });
        }
        for metric in &model.compatible_value_metrics {
            check_reference(
                "pricing model",
                &model.id,
                "value metric",
                metric,
                &metric_ids,
                &mut issues,
            );
        }
        for archetype in model
            .compatible_archetypes
            .iter()
            .chain(model.designed_for.iter())
        {
            check_reference(
                "pricing model",
                &model.id,
                "archetype",
                archetype,
                &archetype_ids,
                &mut issues,
            );
        }
        for constraint in &model.constraints {
            require_text(
                "pricing model",
                &model.id,
                "constraints.name",
                &constraint.name,
                &mut issues,
            );
            check_condition("pricing model", &model.id, &constraint.condition, &mut issues);
        }
        match RationaleTemplate::parse(&model.rationale) {
            Ok(template) => {
                templates.insert(model.id.clone(), template);
            }
            Err(error) => issues.push(ConfigIssue::Template {
                id: model.id.clone(),
                error,
            }),
        }
    }

    check_health_checklist(data, &dimension_ids, &mut issues);

    if issues.is_empty() {
        Ok(templates)
    } else {
        Err(ConfigurationError { issues })
    }
}

fn check_health_checklist(
    data: &ReferenceData,
    dimension_ids: &BTreeSet<CatalogId>,
    issues: &mut Vec<ConfigIssue>,
) {
    if data.criteria.is_empty() {
        issues.push(ConfigIssue::NoCriteria);
    }

    let mut sums: BTreeMap<&CatalogId, f64> = BTreeMap::new();
    for criterion in &data.criteria {
        require_text(
            "criterion",
            &criterion.id,
            "question",
            &criterion.question,
            issues,
        );
        if !criterion.weight.is_finite() || criterion.weight <= 0.0 || criterion.weight > 1.0 {
            issues.push(ConfigIssue::WeightOutOfRange {
                catalog: "criterion",
                id: criterion.id.clone(),
                weight: criterion.weight,
            });
        }
        check_condition("criterion", &criterion.id, &criterion.check, issues);
        if check_reference(
            "criterion",
            &criterion.id,
            "dimension",
            &criterion.dimension,
            dimension_ids,
            issues,
        ) {
            *sums.entry(&criterion.dimension).or_insert(0.0) += criterion.weight;
        }
    }

    for dimension in &data.dimensions {
        match sums.get(&dimension.id) {
            None => issues.push(ConfigIssue::EmptyDimension(dimension.id.clone())),
            Some(sum) if (sum - 1.0).abs() > WEIGHT_TOLERANCE => {
                issues.push(ConfigIssue::CriterionWeightSum {
                    dimension: dimension.id.clone(),
                    sum: *sum,
                })
            }
            Some(_) => {}
        }
    }

    let weighted = data
        .dimensions
        .iter()
        .filter(|d| d.weight.is_some())
        .count();
    if weighted > 0 && weighted < data.dimensions.len() {
        issues.push(ConfigIssue::PartialDimensionWeights);
    } else if weighted > 0 {
        let mut total = 0.0;
        for dimension in &data.dimensions {
            let weight = dimension.weight.unwrap_or(0.0);
            if !weight.is_finite() || weight <= 0.0 || weight > 1.0 {
                issues.push(ConfigIssue::WeightOutOfRange {
                    catalog: "dimension",
                    id: dimension.id.clone(),
                    weight,
                });
            }
            total += weight;
        }
        if (total - 1.0).abs() > WEIGHT_TOLERANCE {
            issues.push(ConfigIssue::DimensionWeightSum(total));
        }
    }
}

fn unique_ids<'a>(
    catalog: &'static str,
    ids: impl Iterator<Item = &'a CatalogId>,
    issues: &mut Vec<ConfigIssue>,
) -> BTreeSet<CatalogId> {
    let mut seen = BTreeSet::new();
    for id in ids {
        if id.as_str().trim().is_empty() {
            issues.push(ConfigIssue::MissingField {
                catalog,
                id: id.clone(),
                field: "id",
            });
            continue;
        }
        if !seen.insert(id.clone()) {
            issues.push(ConfigIssue::DuplicateId {
                catalog,
                id: id.clone(),
            });
        }
    }
    seen
}

fn require_text(
    catalog: &'static str,
    id: &CatalogId,
    field: &'static str,
    value: &str,
    issues: &mut Vec<ConfigIssue>,
) {
    if value.trim().is_empty() {
        issues.push(ConfigIssue::MissingField {
            catalog,
            id: id.clone(),
            field,
        });
    }
}

fn check_reference(
    catalog: &'static str,
    id: &CatalogId,
    target: &'static str,
    reference: &CatalogId,
    known: &BTreeSet<CatalogId>,
    issues: &mut Vec<ConfigIssue>,
) -> bool {
    if known.contains(reference) {
        return true;
    }
    issues.push(ConfigIssue::DanglingReference {
        catalog,
        id: id.clone(),
        target,
        reference: reference.clone(),
    });
    false
}

fn check_predicates(
    catalog: &'static str,
    id: &CatalogId,
    predicates: &[Predicate],
    issues: &mut Vec<ConfigIssue>,
) {
    for predicate in predicates {
        if !predicate.weight.is_finite() || predicate.weight < 0.0 {
            issues.push(ConfigIssue::InvalidWeight {
                catalog,
                id: id.clone(),
                weight: predicate.weight,
            });
        }
        check_condition(catalog, id, &predicate.condition, issues);
    }
}

fn check_condition(
    catalog: &'static str,
    id: &CatalogId,
    condition: &Condition,
    issues: &mut Vec<ConfigIssue>,
) {
    let reason = condition_problem(condition);
    if let Some(reason) = reason {
        issues.push(ConfigIssue::InvalidCondition {
            catalog,
            id: id.clone(),
            condition: condition.to_string(),
            reason,
        });
    }
}

fn condition_problem(condition: &Condition) -> Option<&'static str> {
    match condition {
        Condition::NumericThreshold { field, value, .. } => {
            if !field.is_numeric() {
                Some("numeric threshold on a non-numeric field")
            } else if !value.is_finite() {
                Some("threshold is not finite")
            } else {
                None
            }
        }
        Condition::FieldEquals { field, value } => {
            expected_value_problem(field, std::slice::from_ref(value))
        }
        Condition::FieldInSet { field, values } => {
            if values.is_empty() {
                Some("empty value set")
            } else {
                expected_value_problem(field, values)
            }
        }
    }
}

fn expected_value_problem(field: &ProfileField, values: &[String]) -> Option<&'static str> {
    match field {
        ProfileField::CostSignal(_) => Some("equality test on a numeric field"),
        ProfileField::CustomerType => values
            .iter()
            .any(|v| {
                !CustomerType::ALL
                    .iter()
                    .any(|c| c.as_slug() == normalize_key(v))
            })
            .then_some("value is not a customer type"),
        ProfileField::RevenueStage => values
            .iter()
            .any(|v| {
                !RevenueStage::ALL
                    .iter()
                    .any(|s| s.as_slug() == normalize_key(v))
            })
            .then_some("value is not a revenue stage"),
        ProfileField::UsagePatterns | ProfileField::Capabilities => values
            .iter()
            .any(|v| normalize_tag(v).is_empty())
            .then_some("empty tag"),
    }
}
