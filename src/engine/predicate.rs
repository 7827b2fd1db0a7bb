use crate::profile::{normalize_key, normalize_tag, BusinessProfile, FieldValue};
use crate::reference::{Condition, Predicate};

/// Single dispatch point for every rule in the reference tables.
pub fn evaluate_condition(profile: &BusinessProfile, condition: &Condition) -> bool {
    let observed = profile.field_value(condition.field());
    match (observed, condition) {
        (FieldValue::Text(actual), Condition::FieldEquals { value, .. }) => {
            actual == normalize_key(value)
        }
        (FieldValue::Text(actual), Condition::FieldInSet { values, .. }) => {
            values.iter().any(|v| actual == normalize_key(v))
        }
        (FieldValue::Tags(tags), Condition::FieldEquals { value, .. }) => {
            tags.contains(&normalize_tag(value))
        }
        (FieldValue::Tags(tags), Condition::FieldInSet { values, .. }) => {
            values.iter().any(|v| tags.contains(&normalize_tag(v)))
        }
        (FieldValue::Numeric(actual), Condition::NumericThreshold { op, value, .. }) => {
            op.holds(actual, *value)
        }
        _ => false,
    }
}

/// Weighted and counted outcome of a predicate list.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PredicateTally {
    pub satisfied_weight: f64,
    pub total_weight: f64,
    pub satisfied: usize,
    pub total: usize,
}

impl PredicateTally {
    pub fn of(profile: &BusinessProfile, predicates: &[Predicate]) -> Self {
        let mut tally = Self::default();
        for predicate in predicates {
            let weight = predicate.weight.max(0.0);
            tally.total += 1;
            tally.total_weight += weight;
            if evaluate_condition(profile, &predicate.condition) {
                tally.satisfied += 1;
                tally.satisfied_weight += weight;
            }
        }
        tally
    }

    /// Satisfied weight over total weight, 0 when nothing carries weight.
    pub fn weighted_share(&self) -> f64 {
        if self.total_weight > 0.0 {
            (self.satisfied_weight / self.total_weight).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Satisfied count over total count, 0 for an empty list.
    pub fn count_share(&self) -> f64 {
        if self.total > 0 {
            self.satisfied as f64 / self.total as f64
        } else {
            0.0
        }
    }
}
