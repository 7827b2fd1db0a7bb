use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::profile::{
    normalize_key, normalize_tag, BusinessProfile, CustomerType, EnumParseError, RevenueStage,
};

/// Unvalidated profile record as it arrives from a file, flags or a request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileInput {
    #[serde(default)]
    pub product: Option<String>,
    #[serde(default)]
    pub customer_type: Option<String>,
    #[serde(default)]
    pub revenue_stage: Option<String>,
    #[serde(default)]
    pub usage_patterns: Vec<String>,
    #[serde(default)]
    pub capabilities: Vec<String>,
    #[serde(default)]
    pub cost_signals: BTreeMap<String, f64>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Error, PartialEq)]
pub enum InvalidProfile {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    #[error(transparent)]
    OutOfEnum(#[from] EnumParseError),
    #[error("cost signal `{name}` must be a finite number, got {value}")]
    NonFiniteSignal { name: String, value: f64 },
    #[error("cost signal names must not be empty")]
    EmptySignalName,
    #[error("usage and capability tags must not be empty")]
    EmptyTag,
    #[error("cost signals `{first}` and `{second}` both normalize to `{key}`")]
    DuplicateSignal {
        key: String,
        first: String,
        second: String,
    },
}

impl ProfileInput {
    /// Layers `overrides` on top of `self`; scalar fields are replaced when
    /// present, tag lists are merged, and a signal replaces any existing one
    /// with the same normalized name.
    pub fn merge(&mut self, overrides: ProfileInput) {
        if overrides.product.is_some() {
            self.product = overrides.product;
        }
        if overrides.customer_type.is_some() {
            self.customer_type = overrides.customer_type;
        }
        if overrides.revenue_stage.is_some() {
            self.revenue_stage = overrides.revenue_stage;
        }
        if overrides.notes.is_some() {
            self.notes = overrides.notes;
        }
        self.usage_patterns.extend(overrides.usage_patterns);
        self.capabilities.extend(overrides.capabilities);
        for (name, value) in overrides.cost_signals {
            let key = normalize_key(&name);
            self.cost_signals.retain(|existing, _| normalize_key(existing) != key);
            self.cost_signals.insert(name, value);
        }
    }

    pub fn validate(self) -> Result<BusinessProfile, InvalidProfile> {
        let customer_type: CustomerType = self
            .customer_type
            .as_deref()
            .filter(|raw| !raw.trim().is_empty())
            .ok_or(InvalidProfile::MissingField("customer_type"))?
            .parse()?;
        let revenue_stage: RevenueStage = self
            .revenue_stage
            .as_deref()
            .filter(|raw| !raw.trim().is_empty())
            .ok_or(InvalidProfile::MissingField("revenue_stage"))?
            .parse()?;

        let usage_patterns = normalize_tags(&self.usage_patterns)?;
        let capabilities = normalize_tags(&self.capabilities)?;

        let mut cost_signals = BTreeMap::new();
        let mut raw_names: BTreeMap<String, String> = BTreeMap::new();
        for (name, value) in self.cost_signals {
            let key = normalize_key(&name);
            if key.is_empty() {
                return Err(InvalidProfile::EmptySignalName);
            }
            if !value.is_finite() {
                return Err(InvalidProfile::NonFiniteSignal { name: key, value });
            }
            if let Some(first) = raw_names.insert(key.clone(), name.clone()) {
                return Err(InvalidProfile::DuplicateSignal {
                    key,
                    first,
                    second: name,
                });
            }
            cost_signals.insert(key, value);
        }

        Ok(BusinessProfile {
            product: self.product.unwrap_or_default().trim().to_string(),
            customer_type,
            revenue_stage,
            usage_patterns,
            capabilities,
            cost_signals,
            notes: self.notes.unwrap_or_default(),
        })
    }
}

impl TryFrom<ProfileInput> for BusinessProfile {
    type Error = InvalidProfile;

    fn try_from(value: ProfileInput) -> Result<Self, Self::Error> {
        value.validate()
    }
}

impl From<&BusinessProfile> for ProfileInput {
    fn from(profile: &BusinessProfile) -> Self {
        Self {
            product: Some(profile.product.clone()),
            customer_type: Some(profile.customer_type.as_slug().to_string()),
            revenue_stage: Some(profile.revenue_stage.as_slug().to_string()),
            usage_patterns: profile.usage_patterns.iter().cloned().collect(),
            capabilities: profile.capabilities.iter().cloned().collect(),
            cost_signals: profile.cost_signals.clone(),
            notes: Some(profile.notes.clone()),
        }
    }
}

fn normalize_tags(raw: &[String]) -> Result<BTreeSet<String>, InvalidProfile> {
    let mut out = BTreeSet::new();
    for tag in raw {
        let normalized = normalize_tag(tag);
        if normalized.is_empty() {
            return Err(InvalidProfile::EmptyTag);
        }
        out.insert(normalized);
    }
    Ok(out)
}

/// Reads a profile record from a `.toml` or `.json` file.
pub fn load_profile_input(path: &Path) -> Result<ProfileInput> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed reading profile: {}", path.display()))?;
    let is_toml = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("toml"))
        .unwrap_or(false);
    let parsed = if is_toml {
        toml::from_str(&data)
            .with_context(|| format!("failed parsing TOML profile: {}", path.display()))?
    } else {
        serde_json::from_str(&data)
            .with_context(|| format!("failed parsing JSON profile: {}", path.display()))?
    };
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(customer: Option<&str>, stage: Option<&str>) -> ProfileInput {
        ProfileInput {
            customer_type: customer.map(str::to_string),
            revenue_stage: stage.map(str::to_string),
            ..ProfileInput::default()
        }
    }

    #[test]
    fn rejects_missing_required_fields() {
        assert_eq!(
            input(None, Some("growth")).validate().unwrap_err(),
            InvalidProfile::MissingField("customer_type")
        );
        assert_eq!(
            input(Some("smb"), Some("  ")).validate().unwrap_err(),
            InvalidProfile::MissingField("revenue_stage")
        );
    }

    #[test]
    fn rejects_out_of_enum_values() {
        let err = input(Some("government"), Some("growth"))
            .validate()
            .unwrap_err();
        assert!(matches!(err, InvalidProfile::OutOfEnum(_)));
        assert!(err.to_string().contains("government"));
    }

    #[test]
    fn rejects_non_finite_signals() {
        let mut raw = input(Some("smb"), Some("early"));
        raw.cost_signals.insert("cost_variance".to_string(), f64::NAN);
        assert!(matches!(
            raw.validate().unwrap_err(),
            InvalidProfile::NonFiniteSignal { .. }
        ));
    }

    #[test]
    fn rejects_signals_that_normalize_to_the_same_key() {
        let mut raw = input(Some("smb"), Some("early"));
        raw.cost_signals.insert("Cost-Variance".to_string(), 0.2);
        raw.cost_signals.insert("cost_variance".to_string(), 0.9);
        assert_eq!(
            raw.validate().unwrap_err(),
            InvalidProfile::DuplicateSignal {
                key: "cost_variance".to_string(),
                first: "Cost-Variance".to_string(),
                second: "cost_variance".to_string(),
            }
        );
    }

    #[test]
    fn merge_prefers_overrides_and_unions_tags() {
        let mut base = input(Some("smb"), Some("early"));
        base.usage_patterns.push("seat-based".to_string());
        let mut overrides = input(Some("enterprise"), None);
        overrides.usage_patterns.push("token-based".to_string());
        base.merge(overrides);

        base.cost_signals.insert("Cost-Variance".to_string(), 0.2);
        let mut signal = ProfileInput::default();
        signal.cost_signals.insert("cost_variance".to_string(), 0.6);
        base.merge(signal);

        let profile = base.validate().unwrap();
        assert_eq!(profile.cost_signal("cost_variance"), Some(0.6));
        assert_eq!(profile.customer_type, CustomerType::Enterprise);
        assert_eq!(profile.revenue_stage, RevenueStage::Early);
        assert_eq!(profile.usage_patterns.len(), 2);
    }

    #[test]
    fn business_profile_deserializes_through_validation() {
        let ok: BusinessProfile = serde_json::from_str(
            r#"{"customer_type":"developer","revenue_stage":"scale","usage_patterns":["Token_Based"]}"#,
        )
        .unwrap();
        assert!(ok.usage_patterns.contains("token-based"));

        let err = serde_json::from_str::<BusinessProfile>(r#"{"revenue_stage":"scale"}"#)
            .unwrap_err();
        assert!(err.to_string().contains("customer_type"));
    }

    #[test]
    fn serialized_profile_reloads_identically() {
        let profile = BusinessProfile::new(CustomerType::Smb, RevenueStage::Growth)
            .with_usage("seat-based")
            .with_signal("cost_variance", 0.2);
        let json = serde_json::to_string(&profile).unwrap();
        let back: BusinessProfile = serde_json::from_str(&json).unwrap();
        assert_eq!(back, profile);
    }
}
