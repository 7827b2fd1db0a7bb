use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use minijinja::{Environment, UndefinedBehavior};
use serde::Serialize;
use thiserror::Error;

/// Named variable a rationale template may reference.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Placeholder {
    Model,
    Archetype,
    Metrics,
    PrimaryMetric,
    Customer,
}

impl Placeholder {
    pub const ALL: [Placeholder; 5] = [
        Placeholder::Model,
        Placeholder::Archetype,
        Placeholder::Metrics,
        Placeholder::PrimaryMetric,
        Placeholder::Customer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::Archetype => "archetype",
            Self::Metrics => "metrics",
            Self::PrimaryMetric => "primary_metric",
            Self::Customer => "customer",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == name)
    }
}

impl Display for Placeholder {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{{{ {} }}}}", self.as_str())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("unknown placeholder `{0}`")]
    Unknown(String),
    #[error("syntax error: {0}")]
    Syntax(String),
    #[error("render failed: {0}")]
    Render(String),
    #[error("template is empty")]
    Empty,
}

pub type TemplateParams = BTreeMap<Placeholder, String>;

/// Rationale template in minijinja syntax (`{{ archetype }}`), checked at
/// load against the closed [`Placeholder`] set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RationaleTemplate {
    source: String,
    placeholders: Vec<Placeholder>,
}

// Strict mode turns a missing parameter into a render error instead of a
// blank substitution.
fn build_env() -> Environment<'static> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env
}

impl RationaleTemplate {
    pub fn parse(raw: &str) -> Result<Self, TemplateError> {
        if raw.trim().is_empty() {
            return Err(TemplateError::Empty);
        }

        let env = build_env();
        let template = env
            .template_from_str(raw)
            .map_err(|e| TemplateError::Syntax(e.to_string()))?;

        let mut names: Vec<String> = template.undeclared_variables(false).into_iter().collect();
        names.sort();
        let mut placeholders = Vec::with_capacity(names.len());
        for name in names {
            let slot = Placeholder::from_name(&name).ok_or(TemplateError::Unknown(name))?;
            placeholders.push(slot);
        }
        placeholders.sort();

        Ok(Self {
            source: raw.to_string(),
            placeholders,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn placeholders(&self) -> impl Iterator<Item = Placeholder> + '_ {
        self.placeholders.iter().copied()
    }

    pub fn render(&self, params: &TemplateParams) -> Result<String, TemplateError> {
        build_env()
            .render_str(&self.source, params)
            .map_err(|e| TemplateError::Render(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_params() -> TemplateParams {
        TemplateParams::from([
            (Placeholder::Model, "Outcome-based".to_string()),
            (Placeholder::Archetype, "Agent".to_string()),
            (Placeholder::Metrics, "per outcome".to_string()),
            (Placeholder::PrimaryMetric, "per outcome".to_string()),
            (Placeholder::Customer, "SMB".to_string()),
        ])
    }

    #[test]
    fn renders_all_slots() {
        let template = RationaleTemplate::parse(
            "{{ model }} suits a {{ archetype }} priced on {{ metrics }}.",
        )
        .unwrap();
        assert_eq!(
            template.render(&all_params()).unwrap(),
            "Outcome-based suits a Agent priced on per outcome."
        );
        assert_eq!(
            template.placeholders().collect::<Vec<_>>(),
            vec![Placeholder::Model, Placeholder::Archetype, Placeholder::Metrics]
        );
    }

    #[test]
    fn rejects_unknown_and_malformed_placeholders() {
        assert_eq!(
            RationaleTemplate::parse("priced per {{ widget }}").unwrap_err(),
            TemplateError::Unknown("widget".to_string())
        );
        assert!(matches!(
            RationaleTemplate::parse("open {{ model").unwrap_err(),
            TemplateError::Syntax(_)
        ));
        assert_eq!(
            RationaleTemplate::parse("   ").unwrap_err(),
            TemplateError::Empty
        );
    }

    #[test]
    fn single_braces_are_literal() {
        let template = RationaleTemplate::parse("{literal} for {{ customer }}").unwrap();
        assert_eq!(template.render(&all_params()).unwrap(), "{literal} for SMB");
        assert_eq!(
            template.placeholders().collect::<Vec<_>>(),
            vec![Placeholder::Customer]
        );
    }

    #[test]
    fn missing_parameter_is_a_render_error() {
        let template = RationaleTemplate::parse("lead with {{ primary_metric }}").unwrap();
        assert!(matches!(
            template.render(&TemplateParams::new()),
            Err(TemplateError::Render(_))
        ));
    }

    #[test]
    fn placeholder_displays_in_template_syntax() {
        assert_eq!(Placeholder::PrimaryMetric.to_string(), "{{ primary_metric }}");
    }
}
