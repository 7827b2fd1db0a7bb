pub mod builtin;
pub mod schema;
pub mod store;
pub mod template;
pub mod validate;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

pub use schema::{
    ArchetypeDefinition, CatalogId, Comparable, Comparison, Condition, FormulaKind,
    HealthCriterion, HealthDimension, ModelConstraint, Predicate, PricingModel, ReferenceData,
    ValueMetric,
};
pub use store::{export_builtin, load_catalog};
pub use template::{Placeholder, RationaleTemplate, TemplateError, TemplateParams};
pub use validate::{ConfigIssue, ConfigurationError};

/// Validated, read-only reference tables. The only way to obtain one is
/// through [`Catalog::new`], so engine code never sees unchecked data.
#[derive(Debug, Clone)]
pub struct Catalog {
    data: ReferenceData,
    templates: BTreeMap<CatalogId, RationaleTemplate>,
    fingerprint: String,
    loaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CatalogSummary {
    pub version: String,
    pub fingerprint: String,
    pub loaded_at: DateTime<Utc>,
    pub archetypes: Vec<CatalogEntry>,
    pub value_metrics: Vec<CatalogEntry>,
    pub pricing_models: Vec<CatalogEntry>,
    pub dimensions: Vec<CatalogEntry>,
    pub criteria: usize,
    pub comparables: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CatalogEntry {
    pub id: CatalogId,
    pub name: String,
}

impl Catalog {
    pub fn new(data: ReferenceData) -> Result<Self, ConfigurationError> {
        let templates = validate::validate(&data)?;
        let fingerprint = data.fingerprint();
        Ok(Self {
            data,
            templates,
            fingerprint,
            loaded_at: Utc::now(),
        })
    }

    pub fn builtin() -> Result<Self, ConfigurationError> {
        Self::new(builtin::builtin_dataset())
    }

    pub fn data(&self) -> &ReferenceData {
        &self.data
    }

    pub fn version(&self) -> &str {
        &self.data.version
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn archetypes(&self) -> &[ArchetypeDefinition] {
        &self.data.archetypes
    }

    pub fn archetype(&self, id: &CatalogId) -> Option<&ArchetypeDefinition> {
        self.data.archetypes.iter().find(|a| &a.id == id)
    }

    pub fn value_metrics(&self) -> &[ValueMetric] {
        &self.data.value_metrics
    }

    pub fn value_metric(&self, id: &CatalogId) -> Option<&ValueMetric> {
        self.data.value_metrics.iter().find(|m| &m.id == id)
    }

    pub fn pricing_models(&self) -> &[PricingModel] {
        &self.data.pricing_models
    }

    pub fn pricing_model(&self, id: &CatalogId) -> Option<&PricingModel> {
        self.data.pricing_models.iter().find(|m| &m.id == id)
    }

    pub fn template(&self, model: &CatalogId) -> Option<&RationaleTemplate> {
        self.templates.get(model)
    }

    pub fn dimensions(&self) -> &[HealthDimension] {
        &self.data.dimensions
    }

    pub fn criteria(&self) -> &[HealthCriterion] {
        &self.data.criteria
    }

    pub fn comparables(&self) -> &[Comparable] {
        &self.data.comparables
    }

    pub fn comparables_for<'a>(
        &'a self,
        archetype: Option<&'a CatalogId>,
    ) -> impl Iterator<Item = &'a Comparable> + 'a {
        self.data
            .comparables
            .iter()
            .filter(move |c| archetype.map(|id| &c.archetype == id).unwrap_or(true))
    }

    pub fn summary(&self) -> CatalogSummary {
        CatalogSummary {
            version: self.data.version.clone(),
            fingerprint: self.fingerprint.clone(),
            loaded_at: self.loaded_at,
            archetypes: entries(self.data.archetypes.iter().map(|a| (&a.id, &a.name))),
            value_metrics: entries(self.data.value_metrics.iter().map(|m| (&m.id, &m.name))),
            pricing_models: entries(self.data.pricing_models.iter().map(|m| (&m.id, &m.name))),
            dimensions: entries(self.data.dimensions.iter().map(|d| (&d.id, &d.name))),
            criteria: self.data.criteria.len(),
            comparables: self.data.comparables.len(),
        }
    }
}

fn entries<'a>(items: impl Iterator<Item = (&'a CatalogId, &'a String)>) -> Vec<CatalogEntry> {
    items
        .map(|(id, name)| CatalogEntry {
            id: id.clone(),
            name: name.clone(),
        })
        .collect()
}
