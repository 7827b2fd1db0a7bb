use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::economics::{generate, PricingQuote, QuoteTerms};
use crate::engine::{
    classifier, recommender, scorecard, value_mapper, value_position, ClassificationResult,
    EngineSettings, RecommendationResult, ScorecardResult, ValueMetricRanking, ValuePosition,
};
use crate::profile::BusinessProfile;
use crate::reference::{Catalog, CatalogId, ConfigurationError};

/// Everything the engine says about one profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Evaluation {
    pub reference_fingerprint: String,
    pub classification: ClassificationResult,
    pub value_metrics: ValueMetricRanking,
    pub value_position: ValuePosition,
    pub recommendation: RecommendationResult,
    pub scorecard: ScorecardResult,
}

/// Value-metric ranking alongside the value framework position.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValueReport {
    pub value_metrics: ValueMetricRanking,
    pub value_position: ValuePosition,
}

#[derive(Debug, Error, Clone, PartialEq)]
#[error("unknown pricing model `{0}`")]
pub struct UnknownModel(pub CatalogId);

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelQuote {
    pub model: CatalogId,
    pub name: String,
    pub quote: PricingQuote,
}

/// A quote together with the recommendation run it was priced from.
/// `quote` is `None` when no model was named and none is recommendable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuoteOutcome {
    pub recommendation: RecommendationResult,
    pub quote: Option<ModelQuote>,
}

/// Cheap to clone; every clone shares the same validated catalog.
#[derive(Debug, Clone)]
pub struct Engine {
    catalog: Arc<Catalog>,
    settings: EngineSettings,
}

impl Engine {
    pub fn new(catalog: Catalog, settings: EngineSettings) -> Result<Self, ConfigurationError> {
        Self::shared(Arc::new(catalog), settings)
    }

    pub fn shared(
        catalog: Arc<Catalog>,
        settings: EngineSettings,
    ) -> Result<Self, ConfigurationError> {
        settings.validate()?;
        Ok(Self { catalog, settings })
    }

    pub fn builtin() -> Result<Self, ConfigurationError> {
        Self::new(Catalog::builtin()?, EngineSettings::default())
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn classify(&self, profile: &BusinessProfile) -> ClassificationResult {
        classifier::classify(profile, self.catalog.archetypes(), &self.settings)
    }

    pub fn map_value_metrics(
        &self,
        profile: &BusinessProfile,
        classification: &ClassificationResult,
    ) -> ValueMetricRanking {
        value_mapper::map_value_metrics(profile, classification, self.catalog.value_metrics())
    }

    pub fn recommend(
        &self,
        profile: &BusinessProfile,
        classification: &ClassificationResult,
        value_metrics: &ValueMetricRanking,
    ) -> RecommendationResult {
        recommender::recommend(
            profile,
            classification,
            value_metrics,
            &self.catalog,
            &self.settings,
        )
    }

    pub fn value_position(&self, profile: &BusinessProfile) -> ValuePosition {
        value_position::value_position(profile)
    }

    pub fn values(&self, profile: &BusinessProfile) -> ValueReport {
        let classification = self.classify(profile);
        ValueReport {
            value_metrics: self.map_value_metrics(profile, &classification),
            value_position: self.value_position(profile),
        }
    }

    /// Pricing principles of the classified archetype; empty when
    /// unclassified.
    pub fn principles(&self, classification: &ClassificationResult) -> Vec<String> {
        classification
            .archetype()
            .and_then(|id| self.catalog.archetype(id))
            .map(|archetype| archetype.principles.clone())
            .unwrap_or_default()
    }

    pub fn score(&self, profile: &BusinessProfile) -> ScorecardResult {
        scorecard::score(
            profile,
            self.catalog.dimensions(),
            self.catalog.criteria(),
            &self.settings,
        )
    }

    pub fn evaluate(&self, profile: &BusinessProfile) -> Evaluation {
        let classification = self.classify(profile);
        let value_metrics = self.map_value_metrics(profile, &classification);
        let value_position = self.value_position(profile);
        let recommendation = self.recommend(profile, &classification, &value_metrics);
        let scorecard = self.score(profile);
        debug!(
            product = %profile.product,
            unclassified = classification.is_unclassified(),
            recommendations = recommendation.recommendations.len(),
            composite = scorecard.composite,
            quadrant = %value_position.quadrant,
            "evaluation complete"
        );
        Evaluation {
            reference_fingerprint: self.catalog.fingerprint().to_string(),
            classification,
            value_metrics,
            value_position,
            recommendation,
            scorecard,
        }
    }

    /// Prices `model`, or the top recommendation when no model is named.
    pub fn quote(
        &self,
        profile: &BusinessProfile,
        terms: &QuoteTerms,
        model: Option<&CatalogId>,
    ) -> Result<QuoteOutcome, UnknownModel> {
        let classification = self.classify(profile);
        let value_metrics = self.map_value_metrics(profile, &classification);
        let recommendation = self.recommend(profile, &classification, &value_metrics);

        let chosen = match model {
            Some(id) => {
                let model = self
                    .catalog
                    .pricing_model(id)
                    .ok_or_else(|| UnknownModel(id.clone()))?;
                Some((model.id.clone(), model.name.clone(), model.formula))
            }
            None => recommendation
                .top()
                .map(|top| (top.model.clone(), top.name.clone(), top.formula)),
        };

        let quote = chosen.map(|(model, name, formula)| {
            let quote = generate(&terms.inputs(profile.customer_type, formula));
            debug!(model = %model, empty = quote.is_empty(), "quote generated");
            ModelQuote { model, name, quote }
        });
        Ok(QuoteOutcome {
            recommendation,
            quote,
        })
    }
}
