use anyhow::Result;

use crate::engine::{
    ClassificationResult, RecommendationResult, ScorecardResult, ValueMetricRanking, ValuePosition,
};
use crate::reference::Comparable;

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String> {
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

pub fn classification_to_csv(result: &ClassificationResult) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(["archetype", "name", "score", "satisfied", "total", "selected"])?;
    let selected = result.archetype();
    for entry in &result.ranking {
        writer.write_record([
            entry.archetype.to_string(),
            entry.name.clone(),
            format!("{:.4}", entry.score),
            entry.satisfied.to_string(),
            entry.total.to_string(),
            (Some(&entry.archetype) == selected).to_string(),
        ])?;
    }
    finish(writer)
}

pub fn value_metrics_to_csv(ranking: &ValueMetricRanking) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(["rank", "metric", "name", "unit", "score"])?;
    for (idx, metric) in ranking.iter().enumerate() {
        writer.write_record([
            (idx + 1).to_string(),
            metric.metric.to_string(),
            metric.name.clone(),
            metric.unit.clone(),
            format!("{:.4}", metric.score),
        ])?;
    }
    finish(writer)
}

pub fn value_position_to_csv(position: &ValuePosition) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(["quadrant", "x", "y", "renewal_risk", "pricing_implication"])?;
    writer.write_record([
        position.label.clone(),
        format!("{:.3}", position.x),
        format!("{:.3}", position.y),
        position.renewal_risk.to_string(),
        position.pricing_implication.clone(),
    ])?;
    finish(writer)
}

pub fn recommendations_to_csv(result: &RecommendationResult) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record([
        "rank",
        "model",
        "name",
        "score",
        "value_overlap",
        "affinity",
        "formula",
        "status",
    ])?;
    for (idx, rec) in result.recommendations.iter().enumerate() {
        writer.write_record([
            (idx + 1).to_string(),
            rec.model.to_string(),
            rec.name.clone(),
            format!("{:.4}", rec.score),
            format!("{:.4}", rec.value_overlap),
            format!("{:.2}", rec.affinity),
            rec.formula.to_string(),
            "recommended".to_string(),
        ])?;
    }
    for excluded in &result.excluded {
        writer.write_record([
            String::new(),
            excluded.model.to_string(),
            excluded.name.clone(),
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            excluded.reason.to_string(),
        ])?;
    }
    finish(writer)
}

pub fn scorecard_to_csv(result: &ScorecardResult) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(["dimension", "name", "weight", "score", "met", "total"])?;
    for dim in &result.dimensions {
        writer.write_record([
            dim.dimension.to_string(),
            dim.name.clone(),
            format!("{:.4}", dim.weight),
            format!("{:.4}", dim.score),
            dim.met.to_string(),
            dim.total.to_string(),
        ])?;
    }
    writer.write_record([
        "composite".to_string(),
        result.band.to_string(),
        "1.0000".to_string(),
        format!("{:.2}", result.composite),
        result.met.to_string(),
        result.total.to_string(),
    ])?;
    finish(writer)
}

pub fn comparables_to_csv(comparables: &[&Comparable]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(["company", "archetype", "pricing_model", "detail", "value_driver"])?;
    for comp in comparables {
        writer.write_record([
            comp.company.as_str(),
            comp.archetype.as_str(),
            comp.pricing_model.as_str(),
            comp.detail.as_str(),
            comp.value_driver.as_str(),
        ])?;
    }
    finish(writer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Engine;
    use crate::profile::{BusinessProfile, CustomerType, RevenueStage};

    #[test]
    fn recommendation_csv_lists_recommended_then_excluded() {
        let engine = Engine::builtin().unwrap();
        let profile = BusinessProfile::new(CustomerType::Consumer, RevenueStage::PreRevenue);
        let evaluation = engine.evaluate(&profile);
        let csv = recommendations_to_csv(&evaluation.recommendation).unwrap();
        let lines: Vec<_> = csv.lines().collect();
        assert!(lines[0].starts_with("rank,model"));
        assert!(lines[1].starts_with("1,flat_subscription"));
        assert_eq!(lines.len(), 1 + engine.catalog().pricing_models().len());
        assert!(csv.contains("archetype mismatch"));
    }

    #[test]
    fn value_position_csv_has_one_row() {
        let engine = Engine::builtin().unwrap();
        let profile = BusinessProfile::new(CustomerType::Enterprise, RevenueStage::Scale)
            .with_signal("revenue_uplift", 0.9)
            .with_signal("roi_hardness", 0.8);
        let csv = value_position_to_csv(&engine.value_position(&profile)).unwrap();
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("Revenue Engine,0.900,0.600,false,"));
    }

    #[test]
    fn comparables_csv_quotes_commas() {
        let engine = Engine::builtin().unwrap();
        let comps: Vec<_> = engine.catalog().comparables_for(None).collect();
        let csv = comparables_to_csv(&comps).unwrap();
        assert_eq!(csv.lines().count(), comps.len() + 1);
        assert!(csv.contains("\"ROI-basis, ticket threshold\""));
    }
}
