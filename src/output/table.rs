use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Row, Table};

use crate::economics::{MarginBand, MarginSnapshot, PricingQuote, UnitCostBreakdown};
use crate::engine::{
    ClassificationResult, ReadinessBand, RecommendationResult, ScorecardResult,
    ValueMetricRanking, ValuePosition,
};
use crate::reference::{CatalogSummary, Comparable};

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn render_classification_table(result: &ClassificationResult) -> String {
    let mut table = new_table();
    table.set_header(vec!["Archetype", "Score", "Predicates Met", "Selected"]);
    let selected = result.archetype();
    for entry in &result.ranking {
        let chosen = Some(&entry.archetype) == selected;
        let marker = if chosen {
            Cell::new("YES").fg(Color::Green)
        } else {
            Cell::new("-")
        };
        table.add_row(Row::from(vec![
            Cell::new(&entry.name),
            Cell::new(format!("{:.2}", entry.score)),
            Cell::new(format!("{}/{}", entry.satisfied, entry.total)),
            marker,
        ]));
    }

    let verdict = match result.archetype_name() {
        Some(name) => format!("Classified as {name} (confidence {:.2})", result.confidence),
        None => format!(
            "Unclassified: best score {:.2} is below the {:.2} threshold",
            result.confidence, result.threshold
        ),
    };
    format!("{table}\n{verdict}")
}

pub fn render_value_metrics_table(ranking: &ValueMetricRanking) -> String {
    let mut table = new_table();
    table.set_header(vec!["Rank", "Value Metric", "Unit", "Fit"]);
    for (idx, metric) in ranking.iter().enumerate() {
        table.add_row(vec![
            (idx + 1).to_string(),
            metric.name.clone(),
            metric.unit.clone(),
            format!("{:.0}% ({}/{})", metric.score * 100.0, metric.satisfied, metric.total),
        ]);
    }
    if ranking.is_empty() {
        return "No value metric applies to this profile.".to_string();
    }
    table.to_string()
}

pub fn render_value_position_table(position: &ValuePosition) -> String {
    let mut table = new_table();
    table.set_header(vec!["Value Framework", "Value"]);
    let risk = if position.renewal_risk {
        Cell::new("yes").fg(Color::Red)
    } else {
        Cell::new("no").fg(Color::Green)
    };
    table.add_row(vec!["Quadrant".to_string(), position.label.clone()]);
    table.add_row(vec![
        "Position (x, y)".to_string(),
        format!("({:.2}, {:.2})", position.x, position.y),
    ]);
    table.add_row(Row::from(vec![Cell::new("Renewal risk"), risk]));
    table.add_row(vec!["Pricing implication".to_string(), position.pricing_implication.clone()]);
    format!("{table}\n{}", position.description)
}

pub fn render_principles(archetype: &str, principles: &[String]) -> String {
    let mut out = format!("Pricing principles for {archetype}:");
    for principle in principles {
        out.push_str("\n  - ");
        out.push_str(principle);
    }
    out
}

pub fn render_recommendations_table(result: &RecommendationResult) -> String {
    if let Some(reason) = result.reason {
        let mut out = format!("No pricing model is compatible with this profile ({reason}).");
        if !result.excluded.is_empty() {
            out.push('\n');
            out.push_str(&render_excluded_table(result));
        }
        return out;
    }

    let mut table = new_table();
    table.set_header(vec!["Rank", "Pricing Model", "Score", "Overlap", "Affinity", "Why"]);
    for (idx, rec) in result.recommendations.iter().enumerate() {
        let score_cell = if idx == 0 {
            Cell::new(format!("{:.2}", rec.score)).fg(Color::Green)
        } else {
            Cell::new(format!("{:.2}", rec.score))
        };
        table.add_row(Row::from(vec![
            Cell::new((idx + 1).to_string()),
            Cell::new(&rec.name),
            score_cell,
            Cell::new(format!("{:.0}%", rec.value_overlap * 100.0)),
            Cell::new(format!("{:.2}", rec.affinity)),
            Cell::new(&rec.rationale),
        ]));
    }
    let mut out = table.to_string();
    if !result.excluded.is_empty() {
        out.push('\n');
        out.push_str(&render_excluded_table(result));
    }
    out
}

fn render_excluded_table(result: &RecommendationResult) -> String {
    let mut table = new_table();
    table.set_header(vec!["Excluded Model", "Reason"]);
    for excluded in &result.excluded {
        table.add_row(vec![excluded.name.clone(), excluded.reason.to_string()]);
    }
    table.to_string()
}

pub fn render_scorecard_table(result: &ScorecardResult) -> String {
    let mut table = new_table();
    table.set_header(vec!["Dimension", "Weight", "Score", "Criteria Met"]);
    for dim in &result.dimensions {
        table.add_row(vec![
            dim.name.clone(),
            format!("{:.0}%", dim.weight * 100.0),
            format!("{:.0}/100", dim.score * 100.0),
            format!("{}/{}", dim.met, dim.total),
        ]);
    }
    let band_color = match result.band {
        ReadinessBand::Advanced | ReadinessBand::Strong => Color::Green,
        ReadinessBand::Developing => Color::Yellow,
        ReadinessBand::EarlyStage => Color::Red,
    };
    table.add_row(Row::from(vec![
        Cell::new("Composite"),
        Cell::new("100%"),
        Cell::new(format!("{:.0}/100", result.composite)).fg(band_color),
        Cell::new(result.band.to_string()).fg(band_color),
    ]));

    let mut out = table.to_string();
    if !result.priority_actions.is_empty() {
        let mut actions = new_table();
        actions.set_header(vec!["Priority", "Criterion", "Points Lost", "Action"]);
        for (idx, action) in result.priority_actions.iter().enumerate() {
            actions.add_row(vec![
                (idx + 1).to_string(),
                action.criterion.to_string(),
                format!("{:.1}", action.lost_points),
                action.action.clone(),
            ]);
        }
        out.push('\n');
        out.push_str(&actions.to_string());
    }
    out
}

pub fn render_quote_table(model: &str, quote: &PricingQuote) -> String {
    if quote.is_empty() {
        return format!("No quote for {model}: unit cost must be positive and margin below 100%.");
    }
    let mut table = new_table();
    table.set_header(vec!["Component", "Value"]);
    table.add_row(vec!["Pricing model".to_string(), model.to_string()]);
    table.add_row(vec!["Formula".to_string(), quote.formula.to_string()]);
    table.add_row(vec![
        "Platform fee".to_string(),
        format!(
            "${:.2}/yr (${:.2}/mo)",
            quote.platform_fee_annual, quote.platform_fee_monthly
        ),
    ]);
    table.add_row(vec![
        "Included units".to_string(),
        quote.included_units.to_string(),
    ]);
    table.add_row(vec![
        "Price per unit".to_string(),
        format!("${:.2}", quote.price_per_unit),
    ]);
    table.add_row(vec![
        "Overage rate".to_string(),
        format!("${:.2}", quote.overage_rate),
    ]);
    table.add_row(vec![
        "Effective price".to_string(),
        format!("${:.2}", quote.effective_price_per_unit),
    ]);
    table.add_row(vec![
        "Gross margin".to_string(),
        format!("{:.1}%", quote.gross_margin_pct),
    ]);
    format!("{table}\n{}", quote.explanation)
}

pub fn render_margin_table(snapshot: &MarginSnapshot) -> String {
    let mut table = new_table();
    table.set_header(vec!["Metric", "Value"]);
    let color = match snapshot.band {
        MarginBand::Healthy => Color::Green,
        MarginBand::Watch => Color::Yellow,
        MarginBand::AtRisk => Color::Red,
    };
    table.add_row(Row::from(vec![
        Cell::new("Gross margin"),
        Cell::new(format!("{:.1}% ({})", snapshot.margin_pct, snapshot.band)).fg(color),
    ]));
    table.add_row(vec![
        "Profit per unit".to_string(),
        format!("${:.2}", snapshot.profit_per_unit),
    ]);
    table.add_row(vec![
        "Profit per customer".to_string(),
        format!("${:.2}", snapshot.profit_per_customer),
    ]);
    table.add_row(vec![
        "Total profit".to_string(),
        format!("${:.2}", snapshot.total_profit),
    ]);
    table.add_row(vec![
        "vs SaaS benchmark (80%)".to_string(),
        format!("{:+.1} pts", snapshot.vs_saas_benchmark),
    ]);
    table.add_row(vec![
        "vs AI average (55%)".to_string(),
        format!("{:+.1} pts", snapshot.vs_ai_average),
    ]);
    table.to_string()
}

pub fn render_unit_cost_table(breakdown: &UnitCostBreakdown) -> String {
    let mut table = new_table();
    table.set_header(vec!["Cost", "Per Unit", "Share"]);
    for (label, value, share) in [
        ("AI / inference", breakdown.inference, breakdown.inference_share_pct),
        ("Human review", breakdown.human_review, breakdown.human_share_pct),
        (
            "Infrastructure",
            breakdown.infrastructure,
            breakdown.infrastructure_share_pct,
        ),
    ] {
        table.add_row(vec![
            label.to_string(),
            format!("${value:.4}"),
            format!("{share:.0}%"),
        ]);
    }
    table.add_row(vec![
        "Total".to_string(),
        format!("${:.4}", breakdown.total),
        "100%".to_string(),
    ]);
    format!(
        "{table}\nMinimum price for a 65% margin: ${:.2}",
        breakdown.minimum_price
    )
}

pub fn render_comparables_table(comparables: &[&Comparable]) -> String {
    let mut table = new_table();
    table.set_header(vec![
        "Company",
        "Archetype",
        "Pricing Model",
        "Detail",
        "Value Driver",
    ]);
    for comp in comparables {
        table.add_row(vec![
            comp.company.clone(),
            comp.archetype.to_string(),
            comp.pricing_model.clone(),
            comp.detail.clone(),
            comp.value_driver.clone(),
        ]);
    }
    table.to_string()
}

pub fn render_catalog_table(summary: &CatalogSummary) -> String {
    let mut table = new_table();
    table.set_header(vec!["Table", "Entries"]);
    let names = |entries: &[crate::reference::CatalogEntry]| {
        entries
            .iter()
            .map(|e| e.id.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    };
    table.add_row(vec!["Archetypes".to_string(), names(&summary.archetypes)]);
    table.add_row(vec!["Value metrics".to_string(), names(&summary.value_metrics)]);
    table.add_row(vec!["Pricing models".to_string(), names(&summary.pricing_models)]);
    table.add_row(vec!["Dimensions".to_string(), names(&summary.dimensions)]);
    table.add_row(vec!["Criteria".to_string(), summary.criteria.to_string()]);
    table.add_row(vec!["Comparables".to_string(), summary.comparables.to_string()]);
    format!(
        "{table}\nVersion {} | fingerprint {} | loaded {}",
        summary.version,
        summary.fingerprint,
        summary.loaded_at.to_rfc3339()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Engine;
    use crate::profile::{BusinessProfile, CustomerType, RevenueStage};

    #[test]
    fn unclassified_verdict_mentions_threshold() {
        let engine = Engine::builtin().unwrap();
        let profile = BusinessProfile::new(CustomerType::Consumer, RevenueStage::PreRevenue);
        let rendered = render_classification_table(&engine.classify(&profile));
        assert!(rendered.contains("Unclassified"));
        assert!(rendered.contains("0.30"));
    }

    #[test]
    fn scorecard_table_shows_band_and_actions() {
        let engine = Engine::builtin().unwrap();
        let profile = BusinessProfile::new(CustomerType::Smb, RevenueStage::Growth)
            .with_capability("pricing-page");
        let rendered = render_scorecard_table(&engine.score(&profile));
        assert!(rendered.contains("Composite"));
        assert!(rendered.contains("Early Stage"));
        assert!(rendered.contains("Points Lost"));
    }

    #[test]
    fn value_position_table_flags_renewal_risk() {
        let engine = Engine::builtin().unwrap();
        let profile = BusinessProfile::new(CustomerType::Smb, RevenueStage::Growth)
            .with_signal("cost_savings", 0.6)
            .with_signal("roi_hardness", 0.3);
        let rendered = render_value_position_table(&engine.value_position(&profile));
        assert!(rendered.contains("Danger Zone"));
        assert!(rendered.contains("yes"));
        assert!(rendered.contains("(-0.60, -0.40)"));
    }
}
