use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::profile::BusinessProfile;

pub const REVENUE_UPLIFT_SIGNAL: &str = "revenue_uplift";
pub const COST_SAVINGS_SIGNAL: &str = "cost_savings";
pub const ROI_HARDNESS_SIGNAL: &str = "roi_hardness";

/// Cell of the value framework 2x2.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Quadrant {
    RevenueEngine,
    EfficiencyMachine,
    PromiseZone,
    DangerZone,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [
        Quadrant::RevenueEngine,
        Quadrant::EfficiencyMachine,
        Quadrant::PromiseZone,
        Quadrant::DangerZone,
    ];

    /// `x` runs from cost savings (-1) to revenue uplift (+1), `y` from
    /// soft (-1) to hard (+1) ROI.
    pub fn locate(x: f64, y: f64) -> Self {
        match (x >= 0.0, y > 0.0) {
            (true, true) => Self::RevenueEngine,
            (false, true) => Self::EfficiencyMachine,
            (true, false) => Self::PromiseZone,
            (false, false) => Self::DangerZone,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::RevenueEngine => {
                "The product delivers measurable ROI that directly drives revenue \
                 growth. Customers can point to concrete revenue gains."
            }
            Self::EfficiencyMachine => {
                "The product delivers hard, measurable ROI through cost reduction. \
                 Customers can calculate exactly what they save."
            }
            Self::PromiseZone => {
                "The product enables revenue upside but the ROI is hard to quantify. \
                 Customers believe in the value but cannot easily prove it."
            }
            Self::DangerZone => {
                "The product saves costs but the ROI is hard to prove, so it competes \
                 for budget without concrete evidence of impact."
            }
        }
    }

    pub fn pricing_implication(&self) -> &'static str {
        match self {
            Self::RevenueEngine => {
                "Pricing power is real. Anchor to the revenue generated and consider \
                 value-based or outcome-based pricing."
            }
            Self::EfficiencyMachine => {
                "Price as a fraction of documented savings. Budget-replacement framing \
                 eases procurement; watch for deflationary pressure."
            }
            Self::PromiseZone => {
                "Build measurement into the product to move toward hard ROI. Meanwhile \
                 use hybrid pricing with a low base to reduce purchase friction."
            }
            Self::DangerZone => {
                "Build ROI dashboards and concrete metrics first. Keep pricing low and \
                 simple while proof points accumulate."
            }
        }
    }

    pub fn renewal_risk(&self) -> bool {
        matches!(self, Self::PromiseZone | Self::DangerZone)
    }
}

impl Display for Quadrant {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let display = match self {
            Self::RevenueEngine => "Revenue Engine",
            Self::EfficiencyMachine => "Efficiency Machine",
            Self::PromiseZone => "Promise Zone",
            Self::DangerZone => "Danger Zone",
        };
        write!(f, "{display}")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValuePosition {
    pub x: f64,
    pub y: f64,
    pub quadrant: Quadrant,
    pub label: String,
    pub description: String,
    pub pricing_implication: String,
    pub renewal_risk: bool,
}

fn axis(value: f64) -> f64 {
    (value.clamp(-1.0, 1.0) * 1000.0).round() / 1000.0
}

/// Places the profile on the value framework from its `revenue_uplift`,
/// `cost_savings` and `roi_hardness` signals. Absent signals count as 0;
/// with no `roi_hardness` the profile sits on the x axis.
pub fn value_position(profile: &BusinessProfile) -> ValuePosition {
    let uplift = profile.cost_signal(REVENUE_UPLIFT_SIGNAL).unwrap_or(0.0);
    let savings = profile.cost_signal(COST_SAVINGS_SIGNAL).unwrap_or(0.0);
    let x = axis(uplift - savings);
    let y = axis(
        profile
            .cost_signal(ROI_HARDNESS_SIGNAL)
            .map(|hardness| 2.0 * hardness - 1.0)
            .unwrap_or(0.0),
    );

    let quadrant = Quadrant::locate(x, y);
    debug!(x, y, quadrant = %quadrant, "value position located");
    ValuePosition {
        x,
        y,
        quadrant,
        label: quadrant.to_string(),
        description: quadrant.description().to_string(),
        pricing_implication: quadrant.pricing_implication().to_string(),
        renewal_risk: quadrant.renewal_risk(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{CustomerType, RevenueStage};

    fn profile() -> BusinessProfile {
        BusinessProfile::new(CustomerType::Enterprise, RevenueStage::Growth)
    }

    #[test]
    fn hard_revenue_roi_is_a_revenue_engine() {
        let position = value_position(
            &profile()
                .with_signal("revenue_uplift", 0.8)
                .with_signal("cost_savings", 0.2)
                .with_signal("roi_hardness", 0.9),
        );
        assert_eq!(position.x, 0.6);
        assert_eq!(position.y, 0.8);
        assert_eq!(position.quadrant, Quadrant::RevenueEngine);
        assert!(!position.renewal_risk);
        assert_eq!(position.label, "Revenue Engine");
    }

    #[test]
    fn soft_savings_roi_is_a_danger_zone() {
        let position = value_position(
            &profile()
                .with_signal("cost_savings", 0.7)
                .with_signal("roi_hardness", 0.2),
        );
        assert_eq!(position.quadrant, Quadrant::DangerZone);
        assert!(position.renewal_risk);
    }

    #[test]
    fn no_signals_sit_at_the_origin() {
        let position = value_position(&profile());
        assert_eq!((position.x, position.y), (0.0, 0.0));
        assert_eq!(position.quadrant, Quadrant::PromiseZone);
    }

    #[test]
    fn axes_are_clamped() {
        let position = value_position(
            &profile()
                .with_signal("revenue_uplift", 4.0)
                .with_signal("roi_hardness", -3.0),
        );
        assert_eq!((position.x, position.y), (1.0, -1.0));
    }

    #[test]
    fn quadrant_boundaries() {
        assert_eq!(Quadrant::locate(0.0, 0.001), Quadrant::RevenueEngine);
        assert_eq!(Quadrant::locate(-0.001, 0.5), Quadrant::EfficiencyMachine);
        assert_eq!(Quadrant::locate(0.0, 0.0), Quadrant::PromiseZone);
        assert_eq!(Quadrant::locate(-0.5, 0.0), Quadrant::DangerZone);
        let at_risk: Vec<_> = Quadrant::ALL.iter().filter(|q| q.renewal_risk()).collect();
        assert_eq!(at_risk, [&Quadrant::PromiseZone, &Quadrant::DangerZone]);
    }
}
