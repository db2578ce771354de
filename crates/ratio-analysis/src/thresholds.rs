//! Scoring rules: one row per scored ratio.
//!
//! Breakpoints are domain heuristics carried over from the analyst
//! playbook, not fitted values. Edit them here and nowhere else.

use analysis_core::TierScore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Tier 3 above the strong bound, tier 2 at or above the acceptable bound.
    HigherIsBetter,
    /// Tier 3 below the strong bound, tier 2 at or below the acceptable bound.
    LowerIsBetter,
}

#[derive(Debug, Clone, Copy)]
pub struct ThresholdRule {
    pub ratio: &'static str,
    pub orientation: Orientation,
    /// Strict bound for a tier-3 score.
    pub strong: f64,
    /// Inclusive bound for a tier-2 score.
    pub acceptable: f64,
    /// Labels for tiers 3, 2, 1 in that order.
    pub labels: [&'static str; 3],
}

impl ThresholdRule {
    pub fn score(&self, value: f64) -> TierScore {
        let tier = match self.orientation {
            Orientation::HigherIsBetter => {
                if value > self.strong {
                    3
                } else if value >= self.acceptable {
                    2
                } else {
                    1
                }
            }
            Orientation::LowerIsBetter => {
                if value < self.strong {
                    3
                } else if value <= self.acceptable {
                    2
                } else {
                    1
                }
            }
        };
        TierScore {
            score: tier,
            interpretation: self.labels[3 - tier as usize].to_string(),
        }
    }
}

use Orientation::{HigherIsBetter, LowerIsBetter};

pub const SCORING_RULES: &[ThresholdRule] = &[
    ThresholdRule {
        ratio: "pe_ratio",
        orientation: LowerIsBetter,
        strong: 15.0,
        acceptable: 25.0,
        labels: ["Undervalued", "Fairly Valued", "Overvalued"],
    },
    ThresholdRule {
        ratio: "roe",
        orientation: HigherIsBetter,
        strong: 15.0,
        acceptable: 10.0,
        labels: ["Strong", "Acceptable", "Weak"],
    },
    ThresholdRule {
        ratio: "roa",
        orientation: HigherIsBetter,
        strong: 5.0,
        acceptable: 2.0,
        labels: ["Strong", "Acceptable", "Weak"],
    },
    ThresholdRule {
        ratio: "net_profit_margin",
        orientation: HigherIsBetter,
        strong: 10.0,
        acceptable: 5.0,
        labels: ["Strong", "Acceptable", "Weak"],
    },
    ThresholdRule {
        ratio: "gross_profit_margin",
        orientation: HigherIsBetter,
        strong: 40.0,
        acceptable: 20.0,
        labels: ["Strong", "Acceptable", "Weak"],
    },
    ThresholdRule {
        ratio: "operating_profit_margin",
        orientation: HigherIsBetter,
        strong: 15.0,
        acceptable: 8.0,
        labels: ["Strong", "Acceptable", "Weak"],
    },
    ThresholdRule {
        ratio: "de_ratio",
        orientation: LowerIsBetter,
        strong: 0.5,
        acceptable: 1.0,
        labels: ["Low Leverage", "Moderate Leverage", "High Leverage"],
    },
    ThresholdRule {
        ratio: "debt_ratio",
        orientation: LowerIsBetter,
        strong: 0.3,
        acceptable: 0.6,
        labels: ["Low Debt", "Moderate Debt", "High Debt"],
    },
    ThresholdRule {
        ratio: "interest_coverage",
        orientation: HigherIsBetter,
        strong: 5.0,
        acceptable: 2.0,
        labels: ["Strong", "Acceptable", "Weak"],
    },
    ThresholdRule {
        ratio: "current_ratio",
        orientation: HigherIsBetter,
        strong: 2.0,
        acceptable: 1.0,
        labels: ["Strong", "Acceptable", "Weak"],
    },
    ThresholdRule {
        ratio: "quick_ratio",
        orientation: HigherIsBetter,
        strong: 1.5,
        acceptable: 1.0,
        labels: ["Strong", "Acceptable", "Weak"],
    },
    ThresholdRule {
        ratio: "fcf_net_income_ratio",
        orientation: HigherIsBetter,
        strong: 1.2,
        acceptable: 0.8,
        labels: [
            "Strong (High-quality earnings)",
            "Acceptable (Reliable earnings)",
            "Weak (Poor earnings quality)",
        ],
    },
    ThresholdRule {
        ratio: "pb_ratio",
        orientation: LowerIsBetter,
        strong: 1.5,
        acceptable: 3.0,
        labels: ["Undervalued", "Fairly Valued", "Overvalued"],
    },
    ThresholdRule {
        ratio: "ps_ratio",
        orientation: LowerIsBetter,
        strong: 1.0,
        acceptable: 3.0,
        labels: ["Undervalued", "Fairly Valued", "Overvalued"],
    },
];

/// Look up the rule for a ratio and score a value against it. Ratios
/// without a rule (eps, free_cash_flow_calculated) carry no score.
pub fn score_ratio(name: &str, value: f64) -> Option<TierScore> {
    SCORING_RULES
        .iter()
        .find(|rule| rule.ratio == name)
        .map(|rule| rule.score(value))
}
