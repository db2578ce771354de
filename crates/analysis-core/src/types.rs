use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The numeric fields an extraction provider is asked to find in a filing.
///
/// Order matches the extraction prompt; `extracted_data` in the report
/// carries every one of these, null when the provider could not find it.
pub const METRIC_FIELDS: &[&str] = &[
    "revenue",
    "cogs",
    "gross_profit",
    "operating_expenses",
    "operating_income",
    "interest_expense",
    "net_income",
    "cash_and_equivalents",
    "accounts_receivable",
    "inventory",
    "total_current_assets",
    "ppe",
    "total_assets",
    "accounts_payable",
    "short_term_debt",
    "total_current_liabilities",
    "long_term_debt",
    "total_liabilities",
    "stockholders_equity",
    "outstanding_shares",
    "operating_cash_flow",
    "capex",
    "investing_cash_flow",
    "financing_cash_flow",
    "free_cash_flow",
];

/// Raw extraction result, exactly as a language model returned it.
///
/// Values arrive in whatever shape the model produced: JSON numbers, strings
/// with currency formatting ("$1,234.5", "(2,000)", "2.5M"), or null.
/// Normalization to floats happens in the ratio engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawFiling {
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub fiscal_year: Option<String>,
    #[serde(default)]
    pub fiscal_period: Option<String>,
    /// The named numeric fields, untouched. Keys beyond `METRIC_FIELDS`
    /// (e.g. a legacy `total_debt`) are preserved too.
    #[serde(flatten)]
    pub metrics: BTreeMap<String, serde_json::Value>,
}

impl RawFiling {
    pub fn metric(&self, name: &str) -> Option<&serde_json::Value> {
        self.metrics.get(name)
    }

    /// Merge another partial extraction into this one.
    ///
    /// Invariant: a populated field is never overwritten by a null or
    /// missing one. `self` wins when both sides carry a value.
    pub fn merge(&mut self, other: RawFiling) {
        fn keep(existing: &Option<String>) -> bool {
            existing.as_deref().is_some_and(|s| !s.trim().is_empty())
        }

        if !keep(&self.company_name) && keep(&other.company_name) {
            self.company_name = other.company_name;
        }
        if !keep(&self.fiscal_year) && keep(&other.fiscal_year) {
            self.fiscal_year = other.fiscal_year;
        }
        if !keep(&self.fiscal_period) && keep(&other.fiscal_period) {
            self.fiscal_period = other.fiscal_period;
        }

        for (key, value) in other.metrics {
            if value.is_null() {
                continue;
            }
            let populated = self
                .metrics
                .get(&key)
                .map(|v| !v.is_null())
                .unwrap_or(false);
            if !populated {
                self.metrics.insert(key, value);
            }
        }
    }
}

/// Normalized filing financials: every metric coerced to a float or absent.
///
/// `total_debt` is derived (short-term + long-term) unless only a reported
/// total was available.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilingFinancials {
    pub revenue: Option<f64>,
    pub cogs: Option<f64>,
    pub gross_profit: Option<f64>,
    pub operating_expenses: Option<f64>,
    pub operating_income: Option<f64>,
    pub interest_expense: Option<f64>,
    pub net_income: Option<f64>,
    pub cash_and_equivalents: Option<f64>,
    pub accounts_receivable: Option<f64>,
    pub inventory: Option<f64>,
    pub total_current_assets: Option<f64>,
    pub ppe: Option<f64>,
    pub total_assets: Option<f64>,
    pub accounts_payable: Option<f64>,
    pub short_term_debt: Option<f64>,
    pub total_current_liabilities: Option<f64>,
    pub long_term_debt: Option<f64>,
    pub total_liabilities: Option<f64>,
    pub stockholders_equity: Option<f64>,
    pub outstanding_shares: Option<f64>,
    pub operating_cash_flow: Option<f64>,
    pub capex: Option<f64>,
    pub investing_cash_flow: Option<f64>,
    pub financing_cash_flow: Option<f64>,
    pub free_cash_flow: Option<f64>,
    pub total_debt: Option<f64>,
}

/// Tier classification for one ratio: 1 = weak, 2 = acceptable, 3 = strong,
/// with the domain label that goes with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierScore {
    pub score: i32,
    pub interpretation: String,
}

/// Investment action derived from the average tier score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecommendationAction {
    Buy,
    Hold,
    Sell,
}

impl RecommendationAction {
    /// Buy above 2.5, Hold from 1.8, Sell below. Monotonic in the average.
    pub fn from_average(avg: f64) -> Self {
        if avg > 2.5 {
            RecommendationAction::Buy
        } else if avg >= 1.8 {
            RecommendationAction::Hold
        } else {
            RecommendationAction::Sell
        }
    }

    pub fn to_label(&self) -> &'static str {
        match self {
            RecommendationAction::Buy => "Buy",
            RecommendationAction::Hold => "Hold",
            RecommendationAction::Sell => "Sell",
        }
    }
}

/// Full recommendation block: the action plus its rationale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub action: RecommendationAction,
    pub suitable_for: String,
    pub explanation: String,
    pub key_factors: Vec<String>,
    pub risk_factors: Vec<String>,
    pub watch_list: Vec<String>,
}

/// Strengths / weaknesses / opportunities / threats summary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SwotAnalysis {
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub opportunities: Vec<String>,
    pub threats: Vec<String>,
}

/// Categorical judgments built from ratio pairs, plus the optional MD&A
/// narrative attached by the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QualitativeSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub earnings_quality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance_sheet: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profitability: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mda_highlights: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_risks: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mda_error: Option<String>,
}

/// The complete analysis of one filing. This is the response document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilingReport {
    pub company_name: String,
    pub fiscal_year: String,
    pub fiscal_period: String,
    pub generated_at: DateTime<Utc>,
    pub extracted_data: FilingFinancials,
    pub ratios: BTreeMap<String, f64>,
    pub scores: BTreeMap<String, TierScore>,
    pub qualitative_summary: QualitativeSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<Recommendation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swot_analysis: Option<SwotAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FilingReport {
    /// Empty report skeleton carrying only the company identifiers.
    pub fn new(filing: &RawFiling) -> Self {
        fn or_default(value: &Option<String>, fallback: &str) -> String {
            match value.as_deref().map(str::trim) {
                Some(s) if !s.is_empty() => s.to_string(),
                _ => fallback.to_string(),
            }
        }

        Self {
            company_name: or_default(&filing.company_name, "Unknown"),
            fiscal_year: or_default(&filing.fiscal_year, "Unknown"),
            fiscal_period: or_default(&filing.fiscal_period, "Annual"),
            generated_at: Utc::now(),
            extracted_data: FilingFinancials::default(),
            ratios: BTreeMap::new(),
            scores: BTreeMap::new(),
            qualitative_summary: QualitativeSummary::default(),
            average_score: None,
            recommendation: None,
            swot_analysis: None,
            error: None,
        }
    }
}
