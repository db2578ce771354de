use analysis_core::{
    parse_amount, parse_price, AnalysisError, FilingAnalyzer, FilingFinancials, FilingReport,
    QualitativeSummary, RawFiling, Recommendation, RecommendationAction, SwotAnalysis, TierScore,
};
use async_trait::async_trait;
use std::collections::BTreeMap;

pub mod thresholds;

#[cfg(test)]
mod engine_tests;

use thresholds::score_ratio;

const WATCH_LIST: [&str; 4] = [
    "Changes in profit margins",
    "Debt level trends",
    "Cash flow quality vs. reported earnings",
    "Industry-specific dynamics",
];

pub struct RatioAnalysisEngine;

impl RatioAnalysisEngine {
    pub fn new() -> Self {
        Self
    }

    fn calculate_eps(&self, net_income: f64, shares: f64) -> Option<f64> {
        if shares > 0.0 {
            Some(net_income / shares)
        } else {
            None
        }
    }

    fn calculate_roe(&self, net_income: f64, equity: f64) -> Option<f64> {
        if equity != 0.0 {
            Some((net_income / equity) * 100.0)
        } else {
            None
        }
    }

    fn calculate_roa(&self, net_income: f64, total_assets: f64) -> Option<f64> {
        if total_assets != 0.0 {
            Some((net_income / total_assets) * 100.0)
        } else {
            None
        }
    }

    fn calculate_margin(&self, numerator: f64, revenue: f64) -> Option<f64> {
        if revenue != 0.0 {
            Some((numerator / revenue) * 100.0)
        } else {
            None
        }
    }

    fn calculate_debt_to_equity(&self, total_debt: f64, equity: f64) -> Option<f64> {
        if equity != 0.0 {
            Some(total_debt / equity)
        } else {
            None
        }
    }

    fn calculate_debt_ratio(&self, total_debt: f64, total_assets: f64) -> Option<f64> {
        if total_assets != 0.0 {
            Some(total_debt / total_assets)
        } else {
            None
        }
    }

    fn calculate_interest_coverage(&self, operating_income: f64, interest_expense: f64) -> Option<f64> {
        // Interest expense is often reported as a negative figure.
        if interest_expense != 0.0 {
            Some(operating_income / interest_expense.abs())
        } else {
            None
        }
    }

    fn calculate_current_ratio(&self, current_assets: f64, current_liabilities: f64) -> Option<f64> {
        if current_liabilities != 0.0 {
            Some(current_assets / current_liabilities)
        } else {
            None
        }
    }

    fn calculate_quick_ratio(
        &self,
        current_assets: f64,
        inventory: f64,
        current_liabilities: f64,
    ) -> Option<f64> {
        if current_liabilities != 0.0 {
            Some((current_assets - inventory) / current_liabilities)
        } else {
            None
        }
    }

    /// Coerce every raw metric to a float and derive total debt.
    pub fn normalize(&self, filing: &RawFiling) -> FilingFinancials {
        let get = |name: &str| filing.metric(name).and_then(parse_amount);

        let mut fin = FilingFinancials {
            revenue: get("revenue"),
            cogs: get("cogs"),
            gross_profit: get("gross_profit"),
            operating_expenses: get("operating_expenses"),
            operating_income: get("operating_income"),
            interest_expense: get("interest_expense"),
            net_income: get("net_income"),
            cash_and_equivalents: get("cash_and_equivalents"),
            accounts_receivable: get("accounts_receivable"),
            inventory: get("inventory"),
            total_current_assets: get("total_current_assets"),
            ppe: get("ppe"),
            total_assets: get("total_assets"),
            accounts_payable: get("accounts_payable"),
            short_term_debt: get("short_term_debt"),
            total_current_liabilities: get("total_current_liabilities"),
            long_term_debt: get("long_term_debt"),
            total_liabilities: get("total_liabilities"),
            stockholders_equity: get("stockholders_equity"),
            outstanding_shares: get("outstanding_shares"),
            operating_cash_flow: get("operating_cash_flow"),
            capex: get("capex"),
            investing_cash_flow: get("investing_cash_flow"),
            financing_cash_flow: get("financing_cash_flow"),
            free_cash_flow: get("free_cash_flow"),
            total_debt: None,
        };

        // Older extractions report a single total_debt field instead of the
        // short/long split; use it only when both components are absent.
        fin.total_debt = match (fin.short_term_debt, fin.long_term_debt) {
            (None, None) if filing.metric("total_debt").is_some() => get("total_debt"),
            (st, lt) => Some(st.unwrap_or(0.0) + lt.unwrap_or(0.0)),
        };

        fin
    }

    /// Run the full analysis: normalization, guarded ratios, threshold
    /// scores, qualitative summary, SWOT, and the recommendation.
    pub fn analyze(&self, filing: &RawFiling, stock_price: Option<&str>) -> FilingReport {
        let mut report = FilingReport::new(filing);

        // An unparseable price is treated as not provided.
        let price = stock_price.and_then(parse_price);

        let fin = self.normalize(filing);
        report.extracted_data = fin.clone();

        let mut ratios: BTreeMap<String, f64> = BTreeMap::new();
        let mut scores: BTreeMap<String, TierScore> = BTreeMap::new();
        let mut record = |name: &str, value: f64| {
            ratios.insert(name.to_string(), value);
            if let Some(tier) = score_ratio(name, value) {
                scores.insert(name.to_string(), tier);
            }
        };

        // Profitability
        if let (Some(net_income), Some(shares)) = (fin.net_income, fin.outstanding_shares) {
            if let Some(eps) = self.calculate_eps(net_income, shares) {
                record("eps", eps);
                if let Some(price) = price {
                    if eps != 0.0 {
                        record("pe_ratio", price / eps);
                    }
                }
            }
        }

        if let (Some(net_income), Some(equity)) = (fin.net_income, fin.stockholders_equity) {
            if let Some(roe) = self.calculate_roe(net_income, equity) {
                record("roe", roe);
            }
        }

        if let (Some(net_income), Some(assets)) = (fin.net_income, fin.total_assets) {
            if let Some(roa) = self.calculate_roa(net_income, assets) {
                record("roa", roa);
            }
        }

        if let Some(revenue) = fin.revenue {
            if let Some(net_income) = fin.net_income {
                if let Some(margin) = self.calculate_margin(net_income, revenue) {
                    record("net_profit_margin", margin);
                }
            }
            if let Some(gross_profit) = fin.gross_profit {
                if let Some(margin) = self.calculate_margin(gross_profit, revenue) {
                    record("gross_profit_margin", margin);
                }
            }
            if let Some(operating_income) = fin.operating_income {
                if let Some(margin) = self.calculate_margin(operating_income, revenue) {
                    record("operating_profit_margin", margin);
                }
            }
        }

        // Leverage
        if let (Some(total_debt), Some(equity)) = (fin.total_debt, fin.stockholders_equity) {
            if let Some(de) = self.calculate_debt_to_equity(total_debt, equity) {
                record("de_ratio", de);
            }
        }

        if let (Some(total_debt), Some(assets)) = (fin.total_debt, fin.total_assets) {
            if let Some(ratio) = self.calculate_debt_ratio(total_debt, assets) {
                record("debt_ratio", ratio);
            }
        }

        if let (Some(operating_income), Some(interest)) = (fin.operating_income, fin.interest_expense) {
            if let Some(coverage) = self.calculate_interest_coverage(operating_income, interest) {
                record("interest_coverage", coverage);
            }
        }

        // Liquidity
        if let (Some(current_assets), Some(current_liabilities)) =
            (fin.total_current_assets, fin.total_current_liabilities)
        {
            if let Some(ratio) = self.calculate_current_ratio(current_assets, current_liabilities) {
                record("current_ratio", ratio);
            }
            if let Some(inventory) = fin.inventory {
                if let Some(ratio) =
                    self.calculate_quick_ratio(current_assets, inventory, current_liabilities)
                {
                    record("quick_ratio", ratio);
                }
            }
        }

        // Cash flow quality
        if let (Some(net_income), Some(ocf)) = (fin.net_income, fin.operating_cash_flow) {
            if net_income != 0.0 {
                let fcf = ocf - fin.capex.unwrap_or(0.0);
                record("free_cash_flow_calculated", fcf);
                if fcf != 0.0 {
                    record("fcf_net_income_ratio", fcf / net_income);
                }
            }
        }

        // Valuation
        if let (Some(price), Some(equity), Some(shares)) =
            (price, fin.stockholders_equity, fin.outstanding_shares)
        {
            if equity != 0.0 && shares > 0.0 {
                let book_value_per_share = equity / shares;
                if book_value_per_share > 0.0 {
                    record("pb_ratio", price / book_value_per_share);
                }
            }
        }

        if let (Some(price), Some(revenue), Some(shares)) =
            (price, fin.revenue, fin.outstanding_shares)
        {
            if revenue != 0.0 && shares > 0.0 {
                let revenue_per_share = revenue / shares;
                if revenue_per_share > 0.0 {
                    record("ps_ratio", price / revenue_per_share);
                }
            }
        }

        report.qualitative_summary = self.qualitative_summary(&fin, &ratios);

        if !scores.is_empty() {
            let avg = scores.values().map(|s| s.score as f64).sum::<f64>() / scores.len() as f64;
            let swot = self.build_swot(&scores, &report.qualitative_summary, avg);
            report.recommendation = Some(self.build_recommendation(avg, &swot));
            report.average_score = Some(avg);
            report.swot_analysis = Some(swot);
        }

        report.ratios = ratios;
        report.scores = scores;
        report
    }

    /// Pairwise categorical judgments; each emitted only when both inputs exist.
    fn qualitative_summary(
        &self,
        fin: &FilingFinancials,
        ratios: &BTreeMap<String, f64>,
    ) -> QualitativeSummary {
        let mut summary = QualitativeSummary::default();

        if let (Some(net_income), Some(ocf)) = (fin.net_income, fin.operating_cash_flow) {
            summary.earnings_quality = Some(
                if ocf >= net_income * 0.9 {
                    "High - Operating cash flow supports or exceeds reported earnings"
                } else if ocf >= net_income * 0.7 {
                    "Medium - Moderate discrepancy between earnings and cash flow"
                } else {
                    "Low - Significant disconnect between reported earnings and cash generation"
                }
                .to_string(),
            );
        }

        if let (Some(&de), Some(&current)) = (ratios.get("de_ratio"), ratios.get("current_ratio")) {
            summary.balance_sheet = Some(
                if de < 0.5 && current > 2.0 {
                    "Very Strong - Low debt levels and strong liquidity"
                } else if de < 1.0 && current > 1.5 {
                    "Strong - Manageable debt and good liquidity"
                } else if de < 2.0 && current > 1.0 {
                    "Adequate - Moderate debt and acceptable liquidity"
                } else {
                    "Weak - High debt burden or liquidity concerns"
                }
                .to_string(),
            );
        }

        if let (Some(&roe), Some(&net_margin)) = (ratios.get("roe"), ratios.get("net_profit_margin"))
        {
            summary.profitability = Some(
                if roe > 15.0 && net_margin > 10.0 {
                    "Excellent - High returns on equity and strong profit margins"
                } else if roe > 10.0 && net_margin > 5.0 {
                    "Good - Solid returns and acceptable margins"
                } else if roe > 5.0 && net_margin > 2.0 {
                    "Moderate - Adequate but not outstanding performance"
                } else {
                    "Poor - Low returns and thin margins"
                }
                .to_string(),
            );
        }

        summary
    }

    fn build_swot(
        &self,
        scores: &BTreeMap<String, TierScore>,
        summary: &QualitativeSummary,
        avg: f64,
    ) -> SwotAnalysis {
        let mut swot = SwotAnalysis::default();

        for (name, tier) in scores {
            let spaced = name.replace('_', " ");
            match tier.score {
                3 => swot.strengths.push(format!("Strong {spaced}")),
                1 => swot.weaknesses.push(format!("Weak {spaced}")),
                _ => {}
            }
        }

        if let Some(quality) = summary.earnings_quality.as_deref() {
            if quality.starts_with("High") {
                swot.strengths.push("High quality earnings".to_string());
            } else if quality.starts_with("Low") {
                swot.weaknesses.push("Poor earnings quality".to_string());
            }
        }

        if let Some(balance) = summary.balance_sheet.as_deref() {
            if balance.starts_with("Very Strong") || balance.starts_with("Strong") {
                swot.strengths.push("Strong balance sheet".to_string());
            } else if balance.starts_with("Weak") {
                swot.weaknesses.push("Weak balance sheet".to_string());
                swot.threats
                    .push("Financial distress risk if economic conditions worsen".to_string());
            }
        }

        if avg > 2.5 {
            swot.opportunities
                .push("Potential for favorable valuation rerating".to_string());
        } else if avg < 1.5 {
            swot.threats
                .push("Continued underperformance may lead to valuation decline".to_string());
        }

        swot
    }

    fn build_recommendation(&self, avg: f64, swot: &SwotAnalysis) -> Recommendation {
        let action = RecommendationAction::from_average(avg);

        let mut rec = match action {
            RecommendationAction::Buy => Recommendation {
                action,
                suitable_for: "Value and Growth Investors".to_string(),
                explanation:
                    "The company demonstrates strong financial health with favorable valuation metrics."
                        .to_string(),
                key_factors: vec![
                    "Solid profitability indicators".to_string(),
                    "Healthy balance sheet".to_string(),
                    "Reasonable valuation".to_string(),
                ],
                risk_factors: Vec::new(),
                watch_list: Vec::new(),
            },
            RecommendationAction::Hold => Recommendation {
                action,
                suitable_for: "Current Shareholders and Moderate-Risk Investors".to_string(),
                explanation:
                    "The company shows moderate financial health with a reasonable valuation profile."
                        .to_string(),
                key_factors: vec![
                    "Adequate financial metrics".to_string(),
                    "Some strengths offset by weaknesses".to_string(),
                ],
                risk_factors: Vec::new(),
                watch_list: Vec::new(),
            },
            RecommendationAction::Sell => Recommendation {
                action,
                suitable_for: "Risk-Averse Investors".to_string(),
                explanation:
                    "The company exhibits significant financial weaknesses or excessive valuation."
                        .to_string(),
                key_factors: Vec::new(),
                risk_factors: vec![
                    "Continued financial deterioration possible".to_string(),
                    "Potential for further valuation decline".to_string(),
                ],
                watch_list: Vec::new(),
            },
        };

        if action == RecommendationAction::Buy
            && swot.strengths.iter().any(|s| s == "Strong balance sheet")
        {
            rec.key_factors
                .push("Strong balance sheet provides financial flexibility".to_string());
        }

        for weakness in &swot.weaknesses {
            if !rec.key_factors.contains(weakness) {
                rec.key_factors.push(weakness.clone());
            }
            if !rec.risk_factors.contains(weakness) {
                rec.risk_factors.push(weakness.clone());
            }
        }
        if rec.risk_factors.is_empty() {
            rec.risk_factors.push(
                "No significant immediate risk factors identified from ratios, check qualitative summary."
                    .to_string(),
            );
        }

        rec.watch_list = WATCH_LIST.iter().map(|s| s.to_string()).collect();
        rec
    }
}

#[async_trait]
impl FilingAnalyzer for RatioAnalysisEngine {
    async fn analyze(
        &self,
        filing: &RawFiling,
        stock_price: Option<&str>,
    ) -> Result<FilingReport, AnalysisError> {
        Ok(RatioAnalysisEngine::analyze(self, filing, stock_price))
    }
}

impl Default for RatioAnalysisEngine {
    fn default() -> Self {
        Self::new()
    }
}
