use super::*;
use analysis_core::{RawFiling, RecommendationAction, METRIC_FIELDS};
use serde_json::json;

fn filing(value: serde_json::Value) -> RawFiling {
    serde_json::from_value(value).unwrap()
}

fn engine() -> RatioAnalysisEngine {
    RatioAnalysisEngine::new()
}

// A filing where every scored ratio lands in tier 3 (with price 9.9).
fn strong_filing() -> RawFiling {
    filing(json!({
        "company_name": "Fortress Industries",
        "fiscal_year": "2024-12-31",
        "fiscal_period": "Annual",
        "revenue": 1_000_000,
        "gross_profit": 500_000,
        "operating_income": 200_000,
        "interest_expense": 10_000,
        "net_income": 150_000,
        "inventory": 50_000,
        "total_current_assets": 500_000,
        "total_assets": 2_000_000,
        "short_term_debt": 50_000,
        "total_current_liabilities": 200_000,
        "long_term_debt": 50_000,
        "stockholders_equity": 800_000,
        "outstanding_shares": 100_000,
        "operating_cash_flow": 200_000,
        "capex": 10_000
    }))
}

// A filing where every scored ratio lands in tier 1 (with price 50).
fn weak_filing() -> RawFiling {
    filing(json!({
        "company_name": "Leaky Boat Co",
        "revenue": 1_000_000,
        "gross_profit": 150_000,
        "operating_income": 50_000,
        "interest_expense": 100_000,
        "net_income": 10_000,
        "inventory": 100_000,
        "total_current_assets": 200_000,
        "total_assets": 1_500_000,
        "short_term_debt": 400_000,
        "total_current_liabilities": 300_000,
        "long_term_debt": 800_000,
        "stockholders_equity": 500_000,
        "outstanding_shares": 100_000,
        "operating_cash_flow": 2_000,
        "capex": 1_000
    }))
}

#[test]
fn zero_equity_skips_roe_and_de_ratio() {
    let report = engine().analyze(
        &filing(json!({
            "net_income": 150_000,
            "stockholders_equity": 0,
            "short_term_debt": 10_000,
            "long_term_debt": 20_000
        })),
        None,
    );

    assert!(!report.ratios.contains_key("roe"));
    assert!(!report.ratios.contains_key("de_ratio"));
    assert!(!report.scores.contains_key("roe"));
    assert!(!report.scores.contains_key("de_ratio"));
}

#[test]
fn eps_requires_positive_share_count() {
    let with_shares = engine().analyze(
        &filing(json!({ "net_income": 150_000, "outstanding_shares": 50_000 })),
        None,
    );
    assert_eq!(with_shares.ratios.get("eps"), Some(&3.0));

    let zero_shares = engine().analyze(
        &filing(json!({ "net_income": 150_000, "outstanding_shares": 0 })),
        None,
    );
    assert!(!zero_shares.ratios.contains_key("eps"));

    let no_income = engine().analyze(&filing(json!({ "outstanding_shares": 50_000 })), None);
    assert!(!no_income.ratios.contains_key("eps"));
}

#[test]
fn net_margin_fifteen_percent_scores_strong() {
    let report = engine().analyze(
        &filing(json!({ "revenue": 1_000_000, "net_income": 150_000 })),
        None,
    );

    assert_eq!(report.ratios.get("net_profit_margin"), Some(&15.0));
    let tier = report.scores.get("net_profit_margin").unwrap();
    assert_eq!(tier.score, 3);
    assert_eq!(tier.interpretation, "Strong");
}

#[test]
fn textual_amounts_are_normalized() {
    let report = engine().analyze(
        &filing(json!({
            "revenue": "$1,000,000",
            "net_income": "(250,000)",
            "total_assets": "2.5M"
        })),
        None,
    );

    let data = &report.extracted_data;
    assert_eq!(data.revenue, Some(1_000_000.0));
    assert_eq!(data.net_income, Some(-250_000.0));
    assert_eq!(data.total_assets, Some(2_500_000.0));
    // Negative margin still computes, and scores weak.
    assert_eq!(report.ratios.get("net_profit_margin"), Some(&-25.0));
    assert_eq!(report.scores.get("net_profit_margin").unwrap().score, 1);
}

#[test]
fn total_debt_sums_components() {
    let report = engine().analyze(
        &filing(json!({ "short_term_debt": 100_000, "long_term_debt": 400_000 })),
        None,
    );
    assert_eq!(report.extracted_data.total_debt, Some(500_000.0));
}

#[test]
fn total_debt_falls_back_to_reported_total() {
    let report = engine().analyze(&filing(json!({ "total_debt": "250,000" })), None);
    assert_eq!(report.extracted_data.total_debt, Some(250_000.0));
}

#[test]
fn total_debt_defaults_to_zero_when_nothing_reported() {
    let report = engine().analyze(
        &filing(json!({ "stockholders_equity": 1_000_000 })),
        None,
    );
    assert_eq!(report.extracted_data.total_debt, Some(0.0));
    // Zero debt against positive equity reads as low leverage.
    assert_eq!(report.ratios.get("de_ratio"), Some(&0.0));
    assert_eq!(report.scores.get("de_ratio").unwrap().score, 3);
}

#[test]
fn interest_coverage_uses_absolute_expense() {
    let report = engine().analyze(
        &filing(json!({ "operating_income": 60_000, "interest_expense": -10_000 })),
        None,
    );
    assert_eq!(report.ratios.get("interest_coverage"), Some(&6.0));
}

#[test]
fn quick_ratio_needs_inventory() {
    let without = engine().analyze(
        &filing(json!({
            "total_current_assets": 300_000,
            "total_current_liabilities": 100_000
        })),
        None,
    );
    assert!(without.ratios.contains_key("current_ratio"));
    assert!(!without.ratios.contains_key("quick_ratio"));

    let with = engine().analyze(
        &filing(json!({
            "total_current_assets": 300_000,
            "inventory": 100_000,
            "total_current_liabilities": 100_000
        })),
        None,
    );
    assert_eq!(with.ratios.get("quick_ratio"), Some(&2.0));
}

#[test]
fn free_cash_flow_treats_missing_capex_as_zero() {
    let report = engine().analyze(
        &filing(json!({ "net_income": 100_000, "operating_cash_flow": 130_000 })),
        None,
    );
    assert_eq!(report.ratios.get("free_cash_flow_calculated"), Some(&130_000.0));
    assert_eq!(report.ratios.get("fcf_net_income_ratio"), Some(&1.3));
    assert_eq!(report.scores.get("fcf_net_income_ratio").unwrap().score, 3);
    // The calculated FCF itself carries no tier.
    assert!(!report.scores.contains_key("free_cash_flow_calculated"));
}

#[test]
fn valuation_ratios_require_a_parseable_price() {
    let base = json!({
        "revenue": 1_000_000,
        "net_income": 150_000,
        "stockholders_equity": 800_000,
        "outstanding_shares": 100_000
    });

    let priced = engine().analyze(&filing(base.clone()), Some("12.00"));
    assert!(priced.ratios.contains_key("pe_ratio"));
    assert!(priced.ratios.contains_key("pb_ratio"));
    assert!(priced.ratios.contains_key("ps_ratio"));

    let unpriced = engine().analyze(&filing(base.clone()), None);
    assert!(!unpriced.ratios.contains_key("pe_ratio"));
    assert!(!unpriced.ratios.contains_key("pb_ratio"));

    // Garbage price behaves exactly like no price.
    let garbage = engine().analyze(&filing(base), Some("not-a-price"));
    assert!(!garbage.ratios.contains_key("pe_ratio"));
    assert!(garbage.ratios.contains_key("eps"));
}

#[test]
fn strong_filing_recommends_buy() {
    let report = engine().analyze(&strong_filing(), Some("9.90"));

    assert!(report.scores.values().all(|t| t.score == 3), "{:?}", report.scores);
    assert_eq!(report.average_score, Some(3.0));

    let rec = report.recommendation.unwrap();
    assert_eq!(rec.action, RecommendationAction::Buy);
    assert_eq!(rec.suitable_for, "Value and Growth Investors");
    assert!(rec
        .key_factors
        .contains(&"Strong balance sheet provides financial flexibility".to_string()));
    // No weaknesses, so the default risk note applies.
    assert_eq!(rec.risk_factors.len(), 1);
    assert!(rec.risk_factors[0].starts_with("No significant immediate risk factors"));
    assert_eq!(rec.watch_list.len(), 4);

    let swot = report.swot_analysis.unwrap();
    assert!(swot.strengths.contains(&"Strong roe".to_string()));
    assert!(swot.strengths.contains(&"High quality earnings".to_string()));
    assert!(swot.strengths.contains(&"Strong balance sheet".to_string()));
    assert!(swot.weaknesses.is_empty());
    assert!(swot
        .opportunities
        .contains(&"Potential for favorable valuation rerating".to_string()));
}

#[test]
fn weak_filing_recommends_sell() {
    let report = engine().analyze(&weak_filing(), Some("50"));

    assert!(report.scores.values().all(|t| t.score == 1), "{:?}", report.scores);
    assert_eq!(report.average_score, Some(1.0));

    let rec = report.recommendation.unwrap();
    assert_eq!(rec.action, RecommendationAction::Sell);
    // Weaknesses flow into both factor lists.
    assert!(rec.key_factors.contains(&"Weak roe".to_string()));
    assert!(rec.risk_factors.contains(&"Weak roe".to_string()));
    assert!(rec
        .risk_factors
        .contains(&"Continued financial deterioration possible".to_string()));

    let swot = report.swot_analysis.unwrap();
    assert!(swot.weaknesses.contains(&"Weak balance sheet".to_string()));
    assert!(swot
        .threats
        .contains(&"Financial distress risk if economic conditions worsen".to_string()));
    assert!(swot
        .threats
        .contains(&"Continued underperformance may lead to valuation decline".to_string()));
}

#[test]
fn improving_every_input_never_downgrades_the_action() {
    let weak = engine().analyze(&weak_filing(), Some("50"));
    let strong = engine().analyze(&strong_filing(), Some("9.90"));

    let weak_avg = weak.average_score.unwrap();
    let strong_avg = strong.average_score.unwrap();
    assert!(strong_avg > weak_avg);

    // Action ordering: Sell < Hold < Buy must follow the average.
    fn rank(action: RecommendationAction) -> i32 {
        match action {
            RecommendationAction::Sell => 0,
            RecommendationAction::Hold => 1,
            RecommendationAction::Buy => 2,
        }
    }
    let weak_rank = rank(weak.recommendation.unwrap().action);
    let strong_rank = rank(strong.recommendation.unwrap().action);
    assert!(strong_rank >= weak_rank);

    // And the mapping itself is monotone across the whole range.
    let mut last = 0;
    for step in 0..=40 {
        let avg = 1.0 + step as f64 * 0.05;
        let r = rank(RecommendationAction::from_average(avg));
        assert!(r >= last, "rank dropped at avg={avg}");
        last = r;
    }
}

#[test]
fn qualitative_earnings_quality_boundaries() {
    let eng = engine();
    let high = eng.analyze(
        &filing(json!({ "net_income": 100_000, "operating_cash_flow": 90_000 })),
        None,
    );
    assert!(high
        .qualitative_summary
        .earnings_quality
        .unwrap()
        .starts_with("High"));

    let medium = eng.analyze(
        &filing(json!({ "net_income": 100_000, "operating_cash_flow": 75_000 })),
        None,
    );
    assert!(medium
        .qualitative_summary
        .earnings_quality
        .unwrap()
        .starts_with("Medium"));

    let low = eng.analyze(
        &filing(json!({ "net_income": 100_000, "operating_cash_flow": 50_000 })),
        None,
    );
    assert!(low
        .qualitative_summary
        .earnings_quality
        .unwrap()
        .starts_with("Low"));
}

#[test]
fn empty_filing_produces_a_bare_report() {
    let report = engine().analyze(&filing(json!({})), None);

    assert_eq!(report.company_name, "Unknown");
    assert_eq!(report.fiscal_year, "Unknown");
    assert_eq!(report.fiscal_period, "Annual");
    // total_debt defaults to zero but no ratio can use it without equity/assets.
    assert!(report.ratios.is_empty());
    assert!(report.scores.is_empty());
    assert!(report.average_score.is_none());
    assert!(report.recommendation.is_none());
    assert!(report.swot_analysis.is_none());
}

#[test]
fn extracted_data_carries_every_metric_field() {
    let report = engine().analyze(&filing(json!({})), None);
    let data = serde_json::to_value(&report.extracted_data).unwrap();
    let map = data.as_object().unwrap();
    for field in METRIC_FIELDS {
        assert!(map.contains_key(*field), "missing {field}");
        assert!(map[*field].is_null());
    }
    // Derived field is present too.
    assert!(map.contains_key("total_debt"));
}

#[test]
fn every_score_has_a_matching_ratio() {
    let report = engine().analyze(&strong_filing(), Some("9.90"));
    for name in report.scores.keys() {
        assert!(report.ratios.contains_key(name), "score {name} without ratio");
    }
}
