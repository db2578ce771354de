//! Prompt builders for the extraction and narrative calls.

use analysis_core::METRIC_FIELDS;

/// Truncate on a char boundary so a multi-byte character at the cut point
/// cannot panic the slice.
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// The JSON template the model is told to fill in: company identifiers
/// plus every metric field, null by default.
fn response_template() -> String {
    let mut lines = vec![
        "    \"company_name\": \"\"".to_string(),
        "    \"fiscal_year\": \"\"".to_string(),
        "    \"fiscal_period\": \"\"".to_string(),
    ];
    lines.extend(METRIC_FIELDS.iter().map(|field| format!("    \"{field}\": null")));
    format!("{{\n{}\n}}", lines.join(",\n"))
}

/// Prompt asking a model to pull the structured figures out of a filing.
/// `budget` caps how much report text rides along.
pub fn financial_data_prompt(report_text: &str, budget: usize) -> String {
    let text = truncate_chars(report_text, budget);
    format!(
        r#"Extract the following financial data from this 10-K report in as much detail as possible:

Basic Information:
1. Company Name
2. Fiscal Year End Date
3. Fiscal Period (e.g. Annual, Q1, Q2, etc.)

Income Statement:
4. Revenue / Net Sales (in USD)
5. Cost of Goods Sold (COGS) (in USD)
6. Gross Profit (in USD)
7. Operating Expenses (in USD)
8. Operating Income / EBIT (in USD)
9. Interest Expense (in USD)
10. Net Income (in USD)

Balance Sheet:
11. Cash and Cash Equivalents (in USD)
12. Accounts Receivable (in USD)
13. Inventory (in USD)
14. Total Current Assets (in USD)
15. Property, Plant and Equipment (PP&E) (in USD)
16. Total Assets (in USD)
17. Accounts Payable (in USD)
18. Short-Term Debt (in USD)
19. Total Current Liabilities (in USD)
20. Long-Term Debt (in USD)
21. Total Liabilities (in USD)
22. Total Stockholders' Equity (in USD)
23. Total Outstanding Shares (count)

Cash Flow:
24. Cash Flow from Operating Activities (in USD)
25. Capital Expenditures (CapEx) (in USD)
26. Cash Flow from Investing Activities (in USD)
27. Cash Flow from Financing Activities (in USD)
28. Free Cash Flow (in USD, which is Operating Cash Flow - CapEx)

Return ONLY a valid JSON object with the following keys (use null for any values you cannot find):
{template}

Here is the 10-K text:
{text}"#,
        template = response_template(),
        text = text,
    )
}

/// Prompt asking for an MD&A summary and the top risk factors.
pub fn mda_prompt(report_text: &str, budget: usize) -> String {
    let text = truncate_chars(report_text, budget);
    format!(
        r#"From the following 10-K report, extract and summarize:
1. The key points from the "Management's Discussion and Analysis" (MD&A) section
2. The most significant risk factors mentioned in the report

Provide a concise summary of the company's performance, financial condition, future outlook,
and the most important risks it faces.

Format your response as JSON with these keys:
{{
    "summary": "The MD&A summary...",
    "risk_factors": ["Risk 1", "Risk 2", "Risk 3", "Risk 4", "Risk 5"]
}}

Here is the 10-K text:
{text}"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("short", 100), "short");
    }

    #[test]
    fn extraction_prompt_honors_budget() {
        let long_text = "x".repeat(50_000);
        let prompt = financial_data_prompt(&long_text, 15_000);
        assert!(prompt.contains(&"x".repeat(15_000)));
        assert!(!prompt.contains(&"x".repeat(15_001)));
        assert!(prompt.contains("\"outstanding_shares\": null"));
    }

    #[test]
    fn template_lists_every_metric_field() {
        let prompt = financial_data_prompt("text", 1_000);
        for field in METRIC_FIELDS {
            assert!(
                prompt.contains(&format!("\"{field}\": null")),
                "missing {field}"
            );
        }
        // The template itself must be valid JSON.
        let parsed: serde_json::Value = serde_json::from_str(&response_template()).unwrap();
        assert!(parsed.is_object());
    }

    #[test]
    fn mda_prompt_names_both_keys() {
        let prompt = mda_prompt("some filing text", 30_000);
        assert!(prompt.contains("\"summary\""));
        assert!(prompt.contains("\"risk_factors\""));
        assert!(prompt.contains("some filing text"));
    }
}
