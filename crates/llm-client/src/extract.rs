//! High-level extraction calls: prompt, complete, scrape JSON, merge.

use crate::error::{ExtractionError, ExtractionResult};
use crate::parse::extract_json;
use crate::{prompts, ChatModel};
use analysis_core::RawFiling;
use serde::{Deserialize, Serialize};

/// Narrative summary of the MD&A and risk-factor sections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MdaSummary {
    pub summary: String,
    #[serde(default)]
    pub risk_factors: Vec<String>,
}

/// Ask the model for the structured figures in one slice of report text.
pub async fn extract_financials(
    model: &dyn ChatModel,
    report_text: &str,
) -> ExtractionResult<RawFiling> {
    let prompt = prompts::financial_data_prompt(report_text, model.text_budget());
    tracing::debug!(provider = model.name(), "requesting financial data extraction");
    let content = model.complete(&prompt).await?;
    extract_json(&content)
}

/// Extract from several chunks and merge the partial results. Earlier
/// chunks win: 10-K statements front-load the financial statements, so
/// the first populated value for a field is kept.
///
/// Individual chunk failures are tolerated; the call fails only when no
/// chunk yields a result at all.
pub async fn extract_financials_chunked(
    model: &dyn ChatModel,
    chunks: &[String],
) -> ExtractionResult<RawFiling> {
    let mut merged: Option<RawFiling> = None;
    let mut last_error: Option<ExtractionError> = None;

    for (i, chunk) in chunks.iter().enumerate() {
        match extract_financials(model, chunk).await {
            Ok(filing) => match merged.as_mut() {
                Some(existing) => existing.merge(filing),
                None => merged = Some(filing),
            },
            Err(e) => {
                tracing::warn!(provider = model.name(), chunk = i, error = %e, "chunk extraction failed");
                last_error = Some(e);
            }
        }
    }

    merged.ok_or_else(|| {
        last_error.unwrap_or_else(|| {
            ExtractionError::Upstream("No chunks produced an extraction".to_string())
        })
    })
}

/// Ask the model to summarize the MD&A section and top risk factors.
pub async fn summarize_mda(
    model: &dyn ChatModel,
    report_text: &str,
) -> ExtractionResult<MdaSummary> {
    let prompt = prompts::mda_prompt(report_text, model.text_budget());
    tracing::debug!(provider = model.name(), "requesting MD&A summary");
    let content = model.complete_narrative(&prompt).await?;
    extract_json(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Canned-response model for driving the extraction paths.
    #[derive(Debug)]
    struct ScriptedModel {
        responses: Vec<ExtractionResult<String>>,
        cursor: AtomicUsize,
    }

    impl ScriptedModel {
        fn new(responses: Vec<ExtractionResult<String>>) -> Self {
            Self {
                responses,
                cursor: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ChatModel for ScriptedModel {
        fn name(&self) -> &'static str {
            "scripted"
        }

        fn text_budget(&self) -> usize {
            1_000
        }

        async fn complete(&self, _prompt: &str) -> ExtractionResult<String> {
            let i = self.cursor.fetch_add(1, Ordering::SeqCst);
            match &self.responses[i] {
                Ok(s) => Ok(s.clone()),
                Err(_) => Err(ExtractionError::Upstream("scripted failure".to_string())),
            }
        }
    }

    #[tokio::test]
    async fn extraction_scrapes_json_from_prose() {
        let model = ScriptedModel::new(vec![Ok(
            "Here you go:\n```json\n{\"company_name\": \"Acme\", \"revenue\": \"1.5M\"}\n```"
                .to_string(),
        )]);
        let filing = extract_financials(&model, "report text").await.unwrap();
        assert_eq!(filing.company_name.as_deref(), Some("Acme"));
        assert_eq!(filing.metric("revenue"), Some(&serde_json::json!("1.5M")));
    }

    #[tokio::test]
    async fn chunked_extraction_merges_preferring_earlier_values() {
        let model = ScriptedModel::new(vec![
            Ok(r#"{"company_name": "Acme", "revenue": 1000, "net_income": null}"#.to_string()),
            Ok(r#"{"company_name": "Acme Corp", "revenue": 2000, "net_income": 150}"#.to_string()),
        ]);
        let chunks = vec!["first".to_string(), "second".to_string()];
        let filing = extract_financials_chunked(&model, &chunks).await.unwrap();

        // First chunk's values hold; nulls are filled from the second.
        assert_eq!(filing.company_name.as_deref(), Some("Acme"));
        assert_eq!(filing.metric("revenue"), Some(&serde_json::json!(1000)));
        assert_eq!(filing.metric("net_income"), Some(&serde_json::json!(150)));
    }

    #[tokio::test]
    async fn chunked_extraction_survives_a_failing_chunk() {
        let model = ScriptedModel::new(vec![
            Err(ExtractionError::Upstream("boom".to_string())),
            Ok(r#"{"revenue": 2000}"#.to_string()),
        ]);
        let chunks = vec!["first".to_string(), "second".to_string()];
        let filing = extract_financials_chunked(&model, &chunks).await.unwrap();
        assert_eq!(filing.metric("revenue"), Some(&serde_json::json!(2000)));
    }

    #[tokio::test]
    async fn chunked_extraction_fails_when_all_chunks_fail() {
        let model = ScriptedModel::new(vec![
            Err(ExtractionError::Upstream("boom".to_string())),
            Err(ExtractionError::Upstream("boom".to_string())),
        ]);
        let chunks = vec!["first".to_string(), "second".to_string()];
        let err = extract_financials_chunked(&model, &chunks).await.unwrap_err();
        assert!(matches!(err, ExtractionError::Upstream(_)));
    }

    #[tokio::test]
    async fn mda_summary_parses_risk_factors() {
        let model = ScriptedModel::new(vec![Ok(
            r#"{"summary": "Solid year.", "risk_factors": ["Competition", "FX exposure"]}"#
                .to_string(),
        )]);
        let mda = summarize_mda(&model, "report text").await.unwrap();
        assert_eq!(mda.summary, "Solid year.");
        assert_eq!(mda.risk_factors.len(), 2);
    }
}
