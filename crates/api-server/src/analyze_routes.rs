//! The upload-and-analyze endpoint.
//!
//! Multipart form: `file` (PDF, required) plus optional `stock_price`,
//! `api_choice` (gemini | openrouter), `analysis_detail`
//! (standard | detailed), and `include_mda`.

use axum::body::Bytes;
use axum::extract::{Multipart, State};
use axum::routing::post;
use axum::{Json, Router};
use analysis_core::{FilingAnalyzer, FilingReport};
use anyhow::Context;
use llm_client::{extract_financials, extract_financials_chunked, summarize_mda, Provider};
use pdf_ingest::ExtractedDocument;
use std::io::Write;
use std::path::Path;

use crate::{AppError, AppState};

pub fn analyze_routes() -> Router<AppState> {
    Router::new().route("/api/analyze", post(analyze_report))
}

#[derive(Default)]
struct AnalyzeForm {
    file_name: Option<String>,
    file_bytes: Option<Bytes>,
    stock_price: Option<String>,
    api_choice: Option<String>,
    analysis_detail: Option<String>,
    include_mda: bool,
}

fn allowed_file(filename: &str) -> bool {
    Path::new(filename)
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

fn parse_bool(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

async fn read_form(mut multipart: Multipart) -> Result<AnalyzeForm, AppError> {
    let mut form = AnalyzeForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                form.file_name = field.file_name().map(|s| s.to_string());
                form.file_bytes = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {e}")))?,
                );
            }
            "stock_price" | "api_choice" | "analysis_detail" | "include_mda" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Failed to read field {name}: {e}")))?;
                match name.as_str() {
                    "stock_price" => form.stock_price = Some(value),
                    "api_choice" => form.api_choice = Some(value),
                    "analysis_detail" => form.analysis_detail = Some(value),
                    _ => form.include_mda = parse_bool(&value),
                }
            }
            _ => {}
        }
    }

    Ok(form)
}

async fn analyze_report(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<FilingReport>, AppError> {
    let form = read_form(multipart).await?;

    let bytes = form
        .file_bytes
        .ok_or_else(|| AppError::BadRequest("No file part".to_string()))?;
    let filename = form.file_name.unwrap_or_default();
    if filename.is_empty() {
        return Err(AppError::BadRequest("No selected file".to_string()));
    }
    if !allowed_file(&filename) {
        return Err(AppError::BadRequest("File type not allowed".to_string()));
    }

    let provider = Provider::from_choice(form.api_choice.as_deref());
    let model = state.llm.model(provider)?;

    tracing::info!(
        file = %filename,
        bytes = bytes.len(),
        provider = model.name(),
        "analyzing uploaded filing"
    );

    // PDF parsing is CPU-bound; keep it off the runtime workers. The
    // scratch file is removed when the handle drops, on every path.
    let chunk_chars = model.text_budget();
    let document = tokio::task::spawn_blocking(move || -> anyhow::Result<ExtractedDocument> {
        let mut scratch = tempfile::NamedTempFile::new().context("creating scratch file")?;
        scratch.write_all(&bytes).context("writing upload")?;
        let document =
            pdf_ingest::process(scratch.path(), chunk_chars).context("extracting PDF text")?;
        Ok(document)
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))??;

    tracing::debug!(
        pages = document.page_count,
        chars = document.text.len(),
        table_lines = document.tables.len(),
        chunks = document.chunks.len(),
        "extracted document"
    );

    // One call when the text fits the prompt budget, else per-chunk
    // extraction with non-null-preferring merge.
    let filing = if document.chunks.len() > 1 {
        extract_financials_chunked(model, &document.chunks).await?
    } else {
        extract_financials(model, &document.text).await?
    };

    let mut report = state
        .analyzer
        .analyze(&filing, form.stock_price.as_deref())
        .await?;

    // MD&A narrative is additive: a failure here degrades to a note in
    // the summary, never a failed request.
    let wants_mda = form.analysis_detail.as_deref() == Some("detailed") || form.include_mda;
    if wants_mda {
        match summarize_mda(model, &document.text).await {
            Ok(mda) => {
                report.qualitative_summary.mda_highlights = Some(mda.summary);
                if !mda.risk_factors.is_empty() {
                    report.qualitative_summary.key_risks = Some(mda.risk_factors);
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "MD&A summarization failed");
                report.qualitative_summary.mda_error =
                    Some(format!("Could not extract MD&A summary: {e}"));
            }
        }
    }

    Ok(Json(report))
}
