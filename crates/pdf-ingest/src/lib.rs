//! PDF ingestion: page-wise text extraction, table-line capture, and
//! chunking for size-limited prompting.

use lopdf::Document;
use std::path::Path;
use thiserror::Error;

/// Default chunk size in characters. Matches the text budget the
/// extraction prompts impose downstream.
pub const DEFAULT_CHUNK_CHARS: usize = 15_000;
/// Overlap between consecutive chunks so figures spanning a boundary
/// appear whole in at least one chunk.
pub const DEFAULT_CHUNK_OVERLAP: usize = 500;

#[derive(Error, Debug)]
pub enum PdfError {
    #[error("Failed to open PDF: {0}")]
    Open(String),

    #[error("No extractable text in document")]
    Empty,
}

/// Everything pulled out of one uploaded filing.
#[derive(Debug, Clone)]
pub struct ExtractedDocument {
    /// Concatenated text of all readable pages.
    pub text: String,
    /// Lines that look like financial table rows.
    pub tables: Vec<String>,
    /// The text re-cut into overlapping prompt-sized chunks.
    pub chunks: Vec<String>,
    pub page_count: usize,
}

fn collect_text(doc: &Document) -> String {
    let mut text = String::new();
    for (page_num, _page_id) in doc.get_pages() {
        match doc.extract_text(&[page_num]) {
            Ok(content) => {
                if !content.trim().is_empty() {
                    text.push_str(&content);
                    text.push('\n');
                }
            }
            Err(e) => {
                tracing::warn!(page = page_num, error = %e, "skipping unreadable page");
            }
        }
    }
    text
}

/// Extract text from every page of a PDF. Pages that fail to decode are
/// skipped with a warning; the document is an error only when nothing at
/// all could be read.
pub fn extract_text(path: &Path) -> Result<String, PdfError> {
    let doc = Document::load(path).map_err(|e| PdfError::Open(e.to_string()))?;
    let text = collect_text(&doc);

    if text.trim().is_empty() {
        return Err(PdfError::Empty);
    }
    Ok(text)
}

/// Best-effort capture of tabular lines: rows carrying several numeric
/// columns, the way financial statements print them.
pub fn extract_table_lines(text: &str) -> Vec<String> {
    text.lines()
        .filter(|line| {
            let numeric_tokens = line
                .split_whitespace()
                .filter(|token| {
                    let t = token
                        .trim_matches(|c: char| matches!(c, '(' | ')' | '$' | '%'))
                        .replace(',', "");
                    !t.is_empty() && t.chars().all(|c| c.is_ascii_digit() || c == '.' || c == '-')
                })
                .count();
            numeric_tokens >= 3
        })
        .map(|line| line.trim().to_string())
        .collect()
}

/// Cut text into chunks of at most `max_chars`, preferring paragraph
/// boundaries, with `overlap` characters of context repeated between
/// consecutive chunks. Every character of input lands in some chunk.
pub fn chunk_text(text: &str, max_chars: usize, overlap: usize) -> Vec<String> {
    assert!(max_chars > 0, "chunk size must be positive");
    let overlap = overlap.min(max_chars / 2);

    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return Vec::new();
    }
    if chars.len() <= max_chars {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut start = 0usize;

    while start < chars.len() {
        let hard_end = (start + max_chars).min(chars.len());
        let end = if hard_end < chars.len() {
            // Walk back to the nearest paragraph break, then line break,
            // inside the window. Fall back to a hard split.
            find_break(&chars, start, hard_end).unwrap_or(hard_end)
        } else {
            hard_end
        };

        chunks.push(chars[start..end].iter().collect());
        if end == chars.len() {
            break;
        }
        start = end.saturating_sub(overlap).max(start + 1);
    }

    chunks
}

/// Look for "\n\n" and then "\n" in the back half of the window; returns
/// the index just past the break.
fn find_break(chars: &[char], start: usize, hard_end: usize) -> Option<usize> {
    let floor = start + (hard_end - start) / 2;
    let window = &chars[floor..hard_end];

    let mut last_para = None;
    let mut last_line = None;
    for (i, pair) in window.windows(2).enumerate() {
        if pair[0] == '\n' {
            last_line = Some(floor + i + 1);
            if pair[1] == '\n' {
                last_para = Some(floor + i + 2);
            }
        }
    }
    last_para.or(last_line)
}

/// Full ingest of one PDF: text, table lines, and chunks cut to
/// `chunk_chars` (the downstream prompt budget).
pub fn process(path: &Path, chunk_chars: usize) -> Result<ExtractedDocument, PdfError> {
    let doc = Document::load(path).map_err(|e| PdfError::Open(e.to_string()))?;
    let page_count = doc.get_pages().len();
    let text = collect_text(&doc);

    if text.trim().is_empty() {
        return Err(PdfError::Empty);
    }

    let tables = extract_table_lines(&text);
    let chunks = chunk_text(&text, chunk_chars, DEFAULT_CHUNK_OVERLAP);

    Ok(ExtractedDocument {
        text,
        tables,
        chunks,
        page_count,
    })
}
