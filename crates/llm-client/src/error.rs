use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("{0} API key not configured")]
    MissingApiKey(&'static str),

    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Upstream API error: {0}")]
    Upstream(String),

    #[error("Could not extract JSON data from API response")]
    MissingJson,

    #[error("Failed to parse JSON from API response: {0}")]
    MalformedResponse(#[from] serde_json::Error),
}

pub type ExtractionResult<T> = Result<T, ExtractionError>;
