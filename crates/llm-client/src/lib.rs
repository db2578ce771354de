pub mod error;
pub mod extract;
pub mod gemini;
pub mod openrouter;
pub mod parse;
pub mod prompts;

pub use error::{ExtractionError, ExtractionResult};
pub use extract::{extract_financials, extract_financials_chunked, summarize_mda, MdaSummary};
pub use gemini::GeminiClient;
pub use openrouter::OpenRouterClient;
pub use parse::extract_json;

use async_trait::async_trait;
use std::time::Duration;

/// A chat-completion provider: prompt in, free text out.
///
/// The analysis pipeline only ever talks to this trait; which vendor is
/// behind it is a request-time choice.
#[async_trait]
pub trait ChatModel: Send + Sync + std::fmt::Debug {
    /// Provider name for logs and error messages.
    fn name(&self) -> &'static str;

    /// Characters of filing text a single prompt may carry.
    fn text_budget(&self) -> usize;

    async fn complete(&self, prompt: &str) -> ExtractionResult<String>;

    /// Narrative calls may route to a different underlying model.
    async fn complete_narrative(&self, prompt: &str) -> ExtractionResult<String> {
        self.complete(prompt).await
    }
}

/// Which provider to use for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Gemini,
    OpenRouter,
}

impl Provider {
    /// Parse a form-field value. Anything that isn't "openrouter" falls
    /// back to the default provider, Gemini.
    pub fn from_choice(choice: Option<&str>) -> Self {
        match choice.map(str::trim) {
            Some(c) if c.eq_ignore_ascii_case("openrouter") => Provider::OpenRouter,
            _ => Provider::Gemini,
        }
    }
}

/// Configuration for the LLM providers.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub openrouter_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        fn key(var: &str) -> Option<String> {
            std::env::var(var).ok().filter(|v| !v.trim().is_empty())
        }

        let timeout_secs = std::env::var("LLM_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(90);

        Self {
            openrouter_api_key: key("OPENROUTER_API_KEY"),
            gemini_api_key: key("GEMINI_API_KEY"),
            timeout: Duration::from_secs(timeout_secs),
        }
    }
}

/// Complete LLM client: whichever providers have keys configured.
#[derive(Clone)]
pub struct LlmClient {
    openrouter: Option<OpenRouterClient>,
    gemini: Option<GeminiClient>,
}

impl LlmClient {
    pub fn new(config: LlmConfig) -> Self {
        Self {
            openrouter: config
                .openrouter_api_key
                .map(|key| OpenRouterClient::new(key, config.timeout)),
            gemini: config
                .gemini_api_key
                .map(|key| GeminiClient::new(key, config.timeout)),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(LlmConfig::default())
    }

    /// The model for a provider choice, or MissingApiKey when it was
    /// never configured.
    pub fn model(&self, provider: Provider) -> ExtractionResult<&dyn ChatModel> {
        match provider {
            Provider::OpenRouter => self
                .openrouter
                .as_ref()
                .map(|c| c as &dyn ChatModel)
                .ok_or(ExtractionError::MissingApiKey("OpenRouter")),
            Provider::Gemini => self
                .gemini
                .as_ref()
                .map(|c| c as &dyn ChatModel)
                .ok_or(ExtractionError::MissingApiKey("Gemini")),
        }
    }

    pub fn has_openrouter(&self) -> bool {
        self.openrouter.is_some()
    }

    pub fn has_gemini(&self) -> bool {
        self.gemini.is_some()
    }
}
