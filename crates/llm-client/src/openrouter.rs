use crate::error::{ExtractionError, ExtractionResult};
use crate::ChatModel;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const OPENROUTER_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Structured-output model used for figure extraction.
pub const EXTRACTION_MODEL: &str = "deepseek/deepseek-chat-v3-0324:free";
/// Text-understanding model used for narrative summaries.
pub const NARRATIVE_MODEL: &str = "anthropic/claude-3-opus:free";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: MessageBody,
}

#[derive(Debug, Deserialize)]
struct MessageBody {
    content: String,
}

#[derive(Debug, Clone)]
pub struct OpenRouterClient {
    client: reqwest::Client,
    api_key: String,
}

impl OpenRouterClient {
    pub fn new(api_key: String, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { client, api_key }
    }

    async fn chat(&self, model: &str, prompt: &str) -> ExtractionResult<String> {
        let request = ChatRequest {
            model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(OPENROUTER_URL)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ExtractionError::Upstream(format!(
                "OpenRouter HTTP {}",
                response.status()
            )));
        }

        let body: ChatResponse = response.json().await?;
        body.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| {
                ExtractionError::Upstream("No valid response from OpenRouter API".to_string())
            })
    }
}

#[async_trait]
impl ChatModel for OpenRouterClient {
    fn name(&self) -> &'static str {
        "openrouter"
    }

    fn text_budget(&self) -> usize {
        15_000
    }

    async fn complete(&self, prompt: &str) -> ExtractionResult<String> {
        self.chat(EXTRACTION_MODEL, prompt).await
    }

    async fn complete_narrative(&self, prompt: &str) -> ExtractionResult<String> {
        self.chat(NARRATIVE_MODEL, prompt).await
    }
}
