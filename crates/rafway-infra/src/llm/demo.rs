//! DemoProvider -- simulated replies when no API key is configured.

use std::time::Duration;

use rafway_core::llm::provider::LlmProvider;
use rafway_types::llm::{CompletionRequest, CompletionResponse, LlmError, Usage};

const DEMO_REPLY_PREFIX: &str = "Ceci est une réponse simulée car aucune clé API Gemini n'a été configurée. Dans la version de production, je répondrais intelligemment à : ";

/// Waits a fixed latency, then quotes the newest user message back.
pub struct DemoProvider {
    latency: Duration,
}

impl DemoProvider {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

impl LlmProvider for DemoProvider {
    fn name(&self) -> &str {
        "demo"
    }

    fn default_model(&self) -> &str {
        "demo"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let message = request
            .messages
            .last()
            .map(|m| m.content.as_str())
            .ok_or_else(|| LlmError::InvalidRequest("no messages".to_string()))?;

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        Ok(CompletionResponse {
            content: format!("{DEMO_REPLY_PREFIX}{message}"),
            model: "demo".to_string(),
            usage: Usage::default(),
        })
    }
}
