use async_trait::async_trait;
use rig::client::{CompletionClient, ProviderClient};
use rig::completion::Prompt;
use rig::providers::openai;
use std::time::Duration;

use crate::domain::{ports::LlmService, DomainError};
use crate::infrastructure::config::LlmConfig;

/// OpenAI chat completions through rig, bounded by a per-call timeout.
pub struct OpenAiLlm {
    client: openai::Client,
    model: String,
    temperature: f64,
    timeout: Duration,
}

impl OpenAiLlm {
    pub fn from_config(config: &LlmConfig) -> Self {
        Self {
            client: openai::Client::from_env(),
            model: config.model.clone(),
            temperature: config.temperature,
            timeout: Duration::from_secs(config.timeout_seconds),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn run(&self, system: Option<&str>, prompt: &str) -> Result<String, DomainError> {
        let mut builder = self.client.agent(&self.model).temperature(self.temperature);
        if let Some(system) = system.filter(|s| !s.trim().is_empty()) {
            builder = builder.preamble(system);
        }
        let agent = builder.build();

        tokio::time::timeout(self.timeout, agent.prompt(prompt))
            .await
            .map_err(|_| {
                DomainError::timeout(format!(
                    "{} did not answer within {}s",
                    self.model,
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e| DomainError::external(format!("completion failed: {e}")))
    }
}

#[async_trait]
impl LlmService for OpenAiLlm {
    async fn complete(&self, prompt: &str) -> Result<String, DomainError> {
        self.run(None, prompt).await
    }

    async fn complete_with_system(
        &self,
        system: &str,
        prompt: &str,
    ) -> Result<String, DomainError> {
        self.run(Some(system), prompt).await
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
