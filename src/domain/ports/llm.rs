use async_trait::async_trait;

use crate::domain::errors::DomainError;

/// Hosted chat model. Output is opaque text.
#[async_trait]
pub trait LlmService: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, DomainError>;

    async fn complete_with_system(
        &self,
        system: &str,
        prompt: &str,
    ) -> Result<String, DomainError>;

    fn model_name(&self) -> &str;
}
