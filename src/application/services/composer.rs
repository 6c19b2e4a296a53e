use std::sync::Arc;
use tracing::instrument;

use crate::application::{Prompts, RetryPolicy};
use crate::domain::{ports::LlmService, DomainError, RetrievalResult, RetrievedDocument};

/// Opaque model output for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    pub text: String,
    pub explanation: Option<String>,
    /// False when nothing was retrieved and the model was not asked.
    pub consulted_model: bool,
}

/// Turns retrieved documents into a prompt and asks the model.
///
/// The retrieval result is only borrowed; candidates are listed in rank order.
pub struct RecommendationComposer {
    llm: Arc<dyn LlmService>,
    prompts: Prompts,
    retry: RetryPolicy,
    explain: bool,
}

impl RecommendationComposer {
    pub fn new(llm: Arc<dyn LlmService>, prompts: Prompts) -> Self {
        Self {
            llm,
            prompts,
            retry: RetryPolicy::default(),
            explain: true,
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_explanation(mut self, explain: bool) -> Self {
        self.explain = explain;
        self
    }

    pub fn build_prompt(&self, query: &str, retrieval: &RetrievalResult) -> String {
        let candidates = retrieval
            .documents
            .iter()
            .map(|d| format!("- {}", d.document.text))
            .collect::<Vec<_>>()
            .join("\n");

        self.prompts
            .recommendation
            .render(&[("query", query), ("candidates", &candidates)])
    }

    pub fn build_explanation_prompt(&self, query: &str, top: &RetrievedDocument) -> String {
        self.prompts
            .explanation
            .render(&[("query", query), ("document", &top.document.text)])
    }

    #[instrument(skip(self, retrieval), fields(model = self.llm.model_name(), candidates = retrieval.len()))]
    pub async fn compose(
        &self,
        query: &str,
        retrieval: &RetrievalResult,
    ) -> Result<Composition, DomainError> {
        let Some(top) = retrieval.top() else {
            tracing::info!("no candidates retrieved, model not consulted");
            return Ok(Composition {
                text: self.prompts.no_results_message.clone(),
                explanation: None,
                consulted_model: false,
            });
        };

        let prompt = self.build_prompt(query, retrieval);
        let text = self
            .ask(&self.prompts.recommendation.system, &prompt, "recommendation")
            .await?;

        let explanation = if self.explain {
            let prompt = self.build_explanation_prompt(query, top);
            match self
                .ask(&self.prompts.explanation.system, &prompt, "explanation")
                .await
            {
                Ok(explanation) => Some(explanation),
                Err(e) => {
                    tracing::warn!(error = %e, "explanation unavailable, returning recommendation only");
                    None
                }
            }
        } else {
            None
        };

        Ok(Composition {
            text,
            explanation,
            consulted_model: true,
        })
    }

    async fn ask(&self, system: &str, prompt: &str, operation: &str) -> Result<String, DomainError> {
        let answer = self
            .retry
            .run(operation, move || async move {
                if system.trim().is_empty() {
                    self.llm.complete(prompt).await
                } else {
                    self.llm.complete_with_system(system, prompt).await
                }
            })
            .await;

        match answer {
            Ok(text) => Ok(text.trim().to_string()),
            Err(e @ DomainError::Validation(_)) => Err(e),
            Err(e) => Err(DomainError::composer(format!("{operation}: {e}"))),
        }
    }
}
