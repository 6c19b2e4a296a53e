//! Deterministic stand-ins for the external services, shared by unit tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::domain::ports::{EmbeddingService, LlmService, VectorIndex};
use crate::domain::{
    BakeryRecord, DomainError, Embedding, Review, Scores, SearchDocument, SearchResult,
};

/// Bag-of-words embedding: each lowercase word is hashed (FNV-1a) into one of
/// `dimension` buckets. Equal texts always embed equally.
pub struct HashingEmbedding {
    dimension: usize,
}

impl HashingEmbedding {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    fn vectorize(&self, text: &str) -> Embedding {
        let mut values = vec![0.0f32; self.dimension];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let hash = word
                .to_lowercase()
                .bytes()
                .fold(0xcbf29ce484222325u64, |h, b| {
                    (h ^ b as u64).wrapping_mul(0x100000001b3)
                });
            values[(hash % self.dimension as u64) as usize] += 1.0;
        }
        Embedding::new(values)
    }
}

#[async_trait]
impl EmbeddingService for HashingEmbedding {
    async fn embed(&self, text: &str) -> Result<Embedding, DomainError> {
        Ok(self.vectorize(text))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, DomainError> {
        Ok(texts.iter().map(|t| self.vectorize(t)).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Replays queued answers in order and records every prompt it was given.
/// Once the queue is drained it answers with `fallback`.
pub struct ScriptedLlm {
    answers: Mutex<VecDeque<Result<String, DomainError>>>,
    prompts: Mutex<Vec<String>>,
    fallback: String,
}

impl ScriptedLlm {
    pub fn new(answers: Vec<Result<String, DomainError>>) -> Self {
        Self {
            answers: Mutex::new(answers.into()),
            prompts: Mutex::new(Vec::new()),
            fallback: "Sunrise Bakery\ntotal: 90, taste: 95".to_string(),
        }
    }

    pub fn answering(text: &str) -> Self {
        let mut llm = Self::new(Vec::new());
        llm.fallback = text.to_string();
        llm
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmService for ScriptedLlm {
    async fn complete(&self, prompt: &str) -> Result<String, DomainError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(self.fallback.clone()))
    }

    async fn complete_with_system(
        &self,
        _system: &str,
        prompt: &str,
    ) -> Result<String, DomainError> {
        self.complete(prompt).await
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

/// Index that behaves like an unreachable Qdrant.
pub struct UnreachableIndex;

#[async_trait]
impl VectorIndex for UnreachableIndex {
    async fn upsert(&self, _: &[SearchDocument], _: &[Embedding]) -> Result<(), DomainError> {
        Err(DomainError::retrieval_unavailable("connection refused"))
    }

    async fn search(&self, _: &Embedding, _: usize) -> Result<Vec<SearchResult>, DomainError> {
        Err(DomainError::retrieval_unavailable(
            "collection 'bakery_vector_store' not found",
        ))
    }

    async fn count(&self) -> Result<usize, DomainError> {
        Err(DomainError::retrieval_unavailable("connection refused"))
    }
}

const THEMES: [&str; 10] = [
    "sourdough rustic countryside",
    "matcha minimalist modern",
    "croissant buttery flaky",
    "vegan gluten wholesome",
    "donut playful colorful",
    "bagel classic breakfast",
    "macaron elegant pastel",
    "cinnamon cozy fireplace",
    "baguette parisian street",
    "cheesecake creamy dessert",
];

/// Ten bakeries, each with one review built around a distinct theme.
pub fn sample_records() -> Vec<BakeryRecord> {
    THEMES
        .iter()
        .enumerate()
        .map(|(i, theme)| {
            BakeryRecord::new(format!("bakery-{i}"), format!("Bakery {i}"))
                .with_scores(Scores {
                    total: Some(70.0 + i as f64),
                    taste: Some(80.0),
                    price: None,
                    customer_service: Some(75.0),
                })
                .with_review(
                    Review::new(format!("Loved the {theme} vibe"))
                        .with_score(4.0)
                        .with_keywords(theme.split(' ')),
                )
        })
        .collect()
}
