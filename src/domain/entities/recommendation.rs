use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use uuid::Uuid;

use super::bakery::Scores;
use super::retrieval::RetrievedDocument;
use crate::domain::DomainError;

/// A retrieved bakery that was offered to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub rank: usize,
    pub source_id: String,
    pub title: String,
    pub score: f32,
}

impl From<&RetrievedDocument> for Candidate {
    fn from(doc: &RetrievedDocument) -> Self {
        Self {
            rank: doc.rank,
            source_id: doc.document.metadata.source_id.clone(),
            title: doc.document.metadata.title.clone(),
            score: doc.score,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedBakery {
    pub title: String,
    pub scores: Scores,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: Uuid,
    pub query: String,
    pub text: String,
    pub explanation: Option<String>,
    pub bakeries: Vec<RecommendedBakery>,
    pub parse_error: Option<String>,
    pub candidates: Vec<Candidate>,
    pub created_at: DateTime<Utc>,
}

impl Recommendation {
    pub fn new(query: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            query: query.into(),
            text: text.into(),
            explanation: None,
            bakeries: Vec::new(),
            parse_error: None,
            candidates: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }

    pub fn with_candidates(mut self, candidates: Vec<Candidate>) -> Self {
        self.candidates = candidates;
        self
    }

    /// Fills `bakeries` from the model text, recording a parse failure instead of failing.
    pub fn parsed(mut self) -> Self {
        match parse_recommendations(&self.text) {
            Ok(bakeries) => self.bakeries = bakeries,
            Err(e) => self.parse_error = Some(e.to_string()),
        }
        self
    }
}

static SCORE_PAIR: LazyLock<Regex> = LazyLock::new(|| {
    // Labels may come wrapped in markdown bold: `**Total:** 90`, `**Taste**: 95`.
    Regex::new(
        r"(?i)\**(total|taste|price|customer\s*service)(?:\s+score)?\**\s*[:：]\s*\**\s*(n/a|\d+(?:\.\d+)?)",
    )
    .expect("score pattern is valid")
});

static LIST_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[-*•#]+|\d+[.)])\s*").expect("list marker pattern is valid")
});

static TITLE_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:title|name|bakery)\s*[:：]\s*").expect("title label pattern is valid")
});

/// Parses model output of the form
///
/// ```text
/// Sunrise Bakery
/// total: 90, taste: 95, price: 80, customer service: 85
/// ```
///
/// Title and scores may also share a line. Titles that are never followed by
/// scores are dropped, so preambles like "Here are my picks:" do not leak
/// into the result.
pub fn parse_recommendations(text: &str) -> Result<Vec<RecommendedBakery>, DomainError> {
    let mut bakeries = Vec::new();
    let mut pending_title: Option<String> = None;

    for line in text.lines().map(clean_line).filter(|l| !l.is_empty()) {
        let Some(first) = SCORE_PAIR.find(&line) else {
            pending_title = Some(line);
            continue;
        };

        let scores = parse_scores(&line);
        let inline_title = clean_line(
            line[..first.start()].trim_end_matches(|c: char| {
                c.is_whitespace() || matches!(c, '-' | '|' | ':' | ',' | '(' | '—' | '/' | '*')
            }),
        );

        let title = if inline_title.is_empty() {
            pending_title.take()
        } else {
            pending_title = None;
            Some(inline_title)
        };

        if let Some(title) = title {
            bakeries.push(RecommendedBakery { title, scores });
        }
    }

    if bakeries.is_empty() {
        return Err(DomainError::parse(
            "no bakery title followed by a scores line",
        ));
    }

    Ok(bakeries)
}

fn clean_line(line: &str) -> String {
    let line = LIST_MARKER.replace(line.trim(), "");
    let line = line.trim().trim_matches('*').trim();
    TITLE_LABEL.replace(line, "").trim().to_string()
}

fn parse_scores(line: &str) -> Scores {
    let mut scores = Scores::default();
    for caps in SCORE_PAIR.captures_iter(line) {
        let value = caps[2].parse::<f64>().ok();
        let key = caps[1].to_lowercase();
        match key.split_whitespace().next() {
            Some("total") => scores.total = value,
            Some("taste") => scores.taste = value,
            Some("price") => scores.price = value,
            Some(_) => scores.customer_service = value,
            None => {}
        }
    }
    scores
}
