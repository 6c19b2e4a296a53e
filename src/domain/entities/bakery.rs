use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::DomainError;

/// A crawled bakery as stored in the record store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BakeryRecord {
    #[serde(alias = "_id", default, deserialize_with = "lenient_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub scores: Scores,
    #[serde(default)]
    pub reviews: Vec<Review>,
}

impl BakeryRecord {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            scores: Scores::default(),
            reviews: Vec::new(),
        }
    }

    pub fn with_scores(mut self, scores: Scores) -> Self {
        self.scores = scores;
        self
    }

    pub fn with_review(mut self, review: Review) -> Self {
        self.reviews.push(review);
        self
    }

    /// Records must carry an id and a non-blank title before they are indexed.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.id.trim().is_empty() {
            return Err(DomainError::validation("bakery record has no id"));
        }
        if self.title.trim().is_empty() {
            return Err(DomainError::validation(format!(
                "bakery record {} has no title",
                self.id
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Scores {
    #[serde(rename = "total_score", default, deserialize_with = "lenient_score")]
    pub total: Option<f64>,
    #[serde(rename = "taste_score", default, deserialize_with = "lenient_score")]
    pub taste: Option<f64>,
    #[serde(rename = "price_score", default, deserialize_with = "lenient_score")]
    pub price: Option<f64>,
    #[serde(rename = "cs_score", default, deserialize_with = "lenient_score")]
    pub customer_service: Option<f64>,
}

impl Scores {
    pub fn is_empty(&self) -> bool {
        self.total.is_none()
            && self.taste.is_none()
            && self.price.is_none()
            && self.customer_service.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Review {
    #[serde(default)]
    pub content: String,
    #[serde(default, deserialize_with = "lenient_score")]
    pub score: Option<f64>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl Review {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            score: None,
            keywords: Vec::new(),
        }
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawScore {
    Number(f64),
    Text(String),
}

// Crawled scores arrive as numbers, numeric strings or "N/A".
fn lenient_score<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<RawScore>::deserialize(deserializer)? {
        Some(RawScore::Number(n)) if n.is_finite() => Some(n),
        Some(RawScore::Text(s)) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(i64),
    ObjectId {
        #[serde(rename = "$oid")]
        oid: String,
    },
}

fn lenient_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<RawId>::deserialize(deserializer)? {
        Some(RawId::Text(s)) => s,
        Some(RawId::Number(n)) => n.to_string(),
        Some(RawId::ObjectId { oid }) => oid,
        None => String::new(),
    })
}
