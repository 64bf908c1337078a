// src/model.rs
//! Domain records shared across the pipeline: reviews, products, users,
//! preferences and the recommendation projections derived from them.
//!
//! Wire labels stay French (`Positif` / `Neutre` / `Négatif`) because the
//! dashboard and the historical data both speak that dialect.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::recommend::RankedProduct;
use crate::stats::ProductStats;

pub type UserId = i64;
pub type ProductId = i64;
pub type ReviewId = i64;

/// Detected review language. `Darija` is Moroccan colloquial Arabic written
/// in Arabic script; `Unknown` means the text had no word characters at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Fr,
    Ar,
    Darija,
    Unknown,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Fr => "fr",
            Language::Ar => "ar",
            Language::Darija => "darija",
            Language::Unknown => "unknown",
        }
    }

    /// True for languages written in Arabic script.
    pub fn is_arabic_script(&self) -> bool {
        matches!(self, Language::Ar | Language::Darija)
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Three-way sentiment label. Serialized with the French labels the
/// frontend renders as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sentiment {
    #[serde(rename = "Positif")]
    Positive,
    #[serde(rename = "Neutre")]
    Neutral,
    #[serde(rename = "Négatif")]
    Negative,
}

impl Sentiment {
    pub fn label(&self) -> &'static str {
        match self {
            Sentiment::Positive => "Positif",
            Sentiment::Neutral => "Neutre",
            Sentiment::Negative => "Négatif",
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Incoming review as submitted, before scoring. Ids and timestamps are
/// assigned by the store, the sentiment fields by the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    pub product_id: ProductId,
    pub rating: f32,
    pub text: String,
}

/// One submitted review, immutably scored at creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    /// None for anonymous/scraped reviews.
    pub user_id: Option<UserId>,
    pub product_id: ProductId,
    pub rating: f32,
    /// Raw text as submitted; the cleaned form is not persisted.
    pub text: String,
    pub language: Language,
    pub sentiment: Sentiment,
    pub sentiment_score: f32,
    pub confidence: f32,
    pub processed: bool,
    pub created_at: DateTime<Utc>,
}

/// A catalogued product and its review-derived aggregates.
///
/// The aggregate block is flattened so the serialized shape matches the flat
/// row the dashboard consumes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Source marketplace, e.g. "jumia" or "hmizate".
    pub platform: String,
    #[serde(flatten)]
    pub stats: ProductStats,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Fresh catalogue entry with zeroed aggregates.
    pub fn new(id: ProductId, name: &str, category: &str, price: f64, platform: &str) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: name.to_string(),
            category: category.to_string(),
            description: None,
            price,
            url: None,
            platform: platform.to_string(),
            stats: ProductStats::default(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(id: UserId, username: &str) -> Self {
        Self {
            id,
            username: username.to_string(),
            created_at: Utc::now(),
        }
    }
}

/// Explicit category affinity. Scores above zero mark the category as
/// preferred for content-based filtering; zero or below disables it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPreference {
    pub user_id: UserId,
    pub category: String,
    pub preference_score: f32,
}

/// Which ranking produced a recommendation row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Collaborative,
    ContentBased,
    Hybrid,
    Trending,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Collaborative => "collaborative",
            Strategy::ContentBased => "content_based",
            Strategy::Hybrid => "hybrid",
            Strategy::Trending => "trending",
        }
    }
}

/// Persisted projection of one engine output row. Derived data only; the
/// store of record is always the review/product tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub user_id: UserId,
    pub product_id: ProductId,
    pub score: f32,
    pub method: Strategy,
    pub created_at: DateTime<Utc>,
}

impl Recommendation {
    pub fn from_ranked(user_id: UserId, row: &RankedProduct, method: Strategy) -> Self {
        Self {
            user_id,
            product_id: row.product_id,
            score: row.score,
            method,
            created_at: Utc::now(),
        }
    }
}
