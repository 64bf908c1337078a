// src/stats.rs
//! Review-derived aggregates.
//!
//! `ProductStats` is always a full recompute over the product's current
//! review set. Incremental patching is deliberately not offered; the counts
//! must satisfy `positive + neutral + negative == total` after every write,
//! and a recompute makes that hold by construction.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::model::{Product, Review, Sentiment};
use crate::store::{ProductQuery, ReviewQuery, ReviewStore};

/// Aggregate block carried by every product row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductStats {
    pub total_reviews: i64,
    pub positive_reviews: i64,
    pub neutral_reviews: i64,
    pub negative_reviews: i64,
    pub avg_rating: f32,
    /// Mean review sentiment score, in [-1, 1].
    pub sentiment_score: f32,
}

impl ProductStats {
    /// Recompute every aggregate from scratch. Empty input yields all zeros.
    pub fn from_reviews(reviews: &[Review]) -> Self {
        if reviews.is_empty() {
            return Self::default();
        }
        let mut stats = Self {
            total_reviews: reviews.len() as i64,
            ..Self::default()
        };
        let mut rating_sum = 0.0f32;
        let mut sentiment_sum = 0.0f32;
        for r in reviews {
            match r.sentiment {
                Sentiment::Positive => stats.positive_reviews += 1,
                Sentiment::Neutral => stats.neutral_reviews += 1,
                Sentiment::Negative => stats.negative_reviews += 1,
            }
            rating_sum += r.rating;
            sentiment_sum += r.sentiment_score;
        }
        stats.avg_rating = rating_sum / reviews.len() as f32;
        stats.sentiment_score = sentiment_sum / reviews.len() as f32;
        stats
    }
}

/// Corpus-wide numbers for the dashboard landing view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub total_reviews: i64,
    pub total_products: i64,
    pub positive_reviews: i64,
    pub neutral_reviews: i64,
    pub negative_reviews: i64,
    pub avg_rating: f32,
    pub avg_sentiment: f32,
    pub sentiment_distribution: SentimentDistribution,
    pub top_categories: Vec<CategoryCount>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentDistribution {
    pub positive_percentage: f32,
    pub neutral_percentage: f32,
    pub negative_percentage: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: i64,
}

/// How many categories the dashboard lists.
const TOP_CATEGORIES: usize = 5;

/// Fetch everything and fold it into one snapshot.
pub async fn dashboard(store: &dyn ReviewStore) -> Result<DashboardSnapshot> {
    let reviews = store.reviews(&ReviewQuery::default()).await?;
    let products = store.products(&ProductQuery::default()).await?;
    Ok(snapshot_from(&reviews, &products))
}

/// Pure fold behind [`dashboard`], split out so tests can feed it directly.
pub fn snapshot_from(reviews: &[Review], products: &[Product]) -> DashboardSnapshot {
    let total = reviews.len() as i64;
    let mut positive = 0i64;
    let mut neutral = 0i64;
    let mut negative = 0i64;
    let mut rating_sum = 0.0f32;
    let mut sentiment_sum = 0.0f32;
    for r in reviews {
        match r.sentiment {
            Sentiment::Positive => positive += 1,
            Sentiment::Neutral => neutral += 1,
            Sentiment::Negative => negative += 1,
        }
        rating_sum += r.rating;
        sentiment_sum += r.sentiment_score;
    }
    let (avg_rating, avg_sentiment) = if total > 0 {
        (rating_sum / total as f32, sentiment_sum / total as f32)
    } else {
        (0.0, 0.0)
    };

    let pct = |n: i64| {
        if total > 0 {
            round1(n as f32 / total as f32 * 100.0)
        } else {
            0.0
        }
    };

    let mut by_category: HashMap<&str, i64> = HashMap::new();
    for p in products {
        *by_category.entry(p.category.as_str()).or_insert(0) += 1;
    }
    let mut top: Vec<CategoryCount> = by_category
        .into_iter()
        .map(|(category, count)| CategoryCount {
            category: category.to_string(),
            count,
        })
        .collect();
    // Count descending, name ascending on ties, so the listing is stable.
    top.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.category.cmp(&b.category)));
    top.truncate(TOP_CATEGORIES);

    DashboardSnapshot {
        total_reviews: total,
        total_products: products.len() as i64,
        positive_reviews: positive,
        neutral_reviews: neutral,
        negative_reviews: negative,
        avg_rating: round2(avg_rating),
        avg_sentiment: round2(avg_sentiment),
        sentiment_distribution: SentimentDistribution {
            positive_percentage: pct(positive),
            neutral_percentage: pct(neutral),
            negative_percentage: pct(negative),
        },
        top_categories: top,
    }
}

fn round1(x: f32) -> f32 {
    (x * 10.0).round() / 10.0
}

fn round2(x: f32) -> f32 {
    (x * 100.0).round() / 100.0
}
