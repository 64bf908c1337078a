// src/recommend/mod.rs
//! Product recommendation engine.
//!
//! Four strategies plus a blend, each a pure function of store data:
//! collaborative (neighbor ratings), content-based (category affinities with
//! a sentiment quality gate), hybrid (weighted merge of the first two) and
//! trending (volume/sentiment composite, user-independent). Every ranking
//! sorts score descending with product id as the final tie-break, so equal
//! scores come out in a stable order.

mod collaborative;
mod content;
mod hybrid;
mod trending;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::model::{Product, ProductId, UserId};
use crate::store::ReviewStore;

/// Strategy weights and floors. Defaults match the tuned production values;
/// a TOML file can override them at startup. No hot reload: hosts wanting
/// live tuning build a new engine.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RecommendConfig {
    /// Collaborative share of the hybrid blend.
    #[serde(default = "default_collab_weight")]
    pub collab_weight: f32,
    /// Content share of the hybrid blend.
    #[serde(default = "default_content_weight")]
    pub content_weight: f32,
    /// Content-based quality gate: aggregate sentiment must exceed this
    /// (strictly) for a product to be suggested.
    #[serde(default = "default_sentiment_gate")]
    pub sentiment_gate: f32,
    /// Minimum-evidence floor for trending (inclusive).
    #[serde(default = "default_trending_min_reviews")]
    pub trending_min_reviews: i64,
    #[serde(default = "default_trending_sentiment_weight")]
    pub trending_sentiment_weight: f32,
    #[serde(default = "default_trending_reviews_weight")]
    pub trending_reviews_weight: f32,
    #[serde(default = "default_trending_rating_weight")]
    pub trending_rating_weight: f32,
    /// Review count at which the trending volume term saturates.
    #[serde(default = "default_trending_volume_scale")]
    pub trending_volume_scale: f32,
    /// Result length when callers pass no explicit `top_n`.
    #[serde(default = "default_top_n")]
    pub default_top_n: usize,
}

fn default_collab_weight() -> f32 {
    0.6
}
fn default_content_weight() -> f32 {
    0.4
}
fn default_sentiment_gate() -> f32 {
    0.3
}
fn default_trending_min_reviews() -> i64 {
    5
}
fn default_trending_sentiment_weight() -> f32 {
    0.5
}
fn default_trending_reviews_weight() -> f32 {
    0.3
}
fn default_trending_rating_weight() -> f32 {
    0.2
}
fn default_trending_volume_scale() -> f32 {
    100.0
}
fn default_top_n() -> usize {
    10
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self {
            collab_weight: default_collab_weight(),
            content_weight: default_content_weight(),
            sentiment_gate: default_sentiment_gate(),
            trending_min_reviews: default_trending_min_reviews(),
            trending_sentiment_weight: default_trending_sentiment_weight(),
            trending_reviews_weight: default_trending_reviews_weight(),
            trending_rating_weight: default_trending_rating_weight(),
            trending_volume_scale: default_trending_volume_scale(),
            default_top_n: default_top_n(),
        }
    }
}

impl RecommendConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading recommend config {}", path.display()))?;
        let mut cfg: Self = toml::from_str(&raw)
            .with_context(|| format!("parsing recommend config {}", path.display()))?;
        cfg.sanitize();
        Ok(cfg)
    }

    /// Clamp weights into [0, 1] and floors into sane ranges.
    pub(crate) fn sanitize(&mut self) {
        self.collab_weight = self.collab_weight.clamp(0.0, 1.0);
        self.content_weight = self.content_weight.clamp(0.0, 1.0);
        self.sentiment_gate = self.sentiment_gate.clamp(-1.0, 1.0);
        self.trending_min_reviews = self.trending_min_reviews.max(0);
        self.trending_sentiment_weight = self.trending_sentiment_weight.clamp(0.0, 1.0);
        self.trending_reviews_weight = self.trending_reviews_weight.clamp(0.0, 1.0);
        self.trending_rating_weight = self.trending_rating_weight.clamp(0.0, 1.0);
        if self.trending_volume_scale <= 0.0 {
            self.trending_volume_scale = default_trending_volume_scale();
        }
        if self.default_top_n == 0 {
            self.default_top_n = default_top_n();
        }
    }
}

/// One ranked output row. The shape is identical across strategies so hosts
/// can persist or render rows uniformly; provenance lives in `reason`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedProduct {
    pub product_id: ProductId,
    pub product_name: String,
    pub score: f32,
    /// Human-readable French explanation shown next to the suggestion.
    pub reason: String,
    pub sentiment_score: f32,
    pub total_reviews: i64,
}

impl RankedProduct {
    fn from_product(product: &Product, score: f32, reason: String) -> Self {
        Self {
            product_id: product.id,
            product_name: product.name.clone(),
            score,
            reason,
            sentiment_score: product.stats.sentiment_score,
            total_reviews: product.stats.total_reviews,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecommendationEngine {
    config: RecommendConfig,
}

impl RecommendationEngine {
    pub fn new(config: RecommendConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(RecommendConfig::default())
    }

    pub fn config(&self) -> &RecommendConfig {
        &self.config
    }

    /// Products liked by users whose rating history overlaps the target
    /// user's. Empty when the user has no reviews yet.
    pub async fn collaborative(
        &self,
        store: &dyn ReviewStore,
        user_id: UserId,
        top_n: usize,
    ) -> Result<Vec<RankedProduct>> {
        collaborative::rank(store, user_id, top_n).await
    }

    /// Well-reviewed products from the user's preferred categories. Empty
    /// when the user declared no positive preference.
    pub async fn content_based(
        &self,
        store: &dyn ReviewStore,
        user_id: UserId,
        top_n: usize,
    ) -> Result<Vec<RankedProduct>> {
        content::rank(store, user_id, top_n, self.config.sentiment_gate).await
    }

    /// Weighted merge of collaborative and content-based results.
    pub async fn hybrid(
        &self,
        store: &dyn ReviewStore,
        user_id: UserId,
        top_n: usize,
    ) -> Result<Vec<RankedProduct>> {
        hybrid::rank(store, user_id, top_n, &self.config).await
    }

    /// Non-personalized ranking over products with enough review evidence,
    /// optionally narrowed to one category.
    pub async fn trending(
        &self,
        store: &dyn ReviewStore,
        category: Option<&str>,
        top_n: usize,
    ) -> Result<Vec<RankedProduct>> {
        trending::rank(store, category, top_n, &self.config).await
    }
}

/// Score descending, product id ascending on ties.
fn sort_rows_desc(rows: &mut [RankedProduct]) {
    rows.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.product_id.cmp(&b.product_id))
    });
}

/// Same ordering for bare (id, score) pairs.
fn sort_pairs_desc(pairs: &mut [(ProductId, f32)]) {
    pairs.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.0.cmp(&b.0))
    });
}
