// src/store/mod.rs
//! External store contract.
//!
//! The engine never talks to a database directly; it consumes this trait.
//! Filters are conjunctive and a `None` field means "no constraint", so the
//! default query selects everything. `MemoryStore` is the in-process
//! reference implementation used by tests and the demo binary.

pub mod memory;

pub use memory::MemoryStore;

use anyhow::Result;
use async_trait::async_trait;

use crate::model::{Product, ProductId, Review, UserId, UserPreference};
use crate::stats::ProductStats;

/// Review filter. All present fields must hold at once.
#[derive(Debug, Clone, Default)]
pub struct ReviewQuery {
    pub user_id: Option<UserId>,
    pub product_ids: Option<Vec<ProductId>>,
    /// Inclusive lower bound on the star rating.
    pub min_rating: Option<f32>,
}

impl ReviewQuery {
    pub fn by_user(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
            ..Self::default()
        }
    }

    pub fn for_products(product_ids: Vec<ProductId>) -> Self {
        Self {
            product_ids: Some(product_ids),
            ..Self::default()
        }
    }

    pub fn min_rating(mut self, rating: f32) -> Self {
        self.min_rating = Some(rating);
        self
    }
}

/// Orderings the store must be able to apply server-side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductOrder {
    /// Aggregate sentiment descending; review count breaks ties.
    SentimentDesc,
    RatingDesc,
    ReviewsDesc,
}

/// Product filter. All present fields must hold at once.
#[derive(Debug, Clone, Default)]
pub struct ProductQuery {
    pub ids: Option<Vec<ProductId>>,
    pub categories: Option<Vec<String>>,
    /// Inclusive lower bound on the aggregate sentiment score.
    pub min_sentiment: Option<f32>,
    /// Inclusive lower bound on the review count.
    pub min_reviews: Option<i64>,
    pub order: Option<ProductOrder>,
}

impl ProductQuery {
    pub fn by_ids(ids: Vec<ProductId>) -> Self {
        Self {
            ids: Some(ids),
            ..Self::default()
        }
    }

    pub fn in_categories(categories: Vec<String>) -> Self {
        Self {
            categories: Some(categories),
            ..Self::default()
        }
    }

    pub fn with_min_sentiment(mut self, min_sentiment: f32) -> Self {
        self.min_sentiment = Some(min_sentiment);
        self
    }

    pub fn with_min_reviews(mut self, min_reviews: i64) -> Self {
        self.min_reviews = Some(min_reviews);
        self
    }

    pub fn ordered(mut self, order: ProductOrder) -> Self {
        self.order = Some(order);
        self
    }
}

/// The four capabilities the engine needs from persistence.
#[async_trait]
pub trait ReviewStore: Send + Sync {
    async fn reviews(&self, query: &ReviewQuery) -> Result<Vec<Review>>;

    async fn products(&self, query: &ProductQuery) -> Result<Vec<Product>>;

    async fn preferences(&self, user_id: UserId) -> Result<Vec<UserPreference>>;

    /// Recompute one product's aggregates from its full review set and
    /// persist them. The read-recompute-write sequence must be serialized
    /// per product; partially committed aggregates are a contract breach.
    async fn refresh_product_stats(&self, product_id: ProductId) -> Result<ProductStats>;
}
