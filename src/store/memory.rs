// src/store/memory.rs
//! In-process reference store.
//!
//! A single mutex guards the whole state, which trivially satisfies the
//! per-product serialization the contract asks for: `submit` persists the
//! review and recomputes the product's aggregates under one guard, so no
//! reader ever observes a half-committed write.

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Utc;

use super::{ProductOrder, ProductQuery, ReviewQuery, ReviewStore};
use crate::model::{Product, ProductId, Review, ReviewId, UserId, UserPreference};
use crate::stats::ProductStats;

#[derive(Debug, Default)]
struct State {
    products: HashMap<ProductId, Product>,
    reviews: Vec<Review>,
    preferences: Vec<UserPreference>,
    next_review_id: ReviewId,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                next_review_id: 1,
                ..State::default()
            }),
        }
    }

    pub fn insert_product(&self, product: Product) {
        let mut state = self.state.lock().expect("memory store poisoned");
        state.products.insert(product.id, product);
    }

    pub fn insert_preference(&self, preference: UserPreference) {
        let mut state = self.state.lock().expect("memory store poisoned");
        state.preferences.push(preference);
    }

    /// Persist a scored review and refresh the product's aggregates in one
    /// step. The store owns review ids; whatever id the caller put on the
    /// record is replaced.
    pub async fn submit(&self, mut review: Review) -> Result<Review> {
        let mut state = self.state.lock().expect("memory store poisoned");
        if !state.products.contains_key(&review.product_id) {
            return Err(anyhow!("unknown product {}", review.product_id));
        }
        review.id = state.next_review_id;
        state.next_review_id += 1;
        state.reviews.push(review.clone());
        recompute_locked(&mut state, review.product_id)?;
        Ok(review)
    }

    pub fn review_count(&self) -> usize {
        self.state.lock().expect("memory store poisoned").reviews.len()
    }
}

/// Full recompute of one product's aggregate block. Caller holds the lock.
fn recompute_locked(state: &mut State, product_id: ProductId) -> Result<ProductStats> {
    let product_reviews: Vec<Review> = state
        .reviews
        .iter()
        .filter(|r| r.product_id == product_id)
        .cloned()
        .collect();
    let stats = ProductStats::from_reviews(&product_reviews);

    let product = state
        .products
        .get_mut(&product_id)
        .ok_or_else(|| anyhow!("unknown product {product_id}"))?;
    product.stats = stats;
    product.updated_at = Utc::now();
    Ok(stats)
}

#[async_trait]
impl ReviewStore for MemoryStore {
    async fn reviews(&self, query: &ReviewQuery) -> Result<Vec<Review>> {
        let state = self.state.lock().expect("memory store poisoned");
        let out = state
            .reviews
            .iter()
            .filter(|r| {
                query.user_id.map_or(true, |u| r.user_id == Some(u))
                    && query
                        .product_ids
                        .as_ref()
                        .map_or(true, |ids| ids.contains(&r.product_id))
                    && query.min_rating.map_or(true, |min| r.rating >= min)
            })
            .cloned()
            .collect();
        Ok(out)
    }

    async fn products(&self, query: &ProductQuery) -> Result<Vec<Product>> {
        let state = self.state.lock().expect("memory store poisoned");
        let mut out: Vec<Product> = state
            .products
            .values()
            .filter(|p| {
                query.ids.as_ref().map_or(true, |ids| ids.contains(&p.id))
                    && query
                        .categories
                        .as_ref()
                        .map_or(true, |cats| cats.iter().any(|c| c == &p.category))
                    && query
                        .min_sentiment
                        .map_or(true, |min| p.stats.sentiment_score >= min)
                    && query
                        .min_reviews
                        .map_or(true, |min| p.stats.total_reviews >= min)
            })
            .cloned()
            .collect();

        if let Some(order) = query.order {
            out.sort_by(|a, b| {
                let primary = match order {
                    ProductOrder::SentimentDesc => b
                        .stats
                        .sentiment_score
                        .partial_cmp(&a.stats.sentiment_score)
                        .unwrap_or(std::cmp::Ordering::Equal)
                        .then(b.stats.total_reviews.cmp(&a.stats.total_reviews)),
                    ProductOrder::RatingDesc => b
                        .stats
                        .avg_rating
                        .partial_cmp(&a.stats.avg_rating)
                        .unwrap_or(std::cmp::Ordering::Equal),
                    ProductOrder::ReviewsDesc => b.stats.total_reviews.cmp(&a.stats.total_reviews),
                };
                // Stable listing regardless of insertion order.
                primary.then(a.id.cmp(&b.id))
            });
        } else {
            out.sort_by_key(|p| p.id);
        }
        Ok(out)
    }

    async fn preferences(&self, user_id: UserId) -> Result<Vec<UserPreference>> {
        let state = self.state.lock().expect("memory store poisoned");
        Ok(state
            .preferences
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn refresh_product_stats(&self, product_id: ProductId) -> Result<ProductStats> {
        let mut state = self.state.lock().expect("memory store poisoned");
        recompute_locked(&mut state, product_id)
    }
}
