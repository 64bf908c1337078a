// src/recommend/content.rs
//! Category-affinity ranking: products from categories the user marked as
//! preferred, filtered through an aggregate-sentiment quality gate so a
//! matching category alone never surfaces a badly-reviewed product.

use anyhow::Result;
use std::collections::HashSet;

use super::RankedProduct;
use crate::model::{ProductId, UserId};
use crate::store::{ProductOrder, ProductQuery, ReviewQuery, ReviewStore};

pub(super) async fn rank(
    store: &dyn ReviewStore,
    user_id: UserId,
    top_n: usize,
    sentiment_gate: f32,
) -> Result<Vec<RankedProduct>> {
    // 1) categories with a positive affinity; nothing declared, nothing ranked
    let preferences = store.preferences(user_id).await?;
    let preferred: Vec<String> = preferences
        .iter()
        .filter(|p| p.preference_score > 0.0)
        .map(|p| p.category.clone())
        .collect();
    if preferred.is_empty() {
        return Ok(Vec::new());
    }

    // 2) products the user already reviewed are never re-suggested
    let seen: HashSet<ProductId> = store
        .reviews(&ReviewQuery::by_user(user_id))
        .await?
        .iter()
        .map(|r| r.product_id)
        .collect();

    // 3) candidates ordered by aggregate sentiment, then review volume
    let candidates = store
        .products(&ProductQuery::in_categories(preferred).ordered(ProductOrder::SentimentDesc))
        .await?;

    let rows = candidates
        .iter()
        .filter(|p| !seen.contains(&p.id))
        .filter(|p| p.stats.sentiment_score > sentiment_gate)
        .take(top_n)
        .map(|p| {
            RankedProduct::from_product(
                p,
                p.stats.sentiment_score,
                format!("Correspond à vos préférences ({})", p.category),
            )
        })
        .collect();
    Ok(rows)
}
