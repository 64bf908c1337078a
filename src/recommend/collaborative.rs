// src/recommend/collaborative.rs
//! Neighbor-based ranking: users who rated the same products as the target
//! user vouch, through their own high ratings, for products the target has
//! not seen yet.

use anyhow::Result;
use std::collections::{HashMap, HashSet};

use super::{sort_pairs_desc, RankedProduct};
use crate::model::{ProductId, UserId};
use crate::store::{ProductQuery, ReviewQuery, ReviewStore};

/// A neighbor's review counts as an endorsement from this rating up.
const LIKE_THRESHOLD: f32 = 4.0;

const REASON: &str = "Apprécié par des utilisateurs aux goûts similaires";

pub(super) async fn rank(
    store: &dyn ReviewStore,
    user_id: UserId,
    top_n: usize,
) -> Result<Vec<RankedProduct>> {
    // 1) the target user's own history; no history means no neighbors
    let own = store.reviews(&ReviewQuery::by_user(user_id)).await?;
    if own.is_empty() {
        return Ok(Vec::new());
    }
    let rated: HashSet<ProductId> = own.iter().map(|r| r.product_id).collect();

    // 2) neighbors: anyone else with a review on one of those products;
    //    anonymous reviews carry no user and can never make a neighbor
    let overlapping = store
        .reviews(&ReviewQuery::for_products(rated.iter().copied().collect()))
        .await?;
    let neighbors: HashSet<UserId> = overlapping
        .iter()
        .filter_map(|r| r.user_id)
        .filter(|id| *id != user_id)
        .collect();

    // 3) pool every product a neighbor liked outside the user's history
    let mut pooled: HashMap<ProductId, (f32, u32)> = HashMap::new();
    for neighbor in &neighbors {
        let liked = store
            .reviews(&ReviewQuery::by_user(*neighbor).min_rating(LIKE_THRESHOLD))
            .await?;
        for review in liked {
            if rated.contains(&review.product_id) {
                continue;
            }
            let slot = pooled.entry(review.product_id).or_insert((0.0, 0));
            slot.0 += review.rating;
            slot.1 += 1;
        }
    }
    if pooled.is_empty() {
        return Ok(Vec::new());
    }

    // 4) candidate score is the mean neighbor rating
    let mut scored: Vec<(ProductId, f32)> = pooled
        .into_iter()
        .map(|(id, (sum, count))| (id, sum / count as f32))
        .collect();
    sort_pairs_desc(&mut scored);
    scored.truncate(top_n);

    // 5) resolve product rows; ids with no product row are dropped
    let ids: Vec<ProductId> = scored.iter().map(|(id, _)| *id).collect();
    let products = store.products(&ProductQuery::by_ids(ids)).await?;
    let by_id: HashMap<ProductId, _> = products.iter().map(|p| (p.id, p)).collect();

    let rows = scored
        .iter()
        .filter_map(|(id, score)| {
            by_id
                .get(id)
                .map(|p| RankedProduct::from_product(p, *score, REASON.to_string()))
        })
        .collect();
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Language, Product, Review, Sentiment};
    use crate::store::MemoryStore;

    async fn seed(store: &MemoryStore) {
        for id in 1..=5 {
            store.insert_product(Product::new(id, &format!("Produit {id}"), "Audio", 199.0, "jumia"));
        }
        // Target user 1 rated products 1 and 2.
        submit(store, Some(1), 1, 5.0).await;
        submit(store, Some(1), 2, 4.0).await;
        // User 2 overlaps on product 1 and liked 3 and 4; 5 fell short.
        submit(store, Some(2), 1, 4.5).await;
        submit(store, Some(2), 3, 5.0).await;
        submit(store, Some(2), 4, 4.0).await;
        submit(store, Some(2), 5, 3.0).await;
        // User 3 overlaps on product 2 and liked 3.
        submit(store, Some(3), 2, 4.0).await;
        submit(store, Some(3), 3, 4.0).await;
        // Anonymous praise overlaps on product 1 but names no user.
        submit(store, None, 1, 5.0).await;
    }

    async fn submit(store: &MemoryStore, user_id: Option<UserId>, product_id: ProductId, rating: f32) {
        let review = Review {
            id: 0,
            user_id,
            product_id,
            rating,
            text: "bon produit".to_string(),
            language: Language::Fr,
            sentiment: Sentiment::Positive,
            sentiment_score: 0.5,
            confidence: 0.8,
            processed: true,
            created_at: chrono::Utc::now(),
        };
        store.submit(review).await.unwrap();
    }

    #[tokio::test]
    async fn ranks_by_mean_neighbor_rating() {
        let store = MemoryStore::new();
        seed(&store).await;

        let rows = rank(&store, 1, 10).await.unwrap();
        let ids: Vec<ProductId> = rows.iter().map(|r| r.product_id).collect();
        // Product 3 averages (5.0 + 4.0) / 2, product 4 gets 4.0 from one
        // neighbor, product 5 never clears the like threshold.
        assert_eq!(ids, vec![3, 4]);
        assert!((rows[0].score - 4.5).abs() < 1e-6);
        assert!((rows[1].score - 4.0).abs() < 1e-6);
        assert_eq!(rows[0].reason, REASON);
    }

    #[tokio::test]
    async fn excludes_products_the_user_already_rated() {
        let store = MemoryStore::new();
        seed(&store).await;

        let rows = rank(&store, 1, 10).await.unwrap();
        // User 2 liked product 1 too, but user 1 already rated it.
        assert!(rows.iter().all(|r| r.product_id != 1 && r.product_id != 2));
    }

    #[tokio::test]
    async fn truncates_to_top_n() {
        let store = MemoryStore::new();
        seed(&store).await;

        let rows = rank(&store, 1, 1).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].product_id, 3);
    }

    #[tokio::test]
    async fn user_without_history_gets_nothing() {
        let store = MemoryStore::new();
        seed(&store).await;

        let rows = rank(&store, 99, 10).await.unwrap();
        assert!(rows.is_empty());
    }
}
