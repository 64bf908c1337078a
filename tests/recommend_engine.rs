// tests/recommend_engine.rs
//
// All four strategies against one seeded marketplace. Aggregates are built
// the same way production builds them: every review goes through the store,
// which recomputes product stats on insert.

use chrono::Utc;
use feelya_engine::{
    Language, MemoryStore, Product, ProductId, Recommendation, RecommendationEngine, Review,
    Sentiment, Strategy, UserId, UserPreference,
};

fn review(user_id: Option<UserId>, product_id: ProductId, rating: f32, score: f32) -> Review {
    let sentiment = if score > 0.0 {
        Sentiment::Positive
    } else if score < 0.0 {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    };
    Review {
        id: 0,
        user_id,
        product_id,
        rating,
        text: "avis de test".to_string(),
        language: Language::Fr,
        sentiment,
        sentiment_score: score,
        confidence: 0.8,
        processed: true,
        created_at: Utc::now(),
    }
}

/// Marketplace with three active reviewers, one loner and one anonymous
/// burst. User 1 is the recommendation target.
async fn seeded_store() -> MemoryStore {
    let store = MemoryStore::new();
    for (id, name, category, price) in [
        (1, "Casque Atlas", "Audio", 349.0),
        (2, "Enceinte Rif", "Audio", 249.0),
        (3, "Clavier Fes", "Informatique", 149.0),
        (4, "Souris Sahara", "Informatique", 89.0),
        (5, "Tajine Pro", "Cuisine", 499.0),
        (6, "Blender Oasis", "Cuisine", 399.0),
    ] {
        store.insert_product(Product::new(id, name, category, price, "jumia"));
    }

    store.insert_preference(UserPreference {
        user_id: 1,
        category: "Audio".to_string(),
        preference_score: 1.0,
    });
    store.insert_preference(UserPreference {
        user_id: 1,
        category: "Cuisine".to_string(),
        preference_score: 0.4,
    });

    let reviews = [
        // target user
        review(Some(1), 1, 5.0, 0.9),
        // neighbor 2: overlaps on 1, likes 3 and 5, lukewarm on 6
        review(Some(2), 1, 4.5, 0.8),
        review(Some(2), 3, 5.0, 0.9),
        review(Some(2), 5, 4.0, 0.7),
        review(Some(2), 6, 3.0, -0.2),
        // neighbor 3: overlaps on 1, likes 3 and 2
        review(Some(3), 1, 4.0, 0.6),
        review(Some(3), 3, 4.0, 0.5),
        review(Some(3), 2, 4.5, 0.8),
        // loner 4: no overlap with user 1
        review(Some(4), 2, 2.0, -0.5),
        // anonymous praise keeps product 1 above the trending floor
        review(None, 1, 5.0, 0.9),
        review(None, 1, 4.0, 0.7),
    ];
    for r in reviews {
        store.submit(r).await.unwrap();
    }
    store
}

// --- Collaborative ---

#[tokio::test(flavor = "multi_thread")]
async fn collaborative_ranks_neighbor_means_with_stable_ties() {
    let store = seeded_store().await;
    let engine = RecommendationEngine::with_defaults();

    let rows = engine.collaborative(&store, 1, 10).await.unwrap();
    let ids: Vec<ProductId> = rows.iter().map(|r| r.product_id).collect();
    // Products 2 and 3 both average 4.5 from neighbors and tie; the lower
    // id wins. Product 6 never clears the 4.0 endorsement bar.
    assert_eq!(ids, vec![2, 3, 5]);
    assert!((rows[0].score - 4.5).abs() < 1e-6);
    assert!((rows[1].score - 4.5).abs() < 1e-6);
    assert!((rows[2].score - 4.0).abs() < 1e-6);
}

#[tokio::test(flavor = "multi_thread")]
async fn collaborative_works_from_any_seat() {
    let store = seeded_store().await;
    let engine = RecommendationEngine::with_defaults();

    // User 4 only rated product 2; user 3 is their sole neighbor.
    let rows = engine.collaborative(&store, 4, 10).await.unwrap();
    let ids: Vec<ProductId> = rows.iter().map(|r| r.product_id).collect();
    assert_eq!(ids, vec![1, 3]);
}

// --- Content-based ---

#[tokio::test(flavor = "multi_thread")]
async fn content_applies_gate_and_exclusions() {
    let store = seeded_store().await;
    let engine = RecommendationEngine::with_defaults();

    let rows = engine.content_based(&store, 1, 10).await.unwrap();
    let ids: Vec<ProductId> = rows.iter().map(|r| r.product_id).collect();
    // Product 1 is already reviewed, product 2's aggregate sentiment
    // (0.15) misses the 0.3 gate, product 6 is negative. Only the tajine
    // survives.
    assert_eq!(ids, vec![5]);
    assert!((rows[0].score - 0.7).abs() < 1e-5);
    assert_eq!(rows[0].reason, "Correspond à vos préférences (Cuisine)");
}

#[tokio::test(flavor = "multi_thread")]
async fn content_needs_positive_preferences() {
    let store = seeded_store().await;
    let engine = RecommendationEngine::with_defaults();
    assert!(engine.content_based(&store, 2, 10).await.unwrap().is_empty());
}

// --- Hybrid ---

#[tokio::test(flavor = "multi_thread")]
async fn hybrid_blends_scores_and_reports_provenance() {
    let store = seeded_store().await;
    let engine = RecommendationEngine::with_defaults();

    let rows = engine.hybrid(&store, 1, 10).await.unwrap();
    let ids: Vec<ProductId> = rows.iter().map(|r| r.product_id).collect();
    assert_eq!(ids, vec![2, 3, 5]);

    // Collaborative-only rows: 4.5 * 0.6 = 2.7.
    assert!((rows[0].score - 2.7).abs() < 1e-5);
    assert_eq!(rows[0].reason, "Recommandation hybride (collaboratif)");
    // The tajine appears on both sides: 4.0 * 0.6 + 0.7 * 0.4 = 2.68.
    assert!((rows[2].score - 2.68).abs() < 1e-5);
    assert_eq!(rows[2].reason, "Recommandation hybride (collaboratif + contenu)");
}

#[tokio::test(flavor = "multi_thread")]
async fn hybrid_respects_top_n_after_the_merge() {
    let store = seeded_store().await;
    let engine = RecommendationEngine::with_defaults();

    let rows = engine.hybrid(&store, 1, 2).await.unwrap();
    let ids: Vec<ProductId> = rows.iter().map(|r| r.product_id).collect();
    assert_eq!(ids, vec![2, 3]);
}

// --- Trending ---

#[tokio::test(flavor = "multi_thread")]
async fn trending_scores_only_products_above_the_floor() {
    let store = seeded_store().await;
    let engine = RecommendationEngine::with_defaults();

    let rows = engine.trending(&store, None, 10).await.unwrap();
    // Only product 1 reaches five reviews. Composite:
    // 0.5 * (0.78 + 1) / 2 + 0.3 * (5 / 100) + 0.2 * (4.5 / 5) = 0.64.
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].product_id, 1);
    assert!((rows[0].score - 0.64).abs() < 1e-5);
    assert_eq!(rows[0].reason, "5 avis positifs");
}

#[tokio::test(flavor = "multi_thread")]
async fn trending_category_filter() {
    let store = seeded_store().await;
    let engine = RecommendationEngine::with_defaults();
    assert!(engine
        .trending(&store, Some("Cuisine"), 10)
        .await
        .unwrap()
        .is_empty());
    assert_eq!(
        engine.trending(&store, Some("Audio"), 10).await.unwrap().len(),
        1
    );
}

// --- Cross-strategy properties ---

#[tokio::test(flavor = "multi_thread")]
async fn no_personalized_strategy_resurfaces_rated_products() {
    let store = seeded_store().await;
    let engine = RecommendationEngine::with_defaults();

    for rows in [
        engine.collaborative(&store, 1, 10).await.unwrap(),
        engine.content_based(&store, 1, 10).await.unwrap(),
        engine.hybrid(&store, 1, 10).await.unwrap(),
    ] {
        assert!(rows.iter().all(|r| r.product_id != 1));
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn every_strategy_emits_unique_ids_and_filled_rows() {
    let store = seeded_store().await;
    let engine = RecommendationEngine::with_defaults();

    for rows in [
        engine.collaborative(&store, 1, 10).await.unwrap(),
        engine.content_based(&store, 1, 10).await.unwrap(),
        engine.hybrid(&store, 1, 10).await.unwrap(),
        engine.trending(&store, None, 10).await.unwrap(),
    ] {
        let mut ids: Vec<ProductId> = rows.iter().map(|r| r.product_id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), rows.len());
        for row in &rows {
            assert!(row.score.is_finite());
            assert!(!row.reason.is_empty());
            assert!(!row.product_name.is_empty());
        }
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn ranked_rows_convert_into_persistable_recommendations() {
    let store = seeded_store().await;
    let engine = RecommendationEngine::with_defaults();

    let rows = engine.hybrid(&store, 1, 10).await.unwrap();
    let rec = Recommendation::from_ranked(1, &rows[0], Strategy::Hybrid);
    assert_eq!(rec.user_id, 1);
    assert_eq!(rec.product_id, rows[0].product_id);
    assert!((rec.score - rows[0].score).abs() < 1e-6);
    assert_eq!(rec.method.as_str(), "hybrid");
}
