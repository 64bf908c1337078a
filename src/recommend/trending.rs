// src/recommend/trending.rs
//! Non-personalized ranking. A product trends on a composite of aggregate
//! sentiment, review volume and average rating; products below the review
//! floor carry too little evidence and are skipped entirely.

use anyhow::Result;

use super::{sort_rows_desc, RankedProduct, RecommendConfig};
use crate::store::{ProductQuery, ReviewStore};

pub(super) async fn rank(
    store: &dyn ReviewStore,
    category: Option<&str>,
    top_n: usize,
    cfg: &RecommendConfig,
) -> Result<Vec<RankedProduct>> {
    // 1) evidence pool, optionally narrowed to one category
    let mut query = ProductQuery::default().with_min_reviews(cfg.trending_min_reviews);
    if let Some(cat) = category {
        query.categories = Some(vec![cat.to_string()]);
    }
    let candidates = store.products(&query).await?;

    // 2) composite score per product, each term normalized to [0, 1]
    let mut rows: Vec<RankedProduct> = candidates
        .iter()
        .map(|p| {
            let sentiment_part = (p.stats.sentiment_score + 1.0) / 2.0;
            let volume_part = (p.stats.total_reviews as f32 / cfg.trending_volume_scale).min(1.0);
            let rating_part = p.stats.avg_rating / 5.0;
            let score = cfg.trending_sentiment_weight * sentiment_part
                + cfg.trending_reviews_weight * volume_part
                + cfg.trending_rating_weight * rating_part;
            RankedProduct::from_product(
                p,
                score,
                format!("{} avis positifs", p.stats.positive_reviews),
            )
        })
        .collect();
    sort_rows_desc(&mut rows);
    rows.truncate(top_n);
    Ok(rows)
}
