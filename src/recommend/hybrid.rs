// src/recommend/hybrid.rs
//! Weighted blend of the collaborative and content-based strategies. Both
//! sources are over-fetched at twice the requested length so a product that
//! ranks mid-list in each can still reach the merged top.

use anyhow::Result;
use std::collections::HashMap;

use super::{collaborative, content, sort_rows_desc, RankedProduct, RecommendConfig};
use crate::model::{ProductId, UserId};
use crate::store::ReviewStore;

struct Blend {
    row: RankedProduct,
    score: f32,
    from_collab: bool,
    from_content: bool,
}

pub(super) async fn rank(
    store: &dyn ReviewStore,
    user_id: UserId,
    top_n: usize,
    cfg: &RecommendConfig,
) -> Result<Vec<RankedProduct>> {
    let wide = top_n.saturating_mul(2);
    let collab_rows = collaborative::rank(store, user_id, wide).await?;
    let content_rows = content::rank(store, user_id, wide, cfg.sentiment_gate).await?;

    // Merge on product id; a product present in both keeps one row whose
    // score is the weighted sum of its per-strategy scores.
    let mut merged: HashMap<ProductId, Blend> = HashMap::new();
    for row in collab_rows {
        merged.insert(
            row.product_id,
            Blend {
                score: row.score * cfg.collab_weight,
                row,
                from_collab: true,
                from_content: false,
            },
        );
    }
    for row in content_rows {
        match merged.entry(row.product_id) {
            std::collections::hash_map::Entry::Occupied(mut slot) => {
                let blend = slot.get_mut();
                blend.score += row.score * cfg.content_weight;
                blend.from_content = true;
            }
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(Blend {
                    score: row.score * cfg.content_weight,
                    row,
                    from_collab: false,
                    from_content: true,
                });
            }
        }
    }

    let mut rows: Vec<RankedProduct> = merged
        .into_values()
        .map(|blend| {
            let mut row = blend.row;
            row.score = blend.score;
            row.reason = blend_reason(blend.from_collab, blend.from_content).to_string();
            row
        })
        .collect();
    sort_rows_desc(&mut rows);
    rows.truncate(top_n);
    Ok(rows)
}

fn blend_reason(from_collab: bool, from_content: bool) -> &'static str {
    match (from_collab, from_content) {
        (true, true) => "Recommandation hybride (collaboratif + contenu)",
        (true, false) => "Recommandation hybride (collaboratif)",
        _ => "Recommandation hybride (contenu)",
    }
}
