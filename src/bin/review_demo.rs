//! Demo that pushes a handful of multilingual reviews through the full
//! pipeline (detect, clean, score, aggregate) and prints per-strategy
//! recommendations plus the dashboard snapshot.

use anyhow::Result;
use std::collections::HashMap;

use feelya_engine::{
    dashboard, EngineConfig, MemoryStore, Product, RecommendationEngine, ReviewDraft,
    ReviewPipeline, Strategy, User, UserId, UserPreference,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // FEELYA_CONFIG points at a TOML file; without it the engine runs with
    // defaults (remote scoring off, lexicons only).
    let cfg = match std::env::var("FEELYA_CONFIG") {
        Ok(path) => EngineConfig::load_from_file(&path)?,
        Err(_) => EngineConfig::default(),
    };
    cfg.log_summary();

    let pipeline = ReviewPipeline::from_config(&cfg.scorer)?;
    let engine = RecommendationEngine::new(cfg.recommend);
    let store = MemoryStore::new();

    // ---- Catalog ----
    for p in [
        Product::new(1, "Casque Bluetooth Anker", "Audio", 349.0, "jumia"),
        Product::new(2, "Enceinte JBL Go", "Audio", 299.0, "jumia"),
        Product::new(3, "Clavier Logitech K120", "Informatique", 149.0, "electroplanet"),
        Product::new(4, "Souris sans fil HP", "Informatique", 99.0, "jumia"),
        Product::new(5, "Tajine électrique Moulinex", "Cuisine", 599.0, "marjane"),
        Product::new(6, "Blender Kenwood", "Cuisine", 449.0, "avito"),
    ] {
        store.insert_product(p);
    }

    // The store keeps no user table; names live with the host.
    let users: HashMap<UserId, User> = [
        User::new(1, "amina"),
        User::new(2, "youssef"),
        User::new(3, "sara"),
    ]
    .into_iter()
    .map(|u| (u.id, u))
    .collect();

    for pref in [
        UserPreference { user_id: 1, category: "Audio".into(), preference_score: 1.0 },
        UserPreference { user_id: 1, category: "Informatique".into(), preference_score: 0.6 },
        UserPreference { user_id: 2, category: "Cuisine".into(), preference_score: 0.9 },
    ] {
        store.insert_preference(pref);
    }

    // ---- Reviews in three languages ----
    let drafts = [
        (Some(1), 1, 5.0, "Produit excellent, son incroyable, je recommande !"),
        (Some(1), 3, 2.0, "Clavier décevant, touches fragiles."),
        (Some(2), 1, 4.5, "Très bon casque, qualité top pour le prix."),
        (Some(2), 2, 4.0, "هاد السماعة زوينة بزاف والصوت نقي"),
        (Some(2), 5, 5.0, "المنتج ممتاز والجودة رائعة أنصح به"),
        (Some(3), 1, 4.0, "<p>Livraison rapide, produit <b>impeccable</b> 😍</p>"),
        (Some(3), 2, 4.5, "واعر هاد الموديل، الثمن مزيان بزاف"),
        (Some(3), 6, 1.5, "خايب بزاف، وصلني مقطوع"),
        (None, 4, 3.0, "Correct sans plus."),
    ];

    println!("=== Avis analysés ===");
    for (user_id, product_id, rating, text) in drafts {
        let draft = ReviewDraft {
            user_id,
            product_id,
            rating,
            text: text.to_string(),
        };
        let scored = pipeline.score_review(&draft).await;
        let stored = store.submit(scored).await?;
        let who = stored
            .user_id
            .and_then(|id| users.get(&id))
            .map_or("anonyme", |u| u.username.as_str());
        println!(
            "  #{:<2} {:8} [{:7}] {:8} score={:+.2} conf={:.2}  {}",
            stored.id,
            who,
            stored.language.as_str(),
            stored.sentiment.label(),
            stored.sentiment_score,
            stored.confidence,
            stored.text.chars().take(44).collect::<String>()
        );
    }

    // Anonymous imports push two products past the trending review floor.
    let imported = [
        (1, 5.0, "Très bon produit, fiable."),
        (1, 4.0, "Bon rapport qualité prix."),
        (1, 4.5, "Super son, très bonne qualité."),
        (1, 5.0, "Parfait, rien à dire."),
        (5, 4.5, "جودة ممتازة"),
        (5, 4.0, "Efficace et rapide à chauffer."),
        (5, 4.0, "الطاجين مزيان بزاف"),
        (5, 3.5, "Bien mais un peu cher."),
    ];
    for (product_id, rating, text) in imported {
        let scored = pipeline
            .score_review(&ReviewDraft {
                user_id: None,
                product_id,
                rating,
                text: text.to_string(),
            })
            .await;
        store.submit(scored).await?;
    }
    println!("  ... + {} avis importés (anonymes)", imported.len());

    // ---- Recommendations for amina ----
    let user_id = 1;
    let weights = engine.config();
    println!("\n=== Recommandations ({}) ===", users[&user_id].username);
    println!(
        "  pondération hybride: {:.0}% collaboratif / {:.0}% contenu, seuil sentiment {:.1}",
        weights.collab_weight * 100.0,
        weights.content_weight * 100.0,
        weights.sentiment_gate
    );
    for (label, strategy, rows) in [
        (
            "collaboratif",
            Strategy::Collaborative,
            engine.collaborative(&store, user_id, 5).await?,
        ),
        (
            "contenu",
            Strategy::ContentBased,
            engine.content_based(&store, user_id, 5).await?,
        ),
        ("hybride", Strategy::Hybrid, engine.hybrid(&store, user_id, 5).await?),
    ] {
        println!("  -- {label} --");
        if rows.is_empty() {
            println!("     (aucune suggestion)");
        }
        for row in &rows {
            let rec = feelya_engine::Recommendation::from_ranked(user_id, row, strategy);
            println!(
                "     {} (score {:.2}, {}) [{}]",
                row.product_name,
                row.score,
                row.reason,
                rec.method.as_str()
            );
        }
    }

    println!("\n=== Tendances ===");
    for row in engine.trending(&store, None, 5).await? {
        println!("  {} (score {:.2}, {})", row.product_name, row.score, row.reason);
    }

    println!("\n=== Tableau de bord ===");
    let snapshot = dashboard(&store).await?;
    println!("{}", serde_json::to_string_pretty(&snapshot)?);

    Ok(())
}
