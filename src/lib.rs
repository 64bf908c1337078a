// src/lib.rs
// Public library surface for integration tests (and embedding hosts).

pub mod config;
pub mod model;
pub mod pipeline;
pub mod preprocess;
pub mod stats;
pub mod store;

// Sentiment scoring (remote star classifiers + lexicon fallback)
pub mod analyze;

// Recommendation strategies (collaborative, content, hybrid, trending)
pub mod recommend;

// ---- Re-exports for stable public API ----
pub use crate::analyze::{SentimentAnalyzer, SentimentSignal};
pub use crate::config::{EngineConfig, ScorerConfig};
pub use crate::model::{
    Language, Product, ProductId, Recommendation, Review, ReviewDraft, ReviewId, Sentiment,
    Strategy, User, UserId, UserPreference,
};
pub use crate::pipeline::ReviewPipeline;
pub use crate::preprocess::TextPreprocessor;
pub use crate::recommend::{RankedProduct, RecommendConfig, RecommendationEngine};
pub use crate::stats::{dashboard, DashboardSnapshot, ProductStats};
pub use crate::store::{MemoryStore, ReviewStore};
