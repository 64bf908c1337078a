// src/pipeline.rs
//! Scoring pipeline: language detection and text cleaning feed the sentiment
//! analyzer, and the combined result lands on a `Review` row a store can
//! ingest as-is.

use anyhow::Result;
use chrono::Utc;

use crate::analyze::{SentimentAnalyzer, SentimentSignal};
use crate::config::ScorerConfig;
use crate::model::{Language, Review, ReviewDraft};
use crate::preprocess::TextPreprocessor;

pub struct ReviewPipeline {
    preprocessor: TextPreprocessor,
    analyzer: SentimentAnalyzer,
}

impl ReviewPipeline {
    pub fn new(analyzer: SentimentAnalyzer) -> Self {
        Self {
            preprocessor: TextPreprocessor::new(),
            analyzer,
        }
    }

    /// Pipeline with no remote backends; everything scores via lexicons.
    pub fn lexicon_only() -> Self {
        Self::new(SentimentAnalyzer::disabled())
    }

    pub fn from_config(cfg: &ScorerConfig) -> Result<Self> {
        Ok(Self::new(SentimentAnalyzer::new(cfg.build_classifier_set()?)))
    }

    /// Ad-hoc analysis of free-standing text, for callers that have no
    /// review to attach it to.
    pub async fn analyze_text(&self, text: &str) -> (Language, SentimentSignal) {
        let (processed, language) = self.preprocessor.preprocess(text);
        let signal = self.analyzer.analyze(&processed, language).await;
        (language, signal)
    }

    /// Score a submitted draft into a full review row. The raw text is kept
    /// verbatim; only the analyzer sees the processed form. The store
    /// assigns the real id on insert, so `id` is zero here.
    pub async fn score_review(&self, draft: &ReviewDraft) -> Review {
        let (processed, language) = self.preprocessor.preprocess(&draft.text);
        let signal = self.analyzer.analyze(&processed, language).await;
        Review {
            id: 0,
            user_id: draft.user_id,
            product_id: draft.product_id,
            rating: draft.rating,
            text: draft.text.clone(),
            language,
            sentiment: signal.sentiment,
            sentiment_score: signal.sentiment_score,
            confidence: signal.confidence,
            processed: true,
            created_at: Utc::now(),
        }
    }
}

impl Default for ReviewPipeline {
    fn default() -> Self {
        Self::lexicon_only()
    }
}
