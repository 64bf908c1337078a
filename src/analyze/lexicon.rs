// src/analyze/lexicon.rs
//! Keyword fallback scorer.
//!
//! When no classifier backend is configured (or the call fails) this scores
//! text by counting positive/negative keyword hits. Matching is substring
//! containment per keyword, so a keyword scores at most once no matter how
//! often it occurs. Deterministic and infallible: every language maps to a
//! lexicon, `darija` extending the Arabic one, `unknown` borrowing French.

use once_cell::sync::Lazy;
use serde::Deserialize;
use std::cmp::Ordering;

use super::SentimentSignal;
use crate::model::{Language, Sentiment};

/// Contribution of one keyword hit to the score magnitude.
const KEYWORD_WEIGHT: f32 = 0.3;
/// Keyword scores saturate well inside the model-backed range.
const SCORE_CAP: f32 = 0.8;
/// Confidence reported when one polarity wins.
const MATCH_CONFIDENCE: f32 = 0.6;
/// Confidence reported on a tie (including zero hits on both sides).
const TIE_CONFIDENCE: f32 = 0.5;

#[derive(Debug, Deserialize)]
struct Lexicon {
    positive: Vec<String>,
    negative: Vec<String>,
}

static FRENCH: Lazy<Lexicon> = Lazy::new(|| {
    let raw = include_str!("../../lexicons/sentiment_fr.json");
    serde_json::from_str(raw).expect("valid French sentiment lexicon")
});

static ARABIC: Lazy<Lexicon> = Lazy::new(|| {
    let raw = include_str!("../../lexicons/sentiment_ar.json");
    serde_json::from_str(raw).expect("valid Arabic sentiment lexicon")
});

static DARIJA: Lazy<Lexicon> = Lazy::new(|| {
    let raw = include_str!("../../lexicons/sentiment_darija.json");
    serde_json::from_str(raw).expect("valid Darija sentiment lexicon")
});

#[derive(Debug, Clone, Default)]
pub struct LexiconScorer;

impl LexiconScorer {
    pub fn new() -> Self {
        Self
    }

    pub fn score(&self, text: &str, language: Language) -> SentimentSignal {
        let (pos, neg) = match language {
            // French keywords are stored lowercase; fold the text to match.
            Language::Fr | Language::Unknown => {
                let hay = text.to_lowercase();
                (hits(&hay, &FRENCH.positive), hits(&hay, &FRENCH.negative))
            }
            Language::Ar => (hits(text, &ARABIC.positive), hits(text, &ARABIC.negative)),
            Language::Darija => (
                hits(text, &ARABIC.positive) + hits(text, &DARIJA.positive),
                hits(text, &ARABIC.negative) + hits(text, &DARIJA.negative),
            ),
        };
        signal_from_counts(pos, neg)
    }
}

fn hits(haystack: &str, keywords: &[String]) -> usize {
    keywords
        .iter()
        .filter(|k| haystack.contains(k.as_str()))
        .count()
}

fn signal_from_counts(pos: usize, neg: usize) -> SentimentSignal {
    match pos.cmp(&neg) {
        Ordering::Greater => SentimentSignal {
            sentiment: Sentiment::Positive,
            sentiment_score: (pos as f32 * KEYWORD_WEIGHT).min(SCORE_CAP),
            confidence: MATCH_CONFIDENCE,
        },
        Ordering::Less => SentimentSignal {
            sentiment: Sentiment::Negative,
            sentiment_score: (-(neg as f32) * KEYWORD_WEIGHT).max(-SCORE_CAP),
            confidence: MATCH_CONFIDENCE,
        },
        Ordering::Equal => SentimentSignal {
            sentiment: Sentiment::Neutral,
            sentiment_score: 0.0,
            confidence: TIE_CONFIDENCE,
        },
    }
}
