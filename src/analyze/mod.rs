// src/analyze/mod.rs
//! Sentiment scoring pipeline.
//!
//! The analyzer resolves a per-language classifier backend, maps its 5-way
//! star output onto the 3-way sentiment domain and degrades to the keyword
//! lexicon whenever no backend exists or the call fails. Scoring never
//! returns an error to callers; degradation is logged and counted instead.

pub mod classifier;
pub mod lexicon;

use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::model::{Language, Sentiment};
use classifier::{ClassifierSet, StarPrediction};
use lexicon::LexiconScorer;

/// Trimmed inputs shorter than this are treated as uninformative, not as
/// errors, and never reach a backend.
pub const MIN_SCORABLE_CHARS: usize = 3;
/// Backends see at most this many characters (model context limit).
pub const MAX_CLASSIFIER_CHARS: usize = 512;

/// One-time metrics registration (so series show up on the host's exporter).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "sentiment_scored_total",
            "Review texts that passed the length floor and were scored."
        );
        describe_counter!(
            "sentiment_fallback_total",
            "Scores produced by the lexicon fallback path."
        );
        describe_counter!(
            "sentiment_backend_errors_total",
            "Classifier backend calls that failed and were degraded."
        );
    });
}

/// Scoring result: label, continuous score in [-1, 1], confidence in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentSignal {
    pub sentiment: Sentiment,
    pub sentiment_score: f32,
    pub confidence: f32,
}

impl SentimentSignal {
    /// Canonical answer for text too short to say anything about.
    pub fn uninformative() -> Self {
        Self {
            sentiment: Sentiment::Neutral,
            sentiment_score: 0.0,
            confidence: 0.0,
        }
    }
}

#[derive(Debug)]
pub struct SentimentAnalyzer {
    backends: ClassifierSet,
    fallback: LexiconScorer,
}

impl SentimentAnalyzer {
    pub fn new(backends: ClassifierSet) -> Self {
        Self {
            backends,
            fallback: LexiconScorer::new(),
        }
    }

    /// Lexicon-only analyzer; every call takes the fallback path.
    pub fn disabled() -> Self {
        Self::new(ClassifierSet::disabled())
    }

    /// Score one review text.
    ///
    /// Infallible by contract: a backend error is logged with an anonymized
    /// text hash and answered by the lexicon instead.
    pub async fn analyze(&self, text: &str, language: Language) -> SentimentSignal {
        ensure_metrics_described();

        let trimmed = text.trim();
        if trimmed.chars().count() < MIN_SCORABLE_CHARS {
            return SentimentSignal::uninformative();
        }
        counter!("sentiment_scored_total").increment(1);

        if let Some(backend) = self.backends.resolve(language) {
            let snippet = truncate_chars(trimmed, MAX_CLASSIFIER_CHARS);
            match backend.classify(snippet).await {
                Ok(pred) => return signal_from_stars(pred),
                Err(err) => {
                    counter!("sentiment_backend_errors_total").increment(1);
                    warn!(
                        backend = backend.name(),
                        language = %language,
                        text_hash = %anon_hash(trimmed),
                        error = ?err,
                        "classifier call failed, degrading to lexicon"
                    );
                }
            }
        }

        counter!("sentiment_fallback_total").increment(1);
        self.fallback.score(trimmed, language)
    }
}

/// Map a star class onto the sentiment domain.
///
/// 4..=5 stars land in [0.5, 1.0], 3 stars is exactly 0.0, everything else
/// lands in [-1.0, -0.5]. The returned confidence is the backend's own,
/// untouched by the mapping.
fn signal_from_stars(pred: StarPrediction) -> SentimentSignal {
    let confidence = clamp01(pred.confidence);
    let (sentiment, sentiment_score) = match pred.stars {
        4 | 5 => (Sentiment::Positive, 0.5 + confidence * 0.5),
        3 => (Sentiment::Neutral, 0.0),
        _ => (Sentiment::Negative, -0.5 - confidence * 0.5),
    };
    SentimentSignal {
        sentiment,
        sentiment_score,
        confidence,
    }
}

/// Cut at a char boundary; byte slicing would split multibyte Arabic text.
fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

fn clamp01(x: f32) -> f32 {
    if x < 0.0 {
        0.0
    } else if x > 1.0 {
        1.0
    } else {
        x
    }
}

/// Short stable hash so logs never carry raw review text.
pub(crate) fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::classifier::{Classifier, ClassifierSet, MockClassifier, StarPrediction};
    use super::*;
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    struct CountingClassifier {
        calls: Arc<AtomicUsize>,
        seen_chars: Arc<Mutex<Option<usize>>>,
        fixed: StarPrediction,
    }

    #[async_trait]
    impl Classifier for CountingClassifier {
        async fn classify(&self, text: &str) -> Result<StarPrediction> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.seen_chars.lock().unwrap() = Some(text.chars().count());
            Ok(self.fixed)
        }
        fn name(&self) -> &'static str {
            "counting"
        }
    }

    struct FailingClassifier;

    #[async_trait]
    impl Classifier for FailingClassifier {
        async fn classify(&self, _text: &str) -> Result<StarPrediction> {
            Err(anyhow!("backend unavailable"))
        }
        fn name(&self) -> &'static str {
            "failing"
        }
    }

    fn analyzer_with(backend: Arc<dyn Classifier>) -> SentimentAnalyzer {
        SentimentAnalyzer::new(ClassifierSet::shared(backend))
    }

    #[tokio::test]
    async fn short_text_exits_before_any_backend_call() {
        let calls = Arc::new(AtomicUsize::new(0));
        let backend = Arc::new(CountingClassifier {
            calls: calls.clone(),
            seen_chars: Arc::new(Mutex::new(None)),
            fixed: StarPrediction {
                stars: 5,
                confidence: 0.9,
            },
        });
        let analyzer = analyzer_with(backend);

        let signal = analyzer.analyze("  ok  ", Language::Fr).await;
        assert_eq!(signal, SentimentSignal::uninformative());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn star_classes_map_onto_sentiment_bands() {
        let analyzer = analyzer_with(Arc::new(MockClassifier::stars(5, 0.9)));
        let s = analyzer.analyze("très bon produit", Language::Fr).await;
        assert_eq!(s.sentiment, Sentiment::Positive);
        assert!((s.sentiment_score - 0.95).abs() < 1e-6);
        assert!((s.confidence - 0.9).abs() < 1e-6);

        let analyzer = analyzer_with(Arc::new(MockClassifier::stars(3, 0.4)));
        let s = analyzer.analyze("produit correct", Language::Fr).await;
        assert_eq!(s.sentiment, Sentiment::Neutral);
        assert_eq!(s.sentiment_score, 0.0);
        assert!((s.confidence - 0.4).abs() < 1e-6);

        let analyzer = analyzer_with(Arc::new(MockClassifier::stars(1, 0.8)));
        let s = analyzer.analyze("produit horrible", Language::Fr).await;
        assert_eq!(s.sentiment, Sentiment::Negative);
        assert!((s.sentiment_score + 0.9).abs() < 1e-6);
    }

    #[tokio::test]
    async fn backend_input_is_truncated_to_the_context_limit() {
        let seen = Arc::new(Mutex::new(None));
        let backend = Arc::new(CountingClassifier {
            calls: Arc::new(AtomicUsize::new(0)),
            seen_chars: seen.clone(),
            fixed: StarPrediction {
                stars: 4,
                confidence: 0.5,
            },
        });
        let analyzer = analyzer_with(backend);

        let long = "trop ".repeat(200);
        analyzer.analyze(&long, Language::Fr).await;
        assert_eq!(seen.lock().unwrap().unwrap(), MAX_CLASSIFIER_CHARS);
    }

    #[tokio::test]
    async fn backend_failure_degrades_to_the_lexicon() {
        let analyzer = analyzer_with(Arc::new(FailingClassifier));
        let s = analyzer
            .analyze("Excellent produit, très satisfait de mon achat !", Language::Fr)
            .await;
        assert_eq!(s.sentiment, Sentiment::Positive);
        assert!((s.sentiment_score - 0.3).abs() < 1e-6);
        assert!((s.confidence - 0.6).abs() < 1e-6);
    }

    #[tokio::test]
    async fn no_backend_goes_straight_to_the_lexicon() {
        let analyzer = SentimentAnalyzer::disabled();
        let s = analyzer.analyze("هذا المنتج ممتاز", Language::Ar).await;
        assert_eq!(s.sentiment, Sentiment::Positive);
        assert!((s.confidence - 0.6).abs() < 1e-6);
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let arabic = "منتج".repeat(200);
        let cut = truncate_chars(&arabic, MAX_CLASSIFIER_CHARS);
        assert_eq!(cut.chars().count(), MAX_CLASSIFIER_CHARS);

        let short = "abc";
        assert_eq!(truncate_chars(short, MAX_CLASSIFIER_CHARS), "abc");
    }

    #[test]
    fn anon_hash_is_short_and_stable() {
        let a = anon_hash("même texte");
        let b = anon_hash("même texte");
        assert_eq!(a, b);
        assert_eq!(a.len(), 12);
        assert_ne!(a, anon_hash("autre texte"));
    }
}
