// src/analyze/classifier.rs
//! Star-rating classifier backends.
//!
//! A backend takes review text and returns one of five ordinal star classes
//! with a confidence. The HTTP implementation speaks to hosted inference
//! endpoints serving multilingual star-rating models whose labels look like
//! `"4 stars"`; a mock exists for tests and offline runs.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::model::Language;

// ------------------------------------------------------------
// Public surface
// ------------------------------------------------------------

/// Raw backend output before mapping into the 3-way sentiment domain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StarPrediction {
    /// Ordinal class, 1..=5.
    pub stars: u8,
    /// Class confidence as reported by the backend.
    pub confidence: f32,
}

#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<StarPrediction>;
    /// Backend name for diagnostics and logs.
    fn name(&self) -> &'static str;
}

/// Convenient alias used by callers.
pub type DynClassifier = Arc<dyn Classifier>;

/// Per-language backend table.
///
/// Darija has no dedicated model, so it rides on the Arabic backend; text of
/// unknown language goes to the French one. A missing slot means the lexicon
/// fallback handles that language entirely.
#[derive(Clone, Default)]
pub struct ClassifierSet {
    fr: Option<DynClassifier>,
    ar: Option<DynClassifier>,
}

impl ClassifierSet {
    pub fn new(fr: Option<DynClassifier>, ar: Option<DynClassifier>) -> Self {
        Self { fr, ar }
    }

    /// No backends at all; every call degrades to the fallback.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// One backend serving every language (mock/demo convenience).
    pub fn shared(backend: DynClassifier) -> Self {
        Self {
            fr: Some(backend.clone()),
            ar: Some(backend),
        }
    }

    pub fn resolve(&self, language: Language) -> Option<&DynClassifier> {
        match language {
            Language::Fr | Language::Unknown => self.fr.as_ref(),
            Language::Ar | Language::Darija => self.ar.as_ref(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fr.is_none() && self.ar.is_none()
    }
}

impl std::fmt::Debug for ClassifierSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassifierSet")
            .field("fr", &self.fr.as_ref().map(|c| c.name()))
            .field("ar", &self.ar.as_ref().map(|c| c.name()))
            .finish()
    }
}

// ------------------------------------------------------------
// HTTP backend
// ------------------------------------------------------------

/// Calls a hosted text-classification endpoint.
///
/// The wire shape is the usual inference-API one: request `{"inputs": text}`,
/// response a (possibly nested) array of `{label, score}` pairs covering the
/// five star classes.
pub struct HttpClassifier {
    http: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl HttpClassifier {
    pub fn new(base_url: &str, model: &str, api_key: Option<String>, timeout_secs: u64) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent("feelya-engine/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("building inference http client")?;
        let url = format!("{}/{}", base_url.trim_end_matches('/'), model);
        Ok(Self { http, url, api_key })
    }
}

#[derive(Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
}

#[derive(Debug, Deserialize)]
struct LabelScore {
    label: String,
    score: f32,
}

/// Some deployments wrap the per-input scores in an extra array layer.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Nested(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
}

impl InferenceResponse {
    fn into_scores(self) -> Vec<LabelScore> {
        match self {
            InferenceResponse::Nested(mut outer) => {
                if outer.is_empty() {
                    Vec::new()
                } else {
                    outer.swap_remove(0)
                }
            }
            InferenceResponse::Flat(scores) => scores,
        }
    }
}

#[async_trait]
impl Classifier for HttpClassifier {
    async fn classify(&self, text: &str) -> Result<StarPrediction> {
        let mut req = self.http.post(&self.url).json(&InferenceRequest { inputs: text });
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }
        let resp = req.send().await.context("inference request failed")?;
        if !resp.status().is_success() {
            bail!("inference endpoint returned {}", resp.status());
        }
        let body: InferenceResponse = resp
            .json()
            .await
            .context("decoding inference response")?;

        let scores = body.into_scores();
        let top = scores
            .iter()
            .max_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(std::cmp::Ordering::Equal))
            .context("inference response carried no classes")?;

        let stars = parse_stars_label(&top.label)?;
        Ok(StarPrediction {
            stars,
            confidence: top.score,
        })
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// Parse the leading digit out of a `"4 stars"` style label.
fn parse_stars_label(label: &str) -> Result<u8> {
    let first = label
        .split_whitespace()
        .next()
        .unwrap_or_default();
    let stars: u8 = first
        .parse()
        .with_context(|| format!("unrecognized classifier label {label:?}"))?;
    if !(1..=5).contains(&stars) {
        bail!("star class {stars} out of range in label {label:?}");
    }
    Ok(stars)
}

// ------------------------------------------------------------
// Mock backend
// ------------------------------------------------------------

/// Fixed answer for tests and local runs.
#[derive(Debug, Clone)]
pub struct MockClassifier {
    pub fixed: StarPrediction,
}

impl MockClassifier {
    pub fn stars(stars: u8, confidence: f32) -> Self {
        Self {
            fixed: StarPrediction { stars, confidence },
        }
    }
}

#[async_trait]
impl Classifier for MockClassifier {
    async fn classify(&self, _text: &str) -> Result<StarPrediction> {
        Ok(self.fixed)
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_star_labels() {
        assert_eq!(parse_stars_label("5 stars").unwrap(), 5);
        assert_eq!(parse_stars_label("1 star").unwrap(), 1);
        assert!(parse_stars_label("LABEL_4").is_err());
        assert!(parse_stars_label("0 stars").is_err());
        assert!(parse_stars_label("").is_err());
    }

    #[test]
    fn decodes_flat_and_nested_responses() {
        let flat: InferenceResponse =
            serde_json::from_str(r#"[{"label":"4 stars","score":0.7},{"label":"5 stars","score":0.2}]"#)
                .unwrap();
        let scores = flat.into_scores();
        assert_eq!(scores.len(), 2);
        assert_eq!(scores[0].label, "4 stars");

        let nested: InferenceResponse =
            serde_json::from_str(r#"[[{"label":"2 stars","score":0.9}]]"#).unwrap();
        let scores = nested.into_scores();
        assert_eq!(scores.len(), 1);
        assert_eq!(scores[0].label, "2 stars");
    }

    #[test]
    fn resolve_shares_backends_across_languages() {
        let backend: DynClassifier = Arc::new(MockClassifier::stars(4, 0.8));
        let set = ClassifierSet::new(None, Some(backend));
        assert!(set.resolve(Language::Ar).is_some());
        assert!(set.resolve(Language::Darija).is_some(), "darija rides on ar");
        assert!(set.resolve(Language::Fr).is_none());
        assert!(set.resolve(Language::Unknown).is_none(), "unknown rides on fr");

        let set = ClassifierSet::shared(Arc::new(MockClassifier::stars(3, 0.5)));
        assert!(set.resolve(Language::Unknown).is_some());
        assert!(!set.is_empty());
        assert!(ClassifierSet::disabled().is_empty());
    }
}
