// src/config.rs
//! Engine configuration, loaded once at startup from a TOML file.
//!
//! Two sections: `[scorer]` wires the remote star classifiers, `[recommend]`
//! tunes the ranking weights. Every key except `scorer.enabled` has a default
//! so a partial file (or none at all) still yields a working engine in
//! lexicon-only mode.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::sync::Arc;
use std::{env, fs, path::Path};
use tracing::info;

use crate::analyze::classifier::{ClassifierSet, DynClassifier, HttpClassifier};
use crate::recommend::RecommendConfig;

/// Env var consulted when `api_key = "ENV"`.
const HF_TOKEN_VAR: &str = "HF_API_TOKEN";

fn default_endpoint() -> String {
    "https://api-inference.huggingface.co/models".to_string()
}
fn default_model() -> String {
    "nlptown/bert-base-multilingual-uncased-sentiment".to_string()
}
fn default_timeout_secs() -> u64 {
    8
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScorerConfig {
    /// Remote classification on/off. Off means every review is scored by
    /// the keyword lexicons alone.
    pub enabled: bool,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Star-label model for French and unrecognized text.
    #[serde(default = "default_model")]
    pub model_fr: String,
    /// Star-label model for Arabic-script text (Darija rides on it). An
    /// empty string drops the Arabic backend entirely.
    #[serde(default = "default_model")]
    pub model_ar: String,
    /// "ENV" means: read from HF_API_TOKEN. Empty means unauthenticated.
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_endpoint(),
            model_fr: default_model(),
            model_ar: default_model(),
            api_key: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ScorerConfig {
    /// Build the classifier backends this config describes. Disabled config
    /// yields an empty set and the analyzer degrades to lexicon scoring.
    pub fn build_classifier_set(&self) -> Result<ClassifierSet> {
        if !self.enabled {
            return Ok(ClassifierSet::disabled());
        }
        let api_key = self.resolved_api_key()?;
        let fr = HttpClassifier::new(
            &self.endpoint,
            &self.model_fr,
            api_key.clone(),
            self.timeout_secs,
        )?;
        let ar = if self.model_ar.trim().is_empty() {
            None
        } else {
            let classifier =
                HttpClassifier::new(&self.endpoint, &self.model_ar, api_key, self.timeout_secs)?;
            Some(Arc::new(classifier) as DynClassifier)
        };
        Ok(ClassifierSet::new(Some(Arc::new(fr) as DynClassifier), ar))
    }

    fn resolved_api_key(&self) -> Result<Option<String>> {
        let raw = self.api_key.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        if raw.eq_ignore_ascii_case("env") {
            let token = env::var(HF_TOKEN_VAR)
                .map_err(|_| anyhow::anyhow!("missing {HF_TOKEN_VAR} env var"))?;
            return Ok(Some(token));
        }
        Ok(Some(raw.to_string()))
    }

    fn sanitize(&mut self) {
        if self.timeout_secs == 0 {
            self.timeout_secs = default_timeout_secs();
        }
        self.endpoint = self.endpoint.trim().to_string();
        if self.endpoint.is_empty() {
            self.endpoint = default_endpoint();
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub scorer: ScorerConfig,
    #[serde(default)]
    pub recommend: RecommendConfig,
}

impl EngineConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading engine config {}", path.display()))?;
        let mut cfg: Self = toml::from_str(&raw)
            .with_context(|| format!("parsing engine config {}", path.display()))?;
        cfg.scorer.sanitize();
        cfg.recommend.sanitize();
        Ok(cfg)
    }

    /// Safe diagnostics: never the key itself, only its length.
    pub fn log_summary(&self) {
        info!(
            scorer_enabled = self.scorer.enabled,
            endpoint = %self.scorer.endpoint,
            model_fr = %self.scorer.model_fr,
            model_ar = %self.scorer.model_ar,
            key_len = self.scorer.api_key.len(),
            "engine config loaded"
        );
    }
}
