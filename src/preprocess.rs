// src/preprocess.rs
//! Language detection and review-text normalization.
//!
//! The pipeline is `detect_language` -> `clean` -> `strip_stopwords`, with
//! [`TextPreprocessor::preprocess`] composing all three. Detection is a
//! script-ratio heuristic, not a statistical classifier: ties and short
//! inputs land on French, review text with no word characters at all is
//! `unknown`.

use once_cell::sync::{Lazy, OnceCell};
use regex::Regex;
use std::collections::HashSet;

use crate::model::Language;

static FRENCH_STOPWORDS: Lazy<HashSet<String>> = Lazy::new(|| {
    let raw = include_str!("../lexicons/stopwords_fr.json");
    serde_json::from_str(raw).expect("valid French stopword list")
});

static ARABIC_STOPWORDS: Lazy<HashSet<String>> = Lazy::new(|| {
    let raw = include_str!("../lexicons/stopwords_ar.json");
    serde_json::from_str(raw).expect("valid Arabic stopword list")
});

/// Function words (interrogatives, temporal markers) that occur in Moroccan
/// Darija but not in Standard Arabic. Used both as a detection signal and as
/// extra stopwords.
static DARIJA_MARKERS: Lazy<HashSet<String>> = Lazy::new(|| {
    let raw = include_str!("../lexicons/darija_markers.json");
    serde_json::from_str(raw).expect("valid Darija marker list")
});

/// Arabic block boundaries used by the detector and the script filter.
const ARABIC_BLOCK: std::ops::RangeInclusive<char> = '\u{0600}'..='\u{06FF}';

#[derive(Debug, Clone, Default)]
pub struct TextPreprocessor;

impl TextPreprocessor {
    pub fn new() -> Self {
        Self
    }

    /// Classify the dominant script of `text`.
    ///
    /// Ratio of Arabic-block code points to word characters; above 0.5 the
    /// text is Arabic script, and any Darija marker token flips it from `ar`
    /// to `darija`. No word characters at all means `unknown`.
    pub fn detect_language(&self, text: &str) -> Language {
        let arabic_chars = text.chars().filter(|c| ARABIC_BLOCK.contains(c)).count();
        let word_chars = text.chars().filter(|c| is_word_char(*c)).count();

        if word_chars == 0 {
            return Language::Unknown;
        }

        let arabic_ratio = arabic_chars as f32 / word_chars as f32;
        if arabic_ratio > 0.5 {
            let has_marker = text
                .split(|c: char| !is_word_char(c))
                .filter(|t| !t.is_empty())
                .any(|t| DARIJA_MARKERS.contains(t));
            if has_marker {
                return Language::Darija;
            }
            return Language::Ar;
        }
        Language::Fr
    }

    /// Normalize raw review text for scoring.
    ///
    /// Scraped input first gets HTML entities decoded and tags stripped,
    /// then the social-noise passes run (URLs, emails, handles, emoji) and a
    /// script-aware character filter keeps only the letters that matter for
    /// `language`.
    pub fn clean(&self, text: &str, language: Language) -> String {
        // 1) HTML entity decode + tag strip (reviews arrive from scrapers)
        let mut out = html_escape::decode_html_entities(text).to_string();
        static RE_TAGS: OnceCell<Regex> = OnceCell::new();
        let re_tags = RE_TAGS.get_or_init(|| Regex::new(r"(?is)</?[^>]+>").unwrap());
        out = re_tags.replace_all(&out, "").to_string();

        // 2) Case folding is meaningful for Latin script only
        if language == Language::Fr {
            out = out.to_lowercase();
        }

        // 3) URLs
        static RE_URL: OnceCell<Regex> = OnceCell::new();
        let re_url = RE_URL.get_or_init(|| Regex::new(r"http\S+|www\S+|https\S+").unwrap());
        out = re_url.replace_all(&out, "").to_string();

        // 4) Emails
        static RE_EMAIL: OnceCell<Regex> = OnceCell::new();
        let re_email = RE_EMAIL.get_or_init(|| Regex::new(r"\S+@\S+").unwrap());
        out = re_email.replace_all(&out, "").to_string();

        // 5) @-mentions and #-hashtags
        static RE_HANDLES: OnceCell<Regex> = OnceCell::new();
        let re_handles = RE_HANDLES.get_or_init(|| Regex::new(r"@\w+|#\w+").unwrap());
        out = re_handles.replace_all(&out, "").to_string();

        // 6) Emoji blocks (emoticons, pictographs, transport, flags, dingbats)
        static RE_EMOJI: OnceCell<Regex> = OnceCell::new();
        let re_emoji = RE_EMOJI.get_or_init(|| {
            Regex::new(
                r"[\u{1F600}-\u{1F64F}\u{1F300}-\u{1F5FF}\u{1F680}-\u{1F6FF}\u{1F1E0}-\u{1F1FF}\u{2702}-\u{27B0}\u{24C2}-\u{1F251}]+",
            )
            .unwrap()
        });
        out = re_emoji.replace_all(&out, "").to_string();

        // 7) Script filter: keep the letters of the detected script, blank
        //    out the rest so word boundaries survive
        out = if language.is_arabic_script() {
            static RE_NON_ARABIC: OnceCell<Regex> = OnceCell::new();
            let re = RE_NON_ARABIC
                .get_or_init(|| Regex::new(r"[^\u{0600}-\u{06FF}\s]").unwrap());
            re.replace_all(&out, " ").to_string()
        } else {
            static RE_NON_LATIN: OnceCell<Regex> = OnceCell::new();
            let re = RE_NON_LATIN.get_or_init(|| Regex::new(r"[^a-zA-ZÀ-ÿ\s]").unwrap());
            re.replace_all(&out, " ").to_string()
        };

        // 8) Collapse whitespace
        static RE_WS: OnceCell<Regex> = OnceCell::new();
        let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").unwrap());
        out = re_ws.replace_all(&out, " ").to_string();
        out.trim().to_string()
    }

    /// Tokenize on whitespace and drop function words.
    ///
    /// `ar` and `darija` share one filter (the union of the Arabic list and
    /// the Darija markers). For `unknown` the text passes through untouched;
    /// without a language there is no meaningful stopword list.
    pub fn strip_stopwords(&self, text: &str, language: Language) -> String {
        let keep = |token: &&str| -> bool {
            match language {
                Language::Fr => !FRENCH_STOPWORDS.contains(*token),
                Language::Ar | Language::Darija => {
                    !ARABIC_STOPWORDS.contains(*token) && !DARIJA_MARKERS.contains(*token)
                }
                Language::Unknown => true,
            }
        };
        if language == Language::Unknown {
            return text.to_string();
        }
        text.split_whitespace()
            .filter(keep)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Full pipeline: detect, clean, strip stopwords.
    pub fn preprocess(&self, text: &str) -> (String, Language) {
        let language = self.detect_language(text);
        let cleaned = self.clean(text, language);
        let processed = self.strip_stopwords(&cleaned, language);
        (processed, language)
    }
}

/// Mirror of the usual word-character class: letters, digits, underscore.
#[inline]
fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
