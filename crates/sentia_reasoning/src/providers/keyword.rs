//! Offline emotion classifier over per-label keyword lists.

use async_trait::async_trait;
use regex::Regex;
use sentia_core::{EmotionClassifier, EmotionLabel, EmotionSignal, Result};
use std::sync::LazyLock;

static RE_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\p{L}']+").unwrap());

const INTENSIFIERS: &[&str] = &[
    "very", "so", "really", "extremely", "incredibly", "totally", "absolutely", "truly", "deeply",
];

/// Keyword lists in table order; earlier labels win ties.
const LEXICON: &[(EmotionLabel, &[&str])] = &[
    (EmotionLabel::Joy, &["joy", "joyful", "glad", "delighted", "wonderful", "great", "awesome", "yay"]),
    (EmotionLabel::Happiness, &["happy", "happiness", "pleased", "content", "cheerful", "good"]),
    (EmotionLabel::Sadness, &["sad", "sadness", "unhappy", "depressed", "down", "miserable", "lonely", "cry", "crying", "grief"]),
    (EmotionLabel::Anger, &["angry", "anger", "mad", "furious", "annoyed", "irritated", "hate", "rage"]),
    (EmotionLabel::Fear, &["afraid", "scared", "fear", "terrified", "frightened", "panic"]),
    (EmotionLabel::Anxiety, &["anxious", "anxiety", "worried", "worry", "nervous", "stressed", "uneasy", "tense"]),
    (EmotionLabel::Surprise, &["surprised", "surprise", "shocked", "wow", "unexpected", "amazed"]),
    (EmotionLabel::Love, &["love", "loving", "adore", "beloved"]),
    (EmotionLabel::Affection, &["affection", "fond", "caring", "care", "warm", "hug"]),
    (EmotionLabel::Trust, &["trust", "rely", "confident", "believe", "faith", "safe"]),
    (EmotionLabel::Excitement, &["excited", "exciting", "thrilled", "eager", "pumped"]),
    (EmotionLabel::Disgust, &["disgusted", "disgusting", "gross", "revolting", "sick", "nasty"]),
];

/// Confidence when no keyword matches.
const NO_HIT_CONFIDENCE: f32 = 0.5;

#[derive(Debug, Clone, Default)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Synchronous core of [`EmotionClassifier::classify`].
    pub fn detect(&self, text: &str) -> EmotionSignal {
        let words: Vec<String> = RE_WORD
            .find_iter(text)
            .map(|w| w.as_str().to_lowercase())
            .collect();

        let mut best: Option<(EmotionLabel, usize)> = None;
        for (label, keywords) in LEXICON {
            let hits = words.iter().filter(|w| keywords.contains(&w.as_str())).count();
            if hits > best.map(|(_, h)| h).unwrap_or(0) {
                best = Some((*label, hits));
            }
        }

        match best {
            Some((label, hits)) => {
                let intensifiers = words
                    .iter()
                    .filter(|w| INTENSIFIERS.contains(&w.as_str()))
                    .count();
                let confidence = 0.5 + 0.15 * hits as f32 + 0.1 * intensifiers as f32;
                EmotionSignal::new(label, confidence.min(1.0))
            }
            None => EmotionSignal::neutral(NO_HIT_CONFIDENCE),
        }
    }
}

/// Whether `text` contains any emotion keyword.
pub fn mentions_emotion(text: &str) -> bool {
    RE_WORD.find_iter(text).any(|w| {
        let w = w.as_str().to_lowercase();
        LEXICON.iter().any(|(_, keywords)| keywords.contains(&w.as_str()))
    })
}

#[async_trait]
impl EmotionClassifier for KeywordClassifier {
    async fn classify(&self, text: &str) -> Result<EmotionSignal> {
        Ok(self.detect(text))
    }

    fn name(&self) -> &'static str {
        "keyword"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_most_hits_wins() {
        let signal = KeywordClassifier::new().detect("I'm sad and lonely, but a bit worried");
        assert_eq!(signal.label, EmotionLabel::Sadness);
        assert!((signal.confidence - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_tie_goes_to_table_order() {
        let signal = KeywordClassifier::new().detect("angry and scared");
        assert_eq!(signal.label, EmotionLabel::Anger);
    }

    #[test]
    fn test_intensifiers_raise_confidence_up_to_one() {
        let signal = KeywordClassifier::new().detect("so very really extremely happy");
        assert_eq!(signal.label, EmotionLabel::Happiness);
        assert!((signal.confidence - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_no_hits_is_neutral() {
        let signal = KeywordClassifier::new().detect("The train leaves at noon.");
        assert_eq!(signal.label, EmotionLabel::Neutral);
        assert!((signal.confidence - 0.5).abs() < 1e-6);
        assert!(!mentions_emotion("The train leaves at noon."));
        assert!(mentions_emotion("I'm so Happy"));
    }

    #[tokio::test]
    async fn test_classify_never_fails() {
        let signal = KeywordClassifier::new().classify("").await.unwrap();
        assert_eq!(signal.label, EmotionLabel::Neutral);
    }
}
