//! Candidate concept extraction for a single turn.

use regex::Regex;
use sentia_core::{Concept, EmotionLabel, EmotionSignal, ReflectionNode};
use std::collections::HashSet;
use std::sync::LazyLock;

static RE_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\p{L}\p{N}]+").unwrap());

static STOPWORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "the", "and", "for", "are", "but", "not", "you", "your", "yours", "all", "any", "can",
        "had", "has", "have", "her", "hers", "him", "his", "how", "its", "may", "our", "ours",
        "out", "she", "they", "them", "their", "this", "that", "these", "those", "was", "were",
        "what", "when", "where", "which", "who", "whom", "why", "will", "with", "would", "could",
        "should", "about", "from", "into", "just", "than", "then", "there", "here", "been",
        "being", "does", "did", "doing", "done", "very", "really", "also", "some", "such", "only",
        "own", "same", "too", "more", "most", "other", "over", "under", "again", "once", "yes",
        "let", "get", "got", "one", "because", "while", "until", "each", "few", "both", "off",
        "onto", "upon", "after", "before", "above", "below", "between", "through", "during",
        "myself", "yourself", "itself", "ourselves", "themselves", "i'm", "im", "dont", "don",
        "isn", "aren", "wasn", "weren", "won", "didn", "doesn", "can't", "cannot", "like",
    ]
    .into_iter()
    .collect()
});

static RE_CRISIS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)\b(?:suicid(?:e|al)|self[- ]?harm(?:ing)?",
        r"|end(?:ing)? (?:my (?:own )?life|it all)|tak(?:e|ing) my (?:own )?life",
        r"|(?:kill|hurt|harm|injur)(?:e|ing)? myself|cut(?:ting)? myself|wants? to die)\b",
    ))
    .unwrap()
});

static RE_CLAUSE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)[.!?;,\n]|\bbut\b").unwrap());

static RE_SCOPE_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\p{L}'’]+").unwrap());

static RE_NEGATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:not|no|never|neither|nor|cannot|(?:don|won|can|didn|wouldn)['’]?t)$")
        .unwrap()
});

/// Words before a phrase, within its clause, that a negation can reach.
const NEGATION_SCOPE_WORDS: usize = 6;

const QUESTION_WORDS: &[&str] = &[
    "what", "why", "how", "when", "where", "who", "which", "whom", "whose", "is", "are", "can",
    "could", "would", "should", "do", "does", "did", "will", "may",
];

/// Salience of an input keyword in a question.
pub const QUESTION_SALIENCE: f32 = 0.9;
/// Salience of an input keyword in any other utterance.
pub const STATEMENT_SALIENCE: f32 = 0.6;
/// Salience bonus for each repeat of a keyword within one input.
pub const REPEAT_BONUS: f32 = 0.1;

/// Keywords in order of first appearance, with how often each occurs.
pub fn extract_keywords(text: &str) -> Vec<(String, usize)> {
    let mut keywords: Vec<(String, usize)> = Vec::new();
    for word in RE_WORD.find_iter(text) {
        let word = word.as_str().to_lowercase();
        if word.chars().count() < 3 || STOPWORDS.contains(word.as_str()) {
            continue;
        }
        match keywords.iter_mut().find(|(k, _)| *k == word) {
            Some((_, count)) => *count += 1,
            None => keywords.push((word, 1)),
        }
    }
    keywords
}

pub fn is_question(text: &str) -> bool {
    let text = text.trim();
    if text.ends_with('?') {
        return true;
    }
    RE_WORD
        .find(text)
        .map(|w| QUESTION_WORDS.contains(&w.as_str().to_lowercase().as_str()))
        .unwrap_or(false)
}

/// First self-harm phrase in `text` that is not negated within its clause,
/// lowercased. "I don't want to hurt myself" yields `None`.
pub fn crisis_phrase(text: &str) -> Option<String> {
    RE_CRISIS
        .find_iter(text)
        .find(|m| !is_negated(&text[..m.start()]))
        .map(|m| m.as_str().to_lowercase())
}

fn is_negated(before: &str) -> bool {
    let clause_start = RE_CLAUSE_BREAK
        .find_iter(before)
        .last()
        .map(|b| b.end())
        .unwrap_or(0);
    let words: Vec<&str> = RE_SCOPE_WORD
        .find_iter(&before[clause_start..])
        .map(|w| w.as_str())
        .collect();
    words[words.len().saturating_sub(NEGATION_SCOPE_WORDS)..]
        .iter()
        .any(|w| RE_NEGATION.is_match(w))
}

/// Salience of a concept derived from a reflection at `level`.
pub fn reflection_salience(level: usize) -> f32 {
    (0.8 - 0.15 * level as f32).max(0.3)
}

/// Build the candidate set for turn `turn`.
///
/// `previous_top` is the highest reflection of the previous turn, if any.
pub fn candidates(
    input: &str,
    emotion: &EmotionSignal,
    previous_top: Option<&ReflectionNode>,
    turn: u64,
) -> Vec<Concept> {
    let base = if is_question(input) {
        QUESTION_SALIENCE
    } else {
        STATEMENT_SALIENCE
    };

    let mut out: Vec<Concept> = extract_keywords(input)
        .into_iter()
        .map(|(word, count)| {
            let salience = (base + REPEAT_BONUS * (count - 1) as f32).min(1.0);
            Concept::input(&word, salience).introduced(turn)
        })
        .collect();

    if emotion.label != EmotionLabel::Neutral {
        out.push(Concept::internal(emotion.label.name(), emotion.confidence).introduced(turn));
    }

    if let Some(node) = previous_top {
        let salience = reflection_salience(node.level);
        for (word, _) in extract_keywords(&node.summary) {
            out.push(Concept::internal(&word, salience).introduced(turn));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentia_core::{ConceptSource, ReflectionKind};

    #[test]
    fn test_keywords_skip_short_and_stopwords() {
        let kws = extract_keywords("The cat and the dog sat on a mat with the cat");
        let words: Vec<&str> = kws.iter().map(|(w, _)| w.as_str()).collect();
        assert_eq!(words, vec!["cat", "dog", "sat", "mat"]);
        assert_eq!(kws[0].1, 2);
    }

    #[test]
    fn test_question_detection() {
        assert!(is_question("is this working"));
        assert!(is_question("Tell me more?"));
        assert!(!is_question("Tell me more."));
        assert!(!is_question(""));
    }

    #[test]
    fn test_crisis_phrases_detected() {
        assert_eq!(
            crisis_phrase("Lately I want to Kill Myself").as_deref(),
            Some("kill myself")
        );
        assert_eq!(crisis_phrase("thinking about suicide").as_deref(), Some("suicide"));
        assert_eq!(crisis_phrase("I keep self-harming").as_deref(), Some("self-harming"));
        assert_eq!(
            crisis_phrase("I just want to end it all.").as_deref(),
            Some("end it all")
        );
    }

    #[test]
    fn test_negated_crisis_phrases_ignored() {
        assert!(crisis_phrase("I don't want to hurt myself").is_none());
        assert!(crisis_phrase("I'm not suicidal, just tired").is_none());
        assert!(crisis_phrase("I would never take my life").is_none());
        // Negation does not cross a clause break.
        assert_eq!(
            crisis_phrase("I'm not okay, I want to die").as_deref(),
            Some("want to die")
        );
        assert_eq!(
            crisis_phrase("No idea why but I keep thinking about suicide").as_deref(),
            Some("suicide")
        );
    }

    #[test]
    fn test_ordinary_text_is_not_a_crisis() {
        assert!(crisis_phrase("This deadline is killing me").is_none());
        assert!(crisis_phrase("I hurt my knee running").is_none());
        assert!(crisis_phrase("The film's ending was sad").is_none());
        assert!(crisis_phrase("").is_none());
    }

    #[test]
    fn test_candidate_saliences() {
        let emotion = EmotionSignal::new(EmotionLabel::Joy, 0.8);
        let c = candidates("Why is music music?", &emotion, None, 4);
        let music = c.iter().find(|c| c.id == "music").unwrap();
        assert!((music.salience - 1.0).abs() < 1e-6);
        assert_eq!(music.introduced_at, Some(4));
        assert_eq!(music.source, ConceptSource::Input);

        let joy = c.iter().find(|c| c.id == "joy").unwrap();
        assert_eq!(joy.source, ConceptSource::Internal);
        assert!((joy.salience - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_neutral_emotion_adds_no_concept() {
        let c = candidates("plain words here", &EmotionSignal::neutral(0.9), None, 0);
        assert!(c.iter().all(|c| c.source == ConceptSource::Input));
        assert!(c.iter().all(|c| (c.salience - STATEMENT_SALIENCE).abs() < 1e-6));
    }

    #[test]
    fn test_reflection_keywords_carry_level_salience() {
        let node = ReflectionNode {
            level: 2,
            kind: ReflectionKind::Evaluation,
            summary: "curiosity dominates judgment".to_string(),
            confidence: 0.6,
        };
        let c = candidates("", &EmotionSignal::default(), Some(&node), 1);
        assert_eq!(c.len(), 3);
        for concept in &c {
            assert_eq!(concept.source, ConceptSource::Internal);
            assert!((concept.salience - 0.5).abs() < 1e-6);
        }
        assert!((reflection_salience(10) - 0.3).abs() < 1e-6);
    }
}
