//! Neurochemical affect model state.
//!
//! Instead of a single valence/arousal point, affect is a vector of five named
//! "chemical" levels, each bounded to [0, 1]. The set of chemicals is closed:
//! every [`AffectState`] carries exactly one level per [`Chemical`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// The closed set of simulated neurochemical signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Chemical {
    /// Motivation, reward
    Dopamine,
    /// Mood stability
    Serotonin,
    /// Alertness, arousal
    Norepinephrine,
    /// Social bonding, empathy
    Oxytocin,
    /// Stress response
    Cortisol,
}

impl Chemical {
    pub const COUNT: usize = 5;

    pub const ALL: [Chemical; Chemical::COUNT] = [
        Chemical::Dopamine,
        Chemical::Serotonin,
        Chemical::Norepinephrine,
        Chemical::Oxytocin,
        Chemical::Cortisol,
    ];

    #[inline]
    fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Chemical::Dopamine => "dopamine",
            Chemical::Serotonin => "serotonin",
            Chemical::Norepinephrine => "norepinephrine",
            Chemical::Oxytocin => "oxytocin",
            Chemical::Cortisol => "cortisol",
        }
    }

    /// What the level stands for, for status displays.
    pub fn role(self) -> &'static str {
        match self {
            Chemical::Dopamine => "motivation",
            Chemical::Serotonin => "mood",
            Chemical::Norepinephrine => "alertness",
            Chemical::Oxytocin => "empathy",
            Chemical::Cortisol => "stress",
        }
    }
}

impl fmt::Display for Chemical {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Guard against NaN and Infinity in affect values.
/// Non-finite values are replaced by the fallback (the homeostatic baseline).
#[inline]
fn sanitize_level(v: f32, fallback: f32) -> f32 {
    if v.is_finite() {
        v
    } else {
        tracing::warn!("NaN/Inf detected in affect level, resetting to {}", fallback);
        fallback
    }
}

/// Snapshot of all chemical levels. Every value is within [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<Chemical, f32>",
    into = "BTreeMap<Chemical, f32>"
)]
pub struct AffectState {
    levels: [f32; Chemical::COUNT],
}

impl Default for AffectState {
    /// Homeostatic baseline: everything balanced, stress slightly low.
    fn default() -> Self {
        Self {
            levels: [0.5, 0.5, 0.5, 0.5, 0.3],
        }
    }
}

impl AffectState {
    /// Every chemical at the same level (clamped).
    pub fn uniform(level: f32) -> Self {
        let level = sanitize_level(level, 0.5).clamp(0.0, 1.0);
        Self {
            levels: [level; Chemical::COUNT],
        }
    }

    /// Build a state from unchecked values. Non-finite entries fall back to
    /// the matching level in `fallback`; everything is clamped to [0, 1].
    pub fn from_unclamped(raw: [f32; Chemical::COUNT], fallback: &AffectState) -> Self {
        let mut levels = [0.0; Chemical::COUNT];
        for (i, value) in raw.iter().enumerate() {
            levels[i] = sanitize_level(*value, fallback.levels[i]).clamp(0.0, 1.0);
        }
        Self { levels }
    }

    pub fn get(&self, chemical: Chemical) -> f32 {
        self.levels[chemical.index()]
    }

    pub fn set(&mut self, chemical: Chemical, level: f32) {
        let fallback = self.levels[chemical.index()];
        self.levels[chemical.index()] = sanitize_level(level, fallback).clamp(0.0, 1.0);
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(mut self, chemical: Chemical, level: f32) -> Self {
        self.set(chemical, level);
        self
    }

    pub fn as_array(&self) -> [f32; Chemical::COUNT] {
        self.levels
    }

    pub fn iter(&self) -> impl Iterator<Item = (Chemical, f32)> + '_ {
        Chemical::ALL
            .into_iter()
            .map(move |c| (c, self.levels[c.index()]))
    }

    /// Euclidean distance between two states.
    pub fn distance(&self, other: &AffectState) -> f32 {
        self.levels
            .iter()
            .zip(other.levels.iter())
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f32>()
            .sqrt()
    }

    pub fn is_within_bounds(&self) -> bool {
        self.levels
            .iter()
            .all(|v| v.is_finite() && (0.0..=1.0).contains(v))
    }
}

impl TryFrom<BTreeMap<Chemical, f32>> for AffectState {
    type Error = String;

    fn try_from(map: BTreeMap<Chemical, f32>) -> Result<Self, Self::Error> {
        let mut raw = [0.0; Chemical::COUNT];
        for chemical in Chemical::ALL {
            raw[chemical.index()] = *map
                .get(&chemical)
                .ok_or_else(|| format!("missing level for {}", chemical))?;
        }
        Ok(Self::from_unclamped(raw, &AffectState::default()))
    }
}

impl From<AffectState> for BTreeMap<Chemical, f32> {
    fn from(state: AffectState) -> Self {
        state.iter().collect()
    }
}

// =============================================================================
// Sparse per-chemical maps (deltas, gains)
// =============================================================================

/// Sparse map from chemical to a signed scalar. Used both for deltas applied
/// to affect levels and for per-chemical gains in lookup tables. Missing
/// chemicals read as 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignalMap(BTreeMap<Chemical, f32>);

/// A change to apply to affect levels.
pub type AffectDelta = SignalMap;

impl SignalMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, chemical: Chemical, value: f32) -> Self {
        self.0.insert(chemical, value);
        self
    }

    pub fn get(&self, chemical: Chemical) -> f32 {
        self.0.get(&chemical).copied().unwrap_or(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(|v| *v == 0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Chemical, f32)> + '_ {
        self.0.iter().map(|(c, v)| (*c, *v))
    }

    /// Every entry multiplied by `factor`.
    pub fn scaled(&self, factor: f32) -> Self {
        Self(self.0.iter().map(|(c, v)| (*c, v * factor)).collect())
    }

    /// True when every entry is finite.
    pub fn is_finite(&self) -> bool {
        self.0.values().all(|v| v.is_finite())
    }
}

impl FromIterator<(Chemical, f32)> for SignalMap {
    fn from_iter<I: IntoIterator<Item = (Chemical, f32)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// =============================================================================
// Emotion labels and signals
// =============================================================================

/// Emotion labels an external classifier may report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmotionLabel {
    Joy,
    Happiness,
    Sadness,
    Anger,
    Fear,
    Anxiety,
    Surprise,
    Love,
    Affection,
    Trust,
    Excitement,
    Disgust,
    Neutral,
}

impl EmotionLabel {
    pub const ALL: [EmotionLabel; 13] = [
        EmotionLabel::Joy,
        EmotionLabel::Happiness,
        EmotionLabel::Sadness,
        EmotionLabel::Anger,
        EmotionLabel::Fear,
        EmotionLabel::Anxiety,
        EmotionLabel::Surprise,
        EmotionLabel::Love,
        EmotionLabel::Affection,
        EmotionLabel::Trust,
        EmotionLabel::Excitement,
        EmotionLabel::Disgust,
        EmotionLabel::Neutral,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EmotionLabel::Joy => "joy",
            EmotionLabel::Happiness => "happiness",
            EmotionLabel::Sadness => "sadness",
            EmotionLabel::Anger => "anger",
            EmotionLabel::Fear => "fear",
            EmotionLabel::Anxiety => "anxiety",
            EmotionLabel::Surprise => "surprise",
            EmotionLabel::Love => "love",
            EmotionLabel::Affection => "affection",
            EmotionLabel::Trust => "trust",
            EmotionLabel::Excitement => "excitement",
            EmotionLabel::Disgust => "disgust",
            EmotionLabel::Neutral => "neutral",
        }
    }
}

impl fmt::Display for EmotionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EmotionLabel {
    type Err = String;

    /// Case-insensitive parse of a classifier label.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        EmotionLabel::ALL
            .iter()
            .copied()
            .find(|label| label.name() == wanted)
            .ok_or_else(|| format!("unknown emotion label: {}", s))
    }
}

/// Output of emotion classification: a label and a confidence in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmotionSignal {
    pub label: EmotionLabel,
    pub confidence: f32,
}

impl Default for EmotionSignal {
    fn default() -> Self {
        Self::neutral(0.5)
    }
}

impl EmotionSignal {
    /// Confidence is clamped; NaN reads as zero confidence.
    pub fn new(label: EmotionLabel, confidence: f32) -> Self {
        Self {
            label,
            confidence: sanitize_level(confidence, 0.0).clamp(0.0, 1.0),
        }
    }

    pub fn neutral(confidence: f32) -> Self {
        Self::new(EmotionLabel::Neutral, confidence)
    }
}

/// Everything the affect model consumes in one update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputSignal {
    /// External emotion classification of the input text.
    pub emotion: EmotionSignal,
    /// Direct delta from internal feedback (e.g. low reflection confidence).
    pub feedback: Option<AffectDelta>,
}

impl InputSignal {
    pub fn from_emotion(emotion: EmotionSignal) -> Self {
        Self {
            emotion,
            feedback: None,
        }
    }

    pub fn with_feedback(mut self, feedback: AffectDelta) -> Self {
        self.feedback = Some(feedback);
        self
    }
}
