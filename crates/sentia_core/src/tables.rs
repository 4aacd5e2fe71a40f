//! Lookup tables that parameterize the engine.
//!
//! All of them live in [`SessionConfig`](crate::SessionConfig) so ablations
//! can swap them without touching code.

use crate::affect::{AffectState, Chemical, EmotionLabel, SignalMap};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// Emotion → affect delta
// =============================================================================

/// Per-label delta applied (scaled by classifier confidence) on every update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmotionTable(BTreeMap<EmotionLabel, SignalMap>);

impl Default for EmotionTable {
    fn default() -> Self {
        use Chemical::*;
        let pleasure = SignalMap::new()
            .with(Dopamine, 0.3)
            .with(Serotonin, 0.2)
            .with(Oxytocin, 0.1)
            .with(Cortisol, -0.1);

        let entries = [
            (EmotionLabel::Joy, pleasure.clone()),
            (EmotionLabel::Happiness, pleasure),
            (
                EmotionLabel::Sadness,
                SignalMap::new()
                    .with(Serotonin, -0.3)
                    .with(Dopamine, -0.2)
                    .with(Cortisol, 0.2),
            ),
            (
                EmotionLabel::Anger,
                SignalMap::new()
                    .with(Norepinephrine, 0.4)
                    .with(Cortisol, 0.3)
                    .with(Serotonin, -0.2)
                    .with(Dopamine, -0.15),
            ),
            (
                EmotionLabel::Fear,
                SignalMap::new()
                    .with(Cortisol, 0.4)
                    .with(Norepinephrine, 0.3)
                    .with(Serotonin, -0.1),
            ),
            (
                EmotionLabel::Anxiety,
                SignalMap::new()
                    .with(Cortisol, 0.35)
                    .with(Norepinephrine, 0.2)
                    .with(Serotonin, -0.15),
            ),
            (
                EmotionLabel::Surprise,
                SignalMap::new()
                    .with(Norepinephrine, 0.2)
                    .with(Dopamine, 0.15),
            ),
            (
                EmotionLabel::Love,
                SignalMap::new()
                    .with(Oxytocin, 0.4)
                    .with(Dopamine, 0.2)
                    .with(Serotonin, 0.1),
            ),
            (
                EmotionLabel::Affection,
                SignalMap::new().with(Oxytocin, 0.3).with(Serotonin, 0.1),
            ),
            (
                EmotionLabel::Trust,
                SignalMap::new().with(Oxytocin, 0.25).with(Serotonin, 0.1),
            ),
            (
                EmotionLabel::Excitement,
                SignalMap::new()
                    .with(Dopamine, 0.3)
                    .with(Norepinephrine, 0.2),
            ),
            (
                EmotionLabel::Disgust,
                SignalMap::new().with(Serotonin, -0.2).with(Cortisol, 0.15),
            ),
            (EmotionLabel::Neutral, SignalMap::new()),
        ];
        Self(entries.into_iter().collect())
    }
}

impl EmotionTable {
    /// A table in which no label moves affect at all.
    pub fn zeroed() -> Self {
        Self(
            EmotionLabel::ALL
                .into_iter()
                .map(|label| (label, SignalMap::new()))
                .collect(),
        )
    }

    /// Delta for a label; `None` if the table has no row for it.
    pub fn delta_for(&self, label: EmotionLabel) -> Option<&SignalMap> {
        self.0.get(&label)
    }

    pub fn set(&mut self, label: EmotionLabel, delta: SignalMap) {
        self.0.insert(label, delta);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EmotionLabel, &SignalMap)> {
        self.0.iter()
    }
}

// =============================================================================
// Attention class → salience gain
// =============================================================================

/// How a concept enters the selection for the current turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttentionClass {
    /// Fresh candidate extracted from the input
    Input,
    /// Fresh candidate produced internally
    Internal,
    /// Survivor of the previous working set that was not re-mentioned
    Carried,
}

/// Affect-dependent weighting of raw salience.
///
/// `weight = max(0, 1 + Σ gain_c × (level_c − pivot))`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SalienceTable {
    pub pivot: f32,
    pub gains: BTreeMap<AttentionClass, SignalMap>,
}

impl Default for SalienceTable {
    fn default() -> Self {
        use Chemical::*;
        let mut gains = BTreeMap::new();
        gains.insert(
            AttentionClass::Input,
            SignalMap::new().with(Norepinephrine, 0.6).with(Dopamine, 0.2),
        );
        gains.insert(
            AttentionClass::Internal,
            SignalMap::new().with(Oxytocin, 0.2).with(Dopamine, 0.1),
        );
        gains.insert(
            AttentionClass::Carried,
            SignalMap::new().with(Serotonin, 0.6),
        );
        Self { pivot: 0.5, gains }
    }
}

impl SalienceTable {
    /// No affect modulation: every weight is exactly 1.
    pub fn neutral() -> Self {
        Self {
            pivot: 0.5,
            gains: BTreeMap::new(),
        }
    }

    pub fn weight(&self, class: AttentionClass, affect: &AffectState) -> f32 {
        let Some(gains) = self.gains.get(&class) else {
            return 1.0;
        };
        let shift: f32 = gains
            .iter()
            .map(|(chemical, gain)| gain * (affect.get(chemical) - self.pivot))
            .sum();
        let weight = 1.0 + shift;
        if weight.is_finite() {
            weight.max(0.0)
        } else {
            1.0
        }
    }

    pub fn is_finite(&self) -> bool {
        self.pivot.is_finite() && self.gains.values().all(SignalMap::is_finite)
    }
}
