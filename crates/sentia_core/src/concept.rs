//! Salience-bearing units competing for the attention working set.

use serde::{Deserialize, Serialize};

/// Where a concept came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConceptSource {
    /// Extracted from the user's input text
    Input,
    /// Produced by the engine itself (emotion label, prior reflection)
    Internal,
}

impl ConceptSource {
    /// Tie-break priority: input beats internal.
    pub fn priority(self) -> u8 {
        match self {
            ConceptSource::Input => 1,
            ConceptSource::Internal => 0,
        }
    }
}

/// A candidate for attention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Concept {
    /// Normalized identifier (trimmed, lowercase).
    pub id: String,
    pub source: ConceptSource,
    /// Raw salience in [0, 1], before affect weighting.
    pub salience: f32,
    /// Turn index at which the concept was (last) introduced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub introduced_at: Option<u64>,
}

impl Concept {
    pub fn new(id: &str, source: ConceptSource, salience: f32) -> Self {
        let salience = if salience.is_finite() { salience } else { 0.0 };
        Self {
            id: normalize_id(id),
            source,
            salience: salience.clamp(0.0, 1.0),
            introduced_at: None,
        }
    }

    pub fn input(id: &str, salience: f32) -> Self {
        Self::new(id, ConceptSource::Input, salience)
    }

    pub fn internal(id: &str, salience: f32) -> Self {
        Self::new(id, ConceptSource::Internal, salience)
    }

    pub fn introduced(mut self, turn: u64) -> Self {
        self.introduced_at = Some(turn);
        self
    }
}

/// Identifiers compare case-insensitively; store them lowercase.
pub fn normalize_id(id: &str) -> String {
    id.trim().to_lowercase()
}

/// A concept that won a place in the working set for one turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendedConcept {
    #[serde(flatten)]
    pub concept: Concept,
    /// Raw salience × affect weight at selection time.
    pub effective_salience: f32,
    /// Survived from the previous working set without being re-mentioned.
    pub carried: bool,
}

impl AttendedConcept {
    pub fn id(&self) -> &str {
        &self.concept.id
    }
}
