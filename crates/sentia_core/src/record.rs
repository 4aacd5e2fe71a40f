//! Per-turn history records.

use crate::affect::AffectState;
use crate::concept::{AttendedConcept, Concept};
use crate::reflection::ReflectionChain;
use serde::{Deserialize, Serialize};

/// Something out of the ordinary that happened during a turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TurnMarker {
    /// The classifier failed; the neutral signal was used instead.
    ClassificationFallback { reason: String },
    /// The reflection chain stopped early on a collaborator failure.
    ReflectionTruncated { level: usize },
    /// The reply call exceeded its deadline.
    GenerationTimeout,
    /// The reply call failed.
    GenerationFailed { reason: String },
    /// The input mentioned self-harm; the reply was the fixed crisis
    /// response instead of a generated one.
    CrisisIntervention { matched: String },
}

/// Scalar summaries of one turn's state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSet {
    pub global_availability: f32,
    pub meta_depth: usize,
    /// `None` on the first turn.
    pub temporal_binding: Option<f32>,
    pub reportability: f32,
    pub phi: f32,
    pub overall: f32,
    pub evictions: usize,
}

/// Everything about a turn except its metrics: the input the calculator
/// scores.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnState {
    pub turn_index: u64,
    pub input: String,
    pub reply: Option<String>,
    pub affect: AffectState,
    pub attention: Vec<AttendedConcept>,
    pub evicted: Vec<Concept>,
    pub reflection_chain: ReflectionChain,
    pub markers: Vec<TurnMarker>,
}

impl TurnState {
    pub fn into_record(self, metrics: MetricsSet) -> TurnRecord {
        TurnRecord {
            turn_index: self.turn_index,
            input: self.input,
            reply: self.reply,
            affect: self.affect,
            attention: self.attention,
            evicted: self.evicted,
            reflection_chain: self.reflection_chain,
            markers: self.markers,
            metrics,
        }
    }
}

/// Immutable entry of the append-only session history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnRecord {
    pub turn_index: u64,
    pub input: String,
    pub reply: Option<String>,
    pub affect: AffectState,
    pub attention: Vec<AttendedConcept>,
    pub evicted: Vec<Concept>,
    pub reflection_chain: ReflectionChain,
    pub markers: Vec<TurnMarker>,
    pub metrics: MetricsSet,
}

impl TurnRecord {
    pub fn attention_ids(&self) -> impl Iterator<Item = &str> {
        self.attention.iter().map(|a| a.id())
    }

    pub fn has_marker(&self, predicate: impl Fn(&TurnMarker) -> bool) -> bool {
        self.markers.iter().any(predicate)
    }
}
