//! # Sentia Core
//!
//! Shared data model for the cognitive-affective state engine:
//!
//! - **Affect**: five bounded neurochemical levels ([`AffectState`])
//! - **Attention**: salience-bearing [`Concept`]s and the attended working set
//! - **Meta-cognition**: the strictly linear [`ReflectionChain`]
//! - **History**: immutable [`TurnRecord`]s with their [`MetricsSet`]
//!
//! Behaviour lives in the layer crates (`sentia_limbic`, `sentia_expression`,
//! `sentia_reasoning`); this crate only defines what they exchange, plus the
//! configuration, lookup tables and collaborator traits they share.

pub mod affect;
pub mod collab;
pub mod concept;
pub mod config;
pub mod error;
pub mod export;
pub mod record;
pub mod reflection;
pub mod tables;

pub use affect::{AffectDelta, AffectState, Chemical, EmotionLabel, EmotionSignal, InputSignal, SignalMap};
pub use collab::{EmotionClassifier, GenerationContext, GenerationPurpose, TextGenerator};
pub use concept::{AttendedConcept, Concept, ConceptSource};
pub use config::{LlmConfig, MetricWeights, SentiaConfig, SessionConfig};
pub use error::{EngineError, Result};
pub use record::{MetricsSet, TurnMarker, TurnRecord, TurnState};
pub use reflection::{ReflectionChain, ReflectionKind, ReflectionNode, Termination};
pub use tables::{AttentionClass, EmotionTable, SalienceTable};
