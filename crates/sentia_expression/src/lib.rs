//! # Sentia Expression Layer
//!
//! What the agent makes of its state each turn:
//!
//! - [`AttentionSelector`]: affect-weighted competition for the working set
//! - [`MetaCognitionController`]: bounded, strictly linear self-reflection
//! - [`MetricsCalculator`]: per-turn scalar metrics over the state history

mod attention;
mod consciousness;
mod metacognition;

pub use attention::{AttentionSelector, Selection};
pub use consciousness::{summarize, MetricsCalculator, MetricsSummary, Trend};
pub use metacognition::{affect_confidence, interpret, parse_confidence, MetaCognitionController};
