//! The per-turn chain of self-reflection levels.
//!
//! The chain is strictly linear: it is a `Vec` indexed by level, and the
//! parent of level `k` is `k - 1`.

use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReflectionKind {
    /// Level 0: judgment of the working set itself
    Base,
    /// Level 1: what was noticed about the base judgment
    Observation,
    /// Level 2: how good the observation is
    Evaluation,
    /// Level 3: why the agent thinks the way it does
    Introspection,
    /// Deeper levels
    Meta,
}

impl ReflectionKind {
    pub fn for_level(level: usize) -> Self {
        match level {
            0 => ReflectionKind::Base,
            1 => ReflectionKind::Observation,
            2 => ReflectionKind::Evaluation,
            3 => ReflectionKind::Introspection,
            _ => ReflectionKind::Meta,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReflectionNode {
    pub level: usize,
    pub kind: ReflectionKind,
    pub summary: String,
    pub confidence: f32,
}

/// Why the chain stopped growing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Termination {
    /// Still being built
    Open,
    ConfidenceReached,
    DepthExhausted,
    GenerationTimeout { level: usize },
    GenerationFailed { level: usize, reason: String },
}

impl Termination {
    /// True when a collaborator failure cut the chain short.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Termination::GenerationTimeout { .. } | Termination::GenerationFailed { .. }
        )
    }

    /// Level at which a failure occurred.
    pub fn failed_level(&self) -> Option<usize> {
        match self {
            Termination::GenerationTimeout { level } => Some(*level),
            Termination::GenerationFailed { level, .. } => Some(*level),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReflectionChain {
    max_depth: usize,
    nodes: Vec<ReflectionNode>,
    termination: Termination,
}

impl ReflectionChain {
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth,
            nodes: Vec::with_capacity(max_depth),
            termination: Termination::Open,
        }
    }

    /// Append the next level. Exceeding `max_depth` is a defect in the caller.
    pub fn push(&mut self, summary: String, confidence: f32) -> Result<&ReflectionNode> {
        let level = self.nodes.len();
        if level >= self.max_depth {
            return Err(EngineError::RecursionDepthExceeded {
                depth: level + 1,
                max: self.max_depth,
            });
        }
        let confidence = if confidence.is_finite() {
            confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.nodes.push(ReflectionNode {
            level,
            kind: ReflectionKind::for_level(level),
            summary,
            confidence,
        });
        Ok(&self.nodes[level])
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn nodes(&self) -> &[ReflectionNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Deepest level reached.
    pub fn top(&self) -> Option<&ReflectionNode> {
        self.nodes.last()
    }

    pub fn parent_of(&self, level: usize) -> Option<&ReflectionNode> {
        level.checked_sub(1).and_then(|p| self.nodes.get(p))
    }

    pub fn termination(&self) -> &Termination {
        &self.termination
    }

    pub fn terminate(&mut self, reason: Termination) {
        self.termination = reason;
    }
}
