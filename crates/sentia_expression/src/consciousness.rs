//! Consciousness metrics: deterministic scalar summaries of a turn's state.
//!
//! None of these measure consciousness. They are functions of the working
//! set, the reflection chain and a bounded tail of the affect history, kept
//! stable so runs can be compared.
//!
//! - `globalAvailability`: share of attended concepts that made it into the
//!   top reflection summary
//! - `metaDepth`: reflection levels reached
//! - `temporalBinding`: mean Jaccard overlap of consecutive working sets over
//!   the trailing window; undefined on the first turn
//! - `reportability`: confidence of the top reflection level
//! - `phi`: co-movement of the chemicals over the trailing window,
//!   `max(0, Var(Σ x_c) − Σ Var(x_c)) / N`. A proxy, not IIT Φ.

use sentia_core::{
    AffectState, AttendedConcept, Chemical, MetricWeights, MetricsSet, SessionConfig, TurnRecord,
    TurnState,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::LazyLock;

static RE_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\p{L}\p{N}]+").unwrap());

#[derive(Debug, Clone)]
pub struct MetricsCalculator {
    weights: MetricWeights,
    window: usize,
    max_depth: usize,
}

impl MetricsCalculator {
    pub fn new(weights: MetricWeights, window: usize, max_depth: usize) -> Self {
        Self {
            weights,
            window: window.max(1),
            max_depth: max_depth.max(1),
        }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(
            config.metric_weights.clone(),
            config.metrics_window,
            config.max_recursion_depth,
        )
    }

    /// Score `turn` against the history that precedes it.
    pub fn compute(&self, turn: &TurnState, history: &[TurnRecord]) -> MetricsSet {
        let top = turn.reflection_chain.top();
        let summary = top.map(|n| n.summary.as_str()).unwrap_or("");

        let global_availability = global_availability(&turn.attention, summary);
        let meta_depth = turn.reflection_chain.len();
        let temporal_binding = self.temporal_binding(&turn.attention, history);
        let reportability = top.map(|n| n.confidence).unwrap_or(0.0);
        let phi = self.phi(&turn.affect, history);

        let mut metrics = MetricsSet {
            global_availability,
            meta_depth,
            temporal_binding,
            reportability,
            phi,
            overall: 0.0,
            evictions: turn.evicted.len(),
        };
        metrics.overall = self.overall(&metrics);
        metrics
    }

    fn temporal_binding(&self, current: &[AttendedConcept], history: &[TurnRecord]) -> Option<f32> {
        if history.is_empty() {
            return None;
        }
        let start = history.len().saturating_sub(self.window);
        let mut sets: Vec<BTreeSet<&str>> = history[start..]
            .iter()
            .map(|record| record.attention_ids().collect())
            .collect();
        sets.push(current.iter().map(|a| a.id()).collect());

        let overlaps: Vec<f32> = sets.windows(2).map(|w| jaccard(&w[0], &w[1])).collect();
        Some(mean(&overlaps))
    }

    fn phi(&self, current: &AffectState, history: &[TurnRecord]) -> f32 {
        let start = history.len().saturating_sub(self.window - 1);
        let mut samples: Vec<[f32; Chemical::COUNT]> = history[start..]
            .iter()
            .map(|record| record.affect.as_array())
            .collect();
        samples.push(current.as_array());
        co_movement(&samples)
    }

    fn overall(&self, m: &MetricsSet) -> f32 {
        let w = &self.weights;
        let mut terms = vec![
            (w.global_availability, m.global_availability),
            (w.meta_depth, m.meta_depth as f32 / self.max_depth as f32),
            (w.reportability, m.reportability),
            (w.phi, m.phi.min(1.0)),
        ];
        if let Some(binding) = m.temporal_binding {
            terms.push((w.temporal_binding, binding));
        }

        let total_weight: f32 = terms.iter().map(|(w, _)| w).sum();
        if total_weight <= 0.0 {
            return 0.0;
        }
        let weighted: f32 = terms.iter().map(|(w, v)| w * v).sum();
        (weighted / total_weight).clamp(0.0, 1.0)
    }
}

fn tokens(text: &str) -> Vec<String> {
    RE_TOKEN
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .collect()
}

/// Share of attended concepts whose id occurs in `summary` as whole tokens.
fn global_availability(attention: &[AttendedConcept], summary: &str) -> f32 {
    if attention.is_empty() {
        return 0.0;
    }
    let summary = tokens(summary);
    let reported = attention
        .iter()
        .filter(|a| {
            let id = tokens(a.id());
            !id.is_empty() && summary.windows(id.len()).any(|w| w == id.as_slice())
        })
        .count();
    reported as f32 / attention.len() as f32
}

fn jaccard(a: &BTreeSet<&str>, b: &BTreeSet<&str>) -> f32 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f32 / union as f32
}

fn mean(values: &[f32]) -> f32 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f32>() / values.len() as f32
    }
}

fn variance(values: impl Iterator<Item = f32> + Clone) -> f32 {
    let n = values.clone().count();
    if n == 0 {
        return 0.0;
    }
    let mean = values.clone().sum::<f32>() / n as f32;
    values.map(|v| (v - mean).powi(2)).sum::<f32>() / n as f32
}

/// Excess variance of the summed signal over the summed per-chemical
/// variances, per chemical. Zero for fewer than two samples.
fn co_movement(samples: &[[f32; Chemical::COUNT]]) -> f32 {
    if samples.len() < 2 {
        return 0.0;
    }
    let total_var = variance(samples.iter().map(|s| s.iter().sum::<f32>()));
    let parts_var: f32 = (0..Chemical::COUNT)
        .map(|c| variance(samples.iter().map(move |s| s[c])))
        .sum();
    let phi = (total_var - parts_var).max(0.0) / Chemical::COUNT as f32;
    if phi.is_finite() {
        phi
    } else {
        0.0
    }
}

// =============================================================================
// History summary
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Rising,
    Falling,
    Stable,
    InsufficientData,
}

/// Averages over the most recent turns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSummary {
    pub turns: usize,
    pub global_availability: f32,
    pub meta_depth: f32,
    pub temporal_binding: Option<f32>,
    pub reportability: f32,
    pub phi: f32,
    pub overall: f32,
    pub evictions: usize,
    pub trend: Trend,
}

const TREND_EPSILON: f32 = 0.05;

/// Summarize the last `recent_n` records.
pub fn summarize(history: &[TurnRecord], recent_n: usize) -> MetricsSummary {
    let start = history.len().saturating_sub(recent_n);
    let recent = &history[start..];
    let metrics: Vec<&MetricsSet> = recent.iter().map(|r| &r.metrics).collect();

    let avg = |f: fn(&MetricsSet) -> f32| -> f32 {
        mean(&metrics.iter().map(|m| f(m)).collect::<Vec<_>>())
    };
    let bindings: Vec<f32> = metrics.iter().filter_map(|m| m.temporal_binding).collect();

    let trend = if metrics.len() < 3 {
        Trend::InsufficientData
    } else {
        let first = metrics[0].overall;
        let last = metrics[metrics.len() - 1].overall;
        if (last - first).abs() < TREND_EPSILON {
            Trend::Stable
        } else if last > first {
            Trend::Rising
        } else {
            Trend::Falling
        }
    };

    MetricsSummary {
        turns: recent.len(),
        global_availability: avg(|m| m.global_availability),
        meta_depth: avg(|m| m.meta_depth as f32),
        temporal_binding: if bindings.is_empty() {
            None
        } else {
            Some(mean(&bindings))
        },
        reportability: avg(|m| m.reportability),
        phi: avg(|m| m.phi),
        overall: avg(|m| m.overall),
        evictions: metrics.iter().map(|m| m.evictions).sum(),
        trend,
    }
}
