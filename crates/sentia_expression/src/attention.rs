//! Global-workspace attention: competition for a bounded working set.
//!
//! Every turn the previous working set and the fresh candidates compete on
//! effective salience (raw salience × affect weight). Only the top
//! `capacity` concepts become available to reflection. Ordering is total:
//! effective salience (high first), then recency of introduction (missing
//! timestamp counts as oldest), then source (input before internal), then
//! identifier ascending.

use sentia_core::{
    AffectState, AttendedConcept, AttentionClass, Concept, ConceptSource, SalienceTable,
    SessionConfig,
};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Outcome of one selection round.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    /// Winners, best first. Never longer than the capacity.
    pub working_set: Vec<AttendedConcept>,
    /// Previously attended concepts that faded below the floor or lost.
    pub evicted: Vec<Concept>,
}

#[derive(Debug, Clone)]
pub struct AttentionSelector {
    table: SalienceTable,
    decay: f32,
    floor: f32,
}

/// A contender before ranking.
struct Entry {
    concept: Concept,
    class: AttentionClass,
    carried: bool,
    was_attended: bool,
    effective: f32,
}

impl AttentionSelector {
    pub fn new(table: SalienceTable, decay: f32, floor: f32) -> Self {
        Self {
            table,
            decay: decay.clamp(0.0, 1.0),
            floor: floor.clamp(0.0, 1.0),
        }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(
            config.salience_table.clone(),
            config.attention_decay,
            config.attention_floor,
        )
    }

    pub fn select(
        &self,
        previous: &[AttendedConcept],
        candidates: Vec<Concept>,
        affect: &AffectState,
        capacity: usize,
        turn: u64,
    ) -> Selection {
        let mut fresh = dedupe(candidates, turn);
        let mut evicted = Vec::new();
        let mut entries: Vec<Entry> = Vec::with_capacity(previous.len() + fresh.len());

        for attended in previous {
            let mut concept = attended.concept.clone();
            concept.salience = (concept.salience * (1.0 - self.decay)).clamp(0.0, 1.0);

            if let Some(mut candidate) = fresh.remove(&concept.id) {
                // Re-mentioned: refresh under the candidate's class.
                candidate.salience = candidate.salience.max(concept.salience);
                let class = class_of(candidate.source);
                entries.push(Entry {
                    concept: candidate,
                    class,
                    carried: false,
                    was_attended: true,
                    effective: 0.0,
                });
            } else if concept.salience < self.floor {
                tracing::debug!("Attention: '{}' faded out", concept.id);
                evicted.push(concept);
            } else {
                entries.push(Entry {
                    concept,
                    class: AttentionClass::Carried,
                    carried: true,
                    was_attended: true,
                    effective: 0.0,
                });
            }
        }

        entries.extend(fresh.into_values().map(|concept| Entry {
            class: class_of(concept.source),
            concept,
            carried: false,
            was_attended: false,
            effective: 0.0,
        }));

        for entry in &mut entries {
            entry.effective = entry.concept.salience * self.table.weight(entry.class, affect);
        }
        entries.sort_by(rank);

        let mut working_set = Vec::with_capacity(capacity.min(entries.len()));
        for entry in entries {
            if working_set.len() < capacity {
                working_set.push(AttendedConcept {
                    concept: entry.concept,
                    effective_salience: entry.effective,
                    carried: entry.carried,
                });
            } else if entry.was_attended {
                tracing::debug!("Attention: '{}' lost its place", entry.concept.id);
                evicted.push(entry.concept);
            }
        }

        tracing::debug!(
            "Attention: selected [{}], evicted {}",
            working_set
                .iter()
                .map(|a| a.id())
                .collect::<Vec<_>>()
                .join(", "),
            evicted.len()
        );

        Selection {
            working_set,
            evicted,
        }
    }
}

fn class_of(source: ConceptSource) -> AttentionClass {
    match source {
        ConceptSource::Input => AttentionClass::Input,
        ConceptSource::Internal => AttentionClass::Internal,
    }
}

/// Collapse duplicate identifiers to the most salient candidate; stamp the
/// introduction turn where missing.
fn dedupe(candidates: Vec<Concept>, turn: u64) -> BTreeMap<String, Concept> {
    let mut unique: BTreeMap<String, Concept> = BTreeMap::new();
    for mut candidate in candidates {
        if candidate.id.is_empty() {
            continue;
        }
        candidate.introduced_at.get_or_insert(turn);
        match unique.get(&candidate.id) {
            Some(existing) if !beats(&candidate, existing) => {}
            _ => {
                unique.insert(candidate.id.clone(), candidate);
            }
        }
    }
    unique
}

fn beats(a: &Concept, b: &Concept) -> bool {
    match a.salience.total_cmp(&b.salience) {
        Ordering::Greater => true,
        Ordering::Less => false,
        Ordering::Equal => a.source.priority() > b.source.priority(),
    }
}

fn rank(a: &Entry, b: &Entry) -> Ordering {
    b.effective
        .total_cmp(&a.effective)
        .then_with(|| b.concept.introduced_at.cmp(&a.concept.introduced_at))
        .then_with(|| b.concept.source.priority().cmp(&a.concept.source.priority()))
        .then_with(|| a.concept.id.cmp(&b.concept.id))
}
