//! Property-based tests for the turn pipeline and concept extraction.
//!
//! Whole conversations are driven with arbitrary inputs, emotion signals and
//! scripted generator outcomes; the per-turn invariants must hold for every
//! record regardless of which collaborators failed.

use proptest::prelude::*;
use sentia_core::{EmotionLabel, EmotionSignal, EngineError, SessionConfig};
use sentia_reasoning::extraction::{candidates, extract_keywords};
use sentia_reasoning::providers::mock::{FixedClassifier, ScriptedGenerator};
use sentia_reasoning::Session;
use std::sync::Arc;

// ============================================================================
// Strategies
// ============================================================================

fn arb_signal() -> impl Strategy<Value = EmotionSignal> {
    (0..EmotionLabel::ALL.len(), 0.0f32..=1.0)
        .prop_map(|(i, c)| EmotionSignal::new(EmotionLabel::ALL[i], c))
}

/// A generator outcome: 0 = confidence-tagged text, 1 = untagged text,
/// 2 = failure.
fn arb_outcome() -> impl Strategy<Value = (u8, f32)> {
    (0u8..3, 0.0f32..=1.0)
}

fn outcome((kind, confidence): (u8, f32)) -> sentia_core::Result<String> {
    match kind {
        0 => Ok(format!("Thinking it over. confidence: {:.2}", confidence)),
        1 => Ok("no marker here at all".to_string()),
        _ => Err(EngineError::GenerationError("scripted".to_string())),
    }
}

fn arb_config() -> impl Strategy<Value = SessionConfig> {
    (1usize..5, 1usize..5, 0.0f32..=1.0).prop_map(|(depth, capacity, threshold)| SessionConfig {
        max_recursion_depth: depth,
        attention_capacity: capacity,
        confidence_threshold: threshold,
        ..SessionConfig::default()
    })
}

// ============================================================================
// Pipeline invariants
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn every_turn_respects_invariants(
        config in arb_config(),
        signal in arb_signal(),
        outcomes in prop::collection::vec(arb_outcome(), 0..24),
        inputs in prop::collection::vec("[a-z ?!]{0,40}", 1..8),
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let history = runtime.block_on(async {
            let mut session = Session::start(
                config.clone(),
                Arc::new(FixedClassifier::new(signal)),
                Arc::new(ScriptedGenerator::new(
                    outcomes.iter().copied().map(outcome).collect(),
                )),
            )
            .unwrap();
            for input in &inputs {
                session.submit_turn(input).await.unwrap();
            }
            session.history().to_vec()
        });

        prop_assert_eq!(history.len(), inputs.len());
        for (i, record) in history.iter().enumerate() {
            prop_assert_eq!(record.turn_index, i as u64);
            prop_assert!(record.affect.is_within_bounds());
            prop_assert!(record.attention.len() <= config.attention_capacity);
            prop_assert!(!record.reflection_chain.is_empty());
            prop_assert!(record.reflection_chain.len() <= config.max_recursion_depth);
            prop_assert_eq!(record.metrics.temporal_binding.is_none(), i == 0);
            prop_assert!((0.0..=1.0).contains(&record.metrics.overall));
        }
    }
}

// ============================================================================
// Extraction
// ============================================================================

proptest! {
    #[test]
    fn candidate_saliences_in_unit_range(
        input in "\\PC{0,120}",
        signal in arb_signal(),
        turn in 0u64..100,
    ) {
        for concept in candidates(&input, &signal, None, turn) {
            prop_assert!((0.0..=1.0).contains(&concept.salience));
            prop_assert_eq!(concept.introduced_at, Some(turn));
            prop_assert!(!concept.id.is_empty());
        }
    }

    #[test]
    fn keywords_are_unique_and_long_enough(input in "\\PC{0,200}") {
        let keywords = extract_keywords(&input);
        let mut seen = std::collections::HashSet::new();
        for (word, count) in &keywords {
            prop_assert!(word.chars().count() >= 3);
            prop_assert!(*count >= 1);
            prop_assert!(seen.insert(word.clone()));
        }
    }
}
