//! Property-based tests for the sentia_limbic affect model and modulation.
//!
//! Verifies that affect levels stay within [0, 1] over long sequences of
//! arbitrary (including hostile) signals, and that the derived behavioural
//! dimensions never leave their documented ranges.

use proptest::prelude::*;
use sentia_core::{
    AffectState, Chemical, EmotionLabel, EmotionSignal, InputSignal, SessionConfig, SignalMap,
};
use sentia_limbic::{uncertainty_feedback, AffectModel, BehaviorModulation};

// ============================================================================
// Strategies
// ============================================================================

fn arb_label() -> impl Strategy<Value = EmotionLabel> {
    (0usize..EmotionLabel::ALL.len()).prop_map(|i| EmotionLabel::ALL[i])
}

fn arb_confidence() -> impl Strategy<Value = f32> {
    prop_oneof![
        8 => -1.0f32..=2.0,
        1 => Just(f32::NAN),
    ]
}

fn arb_delta() -> impl Strategy<Value = Option<SignalMap>> {
    prop::option::of(prop::array::uniform5(prop_oneof![
        9 => -2.0f32..=2.0,
        1 => Just(f32::INFINITY),
    ]))
    .prop_map(|maybe| {
        maybe.map(|values| {
            Chemical::ALL
                .into_iter()
                .zip(values)
                .collect::<SignalMap>()
        })
    })
}

fn arb_signal() -> impl Strategy<Value = InputSignal> {
    (arb_label(), arb_confidence(), arb_delta()).prop_map(|(label, confidence, feedback)| {
        InputSignal {
            emotion: EmotionSignal::new(label, confidence),
            feedback,
        }
    })
}

fn arb_affect() -> impl Strategy<Value = AffectState> {
    prop::array::uniform5(0.0f32..=1.0)
        .prop_map(|raw| AffectState::from_unclamped(raw, &AffectState::default()))
}

// ============================================================================
// Affect model properties
// ============================================================================

proptest! {
    /// **Core invariant**: no sequence of signals can push a level outside [0, 1].
    #[test]
    fn affect_stays_bounded_over_many_turns(
        signals in prop::collection::vec(arb_signal(), 1..200)
    ) {
        let model = AffectModel::from_config(&SessionConfig::default());
        let mut state = *model.baseline();
        for signal in &signals {
            state = model.update(&state, signal);
            prop_assert!(state.is_within_bounds(), "out of bounds: {:?}", state);
        }
    }

    /// Same inputs, same outputs.
    #[test]
    fn update_is_deterministic(start in arb_affect(), signal in arb_signal()) {
        let model = AffectModel::from_config(&SessionConfig::default());
        prop_assert_eq!(model.update(&start, &signal), model.update(&start, &signal));
    }

    /// With no stimulus, every level moves toward (never past) its baseline.
    #[test]
    fn neutral_input_moves_toward_baseline(start in arb_affect()) {
        let model = AffectModel::from_config(&SessionConfig::default());
        let next = model.update(&start, &InputSignal::from_emotion(EmotionSignal::neutral(1.0)));
        for chemical in Chemical::ALL {
            let base = model.baseline().get(chemical);
            let before = (start.get(chemical) - base).abs();
            let after = (next.get(chemical) - base).abs();
            prop_assert!(after <= before + 1e-6);
        }
    }

    /// Feedback only exists for a confidence shortfall and is proportional to it.
    #[test]
    fn uncertainty_feedback_proportional(confidence in 0.0f32..=1.0, threshold in 0.0f32..=1.0) {
        let response = SessionConfig::default().uncertainty_response;
        match uncertainty_feedback(&response, confidence, threshold) {
            None => prop_assert!(confidence >= threshold),
            Some(delta) => {
                prop_assert!(confidence < threshold);
                let expected = 0.3 * (threshold - confidence);
                prop_assert!((delta.get(Chemical::Cortisol) - expected).abs() < 1e-5);
            }
        }
    }
}

// ============================================================================
// Behavioural modulation properties
// ============================================================================

proptest! {
    #[test]
    fn modulation_always_in_range(state in arb_affect()) {
        let m = BehaviorModulation::from_affect(&state);
        for v in [m.creativity, m.positivity, m.empathy, m.urgency, m.caution, m.sociability] {
            prop_assert!(v.is_finite());
            prop_assert!((-1e-6..=1.0 + 1e-6).contains(&v));
        }
        let t = m.reply_temperature();
        prop_assert!((0.3..=1.2).contains(&t));
    }
}
