//! The affect update rule.
//!
//! One update per turn, always in the same order:
//! 1. the classified emotion's delta, scaled by classifier confidence
//! 2. the internal feedback delta, if any
//! 3. decay toward the homeostatic baseline
//! 4. sanitize and clamp to [0, 1]

use sentia_core::{AffectDelta, AffectState, Chemical, EmotionTable, InputSignal, SessionConfig, SignalMap};

#[derive(Debug, Clone)]
pub struct AffectModel {
    baseline: AffectState,
    decay_rates: SignalMap,
    emotion_table: EmotionTable,
}

impl AffectModel {
    pub fn new(baseline: AffectState, decay_rates: SignalMap, emotion_table: EmotionTable) -> Self {
        Self {
            baseline,
            decay_rates,
            emotion_table,
        }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(
            config.baseline,
            config.decay_rates.clone(),
            config.emotion_table.clone(),
        )
    }

    pub fn baseline(&self) -> &AffectState {
        &self.baseline
    }

    /// Compute the next state. Pure: `previous` is left untouched.
    pub fn update(&self, previous: &AffectState, signal: &InputSignal) -> AffectState {
        let mut raw = previous.as_array();
        let confidence = sanitize_unit(signal.emotion.confidence);

        if let Some(delta) = self.emotion_table.delta_for(signal.emotion.label) {
            add_delta(&mut raw, delta, confidence);
        }

        if let Some(feedback) = &signal.feedback {
            add_delta(&mut raw, feedback, 1.0);
        }

        for (i, chemical) in Chemical::ALL.into_iter().enumerate() {
            let rate = sanitize_unit(self.decay_rates.get(chemical));
            raw[i] += (self.baseline.get(chemical) - raw[i]) * rate;
        }

        let next = AffectState::from_unclamped(raw, &self.baseline);
        tracing::debug!(
            "Affect update ({} @ {:.2}): {:?} -> {:?}",
            signal.emotion.label,
            confidence,
            previous.as_array(),
            next.as_array()
        );
        next
    }
}

fn add_delta(raw: &mut [f32; Chemical::COUNT], delta: &SignalMap, scale: f32) {
    for (i, chemical) in Chemical::ALL.into_iter().enumerate() {
        let d = delta.get(chemical) * scale;
        // A non-finite component is dropped rather than poisoning the level.
        if d.is_finite() {
            raw[i] += d;
        }
    }
}

fn sanitize_unit(rate: f32) -> f32 {
    if rate.is_finite() {
        rate.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Feedback delta for the next update when the last reflection was unsure.
///
/// Returns the uncertainty response scaled by `threshold - confidence`, or
/// `None` when confidence met the threshold.
pub fn uncertainty_feedback(
    response: &SignalMap,
    confidence: f32,
    threshold: f32,
) -> Option<AffectDelta> {
    if !confidence.is_finite() || !threshold.is_finite() {
        return None;
    }
    let shortfall = threshold - confidence.clamp(0.0, 1.0);
    if shortfall <= 0.0 {
        return None;
    }
    Some(response.scaled(shortfall))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentia_core::{EmotionLabel, EmotionSignal};

    fn model_with_baseline(baseline: AffectState) -> AffectModel {
        let config = SessionConfig {
            baseline,
            ..SessionConfig::default()
        };
        AffectModel::from_config(&config)
    }

    #[test]
    fn test_joy_raises_reward_and_lowers_stress() {
        let start = AffectState::uniform(0.5);
        let model = model_with_baseline(start);
        let signal = InputSignal::from_emotion(EmotionSignal::new(EmotionLabel::Joy, 0.9));

        let next = model.update(&start, &signal);

        assert!(next.is_within_bounds());
        assert!(next.get(Chemical::Dopamine) > 0.5);
        assert!(next.get(Chemical::Serotonin) > 0.5);
        assert!(next.get(Chemical::Cortisol) < 0.5);
        // 0.5 + 0.3 * 0.9 = 0.77, then 5% back toward 0.5
        assert!((next.get(Chemical::Dopamine) - 0.7565).abs() < 1e-4);
        assert!((next.get(Chemical::Cortisol) - 0.4145).abs() < 1e-4);
    }

    #[test]
    fn test_neutral_input_decays_toward_baseline() {
        let model = model_with_baseline(AffectState::default());
        let stressed = AffectState::default().with(Chemical::Cortisol, 0.9);
        let next = model.update(&stressed, &InputSignal::default());
        let c = next.get(Chemical::Cortisol);
        assert!(c < 0.9 && c > 0.3);
        assert!((c - (0.9 - 0.6 * 0.05)).abs() < 1e-5);
    }

    #[test]
    fn test_update_is_pure() {
        let model = model_with_baseline(AffectState::default());
        let prev = AffectState::default();
        let signal = InputSignal::from_emotion(EmotionSignal::new(EmotionLabel::Anger, 1.0));
        let a = model.update(&prev, &signal);
        let b = model.update(&prev, &signal);
        assert_eq!(a, b);
        assert_eq!(prev, AffectState::default());
    }

    #[test]
    fn test_feedback_applied_before_decay_and_clamped() {
        let model = model_with_baseline(AffectState::default());
        let prev = AffectState::uniform(0.95);
        let feedback = SignalMap::new()
            .with(Chemical::Cortisol, 0.5)
            .with(Chemical::Dopamine, f32::NAN);
        let signal = InputSignal::default().with_feedback(feedback);
        let next = model.update(&prev, &signal);
        assert!(next.is_within_bounds());
        // 0.95 + 0.5 = 1.45, decays to 1.45 - 0.0575 = 1.3925, clamped to 1.0
        assert_eq!(next.get(Chemical::Cortisol), 1.0);
        // NaN component ignored; only decay applies
        assert!((next.get(Chemical::Dopamine) - (0.95 - 0.45 * 0.05)).abs() < 1e-5);
    }

    #[test]
    fn test_out_of_range_confidence_is_clamped() {
        let model = model_with_baseline(AffectState::default());
        let prev = AffectState::default();
        let raw = |confidence| {
            InputSignal::from_emotion(EmotionSignal {
                label: EmotionLabel::Joy,
                confidence,
            })
        };
        let full = model.update(&prev, &raw(1.0));
        assert_eq!(model.update(&prev, &raw(5.0)), full);
        assert_eq!(model.update(&prev, &raw(f32::NAN)), model.update(&prev, &raw(0.0)));
    }

    #[test]
    fn test_zero_decay_keeps_level() {
        let model = AffectModel::new(
            AffectState::default(),
            SignalMap::new(),
            EmotionTable::zeroed(),
        );
        let prev = AffectState::uniform(0.8);
        let signal = InputSignal::from_emotion(EmotionSignal::new(EmotionLabel::Fear, 1.0));
        assert_eq!(model.update(&prev, &signal), prev);
    }

    #[test]
    fn test_uncertainty_feedback_scales_with_shortfall() {
        let response = SessionConfig::default().uncertainty_response;
        assert!(uncertainty_feedback(&response, 0.8, 0.7).is_none());
        assert!(uncertainty_feedback(&response, 0.7, 0.7).is_none());

        let delta = uncertainty_feedback(&response, 0.2, 0.7).unwrap();
        assert!((delta.get(Chemical::Cortisol) - 0.15).abs() < 1e-6);
        assert!((delta.get(Chemical::Norepinephrine) - 0.1).abs() < 1e-6);
        assert!((delta.get(Chemical::Serotonin) + 0.05).abs() < 1e-6);
    }
}
