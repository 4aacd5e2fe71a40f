//! Dialogue turn orchestration.
//!
//! A [`Session`] owns one conversation: the current affect state, the
//! working set, and the append-only turn history. Each call to
//! [`Session::submit_turn`] runs the fixed pipeline
//! classify, feedback, affect update, attention, reflection, reply, metrics.
//! Inputs that mention self-harm get a fixed crisis reply in place of a
//! generated one; the rest of the pipeline runs as usual.

use crate::extraction;
use crate::prompts::{reply_prompt, ReplyPromptParts, CRISIS_REPLY};
use sentia_core::{
    AffectState, AttendedConcept, EmotionClassifier, EmotionLabel, EmotionSignal, EngineError,
    GenerationContext, GenerationPurpose, InputSignal, Result, SessionConfig, TextGenerator,
    TurnMarker, TurnRecord, TurnState,
};
use sentia_expression::{
    summarize, AttentionSelector, MetaCognitionController, MetricsCalculator, MetricsSummary,
};
use sentia_limbic::{uncertainty_feedback, AffectModel, BehaviorModulation};
use std::sync::Arc;
use uuid::Uuid;

/// One conversation with its own state and history.
pub struct Session {
    id: Uuid,
    config: SessionConfig,
    affect_model: AffectModel,
    selector: AttentionSelector,
    metacognition: MetaCognitionController,
    metrics: MetricsCalculator,
    classifier: Arc<dyn EmotionClassifier>,
    generator: Arc<dyn TextGenerator>,

    affect: AffectState,
    working_set: Vec<AttendedConcept>,
    history: Vec<TurnRecord>,
}

impl Session {
    /// Validate `config` and open a session at baseline affect.
    pub fn start(
        config: SessionConfig,
        classifier: Arc<dyn EmotionClassifier>,
        generator: Arc<dyn TextGenerator>,
    ) -> Result<Self> {
        if let Err(e) = config.validate() {
            tracing::error!("Rejected session configuration: {}", e);
            return Err(e);
        }

        let id = Uuid::new_v4();
        tracing::info!(
            session = %id,
            classifier = classifier.name(),
            generator = generator.name(),
            "Session started"
        );

        Ok(Self {
            id,
            affect_model: AffectModel::from_config(&config),
            selector: AttentionSelector::from_config(&config),
            metacognition: MetaCognitionController::from_config(&config),
            metrics: MetricsCalculator::from_config(&config),
            affect: config.baseline,
            working_set: Vec::new(),
            history: Vec::new(),
            classifier,
            generator,
            config,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn affect(&self) -> &AffectState {
        &self.affect
    }

    pub fn working_set(&self) -> &[AttendedConcept] {
        &self.working_set
    }

    pub fn history(&self) -> &[TurnRecord] {
        &self.history
    }

    /// Metric averages over the last `recent_n` turns.
    pub fn summary(&self, recent_n: usize) -> MetricsSummary {
        summarize(&self.history, recent_n)
    }

    /// Drop history and working set and return affect to baseline.
    pub fn reset(&mut self) {
        self.affect = self.config.baseline;
        self.working_set.clear();
        self.history.clear();
        tracing::info!(session = %self.id, "Session reset");
    }

    /// Run one dialogue turn and return its record.
    ///
    /// Collaborator failures are recovered and show up as markers on the
    /// record. The only error returned is a reflection defect, in which case
    /// no record is appended.
    pub async fn submit_turn(&mut self, input: &str) -> Result<TurnRecord> {
        let turn_index = self.history.len() as u64;
        let mut markers = Vec::new();

        let crisis = extraction::crisis_phrase(input);
        if let Some(phrase) = &crisis {
            tracing::warn!(turn = turn_index, matched = %phrase, "Crisis language in input");
        }

        // 1. Classify
        let emotion = self.classify(input, &mut markers).await;

        // 2. Feedback from how well the previous turn could report on itself
        let feedback = self.history.last().and_then(|prev| {
            uncertainty_feedback(
                &self.config.uncertainty_response,
                prev.metrics.reportability,
                self.config.confidence_threshold,
            )
        });

        // 3. Affect
        let mut signal = InputSignal::from_emotion(emotion);
        if let Some(delta) = feedback {
            signal = signal.with_feedback(delta);
        }
        self.affect = self.affect_model.update(&self.affect, &signal);

        // 4. Attention
        let previous_top = self.history.last().and_then(|r| r.reflection_chain.top());
        let candidates = extraction::candidates(input, &emotion, previous_top, turn_index);
        let selection = self.selector.select(
            &self.working_set,
            candidates,
            &self.affect,
            self.config.attention_capacity,
            turn_index,
        );
        self.working_set = selection.working_set;
        tracing::debug!(
            turn = turn_index,
            attention = ?self.working_set.iter().map(|a| a.id()).collect::<Vec<_>>(),
            evicted = selection.evicted.len(),
            "Working set selected"
        );

        // 5. Reflection
        let chain = match self
            .metacognition
            .reflect(self.generator.as_ref(), &self.working_set, &self.affect)
            .await
        {
            Ok(chain) => chain,
            Err(e) => {
                tracing::error!(turn = turn_index, "Reflection failed: {}", e);
                return Err(e);
            }
        };
        if let Some(level) = chain.termination().failed_level() {
            markers.push(TurnMarker::ReflectionTruncated { level });
        }
        tracing::debug!(
            turn = turn_index,
            levels = chain.len(),
            termination = ?chain.termination(),
            "Reflection finished"
        );

        // 6. Reply
        let reply = match crisis {
            Some(matched) => {
                markers.push(TurnMarker::CrisisIntervention { matched });
                Some(CRISIS_REPLY.to_string())
            }
            None => {
                let modulation = BehaviorModulation::from_affect(&self.affect);
                let prompt = reply_prompt(&ReplyPromptParts {
                    input,
                    affect: &self.affect,
                    modulation: &modulation,
                    working_set: &self.working_set,
                    chain: &chain,
                    history: &self.history,
                    is_question: extraction::is_question(input),
                    is_emotional: emotion.label != EmotionLabel::Neutral,
                });
                let context = GenerationContext::new(
                    GenerationPurpose::Reply,
                    modulation.reply_temperature(),
                    self.config.reply_max_tokens,
                );
                self.generate_reply(&prompt, &context, &mut markers).await
            }
        };

        // 7. Metrics and record
        let state = TurnState {
            turn_index,
            input: input.to_string(),
            reply,
            affect: self.affect,
            attention: self.working_set.clone(),
            evicted: selection.evicted,
            reflection_chain: chain,
            markers,
        };
        let metrics = self.metrics.compute(&state, &self.history);
        let record = state.into_record(metrics);

        tracing::info!(
            session = %self.id,
            turn = turn_index,
            emotion = %emotion.label,
            depth = record.metrics.meta_depth,
            overall = record.metrics.overall,
            markers = record.markers.len(),
            "Turn complete"
        );

        self.history.push(record.clone());
        Ok(record)
    }

    async fn classify(&self, input: &str, markers: &mut Vec<TurnMarker>) -> EmotionSignal {
        let timeout = self.config.generation_timeout();
        let outcome = match tokio::time::timeout(timeout, self.classifier.classify(input)).await {
            Ok(result) => result,
            Err(_) => Err(EngineError::ClassificationUnavailable(format!(
                "{} timed out after {:?}",
                self.classifier.name(),
                timeout
            ))),
        };
        match outcome {
            Ok(signal) => signal,
            Err(e) => {
                tracing::warn!("Classification unavailable, using neutral signal: {}", e);
                markers.push(TurnMarker::ClassificationFallback {
                    reason: e.to_string(),
                });
                self.config.neutral_signal
            }
        }
    }

    async fn generate_reply(
        &self,
        prompt: &str,
        context: &GenerationContext,
        markers: &mut Vec<TurnMarker>,
    ) -> Option<String> {
        let timeout = self.config.generation_timeout();
        let outcome = match tokio::time::timeout(timeout, self.generator.generate(prompt, context)).await {
            Ok(result) => result,
            Err(_) => Err(EngineError::GenerationTimeout(timeout)),
        };
        match outcome {
            Ok(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
            Ok(_) => {
                tracing::warn!("Reply generation returned empty text");
                markers.push(TurnMarker::GenerationFailed {
                    reason: "empty reply".to_string(),
                });
                None
            }
            Err(EngineError::GenerationTimeout(after)) => {
                tracing::warn!("Reply generation timed out after {:?}", after);
                markers.push(TurnMarker::GenerationTimeout);
                None
            }
            Err(e) => {
                tracing::warn!("Reply generation failed: {}", e);
                markers.push(TurnMarker::GenerationFailed {
                    reason: e.to_string(),
                });
                None
            }
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("turns", &self.history.len())
            .field("affect", &self.affect)
            .finish_non_exhaustive()
    }
}
