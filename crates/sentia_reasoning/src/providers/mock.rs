//! Scripted collaborators for tests and offline runs.

use async_trait::async_trait;
use sentia_core::{
    EmotionClassifier, EmotionSignal, EngineError, GenerationContext, Result, TextGenerator,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// One scripted step: an outcome, optionally after a delay.
#[derive(Debug)]
pub struct Scripted {
    pub delay: Option<Duration>,
    pub outcome: Result<String>,
}

impl From<Result<String>> for Scripted {
    fn from(outcome: Result<String>) -> Self {
        Self {
            delay: None,
            outcome,
        }
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

/// Pops responses from a queue; returns `default_text` once it is empty.
/// Every call is recorded with its prompt and context.
#[derive(Debug)]
pub struct ScriptedGenerator {
    queue: Mutex<VecDeque<Scripted>>,
    default_text: String,
    calls: Mutex<Vec<(String, GenerationContext)>>,
}

impl ScriptedGenerator {
    pub fn new(responses: Vec<Result<String>>) -> Self {
        Self::with_steps(responses.into_iter().map(Scripted::from).collect())
    }

    pub fn with_steps(steps: Vec<Scripted>) -> Self {
        Self {
            queue: Mutex::new(steps.into()),
            default_text: "ok. confidence: 0.9".to_string(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_default(mut self, text: &str) -> Self {
        self.default_text = text.to_string();
        self
    }

    /// Queue another step.
    pub fn push(&self, step: impl Into<Scripted>) {
        lock(&self.queue).push_back(step.into());
    }

    pub fn calls(&self) -> Vec<(String, GenerationContext)> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, prompt: &str, context: &GenerationContext) -> Result<String> {
        lock(&self.calls).push((prompt.to_string(), context.clone()));
        let step = lock(&self.queue).pop_front();
        match step {
            Some(Scripted { delay, outcome }) => {
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }
                outcome
            }
            None => Ok(self.default_text.clone()),
        }
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Always reports the same signal.
#[derive(Debug)]
pub struct FixedClassifier {
    signal: EmotionSignal,
    calls: AtomicUsize,
}

impl FixedClassifier {
    pub fn new(signal: EmotionSignal) -> Self {
        Self {
            signal,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmotionClassifier for FixedClassifier {
    async fn classify(&self, _text: &str) -> Result<EmotionSignal> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.signal)
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

/// Always unavailable.
#[derive(Debug, Default)]
pub struct FailingClassifier;

#[async_trait]
impl EmotionClassifier for FailingClassifier {
    async fn classify(&self, _text: &str) -> Result<EmotionSignal> {
        Err(EngineError::ClassificationUnavailable(
            "classifier offline".to_string(),
        ))
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}
