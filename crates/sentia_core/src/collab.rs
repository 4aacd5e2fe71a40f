//! Traits for the external collaborators: emotion classification and text
//! generation. Both are opaque to the engine.

use crate::affect::EmotionSignal;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a generation call is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GenerationPurpose {
    BaseJudgment,
    Reflection { level: usize },
    Reply,
}

impl fmt::Display for GenerationPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationPurpose::BaseJudgment => f.write_str("base_judgment"),
            GenerationPurpose::Reflection { level } => write!(f, "reflection[{}]", level),
            GenerationPurpose::Reply => f.write_str("reply"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationContext {
    pub purpose: GenerationPurpose,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl GenerationContext {
    pub fn new(purpose: GenerationPurpose, temperature: f32, max_tokens: u32) -> Self {
        Self {
            purpose,
            temperature,
            max_tokens,
        }
    }
}

/// Text → emotion label + confidence.
#[async_trait]
pub trait EmotionClassifier: Send + Sync {
    /// Fails with `ClassificationUnavailable`.
    async fn classify(&self, text: &str) -> Result<EmotionSignal>;

    fn name(&self) -> &'static str;
}

/// Prompt + context → text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Fails with `GenerationTimeout` or `GenerationError`.
    async fn generate(&self, prompt: &str, context: &GenerationContext) -> Result<String>;

    fn name(&self) -> &'static str;
}
