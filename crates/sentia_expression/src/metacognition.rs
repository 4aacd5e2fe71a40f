//! Bounded recursive self-reflection.
//!
//! Level 0 is a base judgment of the working set. Each further level
//! reflects only on its immediate parent's summary (plus the shared
//! affect/attention context) and the chain grows while it is both under the
//! depth budget and below the confidence threshold. Every generator call is
//! bounded by a timeout; a failed call ends the chain where it is.

use regex::Regex;
use sentia_core::{
    AffectState, AttendedConcept, Chemical, EngineError, GenerationContext, GenerationPurpose,
    ReflectionChain, Result, SessionConfig, Termination, TextGenerator,
};
use sentia_limbic::describe_mood;
use std::sync::LazyLock;
use std::time::Duration;

/// Reflection is a low-variance task.
const REFLECTION_TEMPERATURE: f32 = 0.6;

/// Parent summaries are quoted up to this many characters.
const QUOTE_CHARS: usize = 150;

/// Per-level damping of the affect-derived confidence estimate.
const FALLBACK_DAMPING: f32 = 0.9;

static RE_CONFIDENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[\(\[]?\s*confidence\s*(?:level|score)?\s*[:=]?\s*(\d+(?:\.\d+)?)\s*(%)?\s*(?:/\s*(100|10))?\s*[\)\]]?")
        .unwrap()
});
static RE_OUT_OF_TEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\(\[]?\b(\d+(?:\.\d+)?)\s*/\s*10\b\s*[\)\]]?").unwrap());

#[derive(Debug, Clone)]
pub struct MetaCognitionController {
    max_depth: usize,
    threshold: f32,
    timeout: Duration,
    max_tokens: u32,
}

impl MetaCognitionController {
    pub fn new(max_depth: usize, threshold: f32, timeout: Duration, max_tokens: u32) -> Self {
        Self {
            max_depth,
            threshold,
            timeout,
            max_tokens,
        }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(
            config.max_recursion_depth,
            config.confidence_threshold,
            config.generation_timeout(),
            config.reflection_max_tokens,
        )
    }

    /// Build this turn's reflection chain. Collaborator failures are folded
    /// into the chain's termination; only a depth overflow is an error.
    pub async fn reflect(
        &self,
        generator: &dyn TextGenerator,
        working_set: &[AttendedConcept],
        affect: &AffectState,
    ) -> Result<ReflectionChain> {
        let mut chain = ReflectionChain::new(self.max_depth);
        let context = shared_context(working_set, affect);

        let base_prompt = base_prompt(&context);
        match self.generate(generator, &base_prompt, GenerationPurpose::BaseJudgment).await {
            Ok(text) => {
                let (summary, confidence) = interpret(&text, 0, affect);
                push(&mut chain, summary, confidence)?;
            }
            Err(e) => {
                tracing::warn!("Reflection: base judgment unavailable ({}), using internal summary", e);
                push(&mut chain, internal_summary(working_set, affect), 0.0)?;
                chain.terminate(failure(0, &e));
                return Ok(chain);
            }
        }

        loop {
            let (level, parent_summary, parent_confidence) = match chain.top() {
                Some(top) => (top.level + 1, top.summary.clone(), top.confidence),
                None => break,
            };

            if parent_confidence >= self.threshold {
                chain.terminate(Termination::ConfidenceReached);
                break;
            }
            if level >= self.max_depth {
                chain.terminate(Termination::DepthExhausted);
                break;
            }

            let prompt = level_prompt(level, &parent_summary, &context);
            match self
                .generate(generator, &prompt, GenerationPurpose::Reflection { level })
                .await
            {
                Ok(text) => {
                    let (summary, confidence) = interpret(&text, level, affect);
                    push(&mut chain, summary, confidence)?;
                }
                Err(e) => {
                    tracing::warn!("Reflection: level {} failed ({}), chain truncated", level, e);
                    chain.terminate(failure(level, &e));
                    break;
                }
            }
        }

        tracing::debug!(
            "Reflection: {} level(s), termination {:?}",
            chain.len(),
            chain.termination()
        );
        Ok(chain)
    }

    async fn generate(
        &self,
        generator: &dyn TextGenerator,
        prompt: &str,
        purpose: GenerationPurpose,
    ) -> Result<String> {
        let context = GenerationContext::new(purpose, REFLECTION_TEMPERATURE, self.max_tokens);
        let text = match tokio::time::timeout(self.timeout, generator.generate(prompt, &context)).await
        {
            Ok(result) => result?,
            Err(_) => return Err(EngineError::GenerationTimeout(self.timeout)),
        };
        if text.trim().is_empty() {
            return Err(EngineError::GenerationError(format!(
                "{} returned an empty {}",
                generator.name(),
                purpose
            )));
        }
        Ok(text)
    }
}

fn push(chain: &mut ReflectionChain, summary: String, confidence: f32) -> Result<()> {
    chain.push(summary, confidence).map(|_| ()).map_err(|e| {
        tracing::error!("Reflection: {}", e);
        e
    })
}

fn failure(level: usize, error: &EngineError) -> Termination {
    match error {
        EngineError::GenerationTimeout(_) => Termination::GenerationTimeout { level },
        other => Termination::GenerationFailed {
            level,
            reason: other.to_string(),
        },
    }
}

// =============================================================================
// Prompts
// =============================================================================

fn shared_context(working_set: &[AttendedConcept], affect: &AffectState) -> String {
    let attention = if working_set.is_empty() {
        "nothing in particular".to_string()
    } else {
        working_set
            .iter()
            .map(|a| a.id())
            .collect::<Vec<_>>()
            .join(", ")
    };
    let levels = affect
        .iter()
        .map(|(c, v)| format!("{}={:.2}", c, v))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "Currently attending to: {}\nCurrent mood: {} ({})",
        attention,
        describe_mood(affect),
        levels
    )
}

fn base_prompt(context: &str) -> String {
    format!(
        "{}\n\nIn one brief sentence, judge what matters most in what you are attending to. \
         End with \"confidence: <0.0-1.0>\".",
        context
    )
}

fn level_prompt(level: usize, parent: &str, context: &str) -> String {
    let quoted = quote(parent);
    let body = match level {
        1 => format!(
            "You judged: \"{}\"\n\nMeta-observation (8 words max): what aspect of this judgment stands out most?",
            quoted
        ),
        2 => format!(
            "You noticed: \"{}\"\n\nMeta-evaluation (8 words max): rate confidence in this observation (0-10) and explain briefly.",
            quoted
        ),
        3 => format!(
            "You evaluated: \"{}\"\n\nMeta-introspection (10 words max): what cognitive pattern or bias might explain this evaluation?",
            quoted
        ),
        _ => format!("Reflect on: \"{}\"\n\nBrief meta-thought (8 words max):", quoted),
    };
    format!(
        "{}\n\n{}\nEnd with \"confidence: <0.0-1.0>\".",
        context, body
    )
}

fn quote(text: &str) -> String {
    if text.chars().count() <= QUOTE_CHARS {
        text.to_string()
    } else {
        let cut: String = text.chars().take(QUOTE_CHARS).collect();
        format!("{}...", cut)
    }
}

/// Deterministic stand-in for the base judgment when the generator fails.
fn internal_summary(working_set: &[AttendedConcept], affect: &AffectState) -> String {
    let focus = working_set
        .first()
        .map(|a| a.id().to_string())
        .unwrap_or_else(|| "nothing in particular".to_string());
    format!(
        "Attending to {} while feeling {}.",
        focus,
        describe_mood(affect)
    )
}

// =============================================================================
// Confidence
// =============================================================================

/// Split generated text into (summary, confidence). An explicit marker wins;
/// otherwise the estimate comes from affect.
pub fn interpret(text: &str, level: usize, affect: &AffectState) -> (String, f32) {
    let text = text.trim();
    match parse_confidence(text) {
        Some((confidence, start, end)) => {
            let mut summary = String::with_capacity(text.len());
            summary.push_str(&text[..start]);
            summary.push(' ');
            summary.push_str(&text[end..]);
            let summary = tidy(&summary);
            let summary = if summary.is_empty() {
                text.to_string()
            } else {
                summary
            };
            (summary, confidence)
        }
        None => (text.to_string(), affect_confidence(affect, level)),
    }
}

/// First confidence marker in `text`, normalized to [0, 1], with its byte span.
pub fn parse_confidence(text: &str) -> Option<(f32, usize, usize)> {
    if let Some(caps) = RE_CONFIDENCE.captures(text) {
        let whole = caps.get(0)?;
        let value: f32 = caps.get(1)?.as_str().parse().ok()?;
        let value = if caps.get(2).is_some() {
            value / 100.0
        } else if let Some(scale) = caps.get(3) {
            let scale: f32 = scale.as_str().parse().ok()?;
            value / scale
        } else if value <= 1.0 {
            value
        } else if value <= 10.0 {
            value / 10.0
        } else {
            value / 100.0
        };
        return Some((value.clamp(0.0, 1.0), whole.start(), whole.end()));
    }
    if let Some(caps) = RE_OUT_OF_TEN.captures(text) {
        let whole = caps.get(0)?;
        let value: f32 = caps.get(1)?.as_str().parse().ok()?;
        return Some(((value / 10.0).clamp(0.0, 1.0), whole.start(), whole.end()));
    }
    None
}

/// `0.5 + 0.25(serotonin − cortisol) + 0.25(dopamine − norepinephrine)`,
/// damped by `0.9^level`.
pub fn affect_confidence(affect: &AffectState, level: usize) -> f32 {
    let base = 0.5
        + 0.25 * (affect.get(Chemical::Serotonin) - affect.get(Chemical::Cortisol))
        + 0.25 * (affect.get(Chemical::Dopamine) - affect.get(Chemical::Norepinephrine));
    let damping = FALLBACK_DAMPING.powi(level.min(i32::MAX as usize) as i32);
    (base * damping).clamp(0.0, 1.0)
}

fn tidy(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | '-' | '|' | ':'))
        .replace(" .", ".")
        .to_string()
}
