//! Deterministic offline text generator.
//!
//! Replies are assembled from templates chosen by dialogue intent, with the
//! mood phrase and the top attended concept read back from the prompt.
//! Reflection prompts get a templated observation plus a confidence marker.
//! Template choice hashes the input, so identical prompts give identical text.

use super::keyword::mentions_emotion;
use crate::extraction::is_question;
use crate::prompts::{labelled_line, ATTENDING_PREFIX, MOOD_PREFIX, USER_PREFIX};
use async_trait::async_trait;
use sentia_core::{GenerationContext, GenerationPurpose, Result, TextGenerator};

const GREETINGS: &[&str] = &[
    "Hello! I'm here and ready to talk. What's on your mind?",
    "Hi there! Good to hear from you. Where would you like to start?",
    "Hey! Thanks for reaching out. What brings you here today?",
];

const QUESTION_OPENERS: &[&str] = &[
    "That's a thoughtful question.",
    "Good question, let me think it through.",
    "That's something worth examining.",
];

const EMOTIONAL_OPENERS: &[&str] = &[
    "I can hear the feeling in what you're saying.",
    "That clearly matters to you.",
    "I notice the emotion behind your words.",
];

const AFFIRMATIONS: &[&str] = &[
    "That's an interesting perspective.",
    "I see what you mean.",
    "You've touched on something important.",
];

const CLOSINGS: &[&str] = &[
    "Thank you for this conversation.",
    "I've enjoyed exploring these ideas with you.",
    "Take care, this was a good exchange.",
];

const GREETING_WORDS: &[&str] = &["hello", "hi", "hey", "greetings", "howdy"];
const CLOSING_WORDS: &[&str] = &["bye", "goodbye", "thanks", "farewell"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Greeting,
    Closing,
    Question,
    Emotional,
    Statement,
}

pub fn detect_intent(text: &str) -> Intent {
    let lower = text.trim().to_lowercase();
    let first = lower
        .split(|c: char| !c.is_alphanumeric())
        .find(|w| !w.is_empty())
        .unwrap_or("");

    if GREETING_WORDS.contains(&first) {
        Intent::Greeting
    } else if CLOSING_WORDS.iter().any(|w| lower.contains(w)) || lower.contains("see you") {
        Intent::Closing
    } else if is_question(&lower) {
        Intent::Question
    } else if mentions_emotion(&lower) || lower.contains("i feel") {
        Intent::Emotional
    } else {
        Intent::Statement
    }
}

/// Stable template index for `seed`.
fn pick<'a>(templates: &[&'a str], seed: &str) -> &'a str {
    let hash = seed
        .bytes()
        .fold(0usize, |acc, b| acc.wrapping_mul(31).wrapping_add(b as usize));
    templates[hash % templates.len()]
}

fn first_concept(prompt: &str) -> Option<&str> {
    labelled_line(prompt, ATTENDING_PREFIX)
        .and_then(|line| line.split(',').next())
        .map(str::trim)
        .filter(|c| !c.is_empty() && *c != "nothing in particular")
}

fn mood(prompt: &str) -> &str {
    labelled_line(prompt, MOOD_PREFIX)
        .map(|m| m.split(" (").next().unwrap_or(m))
        .unwrap_or("calm and balanced")
}

#[derive(Debug, Clone, Default)]
pub struct HeuristicGenerator;

impl HeuristicGenerator {
    pub fn new() -> Self {
        Self
    }

    fn reply(&self, prompt: &str) -> String {
        let input = labelled_line(prompt, USER_PREFIX).unwrap_or("");
        let concept = first_concept(prompt);
        let mood = mood(prompt);

        match detect_intent(input) {
            Intent::Greeting => pick(GREETINGS, input).to_string(),
            Intent::Closing => pick(CLOSINGS, input).to_string(),
            Intent::Question => {
                let opener = pick(QUESTION_OPENERS, input);
                match concept {
                    Some(c) => format!("{} When it comes to {}, I find myself {}.", opener, c, mood),
                    None => format!("{} Here's my thinking, from a place that feels {}.", opener, mood),
                }
            }
            Intent::Emotional => {
                let opener = pick(EMOTIONAL_OPENERS, input);
                match concept {
                    Some(c) => format!("{} Tell me more about {}.", opener, c),
                    None => format!("{} I'm listening.", opener),
                }
            }
            Intent::Statement => {
                let opener = pick(AFFIRMATIONS, input);
                match concept {
                    Some(c) => format!("{} I'm curious how {} connects to what you're describing.", opener, c),
                    None => "Could you say a little more about that?".to_string(),
                }
            }
        }
    }

    fn reflection(&self, prompt: &str, level: usize) -> String {
        let focus = first_concept(prompt).unwrap_or("the conversation");
        let text = match level {
            0 => format!("What matters most right now is {}", focus),
            1 => format!("My attention keeps returning to {}", focus),
            2 => format!("The observation about {} seems partly grounded", focus),
            3 => format!("Mood may be colouring how I weigh {}", focus),
            _ => format!("Still circling {}", focus),
        };
        let confidence = 0.35 + (prompt.chars().count() % 60) as f32 / 100.0;
        format!("{}. confidence: {:.2}", text, confidence)
    }
}

#[async_trait]
impl TextGenerator for HeuristicGenerator {
    async fn generate(&self, prompt: &str, context: &GenerationContext) -> Result<String> {
        Ok(match context.purpose {
            GenerationPurpose::Reply => self.reply(prompt),
            GenerationPurpose::BaseJudgment => self.reflection(prompt, 0),
            GenerationPurpose::Reflection { level } => self.reflection(prompt, level),
        })
    }

    fn name(&self) -> &'static str {
        "heuristic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply_context() -> GenerationContext {
        GenerationContext::new(GenerationPurpose::Reply, 0.7, 64)
    }

    #[test]
    fn test_intent_detection() {
        assert_eq!(detect_intent("Hello there"), Intent::Greeting);
        assert_eq!(detect_intent("ok bye for now"), Intent::Closing);
        assert_eq!(detect_intent("What is memory?"), Intent::Question);
        assert_eq!(detect_intent("I am so sad today"), Intent::Emotional);
        assert_eq!(detect_intent("The sky is grey."), Intent::Statement);
        assert_eq!(detect_intent("this hill is high"), Intent::Statement);
    }

    #[tokio::test]
    async fn test_reply_mentions_top_concept() {
        let prompt = format!(
            "{}music, rhythm\n{}curious and engaged\n\n{}Why do people love music?\nResponse:",
            ATTENDING_PREFIX, MOOD_PREFIX, USER_PREFIX
        );
        let reply = HeuristicGenerator::new()
            .generate(&prompt, &reply_context())
            .await
            .unwrap();
        assert!(reply.contains("music"));
        assert!(reply.contains("curious and engaged"));
    }

    #[tokio::test]
    async fn test_reflection_carries_parseable_confidence() {
        let prompt = format!("{}music\n{}calm (dopamine=0.50)", ATTENDING_PREFIX, MOOD_PREFIX);
        let context = GenerationContext::new(GenerationPurpose::Reflection { level: 2 }, 0.6, 60);
        let text = HeuristicGenerator::new().generate(&prompt, &context).await.unwrap();
        let (confidence, _, _) = sentia_expression::parse_confidence(&text).unwrap();
        assert!((0.35..0.95).contains(&confidence));
        assert!(text.contains("music"));
    }

    #[tokio::test]
    async fn test_output_is_deterministic() {
        let generator = HeuristicGenerator::new();
        let prompt = format!("{}I think the weather changed", USER_PREFIX);
        let a = generator.generate(&prompt, &reply_context()).await.unwrap();
        let b = generator.generate(&prompt, &reply_context()).await.unwrap();
        assert_eq!(a, b);
    }
}
