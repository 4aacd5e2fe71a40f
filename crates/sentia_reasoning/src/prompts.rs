//! Reply prompt assembly.
//!
//! The reply prompt carries the affect state, the behavioural modulation
//! derived from it, the working set and the outcome of reflection, then the
//! user's input. Labelled lines use the prefixes below so offline generators
//! can read them back.

use sentia_core::{AffectState, AttendedConcept, ReflectionChain, TurnRecord};
use sentia_limbic::{describe_mood, BehaviorModulation};

pub const ATTENDING_PREFIX: &str = "Currently attending to: ";
pub const MOOD_PREFIX: &str = "Current mood: ";
pub const USER_PREFIX: &str = "User: ";

/// Fixed reply for inputs that mention self-harm. Never generated.
pub const CRISIS_REPLY: &str = "I'm concerned about what you've shared. Please know that help is \
available and you don't have to face this alone.

Crisis resources:
- National Suicide Prevention Lifeline: call or text 988 (US)
- Crisis Text Line: text HOME to 741741

Would you like to talk about what's troubling you? I'm here to listen, though I strongly \
encourage you to reach out to the people above who are trained to help.";

/// How many earlier exchanges the reply prompt quotes.
pub const HISTORY_TURNS: usize = 3;

pub struct ReplyPromptParts<'a> {
    pub input: &'a str,
    pub affect: &'a AffectState,
    pub modulation: &'a BehaviorModulation,
    pub working_set: &'a [AttendedConcept],
    pub chain: &'a ReflectionChain,
    pub history: &'a [TurnRecord],
    pub is_question: bool,
    pub is_emotional: bool,
}

pub fn reply_prompt(parts: &ReplyPromptParts<'_>) -> String {
    let mut prompt = String::new();

    prompt.push_str("Your internal state:\n");
    for (chemical, level) in parts.affect.iter() {
        prompt.push_str(&format!("- {} {:.2} ({})\n", chemical, level, chemical.role()));
    }
    prompt.push_str(&format!("{}{}\n", MOOD_PREFIX, describe_mood(parts.affect)));
    prompt.push_str(&format!(
        "Behavioural modulation: {}\n",
        parts.modulation.format_for_prompt()
    ));

    let attention = if parts.working_set.is_empty() {
        "nothing in particular".to_string()
    } else {
        parts
            .working_set
            .iter()
            .map(|a| a.id())
            .collect::<Vec<_>>()
            .join(", ")
    };
    prompt.push_str(&format!("{}{}\n", ATTENDING_PREFIX, attention));

    if let Some(top) = parts.chain.top() {
        prompt.push_str(&format!(
            "Deepest reflection (level {}, confidence {:.2}): {}\n",
            top.level, top.confidence, top.summary
        ));
    }

    let recent = parts.history.len().saturating_sub(HISTORY_TURNS);
    let exchanges: Vec<String> = parts.history[recent..]
        .iter()
        .map(|r| match &r.reply {
            Some(reply) => format!("{}{}\nYou: {}", USER_PREFIX, r.input, reply),
            None => format!("{}{}", USER_PREFIX, r.input),
        })
        .collect();
    if !exchanges.is_empty() {
        prompt.push_str("\nRecent conversation:\n");
        prompt.push_str(&exchanges.join("\n"));
        prompt.push('\n');
    }

    prompt.push_str(&format!(
        "\nRespond in a {} manner.\n",
        parts.modulation.tone()
    ));
    if parts.is_question {
        prompt.push_str("Provide a clear, direct answer.\n");
    }
    if parts.is_emotional {
        prompt.push_str("Acknowledge their feelings with emotional attunement.\n");
    }
    prompt.push_str(&format!("\n{}{}\nResponse:", USER_PREFIX, parts.input));
    prompt
}

/// Read the value of the last line starting with `prefix`.
pub fn labelled_line<'a>(prompt: &'a str, prefix: &str) -> Option<&'a str> {
    prompt
        .lines()
        .rev()
        .find_map(|line| line.strip_prefix(prefix))
        .map(str::trim)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentia_core::Concept;

    #[test]
    fn test_reply_prompt_contains_state_and_input() {
        let affect = AffectState::default();
        let modulation = BehaviorModulation::from_affect(&affect);
        let working_set = vec![AttendedConcept {
            concept: Concept::input("music", 0.9),
            effective_salience: 0.9,
            carried: false,
        }];
        let mut chain = ReflectionChain::new(3);
        chain.push("Music matters here.".to_string(), 0.8).unwrap();

        let prompt = reply_prompt(&ReplyPromptParts {
            input: "Do you like music?",
            affect: &affect,
            modulation: &modulation,
            working_set: &working_set,
            chain: &chain,
            history: &[],
            is_question: true,
            is_emotional: false,
        });

        assert!(prompt.contains("dopamine 0.50"));
        assert!(prompt.contains("Provide a clear, direct answer."));
        assert!(!prompt.contains("emotional attunement"));
        assert!(prompt.contains("Music matters here."));
        assert!(prompt.ends_with("Response:"));
        assert_eq!(labelled_line(&prompt, ATTENDING_PREFIX), Some("music"));
        assert_eq!(labelled_line(&prompt, USER_PREFIX), Some("Do you like music?"));
    }
}
